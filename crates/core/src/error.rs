#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid {kind} '{value}'. Must be one of: {expected}")]
    InvalidValue {
        kind: &'static str,
        value: String,
        expected: String,
    },
}

impl CoreError {
    pub(crate) fn invalid_value(kind: &'static str, value: &str, valid: &[&str]) -> Self {
        Self::InvalidValue {
            kind,
            value: value.to_string(),
            expected: valid.join(", "),
        }
    }
}
