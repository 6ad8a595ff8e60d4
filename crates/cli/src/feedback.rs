//! How failures reach the user.
//!
//! Failed mutating actions end the command with an alert on stderr and a
//! non-zero exit code. Read failures on first load are rendered as a banner
//! above an empty view by the command itself, which then returns
//! [`CliError::Reported`]. A rejected session always prints the login
//! redirect and exits with [`EXIT_LOGIN_REQUIRED`].

use std::process::ExitCode;

use colored::Colorize;
use saasprobe_client::config::ConfigError;
use saasprobe_client::token_store::TokenStoreError;
use saasprobe_client::ApiError;
use saasprobe_core::error::CoreError;

/// Exit code for any failed command.
pub const EXIT_FAILURE: u8 = 1;

/// Exit code when the user has to (re-)authenticate.
pub const EXIT_LOGIN_REQUIRED: u8 = 3;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Your session has expired. Please log in again with `saasprobe login`.")]
    SessionExpired,

    #[error("You are not logged in. Run `saasprobe login`, or `saasprobe register` to create an account.")]
    NotLoggedIn,

    /// A mutating action failed.
    #[error("Failed to {action}: {message}")]
    Action {
        action: &'static str,
        message: String,
    },

    /// Input that failed validation; the message is shown as-is.
    #[error("{0}")]
    Invalid(String),

    /// Already shown to the user inline.
    #[error("{0}")]
    Reported(String),

    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] TokenStoreError),

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => Self::SessionExpired,
            ApiError::Invalid(CoreError::Validation(msg)) => Self::Invalid(msg),
            ApiError::Invalid(other) => Self::Invalid(other.to_string()),
            ApiError::Session(e) => Self::Session(e),
            other => Self::Api(other),
        }
    }
}

impl CliError {
    /// Map a failed mutating call to an alert naming the action.
    ///
    /// ```ignore
    /// api.delete_project(id).await.map_err(CliError::action("delete project"))?;
    /// ```
    pub fn action(action: &'static str) -> impl FnOnce(ApiError) -> CliError {
        move |err| match err {
            ApiError::Unauthorized
            | ApiError::Invalid(_)
            | ApiError::Session(_) => CliError::from(err),
            other => CliError::Action {
                action,
                message: other
                    .detail()
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string()),
            },
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::SessionExpired | Self::NotLoggedIn => EXIT_LOGIN_REQUIRED,
            _ => EXIT_FAILURE,
        }
    }

    /// Print to stderr and turn into the process exit code.
    pub fn report(&self) -> ExitCode {
        match self {
            Self::Reported(_) => {}
            Self::SessionExpired | Self::NotLoggedIn => {
                eprintln!("{} {}", "→".yellow().bold(), self.to_string().yellow());
            }
            _ => eprintln!("{} {}", "✗".red().bold(), self.to_string().red()),
        }
        ExitCode::from(self.exit_code())
    }
}

/// Inline error banner rendered above a view.
pub fn banner(message: &str) -> String {
    format!("{} {}", "!".red().bold(), message.red())
}

/// One-line success notice.
pub fn success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn unauthorized_becomes_login_redirect() {
        let err = CliError::from(ApiError::Unauthorized);
        assert_matches!(err, CliError::SessionExpired);
        assert_eq!(err.exit_code(), EXIT_LOGIN_REQUIRED);

        let err = CliError::action("delete project")(ApiError::Unauthorized);
        assert_matches!(err, CliError::SessionExpired);
    }

    #[test]
    fn action_failure_uses_backend_detail() {
        let err = CliError::action("retry validation")(ApiError::Rejected {
            status: 400,
            detail: "Project is already being processed".into(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to retry validation: Project is already being processed"
        );
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn validation_errors_show_bare_message() {
        let err = CliError::from(ApiError::Invalid(CoreError::Validation(
            "Project name is required".into(),
        )));
        assert_eq!(err.to_string(), "Project name is required");
    }
}
