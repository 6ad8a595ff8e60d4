use crate::types::Timestamp;

/// Calendar date used wherever a screen shows "created" or billing dates.
pub fn format_date(ts: &Timestamp) -> String {
    ts.format("%b %-d, %Y").to_string()
}
