//! Timestamp helpers.

use chrono::{SecondsFormat, Utc};

/// Current time as an ISO-8601 UTC string, the format the platform expects
/// in `accessed_on`/`executed_on`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
