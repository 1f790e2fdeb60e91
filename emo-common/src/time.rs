//! Timestamp utilities

use chrono::{DateTime, Local, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Second-resolution stamp used in artifact names, e.g. `20250314_093015`
///
/// Rendered in local time so file names line up with the wall clock of the
/// machine the game runs on.
pub fn file_stamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y%m%d_%H%M%S")
        .to_string()
}
