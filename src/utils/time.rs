use chrono::{DateTime, Local, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// `YYYY-MM-DD-HH-MM-SS` in local time, as embedded in export file names.
pub fn file_timestamp(dt: DateTime<Local>) -> String {
    dt.format("%Y-%m-%d-%H-%M-%S").to_string()
}
