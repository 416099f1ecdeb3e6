use chrono::DateTime;

pub use web_time::Instant as AppInstant;

pub struct TimeUtils;

impl TimeUtils {
    pub const STANDARD_DATE_FORMAT: &str = "%Y-%m-%d";
    pub const STANDARD_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
}

/// Epoch seconds to a short UTC date string ("2024-03-01").
/// Out-of-range timestamps render as an empty string.
pub fn epoch_sec_to_date_string(epoch_sec: i64) -> String {
    DateTime::from_timestamp(epoch_sec, 0)
        .map(|dt| dt.format(TimeUtils::STANDARD_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

// Used for time-axis labels where intraday bars need the clock too
pub fn epoch_sec_to_date_time_string(epoch_sec: i64) -> String {
    DateTime::from_timestamp(epoch_sec, 0)
        .map(|dt| dt.format(TimeUtils::STANDARD_DATE_TIME_FORMAT).to_string())
        .unwrap_or_default()
}
