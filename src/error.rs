use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("End date {end} is before start date {start}.")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Unknown time zone '{0}'; expected an IANA name such as 'America/Chicago'.")]
    UnknownTimeZone(String),

    #[error("Schedule request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Schedule API returned HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Schedule response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}
