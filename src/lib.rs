pub mod aggregate;
pub mod api;
pub mod auth;
pub mod cell_record;
mod error;
pub mod settings;
pub mod user;

pub use cell_record::{CellRecord, DeviceSighting};
pub use error::{Error, Result};
pub use settings::Settings;
pub use user::User;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parses the ISO 8601 date strings carried by the stats query parameters.
/// A bare date is taken as midnight of that day.
pub fn parse_iso_datetime(s: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_datetime_accepts_date_and_datetime() {
        assert_eq!(
            parse_iso_datetime("2024-01-15").unwrap(),
            parse_iso_datetime("2024-01-15T00:00:00").unwrap()
        );
        assert_eq!(
            parse_iso_datetime("2024-01-15 10:30:00").unwrap(),
            parse_iso_datetime("2024-01-15T10:30:00").unwrap()
        );
        assert!(parse_iso_datetime("15 Jan 2024").is_err());
    }
}
