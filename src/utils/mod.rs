//! Utility functions and helpers for the MCP tool server.

pub mod logging;

use chrono::{DateTime, Utc};

/// Current time as an HTTP-date (RFC 7231 IMF-fixdate)
pub fn http_date() -> String {
    format_http_date(Utc::now())
}

/// Format a timestamp as an HTTP-date
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_http_date() {
        let time = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(format_http_date(time), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_http_date_shape() {
        let date = http_date();
        assert!(date.ends_with(" GMT"));
        assert_eq!(date.len(), 29);
    }
}
