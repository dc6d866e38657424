//! HTTP date handling for `If-Modified-Since` and `Last-Modified`.

use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, Utc};

// Sun, 06 Nov 1994 08:49:37 GMT
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
// Sunday, 06-Nov-94 08:49:37 GMT
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
// Sun Nov  6 08:49:37 1994
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Format `time` as an IMF-fixdate in GMT. Sub-second precision is dropped.
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(IMF_FIXDATE).to_string()
}

/// Parse any of the three HTTP date formats. Returns `None` for anything else.
pub fn parse_http_date(value: &str) -> Option<SystemTime> {
    let value = value.trim();

    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc).into());
    }

    [RFC_850, ASCTIME]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn reference_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777)
    }

    #[test]
    fn test_format_imf_fixdate() {
        assert_eq!(
            format_http_date(reference_time()),
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
    }

    #[test]
    fn test_format_drops_subseconds() {
        let time = reference_time() + Duration::from_millis(900);
        assert_eq!(format_http_date(time), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_parse_all_http_formats() {
        for value in [
            "Sun, 06 Nov 1994 08:49:37 GMT",
            "Sunday, 06-Nov-94 08:49:37 GMT",
            "Sun Nov  6 08:49:37 1994",
        ] {
            assert_eq!(parse_http_date(value), Some(reference_time()), "{value}");
        }
    }

    #[test]
    fn test_round_trip_of_formatted_date() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(parse_http_date(&format_http_date(time)), Some(time));
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert_eq!(parse_http_date("yesterday"), None);
        assert_eq!(parse_http_date(""), None);
    }
}
