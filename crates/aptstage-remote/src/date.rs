use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::time::SystemTime;

// RFC 850 and ANSI C asctime() forms, both always GMT.
const RFC850_FORMAT: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Parse an HTTP date header value.
///
/// Accepts the IMF-fixdate form (`Sun, 06 Nov 1994 08:49:37 GMT`) and the two
/// obsolete forms HTTP/1.1 clients must still understand. Returns `None` for
/// anything else, including an empty value.
pub fn parse_http_date(value: &str) -> Option<SystemTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc).into());
    }
    [RFC850_FORMAT, ASCTIME_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive).into())
}
