//! Wall-clock formatting in a fixed time zone.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// `YYYY-MM-DD hh:mm:ss AM/PM`.
pub const CLOCK_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";

/// Format an instant for the clock display.
pub fn format_clock<T: TimeZone>(now: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    now.format(CLOCK_FORMAT).to_string()
}

/// Parse an IANA zone name, falling back to UTC.
pub fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        warn!(timezone = name, "Unknown time zone, using UTC");
        Tz::UTC
    })
}

/// Current time in the given zone.
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}
