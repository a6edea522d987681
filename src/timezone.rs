//! Resolves the configured timezone name into a UTC offset.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Look up the current UTC offset for a canonical timezone name such as
/// "Asia/Dhaka".
///
/// Returns `None` when the name is not a known timezone; callers surface
/// that as a configuration error.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

#[cfg(test)]
mod timezone_tests {
    use super::get_local_offset;

    #[test]
    fn resolves_known_timezones() {
        assert!(get_local_offset("Etc/UTC").is_some());
        assert!(get_local_offset("Asia/Dhaka").is_some());
    }

    #[test]
    fn rejects_unknown_timezones() {
        assert_eq!(get_local_offset("Not/AZone"), None);
    }
}
