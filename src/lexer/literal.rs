//! Classification of quoted literal content.

use crate::ast::Literal;
use regex::Regex;
use std::sync::LazyLock;

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern is valid")
});

static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}:[0-9]{2}(?::[0-9]{2}(?:\.[0-9]+)?)?$").expect("time pattern is valid")
});

static DATE_TIME_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}(?::[0-9]{2}(?:\.[0-9]+)?)?(?:Z|[+-][0-9]{2}:[0-9]{2})$",
    )
    .expect("date-time-offset pattern is valid")
});

/// Tags an un-escaped quoted string by its shape.
///
/// ISO 8601 dates, times of day and date-time-offsets become their own
/// literal types; nothing beyond the shape is checked, so `'2020-13-45'` is
/// still a date. Everything else is a plain string.
pub fn classify_string(value: String) -> Literal {
    if DATE.is_match(&value) {
        Literal::Date(value)
    } else if TIME_OF_DAY.is_match(&value) {
        Literal::TimeOfDay(value)
    } else if DATE_TIME_OFFSET.is_match(&value) {
        Literal::DateTimeOffset(value)
    } else {
        Literal::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_times_and_offsets() {
        assert_eq!(
            classify_string("1990-01-01".into()),
            Literal::Date("1990-01-01".into())
        );
        assert_eq!(
            classify_string("00:24:55.3454".into()),
            Literal::TimeOfDay("00:24:55.3454".into())
        );
        assert_eq!(
            classify_string("13:20".into()),
            Literal::TimeOfDay("13:20".into())
        );
        assert_eq!(
            classify_string("1900-01-01T00:24+12:00".into()),
            Literal::DateTimeOffset("1900-01-01T00:24+12:00".into())
        );
        assert_eq!(
            classify_string("2016-04-01T21:00:00-07:00".into()),
            Literal::DateTimeOffset("2016-04-01T21:00:00-07:00".into())
        );
        assert_eq!(
            classify_string("2016-04-01T21:00:00.123Z".into()),
            Literal::DateTimeOffset("2016-04-01T21:00:00.123Z".into())
        );
    }

    #[test]
    fn near_misses_stay_strings() {
        for text in ["1990-1-01", "2016-04-01T21:00", "24:5", "Jef", "", "1990-01-01 "] {
            assert_eq!(classify_string(text.into()), Literal::String(text.into()));
        }
    }
}
