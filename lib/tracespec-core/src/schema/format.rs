use std::sync::LazyLock;

use jiff::Timestamp;
use jiff::civil;
use regex::Regex;

use super::node::StringFormat;

/// Cheap shape gate before the real timestamp parse.
static DATE_TIME_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}").expect("a valid regex"));

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("a valid regex"));

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("a valid regex"));

/// Detects a format shared by *all* sample strings.
///
/// Checks run in order of specificity: date-time, date, email, uri. One
/// non-matching sample disqualifies a format for the whole set.
pub(crate) fn detect_format(values: &[&str]) -> Option<StringFormat> {
    if values.is_empty() {
        return None;
    }
    if values.iter().all(|value| is_date_time(value)) {
        return Some(StringFormat::DateTime);
    }
    if values.iter().all(|value| is_date(value)) {
        return Some(StringFormat::Date);
    }
    if values.iter().all(|value| is_email(value)) {
        return Some(StringFormat::Email);
    }
    if values.iter().all(|value| is_uri(value)) {
        return Some(StringFormat::Uri);
    }
    None
}

/// Parseable as a timestamp with a time component, zoned or civil.
fn is_date_time(value: &str) -> bool {
    DATE_TIME_SHAPE.is_match(value)
        && (value.parse::<Timestamp>().is_ok() || value.parse::<civil::DateTime>().is_ok())
}

fn is_date(value: &str) -> bool {
    DATE_SHAPE.is_match(value) && value.parse::<civil::Date>().is_ok()
}

fn is_email(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value)
}

/// `Url::parse` only succeeds on absolute URIs, which is exactly the bar
/// here: relative references stay plain strings.
fn is_uri(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["2024-01-15T10:00:00Z"], Some(StringFormat::DateTime))]
    #[case(&["2024-01-15T10:00:00Z", "2023-12-31T23:59:59+01:00"], Some(StringFormat::DateTime))]
    #[case(&["2024-01-15T10:00:00"], Some(StringFormat::DateTime))]
    #[case(&["2024-01-15"], Some(StringFormat::Date))]
    #[case(&["2024-01-15", "1999-12-31"], Some(StringFormat::Date))]
    #[case(&["ada@example.com", "grace@example.org"], Some(StringFormat::Email))]
    #[case(&["https://example.com/a", "http://example.org"], Some(StringFormat::Uri))]
    #[case(&["hello", "world"], None)]
    #[case(&[], None)]
    fn should_detect_format(#[case] values: &[&str], #[case] expected: Option<StringFormat>) {
        assert_eq!(detect_format(values), expected);
    }

    #[test]
    fn should_require_all_samples_to_match() {
        assert_eq!(detect_format(&["2024-01-15", "not a date"]), None);
        assert_eq!(detect_format(&["ada@example.com", "not-an-email"]), None);
    }

    #[test]
    fn should_not_mix_date_and_date_time() {
        // A set containing both a bare date and a timestamp matches neither
        // format completely.
        assert_eq!(detect_format(&["2024-01-15", "2024-01-15T10:00:00Z"]), None);
    }

    #[rstest]
    #[case("2024-13-01")] // invalid month
    #[case("2024-02-30")] // invalid day
    fn should_reject_invalid_calendar_dates(#[case] value: &str) {
        assert_eq!(detect_format(&[value]), None);
    }

    #[test]
    fn should_treat_relative_references_as_plain_strings() {
        assert_eq!(detect_format(&["/users/42"]), None);
    }
}
