use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

/// Upper bound on distinct values remembered per parameter.
///
/// High-cardinality parameters (cursors, timestamps, signatures) would
/// otherwise grow without bound; once the cap is reached the descriptor stops
/// collecting but keeps everything gathered so far.
pub(crate) const OBSERVED_VALUE_CAP: usize = 20;

/// Headers tracked as endpoint parameters besides the generic `X-` prefix.
const TRACKED_HEADERS: [&str; 8] = [
    "Authorization",
    "X-API-Key",
    "Accept",
    "Content-Type",
    "User-Agent",
    "X-Requested-With",
    "X-Forwarded-For",
    "X-Real-IP",
];

/// Headers marked required by convention.
const REQUIRED_HEADERS: [&str; 3] = ["authorization", "x-api-key", "content-type"];

/// Long base64-like values (≥20 chars of the base64 alphabet, optional `=`
/// padding) carry no documentation value and may leak credentials.
static BASE64_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/]{20,}={0,2}$").expect("a valid regex"));

/// Inferred scalar type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ParamType {
    /// Free-form text.
    #[display("string")]
    String,
    /// Whole number.
    #[display("integer")]
    Integer,
    /// Decimal number.
    #[display("number")]
    Number,
    /// `true` or `false`.
    #[display("boolean")]
    Boolean,
}

impl ParamType {
    /// Infers a type from one observed textual value by attempting integer,
    /// then decimal, then boolean parsing; anything else is a string.
    pub fn infer(value: &str) -> Self {
        if value.parse::<i64>().is_ok() {
            Self::Integer
        } else if value.parse::<f64>().is_ok() {
            Self::Number
        } else if value.parse::<bool>().is_ok() {
            Self::Boolean
        } else {
            Self::String
        }
    }
}

/// Where a parameter was observed on an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ParamLocation {
    /// Path template placeholder.
    #[display("path")]
    Path,
    /// URL query component.
    #[display("query")]
    Query,
    /// Request header.
    #[display("header")]
    Header,
}

/// One merged parameter observation on an endpoint.
///
/// A single descriptor exists per distinct parameter name within one
/// endpoint; repeated observations accumulate into it. The type is fixed by
/// the first observation — later values never re-infer it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// Parameter name as it appears in the template, query or header.
    pub name: String,
    /// Inferred scalar type.
    pub param_type: ParamType,
    /// Whether every call must carry the parameter.
    pub required: bool,
    example: Option<String>,
    observed: IndexSet<String>,
}

impl ParameterDescriptor {
    pub(crate) fn new(name: impl Into<String>, param_type: ParamType, required: bool) -> Self {
        Self {
            name: name.into(),
            param_type,
            required,
            example: None,
            observed: IndexSet::new(),
        }
    }

    /// Records one observed value, subject to the distinct-value cap.
    pub(crate) fn observe(&mut self, value: &str) {
        if self.example.is_none() {
            self.example = Some(value.to_string());
        }
        if self.observed.len() < OBSERVED_VALUE_CAP {
            self.observed.insert(value.to_string());
        }
    }

    /// First observed value, kept as the documentation example.
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    /// Distinct observed values, in first-seen order.
    pub fn observed_values(&self) -> impl Iterator<Item = &str> {
        self.observed.iter().map(String::as_str)
    }
}

/// Returns the canonical parameter name for a tracked request header, or
/// `None` when the header is not tracked.
///
/// Tracked headers are the fixed allow-list plus anything with an `X-`
/// prefix; everything else (cookies, caching, transport plumbing) is noise
/// for API documentation purposes.
pub(crate) fn tracked_header_name(name: &str) -> Option<String> {
    if let Some(canonical) = TRACKED_HEADERS
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(name))
    {
        return Some((*canonical).to_string());
    }
    let lower = name.to_ascii_lowercase();
    lower.starts_with("x-").then_some(lower)
}

/// Whether a tracked header is required by convention.
pub(crate) fn header_required(name: &str) -> bool {
    REQUIRED_HEADERS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name))
}

/// Replaces credential-bearing header values with stable placeholders.
pub(crate) fn sanitize_header_value(value: &str) -> String {
    if value.starts_with("Bearer ") {
        return "Bearer <token>".to_string();
    }
    if value.starts_with("Basic ") {
        return "Basic <credentials>".to_string();
    }
    if BASE64_LIKE.is_match(value) {
        return "<encoded_value>".to_string();
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", ParamType::Integer)]
    #[case("-7", ParamType::Integer)]
    #[case("3.25", ParamType::Number)]
    #[case("true", ParamType::Boolean)]
    #[case("false", ParamType::Boolean)]
    #[case("hello", ParamType::String)]
    #[case("2024-01-15", ParamType::String)]
    #[case("", ParamType::String)]
    fn should_infer_param_type(#[case] value: &str, #[case] expected: ParamType) {
        assert_eq!(ParamType::infer(value), expected);
    }

    #[test]
    fn should_keep_first_observation_as_example() {
        let mut descriptor = ParameterDescriptor::new("page", ParamType::Integer, false);
        descriptor.observe("1");
        descriptor.observe("2");

        assert_eq!(descriptor.example(), Some("1"));
        let values: Vec<_> = descriptor.observed_values().collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn should_cap_observed_values() {
        let mut descriptor = ParameterDescriptor::new("cursor", ParamType::String, false);
        for index in 0..(OBSERVED_VALUE_CAP + 10) {
            descriptor.observe(&format!("value-{index}"));
        }

        assert_eq!(descriptor.observed_values().count(), OBSERVED_VALUE_CAP);
        // The descriptor survives the cap; only collection stops.
        assert_eq!(descriptor.example(), Some("value-0"));
    }

    #[test]
    fn should_not_count_duplicates_against_the_cap() {
        let mut descriptor = ParameterDescriptor::new("sort", ParamType::String, false);
        for _ in 0..100 {
            descriptor.observe("name");
        }

        assert_eq!(descriptor.observed_values().count(), 1);
    }

    #[rstest]
    #[case("Authorization", Some("Authorization"))]
    #[case("authorization", Some("Authorization"))]
    #[case("X-API-Key", Some("X-API-Key"))]
    #[case("content-type", Some("Content-Type"))]
    #[case("X-Custom-Header", Some("x-custom-header"))]
    #[case("x-trace-id", Some("x-trace-id"))]
    #[case("Cookie", None)]
    #[case("Cache-Control", None)]
    fn should_track_headers(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(tracked_header_name(name).as_deref(), expected);
    }

    #[rstest]
    #[case("Authorization", true)]
    #[case("X-API-Key", true)]
    #[case("Content-Type", true)]
    #[case("Accept", false)]
    #[case("x-trace-id", false)]
    fn should_mark_required_headers(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(header_required(name), expected);
    }

    #[rstest]
    #[case("Bearer eyJhbGciOiJIUzI1NiJ9.payload.sig", "Bearer <token>")]
    #[case("Basic dXNlcjpwYXNzd29yZA==", "Basic <credentials>")]
    #[case("dGhpc2lzYXZlcnlsb25nYjY0dmFsdWU=", "<encoded_value>")]
    #[case("application/json", "application/json")]
    #[case("short", "short")]
    fn should_sanitize_header_values(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(sanitize_header_value(value), expected);
    }
}
