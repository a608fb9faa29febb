use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use super::parameters::ParamType;

/// Pure-decimal segments are numeric identifiers.
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("a valid regex"));

/// Hex-only segments; identifier shapes are recognized by length below.
static HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]+$").expect("a valid regex"));

/// Hex lengths treated as identifiers: ObjectId (24) and the common digest
/// lengths MD5 (32), SHA-1 (40), SHA-256 (64).
const HEX_ID_LENGTHS: [usize; 4] = [24, 32, 40, 64];

/// Classifies one URL path segment.
///
/// Returns the parameter type when the segment is a dynamic identifier, or
/// `None` when it is a literal, static part of the path. The check is
/// deliberately conservative: a segment that merely looks like a word
/// (`"users"`, `"v2"`) is never parameterized, so semantically distinct
/// static routes are never collapsed.
///
/// The patterns are mutually exclusive and tested in order, first match wins:
///
/// 1. pure decimal → integer
/// 2. canonical hyphenated UUID → string
/// 3. 24 hex characters (object-id shape) → string
/// 4. 32/40/64 hex characters (hash digest shapes) → string
pub(crate) fn classify_segment(segment: &str) -> Option<ParamType> {
    if DECIMAL.is_match(segment) {
        return Some(ParamType::Integer);
    }
    if is_canonical_uuid(segment) {
        return Some(ParamType::String);
    }
    if HEX.is_match(segment) && HEX_ID_LENGTHS.contains(&segment.len()) {
        return Some(ParamType::String);
    }
    None
}

/// Canonical 8-4-4-4-12 form only; `uuid` also accepts braced, simple and
/// URN forms which must stay static here.
fn is_canonical_uuid(segment: &str) -> bool {
    segment.len() == 36 && Uuid::try_parse(segment).is_ok()
}
