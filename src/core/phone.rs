//! Phone number validation.
//!
//! Two formats are accepted, matched against the whole string:
//! `+` followed by 7 to 15 digits, or `DDD-DDD-DDDD`.

use regex::Regex;
use std::sync::LazyLock;

static INTERNATIONAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[0-9]{7,15}$").expect("Invalid regex"));

static GROUPED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$").expect("Invalid regex"));

/// Message reported when a phone number is rejected.
pub const INVALID_PHONE_MESSAGE: &str =
    "Phone format invalid. Expected +1234567890 or 123-456-7890.";

/// Returns true when `phone` is absent, empty, or matches one of the accepted formats.
#[must_use]
pub fn is_valid_phone(phone: Option<&str>) -> bool {
    match phone {
        None | Some("") => true,
        Some(value) => INTERNATIONAL_RE.is_match(value) || GROUPED_RE.is_match(value),
    }
}
