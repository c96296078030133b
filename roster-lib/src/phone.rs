//! Splitting stored phone numbers into calling code and subscriber number.
//!
//! Numbers are stored as one string, e.g. `+919876543210`. The editor shows
//! the calling code and the rest separately and glues them back together on
//! every keystroke. Known calling codes are matched first; anything else falls
//! back to a greedy `+` and up to three digits. Either way, rejoining an
//! untouched split gives back the input.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::options::CALLING_CODES;

static PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?\d{1,3}").expect("calling code pattern must compile"));

/// Calling code used when a number has none.
pub fn default_code() -> &'static str {
    CALLING_CODES.first().map_or("+91", |choice| choice.value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneParts {
    pub code: String,
    pub subscriber: String,
}

/// Length of the leading calling code, zero if there is none.
fn code_len(full: &str) -> usize {
    let known = CALLING_CODES
        .iter()
        .map(|choice| choice.value)
        .filter(|code| full.starts_with(code))
        .map(str::len)
        .max();

    match known {
        Some(len) => len,
        None => PREFIX.find(full).map_or(0, |m| m.end()),
    }
}

/// The subscriber part: everything after the leading code.
pub fn subscriber(full: &str) -> &str {
    full.get(code_len(full)..).unwrap_or_default()
}

/// The leading code as stored, without defaulting.
fn stored_code(full: &str) -> &str {
    full.get(..code_len(full)).unwrap_or_default()
}

pub fn split(full: &str) -> PhoneParts {
    let code = match stored_code(full) {
        "" => default_code(),
        code => code,
    };

    PhoneParts {
        code: code.to_string(),
        subscriber: subscriber(full).to_string(),
    }
}

/// Replace the subscriber part, keeping whatever code is already there.
pub fn with_subscriber(full: &str, new_subscriber: &str) -> String {
    let code = match stored_code(full) {
        "" => default_code(),
        code => code,
    };

    format!("{code}{new_subscriber}")
}

/// Replace the calling code, keeping the subscriber part.
pub fn with_code(full: &str, code: &str) -> String {
    format!("{code}{}", subscriber(full))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_trip() {
        let full = format!("{}{}", "+91", "9876543210");
        let parts = split(&full);

        assert_eq!(with_subscriber(&full, &parts.subscriber), full);
    }

    #[test]
    fn test_known_codes_win() {
        let parts = split("+919876543210");

        assert_eq!(parts.code, "+91");
        assert_eq!(parts.subscriber, "9876543210");
        assert_eq!(split("+15550100").code, "+1");
        assert_eq!(split("+1").subscriber, "");
    }

    #[test]
    fn test_unknown_codes_are_greedy() {
        // Up to three digits are taken as the code
        let parts = split("+4912345");

        assert_eq!(parts.code, "+491");
        assert_eq!(with_subscriber("+4912345", &parts.subscriber), "+4912345");
    }

    #[test]
    fn test_empty_defaults_to_india() {
        let parts = split("");

        assert_eq!(parts.code, "+91");
        assert_eq!(parts.subscriber, "");
        assert_eq!(with_subscriber("", "98765"), "+9198765");
    }

    #[test]
    fn test_with_code() {
        assert_eq!(with_code("+44", "+1"), "+1");
        assert_eq!(with_code("", "+44"), "+44");
    }
}
