//! Fixed choices offered by the profile editors.

use std::fmt::{self, Display, Formatter};

use chrono::{Datelike, Local};

/// A stored value together with the label shown for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

impl Choice {
    const fn new(value: &'static str, label: &'static str) -> Self {
        Self { value, label }
    }
}

impl Display for Choice {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

pub const GENDERS: &[Choice] = &[
    Choice::new("male", "Male"),
    Choice::new("female", "Female"),
    Choice::new("other", "Other"),
];

pub const DOMICILE_COUNTRIES: &[Choice] = &[
    Choice::new("india", "India"),
    Choice::new("usa", "USA"),
    Choice::new("uk", "UK"),
];

pub const DOMICILE_STATES: &[Choice] = &[
    Choice::new("maharashtra", "Maharashtra"),
    Choice::new("delhi", "Delhi"),
    Choice::new("karnataka", "Karnataka"),
];

pub const EXPERIENCE_BRACKETS: &[Choice] = &[
    Choice::new("0-1", "0-1 years"),
    Choice::new("1-3", "1-3 years"),
    Choice::new("3-5", "3-5 years"),
    Choice::new("5+", "5+ years"),
];

/// Calling codes offered next to the phone number. The first one is the
/// default for numbers without a code.
pub const CALLING_CODES: &[Choice] = &[
    Choice::new("+91", "IND"),
    Choice::new("+1", "US"),
    Choice::new("+44", "GB"),
];

const YEARS_OF_BIRTH: i32 = 80;
const YEARS_OF_COMPLETION: i32 = 40;

/// The selectable years of birth, newest first.
pub fn years_of_birth() -> Vec<String> {
    years_back(Local::now().year(), YEARS_OF_BIRTH)
}

/// The selectable years of completion, newest first.
pub fn years_of_completion() -> Vec<String> {
    years_back(Local::now().year(), YEARS_OF_COMPLETION)
}

fn years_back(current_year: i32, count: i32) -> Vec<String> {
    (0..count)
        .map(|offset| (current_year - offset).to_string())
        .collect()
}

/// Look up the choice whose value is `value`.
pub fn find(choices: &'static [Choice], value: &str) -> Option<Choice> {
    choices.iter().copied().find(|choice| choice.value == value)
}

/// Label for a stored value, falling back to the raw value.
pub fn label_of<'a>(choices: &'static [Choice], value: &'a str) -> &'a str {
    match find(choices, value) {
        Some(choice) => choice.label,
        None => value,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_years_of_birth() {
        let years = years_back(2026, YEARS_OF_BIRTH);

        assert_eq!(years.len(), 80);
        assert_eq!(years.first().map(String::as_str), Some("2026"));
        assert_eq!(years.last().map(String::as_str), Some("1947"));
    }

    #[test]
    fn test_years_of_completion() {
        let years = years_of_completion();
        let current = Local::now().year().to_string();

        assert_eq!(years.len(), 40);
        assert_eq!(years.first(), Some(&current));
        assert_eq!(
            years_back(2026, YEARS_OF_COMPLETION).last().map(String::as_str),
            Some("1987")
        );
    }

    #[test]
    fn test_label_of() {
        assert_eq!(label_of(EXPERIENCE_BRACKETS, "5+"), "5+ years");
        assert_eq!(label_of(GENDERS, "unknown"), "unknown");
    }
}
