//! Declarative field validation for form payloads.
//!
//! Each registration variant declares a `&[FieldRule]` table. [`validate_rules`]
//! walks the whole table and collects one message per offending field, so a
//! client sees every problem in a single response.
//!
//! ```ignore
//! const RULES: &[FieldRule] = &[
//!     FieldRule::required("mobile", "Mobile").with(&[Check::MinDigits(10)]),
//!     FieldRule::required("pan_no", "PAN").with(&[Check::ExactLen(10)]),
//!     FieldRule::optional("email", "Email").with(&[Check::Email]),
//! ];
//! ```

use chrono::NaiveDate;
use validator::{ValidateEmail, ValidationError};

use crate::errors::FieldErrors;
use crate::forms::{FormData, parse_date};

/// Shape predicate applied to a non-blank value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    /// Only digits, at least `n` of them.
    MinDigits(usize),
    /// Exactly `n` characters.
    ExactLen(usize),
    MaxLen(usize),
    /// Parses as `YYYY-MM-DD`.
    Date,
    /// Parses as a date strictly before today.
    PastDate,
    /// Parses as a number greater than zero.
    Positive,
    /// Parses as a number that is zero or more.
    NonNegative,
    Email,
    /// Case-insensitive membership.
    OneOf(&'static [&'static str]),
}

impl Check {
    fn violation(&self, label: &str, value: &str, today: NaiveDate) -> Option<String> {
        match *self {
            Check::MinDigits(n) => {
                let ok = value.chars().all(|c| c.is_ascii_digit()) && value.len() >= n;
                (!ok).then(|| format!("{} must be at least {} digits", label, n))
            }
            Check::ExactLen(n) => (value.chars().count() != n)
                .then(|| format!("{} must be exactly {} characters", label, n)),
            Check::MaxLen(n) => (value.chars().count() > n)
                .then(|| format!("{} must be at most {} characters", label, n)),
            Check::Date => parse_date(value)
                .is_none()
                .then(|| format!("{} must be a valid date (YYYY-MM-DD)", label)),
            Check::PastDate => match parse_date(value) {
                None => Some(format!("{} must be a valid date (YYYY-MM-DD)", label)),
                Some(d) if d >= today => Some(format!("{} must be in the past", label)),
                Some(_) => None,
            },
            Check::Positive => match value.parse::<f64>() {
                Ok(n) if n > 0.0 && n.is_finite() => None,
                _ => Some(format!("{} must be a positive number", label)),
            },
            Check::NonNegative => match value.parse::<f64>() {
                Ok(n) if n >= 0.0 && n.is_finite() => None,
                _ => Some(format!("{} must be zero or more", label)),
            },
            Check::Email => (!value.validate_email())
                .then(|| format!("{} must be a valid email address", label)),
            Check::OneOf(options) => (!options.iter().any(|o| o.eq_ignore_ascii_case(value)))
                .then(|| format!("{} must be one of: {}", label, options.join(", "))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub checks: &'static [Check],
}

impl FieldRule {
    pub const fn required(field: &'static str, label: &'static str) -> Self {
        Self {
            field,
            label,
            required: true,
            checks: &[],
        }
    }

    pub const fn optional(field: &'static str, label: &'static str) -> Self {
        Self {
            field,
            label,
            required: false,
            checks: &[],
        }
    }

    pub const fn with(self, checks: &'static [Check]) -> Self {
        Self { checks, ..self }
    }

    /// First violation for this rule, if any.
    pub fn check(&self, form: &FormData, today: NaiveDate) -> Option<String> {
        match form.get(self.field) {
            None if self.required => Some(format!("{} is required", self.label)),
            None => None,
            Some(value) => self
                .checks
                .iter()
                .find_map(|c| c.violation(self.label, value, today)),
        }
    }
}

/// Runs every rule and aggregates all violations.
pub fn validate_rules(form: &FormData, rules: &[FieldRule], today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for rule in rules {
        if let Some(message) = rule.check(form, today) {
            errors.add(rule.field, message);
        }
    }
    errors
}

/// `#[validate(custom(function = "non_blank"))]` for JSON string fields:
/// empty and whitespace-only values are rejected.
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENDERS: &[&str] = &["Male", "Female", "Other"];

    const RULES: &[FieldRule] = &[
        FieldRule::required("centre_name", "Centre name"),
        FieldRule::required("mobile", "Mobile").with(&[Check::MinDigits(10)]),
        FieldRule::required("pan_no", "PAN").with(&[Check::ExactLen(10)]),
        FieldRule::required("dob", "Date of birth").with(&[Check::PastDate]),
        FieldRule::optional("email", "Email").with(&[Check::Email]),
        FieldRule::optional("gender", "Gender").with(&[Check::OneOf(GENDERS)]),
        FieldRule::optional("centre_area", "Centre area").with(&[Check::Positive]),
    ];

    #[test]
    fn non_blank_rejects_whitespace() {
        assert!(non_blank("").is_err());
        assert!(non_blank("  \t ").is_err());
        assert!(non_blank(" DTDC ").is_ok());
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = validate_rules(&FormData::new(), RULES, today());
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("centre_name"), Some("Centre name is required"));
        assert_eq!(errors.get("mobile"), Some("Mobile is required"));
        assert_eq!(errors.get("pan_no"), Some("PAN is required"));
        assert_eq!(errors.get("dob"), Some("Date of birth is required"));
        assert!(!errors.contains("email"));
    }

    #[test]
    fn shape_violations_are_aggregated() {
        let form = FormData::from_pairs([
            ("centreName", "Alpha"),
            ("mobile", "98765"),
            ("panNo", "ABCDE123"),
            ("dob", "2099-01-01"),
            ("email", "not-an-email"),
            ("gender", "unknown"),
            ("centreArea", "-4"),
        ]);
        let errors = validate_rules(&form, RULES, today());
        assert_eq!(errors.get("mobile"), Some("Mobile must be at least 10 digits"));
        assert_eq!(errors.get("pan_no"), Some("PAN must be exactly 10 characters"));
        assert_eq!(errors.get("dob"), Some("Date of birth must be in the past"));
        assert_eq!(errors.get("email"), Some("Email must be a valid email address"));
        assert_eq!(errors.get("gender"), Some("Gender must be one of: Male, Female, Other"));
        assert_eq!(errors.get("centre_area"), Some("Centre area must be a positive number"));
        assert!(!errors.contains("centre_name"));
    }

    #[test]
    fn valid_form_passes() {
        let form = FormData::from_pairs([
            ("centreName", "Alpha"),
            ("mobile", "9876543210"),
            ("panNo", "ABCDE1234F"),
            ("dob", "1990-05-12"),
            ("email", "owner@example.com"),
            ("gender", "male"),
        ]);
        assert!(validate_rules(&form, RULES, today()).is_empty());
    }

    #[test]
    fn invalid_required_date_is_reported() {
        let form = FormData::from_pairs([("dob", "12/05/1990")]);
        let errors = validate_rules(&form, RULES, today());
        assert_eq!(
            errors.get("dob"),
            Some("Date of birth must be a valid date (YYYY-MM-DD)")
        );
    }

    #[test]
    fn mobile_with_letters_fails_digit_check() {
        let rule = FieldRule::required("mobile", "Mobile").with(&[Check::MinDigits(10)]);
        let form = FormData::from_pairs([("mobile", "98765abcde1")]);
        assert!(rule.check(&form, today()).is_some());
    }

    #[test]
    fn today_is_not_in_the_past() {
        let rule = FieldRule::required("dob", "Date of birth").with(&[Check::PastDate]);
        let form = FormData::from_pairs([("dob", "2025-01-15")]);
        assert_eq!(
            rule.check(&form, today()),
            Some("Date of birth must be in the past".to_string())
        );
    }
}
