//! Request validation for the `/v1/test` demonstration endpoint.
//!
//! Validation reports which constraint each field broke, as message keys.
//! Turning keys into reasons is left to the caller, which knows the locale.

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// A constraint a request field can violate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    NotNull,
    NotBlank,
    Email,
    Positive,
    PositiveOrZero,
    Negative,
    NegativeOrZero,
    Min,
    Max,
    Size,
    Pattern,
    Past,
    Future,
    FutureOrPresent,
    PastOrPresent,
    Digits,
    PhoneNumber,
}

impl Constraint {
    pub const ALL: [Constraint; 17] = [
        Constraint::NotNull,
        Constraint::NotBlank,
        Constraint::Email,
        Constraint::Positive,
        Constraint::PositiveOrZero,
        Constraint::Negative,
        Constraint::NegativeOrZero,
        Constraint::Min,
        Constraint::Max,
        Constraint::Size,
        Constraint::Pattern,
        Constraint::Past,
        Constraint::Future,
        Constraint::FutureOrPresent,
        Constraint::PastOrPresent,
        Constraint::Digits,
        Constraint::PhoneNumber,
    ];

    /// Bundle key of the violation reason.
    pub fn message_key(self) -> &'static str {
        match self {
            Constraint::NotNull => "validation-exception-not-null",
            Constraint::NotBlank => "validation-exception-not-blank",
            Constraint::Email => "validation-exception-email",
            Constraint::Positive => "validation-exception-positive",
            Constraint::PositiveOrZero => "validation-exception-positive-or-zero",
            Constraint::Negative => "validation-exception-negative",
            Constraint::NegativeOrZero => "validation-exception-negative-or-zero",
            Constraint::Min => "validation-exception-min",
            Constraint::Max => "validation-exception-max",
            Constraint::Size => "validation-exception-size",
            Constraint::Pattern => "validation-exception-pattern",
            Constraint::Past => "validation-exception-past",
            Constraint::Future => "validation-exception-future",
            Constraint::FutureOrPresent => "validation-exception-future-or-present",
            Constraint::PastOrPresent => "validation-exception-past-or-present",
            Constraint::Digits => "validation-exception-digits",
            Constraint::PhoneNumber => "validation-exception-phone-number",
        }
    }
}

/// Reason key for a request body that could not be read as JSON.
pub const UNREADABLE_BODY_KEY: &str = "validation-exception-unreadable-body";

/// Reason key for a missing or mistyped query parameter.
pub const INVALID_PARAMETER_KEY: &str = "validation-exception-invalid-parameter";

/// One broken constraint, before localization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    pub field: &'static str,
    pub constraint: Constraint,
    /// Positional arguments for the reason message (e.g., bounds)
    pub arguments: Vec<String>,
}

impl RuleViolation {
    fn new(field: &'static str, constraint: Constraint) -> Self {
        Self {
            field,
            constraint,
            arguments: Vec::new(),
        }
    }

    fn with_arguments(field: &'static str, constraint: Constraint, arguments: &[i64]) -> Self {
        Self {
            field,
            constraint,
            arguments: arguments.iter().map(ToString::to_string).collect(),
        }
    }
}

const RANGE_MIN: i64 = 10;
const RANGE_MAX: i64 = 100;
const SIZE_MIN: usize = 3;
const SIZE_MAX: usize = 10;
const DIGITS_INTEGER: usize = 5;
const DIGITS_FRACTION: usize = 2;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static ALPHANUMERIC_REGEX: OnceLock<Regex> = OnceLock::new();
static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*$").expect("Invalid email regex")
    })
}

fn alphanumeric_regex() -> &'static Regex {
    ALPHANUMERIC_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("Invalid pattern regex"))
}

fn phone_regex() -> &'static Regex {
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("Invalid phone regex"))
}

/// Body of `POST /v1/test`. Every field is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRequest {
    pub field_not_blank: Option<String>,
    pub field_email: Option<String>,
    pub field_positive: Option<i64>,
    pub field_positive_or_zero: Option<i64>,
    pub field_negative: Option<i64>,
    pub field_negative_or_zero: Option<i64>,
    pub field_range: Option<i64>,
    pub field_size: Option<String>,
    pub field_pattern: Option<String>,
    pub field_past: Option<NaiveDate>,
    pub field_future: Option<NaiveDate>,
    pub field_future_or_present: Option<NaiveDate>,
    pub field_past_or_present: Option<NaiveDate>,
    pub field_digits: Option<f64>,
    pub field_phone_number: Option<String>,
}

impl TestRequest {
    /// Check every field, in declaration order.
    ///
    /// `today` anchors the past/future checks. A missing `fieldNotBlank` is
    /// both null and blank, so it reports both constraints.
    pub fn validate(&self, today: NaiveDate) -> Vec<RuleViolation> {
        let mut violations = Vec::new();

        match self.field_not_blank.as_deref() {
            None => {
                violations.push(RuleViolation::new("fieldNotBlank", Constraint::NotNull));
                violations.push(RuleViolation::new("fieldNotBlank", Constraint::NotBlank));
            }
            Some(value) if value.trim().is_empty() => {
                violations.push(RuleViolation::new("fieldNotBlank", Constraint::NotBlank))
            }
            Some(_) => {}
        }

        check_string(&mut violations, "fieldEmail", &self.field_email, |value| {
            (!email_regex().is_match(value)).then(|| RuleViolation::new("fieldEmail", Constraint::Email))
        });

        check_number(&mut violations, "fieldPositive", self.field_positive, |value| {
            (value <= 0).then(|| RuleViolation::new("fieldPositive", Constraint::Positive))
        });

        check_number(&mut violations, "fieldPositiveOrZero", self.field_positive_or_zero, |value| {
            (value < 0).then(|| RuleViolation::new("fieldPositiveOrZero", Constraint::PositiveOrZero))
        });

        check_number(&mut violations, "fieldNegative", self.field_negative, |value| {
            (value >= 0).then(|| RuleViolation::new("fieldNegative", Constraint::Negative))
        });

        check_number(&mut violations, "fieldNegativeOrZero", self.field_negative_or_zero, |value| {
            (value > 0).then(|| RuleViolation::new("fieldNegativeOrZero", Constraint::NegativeOrZero))
        });

        check_number(&mut violations, "fieldRange", self.field_range, |value| {
            if value < RANGE_MIN {
                Some(RuleViolation::with_arguments("fieldRange", Constraint::Min, &[RANGE_MIN]))
            } else if value > RANGE_MAX {
                Some(RuleViolation::with_arguments("fieldRange", Constraint::Max, &[RANGE_MAX]))
            } else {
                None
            }
        });

        check_string(&mut violations, "fieldSize", &self.field_size, |value| {
            let len = value.chars().count();
            (!(SIZE_MIN..=SIZE_MAX).contains(&len)).then(|| {
                RuleViolation::with_arguments("fieldSize", Constraint::Size, &[SIZE_MIN as i64, SIZE_MAX as i64])
            })
        });

        check_string(&mut violations, "fieldPattern", &self.field_pattern, |value| {
            (!alphanumeric_regex().is_match(value)).then(|| RuleViolation::new("fieldPattern", Constraint::Pattern))
        });

        check_date(&mut violations, "fieldPast", self.field_past, |date| {
            (date >= today).then(|| RuleViolation::new("fieldPast", Constraint::Past))
        });

        check_date(&mut violations, "fieldFuture", self.field_future, |date| {
            (date <= today).then(|| RuleViolation::new("fieldFuture", Constraint::Future))
        });

        check_date(&mut violations, "fieldFutureOrPresent", self.field_future_or_present, |date| {
            (date < today).then(|| RuleViolation::new("fieldFutureOrPresent", Constraint::FutureOrPresent))
        });

        check_date(&mut violations, "fieldPastOrPresent", self.field_past_or_present, |date| {
            (date > today).then(|| RuleViolation::new("fieldPastOrPresent", Constraint::PastOrPresent))
        });

        check_decimal(&mut violations, "fieldDigits", self.field_digits, |value| {
            let (integer, fraction) = digit_counts(value);
            (integer > DIGITS_INTEGER || fraction > DIGITS_FRACTION).then(|| {
                RuleViolation::with_arguments(
                    "fieldDigits",
                    Constraint::Digits,
                    &[DIGITS_INTEGER as i64, DIGITS_FRACTION as i64],
                )
            })
        });

        check_string(&mut violations, "fieldPhoneNumber", &self.field_phone_number, |value| {
            (!phone_regex().is_match(value)).then(|| RuleViolation::new("fieldPhoneNumber", Constraint::PhoneNumber))
        });

        violations
    }
}

fn check_string<F>(violations: &mut Vec<RuleViolation>, field: &'static str, value: &Option<String>, rule: F)
where
    F: FnOnce(&str) -> Option<RuleViolation>,
{
    match value {
        None => violations.push(RuleViolation::new(field, Constraint::NotNull)),
        Some(value) => violations.extend(rule(value.as_str())),
    }
}

fn check_number<F>(violations: &mut Vec<RuleViolation>, field: &'static str, value: Option<i64>, rule: F)
where
    F: FnOnce(i64) -> Option<RuleViolation>,
{
    match value {
        None => violations.push(RuleViolation::new(field, Constraint::NotNull)),
        Some(value) => violations.extend(rule(value)),
    }
}

fn check_date<F>(violations: &mut Vec<RuleViolation>, field: &'static str, value: Option<NaiveDate>, rule: F)
where
    F: FnOnce(NaiveDate) -> Option<RuleViolation>,
{
    match value {
        None => violations.push(RuleViolation::new(field, Constraint::NotNull)),
        Some(value) => violations.extend(rule(value)),
    }
}

fn check_decimal<F>(violations: &mut Vec<RuleViolation>, field: &'static str, value: Option<f64>, rule: F)
where
    F: FnOnce(f64) -> Option<RuleViolation>,
{
    match value {
        None => violations.push(RuleViolation::new(field, Constraint::NotNull)),
        Some(value) => violations.extend(rule(value)),
    }
}

/// Count integer and fraction digits of a decimal as written in its shortest
/// form. Leading zeros of the integer part do not count.
fn digit_counts(value: f64) -> (usize, usize) {
    let text = value.abs().to_string();
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    (integer.trim_start_matches('0').len(), fraction.len())
}
