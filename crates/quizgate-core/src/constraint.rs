//! Constraint primitives.
//!
//! Each primitive inspects a single JSON value and either accepts it or
//! returns a [`RuleFailure`] naming the rule, the expected bound, and what was
//! actually found. Primitives are total: every input yields a verdict.

use std::fmt;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::is_valid_email;

/// Longest rendering of an offending value kept in a failure record.
const MAX_ACTUAL_CHARS: usize = 64;

/// The kind of rule a value failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    Type,
    LengthRange,
    EnumMembership,
    Format,
    IntegerRange,
    NumberRange,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Type => "type",
            RuleKind::LengthRange => "length_range",
            RuleKind::EnumMembership => "enum_membership",
            RuleKind::Format => "format",
            RuleKind::IntegerRange => "integer_range",
            RuleKind::NumberRange => "number_range",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed primitive check, before a field path is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFailure {
    /// Which rule failed.
    pub rule: RuleKind,
    /// The bound or shape that was expected, phrased to follow "must be".
    pub expected: String,
    /// What was found instead.
    pub actual: String,
}

impl RuleFailure {
    fn new(rule: RuleKind, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            rule,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    fn wrong_type(expected: &str, value: &Value) -> Self {
        Self::new(RuleKind::Type, expected, json_type_name(value))
    }
}

/// Text formats recognised by [`Constraint::Formatted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `local@domain.tld`-shaped address.
    Email,
    /// Hyphenated UUID text.
    Uuid,
    /// RFC 3339 timestamp.
    Timestamp,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Email => "email",
            Format::Uuid => "uuid",
            Format::Timestamp => "timestamp",
        }
    }

    fn matches(self, s: &str) -> bool {
        match self {
            Format::Email => is_valid_email(s),
            Format::Uuid => s.len() == 36 && uuid::Uuid::try_parse(s).is_ok(),
            Format::Timestamp => DateTime::parse_from_rfc3339(s).is_ok(),
        }
    }
}

/// An atomic check over one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// A string whose length in characters lies within the optional bounds.
    Text {
        min: Option<usize>,
        max: Option<usize>,
    },
    /// A string drawn from a closed set; matching is exact.
    OneOf(&'static [&'static str]),
    /// A whole number within the optional bounds.
    Integer { min: Option<i64>, max: Option<i64> },
    /// Any number within the inclusive bounds.
    Number { min: f64, max: f64 },
    /// A string in a recognised format.
    Formatted(Format),
    /// `true` or `false`.
    Boolean,
    /// Anything, including `null`.
    Any,
}

impl Constraint {
    /// Check `value`, returning it in canonical form when accepted.
    ///
    /// Integral floats such as `10.0` are canonicalised to integers so typed
    /// deserialization downstream sees the shape it expects.
    pub fn accept(&self, value: &Value) -> Result<Value, RuleFailure> {
        match *self {
            Constraint::Text { min, max } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| RuleFailure::wrong_type("a string", value))?;
                length_range(s, min, max)?;
                Ok(value.clone())
            }
            Constraint::OneOf(allowed) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| RuleFailure::wrong_type("a string", value))?;
                enum_membership(s, allowed)?;
                Ok(value.clone())
            }
            Constraint::Integer { min, max } => {
                let n = as_integer(value)?;
                integer_range(n, min, max)?;
                Ok(Value::from(n))
            }
            Constraint::Number { min, max } => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| RuleFailure::wrong_type("a number", value))?;
                number_range(n, min, max)?;
                Ok(value.clone())
            }
            Constraint::Formatted(format) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| RuleFailure::wrong_type("a string", value))?;
                matches_format(s, format)?;
                Ok(value.clone())
            }
            Constraint::Boolean => {
                if value.is_boolean() {
                    Ok(value.clone())
                } else {
                    Err(RuleFailure::wrong_type("a boolean", value))
                }
            }
            Constraint::Any => Ok(value.clone()),
        }
    }

    /// Check `value` without keeping the canonical form.
    pub fn check(&self, value: &Value) -> Result<(), RuleFailure> {
        self.accept(value).map(|_| ())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Constraint::Text { min, max } => {
                write!(f, "string, length {}", describe_bounds(min, max))
            }
            Constraint::OneOf(allowed) => write!(f, "one of {}", allowed.join(" | ")),
            Constraint::Integer { min, max } => {
                write!(f, "integer, range {}", describe_bounds(min, max))
            }
            Constraint::Number { min, max } => write!(f, "number, range {min}..={max}"),
            Constraint::Formatted(format) => write!(f, "string, format {}", format.as_str()),
            Constraint::Boolean => f.write_str("boolean"),
            Constraint::Any => f.write_str("any"),
        }
    }
}

/// Check that `s` has between `min` and `max` characters.
pub fn length_range(s: &str, min: Option<usize>, max: Option<usize>) -> Result<(), RuleFailure> {
    let len = s.chars().count();
    let too_short = min.is_some_and(|m| len < m);
    let too_long = max.is_some_and(|m| len > m);
    if too_short || too_long {
        let expected = match (min, max) {
            (Some(lo), Some(hi)) => format!("between {lo} and {hi} characters long"),
            (Some(lo), None) => format!("at least {lo} {} long", plural(lo, "character")),
            (None, Some(hi)) => format!("at most {hi} {} long", plural(hi, "character")),
            (None, None) => unreachable!("no bound can be violated"),
        };
        return Err(RuleFailure::new(
            RuleKind::LengthRange,
            expected,
            format!("{len} {}", plural(len, "character")),
        ));
    }
    Ok(())
}

/// Check that `s` is exactly one of `allowed`.
pub fn enum_membership(s: &str, allowed: &[&str]) -> Result<(), RuleFailure> {
    if allowed.contains(&s) {
        Ok(())
    } else {
        Err(RuleFailure::new(
            RuleKind::EnumMembership,
            format!("one of {}", allowed.join(", ")),
            quoted(s),
        ))
    }
}

/// Check that `n` lies within the optional bounds.
pub fn integer_range(n: i64, min: Option<i64>, max: Option<i64>) -> Result<(), RuleFailure> {
    let below = min.is_some_and(|m| n < m);
    let above = max.is_some_and(|m| n > m);
    if below || above {
        let expected = match (min, max) {
            (Some(lo), Some(hi)) => format!("an integer between {lo} and {hi}"),
            (Some(lo), None) => format!("an integer of at least {lo}"),
            (None, Some(hi)) => format!("an integer of at most {hi}"),
            (None, None) => unreachable!("no bound can be violated"),
        };
        return Err(RuleFailure::new(
            RuleKind::IntegerRange,
            expected,
            n.to_string(),
        ));
    }
    Ok(())
}

/// Check that `n` lies within `[min, max]`.
pub fn number_range(n: f64, min: f64, max: f64) -> Result<(), RuleFailure> {
    if n < min || n > max {
        return Err(RuleFailure::new(
            RuleKind::NumberRange,
            format!("a number between {min} and {max}"),
            n.to_string(),
        ));
    }
    Ok(())
}

/// Check that `s` is in the given format.
pub fn matches_format(s: &str, format: Format) -> Result<(), RuleFailure> {
    if format.matches(s) {
        Ok(())
    } else {
        Err(RuleFailure::new(
            RuleKind::Format,
            format!("a valid {}", format.as_str()),
            quoted(s),
        ))
    }
}

/// Name of a JSON value's type, as used in failure records.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a whole number, accepting integral floats such as `10.0`.
///
/// Whole numbers outside `i64` are range failures, not type failures.
fn as_integer(value: &Value) -> Result<i64, RuleFailure> {
    let Value::Number(num) = value else {
        return Err(RuleFailure::wrong_type("an integer", value));
    };
    if let Some(n) = num.as_i64() {
        return Ok(n);
    }

    let too_large = || {
        RuleFailure::new(
            RuleKind::IntegerRange,
            format!("an integer of at most {}", i64::MAX),
            num.to_string(),
        )
    };
    if num.is_u64() {
        return Err(too_large());
    }

    let f = num.as_f64().unwrap_or(f64::NAN);
    if f.fract() != 0.0 {
        return Err(RuleFailure::new(RuleKind::IntegerRange, "an integer", num.to_string()));
    }
    // 2^63 itself does not fit.
    if f >= i64::MAX as f64 {
        Err(too_large())
    } else if f < i64::MIN as f64 {
        Err(RuleFailure::new(
            RuleKind::IntegerRange,
            format!("an integer of at least {}", i64::MIN),
            num.to_string(),
        ))
    } else {
        Ok(f as i64)
    }
}

fn quoted(s: &str) -> String {
    if s.chars().count() > MAX_ACTUAL_CHARS {
        let head: String = s.chars().take(MAX_ACTUAL_CHARS).collect();
        format!("\"{head}...\"")
    } else {
        format!("\"{s}\"")
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

fn describe_bounds<T: fmt::Display>(min: Option<T>, max: Option<T>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => format!("{lo}..={hi}"),
        (Some(lo), None) => format!("{lo}.."),
        (None, Some(hi)) => format!("..={hi}"),
        (None, None) => "any".to_string(),
    }
}
