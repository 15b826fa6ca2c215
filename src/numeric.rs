//! Numeric field handling
//!
//! SenML numbers arrive as JSON integers, JSON floats, or (from sloppy
//! producers) JSON strings such as `"1491918634"`. Everything numeric in a
//! record is carried as a [`Numeric`], which remembers whether it is an
//! integer or a float so that output stays type-stable: a number with no
//! fractional part is written as an integer.

use std::fmt;
use std::ops::Add;

use serde_json::{Number, Value as JsonValue};

use crate::{Result, SenMLError};

/// An integer or floating-point SenML number
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    /// Integer value
    Int(i64),
    /// Floating-point value
    Float(f64),
}

impl Numeric {
    /// The value as `f64`
    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    /// Canonical form: a float without a fractional part becomes an integer.
    ///
    /// Idempotent, and integers are returned unchanged.
    pub fn normalize(self) -> Self {
        match self {
            Numeric::Float(f) if is_integral(f) => Numeric::Int(f as i64),
            other => other,
        }
    }

    /// Parse a numeric string into its canonical form.
    ///
    /// `field` only names the field in the error.
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Ok(Numeric::Int(i));
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Numeric::Float(f).normalize()),
            _ => Err(SenMLError::malformed_numeric(field, raw)),
        }
    }

    /// Read a numeric field from decoded JSON.
    ///
    /// `null` is treated as absent. Native JSON numbers pass through with
    /// their own integer/float kind; strings are parsed and canonicalized.
    pub fn from_json(field: &str, raw: &JsonValue) -> Result<Option<Self>> {
        match raw {
            JsonValue::Null => Ok(None),
            JsonValue::Number(n) => Ok(Some(Self::from_number(n))),
            JsonValue::String(s) => Self::parse(field, s).map(Some),
            other => Err(SenMLError::malformed_numeric(field, other.to_string())),
        }
    }

    fn from_number(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            Numeric::Int(i)
        } else if let Some(u) = n.as_u64() {
            Numeric::Float(u as f64)
        } else {
            // Without arbitrary_precision every Number fits one of the three
            Numeric::Float(n.as_f64().unwrap_or_default())
        }
    }

    /// Wire form for record fields (`t`, `s`, `v`), after normalization
    pub fn to_json(self, field: &str) -> Result<JsonValue> {
        match self.normalize() {
            Numeric::Int(i) => Ok(JsonValue::from(i)),
            Numeric::Float(f) => float_to_json(field, f),
        }
    }

    /// Wire form for base fields (`bt`, `bv`), which are always floats
    pub fn to_json_float(self, field: &str) -> Result<JsonValue> {
        float_to_json(field, self.as_f64())
    }
}

fn is_integral(f: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn float_to_json(field: &str, f: f64) -> Result<JsonValue> {
    Number::from_f64(f)
        .map(JsonValue::Number)
        .ok_or_else(|| SenMLError::value_encoding(field, format!("{f} is not a finite number")))
}

/// Canonicalize a number, see [`Numeric::normalize`]
pub fn normalize(value: Numeric) -> Numeric {
    value.normalize()
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::Int(0)
    }
}

impl Add for Numeric {
    type Output = Numeric;

    fn add(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Int(a), Numeric::Int(b)) => a
                .checked_add(b)
                .map(Numeric::Int)
                .unwrap_or(Numeric::Float(a as f64 + b as f64)),
            (a, b) => Numeric::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(i) => write!(f, "{i}"),
            Numeric::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Int(value)
    }
}

impl From<i32> for Numeric {
    fn from(value: i32) -> Self {
        Numeric::Int(value.into())
    }
}

impl From<u32> for Numeric {
    fn from(value: u32) -> Self {
        Numeric::Int(value.into())
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Float(value)
    }
}
