//! SenML record values

use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::Value as JsonValue;

use crate::config::OpaqueEncoding;
use crate::{Numeric, Result, SenMLError};

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// The reading carried by a record.
///
/// On the wire each kind has its own key (`v`, `vb`, `vs`, `vd`), and a
/// record carries at most one of them.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Numeric value (`v`)
    Numeric(Numeric),
    /// Boolean value (`vb`)
    Boolean(bool),
    /// String value (`vs`)
    Text(String),
    /// Opaque data value (`vd`)
    Opaque(Vec<u8>),
    /// No value
    #[default]
    Absent,
}

impl Value {
    /// Whether no value is present
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// The numeric reading, if this is a numeric value
    pub fn as_numeric(&self) -> Option<Numeric> {
        match self {
            Value::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    /// Wire key this value is written under
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Value::Numeric(_) => Some("v"),
            Value::Boolean(_) => Some("vb"),
            Value::Text(_) => Some("vs"),
            Value::Opaque(_) => Some("vd"),
            Value::Absent => None,
        }
    }
}

/// Interpret a raw `vb` field.
///
/// Only `"false"` and `"0"` (after stringifying and case folding) are
/// false; anything else is true.
pub fn parse_boolean(raw: &JsonValue) -> bool {
    let folded = case_fold(&stringify(raw));
    !(folded == "false" || folded == "0")
}

// Lowercasing plus the folds that land on ASCII letters (long s -> s)
fn case_fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == '\u{17f}' { 's' } else { c })
        .collect()
}

/// Interpret a raw `vs` field, stringifying non-string scalars
pub fn parse_text(raw: &JsonValue) -> String {
    stringify(raw)
}

/// Interpret a raw `vd` field: an array of byte integers or a base64 string
pub fn parse_opaque(raw: &JsonValue) -> Result<Vec<u8>> {
    match raw {
        JsonValue::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| SenMLError::invalid_field_value("vd", item.to_string()))
            })
            .collect(),
        JsonValue::String(s) => URL_SAFE_LENIENT
            .decode(s)
            .or_else(|_| STANDARD_LENIENT.decode(s))
            .map_err(|e| SenMLError::invalid_field_value("vd", e.to_string())),
        other => Err(SenMLError::invalid_field_value("vd", other.to_string())),
    }
}

/// Wire form of an opaque value
pub fn opaque_to_json(data: &[u8], encoding: OpaqueEncoding) -> JsonValue {
    match encoding {
        OpaqueEncoding::ByteArray => JsonValue::Array(data.iter().map(|&b| b.into()).collect()),
        OpaqueEncoding::Base64Url => JsonValue::String(URL_SAFE_NO_PAD.encode(data)),
    }
}

fn stringify(raw: &JsonValue) -> String {
    match raw {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<Numeric> for Value {
    fn from(value: Numeric) -> Self {
        Value::Numeric(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Numeric(Numeric::Float(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Numeric(Numeric::Int(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Numeric(Numeric::Int(value.into()))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Opaque(value)
    }
}
