//! SenML+JSON text helpers
//!
//! The codec itself works on parsed [`serde_json::Value`]s; these helpers
//! wrap the text step for callers that have a string or byte buffer.

use crate::{Document, Result, SenMLError};

/// Content-Type for SenML JSON format
pub const SENML_JSON_CONTENT_TYPE: &str = "application/senml+json";

/// CoAP Content-Format identifier for `application/senml+json`
pub const SENML_JSON_CONTENT_FORMAT: u16 = 110;

impl Document {
    /// Parse and decode a SenML+JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: serde_json::Value =
            serde_json::from_str(json).map_err(|e| SenMLError::deserialization(e.to_string()))?;
        Self::from_value(&raw)
    }

    /// Parse and decode SenML+JSON bytes
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let raw: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| SenMLError::deserialization(e.to_string()))?;
        Self::from_value(&raw)
    }

    /// Encode to compact SenML+JSON text
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value()?)?)
    }

    /// Encode to pretty-printed SenML+JSON text
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }
}

/// Check whether a Content-Type header names SenML+JSON
pub fn is_senml_json_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(SENML_JSON_CONTENT_TYPE))
}
