//! Error types for SenML operations

use thiserror::Error;

/// Result type alias for SenML operations
pub type Result<T> = std::result::Result<T, SenMLError>;

/// Errors that can occur while decoding or encoding SenML
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SenMLError {
    /// A numeric field (`t`, `s`, `v`, `bt`, `bv`) holds something that is not a number
    #[error("Malformed numeric field '{field}': {value}")]
    MalformedNumericField { field: String, value: String },

    /// Document decode was asked to take its base from an empty array
    #[error("cannot extract base from empty array")]
    EmptyBaseSource,

    /// A value could not be represented on the wire
    #[error("Cannot encode field '{field}': {message}")]
    ValueEncoding { field: String, message: String },

    /// Invalid field value
    #[error("Invalid value for field '{field}': {value}")]
    InvalidFieldValue { field: String, value: String },

    /// Invalid SenML structure or data
    #[error("Invalid SenML data: {message}")]
    InvalidData { message: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    /// Deserialization error
    #[error("Deserialization error: {message}")]
    DeserializationError { message: String },
}

impl SenMLError {
    /// Create a malformed numeric field error
    pub fn malformed_numeric<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        Self::MalformedNumericField {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a value encoding error
    pub fn value_encoding<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::ValueEncoding {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid field value error
    pub fn invalid_field_value<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a deserialization error
    pub fn deserialization<S: Into<String>>(message: S) -> Self {
        Self::DeserializationError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SenMLError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
        }
    }
}
