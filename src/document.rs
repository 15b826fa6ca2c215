//! SenML documents - ordered sequences of records sharing one base

use std::sync::Arc;

use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::Config;
use crate::{Measurement, Result, SenMLError};

/// A SenML document: the full JSON array of records
///
/// On decode the base is read from the `bn`, `bt`, `bu` and `bv` fields of
/// the first element, and every record holds a shared reference to it. On
/// encode the first record carries `bver` and the base fields again.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    measurements: Vec<Measurement>,
    base: Option<Arc<Measurement>>,
}

impl Document {
    /// Create a document from records.
    ///
    /// The document base is whatever base the first record carries.
    pub fn new(measurements: Vec<Measurement>) -> Self {
        let base = measurements.first().and_then(|m| m.base.clone());
        Self { measurements, base }
    }

    /// Create a document whose records all share `base`
    pub fn with_base<I>(base: Measurement, measurements: I) -> Self
    where
        I: IntoIterator<Item = Measurement>,
    {
        let base = Arc::new(base);
        let measurements = measurements
            .into_iter()
            .map(|m| m.with_base(Arc::clone(&base)))
            .collect();
        Self {
            measurements,
            base: Some(base),
        }
    }

    /// Decode a parsed SenML+JSON array.
    ///
    /// Fails with [`SenMLError::EmptyBaseSource`] on an empty array, since
    /// the base is taken from element 0. Any failing record fails the whole
    /// document.
    pub fn decode(items: &[JsonValue]) -> Result<Self> {
        let first = items.first().ok_or(SenMLError::EmptyBaseSource)?;
        let first = first.as_object().ok_or_else(|| {
            SenMLError::invalid_data(format!("expected a record object, got {first}"))
        })?;
        let base = Arc::new(Measurement::base_from_json(first)?);

        let measurements = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Measurement::decode_value(item, Some(Arc::clone(&base))).inspect_err(|e| {
                    debug!(index, error = %e, "failed to decode record");
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            records = measurements.len(),
            base_name = ?base.name,
            "decoded SenML document"
        );

        Ok(Self {
            measurements,
            base: Some(base),
        })
    }

    /// Decode a parsed JSON value that must be an array
    pub fn from_value(raw: &JsonValue) -> Result<Self> {
        match raw {
            JsonValue::Array(items) => Self::decode(items),
            other => Err(SenMLError::invalid_data(format!(
                "expected a SenML array, got {other}"
            ))),
        }
    }

    /// Encode with default options, see [`Document::encode_with`]
    pub fn encode(&self) -> Result<Vec<JsonValue>> {
        self.encode_with(&Config::default())
    }

    /// Encode as a SenML+JSON array.
    ///
    /// The first record is written together with `bver` and its base; the
    /// rest are written alone, in order. An empty document encodes to `[]`.
    pub fn encode_with(&self, config: &Config) -> Result<Vec<JsonValue>> {
        let out = self
            .measurements
            .iter()
            .enumerate()
            .map(|(index, m)| m.encode_with(index == 0, config).map(JsonValue::Object))
            .collect::<Result<Vec<_>>>()?;
        debug!(records = out.len(), "encoded SenML document");
        Ok(out)
    }

    /// Encode as a single JSON array value
    pub fn to_value(&self) -> Result<JsonValue> {
        self.encode().map(JsonValue::Array)
    }

    /// Every record merged with its base, in order
    pub fn resolved(&self) -> Vec<Measurement> {
        self.measurements.iter().map(Measurement::resolve).collect()
    }

    /// The shared base record, if any
    pub fn base(&self) -> Option<&Measurement> {
        self.base.as_deref()
    }

    /// The records, in wire order
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Take the records out of the document
    pub fn into_measurements(self) -> Vec<Measurement> {
        self.measurements
    }

    /// Append a record, attaching the document base to it.
    ///
    /// A first record pushed into a document without a base lends its own.
    pub fn push(&mut self, measurement: Measurement) {
        let measurement = match &self.base {
            Some(base) => measurement.with_base(Arc::clone(base)),
            None => {
                if self.measurements.is_empty() {
                    self.base = measurement.base.clone();
                }
                measurement
            }
        };
        self.measurements.push(measurement);
    }

    /// Get the number of records
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// Check if the document has no records
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Iterate over records
    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter()
    }
}

impl FromIterator<Measurement> for Document {
    fn from_iter<I: IntoIterator<Item = Measurement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Document {
    type Item = Measurement;
    type IntoIter = std::vec::IntoIter<Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.iter()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.encode()
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let items = Vec::<JsonValue>::deserialize(deserializer)?;
        Self::decode(&items).map_err(de::Error::custom)
    }
}
