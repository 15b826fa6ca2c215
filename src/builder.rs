//! Builder pattern for creating SenML documents

use crate::{Document, Measurement, Numeric, Value};

/// Builder for creating SenML documents with a fluent API
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    base_name: Option<String>,
    base_time: Option<Numeric>,
    base_unit: Option<String>,
    base_value: Option<Numeric>,
    records: Vec<Measurement>,
}

impl DocumentBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base name prepended to every record name
    pub fn base_name<S: Into<String>>(mut self, name: S) -> Self {
        self.base_name = Some(name.into());
        self
    }

    /// Set the base time added to every record time
    pub fn base_time<N: Into<Numeric>>(mut self, time: N) -> Self {
        self.base_time = Some(time.into());
        self
    }

    /// Set the unit used by records without one
    pub fn base_unit<S: Into<String>>(mut self, unit: S) -> Self {
        self.base_unit = Some(unit.into());
        self
    }

    /// Set the base value added to every numeric value
    pub fn base_value<N: Into<Numeric>>(mut self, value: N) -> Self {
        self.base_value = Some(value.into());
        self
    }

    /// Add a record with a numeric value
    pub fn add_value<S: Into<String>, N: Into<Numeric>>(mut self, name: S, value: N) -> Self {
        self.records
            .push(Measurement::new().with_name(name).with_value(value.into()));
        self
    }

    /// Add a record with a string value
    pub fn add_text<S: Into<String>, V: Into<String>>(mut self, name: S, value: V) -> Self {
        self.records
            .push(Measurement::new().with_name(name).with_value(Value::Text(value.into())));
        self
    }

    /// Add a record with a boolean value
    pub fn add_bool<S: Into<String>>(mut self, name: S, value: bool) -> Self {
        self.records
            .push(Measurement::new().with_name(name).with_value(value));
        self
    }

    /// Add a record with opaque data
    pub fn add_data<S: Into<String>>(mut self, name: S, data: Vec<u8>) -> Self {
        self.records
            .push(Measurement::new().with_name(name).with_value(data));
        self
    }

    /// Add a numeric measurement with timestamp
    pub fn add_measurement<S, N, T>(mut self, name: S, value: N, time: T) -> Self
    where
        S: Into<String>,
        N: Into<Numeric>,
        T: Into<Numeric>,
    {
        self.records.push(
            Measurement::new()
                .with_name(name)
                .with_value(value.into())
                .with_time(time),
        );
        self
    }

    /// Add an existing record
    pub fn add_record(mut self, record: Measurement) -> Self {
        self.records.push(record);
        self
    }

    /// Build the document; every record shares the configured base
    pub fn build(self) -> Document {
        let base = Measurement {
            name: self.base_name,
            time: self.base_time,
            unit: self.base_unit,
            value: self.base_value.map(Value::Numeric).unwrap_or_default(),
            ..Default::default()
        };
        Document::with_base(base, self.records)
    }
}
