//! SenML records

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use time::OffsetDateTime;
use tracing::trace;

use crate::config::Config;
use crate::value::{opaque_to_json, parse_boolean, parse_opaque, parse_text};
use crate::{Numeric, Result, SenMLError, Value};

/// Times below this many seconds are relative to "now" (RFC 8428 section 4.5.3)
pub const RELATIVE_TIME_THRESHOLD: f64 = 268_435_456.0; // 2^28

/// A single SenML record
///
/// A record decoded from a document keeps a shared, read-only reference to
/// the document's base record. The base is not merged into the record's own
/// fields; use [`Measurement::resolve`] or [`Measurement::to_absolute`] for
/// the merged view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measurement {
    /// Name - identifies the sensor or parameter
    pub name: Option<String>,

    /// Time - absolute or relative to the base time, in seconds
    pub time: Option<Numeric>,

    /// Unit - SenML unit registry code
    pub unit: Option<String>,

    /// The reading
    pub value: Value,

    /// Sum - integrated value over time
    pub sum: Option<Numeric>,

    /// Base record shared with the rest of the document
    pub base: Option<Arc<Measurement>>,
}

impl Measurement {
    /// Create a new empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name of this record
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the timestamp for this record
    pub fn with_time<N: Into<Numeric>>(mut self, time: N) -> Self {
        self.time = Some(time.into());
        self
    }

    /// Set the unit for this record
    pub fn with_unit<S: Into<String>>(mut self, unit: S) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the value for this record
    pub fn with_value<V: Into<Value>>(mut self, value: V) -> Self {
        self.value = value.into();
        self
    }

    /// Set the sum for this record
    pub fn with_sum<N: Into<Numeric>>(mut self, sum: N) -> Self {
        self.sum = Some(sum.into());
        self
    }

    /// Attach a shared base record
    pub fn with_base(mut self, base: Arc<Measurement>) -> Self {
        self.base = Some(base);
        self
    }

    /// Decode one SenML+JSON object.
    ///
    /// The value is taken from the first of `v`, `vs`, `vb`, `vd` that is
    /// present. `base` is stored as given, not merged.
    pub fn decode(object: &Map<String, JsonValue>, base: Option<Arc<Measurement>>) -> Result<Self> {
        let measurement = Self {
            name: string_field(object, "n")?,
            time: numeric_field(object, "t")?,
            unit: string_field(object, "u")?,
            value: decode_value(object)?,
            sum: numeric_field(object, "s")?,
            base,
        };
        trace!(
            name = ?measurement.name,
            kind = ?measurement.value.key(),
            "decoded record"
        );
        Ok(measurement)
    }

    /// Decode a JSON value that must be an object
    pub fn decode_value(raw: &JsonValue, base: Option<Arc<Measurement>>) -> Result<Self> {
        match raw {
            JsonValue::Object(object) => Self::decode(object, base),
            other => Err(SenMLError::invalid_data(format!(
                "expected a record object, got {other}"
            ))),
        }
    }

    /// Build a base record from the `bn`, `bt`, `bu` and `bv` fields of an object
    pub fn base_from_json(object: &Map<String, JsonValue>) -> Result<Self> {
        let value = match numeric_field(object, "bv")? {
            Some(n) => Value::Numeric(n),
            None => Value::Absent,
        };
        Ok(Self {
            name: string_field(object, "bn")?,
            time: numeric_field(object, "bt")?,
            unit: string_field(object, "bu")?,
            value,
            sum: None,
            base: None,
        })
    }

    /// Encode this record with default options, see [`Measurement::encode_with`]
    pub fn encode(&self, include_base: bool) -> Result<Map<String, JsonValue>> {
        self.encode_with(include_base, &Config::default())
    }

    /// Encode this record as a SenML+JSON object.
    ///
    /// Absent fields are omitted. With `include_base`, `bver` and the
    /// attached base's fields are written ahead of the record's own.
    pub fn encode_with(&self, include_base: bool, config: &Config) -> Result<Map<String, JsonValue>> {
        let mut out = Map::new();

        if include_base {
            out.insert("bver".into(), config.version.into());
            if let Some(base) = &self.base {
                base.encode_base_fields(&mut out)?;
            }
        }

        if let Some(name) = &self.name {
            out.insert("n".into(), name.clone().into());
        }
        if let Some(time) = self.time {
            out.insert("t".into(), time.to_json("t")?);
        }
        if let Some(unit) = &self.unit {
            out.insert("u".into(), unit.clone().into());
        }
        if let Some(sum) = self.sum {
            out.insert("s".into(), sum.to_json("s")?);
        }

        match &self.value {
            Value::Boolean(b) => {
                out.insert("vb".into(), (*b).into());
            }
            Value::Opaque(data) => {
                out.insert("vd".into(), opaque_to_json(data, config.opaque));
            }
            Value::Text(s) => {
                out.insert("vs".into(), s.clone().into());
            }
            Value::Numeric(n) => {
                out.insert("v".into(), n.to_json("v")?);
            }
            Value::Absent => {}
        }

        Ok(out)
    }

    // Base numbers are always written as floats
    fn encode_base_fields(&self, out: &mut Map<String, JsonValue>) -> Result<()> {
        if let Some(name) = &self.name {
            out.insert("bn".into(), name.clone().into());
        }
        if let Some(time) = self.time {
            out.insert("bt".into(), time.to_json_float("bt")?);
        }
        if let Some(unit) = &self.unit {
            out.insert("bu".into(), unit.clone().into());
        }
        match &self.value {
            Value::Numeric(n) => {
                out.insert("bv".into(), n.to_json_float("bv")?);
            }
            Value::Absent => {}
            other => {
                return Err(SenMLError::value_encoding(
                    "bv",
                    format!("base value must be numeric, got {other:?}"),
                ));
            }
        }
        Ok(())
    }

    /// Merge `base` into this record, producing a new fully resolved record.
    ///
    /// Names are concatenated and times added, with absent parts counting as
    /// `""` and `0`, so the result always has a name and a time. A numeric or
    /// absent value is offset by the base value and is never absent in the
    /// result. Boolean, text and opaque values pass through untouched. The
    /// sum is the record's own; the base sum does not take part.
    pub fn to_absolute(&self, base: &Measurement) -> Measurement {
        let name = format!(
            "{}{}",
            base.name.as_deref().unwrap_or_default(),
            self.name.as_deref().unwrap_or_default()
        );
        let time = base.time.unwrap_or_default() + self.time.unwrap_or_default();
        let offset = base.value.as_numeric().unwrap_or_default();

        let value = match &self.value {
            Value::Numeric(n) => Value::Numeric(offset + *n),
            Value::Absent => Value::Numeric(offset + Numeric::default()),
            other => other.clone(),
        };

        Measurement {
            name: Some(name),
            time: Some(time),
            unit: self.unit.clone().or_else(|| base.unit.clone()),
            value,
            sum: self.sum,
            base: None,
        }
    }

    /// Resolve against the attached base, or an empty base if none is attached
    pub fn resolve(&self) -> Measurement {
        match &self.base {
            Some(base) => self.to_absolute(base),
            None => self.to_absolute(&Measurement::default()),
        }
    }

    /// The record time as a UTC timestamp, if it is absolute.
    ///
    /// Call this on a resolved record; relative times yield `None`.
    pub fn datetime(&self) -> Option<OffsetDateTime> {
        let seconds = self.time?.as_f64();
        if !seconds.is_finite() || seconds < RELATIVE_TIME_THRESHOLD {
            return None;
        }
        OffsetDateTime::from_unix_timestamp_nanos((seconds * 1e9) as i128).ok()
    }
}

fn field<'a>(object: &'a Map<String, JsonValue>, key: &str) -> Option<&'a JsonValue> {
    object.get(key).filter(|raw| !raw.is_null())
}

fn string_field(object: &Map<String, JsonValue>, key: &str) -> Result<Option<String>> {
    match field(object, key) {
        None => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(raw @ (JsonValue::Number(_) | JsonValue::Bool(_))) => Ok(Some(raw.to_string())),
        Some(other) => Err(SenMLError::invalid_field_value(key, other.to_string())),
    }
}

fn numeric_field(object: &Map<String, JsonValue>, key: &str) -> Result<Option<Numeric>> {
    match field(object, key) {
        None => Ok(None),
        Some(raw) => Numeric::from_json(key, raw),
    }
}

fn decode_value(object: &Map<String, JsonValue>) -> Result<Value> {
    if let Some(n) = numeric_field(object, "v")? {
        return Ok(Value::Numeric(n));
    }
    if let Some(raw) = field(object, "vs") {
        return Ok(Value::Text(parse_text(raw)));
    }
    if let Some(raw) = field(object, "vb") {
        return Ok(Value::Boolean(parse_boolean(raw)));
    }
    if let Some(raw) = field(object, "vd") {
        return parse_opaque(raw).map(Value::Opaque);
    }
    Ok(Value::Absent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(raw: JsonValue) -> Map<String, JsonValue> {
        match raw {
            JsonValue::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn decode(raw: JsonValue) -> Measurement {
        Measurement::decode(&object(raw), None).unwrap()
    }

    #[test]
    fn test_decode_record_fields() {
        let m = decode(json!({"n": "fwd", "v": 17.666544, "s": 3, "t": 0, "u": "1/min"}));
        assert_eq!(m.name.as_deref(), Some("fwd"));
        assert_eq!(m.value, Value::Numeric(Numeric::Float(17.666544)));
        assert_eq!(m.sum, Some(Numeric::Int(3)));
        assert_eq!(m.time, Some(Numeric::Int(0)));
        assert_eq!(m.unit.as_deref(), Some("1/min"));
        assert!(m.base.is_none());
    }

    #[test]
    fn test_decode_ignores_base_fields() {
        let m = decode(json!({"bn": "dev/", "bt": 10, "n": "x"}));
        assert_eq!(m.name.as_deref(), Some("x"));
        assert_eq!(m.time, None);
    }

    #[test]
    fn test_decode_string_numbers() {
        let m = decode(json!({"t": "1491918634", "s": "2.5", "v": "17.0"}));
        assert_eq!(m.time, Some(Numeric::Int(1491918634)));
        assert_eq!(m.sum, Some(Numeric::Float(2.5)));
        assert_eq!(m.value, Value::Numeric(Numeric::Int(17)));
    }

    #[test]
    fn test_decode_malformed_numeric_fails() {
        for raw in [json!({"t": "noon"}), json!({"s": "x"}), json!({"v": "1.2.3"})] {
            let err = Measurement::decode(&object(raw), None).unwrap_err();
            assert!(matches!(err, SenMLError::MalformedNumericField { .. }));
        }
    }

    #[test]
    fn test_value_priority() {
        let m = decode(json!({"v": 1, "vs": "a", "vb": true, "vd": [1]}));
        assert_eq!(m.value, Value::Numeric(Numeric::Int(1)));

        let m = decode(json!({"vs": "a", "vb": true, "vd": [1]}));
        assert_eq!(m.value, Value::Text("a".into()));

        let m = decode(json!({"vb": "0", "vd": [1]}));
        assert_eq!(m.value, Value::Boolean(false));

        let m = decode(json!({"vd": [1, 2]}));
        assert_eq!(m.value, Value::Opaque(vec![1, 2]));

        let m = decode(json!({"n": "nothing"}));
        assert_eq!(m.value, Value::Absent);
    }

    #[test]
    fn test_null_value_falls_through() {
        let m = decode(json!({"v": null, "vs": "fallback"}));
        assert_eq!(m.value, Value::Text("fallback".into()));
    }

    #[test]
    fn test_boolean_parsing() {
        assert_eq!(decode(json!({"vb": "FALSE"})).value, Value::Boolean(false));
        assert_eq!(decode(json!({"vb": "0"})).value, Value::Boolean(false));
        assert_eq!(decode(json!({"vb": "yes"})).value, Value::Boolean(true));
        assert_eq!(decode(json!({"vb": true})).value, Value::Boolean(true));
        assert_eq!(decode(json!({"vb": false})).value, Value::Boolean(false));
        assert_eq!(decode(json!({"vb": "FALſE"})).value, Value::Boolean(false));
    }

    #[test]
    fn test_numeric_looking_text_stays_text() {
        let m = decode(json!({"vs": "123"}));
        assert_eq!(m.value, Value::Text("123".into()));
        assert_eq!(JsonValue::Object(m.encode(false).unwrap()), json!({"vs": "123"}));
    }

    #[test]
    fn test_decode_rejects_structured_name() {
        let err = Measurement::decode(&object(json!({"n": ["a"]})), None).unwrap_err();
        assert!(matches!(err, SenMLError::InvalidFieldValue { ref field, .. } if field == "n"));
    }

    #[test]
    fn test_decode_value_requires_object() {
        assert!(matches!(
            Measurement::decode_value(&json!([1, 2]), None),
            Err(SenMLError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_base_from_json() {
        let base = Measurement::base_from_json(&object(json!({
            "bn": "urn:dev:mac:0b92569229fc9e68/rpm/",
            "bt": "1491918634",
            "bu": "1/min",
            "n": "fwd",
            "v": 3
        })))
        .unwrap();
        assert_eq!(base.name.as_deref(), Some("urn:dev:mac:0b92569229fc9e68/rpm/"));
        assert_eq!(base.time, Some(Numeric::Int(1491918634)));
        assert_eq!(base.unit.as_deref(), Some("1/min"));
        assert_eq!(base.value, Value::Absent);
        assert_eq!(base.sum, None);
    }

    #[test]
    fn test_base_from_json_malformed_base_value() {
        let err = Measurement::base_from_json(&object(json!({"bv": "warm"}))).unwrap_err();
        assert_eq!(err, SenMLError::malformed_numeric("bv", "warm"));
    }

    #[test]
    fn test_encode_omits_absent_fields() {
        let m = decode(json!({"n": "rev", "v": 123.456, "s": 4, "t": 0}));
        assert_eq!(
            JsonValue::Object(m.encode(false).unwrap()),
            json!({"n": "rev", "v": 123.456, "s": 4, "t": 0})
        );
        assert!(Measurement::new().encode(false).unwrap().is_empty());
    }

    #[test]
    fn test_encode_field_order() {
        let m = Measurement::new()
            .with_value(1.5)
            .with_sum(2)
            .with_unit("W")
            .with_time(3)
            .with_name("p");
        let keys: Vec<_> = m.encode(false).unwrap().keys().cloned().collect();
        assert_eq!(keys, ["n", "t", "u", "s", "v"]);
    }

    #[test]
    fn test_encode_normalizes_integral_floats() {
        let m = Measurement::new().with_value(17.0).with_time(2.0).with_sum(0.5);
        assert_eq!(
            JsonValue::Object(m.encode(false).unwrap()),
            json!({"t": 2, "s": 0.5, "v": 17})
        );
    }

    #[test]
    fn test_encode_each_value_kind() {
        let cases = [
            (Value::Boolean(false), json!({"vb": false})),
            (Value::Text("on".into()), json!({"vs": "on"})),
            (Value::Opaque(vec![0, 255]), json!({"vd": [0, 255]})),
            (Value::Numeric(Numeric::Float(0.25)), json!({"v": 0.25})),
        ];
        for (value, expected) in cases {
            let m = Measurement::new().with_value(value);
            assert_eq!(JsonValue::Object(m.encode(false).unwrap()), expected);
        }
    }

    #[test]
    fn test_encode_with_base() {
        let base = Arc::new(
            Measurement::new()
                .with_name("dev/")
                .with_time(10)
                .with_unit("Cel")
                .with_value(20),
        );
        let m = Measurement::new().with_name("t1").with_value(1.5).with_base(base);
        let out = m.encode(true).unwrap();

        let keys: Vec<_> = out.keys().cloned().collect();
        assert_eq!(keys, ["bver", "bn", "bt", "bu", "bv", "n", "v"]);
        assert_eq!(out["bver"], json!(5));
        assert_eq!(out["bt"], json!(10.0));
        assert!(out["bt"].is_f64());
        assert!(out["bv"].is_f64());
        assert_eq!(out["bn"], json!("dev/"));
    }

    #[test]
    fn test_encode_with_base_but_no_base_attached() {
        let m = Measurement::new().with_name("solo");
        assert_eq!(
            JsonValue::Object(m.encode(true).unwrap()),
            json!({"bver": 5, "n": "solo"})
        );
    }

    #[test]
    fn test_encode_rejects_text_base_value() {
        let base = Arc::new(Measurement::new().with_value("warm"));
        let m = Measurement::new().with_base(base);
        assert!(matches!(
            m.encode(true),
            Err(SenMLError::ValueEncoding { ref field, .. }) if field == "bv"
        ));
        // Without the base fields the same record encodes fine
        assert!(m.encode(false).is_ok());
    }

    #[test]
    fn test_encode_rejects_non_finite() {
        let m = Measurement::new().with_value(f64::NAN);
        assert!(matches!(m.encode(false), Err(SenMLError::ValueEncoding { .. })));
    }

    #[test]
    fn test_to_absolute() {
        let base = Measurement::new()
            .with_name("urn:dev:mac:0024befffe804ff1/rpm/")
            .with_time(1234567890.123);
        let m = Measurement::new()
            .with_name("rev")
            .with_value(123.456)
            .with_sum(4)
            .with_time(7);

        let abs = m.to_absolute(&base);
        assert_eq!(abs.name.as_deref(), Some("urn:dev:mac:0024befffe804ff1/rpm/rev"));
        assert!((abs.time.unwrap().as_f64() - 1234567897.123).abs() < 1e-6);
        assert!((abs.value.as_numeric().unwrap().as_f64() - 123.456).abs() < 1e-9);
        assert_eq!(abs.sum, Some(Numeric::Int(4)));
        assert!(abs.base.is_none());

        // Inputs are untouched
        assert_eq!(m.name.as_deref(), Some("rev"));
        assert_eq!(m.time, Some(Numeric::Int(7)));
    }

    #[test]
    fn test_to_absolute_defaults_to_empty_and_zero() {
        let abs = Measurement::new().to_absolute(&Measurement::new());
        assert_eq!(abs.name.as_deref(), Some(""));
        assert_eq!(abs.time, Some(Numeric::Int(0)));
        assert_eq!(abs.value, Value::Numeric(Numeric::Int(0)));
        assert_eq!(abs.unit, None);
        assert_eq!(abs.sum, None);
    }

    #[test]
    fn test_to_absolute_offsets_numeric_values_only() {
        let base = Measurement::new().with_value(20).with_unit("Cel").with_sum(100);
        let numeric = Measurement::new().with_value(2.5).to_absolute(&base);
        assert_eq!(numeric.value, Value::Numeric(Numeric::Float(22.5)));
        assert_eq!(numeric.unit.as_deref(), Some("Cel"));
        assert_eq!(numeric.sum, None);

        for value in [Value::Boolean(false), Value::Text("7".into()), Value::Opaque(vec![7])] {
            let abs = Measurement::new().with_value(value.clone()).to_absolute(&base);
            assert_eq!(abs.value, value);
        }
    }

    #[test]
    fn test_to_absolute_record_unit_wins() {
        let base = Measurement::new().with_unit("Cel");
        let abs = Measurement::new().with_unit("K").to_absolute(&base);
        assert_eq!(abs.unit.as_deref(), Some("K"));
    }

    #[test]
    fn test_resolve_uses_attached_base() {
        let base = Arc::new(Measurement::new().with_name("dev/").with_time(100));
        let m = Measurement::new().with_name("temp").with_time(5).with_base(base);
        let abs = m.resolve();
        assert_eq!(abs.name.as_deref(), Some("dev/temp"));
        assert_eq!(abs.time, Some(Numeric::Int(105)));

        let alone = Measurement::new().with_name("temp").resolve();
        assert_eq!(alone.name.as_deref(), Some("temp"));
    }

    #[test]
    fn test_datetime_only_for_absolute_times() {
        let abs = Measurement::new().with_time(1_640_995_200);
        let dt = abs.datetime().unwrap();
        assert_eq!(dt.unix_timestamp(), 1_640_995_200);

        assert!(Measurement::new().with_time(60).datetime().is_none());
        assert!(Measurement::new().datetime().is_none());
    }
}
