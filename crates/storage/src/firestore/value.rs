//! Firestore REST representation of documents.
//!
//! Every field value is an object with a single key naming its type, e.g.
//! `{"stringValue": "Leg Press"}` or `{"integerValue": "12"}`. 64-bit integers are transmitted as
//! strings.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Value {
    #[serde(rename = "nullValue")]
    Null(()),
    #[serde(rename = "booleanValue")]
    Boolean(bool),
    #[serde(rename = "integerValue", with = "int64")]
    Integer(i64),
    #[serde(rename = "doubleValue")]
    Double(f64),
    #[serde(rename = "timestampValue")]
    Timestamp(String),
    #[serde(rename = "stringValue")]
    String(String),
    #[serde(rename = "bytesValue")]
    Bytes(String),
    #[serde(rename = "referenceValue")]
    Reference(String),
    #[serde(rename = "geoPointValue")]
    GeoPoint(GeoPoint),
    #[serde(rename = "arrayValue")]
    Array(ArrayValue),
    #[serde(rename = "mapValue")]
    Map(MapValue),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct MapValue {
    #[serde(default)]
    pub fields: Fields,
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    #[must_use]
    pub fn optional_string(value: Option<&str>) -> Self {
        value.map_or(Value::Null(()), Value::string)
    }

    #[must_use]
    pub fn timestamp(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    #[must_use]
    pub fn optional_timestamp(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Value::Null(()), Value::timestamp)
    }

    #[must_use]
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(ArrayValue { values })
    }

    #[must_use]
    pub fn map(fields: Fields) -> Self {
        Value::Map(MapValue { fields })
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null(()) => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Timestamp(_) => "timestamp",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Reference(_) => "reference",
            Value::GeoPoint(_) => "geo point",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("missing field {0}")]
    Missing(String),
    #[error("invalid field {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ModelError {
    pub fn invalid(field: &str, message: impl ToString) -> Self {
        ModelError::Invalid {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// The fields of a document or of a map value.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.0.get(key) {
            None | Some(Value::Null(())) => None,
            value => value,
        }
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn string(&self, key: &str) -> Result<String, ModelError> {
        self.optional_string(key)?
            .ok_or_else(|| ModelError::Missing(key.to_string()))
    }

    pub fn optional_string(&self, key: &str) -> Result<Option<String>, ModelError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(value) => Err(unexpected(key, value)),
        }
    }

    /// Strings that are missing or blank are treated as absent.
    pub fn non_empty_string(&self, key: &str) -> Result<Option<String>, ModelError> {
        Ok(self
            .optional_string(key)?
            .filter(|value| !value.trim().is_empty()))
    }

    pub fn boolean(&self, key: &str, default: bool) -> Result<bool, ModelError> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Boolean(value)) => Ok(*value),
            Some(value) => Err(unexpected(key, value)),
        }
    }

    /// Integers may also be stored as doubles without fractional part.
    pub fn optional_integer(&self, key: &str) -> Result<Option<i64>, ModelError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Integer(value)) => Ok(Some(*value)),
            #[allow(clippy::cast_possible_truncation)]
            Some(Value::Double(value)) if value.fract() == 0.0 => Ok(Some(*value as i64)),
            Some(value) => Err(unexpected(key, value)),
        }
    }

    pub fn integer(&self, key: &str) -> Result<i64, ModelError> {
        self.optional_integer(key)?
            .ok_or_else(|| ModelError::Missing(key.to_string()))
    }

    pub fn number(&self, key: &str) -> Result<f64, ModelError> {
        match self.get(key) {
            None => Err(ModelError::Missing(key.to_string())),
            Some(Value::Double(value)) => Ok(*value),
            #[allow(clippy::cast_precision_loss)]
            Some(Value::Integer(value)) => Ok(*value as f64),
            Some(value) => Err(unexpected(key, value)),
        }
    }

    /// Timestamps written by older clients are stored as RFC 3339 strings.
    pub fn optional_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, ModelError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Timestamp(value) | Value::String(value)) => {
                DateTime::parse_from_rfc3339(value)
                    .map(|timestamp| Some(timestamp.with_timezone(&Utc)))
                    .map_err(|err| ModelError::invalid(key, err))
            }
            Some(value) => Err(unexpected(key, value)),
        }
    }

    /// Missing arrays are treated as empty.
    pub fn array(&self, key: &str) -> Result<&[Value], ModelError> {
        match self.get(key) {
            None => Ok(&[]),
            Some(Value::Array(array)) => Ok(&array.values),
            Some(value) => Err(unexpected(key, value)),
        }
    }
}

fn unexpected(key: &str, value: &Value) -> ModelError {
    ModelError::invalid(key, format!("unexpected {} value", value.type_name()))
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name, e.g. `projects/p/databases/(default)/documents/machines/abc`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default, skip_serializing)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub update_time: Option<DateTime<Utc>>,
}

impl Document {
    #[must_use]
    pub fn id(&self) -> &str {
        self.name
            .rsplit_once('/')
            .map_or(self.name.as_str(), |(_, id)| id)
    }

    /// The `createdAt` field, falling back to the creation time recorded by the database.
    pub fn created_at(&self) -> Result<DateTime<Utc>, ModelError> {
        Ok(self
            .fields
            .optional_timestamp("createdAt")?
            .or(self.create_time)
            .unwrap_or_default())
    }
}

mod int64 {
    use super::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Int64 {
            String(String),
            Number(i64),
        }

        match Int64::deserialize(deserializer)? {
            Int64::String(value) => value.parse().map_err(serde::de::Error::custom),
            Int64::Number(value) => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_document() {
        let document: Document = serde_json::from_value(json!({
            "name": "projects/demo/databases/(default)/documents/machines/m1",
            "fields": {
                "name": {"stringValue": "Leg Press"},
                "number": {"integerValue": "12"},
                "isGlobal": {"booleanValue": true},
                "mediaURL": {"nullValue": null},
                "tags": {"arrayValue": {}},
                "createdAt": {"timestampValue": "2024-01-02T10:20:30.123456Z"}
            },
            "createTime": "2024-01-02T10:20:31.000000Z",
            "updateTime": "2024-01-02T10:20:31.000000Z"
        }))
        .unwrap();

        assert_eq!(document.id(), "m1");
        assert_eq!(document.fields.string("name").unwrap(), "Leg Press");
        assert_eq!(document.fields.integer("number").unwrap(), 12);
        assert!(document.fields.boolean("isGlobal", false).unwrap());
        assert_eq!(document.fields.optional_string("mediaURL").unwrap(), None);
        assert!(document.fields.array("tags").unwrap().is_empty());
        assert_eq!(
            document.created_at().unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 10, 20, 30).unwrap()
                + chrono::TimeDelta::microseconds(123_456)
        );
    }

    #[test]
    fn test_serialize_fields() {
        let fields = Fields::new()
            .with("sets", Value::Integer(3))
            .with("weight", Value::Double(52.5))
            .with("notes", Value::optional_string(None))
            .with(
                "createdAt",
                Value::timestamp(Utc.with_ymd_and_hms(2024, 1, 2, 10, 20, 30).unwrap()),
            );

        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({
                "createdAt": {"timestampValue": "2024-01-02T10:20:30.000000Z"},
                "notes": {"nullValue": null},
                "sets": {"integerValue": "3"},
                "weight": {"doubleValue": 52.5}
            })
        );
    }

    #[rstest]
    #[case(json!({"integerValue": "7"}), Ok(7.0))]
    #[case(json!({"integerValue": 7}), Ok(7.0))]
    #[case(json!({"doubleValue": 7.5}), Ok(7.5))]
    #[case(
        json!({"stringValue": "7"}),
        Err(ModelError::invalid("weight", "unexpected string value"))
    )]
    fn test_number(#[case] value: serde_json::Value, #[case] expected: Result<f64, ModelError>) {
        let fields = Fields::new().with("weight", serde_json::from_value(value).unwrap());
        assert_eq!(fields.number("weight"), expected);
    }

    #[test]
    fn test_missing_fields() {
        let fields = Fields::new();

        assert_eq!(
            fields.string("name"),
            Err(ModelError::Missing("name".to_string()))
        );
        assert!(fields.boolean("read", true).unwrap());
        assert_eq!(fields.optional_integer("number"), Ok(None));
    }

    #[test]
    fn test_integer_from_double() {
        let fields = Fields::new()
            .with("sets", Value::Double(3.0))
            .with("reps", Value::Double(2.5));

        assert_eq!(fields.integer("sets"), Ok(3));
        assert_eq!(
            fields.integer("reps"),
            Err(ModelError::invalid("reps", "unexpected double value"))
        );
    }

    #[test]
    fn test_timestamp_from_string() {
        let fields = Fields::new().with("createdAt", Value::string("2024-03-01T08:00:00+01:00"));

        assert_eq!(
            fields.optional_timestamp("createdAt"),
            Ok(Some(Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap()))
        );
    }
}
