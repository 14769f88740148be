use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Extra fields attached to every entry of a logger, sorted by key.
pub type LogFieldSet = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum FieldParseError {
    #[error("Invalid json - {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a json object, found {0}")]
    NotAnObject(&'static str),
    #[error("Malformed field '{0}', expected key=value")]
    MalformedPair(String),
}

/// Turns the additional log fields blob into a field set.
///
/// Repeated keys keep the last value.
pub trait FieldParser: Send + Sync {
    fn parse(&self, blob: &str) -> Result<LogFieldSet, FieldParseError>;
}

/// Parses a json object, e.g. `{"cluster":"east-1","attempt":3}`.
///
/// String values are taken as they are, any other value as its json text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFieldParser;

impl FieldParser for JsonFieldParser {
    fn parse(&self, blob: &str) -> Result<LogFieldSet, FieldParseError> {
        let object = match serde_json::from_str::<Value>(blob)? {
            Value::Object(object) => object,
            Value::Null => return Err(FieldParseError::NotAnObject("null")),
            Value::Bool(_) => return Err(FieldParseError::NotAnObject("a boolean")),
            Value::Number(_) => return Err(FieldParseError::NotAnObject("a number")),
            Value::String(_) => return Err(FieldParseError::NotAnObject("a string")),
            Value::Array(_) => return Err(FieldParseError::NotAnObject("an array")),
        };

        Ok(object.into_iter()
            .map(|(key, value)| match value {
                Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect())
    }
}

/// Parses comma separated pairs, e.g. `cluster=east-1,attempt=3`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueFieldParser;

impl FieldParser for KeyValueFieldParser {
    fn parse(&self, blob: &str) -> Result<LogFieldSet, FieldParseError> {
        let mut fields = LogFieldSet::new();
        for pair in blob.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match pair.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    fields.insert(String::from(key.trim()), String::from(value.trim()));
                }
                _ => return Err(FieldParseError::MalformedPair(String::from(pair))),
            }
        }
        Ok(fields)
    }
}
