use std::collections::BTreeMap;
use std::iter::FromIterator;

use fnbatch_core::errors::{BatchError, ErrorInfo};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

fn serde_error(code: &str, err: impl ToString) -> BatchError {
    BatchError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into JSON bytes with object keys sorted, independent of
/// insertion order. Used for hashing, not for batch output.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, BatchError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json.serialize", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| serde_error("json.write", err))?;
    Ok(bytes)
}

/// Serializes a value into JSON bytes keeping its declared key order.
pub fn to_json_bytes<T: Serialize>(value: &T, pretty: bool) -> Result<Vec<u8>, BatchError> {
    let result = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    };
    result.map_err(|err| serde_error("json.serialize", err))
}

/// Deserializes a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, BatchError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json.deserialize", err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, BatchError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml.deserialize", err))
}
