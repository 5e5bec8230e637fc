//! Parameter schema types shared by actions and runner types.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Mapping from parameter name to its declaration, in declaration order.
pub type ParameterSchema = IndexMap<String, ParameterSpec>;

/// Declaration of a single parameter on an action or a runner type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Declared type name (e.g., "string", "integer"). Unknown names are kept verbatim.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    /// Human-readable description shown in help output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values, when the parameter is an enumeration
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub r#enum: Option<Vec<Value>>,
    /// Default value applied by the server when the caller omits the parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether the caller must supply a value
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Whether the value is fixed by the definition and cannot be set by the caller
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "std::ops::Not::not")]
    pub immutable: bool,
    /// Display position used to order parameters in help output
    #[serde(default, deserialize_with = "lenient_position", skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
}

/// Only a JSON `true` sets a flag; `null` and values of other types read as unset.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

/// Non-negative integers, or strings holding one, are kept; anything else reads as no position.
fn lenient_position<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

impl ParameterSpec {
    /// Returns the declared type when it names one of the supported types.
    pub fn parameter_type(&self) -> Option<ParameterType> {
        self.r#type.as_deref().and_then(|name| name.parse().ok())
    }
}

/// The closed set of parameter types understood by the value transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Array,
    Boolean,
    Integer,
    Number,
    Object,
    String,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Object => "object",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a type name is not one of the supported parameter types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parameter type '{0}'")]
pub struct UnknownParameterType(pub String);

impl FromStr for ParameterType {
    type Err = UnknownParameterType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "array" => Ok(Self::Array),
            "boolean" => Ok(Self::Boolean),
            "integer" => Ok(Self::Integer),
            "number" => Ok(Self::Number),
            "object" => Ok(Self::Object),
            "string" => Ok(Self::String),
            other => Err(UnknownParameterType(other.to_string())),
        }
    }
}

/// A resolved parameter value ready to be submitted with an execution.
///
/// File-valued parameters keep their raw bytes locally. On the wire they are
/// sent as a UTF-8 string, so non UTF-8 content fails serialization instead of
/// being silently rewritten.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Value(Value),
    Bytes(Vec<u8>),
}

impl ParameterValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Value(_) => None,
            Self::Bytes(bytes) => Some(bytes),
        }
    }
}

impl From<Value> for ParameterValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl Serialize for ParameterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Bytes(bytes) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|error| serde::ser::Error::custom(format!("file content is not valid UTF-8: {error}")))?;
                serializer.serialize_str(text)
            }
        }
    }
}

impl<'de> Deserialize<'de> for ParameterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::Value)
    }
}

/// Resolved parameters keyed by name, in the order they were supplied.
pub type Parameters = IndexMap<String, ParameterValue>;
