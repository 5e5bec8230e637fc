//! Coercion of raw command-line strings into typed parameter values.

use actionctl_types::ParameterType;
use serde_json::{Number, Value};
use tracing::debug;

use crate::{error::EngineError, schema::MergedSchema};

/// Message surfaced when a boolean parameter receives anything but true/false.
pub const INVALID_BOOLEAN_MESSAGE: &str = "Invalid value for boolean parameter. Valid values are: true, false";

/// Reason a raw string could not be coerced to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// Not one of the boolean literals.
    Boolean,
    /// Any other parse failure, carrying the underlying parser message.
    Malformed(String),
}

/// Coerce `raw` into a value of `parameter_type`.
pub fn coerce(parameter_type: ParameterType, raw: &str) -> Result<Value, CoercionError> {
    match parameter_type {
        ParameterType::Array => Ok(Value::Array(
            raw.split(',').map(|item| Value::String(item.trim().to_string())).collect(),
        )),
        ParameterType::Boolean => {
            let literal = raw.trim();
            if literal.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if literal.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(CoercionError::Boolean)
            }
        }
        ParameterType::Integer => {
            let literal = raw.trim();
            literal
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| literal.parse::<u64>().map(Value::from))
                .map_err(|error| CoercionError::Malformed(error.to_string()))
        }
        ParameterType::Number => {
            let parsed = raw
                .trim()
                .parse::<f64>()
                .map_err(|error| CoercionError::Malformed(error.to_string()))?;
            Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| CoercionError::Malformed("value is not a finite number".to_string()))
        }
        ParameterType::Object => serde_json::from_str(raw).map_err(|error| CoercionError::Malformed(error.to_string())),
        ParameterType::String => Ok(Value::String(raw.to_string())),
    }
}

/// Transform the raw value supplied for `name` according to the merged schema.
///
/// Parameters without a supported declared type pass through as strings.
pub fn transform_value(name: &str, raw: &str, schema: &MergedSchema) -> Result<Value, EngineError> {
    let Some(parameter_type) = schema.declared_type(name) else {
        debug!(parameter = %name, "no declared type; passing value through");
        return Ok(Value::String(raw.to_string()));
    };

    coerce(parameter_type, raw).map_err(|error| match error {
        CoercionError::Boolean => EngineError::invalid_value(name, INVALID_BOOLEAN_MESSAGE),
        CoercionError::Malformed(cause) => EngineError::invalid_value(
            name,
            format!("Invalid value \"{raw}\" for {parameter_type} parameter \"{name}\": {cause}"),
        ),
    })
}
