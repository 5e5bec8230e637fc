//! Action and runner type definitions.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::parameter::ParameterSchema;

/// Globally unique reference to an action in `pack.name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionRef {
    pub pack: String,
    pub name: String,
}

impl ActionRef {
    pub fn new(pack: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pack: pack.into(),
            name: name.into(),
        }
    }
}

/// Error returned when a string is not a `pack.name` reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid action reference '{0}'; expected 'pack.name'")]
pub struct ParseActionRefError(pub String);

impl FromStr for ActionRef {
    type Err = ParseActionRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (pack, name) = s.split_once('.').ok_or_else(|| ParseActionRefError(s.to_string()))?;
        if pack.trim().is_empty() || name.trim().is_empty() || pack.chars().any(char::is_whitespace) {
            return Err(ParseActionRefError(s.to_string()));
        }
        Ok(Self::new(pack, name))
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.pack, self.name)
    }
}

impl Serialize for ActionRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ActionRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A registered, runnable unit of automation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Pack the action belongs to; older servers call this `content_pack`
    #[serde(alias = "content_pack")]
    pub pack: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Name of the runner type the action delegates to
    pub runner_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    #[serde(default)]
    pub parameters: ParameterSchema,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_parameters: Vec<String>,
}

impl Action {
    pub fn reference(&self) -> ActionRef {
        ActionRef::new(&self.pack, &self.name)
    }
}

fn default_enabled() -> bool {
    true
}

/// Execution backend an action delegates to, contributing its own parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub runner_parameters: ParameterSchema,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_parameters: Vec<String>,
}
