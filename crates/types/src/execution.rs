//! Execution records and their lifecycle status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{action::ActionRef, parameter::Parameters};

/// Status reported by the execution service.
///
/// Only `scheduled` and `running` are active; every other value, including
/// statuses this client does not know about, is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExecutionStatus {
    Scheduled,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Other(String),
}

impl ExecutionStatus {
    /// Returns `true` while the service is still working on the execution.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Scheduled | Self::Running)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for ExecutionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "scheduled" => Self::Scheduled,
            "running" => Self::Running,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" => Self::Canceled,
            _ => Self::Other(value),
        }
    }
}

impl From<ExecutionStatus> for String {
    fn from(value: ExecutionStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One invocation of an action, tracked by id and status until terminal.
///
/// A freshly built execution has neither id nor status; both are assigned by
/// the execution service on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub action: ActionRef,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<DateTime<Utc>>,
}

impl Execution {
    /// Build an unsubmitted execution request.
    pub fn new(action: ActionRef, parameters: Parameters) -> Self {
        Self {
            id: None,
            action,
            parameters,
            status: None,
            result: None,
            start_timestamp: None,
        }
    }

    /// Returns `true` when the service reported an active status.
    pub fn is_active(&self) -> bool {
        self.status.as_ref().is_some_and(ExecutionStatus::is_active)
    }
}

/// How an invocation waits for its execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Poll until the execution reaches a terminal status.
    #[default]
    Synchronous,
    /// Return the execution as submitted without polling.
    Asynchronous,
}

/// Filters accepted by the execution listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionQuery {
    pub action_name: Option<String>,
    pub action_id: Option<String>,
    /// Maximum number of executions to return; `None` returns all.
    pub limit: Option<u32>,
}
