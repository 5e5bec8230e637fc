//! Shared type definitions for actionctl.
//!
//! Actions, runner types and their parameter schemas as served by the action
//! service, plus the execution records created when an action is invoked.

pub mod action;
pub mod execution;
pub mod parameter;

pub use action::{Action, ActionRef, ParseActionRefError, RunnerType};
pub use execution::{Execution, ExecutionQuery, ExecutionStatus, RunMode};
pub use parameter::{ParameterSchema, ParameterSpec, ParameterType, ParameterValue, Parameters, UnknownParameterType};
