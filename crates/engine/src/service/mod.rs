//! Collaborators the invocation pipeline talks to.
//!
//! Both traits are synchronous; the HTTP-backed implementation in [`http`]
//! bridges onto the async API client. Tests substitute in-memory fakes.

pub mod http;

use actionctl_api::{ApiError, AuthContext};
use actionctl_types::{Action, Execution, ExecutionQuery, RunnerType};

pub use http::HttpActionService;

/// Creates and reads executions.
///
/// Errors from the backing service (not found, validation, conflict) are
/// returned unchanged; implementations do not retry.
pub trait ExecutionManager {
    fn create(&self, execution: &Execution, auth: &AuthContext) -> Result<Execution, ApiError>;

    fn get_by_id(&self, id: &str, auth: &AuthContext) -> Result<Execution, ApiError>;

    fn query(&self, query: &ExecutionQuery, auth: &AuthContext) -> Result<Vec<Execution>, ApiError>;
}

/// Looks up action and runner type definitions.
pub trait ActionCatalog {
    /// Resolve a `pack.name` reference or an action id. `Ok(None)` when nothing matches.
    fn get_by_ref_or_id(&self, ref_or_id: &str, auth: &AuthContext) -> Result<Option<Action>, ApiError>;

    /// Resolve a runner type by name. `Ok(None)` when nothing matches.
    fn get_runner_by_name(&self, name: &str, auth: &AuthContext) -> Result<Option<RunnerType>, ApiError>;

    fn list_actions(&self, auth: &AuthContext) -> Result<Vec<Action>, ApiError>;
}
