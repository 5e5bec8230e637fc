//! # actionctl engine
//!
//! The action-invocation pipeline: everything between a raw command line and a
//! finished execution.
//!
//! ## Flow
//!
//! 1. The action and its runner type are looked up through an [`ActionCatalog`].
//! 2. Their parameter schemas are merged into a [`MergedSchema`] with
//!    required, optional and immutable partitions.
//! 3. [`ArgumentParser`] turns `key=value`, `@key=path` and trailing bare tokens
//!    into typed parameters, coercing each value per its declared type.
//! 4. [`submit_execution`] creates the execution through an [`ExecutionManager`].
//! 5. In synchronous mode [`ExecutionPoller`] refetches it until it is terminal.
//!
//! [`ActionInvoker`] ties these together; [`render_action_help`] produces the
//! `--help` output from the same merged schema.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actionctl_api::AuthContext;
//! use actionctl_engine::{ActionInvoker, HttpActionService, InvocationRequest};
//! use actionctl_types::RunMode;
//!
//! let service = HttpActionService::from_base_url("http://127.0.0.1:9101/v1")?;
//! let invoker = ActionInvoker::new(&service, &service, AuthContext::anonymous());
//! let request = InvocationRequest {
//!     ref_or_id: "core.local".into(),
//!     parameters: vec!["uptime".into()],
//!     mode: RunMode::Synchronous,
//!     working_dir: std::env::current_dir()?,
//! };
//! let outcome = invoker.invoke(&request, |_| print!("."))?;
//! println!("{:?}", outcome.execution.status);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod arguments;
pub mod error;
pub mod executor;
pub mod help;
pub mod invoke;
pub mod schema;
pub mod service;
pub mod transform;

#[cfg(test)]
mod testing;

pub use arguments::ArgumentParser;
pub use error::{EngineError, FileAccessError};
pub use executor::{DecodedResult, ExecutionPoller, PollOutcome, decode_result, submit_execution};
pub use help::{render_action_help, sort_parameters};
pub use invoke::{ActionInvoker, InvocationRequest, ResolvedAction};
pub use schema::MergedSchema;
pub use service::{ActionCatalog, ExecutionManager, HttpActionService};
pub use transform::transform_value;
