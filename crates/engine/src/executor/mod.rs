//! Execution engine: submits an execution and, in synchronous mode, waits for
//! it to reach a terminal status.
//!
//! - [`submit_execution`] builds the request and hands it to the execution manager
//! - [`ExecutionPoller`] refetches the execution until it leaves `scheduled`/`running`

pub mod poll;
pub mod submit;

pub use poll::{DEFAULT_POLL_INTERVAL, DecodedResult, ExecutionPoller, PollOutcome, decode_result};
pub use submit::submit_execution;
