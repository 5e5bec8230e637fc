//! Async runtime helpers for blocking callers.
//!
//! The invocation pipeline is synchronous while the HTTP client is async. This
//! module provides the single bridge between the two, reusing the current
//! Tokio runtime when one is available.

use std::{future::Future, io};
use tokio::{runtime::Handle, task};

/// Execute an async future from synchronous code.
///
/// # Returns
/// The future's output, or an I/O error when a Tokio runtime cannot be created.
///
/// # Notes
/// - Reuses the current runtime when available.
/// - Falls back to a single-threaded runtime for call sites outside Tokio.
pub fn block_on_future<F>(future: F) -> io::Result<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        Ok(task::block_in_place(|| handle.block_on(future)))
    } else {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(runtime.block_on(future))
    }
}
