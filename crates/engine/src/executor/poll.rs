//! Waiting for a submitted execution to finish.
//!
//! The poller owns the client-side state machine: while the execution is
//! `scheduled` or `running` it sleeps one interval and refetches by id. Any
//! other status, including one this client does not recognise, ends the loop.
//! There is no built-in timeout and no cooperative cancellation.

use std::{thread, time::Duration};

use actionctl_api::AuthContext;
use actionctl_types::{Execution, RunMode};
use serde_json::Value;
use tracing::{debug, info};

use crate::{error::EngineError, service::ExecutionManager};

/// Interval between two refetches of an active execution.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of decoding a terminal execution's result for display.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResult {
    /// The result was a string holding JSON and has been parsed.
    Decoded(Value),
    /// The result was kept as returned by the service.
    Raw(Value),
}

impl DecodedResult {
    pub fn value(&self) -> &Value {
        match self {
            Self::Decoded(value) | Self::Raw(value) => value,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Decoded(value) | Self::Raw(value) => value,
        }
    }
}

/// Decode a JSON-encoded result string; anything else is kept raw.
pub fn decode_result(result: &Value) -> DecodedResult {
    match result {
        Value::String(encoded) => match serde_json::from_str(encoded) {
            Ok(decoded) => DecodedResult::Decoded(decoded),
            Err(error) => {
                debug!(%error, "execution result is not JSON; keeping raw value");
                DecodedResult::Raw(result.clone())
            }
        },
        other => DecodedResult::Raw(other.clone()),
    }
}

/// What the poller hands back once it stops.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    /// Latest copy of the execution as reported by the service.
    pub execution: Execution,
    /// Number of refetches performed.
    pub refetches: u32,
    /// Decoded result, only set when polling ran to a terminal status.
    pub result: Option<DecodedResult>,
}

impl PollOutcome {
    /// The execution with its result replaced by the decoded value, for display.
    pub fn display_execution(&self) -> Execution {
        let mut execution = self.execution.clone();
        if let Some(result) = &self.result {
            execution.result = Some(result.value().clone());
        }
        execution
    }
}

/// Polls an execution until it leaves the active states.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionPoller {
    interval: Duration,
}

impl Default for ExecutionPoller {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ExecutionPoller {
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for `execution` according to `mode`.
    ///
    /// Asynchronous mode returns the execution untouched without any refetch.
    /// In synchronous mode `observer` is called with the attempt number after
    /// every refetch. Fetch errors end the wait immediately.
    pub fn wait<M, F>(
        &self,
        manager: &M,
        execution: Execution,
        mode: RunMode,
        auth: &AuthContext,
        mut observer: F,
    ) -> Result<PollOutcome, EngineError>
    where
        M: ExecutionManager + ?Sized,
        F: FnMut(u32),
    {
        if mode == RunMode::Asynchronous {
            debug!(execution_id = execution.id.as_deref().unwrap_or("<none>"), "asynchronous mode; not polling");
            return Ok(PollOutcome {
                execution,
                refetches: 0,
                result: None,
            });
        }

        let mut current = execution;
        let mut attempts = 0u32;
        while current.is_active() {
            let id = current.id.clone().ok_or(EngineError::MissingExecutionId)?;
            thread::sleep(self.interval);
            current = manager.get_by_id(&id, auth)?;
            attempts += 1;
            debug!(
                execution_id = %id,
                attempts,
                status = current.status.as_ref().map(|status| status.as_str()).unwrap_or("<unset>"),
                "polled execution"
            );
            observer(attempts);
        }

        info!(
            execution_id = current.id.as_deref().unwrap_or("<none>"),
            attempts,
            status = current.status.as_ref().map(|status| status.as_str()).unwrap_or("<unset>"),
            "execution finished"
        );
        let result = current.result.as_ref().map(decode_result);
        Ok(PollOutcome {
            execution: current,
            refetches: attempts,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedExecutions;
    use actionctl_api::ApiError;
    use actionctl_types::{ActionRef, ExecutionStatus, Parameters};
    use serde_json::json;

    fn submitted(manager: &ScriptedExecutions) -> Execution {
        manager
            .create(
                &Execution::new(ActionRef::new("core", "local"), Parameters::new()),
                &AuthContext::anonymous(),
            )
            .unwrap()
    }

    fn poller() -> ExecutionPoller {
        ExecutionPoller::with_interval(Duration::ZERO)
    }

    #[test]
    fn polls_until_terminal_status() {
        let manager = ScriptedExecutions::new(
            ExecutionStatus::Scheduled,
            vec![ExecutionStatus::Running, ExecutionStatus::Running, ExecutionStatus::Succeeded],
        );
        let execution = submitted(&manager);
        let mut observed = Vec::new();

        let outcome = poller()
            .wait(&manager, execution, RunMode::Synchronous, &AuthContext::anonymous(), |attempt| {
                observed.push(attempt)
            })
            .unwrap();

        assert_eq!(outcome.refetches, 3);
        assert_eq!(manager.fetches(), 3);
        assert_eq!(observed, vec![1, 2, 3]);
        assert_eq!(outcome.execution.status, Some(ExecutionStatus::Succeeded));
    }

    #[test]
    fn asynchronous_mode_never_refetches() {
        let manager = ScriptedExecutions::new(ExecutionStatus::Running, vec![ExecutionStatus::Succeeded]);
        let execution = submitted(&manager);

        let outcome = poller()
            .wait(&manager, execution.clone(), RunMode::Asynchronous, &AuthContext::anonymous(), |_| {
                panic!("asynchronous mode must not poll")
            })
            .unwrap();

        assert_eq!(manager.fetches(), 0);
        assert_eq!(outcome.refetches, 0);
        assert_eq!(outcome.execution, execution);
        assert_eq!(outcome.result, None);
    }

    #[test]
    fn terminal_submission_is_not_refetched() {
        let manager = ScriptedExecutions::new(ExecutionStatus::Failed, vec![]);
        let execution = submitted(&manager);
        let outcome = poller()
            .wait(&manager, execution, RunMode::Synchronous, &AuthContext::anonymous(), |_| {})
            .unwrap();
        assert_eq!(outcome.refetches, 0);
        assert_eq!(outcome.execution.status, Some(ExecutionStatus::Failed));
    }

    #[test]
    fn unknown_status_ends_polling() {
        let manager = ScriptedExecutions::new(
            ExecutionStatus::Running,
            vec![ExecutionStatus::Other("abandoned".into()), ExecutionStatus::Running],
        );
        let execution = submitted(&manager);
        let outcome = poller()
            .wait(&manager, execution, RunMode::Synchronous, &AuthContext::anonymous(), |_| {})
            .unwrap();
        assert_eq!(outcome.refetches, 1);
    }

    #[test]
    fn fetch_errors_propagate() {
        let manager = ScriptedExecutions::new(ExecutionStatus::Running, vec![]);
        let execution = submitted(&manager);
        let error = poller()
            .wait(&manager, execution, RunMode::Synchronous, &AuthContext::anonymous(), |_| {})
            .unwrap_err();
        assert!(matches!(error, EngineError::Api(ApiError::Transport { .. })));
    }

    #[test]
    fn active_execution_without_id_cannot_be_polled() {
        let manager = ScriptedExecutions::new(ExecutionStatus::Running, vec![ExecutionStatus::Succeeded]);
        let mut execution = submitted(&manager);
        execution.id = None;
        let error = poller()
            .wait(&manager, execution, RunMode::Synchronous, &AuthContext::anonymous(), |_| {})
            .unwrap_err();
        assert!(matches!(error, EngineError::MissingExecutionId));
        assert_eq!(manager.fetches(), 0);
    }

    #[test]
    fn terminal_result_string_is_decoded() {
        let manager = ScriptedExecutions::new(ExecutionStatus::Running, vec![ExecutionStatus::Succeeded])
            .with_result(json!(r#"{"stdout": "ok", "return_code": 0}"#));
        let execution = submitted(&manager);
        let outcome = poller()
            .wait(&manager, execution, RunMode::Synchronous, &AuthContext::anonymous(), |_| {})
            .unwrap();

        let decoded = json!({"stdout": "ok", "return_code": 0});
        assert_eq!(outcome.result, Some(DecodedResult::Decoded(decoded.clone())));
        assert_eq!(outcome.display_execution().result, Some(decoded));
        assert_eq!(outcome.execution.result, Some(json!(r#"{"stdout": "ok", "return_code": 0}"#)));
    }

    #[test]
    fn undecodable_results_are_kept_raw() {
        assert_eq!(decode_result(&json!("plain text")), DecodedResult::Raw(json!("plain text")));
        assert_eq!(decode_result(&json!({"a": 1})), DecodedResult::Raw(json!({"a": 1})));
        assert_eq!(decode_result(&json!("[1, 2]")).into_value(), json!([1, 2]));
    }
}
