//! End-to-end invocation of an action: lookup, merge, parse, submit, wait.

use std::path::PathBuf;

use actionctl_api::AuthContext;
use actionctl_types::{Action, RunMode, RunnerType};
use tracing::{debug, info};

use crate::{
    arguments::ArgumentParser,
    error::EngineError,
    executor::{ExecutionPoller, PollOutcome, submit_execution},
    help::render_action_help,
    schema::MergedSchema,
    service::{ActionCatalog, ExecutionManager},
};

/// A request to run one action with raw command-line parameters.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// `pack.name` reference or action id.
    pub ref_or_id: String,
    /// Raw `key=value`, `@key=path` and bare tokens, in command-line order.
    pub parameters: Vec<String>,
    pub mode: RunMode,
    /// Directory relative file paths are resolved against.
    pub working_dir: PathBuf,
}

/// Action definition resolved together with its runner type.
#[derive(Debug, Clone)]
pub struct ResolvedAction {
    pub action: Action,
    pub runner: RunnerType,
    pub schema: MergedSchema,
}

/// Runs actions against a catalog and an execution manager.
pub struct ActionInvoker<'s, C: ?Sized, M: ?Sized> {
    catalog: &'s C,
    executions: &'s M,
    poller: ExecutionPoller,
    auth: AuthContext,
}

impl<'s, C, M> ActionInvoker<'s, C, M>
where
    C: ActionCatalog + ?Sized,
    M: ExecutionManager + ?Sized,
{
    pub fn new(catalog: &'s C, executions: &'s M, auth: AuthContext) -> Self {
        Self {
            catalog,
            executions,
            poller: ExecutionPoller::default(),
            auth,
        }
    }

    pub fn with_poller(mut self, poller: ExecutionPoller) -> Self {
        self.poller = poller;
        self
    }

    /// Look up the action and its runner type and merge their schemas.
    pub fn resolve(&self, ref_or_id: &str) -> Result<ResolvedAction, EngineError> {
        let action = self
            .catalog
            .get_by_ref_or_id(ref_or_id, &self.auth)?
            .ok_or_else(|| EngineError::not_found(format!("Action \"{ref_or_id}\" cannot be found.")))?;

        let runner = self
            .catalog
            .get_runner_by_name(&action.runner_type, &self.auth)?
            .ok_or_else(|| {
                EngineError::not_found(format!(
                    "Runner type \"{}\" for action \"{}\" cannot be found.",
                    action.runner_type, action.name
                ))
            })?;

        debug!(action = %action.reference(), runner = %runner.name, "resolved action");
        let schema = MergedSchema::for_action(&runner, &action);
        Ok(ResolvedAction { action, runner, schema })
    }

    /// Help text for the action, without submitting anything.
    pub fn describe(&self, ref_or_id: &str) -> Result<String, EngineError> {
        let resolved = self.resolve(ref_or_id)?;
        render_action_help(&resolved.action, &resolved.schema)
    }

    /// Resolve parameters, submit the execution and wait according to the mode.
    ///
    /// Any parameter error aborts before submission. `observer` is called
    /// once per refetch while waiting.
    pub fn invoke<F>(&self, request: &InvocationRequest, observer: F) -> Result<PollOutcome, EngineError>
    where
        F: FnMut(u32),
    {
        let resolved = self.resolve(&request.ref_or_id)?;
        let reference = resolved.action.reference();

        let parameters = ArgumentParser::new(&resolved.schema, &request.working_dir).parse(&request.parameters)?;
        info!(action = %reference, parameters = parameters.len(), mode = ?request.mode, "parameters resolved");

        let execution = submit_execution(self.executions, &reference, parameters, &self.auth)?;
        self.poller
            .wait(self.executions, execution, request.mode, &self.auth, observer)
    }
}
