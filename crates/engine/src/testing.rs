//! In-memory collaborators shared by the unit tests.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use actionctl_api::{ApiError, AuthContext};
use actionctl_types::{Action, ActionRef, Execution, ExecutionQuery, ExecutionStatus, Parameters, RunnerType};
use serde_json::Value;

use crate::service::{ActionCatalog, ExecutionManager};

/// Execution manager answering refetches from a scripted status sequence.
pub(crate) struct ScriptedExecutions {
    initial: ExecutionStatus,
    fetched: RefCell<VecDeque<ExecutionStatus>>,
    result: Option<Value>,
    create_error: RefCell<Option<ApiError>>,
    submitted: RefCell<Vec<Execution>>,
    fetches: Cell<u32>,
}

impl ScriptedExecutions {
    pub const EXECUTION_ID: &'static str = "5f0c1d2e3a";

    /// `initial` is the status returned on creation, `fetched` the statuses
    /// returned by successive refetches.
    pub fn new(initial: ExecutionStatus, fetched: Vec<ExecutionStatus>) -> Self {
        Self {
            initial,
            fetched: RefCell::new(fetched.into()),
            result: None,
            create_error: RefCell::new(None),
            submitted: RefCell::new(Vec::new()),
            fetches: Cell::new(0),
        }
    }

    pub fn failing_create(error: ApiError) -> Self {
        let scripted = Self::new(ExecutionStatus::Scheduled, Vec::new());
        *scripted.create_error.borrow_mut() = Some(error);
        scripted
    }

    /// Result attached to every execution returned in a terminal status.
    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn submitted(&self) -> Vec<Execution> {
        self.submitted.borrow().clone()
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.get()
    }

    fn respond(&self, status: ExecutionStatus) -> Execution {
        let mut execution = self
            .submitted
            .borrow()
            .last()
            .cloned()
            .unwrap_or_else(|| Execution::new(ActionRef::new("core", "local"), Parameters::new()));
        execution.id = Some(Self::EXECUTION_ID.to_string());
        if status.is_terminal() {
            execution.result = self.result.clone();
        }
        execution.status = Some(status);
        execution
    }
}

impl ExecutionManager for ScriptedExecutions {
    fn create(&self, execution: &Execution, _auth: &AuthContext) -> Result<Execution, ApiError> {
        if let Some(error) = self.create_error.borrow_mut().take() {
            return Err(error);
        }
        self.submitted.borrow_mut().push(execution.clone());
        Ok(self.respond(self.initial.clone()))
    }

    fn get_by_id(&self, id: &str, _auth: &AuthContext) -> Result<Execution, ApiError> {
        self.fetches.set(self.fetches.get() + 1);
        if id != Self::EXECUTION_ID {
            return Err(ApiError::not_found(format!("execution {id} not found")));
        }
        let status = self
            .fetched
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ApiError::transport("scripted statuses exhausted"))?;
        Ok(self.respond(status))
    }

    fn query(&self, _query: &ExecutionQuery, _auth: &AuthContext) -> Result<Vec<Execution>, ApiError> {
        Ok(self.submitted())
    }
}

/// Action catalog over fixed definitions.
#[derive(Default)]
pub(crate) struct InMemoryCatalog {
    actions: Vec<Action>,
    runners: Vec<RunnerType>,
}

impl InMemoryCatalog {
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_runner(mut self, runner: RunnerType) -> Self {
        self.runners.push(runner);
        self
    }
}

impl ActionCatalog for InMemoryCatalog {
    fn get_by_ref_or_id(&self, ref_or_id: &str, _auth: &AuthContext) -> Result<Option<Action>, ApiError> {
        let found = match ref_or_id.parse::<ActionRef>() {
            Ok(reference) => self.actions.iter().find(|action| action.reference() == reference),
            Err(_) => self.actions.iter().find(|action| action.id.as_deref() == Some(ref_or_id)),
        };
        Ok(found.cloned())
    }

    fn get_runner_by_name(&self, name: &str, _auth: &AuthContext) -> Result<Option<RunnerType>, ApiError> {
        Ok(self.runners.iter().find(|runner| runner.name == name).cloned())
    }

    fn list_actions(&self, _auth: &AuthContext) -> Result<Vec<Action>, ApiError> {
        Ok(self.actions.clone())
    }
}
