use std::future::Future;

use actionctl_api::{ActionctlClient, ApiError, AuthContext};
use actionctl_types::{Action, ActionRef, Execution, ExecutionQuery, RunnerType};
use actionctl_util::block_on_future;
use tracing::debug;

use super::{ActionCatalog, ExecutionManager};

/// Action catalog and execution manager backed by the REST API.
///
/// Each call clones the client into an owned future and drives it to
/// completion on the calling thread.
#[derive(Debug, Clone)]
pub struct HttpActionService {
    client: ActionctlClient,
}

impl HttpActionService {
    pub fn new(client: ActionctlClient) -> Self {
        Self { client }
    }

    /// Build a service for `base_url`, validating the URL.
    pub fn from_base_url(base_url: &str) -> Result<Self, ApiError> {
        ActionctlClient::new(base_url).map(Self::new)
    }

    pub fn client(&self) -> &ActionctlClient {
        &self.client
    }

    fn block_on<F, T>(&self, future: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
    {
        block_on_future(future).map_err(|error| ApiError::transport(format!("could not start the async runtime: {error}")))?
    }
}

impl ActionCatalog for HttpActionService {
    fn get_by_ref_or_id(&self, ref_or_id: &str, auth: &AuthContext) -> Result<Option<Action>, ApiError> {
        let client = self.client.clone();
        let auth = auth.clone();
        match ref_or_id.parse::<ActionRef>() {
            Ok(reference) => {
                debug!(action = %reference, "looking up action by reference");
                self.block_on(async move { client.find_action(&reference, &auth).await })
            }
            Err(_) => {
                let id = ref_or_id.to_string();
                debug!(action_id = %id, "looking up action by id");
                self.block_on(async move {
                    match client.get_action(&id, &auth).await {
                        Ok(action) => Ok(Some(action)),
                        Err(error) if error.is_not_found() => Ok(None),
                        Err(error) => Err(error),
                    }
                })
            }
        }
    }

    fn get_runner_by_name(&self, name: &str, auth: &AuthContext) -> Result<Option<RunnerType>, ApiError> {
        let client = self.client.clone();
        let auth = auth.clone();
        let name = name.to_string();
        debug!(runner = %name, "looking up runner type");
        self.block_on(async move { client.find_runner_type(&name, &auth).await })
    }

    fn list_actions(&self, auth: &AuthContext) -> Result<Vec<Action>, ApiError> {
        let client = self.client.clone();
        let auth = auth.clone();
        self.block_on(async move { client.list_actions(&auth).await })
    }
}

impl ExecutionManager for HttpActionService {
    fn create(&self, execution: &Execution, auth: &AuthContext) -> Result<Execution, ApiError> {
        let client = self.client.clone();
        let auth = auth.clone();
        let execution = execution.clone();
        self.block_on(async move { client.create_execution(&execution, &auth).await })
    }

    fn get_by_id(&self, id: &str, auth: &AuthContext) -> Result<Execution, ApiError> {
        let client = self.client.clone();
        let auth = auth.clone();
        let id = id.to_string();
        self.block_on(async move { client.get_execution(&id, &auth).await })
    }

    fn query(&self, query: &ExecutionQuery, auth: &AuthContext) -> Result<Vec<Execution>, ApiError> {
        let client = self.client.clone();
        let auth = auth.clone();
        let query = query.clone();
        self.block_on(async move { client.query_executions(&query, &auth).await })
    }
}
