//! Submission of a new execution for an action.

use actionctl_api::AuthContext;
use actionctl_types::{ActionRef, Execution, Parameters};
use tracing::info;

use crate::{error::EngineError, service::ExecutionManager};

/// Build an execution request for `action` and hand it to `manager`.
///
/// The request carries no status; the returned execution is the one created
/// by the service, with its id and initial status. Collaborator errors pass
/// through unchanged and nothing is retried.
pub fn submit_execution<M>(
    manager: &M,
    action: &ActionRef,
    parameters: Parameters,
    auth: &AuthContext,
) -> Result<Execution, EngineError>
where
    M: ExecutionManager + ?Sized,
{
    let request = Execution::new(action.clone(), parameters);
    info!(action = %action, parameters = request.parameters.len(), "submitting execution");

    let created = manager.create(&request, auth)?;
    info!(
        action = %action,
        execution_id = created.id.as_deref().unwrap_or("<none>"),
        status = created.status.as_ref().map(|status| status.as_str()).unwrap_or("<unset>"),
        "execution submitted"
    );
    Ok(created)
}
