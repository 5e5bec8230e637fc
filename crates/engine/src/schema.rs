//! Merging of runner and action parameter schemas.
//!
//! An action inherits the parameters of its runner type. The merged view keeps
//! both source schemas untouched and derives one logical table from them:
//!
//! - action entries replace same-named runner entries for display metadata
//! - immutability is the OR of both sides, so a runner-level `immutable`
//!   cannot be lifted by the action
//! - every name lands in exactly one of `required`, `optional`, `immutable`

use std::collections::BTreeSet;

use actionctl_types::{Action, ParameterSchema, ParameterSpec, ParameterType, RunnerType};
use tracing::{debug, warn};

/// Logical parameter table of an action combined with its runner type.
#[derive(Debug, Clone, Default)]
pub struct MergedSchema {
    parameters: ParameterSchema,
    runner: ParameterSchema,
    action: ParameterSchema,
    required: BTreeSet<String>,
    optional: BTreeSet<String>,
    immutable: BTreeSet<String>,
    undeclared_required: BTreeSet<String>,
}

impl MergedSchema {
    /// Merge the parameters of `runner` and `action`.
    pub fn for_action(runner: &RunnerType, action: &Action) -> Self {
        Self::merge(
            &runner.runner_parameters,
            &runner.required_parameters,
            &action.parameters,
            &action.required_parameters,
        )
    }

    /// Merge two parameter schemas plus their definition-level required lists.
    pub fn merge(
        runner: &ParameterSchema,
        runner_required: &[String],
        action: &ParameterSchema,
        action_required: &[String],
    ) -> Self {
        let mut parameters = runner.clone();
        for (name, spec) in action {
            parameters.insert(name.clone(), spec.clone());
        }

        let mut immutable = BTreeSet::new();
        for (name, spec) in parameters.iter_mut() {
            let runner_immutable = runner.get(name).is_some_and(|spec| spec.immutable);
            let action_immutable = action.get(name).is_some_and(|spec| spec.immutable);
            spec.immutable = runner_immutable || action_immutable;
            if spec.immutable {
                immutable.insert(name.clone());
            }
        }

        let declared_required = runner_required
            .iter()
            .chain(action_required)
            .cloned()
            .chain(
                runner
                    .iter()
                    .chain(action.iter())
                    .filter(|(_, spec)| spec.required)
                    .map(|(name, _)| name.clone()),
            )
            .filter(|name| !immutable.contains(name));

        let mut required = BTreeSet::new();
        let mut undeclared_required = BTreeSet::new();
        for name in declared_required {
            if parameters.contains_key(&name) {
                required.insert(name);
            } else {
                undeclared_required.insert(name);
            }
        }
        if !undeclared_required.is_empty() {
            warn!(parameters = ?undeclared_required, "required parameters have no schema");
        }

        let optional = parameters
            .keys()
            .filter(|name| !required.contains(*name) && !immutable.contains(*name))
            .cloned()
            .collect();

        debug!(
            total = parameters.len(),
            required = required.len(),
            immutable = immutable.len(),
            "merged parameter schemas"
        );

        Self {
            parameters,
            runner: runner.clone(),
            action: action.clone(),
            required,
            optional,
            immutable,
            undeclared_required,
        }
    }

    /// The merged parameter table.
    pub fn parameters(&self) -> &ParameterSchema {
        &self.parameters
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.get(name)
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    pub fn optional(&self) -> &BTreeSet<String> {
        &self.optional
    }

    pub fn immutable(&self) -> &BTreeSet<String> {
        &self.immutable
    }

    /// Names listed as required by a definition but declared by neither schema.
    ///
    /// These are outside the three partitions; help rendering reports them as
    /// missing schema.
    pub fn undeclared_required(&self) -> &BTreeSet<String> {
        &self.undeclared_required
    }

    /// Type used to coerce a raw value for `name`.
    ///
    /// The runner's declaration is consulted first, then the action's; the
    /// first one naming a supported type wins.
    pub fn declared_type(&self, name: &str) -> Option<ParameterType> {
        [&self.runner, &self.action]
            .into_iter()
            .find_map(|schema| schema.get(name).and_then(ParameterSpec::parameter_type))
    }
}
