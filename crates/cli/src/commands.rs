//! Dispatch of parsed subcommands against the action service.

use std::{io::Write, path::PathBuf};

use actionctl_api::AuthContext;
use actionctl_engine::{ActionCatalog, ActionInvoker, ExecutionManager, ExecutionPoller, InvocationRequest};
use actionctl_types::{ExecutionQuery, RunMode};
use anyhow::{Context, Result};
use clap::{ArgMatches, Command, error::ErrorKind};
use tracing::debug;

use crate::{
    cli::{DEFAULT_EXECUTION_LIMIT, InvokeArgs, build_cli},
    output::{action_properties, action_rows, execution_properties, execution_rows, render_properties, render_table, write_json},
};

/// Runs one command line against `service`, writing everything to `out`.
///
/// Usage errors come back as [`clap::Error`] so the caller can exit the way
/// clap does.
pub struct Commands<'s, S: ?Sized, W> {
    service: &'s S,
    auth: AuthContext,
    json: bool,
    working_dir: PathBuf,
    poller: ExecutionPoller,
    out: W,
}

impl<'s, S, W> Commands<'s, S, W>
where
    S: ActionCatalog + ExecutionManager + ?Sized,
    W: Write,
{
    pub fn new(service: &'s S, auth: AuthContext, json: bool, working_dir: PathBuf, out: W) -> Self {
        Self {
            service,
            auth,
            json,
            working_dir,
            poller: ExecutionPoller::default(),
            out,
        }
    }

    pub fn dispatch(&mut self, matches: &ArgMatches) -> Result<()> {
        match matches.subcommand() {
            Some(("action", sub)) => self.action(sub),
            Some(("execution", sub)) => self.execution(sub),
            _ => Ok(()),
        }
    }

    fn action(&mut self, matches: &ArgMatches) -> Result<()> {
        match matches.subcommand() {
            Some(("list", _)) => {
                let actions = self.service.list_actions(&self.auth)?;
                if self.json {
                    write_json(&mut self.out, &actions)
                } else {
                    let table = render_table(&["id", "pack", "name", "description"], &action_rows(&actions));
                    writeln!(self.out, "{table}")?;
                    Ok(())
                }
            }
            Some(("get", sub)) => {
                let ref_or_id = required_value(sub, "ref_or_id")?;
                match self.service.get_by_ref_or_id(ref_or_id, &self.auth)? {
                    Some(action) if self.json => write_json(&mut self.out, &action),
                    Some(action) => {
                        writeln!(self.out, "{}", render_properties(&action_properties(&action)?))?;
                        Ok(())
                    }
                    None => {
                        writeln!(self.out, "Action \"{ref_or_id}\" is not found.")?;
                        Ok(())
                    }
                }
            }
            Some((name @ ("run" | "execute"), sub)) => self.invoke(name, InvokeArgs::from_matches(name, sub)),
            _ => Ok(()),
        }
    }

    fn invoke(&mut self, name: &str, args: InvokeArgs) -> Result<()> {
        let invoker = ActionInvoker::new(self.service, self.service, self.auth.clone()).with_poller(self.poller);

        if args.help {
            match &args.ref_or_id {
                Some(ref_or_id) => match invoker.describe(ref_or_id) {
                    Ok(help) => writeln!(self.out, "{help}")?,
                    Err(error) if error.is_not_found() => writeln!(self.out, "Action \"{ref_or_id}\" is not found.")?,
                    Err(error) => writeln!(self.out, "ERROR: Unable to print help for action \"{ref_or_id}\". {error}")?,
                },
                None => write!(self.out, "{}", invoke_subcommand(name).render_help())?,
            }
            return Ok(());
        }

        let Some(ref_or_id) = args.ref_or_id else {
            return Err(invoke_subcommand(name)
                .error(ErrorKind::MissingRequiredArgument, "too few arguments")
                .into());
        };

        let mode = if args.asynchronous {
            RunMode::Asynchronous
        } else {
            RunMode::Synchronous
        };
        let request = InvocationRequest {
            ref_or_id,
            parameters: args.parameters,
            mode,
            working_dir: self.working_dir.clone(),
        };
        debug!(action = %request.ref_or_id, ?mode, "invoking action");

        let json = self.json;
        let out = &mut self.out;
        let outcome = invoker.invoke(&request, |_| {
            if !json {
                let _ = write!(out, ".");
                let _ = out.flush();
            }
        })?;
        if mode == RunMode::Synchronous && !json {
            writeln!(self.out)?;
        }

        let execution = outcome.display_execution();
        if json {
            write_json(&mut self.out, &execution)?;
        } else {
            writeln!(self.out, "{}", render_properties(&execution_properties(&execution)?))?;
        }

        if mode == RunMode::Asynchronous && !json {
            writeln!(
                self.out,
                "To get the results, execute:\n    $ actionctl execution get {}",
                execution.id.as_deref().unwrap_or_default()
            )?;
        }
        Ok(())
    }

    fn execution(&mut self, matches: &ArgMatches) -> Result<()> {
        match matches.subcommand() {
            Some(("list", sub)) => {
                let limit = sub.get_one::<u32>("last").copied().unwrap_or(DEFAULT_EXECUTION_LIMIT);
                let query = ExecutionQuery {
                    action_name: sub.get_one::<String>("action_name").cloned(),
                    action_id: sub.get_one::<String>("action_id").cloned(),
                    limit: (limit > 0).then_some(limit),
                };
                let executions = self.service.query(&query, &self.auth)?;
                if self.json {
                    write_json(&mut self.out, &executions)
                } else {
                    let table = render_table(&["id", "action", "status", "start_timestamp"], &execution_rows(&executions));
                    writeln!(self.out, "{table}")?;
                    Ok(())
                }
            }
            Some(("get", sub)) => {
                let id = required_value(sub, "id")?;
                match self.service.get_by_id(id, &self.auth) {
                    Ok(execution) if self.json => write_json(&mut self.out, &execution),
                    Ok(execution) => {
                        writeln!(self.out, "{}", render_properties(&execution_properties(&execution)?))?;
                        Ok(())
                    }
                    Err(error) if error.is_not_found() => {
                        writeln!(self.out, "Execution \"{id}\" is not found.")?;
                        Ok(())
                    }
                    Err(error) => Err(error.into()),
                }
            }
            _ => Ok(()),
        }
    }
}

/// The built `action <name>` subcommand, for usage text and usage errors.
fn invoke_subcommand(name: &str) -> Command {
    let mut cli = build_cli();
    cli.build();
    let found = cli
        .find_subcommand("action")
        .and_then(|action| action.find_subcommand(name))
        .cloned();
    found.unwrap_or(cli)
}

fn required_value<'m>(matches: &'m ArgMatches, id: &str) -> Result<&'m str> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("missing required argument '{id}'"))
}
