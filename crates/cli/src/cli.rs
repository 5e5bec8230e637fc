//! The clap command tree.

use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command, value_parser};

/// Default number of executions shown by `execution list`.
pub const DEFAULT_EXECUTION_LIMIT: u32 = 50;

pub fn build_cli() -> Command {
    Command::new("actionctl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Invoke automation actions and inspect their executions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging on stderr"),
        )
        .subcommand(action_command())
        .subcommand(execution_command())
}

fn action_command() -> Command {
    Command::new("action")
        .about("List, inspect and run actions")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List all actions"))
        .subcommand(
            Command::new("get")
                .about("Get an individual action")
                .arg(ref_or_id_arg().required(true)),
        )
        .subcommand(
            invoke_command("run", "Invoke an action manually and wait for it to finish").arg(
                Arg::new("async")
                    .long("async")
                    .short('a')
                    .action(ArgAction::SetTrue)
                    .help("Do not wait for the action to finish"),
            ),
        )
        .subcommand(invoke_command(
            "execute",
            "Invoke an action manually without waiting for it to finish",
        ))
}

/// `run` and `execute` share their arguments; `-h` prints the action's
/// parameter help instead of the subcommand usage.
fn invoke_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .disable_help_flag(true)
        .arg(ref_or_id_arg())
        .arg(
            Arg::new("parameters")
                .num_args(0..)
                .trailing_var_arg(true)
                .help("List of keyword args, positional args, and optional args for the action"),
        )
        .arg(
            Arg::new("help")
                .long("help")
                .short('h')
                .action(ArgAction::SetTrue)
                .help("Print usage for the given action"),
        )
}

fn ref_or_id_arg() -> Arg {
    Arg::new("ref_or_id")
        .value_name("REF_OR_ID")
        .help("Fully qualified name (pack.action_name) or id of the action")
}

fn execution_command() -> Command {
    Command::new("execution")
        .about("Inspect action executions")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("List the most recent executions")
                .arg(
                    Arg::new("action_name")
                        .long("action-name")
                        .value_name("NAME")
                        .help("Action name to filter the list"),
                )
                .arg(
                    Arg::new("action_id")
                        .long("action-id")
                        .value_name("ID")
                        .help("Action id to filter the list"),
                )
                .group(ArgGroup::new("filter").args(["action_name", "action_id"]).multiple(false))
                .arg(
                    Arg::new("last")
                        .long("last")
                        .short('n')
                        .value_name("N")
                        .value_parser(value_parser!(u32))
                        .default_value("50")
                        .help("List N most recent executions; 0 lists all"),
                ),
        )
        .subcommand(
            Command::new("get")
                .about("Get an individual execution")
                .arg(Arg::new("id").required(true).help("Id of the execution")),
        )
}

/// Arguments of `action run` and `action execute`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokeArgs {
    pub ref_or_id: Option<String>,
    pub parameters: Vec<String>,
    pub help: bool,
    pub asynchronous: bool,
}

impl InvokeArgs {
    /// Collect the invocation arguments of subcommand `name`.
    ///
    /// The trailing parameter list swallows everything after its first token,
    /// so `-h/--help` (and `-a/--async` on `run`) are lifted out of it here.
    pub fn from_matches(name: &str, matches: &ArgMatches) -> Self {
        let accepts_async = name == "run";
        let mut args = Self {
            ref_or_id: matches.get_one::<String>("ref_or_id").cloned(),
            parameters: Vec::new(),
            help: matches.get_flag("help"),
            asynchronous: name == "execute" || (accepts_async && matches.get_flag("async")),
        };

        for token in matches.get_many::<String>("parameters").into_iter().flatten() {
            match token.as_str() {
                "-h" | "--help" => args.help = true,
                "-a" | "--async" if accepts_async => args.asynchronous = true,
                _ => args.parameters.push(token.clone()),
            }
        }
        args
    }
}

/// Returns `true` when `id` is set on `matches` or any selected subcommand.
pub fn flag_anywhere(matches: &ArgMatches, id: &str) -> bool {
    let mut current = Some(matches);
    while let Some(level) = current {
        if level.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false) {
            return true;
        }
        current = level.subcommand().map(|(_, sub)| sub);
    }
    false
}
