mod cli;
mod commands;
mod output;

use std::{env, io};

use actionctl_api::AuthContext;
use actionctl_engine::HttpActionService;
use actionctl_util::{ClientConfig, redact_sensitive};
use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{build_cli, flag_anywhere},
    commands::Commands,
};

fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    init_tracing(flag_anywhere(&matches, "verbose"));

    let config = ClientConfig::load().context("could not load the client configuration")?;
    debug!(config = %redact_sensitive(&serde_json::to_string(&config)?), "resolved client configuration");

    let service = HttpActionService::from_base_url(&config.api_url).context("could not create the API client")?;
    let auth = config.auth_token.clone().map(AuthContext::with_token).unwrap_or_default();
    let working_dir = env::current_dir().context("could not determine the working directory")?;

    let result = Commands::new(&service, auth, flag_anywhere(&matches, "json"), working_dir, io::stdout()).dispatch(&matches);
    if let Some(usage) = result.as_ref().err().and_then(|error| error.downcast_ref::<clap::Error>()) {
        usage.exit();
    }
    result
}

/// Log to stderr; `RUST_LOG` wins, else `--verbose` selects debug.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
