mod cli;
mod commands;
mod error;
mod output;

use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use powerview_config::Config;
use powerview_core::{Hub, HubConfig};

use crate::cli::{Cli, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "powerview", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = powerview_config::load_config()?;
            let mut global = cli.global;
            global.output = Some(resolve_output(&global, &cfg)?);

            let hub = Hub::new(build_hub_config(&global, &cfg)?)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &hub, &global).await;
            hub.shutdown().await;
            result
        }
    }
}

/// `--output` / `POWERVIEW_OUTPUT` win; otherwise `[defaults] output`.
fn resolve_output(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    if let Some(ref format) = global.output {
        return Ok(format.clone());
    }
    OutputFormat::from_str(&cfg.defaults.output, true).map_err(|_| CliError::Validation {
        field: "defaults.output".into(),
        reason: format!(
            "expected table, json, json-compact or plain, got '{}'",
            cfg.defaults.output
        ),
    })
}

/// Build a `HubConfig` from the hub profile and CLI overrides.
fn build_hub_config(global: &GlobalOpts, cfg: &Config) -> Result<HubConfig, CliError> {
    let mut hub_config = if let Some(ref host) = global.host {
        // An explicit address needs no profile; pacing comes from [defaults].
        let profile = powerview_config::HubProfile {
            host: host.clone(),
            timeout: None,
            initial_delay_ms: None,
            request_interval_ms: None,
        };
        powerview_config::profile_to_hub_config(&profile, &cfg.defaults)?
    } else {
        let (name, profile) = cfg.hub(global.hub.as_deref())?;
        tracing::debug!(profile = name, host = %profile.host, "using hub profile");
        powerview_config::profile_to_hub_config(profile, &cfg.defaults)?
    };

    if let Some(secs) = global.timeout {
        hub_config.timeout = Duration::from_secs(secs);
    }
    Ok(hub_config)
}
