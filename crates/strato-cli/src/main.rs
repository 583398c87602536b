//! strato CLI binary entrypoint.
//!
//! This is the main entry point for the `strato` command-line tool.

use std::io;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use strato_cli::cli::{Cli, Commands};
use strato_cli::commands::{RouterCommand, SecurityGroupRuleCommand};
use strato_cli::{CliError, FormatterRegistry, GatewayClient, OutputFormat};

fn main() -> ExitCode {
    // Parse errors exit with status 2 before anything is contacted
    let cli = Cli::parse();

    init_tracing(cli.debug);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--debug`.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.format);
    let router_formatters = FormatterRegistry::routers();
    let rule_formatters = FormatterRegistry::empty();

    let mut client = GatewayClient::connect(&cli.gateway).await?;
    client.set_request_timeout(Duration::from_secs(cli.timeout));

    debug!(server = client.server_version(), "Connected to gateway");

    let mut stdout = io::stdout().lock();
    let result = match &cli.command {
        Commands::Router { command } => {
            RouterCommand::new(&mut client, &router_formatters)
                .execute(&mut stdout, &format, command)
                .await
        }
        Commands::SecurityGroupRule { command } => {
            SecurityGroupRuleCommand::new(&mut client, &rule_formatters)
                .execute(&mut stdout, &format, command)
                .await
        }
    };

    // Close on both paths so the gateway sees a close frame
    if let Err(e) = client.close().await {
        debug!(error = %e, "Failed to close gateway connection");
    }
    result
}
