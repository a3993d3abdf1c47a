mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hasslink_core::Connector;

use crate::cli::{Cli, Command, EventsArgs};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
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
        // Config commands don't need a connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "hasslink", &mut std::io::stdout());
            Ok(())
        }

        // Everything else runs against a live connector
        cmd => {
            let mut connector_config = config::connector_config(&cli.global)?;
            if let Command::Events(EventsArgs {
                event_type: Some(ref event_type),
                ..
            }) = cmd
            {
                connector_config.entity_event_type.clone_from(event_type);
            }

            let connector = Connector::new(connector_config);
            connector.start();

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &connector, &cli.global).await;
            connector.stop().await;
            result
        }
    }
}
