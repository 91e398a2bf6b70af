//! stringdb CLI - Main entry point

use clap::Parser;
use std::process;
use stringdb_client::commands::{self, Context};
use stringdb_client::{Cli, Commands};
use stringdb_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Verbose mode logs debug to the console, otherwise warnings only
    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("stringdb")
        .build();

    // Environment variables take precedence
    let log_config = if LogConfig::env_overrides_present() {
        LogConfig::from_env().unwrap_or(log_config)
    } else {
        log_config
    };

    // The CLI works without logging
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> stringdb_client::Result<()> {
    let ctx = Context::from_cli(cli)?;

    match &cli.command {
        Commands::Download { taxon, table } => commands::download::run(&ctx, taxon, table).await,

        Commands::Versions => commands::versions::run(&ctx).await,

        Commands::Map {
            taxon,
            ids,
            limit,
            local,
            strict,
        } => {
            if *local {
                commands::map::run_local(&ctx, taxon, ids, *strict).await
            } else {
                commands::map::run(&ctx, taxon, ids, *limit).await
            }
        },

        Commands::Subnetwork {
            taxon,
            ids,
            threshold,
            cluster,
            remove_homologous,
            min_bitscore,
            symbols,
        } => {
            let args = commands::subnetwork::SubnetworkArgs {
                taxon: taxon.clone(),
                ids: ids.clone(),
                threshold: *threshold,
                cluster: cluster.clone(),
                remove_homologous: *remove_homologous,
                min_bitscore: *min_bitscore,
                symbols: *symbols,
            };
            commands::subnetwork::run(&ctx, &args).await
        },
    }
}
