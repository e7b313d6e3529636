use std::io::IsTerminal;

use bankpeer::adapter::inbound::cli::command::{Cli, ColorChoice, Commands, ConfigCommand};
use bankpeer::adapter::inbound::cli::output::{self, OutputConfig};
use bankpeer::adapter::inbound::cli::{config, import, metrics, run, show};
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal(),
    };
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose).with_color(color));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received; finishing in-flight institutions");
            let _ = shutdown_tx.send(true);
        }
    });

    let result = match cli.command {
        Commands::Run(args) => run::execute(args, shutdown_rx).await,
        Commands::Show(args) => show::execute(args).await,
        Commands::Import(args) => import::execute(args).await,
        Commands::Metrics => metrics::list(),
        Commands::Config(ConfigCommand::Init(args)) => config::execute_init(&args.path, args.force),
        Commands::Config(ConfigCommand::Show(args)) => config::execute_show(&args.config),
        Commands::Config(ConfigCommand::Validate(args)) => config::execute_validate(&args.config),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
