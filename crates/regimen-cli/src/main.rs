use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod paths;

#[derive(Parser)]
#[command(name = "regimen-cli", version, about = "Regimen CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a dated schedule
    Plan(commands::plan::PlanArgs),
    /// Settings management
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Inspect the item catalog
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
}

fn main() {
    // stdout carries schedules and JSON; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Catalog { action } => commands::catalog::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
