//! veil — mask profile identities in social pages.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use veil_runtime::cli::{identify_cmd, mask_cmd, settings_cmd};

#[derive(Parser)]
#[command(
    name = "veil",
    version,
    about = "Extract the viewed profile's identity from a social page and blur or replace it"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the profile identity from a saved page.
    Identify(identify_cmd::IdentifyArgs),
    /// Mask a saved page and emit the rewritten HTML.
    Mask(mask_cmd::MaskArgs),
    /// Inspect the stored masking configuration.
    Settings(settings_cmd::SettingsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Identify(args) => identify_cmd::run(&args),
        Command::Mask(args) => mask_cmd::run(&args).await,
        Command::Settings(args) => settings_cmd::run(&args).await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
