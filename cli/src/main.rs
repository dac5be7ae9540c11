//! ksniff CLI - Capture traffic of a running Kubernetes pod
//!
//! Attaches a tcpdump debug container to the pod and writes the pcap
//! stream to stdout, ready to be piped into wireshark or saved to a file.

mod commands;
mod logging;

use clap::{Parser, Subcommand};

use commands::capture::CaptureArgs;
use commands::config::SetArgs;

#[derive(Parser)]
#[command(name = "ksniff")]
#[command(author, version, about = "Capture network traffic of a running Kubernetes pod")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture packets in a pod and stream them as pcap to stdout
    Capture(CaptureArgs),

    /// Manage stored defaults
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show stored defaults
    Show,
    /// Update stored defaults
    Set(SetArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Capture(args) => commands::capture::run(args).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show().await?,
            ConfigAction::Set(args) => commands::config::set(args).await?,
        },
    }

    Ok(())
}
