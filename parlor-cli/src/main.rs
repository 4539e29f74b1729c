//! Main entry point for the Parlor command-line client.

use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use dotenv::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

/// Parlor CLI
#[derive(Parser)]
#[command(name = "parlor")]
#[command(about = "Chat-room client with an incrementally updated timeline", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the Parlor CLI
#[derive(Subcommand)]
enum Commands {
    /// Fetch recent history for a room, print it, then follow live events
    View(commands::view::ViewArgs),

    /// Replay a recorded transcript of event batches and print the final timeline
    Replay(commands::replay::ReplayArgs),

    /// Print a default configuration file
    Config {
        /// Format of the configuration file to print (yaml or json). Defaults to yaml.
        #[arg(
            long,
            short,
            help = "Format of the configuration file to print (yaml or json). Defaults to yaml."
        )]
        format: Option<String>,
    },

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)
        #[arg(
            long,
            short,
            help = "The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)"
        )]
        shell: String,
    },
}

/// Installs the log subscriber, preferring `RUST_LOG` over
/// `default_filter`. Called once by whichever subcommand runs.
pub(crate) fn init_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::View(args) => {
            commands::view::handle_view(args).await?;
        }
        Commands::Replay(args) => {
            init_logging("warn");
            commands::replay::handle_replay(&args)?;
        }
        Commands::Config { format } => {
            let format = format.unwrap_or_else(|| "yaml".to_string());
            commands::config::print_config(&format)?;
        }
        Commands::Completion { shell } => {
            let shell = shell
                .parse::<clap_complete::Shell>()
                .map_err(|_| anyhow!("invalid shell type: {shell}"))?;
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "parlor", &mut std::io::stdout());
        }
    }

    Ok(())
}
