use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use advancements::config::DataPaths;

mod cli;

#[derive(Parser)]
#[command(name = "advancements")]
#[command(about = "Configuration-defined advancement trees with per-player progress")]
#[command(version)]
struct Cli {
    /// Data directory (defaults to ~/.advancements)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate every advancement tree
    Load {
        /// Print the load report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a player's progress on a tree or a single advancement
    Progress {
        tree: String,
        advancement: Option<String>,
        #[arg(long)]
        player: Uuid,
    },

    /// Feed an event, e.g. `event block_break STONE`
    Event {
        kind: String,
        value: Option<String>,
        #[arg(long)]
        player: Uuid,
        #[arg(long, default_value_t = 1)]
        amount: u64,
    },

    /// Read events (`kind [value] [amount]` per line) from stdin
    Replay {
        #[arg(long)]
        player: Uuid,
    },

    /// Activate an advancement (tree.advancement) for a player
    Activate {
        path: String,
        #[arg(long)]
        player: Uuid,
    },

    /// Complete an advancement (tree.advancement) for a player, ignoring requirements
    Complete {
        path: String,
        #[arg(long)]
        player: Uuid,
    },

    /// Create config.toml and the example tree
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let data_dir = cli.data_dir.unwrap_or_else(DataPaths::default_data_dir);

    match cli.command {
        Commands::Load { json } => {
            cli::load::load_command(&data_dir, json).await?;
        }
        Commands::Progress {
            tree,
            advancement,
            player,
        } => {
            cli::progress::progress_command(&data_dir, &tree, advancement.as_deref(), player)
                .await?;
        }
        Commands::Event {
            kind,
            value,
            player,
            amount,
        } => {
            cli::event::event_command(&data_dir, &kind, value.as_deref(), player, amount).await?;
        }
        Commands::Replay { player } => {
            cli::replay::replay_command(&data_dir, player).await?;
        }
        Commands::Activate { path, player } => {
            cli::progress::activate_command(&data_dir, &path, player).await?;
        }
        Commands::Complete { path, player } => {
            cli::progress::complete_command(&data_dir, &path, player).await?;
        }
        Commands::Init { force } => {
            cli::init::init_command(&data_dir, force).await?;
        }
    }

    Ok(())
}
