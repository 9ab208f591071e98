use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reviewdeck_core::backend::open_backend;
use reviewdeck_core::review::ReviewFilter;
use reviewdeck_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "reviewdeck")]
#[command(author, version, about = "Guest reviews for a vacation property, in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI
    Run,
    /// Mount the feed without a terminal UI and print its state as it changes
    Watch {
        /// How long to watch
        #[arg(short, long, default_value_t = 30)]
        seconds: u64,
    },
    /// Submit a guest review (held for moderation)
    Submit {
        #[arg(short = 'n', long)]
        name: String,
        /// 1 to 5 stars
        #[arg(short = 'r', long)]
        rating: u8,
        #[arg(short = 'c', long)]
        comment: String,
    },
    /// List reviews
    List {
        /// all, approved or pending
        #[arg(short, long, default_value = "all")]
        filter: ReviewFilter,
    },
    /// Approve a pending review
    Approve { id: i64 },
    /// Delete a review
    Delete { id: i64 },
}

fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    if to_file {
        // The TUI owns the terminal; logs go to a file instead
        let log_dir = config.log_dir();
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
        let appender = tracing_appender::rolling::never(&log_dir, "reviewdeck.log");
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    let is_tui = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, is_tui)?;

    let backend = open_backend(&config).await?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config, backend).await,
        Some(Commands::Watch { seconds }) => {
            commands::watch::run(&config, backend.into_source(), seconds).await
        }
        Some(Commands::Submit {
            name,
            rating,
            comment,
        }) => commands::submit::run(backend.as_ref(), name, rating, comment).await,
        Some(Commands::List { filter }) => commands::list::run(backend.as_ref(), filter).await,
        Some(Commands::Approve { id }) => commands::moderate::approve(backend.as_ref(), id).await,
        Some(Commands::Delete { id }) => commands::moderate::delete(backend.as_ref(), id).await,
    }
}
