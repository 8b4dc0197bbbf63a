mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sift_core::{Platform, TimeFilter};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sift-cli")]
#[command(about = "Aggregate and categorize social posts about a topic")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the configured platforms and categorize what comes back
    Search {
        /// Topic to research
        query: String,

        /// Restrict to a platform (repeatable); defaults to every configured one
        #[arg(long = "platform")]
        platforms: Vec<Platform>,

        /// 2-letter language code
        #[arg(long, default_value = "en")]
        language: String,

        /// hour, day, week, month, 3months, 6months, year, or all
        #[arg(long, default_value = "week")]
        time_filter: TimeFilter,

        /// JSON file of past relevance feedback: {"relevant": [..], "irrelevant": [..]}
        #[arg(long)]
        hints: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration with secrets redacted
    Config,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = sift_core::load_app_config()?;
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Search {
            query,
            platforms,
            language,
            time_filter,
            hints,
            json,
        } => {
            let request = search::SearchRequest {
                query,
                platforms,
                language,
                time_filter,
                hints,
                json,
            };
            search::run_search(&config, request).await?;
        }
        Commands::Config => println!("{config:#?}"),
    }

    Ok(())
}
