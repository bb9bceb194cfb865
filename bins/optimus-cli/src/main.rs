mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "optimus-cli")]
#[command(about = "Optimus CLI - Judge code locally against JSON test cases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a source file against a test-case file
    Run {
        /// Language or execution model (e.g., python, js, compiled)
        #[arg(short, long)]
        language: String,

        /// Source file containing the entry point
        #[arg(short, long)]
        source: PathBuf,

        /// JSON file holding an array of {"args", "expected"} test cases
        #[arg(short, long)]
        tests: PathBuf,

        /// Per-test-case timeout in milliseconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Print outcomes as JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Print the entry point the judge would call
    Resolve {
        #[arg(short, long)]
        language: String,

        #[arg(short, long)]
        source: PathBuf,
    },

    /// Print the guest-language literal for a JSON value
    Marshal {
        /// JSON value, e.g. '[["a","b"],["c","d"]]'
        #[arg(short, long)]
        value: String,

        /// Target language
        #[arg(short, long, default_value = "java")]
        language: String,
    },

    /// List supported languages and their execution models
    Languages,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            language,
            source,
            tests,
            timeout,
            json,
        } => {
            let all_passed = commands::run(&language, &source, &tests, timeout, json).await?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Resolve { language, source } => {
            commands::resolve(&language, &source)?;
        }
        Commands::Marshal { value, language } => {
            commands::marshal(&value, &language)?;
        }
        Commands::Languages => {
            commands::languages();
        }
    }

    Ok(())
}
