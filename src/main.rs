//! # Requirement Validator CLI (`reqval`)
//!
//! ## Usage
//!
//! ```bash
//! reqval --config ./config/reqval.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `reqval serve` | Start the HTTP server (`POST /validate`) |
//! | `reqval check <path>` | Validate a local document and print the verdict |
//!
//! The API key is read from the environment variable named by
//! `[model].api_key_env` (default `OPENAI_API_KEY`). A `.env` file in the
//! working directory is loaded first if present.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use requirement_validator::config::{self, Config};
use requirement_validator::server::{self, Upload};
use requirement_validator::validator::OpenAiValidator;

const DEFAULT_CONFIG_PATH: &str = "./config/reqval.toml";

/// Requirement Validator: score requirements documents with a
/// chat-completion model.
#[derive(Parser)]
#[command(name = "reqval", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/reqval.toml`. When the default file does not
    /// exist, built-in defaults are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves `POST /validate` and `GET /health`.
    Serve,

    /// Validate a local document.
    ///
    /// Runs the same extract, assemble, and validate pipeline as the HTTP
    /// endpoint and prints the verdict as JSON.
    Check {
        /// Document to validate (`.txt`, `.pdf`, `.png`, `.jpg`, `.jpeg`).
        path: Option<PathBuf>,

        /// Free text sent alongside (or instead of) the document.
        #[arg(long)]
        text: Option<String>,
    },
}

fn resolve_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => config::load_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                config::load_config(default)
            } else {
                Ok(Config::default())
            }
        }
    }
}

fn init_logging(cfg: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run_check(cfg: &Config, path: Option<PathBuf>, text: Option<String>) -> anyhow::Result<()> {
    let upload = match path {
        Some(path) => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read document: {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Some(Upload { filename, bytes })
        }
        None => None,
    };

    let validator = OpenAiValidator::new(cfg.model.clone(), cfg.model.api_key())?;
    let verdict = server::validate_submission(&validator, text.as_deref(), upload).await?;

    println!("{}", serde_json::to_string_pretty(&verdict.into_result())?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is the normal case in production.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let cfg = resolve_config(cli.config.as_deref())?;
    init_logging(&cfg);

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Check { path, text } => {
            run_check(&cfg, path, text).await?;
        }
    }

    Ok(())
}
