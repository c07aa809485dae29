//! hg-blame - per-line Mercurial attribution for analysis tooling
//!
//! # Usage
//! ```bash
//! hg-blame blame --dir /path/to/checkout src/a.rs src/b.rs   # JSON blame map
//! hg-blame revision /path/to/checkout                       # hg id -i
//! hg-blame supports /path/to/checkout                       # is it an hg root?
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hg_blame::{BlameRequest, EngineConfig, ExecutionContext, MercurialProvider, ScmProvider};

/// Per-line Mercurial blame for source-analysis tooling
#[derive(Parser)]
#[command(name = "hg-blame")]
#[command(about = "Attribute each line of a file to the Mercurial revision that last changed it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Mercurial executable
    #[arg(long, global = true, default_value = "hg")]
    hg: String,

    /// Per-process timeout in seconds (0 disables it)
    #[arg(long, global = true, default_value_t = 60)]
    timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Blame files and print the result map as JSON
    Blame {
        /// Working directory the file paths are relative to
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Maximum number of concurrent hg processes
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Files handed to the scheduler per pass
        #[arg(long, default_value_t = hg_blame::hg::context::DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Attribute whitespace-only changes too
        #[arg(long)]
        no_ignore_whitespace: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Files to blame
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the working copy revision id
    Revision {
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },
    /// Check whether a directory is the root of a Mercurial checkout
    Supports {
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = EngineConfig {
        hg_binary: cli.hg,
        timeout: (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout)),
        ..EngineConfig::default()
    };

    match cli.command {
        Commands::Blame {
            dir,
            jobs,
            batch_size,
            no_ignore_whitespace,
            pretty,
            files,
        } => {
            if let Some(jobs) = jobs {
                config.max_concurrency = jobs;
            }
            config.batch_size = batch_size;
            config.ignore_whitespace = !no_ignore_whitespace;

            let provider = MercurialProvider::new(ExecutionContext::new(config));

            // Ctrl+C cancels the request and kills running hg processes
            let cancel = provider.context().cancellation_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("Interrupted, cancelling blame");
                    cancel.cancel();
                }
            });

            let request = BlameRequest::for_files(&dir, files);
            let results = match provider.blame(&request).await {
                Ok(results) => results,
                Err(e) => {
                    eprintln!("✗ Blame failed: {}", e);
                    return Ok(ExitCode::from(2));
                }
            };

            let json = if pretty {
                serde_json::to_string_pretty(&results)?
            } else {
                serde_json::to_string(&results)?
            };
            println!("{}", json);

            if results.values().all(|r| r.is_success()) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }
        Commands::Revision { dir } => {
            let provider = MercurialProvider::new(ExecutionContext::new(config));
            match provider.revision_id(&dir).await {
                Some(id) => {
                    println!("{}", id);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("✗ No Mercurial revision for {}", dir.display());
                    Ok(ExitCode::from(1))
                }
            }
        }
        Commands::Supports { dir } => {
            let provider = MercurialProvider::new(ExecutionContext::new(config));
            let supported = provider.supports(&dir);
            println!("{}", supported);
            Ok(if supported { ExitCode::SUCCESS } else { ExitCode::from(1) })
        }
    }
}
