use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dispatch_types::Scope;
use dispatch_util::{FormConfig, default_config_path};

mod fixture;

/// Replay scripted campaign form sessions.
#[derive(Parser, Debug)]
#[command(name = "dispatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a fixture and print the resulting field views and payload
    Run {
        /// Path to a YAML or JSON fixture
        #[arg(long, short = 'f')]
        fixture: PathBuf,

        /// Workspace scope passed to every backend call
        #[arg(long, default_value = "default")]
        scope: String,
    },
    /// Print the resolved form configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = FormConfig::load();

    match cli.command {
        Command::Run { fixture, scope } => {
            let loaded = fixture::load_fixture(&fixture)?;
            let report = fixture::replay(loaded, Scope::new(scope), config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Config => {
            let out = serde_json::json!({
                "path": default_config_path().display().to_string(),
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
