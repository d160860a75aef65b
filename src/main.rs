use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod admin;
mod config;
mod credential;
mod error;
mod naming;
mod provision;
mod state;

use crate::config::AppConfig;
use crate::credential::{secret, SecretSource};
use crate::provision::{apply, verify, ApplyOptions, Plan};
use crate::state::AppState;

#[derive(Parser)]
#[command(
    name = "osc-provision",
    version,
    about = "Provision the osc MongoDB database and its application user"
)]
struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the provisioning steps as JSON without touching the server
    Plan {
        #[arg(long = "collection")]
        collections: Vec<String>,
    },
    /// Create the user (and any requested collections)
    Apply {
        #[arg(long = "collection")]
        collections: Vec<String>,
        /// Treat an existing user as success
        #[arg(long)]
        skip_existing_user: bool,
        /// Generate a random password when none is configured
        #[arg(long)]
        generate_password: bool,
    },
    /// Check the server against the plan; exits non-zero on mismatch
    Verify {
        #[arg(long = "collection")]
        collections: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "osc_provision=debug,mongodb=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = AppConfig::from_env().context("load configuration")?;

    match cli.command {
        Command::Plan { collections } => {
            let plan = Plan::build(&config, &collections)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Apply {
            collections,
            skip_existing_user,
            generate_password,
        } => {
            let state = AppState::init(config).await?;
            let plan = Plan::build(&state.config, &collections)?;
            let (password, source) =
                secret::resolve(state.config.password.as_ref(), generate_password)?;
            tracing::info!(db = %plan.database, user = %plan.principal.user, "provisioning");

            let mut report =
                apply(&state, &plan, password.clone(), ApplyOptions { skip_existing_user })
                    .await
                    .with_context(|| format!("provision database {}", plan.database))?;

            if source == SecretSource::Generated {
                report.reveal_generated_password(&password);
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Verify { collections } => {
            let state = AppState::init(config).await?;
            let plan = Plan::build(&state.config, &collections)?;
            let verification = verify(&state, &plan).await?;
            println!("{}", serde_json::to_string_pretty(&verification)?);
            if !verification.passed() {
                anyhow::bail!("verification failed for database {}", plan.database);
            }
        }
    }

    Ok(())
}
