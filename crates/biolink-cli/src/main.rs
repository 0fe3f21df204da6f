//! Operator CLI for Biolink
//!
//! Drives a `BiolinkCore` built from the local configuration: the fallback
//! (no-hardware) biometric platform plus the encrypted on-disk secret store.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod context;

use commands::{
    auth,
    secret::{handle_secret_command, SecretCommand},
    sign,
};

#[derive(Parser)]
#[command(name = "biolink")]
#[command(about = "Biolink - biometric capability broker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".biolink/config.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether biometrics can be used right now
    Availability,

    /// Prompt for biometric authentication
    Authenticate {
        /// Reason shown to the user
        #[arg(short, long)]
        reason: String,

        /// Give up after this many milliseconds
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Allow the device credential as a fallback
        #[arg(long)]
        fallback: bool,
    },

    /// Secret storage operations
    #[command(subcommand)]
    Secret(SecretCommand),

    /// Sign a challenge with the device key
    Sign {
        /// Challenge text to sign
        challenge: String,
    },

    /// Print the device public key
    PublicKey,

    /// Produce signature headers for a request body
    Headers {
        /// Exact request body to sign
        body: String,

        /// Header carrying the signature
        #[arg(long, default_value = "X-Body-Signature")]
        header_name: String,

        /// Leave out the public-key header
        #[arg(long)]
        no_public_key: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = context::load_config(&cli.config)?;

    // Initialize logging
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.log_level.to_lowercase()
    };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let core = context::build_core(config).await?;

    match cli.command {
        Commands::Availability => {
            auth::show_availability(&core)?;
        }

        Commands::Authenticate {
            reason,
            timeout_ms,
            fallback,
        } => {
            auth::authenticate(&core, &reason, timeout_ms, fallback).await?;
        }

        Commands::Secret(cmd) => {
            handle_secret_command(cmd, &core).await?;
        }

        Commands::Sign { challenge } => {
            sign::sign_challenge(&core, &challenge).await?;
        }

        Commands::PublicKey => {
            sign::show_public_key(&core).await?;
        }

        Commands::Headers {
            body,
            header_name,
            no_public_key,
        } => {
            sign::show_headers(&core, &body, header_name, !no_public_key).await?;
        }
    }

    Ok(())
}
