//! Secret storage commands

use anyhow::Result;
use biolink_broker::BiolinkCore;
use clap::Subcommand;

/// Secret storage subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum SecretCommand {
    /// Store a secret, replacing any previous value
    Store {
        /// Entry name
        key: String,
        /// Secret value
        value: String,
    },

    /// Print a stored secret
    Get {
        /// Entry name
        key: String,
    },

    /// Delete a stored secret
    Delete {
        /// Entry name
        key: String,
    },
}

/// Handle secret command execution
pub async fn handle_secret_command(cmd: SecretCommand, core: &BiolinkCore) -> Result<()> {
    match cmd {
        SecretCommand::Store { key, value } => {
            core.store_secret(&key, &value).await?;
            println!("Stored secret '{key}'");
        }
        SecretCommand::Get { key } => match core.get_secret(&key).await? {
            Some(value) => println!("{value}"),
            None => anyhow::bail!("No secret stored under '{key}'"),
        },
        SecretCommand::Delete { key } => {
            core.delete_secret(&key).await?;
            println!("Deleted secret '{key}'");
        }
    }
    Ok(())
}
