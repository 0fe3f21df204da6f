//! Availability and authentication commands

use anyhow::Result;
use biolink_broker::{BiolinkCore, PromptOptions};
use std::time::Duration;
use tracing::warn;

/// Print the current sensor availability as JSON
pub fn show_availability(core: &BiolinkCore) -> Result<()> {
    let availability = core.get_sensor_availability();
    println!("{}", serde_json::to_string_pretty(&availability)?);
    Ok(())
}

/// Run one authentication prompt and print its outcome as JSON
pub async fn authenticate(
    core: &BiolinkCore,
    reason: &str,
    timeout_ms: Option<u64>,
    fallback: bool,
) -> Result<()> {
    let mut options = PromptOptions::new().with_device_credential_fallback(fallback);
    if let Some(timeout_ms) = timeout_ms {
        options = options.with_timeout(Duration::from_millis(timeout_ms));
    }

    let outcome = core.authenticate(reason, options).await?;
    if !outcome.is_success() {
        warn!(?outcome, "authentication did not succeed");
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
