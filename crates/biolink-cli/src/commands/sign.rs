//! Signing commands

use anyhow::Result;
use biolink_broker::{signature_headers_with, BiolinkCore, SignatureHeaderOptions};

/// Print the base64 signature over `challenge`
pub async fn sign_challenge(core: &BiolinkCore, challenge: &str) -> Result<()> {
    println!("{}", core.sign_challenge(challenge).await?);
    Ok(())
}

/// Print the base64 device public key
pub async fn show_public_key(core: &BiolinkCore) -> Result<()> {
    println!("{}", core.public_key().await?);
    Ok(())
}

/// Print the signature headers for `body` as JSON
pub async fn show_headers(
    core: &BiolinkCore,
    body: &str,
    header_name: String,
    include_public_key: bool,
) -> Result<()> {
    let options = SignatureHeaderOptions {
        header_name,
        include_public_key,
    };
    let headers = signature_headers_with(core, body, &options).await?;
    println!("{}", serde_json::to_string_pretty(&headers)?);
    Ok(())
}
