//! Request-body signature headers
//!
//! A body is signed with the device key and sent alongside its public half:
//!
//! ```text
//! X-Body-Signature: <base64 Ed25519 signature over the exact body bytes>
//! X-Public-Key:     <base64 32-byte Ed25519 public key>
//! ```
//!
//! The signature header name is configurable and the public key can be left
//! out; see [`SignatureHeaderOptions`]. Servers check a header pair with
//! [`verify_body_signature`].

use crate::facade::BiolinkCore;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use biolink_core::BiolinkError;
use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH};
use serde::Serialize;
use std::collections::BTreeMap;

/// Header carrying the body signature
pub const BODY_SIGNATURE_HEADER: &str = "X-Body-Signature";

/// Header carrying the signer's public key
pub const PUBLIC_KEY_HEADER: &str = "X-Public-Key";

/// How [`signature_headers_with`] names and fills the headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaderOptions {
    /// Name of the header carrying the signature
    pub header_name: String,
    /// Also emit [`PUBLIC_KEY_HEADER`]
    pub include_public_key: bool,
}

impl Default for SignatureHeaderOptions {
    fn default() -> Self {
        Self {
            header_name: BODY_SIGNATURE_HEADER.to_string(),
            include_public_key: true,
        }
    }
}

impl SignatureHeaderOptions {
    /// Carry the signature under `name` instead of [`BODY_SIGNATURE_HEADER`]
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Emit the signature header only
    pub fn without_public_key(mut self) -> Self {
        self.include_public_key = false;
        self
    }
}

/// Sign `body` and return the signature and public-key headers
pub async fn signature_headers(
    core: &BiolinkCore,
    body: &str,
) -> Result<BTreeMap<String, String>, BiolinkError> {
    signature_headers_with(core, body, &SignatureHeaderOptions::default()).await
}

/// Sign `body` and return headers shaped by `options`
pub async fn signature_headers_with(
    core: &BiolinkCore,
    body: &str,
    options: &SignatureHeaderOptions,
) -> Result<BTreeMap<String, String>, BiolinkError> {
    if options.header_name.trim().is_empty() {
        return Err(BiolinkError::invalid_argument(
            "Signature header name must not be empty",
        ));
    }
    if options.include_public_key && options.header_name.eq_ignore_ascii_case(PUBLIC_KEY_HEADER) {
        return Err(BiolinkError::invalid_argument(format!(
            "Signature header name collides with {PUBLIC_KEY_HEADER}"
        )));
    }

    tracing::debug!(body_len = body.len(), header = %options.header_name, "signing request body");
    let signature = core.sign_challenge(body).await.map_err(|e| {
        tracing::error!(error = %e, "failed to generate signature headers");
        e
    })?;

    let mut headers = BTreeMap::from([(options.header_name.clone(), signature)]);
    if options.include_public_key {
        headers.insert(PUBLIC_KEY_HEADER.to_string(), core.public_key().await?);
    }
    Ok(headers)
}

/// Serialize `body` as compact JSON, then sign it.
///
/// The server must verify against the same serialized bytes that are sent.
pub async fn signature_headers_for_json<T: Serialize + ?Sized>(
    core: &BiolinkCore,
    body: &T,
) -> Result<BTreeMap<String, String>, BiolinkError> {
    let encoded = serde_json::to_string(body)?;
    signature_headers(core, &encoded).await
}

/// Whether `core` can produce signatures at all
pub async fn is_signing_available(core: &BiolinkCore) -> bool {
    match core.public_key().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "signing capabilities not available");
            false
        }
    }
}

/// Check an `X-Body-Signature` / `X-Public-Key` pair against `body`.
///
/// Malformed headers are an error; a well-formed signature that does not
/// match is `Ok(false)`.
pub fn verify_body_signature(
    public_key_b64: &str,
    body: &str,
    signature_b64: &str,
) -> Result<bool, BiolinkError> {
    let public_key = STANDARD
        .decode(public_key_b64.trim())
        .map_err(|e| BiolinkError::invalid_argument(format!("Public key is not base64: {e}")))?;
    let public_key: [u8; PUBLIC_KEY_LENGTH] = public_key.as_slice().try_into().map_err(|_| {
        BiolinkError::invalid_argument(format!(
            "Public key must be {PUBLIC_KEY_LENGTH} bytes, got {}",
            public_key.len()
        ))
    })?;
    let verifying_key = VerifyingKey::from_bytes(&public_key)
        .map_err(|e| BiolinkError::crypto(format!("Invalid public key: {e}")))?;

    let signature = STANDARD
        .decode(signature_b64.trim())
        .map_err(|e| BiolinkError::invalid_argument(format!("Signature is not base64: {e}")))?;
    let signature = Signature::from_slice(&signature)
        .map_err(|e| BiolinkError::invalid_argument(format!("Malformed signature: {e}")))?;

    Ok(verifying_key.verify(body.as_bytes(), &signature).is_ok())
}
