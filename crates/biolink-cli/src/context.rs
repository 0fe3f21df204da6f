//! Configuration loading and broker wiring for CLI commands

use anyhow::{Context, Result};
use biolink_broker::BiolinkCore;
use biolink_core::BrokerConfig;
use biolink_effects::{
    Ed25519ChallengeSigner, EncryptedSecretStorage, FallbackBiometricHandler, MASTER_KEY_LEN,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Secret directory used when the configuration names none
pub const DEFAULT_SECRET_DIR: &str = ".biolink/secrets";

/// Environment variable carrying a hex master key
pub const MASTER_KEY_ENV: &str = "BIOLINK_MASTER_KEY";

const MASTER_KEY_FILE: &str = "master.key";

/// Load the config file (if present), apply `BIOLINK_*` overrides, validate
pub fn load_config(path: &Path) -> Result<BrokerConfig> {
    let mut config = BrokerConfig::load_or_default(path)
        .with_context(|| format!("loading {}", path.display()))?;
    config.merge_with_env()?;
    config.validate()?;
    Ok(config)
}

/// Build the broker the CLI commands run against
pub async fn build_core(config: BrokerConfig) -> Result<BiolinkCore> {
    let secret_dir = config
        .secret_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRET_DIR));
    let master_key =
        load_or_create_master_key(&secret_dir, std::env::var(MASTER_KEY_ENV).ok()).await?;

    let storage = Arc::new(EncryptedSecretStorage::in_directory(
        &secret_dir,
        *master_key,
    ));
    let signer = Arc::new(Ed25519ChallengeSigner::new(storage.clone()));

    let core = BiolinkCore::builder(Arc::new(FallbackBiometricHandler::new()))
        .with_config(config)
        .with_secure_storage(storage)
        .with_signer(signer)
        .build()?;
    Ok(core)
}

/// Master key from `env_value` (hex), else `<dir>/master.key`, else a fresh
/// key written to `<dir>/master.key`.
pub async fn load_or_create_master_key(
    dir: &Path,
    env_value: Option<String>,
) -> Result<Zeroizing<[u8; MASTER_KEY_LEN]>> {
    if let Some(encoded) = env_value {
        let encoded = Zeroizing::new(encoded);
        return EncryptedSecretStorage::master_key_from_hex(&encoded)
            .with_context(|| format!("parsing {MASTER_KEY_ENV}"));
    }

    let path = dir.join(MASTER_KEY_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(encoded) => {
            let encoded = Zeroizing::new(encoded);
            EncryptedSecretStorage::master_key_from_hex(&encoded)
                .with_context(|| format!("parsing {}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let key = EncryptedSecretStorage::generate_master_key();
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
            let encoded = Zeroizing::new(hex::encode(&key[..]));
            tokio::fs::write(&path, encoded.as_bytes())
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "generated new master key");
            Ok(key)
        }
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[tokio::test]
    async fn test_master_key_generated_once() {
        let dir = tempfile::tempdir().unwrap();
        let first = load_or_create_master_key(dir.path(), None).await.unwrap();
        assert!(dir.path().join(MASTER_KEY_FILE).exists());

        let second = load_or_create_master_key(dir.path(), None).await.unwrap();
        assert_eq!(*first, *second);
    }

    #[tokio::test]
    async fn test_env_master_key_wins() {
        let dir = tempfile::tempdir().unwrap();
        let key = load_or_create_master_key(dir.path(), Some("ab".repeat(MASTER_KEY_LEN)))
            .await
            .unwrap();
        assert_eq!(*key, [0xab; MASTER_KEY_LEN]);
        assert!(!dir.path().join(MASTER_KEY_FILE).exists());

        assert!(load_or_create_master_key(dir.path(), Some("nothex".to_string()))
            .await
            .is_err());
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.prompt_title, BrokerConfig::default().prompt_title);
    }

    #[tokio::test]
    async fn test_core_wired_with_storage_and_signer() {
        let dir = tempfile::tempdir().unwrap();
        let config = BrokerConfig {
            secret_dir: Some(dir.path().join("secrets")),
            ..BrokerConfig::default()
        };
        let core = build_core(config).await.unwrap();
        core.store_secret("k", "v").await.unwrap();
        assert_eq!(core.get_secret("k").await.unwrap(), Some("v".to_string()));
        assert!(!core.public_key().await.unwrap().is_empty());
    }
}
