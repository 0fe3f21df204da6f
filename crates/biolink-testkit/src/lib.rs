//! Biolink Testing Infrastructure
//!
//! Mock effect handlers shared by the broker, effects and CLI test suites.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! Add this to your crate's `Cargo.toml` dev-dependencies:
//! ```toml
//! [dev-dependencies]
//! biolink-testkit = { path = "../biolink-testkit" }
//! ```
//!
//! Then in your tests:
//! ```rust,ignore
//! use biolink_testkit::*;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     init_tracing();
//!     let platform = Arc::new(MockBiometricPlatform::new());
//!     platform.set_behavior(PromptBehavior::Hold);
//!     // ... drive a BiolinkCore, then platform.deliver(PlatformOutcome::Succeeded)
//! }
//! ```

pub mod platform;
pub mod secure;

pub use platform::{MockBiometricPlatform, PromptBehavior};
pub use secure::MockSecureStorageHandler;

/// Install a test-writer tracing subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
