//! Biolink Broker
//!
//! The logic behind the `BiolinkCore` native object:
//!
//! - [`resolver`]: raw platform probe -> normalized [`SensorAvailability`]
//! - [`session`]: one interactive authentication attempt at a time
//! - [`facade`]: [`BiolinkCore`], the single entry point handed to the host bridge
//! - [`signature`]: request-body signature headers built on the device key
//!
//! The facade is constructed once by the host application and passed around
//! by reference; there is no global registry.
//!
//! ```rust,ignore
//! let core = BiolinkCore::builder(Arc::new(FallbackBiometricHandler::new()))
//!     .with_config(config)
//!     .build()?;
//! let availability = core.get_sensor_availability();
//! let outcome = core.authenticate("Confirm payment", PromptOptions::new()).await?;
//! ```

#![forbid(unsafe_code)]

pub mod facade;
pub mod resolver;
pub mod session;
pub mod signature;

pub use biolink_core::{
    AuthResult, BiolinkError, BiometryType, BrokerConfig, PromptOptions, SensorAvailability,
    SessionState,
};
pub use facade::{BiolinkCore, BiolinkCoreBuilder};
pub use resolver::{classify_reported_type, resolve};
pub use session::{normalize_outcome, AuthenticationSession};
pub use signature::{
    is_signing_available, signature_headers, signature_headers_for_json, signature_headers_with,
    verify_body_signature, SignatureHeaderOptions, BODY_SIGNATURE_HEADER, PUBLIC_KEY_HEADER,
};
