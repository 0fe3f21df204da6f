//! Unified error system for Biolink
//!
//! A single error type covers every fallible broker operation. Terminal
//! authentication outcomes (lockout, cancellation, timeout, ...) are *not*
//! errors; they are reported as [`crate::AuthResult`] values.

use serde::{Deserialize, Serialize};

/// Unified error type for all Biolink operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum BiolinkError {
    /// The platform biometric API could not be reached
    #[error("Platform query failed: {message}")]
    PlatformQuery {
        /// Error message describing the platform failure
        message: String,
    },

    /// Bad caller input, rejected before any platform call
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message describing the invalid input
        message: String,
    },

    /// Another authentication session is already prompting
    #[error("An authentication session is already in progress")]
    SessionBusy,

    /// Secure storage operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Cryptographic operation failed
    #[error("Crypto error: {message}")]
    Crypto {
        /// Error message describing the cryptographic failure
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },

    /// The requested capability was not wired into this broker
    #[error("Unsupported: {message}")]
    Unsupported {
        /// Error message naming the missing capability
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl BiolinkError {
    /// Create a platform query error
    pub fn platform_query(message: impl Into<String>) -> Self {
        Self::PlatformQuery {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a crypto error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an unsupported-capability error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Standard Result type for Biolink operations
pub type Result<T> = std::result::Result<T, BiolinkError>;

impl From<std::io::Error> for BiolinkError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

impl From<serde_json::Error> for BiolinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON: {err}"))
    }
}

impl From<toml::de::Error> for BiolinkError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BiolinkError::invalid_argument("reason must not be empty");
        assert!(matches!(err, BiolinkError::InvalidArgument { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid argument: reason must not be empty"
        );
    }

    #[test]
    fn test_io_error_becomes_storage_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing secret file");
        let err = BiolinkError::from(io_err);
        assert!(matches!(err, BiolinkError::Storage { .. }));
    }

    #[test]
    fn test_session_busy_message() {
        assert_eq!(
            BiolinkError::SessionBusy.to_string(),
            "An authentication session is already in progress"
        );
    }
}
