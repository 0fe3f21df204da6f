//! Configuration validation utilities

use crate::BiolinkError;
use std::fmt;

/// Configuration validation result
pub type ValidationResult = Result<(), ValidationError>;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value is out of acceptable range
    OutOfRange {
        field: String,
        min: Option<u64>,
        max: Option<u64>,
        actual: u64,
    },
    /// Value is not one of the accepted choices
    NotOneOf {
        field: String,
        allowed: Vec<String>,
        actual: String,
    },
    /// Custom validation failed
    Custom { field: String, message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => {
                let range_desc = match (min, max) {
                    (Some(min), Some(max)) => format!("between {min} and {max}"),
                    (Some(min), None) => format!("at least {min}"),
                    (None, Some(max)) => format!("at most {max}"),
                    (None, None) => "in valid range".to_string(),
                };
                write!(f, "Field '{field}' must be {range_desc} (got {actual})")
            }
            ValidationError::NotOneOf {
                field,
                allowed,
                actual,
            } => {
                write!(
                    f,
                    "Field '{field}' must be one of [{}] (got '{actual}')",
                    allowed.join(", ")
                )
            }
            ValidationError::Custom { field, message } => {
                write!(f, "Field '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for BiolinkError {
    fn from(err: ValidationError) -> Self {
        BiolinkError::config(err.to_string())
    }
}

/// Accumulates validation failures across a configuration
#[derive(Debug, Default)]
pub struct ConfigValidator {
    errors: Vec<ValidationError>,
}

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate that a number is within range
    pub fn range(
        &mut self,
        field_name: &str,
        value: u64,
        min: Option<u64>,
        max: Option<u64>,
    ) -> &mut Self {
        let below = min.is_some_and(|min| value < min);
        let above = max.is_some_and(|max| value > max);
        if below || above {
            self.errors.push(ValidationError::OutOfRange {
                field: field_name.to_string(),
                min,
                max,
                actual: value,
            });
        }
        self
    }

    /// Validate that a string is one of `allowed`, ignoring ASCII case
    pub fn one_of(&mut self, field_name: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !allowed.iter().any(|choice| choice.eq_ignore_ascii_case(value)) {
            self.errors.push(ValidationError::NotOneOf {
                field: field_name.to_string(),
                allowed: allowed.iter().map(|s| (*s).to_string()).collect(),
                actual: value.to_string(),
            });
        }
        self
    }

    /// Validate that a string has visible content
    pub fn non_empty(&mut self, field_name: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(ValidationError::Custom {
                field: field_name.to_string(),
                message: "must not be empty".to_string(),
            });
        }
        self
    }

    /// First failure, if any
    pub fn result(self) -> ValidationResult {
        match self.errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }

    /// Every failure collected so far
    pub fn all_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}
