//! Sensor classification and availability values
//!
//! `BiometryType` crosses the host bridge as one of four fixed string tokens.
//! The token table lives in exactly one `match` so adding a variant without a
//! token is a compile error.

use crate::BiolinkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Class of biometric sensor hardware present on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum BiometryType {
    /// Fingerprint sensor (Touch ID class)
    TouchID,
    /// Face recognition (Face ID class)
    FaceID,
    /// Generic platform biometrics of unknown modality
    Biometrics,
    /// No biometric hardware
    None,
}

impl BiometryType {
    /// Every variant, in token-table order
    pub const ALL: [BiometryType; 4] = [
        BiometryType::TouchID,
        BiometryType::FaceID,
        BiometryType::Biometrics,
        BiometryType::None,
    ];

    /// Wire token for this variant
    pub fn as_token(self) -> &'static str {
        match self {
            BiometryType::TouchID => "TouchID",
            BiometryType::FaceID => "FaceID",
            BiometryType::Biometrics => "Biometrics",
            BiometryType::None => "None",
        }
    }

    /// Decode a wire token. Tokens are case-sensitive.
    pub fn from_token(token: &str) -> Result<Self, BiolinkError> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_token() == token)
            .ok_or_else(|| {
                BiolinkError::invalid_argument(format!(
                    "Cannot convert \"{token}\" to enum BiometryType - invalid value!"
                ))
            })
    }

    /// Whether this type denotes actual hardware
    pub fn is_hardware(self) -> bool {
        !matches!(self, BiometryType::None)
    }
}

impl fmt::Display for BiometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for BiometryType {
    type Err = BiolinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s)
    }
}

impl TryFrom<String> for BiometryType {
    type Error = BiolinkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_token(&value)
    }
}

impl From<BiometryType> for &'static str {
    fn from(value: BiometryType) -> Self {
        value.as_token()
    }
}

/// Normalized answer to "can biometrics be used right now?"
///
/// When `available` is false, `biometry_type` still reports the detected
/// hardware class, or [`BiometryType::None`] when there is no hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorAvailability {
    /// Whether biometric authentication can be attempted
    pub available: bool,
    /// Class of hardware found
    pub biometry_type: BiometryType,
}

impl SensorAvailability {
    /// Usable sensor of the given class
    pub fn available(biometry_type: BiometryType) -> Self {
        Self {
            available: true,
            biometry_type,
        }
    }

    /// Hardware of the given class that cannot currently be used
    pub fn unusable(biometry_type: BiometryType) -> Self {
        Self {
            available: false,
            biometry_type,
        }
    }

    /// Conservative answer when nothing is known about the device
    pub fn unavailable() -> Self {
        Self::unusable(BiometryType::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tokens_round_trip() {
        for biometry in BiometryType::ALL {
            let token = biometry.as_token();
            assert_eq!(BiometryType::from_token(token).unwrap(), biometry);

            let json = serde_json::to_string(&biometry).unwrap();
            assert_eq!(json, format!("\"{token}\""));
            let decoded: BiometryType = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded, biometry);
        }
    }

    #[test]
    fn test_tokens_are_case_sensitive() {
        assert!(BiometryType::from_token("faceid").is_err());
        assert!(BiometryType::from_token("TOUCHID").is_err());
        assert!(serde_json::from_str::<BiometryType>("\"none\"").is_err());
    }

    #[test]
    fn test_invalid_token_names_offending_value() {
        let err = BiometryType::from_token("Iris").unwrap_err();
        assert!(matches!(err, BiolinkError::InvalidArgument { .. }));
        assert!(err.to_string().contains("\"Iris\""));
    }

    #[test]
    fn test_availability_wire_shape() {
        let availability = SensorAvailability::available(BiometryType::FaceID);
        let json = serde_json::to_value(availability).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "available": true, "biometryType": "FaceID" })
        );
    }

    #[test]
    fn test_unavailable_reports_no_hardware() {
        let availability = SensorAvailability::unavailable();
        assert!(!availability.available);
        assert_eq!(availability.biometry_type, BiometryType::None);
        assert!(!availability.biometry_type.is_hardware());
    }

    proptest! {
        #[test]
        fn prop_unknown_tokens_rejected(token in "\\PC*") {
            let known = BiometryType::ALL.iter().any(|b| b.as_token() == token);
            prop_assert_eq!(BiometryType::from_token(&token).is_ok(), known);
        }
    }
}
