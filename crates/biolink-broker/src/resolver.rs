//! Capability resolution
//!
//! | hardware | enrolled | permitted | available | biometry type |
//! |----------|----------|-----------|-----------|---------------|
//! | no       | -        | -         | false     | None          |
//! | yes      | no       | -         | false     | detected      |
//! | yes      | yes      | no        | false     | detected      |
//! | yes      | yes      | yes       | true      | detected      |

use biolink_core::effects::RawProbeResult;
use biolink_core::{BiometryType, SensorAvailability};

/// Map a raw probe result to a normalized availability answer.
pub fn resolve(probe: &RawProbeResult) -> SensorAvailability {
    if !probe.hardware_present {
        return SensorAvailability::unavailable();
    }

    let detected = classify_reported_type(probe.reported_type.as_deref());
    if probe.enrolled && probe.permission_granted {
        SensorAvailability::available(detected)
    } else {
        SensorAvailability::unusable(detected)
    }
}

/// Map the platform's own name for present hardware onto the closed enum.
///
/// Unknown or missing names fall back to [`BiometryType::Biometrics`].
pub fn classify_reported_type(reported: Option<&str>) -> BiometryType {
    let Some(reported) = reported else {
        return BiometryType::Biometrics;
    };
    match reported.trim().to_ascii_lowercase().as_str() {
        "touch" | "touchid" | "touch_id" => BiometryType::TouchID,
        "face" | "faceid" | "face_id" => BiometryType::FaceID,
        _ => BiometryType::Biometrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_hardware() {
        let availability = resolve(&RawProbeResult::no_hardware());
        assert_eq!(availability, SensorAvailability::unavailable());

        // Enrollment flags are meaningless without hardware
        let stale = RawProbeResult {
            hardware_present: false,
            enrolled: true,
            permission_granted: true,
            reported_type: Some("face".to_string()),
        };
        assert_eq!(resolve(&stale), SensorAvailability::unavailable());
    }

    #[test]
    fn test_ready_face_sensor() {
        let availability = resolve(&RawProbeResult::ready("face"));
        assert_eq!(availability, SensorAvailability::available(BiometryType::FaceID));
    }

    #[test]
    fn test_not_enrolled_keeps_detected_type() {
        let availability = resolve(&RawProbeResult::ready("touchid").with_enrolled(false));
        assert_eq!(
            availability,
            SensorAvailability::unusable(BiometryType::TouchID)
        );
    }

    #[test]
    fn test_permission_denied_keeps_detected_type() {
        let availability = resolve(&RawProbeResult::ready("FaceID").with_permission(false));
        assert_eq!(availability, SensorAvailability::unusable(BiometryType::FaceID));
    }

    #[test]
    fn test_reported_type_mapping() {
        assert_eq!(classify_reported_type(Some(" Touch_ID ")), BiometryType::TouchID);
        assert_eq!(classify_reported_type(Some("FACE")), BiometryType::FaceID);
        assert_eq!(classify_reported_type(Some("iris")), BiometryType::Biometrics);
        assert_eq!(
            classify_reported_type(Some("fingerprint")),
            BiometryType::Biometrics
        );
        assert_eq!(classify_reported_type(None), BiometryType::Biometrics);
    }

    fn arb_probe() -> impl Strategy<Value = RawProbeResult> {
        (
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            proptest::option::of("[a-zA-Z_ ]{0,12}"),
        )
            .prop_map(
                |(hardware_present, enrolled, permission_granted, reported_type)| {
                    RawProbeResult {
                        hardware_present,
                        enrolled,
                        permission_granted,
                        reported_type,
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn prop_resolve_is_deterministic(probe in arb_probe()) {
            prop_assert_eq!(resolve(&probe), resolve(&probe.clone()));
        }

        #[test]
        fn prop_available_only_when_fully_ready(probe in arb_probe()) {
            let availability = resolve(&probe);
            prop_assert_eq!(
                availability.available,
                probe.hardware_present && probe.enrolled && probe.permission_granted
            );
            prop_assert_eq!(
                availability.biometry_type == BiometryType::None,
                !probe.hardware_present
            );
        }
    }
}
