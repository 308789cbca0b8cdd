//! Capture quality policy.
//!
//! Maps the network-quality collaborator's bandwidth class onto an ordered
//! quality ladder, lowest rung first:
//!
//! ```text
//! audio-only < video Low < video Medium < video High
//! ```
//!
//! Pure and total: no I/O, no failure mode, always returns a profile.

use serde::{Deserialize, Serialize};

use crate::models::constraints::{QualityConstraints, ResolutionTier};

/// Best-effort effective bandwidth class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionClass {
    Poor,
    Fair,
    Good,
    /// The collaborator could not classify the connection.
    Unknown,
}

/// Select the capture constraint profile for the measured conditions.
///
/// `reduced_data` forces the lowest ladder rung regardless of class; the
/// lowest rung is audio-only, so reduced-data calls never enable video.
/// `Unknown` maps to the middle rung rather than the top: an unclassified
/// connection should not commit the device to the most expensive profile.
pub fn select_constraints(class: ConnectionClass, reduced_data: bool) -> QualityConstraints {
    if reduced_data {
        return QualityConstraints::audio_only();
    }

    match class {
        ConnectionClass::Poor => QualityConstraints::audio_only(),
        ConnectionClass::Fair => QualityConstraints::with_video(ResolutionTier::Low),
        ConnectionClass::Unknown => QualityConstraints::with_video(ResolutionTier::Medium),
        ConnectionClass::Good => QualityConstraints::with_video(ResolutionTier::High),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSES: [ConnectionClass; 4] = [
        ConnectionClass::Poor,
        ConnectionClass::Fair,
        ConnectionClass::Good,
        ConnectionClass::Unknown,
    ];

    #[test]
    fn reduced_data_wins_over_every_class() {
        for class in CLASSES {
            let constraints = select_constraints(class, true);
            assert!(!constraints.has_video(), "{class:?} should be audio-only");
            assert!(constraints.has_audio());
        }
    }

    #[test]
    fn poor_connection_is_audio_only() {
        let constraints = select_constraints(ConnectionClass::Poor, false);
        assert!(!constraints.has_video());
        assert!(constraints.has_audio());
    }

    #[test]
    fn ladder_order_matches_class_order() {
        assert_eq!(
            select_constraints(ConnectionClass::Fair, false).video.tier(),
            Some(ResolutionTier::Low)
        );
        assert_eq!(
            select_constraints(ConnectionClass::Unknown, false).video.tier(),
            Some(ResolutionTier::Medium)
        );
        assert_eq!(
            select_constraints(ConnectionClass::Good, false).video.tier(),
            Some(ResolutionTier::High)
        );
    }

    #[test]
    fn audio_processing_always_on() {
        for class in CLASSES {
            for reduced in [false, true] {
                let c = select_constraints(class, reduced);
                assert!(c.audio.enabled);
                assert!(c.audio.echo_cancellation);
                assert!(c.audio.noise_suppression);
            }
        }
    }
}
