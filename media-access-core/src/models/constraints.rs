use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolution tier for video capture, ordered lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionTier {
    Low,
    Medium,
    High,
}

/// Video side of a constraint profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoConstraints {
    Disabled,
    Enabled { tier: ResolutionTier },
}

impl VideoConstraints {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    pub fn tier(&self) -> Option<ResolutionTier> {
        match self {
            Self::Enabled { tier } => Some(*tier),
            Self::Disabled => None,
        }
    }
}

/// Audio side of a constraint profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConstraints {
    pub enabled: bool,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            enabled: true,
            echo_cancellation: true,
            noise_suppression: true,
        }
    }
}

/// Immutable capture constraint profile handed to the platform backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityConstraints {
    pub video: VideoConstraints,
    pub audio: AudioConstraints,
}

impl QualityConstraints {
    /// Audio-only profile, the lowest rung of the quality ladder.
    pub fn audio_only() -> Self {
        Self {
            video: VideoConstraints::Disabled,
            audio: AudioConstraints::default(),
        }
    }

    /// Audio plus video at the given tier.
    pub fn with_video(tier: ResolutionTier) -> Self {
        Self {
            video: VideoConstraints::Enabled { tier },
            audio: AudioConstraints::default(),
        }
    }

    pub fn has_video(&self) -> bool {
        self.video.is_enabled()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.enabled
    }

    /// The degrade step: same profile with video dropped.
    pub fn without_video(&self) -> Self {
        Self {
            video: VideoConstraints::Disabled,
            audio: self.audio,
        }
    }

    /// Whether a stream opened with `open` constraints can serve this
    /// request without touching hardware.
    ///
    /// Compatibility is enablement-subset only: everything this request
    /// enables must already be open. Resolution tier is deliberately not part
    /// of the check.
    pub fn satisfied_by(&self, open: &QualityConstraints) -> bool {
        (!self.has_video() || open.has_video()) && (!self.has_audio() || open.has_audio())
    }
}

/// One acquisition call, from request to terminal result.
///
/// Ephemeral: created per `acquire`, discarded once the attempt resolves.
/// When concurrent requests coalesce, the first request's constraints win and
/// its owner is recorded on the grant.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureRequest {
    pub id: Uuid,
    pub constraints: QualityConstraints,
    pub owner_id: String,
    pub requested_at: DateTime<Utc>,
}

impl CaptureRequest {
    pub fn new(constraints: QualityConstraints, owner_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            constraints,
            owner_id: owner_id.into(),
            requested_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_only_satisfied_by_full_stream() {
        let open = QualityConstraints::with_video(ResolutionTier::High);
        let requested = QualityConstraints::audio_only();

        assert!(requested.satisfied_by(&open));
    }

    #[test]
    fn video_not_satisfied_by_audio_only_stream() {
        let open = QualityConstraints::audio_only();
        let requested = QualityConstraints::with_video(ResolutionTier::Low);

        assert!(!requested.satisfied_by(&open));
    }

    #[test]
    fn tier_mismatch_is_still_compatible() {
        let open = QualityConstraints::with_video(ResolutionTier::Low);
        let requested = QualityConstraints::with_video(ResolutionTier::High);

        assert!(requested.satisfied_by(&open));
    }

    #[test]
    fn without_video_keeps_audio_settings() {
        let mut full = QualityConstraints::with_video(ResolutionTier::Medium);
        full.audio.noise_suppression = false;

        let degraded = full.without_video();
        assert!(!degraded.has_video());
        assert!(degraded.has_audio());
        assert!(!degraded.audio.noise_suppression);
    }

    #[test]
    fn request_records_owner_and_constraints() {
        let req = CaptureRequest::new(QualityConstraints::audio_only(), "call-1");

        assert_eq!(req.owner_id, "call-1");
        assert!(!req.constraints.has_video());
    }
}
