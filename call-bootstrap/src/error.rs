use media_access_core::AcquireError;
use thiserror::Error;

/// Failures of call setup, with their user-facing presentation.
///
/// The coordinator only classifies and terminates; all user-visible wording
/// and retry guidance lives here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// Camera/microphone permission is missing. Requires user action outside
    /// the app; never retried automatically.
    #[error("capture permission required")]
    PermissionRequired,

    /// The capture device is busy or unreadable even after the audio-only
    /// fallback. The user may retry manually; setup never auto-retries
    /// against a busy device.
    #[error("capture device busy")]
    DeviceBusy,

    /// Wiring the stream into the outbound connection failed.
    #[error("failed to attach media to connection: {0}")]
    ConnectionFailed(String),

    /// Anything else, surfaced as-is.
    #[error("call setup failed: {0}")]
    Other(String),
}

impl SetupError {
    /// Whether offering a manual "try again" makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DeviceBusy | Self::ConnectionFailed(_))
    }

    /// Copy shown to the user when setup aborts.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionRequired => {
                "Camera and microphone access is required to start a call. \
                 Enable it in your device settings and try again."
            }
            Self::DeviceBusy => {
                "We couldn't start your camera or microphone. \
                 Another app may be using it — please try again."
            }
            Self::ConnectionFailed(_) => "The call could not be connected. Please try again.",
            Self::Other(_) => "Something went wrong starting the call.",
        }
    }
}

impl From<AcquireError> for SetupError {
    fn from(err: AcquireError) -> Self {
        match err {
            AcquireError::PermissionDenied => Self::PermissionRequired,
            AcquireError::DeviceUnavailable => Self::DeviceBusy,
            AcquireError::Unknown(message) => Self::Other(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_not_retryable() {
        let err = SetupError::from(AcquireError::PermissionDenied);
        assert_eq!(err, SetupError::PermissionRequired);
        assert!(!err.is_retryable());
    }

    #[test]
    fn device_unavailable_is_retryable() {
        let err = SetupError::from(AcquireError::DeviceUnavailable);
        assert_eq!(err, SetupError::DeviceBusy);
        assert!(err.is_retryable());
    }

    #[test]
    fn unknown_carries_its_message() {
        let err = SetupError::from(AcquireError::Unknown("backend exploded".into()));
        assert_eq!(err, SetupError::Other("backend exploded".into()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn every_variant_has_user_copy() {
        for err in [
            SetupError::PermissionRequired,
            SetupError::DeviceBusy,
            SetupError::ConnectionFailed("ice".into()),
            SetupError::Other("x".into()),
        ] {
            assert!(!err.user_message().is_empty());
        }
    }
}
