use thiserror::Error;

/// Terminal failures of a capture acquisition.
///
/// Platform backends map their native error vocabulary into exactly these
/// categories; the coordinator never retries beyond the single
/// degrade-on-`DeviceUnavailable` step, and every waiter coalesced onto an
/// attempt receives a clone of the identical terminal error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// The user or OS denied camera/microphone access. Unrecoverable without
    /// user action outside this subsystem; never retried.
    #[error("permission denied")]
    PermissionDenied,

    /// The device is busy or not readable. Recoverable via a single
    /// audio-only degrade, then manual retry.
    #[error("device not available")]
    DeviceUnavailable,

    /// Anything the backend could not classify. Surfaced as-is, never
    /// retried.
    #[error("unknown error: {0}")]
    Unknown(String),
}
