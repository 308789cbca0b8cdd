use crate::models::constraints::QualityConstraints;
use crate::models::error::AcquireError;

/// Interface to the platform capture API.
///
/// Implemented by the host application per platform (getUserMedia bridge,
/// AVFoundation, PipeWire, ...). Implementations must map their native error
/// vocabulary into the `AcquireError` categories; the coordinator's retry
/// policy depends on that classification.
///
/// `close` is the only way to stop a stream, and only the coordinator holds
/// the backend. Borrowers see streams through `StreamHandle` and cannot free
/// the hardware themselves.
pub trait CaptureBackend: Send + Sync + 'static {
    /// The open media stream. Shared with borrowers behind `Arc`.
    type Stream: Send + Sync + 'static;

    /// Request a stream matching `constraints`.
    ///
    /// May block until the platform resolves; the coordinator bounds it with
    /// `CoordinatorConfig::acquire_timeout`.
    fn open(&self, constraints: &QualityConstraints) -> Result<Self::Stream, AcquireError>;

    /// Stop the stream's tracks and free the hardware.
    fn close(&self, stream: &Self::Stream);
}
