//! One acquisition attempt against the platform capture API.
//!
//! Phase transitions:
//! ```text
//! requesting → granted
//!     ↓ (device unavailable, video requested)
//! degraded → granted / denied
//! ```
//!
//! At most one degradation step per attempt, so an `acquire` costs at most
//! two hardware calls.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::models::constraints::QualityConstraints;
use crate::models::error::AcquireError;
use crate::traits::capture_backend::CaptureBackend;

/// A successful attempt: the stream plus what was actually granted.
#[derive(Debug)]
pub(crate) struct Granted<S> {
    pub stream: S,
    pub constraints: QualityConstraints,
    pub degraded: bool,
}

/// What one attempt cost, for the coordinator's diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AttemptStats {
    pub hardware_calls: u64,
}

/// Fallback tracker: records whether the degrade step was already taken.
enum Phase {
    Requesting,
    Degraded,
}

/// Run the attempt to its terminal result.
///
/// Failure classification:
/// - `PermissionDenied`: terminal, never retried.
/// - `DeviceUnavailable` with video requested and no fallback tried yet:
///   retry once with video dropped, audio unchanged.
/// - `DeviceUnavailable` on an audio-only profile: terminal.
/// - Anything else: terminal, surfaced as-is.
pub(crate) fn run<B: CaptureBackend>(
    backend: &Arc<B>,
    constraints: QualityConstraints,
    timeout: Option<Duration>,
    stats: &mut AttemptStats,
) -> Result<Granted<B::Stream>, AcquireError> {
    let mut phase = Phase::Requesting;
    let mut current = constraints;

    loop {
        stats.hardware_calls += 1;
        match open_bounded(backend, current, timeout) {
            Ok(stream) => {
                return Ok(Granted {
                    stream,
                    constraints: current,
                    degraded: matches!(phase, Phase::Degraded),
                });
            }
            Err(AcquireError::DeviceUnavailable)
                if matches!(phase, Phase::Requesting) && current.has_video() =>
            {
                log::warn!("Capture device unavailable, retrying audio-only");
                phase = Phase::Degraded;
                current = current.without_video();
            }
            Err(err) => return Err(err),
        }
    }
}

/// Invoke the backend, bounded by `timeout` when one is configured.
///
/// The platform call runs on a named helper thread so expiry can be enforced
/// from here. If a stream arrives after the coordinator has given up, the
/// helper thread closes it so the device is not leaked.
fn open_bounded<B: CaptureBackend>(
    backend: &Arc<B>,
    constraints: QualityConstraints,
    timeout: Option<Duration>,
) -> Result<B::Stream, AcquireError> {
    let Some(limit) = timeout else {
        return backend.open(&constraints);
    };

    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(backend);
    thread::Builder::new()
        .name("capture-open".into())
        .spawn(move || match worker.open(&constraints) {
            Ok(stream) => {
                if let Err(mpsc::SendError(Ok(stream))) = tx.send(Ok(stream)) {
                    worker.close(&stream);
                }
            }
            Err(err) => {
                let _ = tx.send(Err(err));
            }
        })
        .expect("failed to spawn capture-open thread");

    match rx.recv_timeout(limit) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            log::warn!("Capture call exceeded {:?}, treating device as unavailable", limit);
            Err(AcquireError::DeviceUnavailable)
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(AcquireError::Unknown("capture backend hung up".into()))
        }
    }
}
