//! # media-access-core
//!
//! Exclusive capture-resource brokering for the calling feature.
//!
//! The device camera and microphone are a singleton hardware resource with no
//! locking primitive of their own: concurrent open attempts fail, the failure
//! mode depends on permission state, and congested networks require choosing
//! a quality tier at open time. This crate serializes and deduplicates
//! access: concurrent requests coalesce onto one attempt, an already-open
//! stream is reused when compatible, and a busy device degrades a video call
//! to audio-only exactly once before failing.
//!
//! ## Architecture
//!
//! ```text
//! media-access-core (this crate)
//! ├── traits/       ← CaptureBackend, CoordinatorDelegate, NetworkQualitySource
//! ├── models/       ← QualityConstraints, AcquireError, LockPhase, config, diagnostics
//! ├── policy/       ← network class → quality-ladder rung
//! └── coordinator/  ← MediaAccessCoordinator (resource lock + acquisition attempt)
//! ```
//!
//! Call setup lives in the sibling `call-bootstrap` crate. Platform capture
//! backends (getUserMedia bridge, AVFoundation, PipeWire, ...) implement the
//! `CaptureBackend` trait and plug in.

pub mod coordinator;
pub mod models;
pub mod policy;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use coordinator::{MediaAccessCoordinator, StreamHandle};
pub use models::config::CoordinatorConfig;
pub use models::constraints::{
    AudioConstraints, CaptureRequest, QualityConstraints, ResolutionTier, VideoConstraints,
};
pub use models::diagnostics::CoordinatorDiagnostics;
pub use models::error::AcquireError;
pub use models::state::LockPhase;
pub use policy::{select_constraints, ConnectionClass};
pub use traits::capture_backend::CaptureBackend;
pub use traits::coordinator_delegate::CoordinatorDelegate;
pub use traits::network_quality::{NetworkQualitySource, NetworkSnapshot};
