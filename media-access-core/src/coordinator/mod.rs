//! The resource lock: exclusive, single-flight brokering of the capture
//! device.
//!
//! Exactly one `LockState` exists per coordinator. The `Idle → Acquiring`
//! transition completes under the state mutex before any hardware work
//! begins, so a second `acquire` arriving while an attempt is in flight can
//! only ever join that attempt's waiter queue — no two capture attempts run
//! concurrently, and at most one stream is open at a time.

mod attempt;

use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::config::CoordinatorConfig;
use crate::models::constraints::{CaptureRequest, QualityConstraints};
use crate::models::diagnostics::CoordinatorDiagnostics;
use crate::models::error::AcquireError;
use crate::models::state::LockPhase;
use crate::traits::capture_backend::CaptureBackend;
use crate::traits::coordinator_delegate::CoordinatorDelegate;

use self::attempt::AttemptStats;

/// Non-owning view of the open capture stream.
///
/// Cloneable and shared by every caller coalesced onto the same grant. The
/// underlying stream can only be stopped through the backend, which the
/// coordinator alone holds; borrowers wire tracks, they never free hardware.
pub struct StreamHandle<S> {
    stream: Arc<S>,
    grant_id: Uuid,
    constraints: QualityConstraints,
    degraded: bool,
}

impl<S> StreamHandle<S> {
    fn new(stream: S, constraints: QualityConstraints, degraded: bool) -> Self {
        Self {
            stream: Arc::new(stream),
            grant_id: Uuid::new_v4(),
            constraints,
            degraded,
        }
    }

    /// The open stream, for wiring tracks into a peer connection.
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Identifies the grant; all handles cloned from one acquisition share it.
    pub fn grant_id(&self) -> Uuid {
        self.grant_id
    }

    /// What was actually opened (after any degradation).
    pub fn constraints(&self) -> QualityConstraints {
        self.constraints
    }

    /// Whether this grant was degraded from the original request.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

impl<S> fmt::Debug for StreamHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("grant_id", &self.grant_id)
            .field("constraints", &self.constraints)
            .field("degraded", &self.degraded)
            .finish_non_exhaustive()
    }
}

impl<S> Clone for StreamHandle<S> {
    fn clone(&self) -> Self {
        Self {
            stream: Arc::clone(&self.stream),
            grant_id: self.grant_id,
            constraints: self.constraints,
            degraded: self.degraded,
        }
    }
}

type AcquireResult<S> = Result<StreamHandle<S>, AcquireError>;

/// One-shot channel a coalesced caller blocks on.
type Waiter<S> = mpsc::Sender<AcquireResult<S>>;

/// The single process-wide lock state.
enum LockState<S> {
    Idle,
    Acquiring {
        request: CaptureRequest,
        waiters: Vec<Waiter<S>>,
    },
    Held {
        handle: StreamHandle<S>,
        owner: Option<String>,
    },
}

impl<S> LockState<S> {
    fn phase(&self) -> LockPhase {
        match self {
            Self::Idle => LockPhase::Idle,
            Self::Acquiring { .. } => LockPhase::Acquiring,
            Self::Held { .. } => LockPhase::Held,
        }
    }
}

/// Concurrency-safe broker for the capture resource.
///
/// Serializes and deduplicates acquisition, tracks the current owner and
/// granted constraints, applies the degrade-once fallback, and resolves every
/// coalesced waiter with the identical terminal result.
pub struct MediaAccessCoordinator<B: CaptureBackend> {
    backend: Arc<B>,
    config: CoordinatorConfig,
    state: Mutex<LockState<B::Stream>>,
    diagnostics: Mutex<CoordinatorDiagnostics>,
    delegate: Option<Arc<dyn CoordinatorDelegate>>,
}

impl<B: CaptureBackend> MediaAccessCoordinator<B> {
    /// The backend arrives as `Arc` because timeout-bounded attempts share it
    /// with a helper thread.
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_config(backend, CoordinatorConfig::default())
    }

    pub fn with_config(backend: Arc<B>, config: CoordinatorConfig) -> Self {
        Self {
            backend,
            config,
            state: Mutex::new(LockState::Idle),
            diagnostics: Mutex::new(CoordinatorDiagnostics::default()),
            delegate: None,
        }
    }

    /// Install the event delegate. Call before sharing the coordinator.
    pub fn set_delegate(&mut self, delegate: Arc<dyn CoordinatorDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn phase(&self) -> LockPhase {
        self.state.lock().phase()
    }

    pub fn diagnostics(&self) -> CoordinatorDiagnostics {
        *self.diagnostics.lock()
    }

    /// The held stream, if any, without touching hardware.
    pub fn current_stream(&self) -> Option<StreamHandle<B::Stream>> {
        match &*self.state.lock() {
            LockState::Held { handle, .. } => Some(handle.clone()),
            _ => None,
        }
    }

    /// Acquire the capture resource with `constraints` on behalf of
    /// `owner_id`.
    ///
    /// - `Idle`: starts a fresh attempt.
    /// - `Acquiring`: joins the in-flight attempt's waiter queue. The first
    ///   request's constraints win; this call's are ignored.
    /// - `Held`, compatible: returns the existing handle, zero hardware calls.
    /// - `Held`, incompatible: frees the held stream, then starts fresh.
    ///
    /// Blocks until the attempt reaches a terminal result. Every caller
    /// coalesced onto one attempt receives the identical result, in FIFO
    /// arrival order.
    pub fn acquire(
        &self,
        constraints: QualityConstraints,
        owner_id: &str,
    ) -> AcquireResult<B::Stream> {
        let mut state = self.state.lock();
        let current = std::mem::replace(&mut *state, LockState::Idle);

        match current {
            LockState::Acquiring { request, mut waiters } => {
                let attempt_id = request.id;
                let (tx, rx) = mpsc::channel();
                waiters.push(tx);
                *state = LockState::Acquiring { request, waiters };
                drop(state);

                log::debug!("Coalescing acquire from {} onto attempt {}", owner_id, attempt_id);
                self.diagnostics.lock().coalesced_waiters += 1;

                match rx.recv() {
                    Ok(result) => result,
                    Err(_) => Err(AcquireError::Unknown("acquisition abandoned".into())),
                }
            }

            LockState::Held { handle, owner } => {
                if constraints.satisfied_by(&handle.constraints()) {
                    let reused = handle.clone();
                    *state = LockState::Held { handle, owner };
                    drop(state);

                    log::debug!("Serving held stream to {} without reacquisition", owner_id);
                    self.diagnostics.lock().reuse_hits += 1;
                    Ok(reused)
                } else {
                    let request = CaptureRequest::new(constraints, owner_id);
                    *state = LockState::Acquiring {
                        request: request.clone(),
                        waiters: Vec::new(),
                    };
                    drop(state);

                    log::info!(
                        "Held stream incompatible with request from {}, reacquiring",
                        owner_id
                    );
                    self.backend.close(handle.stream());
                    self.diagnostics.lock().reacquisitions += 1;
                    if let Some(delegate) = &self.delegate {
                        delegate.on_released(owner.as_deref());
                    }
                    self.notify_phase(LockPhase::Acquiring);
                    self.run_and_settle(request)
                }
            }

            LockState::Idle => {
                let request = CaptureRequest::new(constraints, owner_id);
                *state = LockState::Acquiring {
                    request: request.clone(),
                    waiters: Vec::new(),
                };
                drop(state);

                self.notify_phase(LockPhase::Acquiring);
                self.run_and_settle(request)
            }
        }
    }

    /// Free the held stream if `owner_id` matches the recorded owner.
    ///
    /// Duplicate teardown from multiple exit paths is expected: a stale or
    /// mismatched owner, an in-flight attempt, or an idle coordinator all
    /// make this a no-op rather than an error. A held stream with no recorded
    /// owner releases permissively.
    pub fn release(&self, owner_id: &str) {
        let freed = {
            let mut state = self.state.lock();
            let current = std::mem::replace(&mut *state, LockState::Idle);
            match current {
                LockState::Held { handle, owner } => {
                    let owner_matches = owner.as_deref().map_or(true, |o| o == owner_id);
                    if owner_matches {
                        Some((handle, owner))
                    } else {
                        *state = LockState::Held { handle, owner };
                        None
                    }
                }
                other => {
                    *state = other;
                    None
                }
            }
        };

        let Some((handle, owner)) = freed else {
            log::debug!("Release from {} ignored, nothing held for it", owner_id);
            return;
        };

        self.backend.close(handle.stream());
        self.diagnostics.lock().releases += 1;
        log::info!("Capture stream released by {}", owner_id);

        self.notify_phase(LockPhase::Idle);
        if let Some(delegate) = &self.delegate {
            delegate.on_released(owner.as_deref());
        }
    }

    /// Run the acquisition state machine, then resolve the attempt: update
    /// diagnostics, transition the lock state, and drain waiters in FIFO
    /// order with clones of the terminal result.
    fn run_and_settle(&self, request: CaptureRequest) -> AcquireResult<B::Stream> {
        let mut stats = AttemptStats::default();
        let outcome = attempt::run(
            &self.backend,
            request.constraints,
            self.config.acquire_timeout,
            &mut stats,
        );

        let result: AcquireResult<B::Stream> = match outcome {
            Ok(granted) => {
                log::info!(
                    "Capture granted to {}{}",
                    request.owner_id,
                    if granted.degraded { " (degraded to audio-only)" } else { "" }
                );
                Ok(StreamHandle::new(granted.stream, granted.constraints, granted.degraded))
            }
            Err(err) => {
                log::error!("Capture denied for {}: {}", request.owner_id, err);
                Err(err)
            }
        };

        {
            let mut diagnostics = self.diagnostics.lock();
            diagnostics.hardware_calls += stats.hardware_calls;
            match &result {
                Ok(handle) if handle.is_degraded() => diagnostics.degraded_grants += 1,
                Err(_) => diagnostics.denials += 1,
                Ok(_) => {}
            }
        }

        let waiters = {
            let mut state = self.state.lock();
            let waiters = match std::mem::replace(&mut *state, LockState::Idle) {
                LockState::Acquiring { waiters, .. } => waiters,
                // release() leaves Acquiring untouched, so the in-flight
                // marker is still ours; anything else means nothing queued.
                other => {
                    *state = other;
                    Vec::new()
                }
            };
            if let Ok(handle) = &result {
                *state = LockState::Held {
                    handle: handle.clone(),
                    owner: Some(request.owner_id.clone()),
                };
            }
            waiters
        };

        self.notify_phase(if result.is_ok() { LockPhase::Held } else { LockPhase::Idle });
        if let Some(delegate) = &self.delegate {
            if let Ok(handle) = &result {
                if handle.is_degraded() {
                    delegate.on_degraded(&request.owner_id);
                }
            }
        }

        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }

        result
    }

    fn notify_phase(&self, phase: LockPhase) {
        if let Some(delegate) = &self.delegate {
            delegate.on_phase_changed(phase);
        }
    }
}
