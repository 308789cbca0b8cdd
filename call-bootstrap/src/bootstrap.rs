use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use media_access_core::{
    select_constraints, CaptureBackend, MediaAccessCoordinator, NetworkQualitySource,
    StreamHandle,
};

use crate::connection::OutboundConnection;
use crate::error::SetupError;

/// The call-setup routine.
///
/// One bootstrap per outgoing call attempt. `start` selects a capture quality
/// from the current network snapshot, acquires the capture resource under
/// this bootstrap's owner id, and wires the granted stream into the outbound
/// connection. `teardown` releases the resource exactly once; call end, setup
/// abort, and disposal all funnel through it.
///
/// Setup never retries on its own: a denied permission needs user action, and
/// retrying against a busy device in a loop only keeps it busy. Manual retry
/// is a fresh `start` call.
pub struct CallBootstrap<B: CaptureBackend> {
    coordinator: Arc<MediaAccessCoordinator<B>>,
    network: Arc<dyn NetworkQualitySource>,
    owner_id: String,
    // True whenever there is nothing to tear down; swapped to guarantee
    // exactly one release per started call.
    torn_down: AtomicBool,
    active: Mutex<Option<StreamHandle<B::Stream>>>,
}

impl<B: CaptureBackend> CallBootstrap<B> {
    pub fn new(
        coordinator: Arc<MediaAccessCoordinator<B>>,
        network: Arc<dyn NetworkQualitySource>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            coordinator,
            network,
            owner_id: owner_id.into(),
            torn_down: AtomicBool::new(true),
            active: Mutex::new(None),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// The stream this call is using, if setup succeeded.
    pub fn active_stream(&self) -> Option<StreamHandle<B::Stream>> {
        self.active.lock().clone()
    }

    /// Run call setup: select constraints, acquire, attach.
    ///
    /// On attach failure the acquired stream is released before returning, so
    /// an aborted setup never leaves the resource held.
    pub fn start<C>(&self, connection: &mut C) -> Result<StreamHandle<B::Stream>, SetupError>
    where
        C: OutboundConnection<B::Stream>,
    {
        let snapshot = self.network.snapshot();
        let constraints = select_constraints(snapshot.class, snapshot.reduced_data);
        log::debug!(
            "Starting call {} ({:?}, reduced_data={})",
            self.owner_id,
            snapshot.class,
            snapshot.reduced_data
        );

        let handle = self.coordinator.acquire(constraints, &self.owner_id)?;
        if handle.is_degraded() {
            log::warn!("Call {} proceeding audio-only after degraded grant", self.owner_id);
        }

        if let Err(err) = connection.attach(&handle) {
            log::error!("Attaching media for call {} failed: {}", self.owner_id, err);
            self.coordinator.release(&self.owner_id);
            return Err(err);
        }

        *self.active.lock() = Some(handle.clone());
        self.torn_down.store(false, Ordering::SeqCst);
        Ok(handle)
    }

    /// Release the capture resource. Safe to call from every exit path;
    /// duplicate and concurrent invocations are no-ops.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.active.lock().take();
        self.coordinator.release(&self.owner_id);
        log::debug!("Call {} torn down", self.owner_id);
    }
}

impl<B: CaptureBackend> Drop for CallBootstrap<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    use media_access_core::{
        AcquireError, ConnectionClass, NetworkSnapshot, QualityConstraints,
    };

    use super::*;

    struct MockStream;

    struct MockBackend {
        script: Mutex<VecDeque<Result<(), AcquireError>>>,
        opened: Mutex<Vec<QualityConstraints>>,
        closes: AtomicUsize,
    }

    impl MockBackend {
        fn new() -> Arc<Self> {
            Self::scripted(Vec::new())
        }

        fn scripted(script: Vec<Result<(), AcquireError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                opened: Mutex::new(Vec::new()),
                closes: AtomicUsize::new(0),
            })
        }
    }

    impl CaptureBackend for MockBackend {
        type Stream = MockStream;

        fn open(&self, constraints: &QualityConstraints) -> Result<Self::Stream, AcquireError> {
            self.opened.lock().push(*constraints);
            match self.script.lock().pop_front() {
                Some(Err(err)) => Err(err),
                _ => Ok(MockStream),
            }
        }

        fn close(&self, _stream: &Self::Stream) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct StaticNetwork(NetworkSnapshot);

    impl NetworkQualitySource for StaticNetwork {
        fn snapshot(&self) -> NetworkSnapshot {
            self.0
        }
    }

    struct RecordingConnection {
        attached: Vec<QualityConstraints>,
        fail: bool,
    }

    impl RecordingConnection {
        fn new() -> Self {
            Self {
                attached: Vec::new(),
                fail: false,
            }
        }
    }

    impl OutboundConnection<MockStream> for RecordingConnection {
        fn attach(&mut self, handle: &StreamHandle<MockStream>) -> Result<(), SetupError> {
            if self.fail {
                return Err(SetupError::ConnectionFailed("ice negotiation failed".into()));
            }
            self.attached.push(handle.constraints());
            Ok(())
        }
    }

    fn network(class: ConnectionClass, reduced_data: bool) -> Arc<StaticNetwork> {
        Arc::new(StaticNetwork(NetworkSnapshot { class, reduced_data }))
    }

    fn bootstrap_with(
        backend: &Arc<MockBackend>,
        source: Arc<StaticNetwork>,
        owner: &str,
    ) -> CallBootstrap<MockBackend> {
        let coordinator = Arc::new(MediaAccessCoordinator::new(Arc::clone(backend)));
        CallBootstrap::new(coordinator, source, owner)
    }

    #[test]
    fn start_uses_policy_constraints() {
        let backend = MockBackend::new();
        let bootstrap = bootstrap_with(&backend, network(ConnectionClass::Good, false), "call-1");
        let mut connection = RecordingConnection::new();

        let handle = bootstrap.start(&mut connection).unwrap();

        assert!(handle.constraints().has_video());
        assert_eq!(connection.attached.len(), 1);
        assert!(backend.opened.lock()[0].has_video());
    }

    #[test]
    fn reduced_data_forces_audio_only() {
        let backend = MockBackend::new();
        let bootstrap = bootstrap_with(&backend, network(ConnectionClass::Good, true), "call-1");
        let mut connection = RecordingConnection::new();

        let handle = bootstrap.start(&mut connection).unwrap();

        assert!(!handle.constraints().has_video());
        assert!(handle.constraints().has_audio());
    }

    #[test]
    fn permission_denied_aborts_with_user_actionable_error() {
        let backend = MockBackend::scripted(vec![Err(AcquireError::PermissionDenied)]);
        let bootstrap = bootstrap_with(&backend, network(ConnectionClass::Good, false), "call-1");
        let mut connection = RecordingConnection::new();

        let err = bootstrap.start(&mut connection).unwrap_err();

        assert_eq!(err, SetupError::PermissionRequired);
        assert!(!err.is_retryable());
        assert!(connection.attached.is_empty());
        assert!(bootstrap.active_stream().is_none());
    }

    #[test]
    fn busy_device_allows_manual_retry() {
        let backend = MockBackend::scripted(vec![
            Err(AcquireError::DeviceUnavailable),
            Err(AcquireError::DeviceUnavailable),
        ]);
        let bootstrap = bootstrap_with(&backend, network(ConnectionClass::Good, false), "call-1");
        let mut connection = RecordingConnection::new();

        let err = bootstrap.start(&mut connection).unwrap_err();
        assert_eq!(err, SetupError::DeviceBusy);
        assert!(err.is_retryable());

        // The user taps "try again" and the device has freed up.
        let handle = bootstrap.start(&mut connection).unwrap();
        assert_eq!(connection.attached.len(), 1);
        assert!(!handle.is_degraded());
    }

    #[test]
    fn degraded_grant_still_connects() {
        let backend = MockBackend::scripted(vec![Err(AcquireError::DeviceUnavailable)]);
        let bootstrap = bootstrap_with(&backend, network(ConnectionClass::Good, false), "call-1");
        let mut connection = RecordingConnection::new();

        let handle = bootstrap.start(&mut connection).unwrap();

        assert!(handle.is_degraded());
        assert!(!handle.constraints().has_video());
        assert_eq!(connection.attached.len(), 1);
    }

    #[test]
    fn attach_failure_releases_the_stream() {
        let backend = MockBackend::new();
        let bootstrap = bootstrap_with(&backend, network(ConnectionClass::Good, false), "call-1");
        let mut connection = RecordingConnection::new();
        connection.fail = true;

        let err = bootstrap.start(&mut connection).unwrap_err();

        assert!(matches!(err, SetupError::ConnectionFailed(_)));
        assert_eq!(backend.closes.load(Ordering::SeqCst), 1);
        assert!(bootstrap.active_stream().is_none());
    }

    #[test]
    fn teardown_releases_exactly_once() {
        let backend = MockBackend::new();
        let bootstrap = bootstrap_with(&backend, network(ConnectionClass::Good, false), "call-1");
        let mut connection = RecordingConnection::new();

        bootstrap.start(&mut connection).unwrap();
        bootstrap.teardown();
        bootstrap.teardown();

        assert_eq!(backend.closes.load(Ordering::SeqCst), 1);
        assert!(bootstrap.active_stream().is_none());
    }

    #[test]
    fn concurrent_teardown_releases_exactly_once() {
        let backend = MockBackend::new();
        let bootstrap = bootstrap_with(&backend, network(ConnectionClass::Good, false), "call-1");
        let mut connection = RecordingConnection::new();

        bootstrap.start(&mut connection).unwrap();

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| bootstrap.teardown());
            }
        });

        assert_eq!(backend.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn teardown_before_start_is_a_noop() {
        let backend = MockBackend::new();
        let bootstrap = bootstrap_with(&backend, network(ConnectionClass::Good, false), "call-1");

        bootstrap.teardown();

        assert_eq!(backend.closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drop_tears_down() {
        let backend = MockBackend::new();
        let coordinator = Arc::new(MediaAccessCoordinator::new(Arc::clone(&backend)));

        {
            let bootstrap = CallBootstrap::new(
                Arc::clone(&coordinator),
                network(ConnectionClass::Good, false),
                "call-1",
            );
            let mut connection = RecordingConnection::new();
            bootstrap.start(&mut connection).unwrap();
        }

        assert_eq!(backend.closes.load(Ordering::SeqCst), 1);
        assert!(coordinator.current_stream().is_none());
    }
}
