use crate::models::state::LockPhase;

/// Event delegate for coordinator notifications.
///
/// All methods are called with the coordinator's state lock released, from
/// whichever caller thread drove the transition. Implementations should
/// marshal to the UI thread if needed.
pub trait CoordinatorDelegate: Send + Sync {
    /// Called after the lock phase changes.
    fn on_phase_changed(&self, phase: LockPhase);

    /// Called when an attempt succeeded only after dropping video.
    fn on_degraded(&self, owner_id: &str);

    /// Called after a held stream was torn down and its hardware freed.
    fn on_released(&self, owner_id: Option<&str>);
}
