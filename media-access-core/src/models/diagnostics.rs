use serde::Serialize;

/// Counters for debugging and host-side telemetry export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorDiagnostics {
    /// Calls that reached the platform capture API (includes degrade retries).
    pub hardware_calls: u64,
    /// Acquires served from an already-held compatible stream.
    pub reuse_hits: u64,
    /// Acquires that joined an in-flight attempt instead of starting one.
    pub coalesced_waiters: u64,
    /// Grants that succeeded only after dropping video.
    pub degraded_grants: u64,
    /// Held streams torn down because a caller needed incompatible constraints.
    pub reacquisitions: u64,
    /// Explicit releases that actually freed hardware.
    pub releases: u64,
    /// Attempts that ended in a terminal failure.
    pub denials: u64,
}
