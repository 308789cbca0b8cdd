use std::time::Duration;

/// Coordinator tuning knobs.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Upper bound on a single hardware capture call. Expiry is classified as
    /// `DeviceUnavailable`; a stream that arrives after expiry is closed, not
    /// leaked. `None` leaves bounding to the platform.
    pub acquire_timeout: Option<Duration>,
}

impl CoordinatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(timeout) = self.acquire_timeout {
            if timeout.is_zero() {
                return Err("acquire timeout must be non-zero".into());
            }
        }
        Ok(())
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            // Far beyond any healthy device-open latency, short enough that a
            // caller can still surface a transient-failure message.
            acquire_timeout: Some(Duration::from_secs(10)),
        }
    }
}
