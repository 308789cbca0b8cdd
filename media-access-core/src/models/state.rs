/// Observable coordinator lifecycle.
///
/// Phase transitions:
/// ```text
/// idle → acquiring → held
///   ↑       |          |
///   |       | denied   | release / re-acquire
///   └───────┴──────────┘
/// ```
///
/// Exactly one lock state exists per coordinator; this enum is its public
/// projection (the internal state additionally carries the in-flight request,
/// its waiter queue, and the held handle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockPhase {
    Idle,
    Acquiring,
    Held,
}

impl LockPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_acquiring(&self) -> bool {
        matches!(self, Self::Acquiring)
    }

    pub fn is_held(&self) -> bool {
        matches!(self, Self::Held)
    }
}
