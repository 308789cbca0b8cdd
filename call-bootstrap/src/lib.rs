//! # call-bootstrap
//!
//! The call-setup routine of the calling feature, and the primary client of
//! `media-access-core`.
//!
//! Provides:
//! - `CallBootstrap` — selects a capture quality from network conditions,
//!   acquires the capture resource, wires it into the outbound connection,
//!   and releases it exactly once on call end, setup abort, or drop
//! - `OutboundConnection` — the seam to the signaling/peer-connection layer
//! - `SetupError` — the user-facing error surface (messages and
//!   retryability live here, never in the coordinator)
//!
//! ## Usage
//! ```ignore
//! use call_bootstrap::CallBootstrap;
//!
//! let bootstrap = CallBootstrap::new(coordinator, network, "call-42");
//! let handle = bootstrap.start(&mut connection)?;
//! // ... call runs ...
//! bootstrap.teardown();
//! ```

pub mod bootstrap;
pub mod connection;
pub mod error;

pub use bootstrap::CallBootstrap;
pub use connection::OutboundConnection;
pub use error::SetupError;
