use media_access_core::StreamHandle;

use crate::error::SetupError;

/// Seam to the signaling/peer-connection layer.
///
/// Implementations wire the granted stream's tracks into the outbound peer
/// connection. They hold a non-owning view: the stream's tracks must never be
/// stopped here — only the coordinator's release frees the hardware, so one
/// borrower cannot silently invalidate another's in-use stream.
pub trait OutboundConnection<S> {
    fn attach(&mut self, handle: &StreamHandle<S>) -> Result<(), SetupError>;
}
