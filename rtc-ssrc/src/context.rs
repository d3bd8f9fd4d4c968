use crate::entry::SsrcEntry;
use std::fmt;
use std::sync::Arc;

/// Traffic direction of a crypto context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SsrcDirection {
    /// Packets received from the peer.
    Input,
    /// Packets sent towards the peer.
    Output,
}

/// Per-direction state kept on behalf of the SRTP layer.
///
/// `srtp_index` is opaque here: rollover and replay-window handling belong
/// to the crypto layer, the registry only guarantees a single mutator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SsrcContext {
    pub srtp_index: u64,
}

/// Handle to one directional context of an entry.
///
/// The handle is bound to a single direction and offers no path to the
/// opposite context.
#[derive(Clone)]
pub struct SsrcContextHandle {
    entry: Arc<SsrcEntry>,
    direction: SsrcDirection,
}

impl SsrcContextHandle {
    pub(crate) fn new(entry: Arc<SsrcEntry>, direction: SsrcDirection) -> Self {
        Self { entry, direction }
    }

    pub fn ssrc(&self) -> u32 {
        self.entry.ssrc()
    }

    pub fn direction(&self) -> SsrcDirection {
        self.direction
    }

    /// Runs `f` with exclusive access to the context.
    pub fn with<R>(&self, f: impl FnOnce(&mut SsrcContext) -> R) -> R {
        self.entry.with_context(self.direction, f)
    }

    pub fn srtp_index(&self) -> u64 {
        self.with(|ctx| ctx.srtp_index)
    }

    pub fn set_srtp_index(&self, index: u64) {
        self.with(|ctx| ctx.srtp_index = index);
    }
}

impl fmt::Debug for SsrcContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsrcContextHandle")
            .field("ssrc", &self.ssrc())
            .field("direction", &self.direction)
            .finish()
    }
}
