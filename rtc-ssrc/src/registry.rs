//! SSRC Registry - per-call map from SSRC to [`SsrcEntry`].

use crate::context::{SsrcContextHandle, SsrcDirection};
use crate::entry::{HistoryCapacity, SsrcEntry};
use crate::lock_order::assert_no_entry_lock_held;
use log::{debug, trace, warn};
use parking_lot::RwLock;
use shared::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of sender reports retained per SSRC.
///
/// With the usual 5 second RTCP interval this spans well over half a minute,
/// enough for receiver reports delayed by a few intervals to still match.
pub const DEFAULT_SENDER_REPORT_CAPACITY: usize = 8;
/// Default number of receiver reports retained per SSRC.
pub const DEFAULT_RECEIVER_REPORT_CAPACITY: usize = 8;
/// Default number of stats blocks retained per SSRC.
pub const DEFAULT_STATS_CAPACITY: usize = 16;

/// Builder for the SsrcRegistry.
///
/// # Example
///
/// ```ignore
/// use rtc_ssrc::SsrcRegistryBuilder;
///
/// // With default history sizes
/// let registry = SsrcRegistryBuilder::new().build();
///
/// // Tagged with the owning call and a longer sender report history
/// let registry = SsrcRegistryBuilder::new()
///     .with_call_id("call-42")
///     .with_sender_report_capacity(16)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct SsrcRegistryBuilder {
    /// Identifier of the owning call, used in log lines.
    call_id: String,
    capacity: HistoryCapacity,
}

impl Default for SsrcRegistryBuilder {
    fn default() -> Self {
        Self {
            call_id: String::new(),
            capacity: HistoryCapacity {
                sender_reports: DEFAULT_SENDER_REPORT_CAPACITY,
                receiver_reports: DEFAULT_RECEIVER_REPORT_CAPACITY,
                stats_blocks: DEFAULT_STATS_CAPACITY,
            },
        }
    }
}

impl SsrcRegistryBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the call identifier reported in log lines.
    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = call_id.into();
        self
    }

    /// Set how many sender reports each entry retains for RTT matching.
    ///
    /// A value of zero is treated as one.
    pub fn with_sender_report_capacity(mut self, capacity: usize) -> Self {
        self.capacity.sender_reports = capacity;
        self
    }

    /// Set how many receiver reports each entry retains.
    ///
    /// A value of zero is treated as one.
    pub fn with_receiver_report_capacity(mut self, capacity: usize) -> Self {
        self.capacity.receiver_reports = capacity;
        self
    }

    /// Set how many stats blocks each entry retains.
    ///
    /// A value of zero is treated as one.
    pub fn with_stats_capacity(mut self, capacity: usize) -> Self {
        self.capacity.stats_blocks = capacity;
        self
    }

    pub fn build(self) -> SsrcRegistry {
        SsrcRegistry {
            call_id: self.call_id,
            capacity: self.capacity,
            entries: RwLock::new(Some(HashMap::new())),
            #[cfg(test)]
            created: AtomicUsize::new(0),
        }
    }
}

/// Concurrent map from SSRC to [`SsrcEntry`], owned by one call.
///
/// The map's structural lock is held only to look up or insert an entry;
/// entry state is guarded by each entry's own lock, always acquired after
/// the structural one.
///
/// # Example
///
/// ```ignore
/// use rtc_ssrc::{SsrcDirection, SsrcRegistry};
///
/// let registry = SsrcRegistry::new();
///
/// let ctx = registry.get_context(0x12345678, SsrcDirection::Input)?;
/// ctx.with(|ctx| ctx.srtp_index += 1);
///
/// assert!(registry.find(0x12345678)?.is_some());
/// assert!(registry.find(0x87654321)?.is_none());
///
/// registry.destroy()?;
/// ```
pub struct SsrcRegistry {
    call_id: String,
    capacity: HistoryCapacity,

    /// `None` once the registry has been destroyed.
    entries: RwLock<Option<HashMap<u32, Arc<SsrcEntry>>>>,

    #[cfg(test)]
    created: AtomicUsize,
}

impl SsrcRegistry {
    /// Create an empty registry with default settings.
    pub fn new() -> Self {
        SsrcRegistryBuilder::new().build()
    }

    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    /// Looks up an entry without creating it.
    pub fn find(&self, ssrc: u32) -> Result<Option<Arc<SsrcEntry>>> {
        assert_no_entry_lock_held("find");

        let entries = self.entries.read();
        let entries = entries.as_ref().ok_or_else(|| self.destroyed("find"))?;
        Ok(entries.get(&ssrc).cloned())
    }

    /// Returns the entry for `ssrc`, creating it if needed.
    ///
    /// Racing callers for the same new SSRC all receive the same entry.
    pub fn get_or_create(&self, ssrc: u32) -> Result<Arc<SsrcEntry>> {
        assert_no_entry_lock_held("get_or_create");

        {
            let entries = self.entries.read();
            let entries = entries
                .as_ref()
                .ok_or_else(|| self.destroyed("get_or_create"))?;
            if let Some(entry) = entries.get(&ssrc) {
                return Ok(Arc::clone(entry));
            }
        }

        let mut entries = self.entries.write();
        let entries = entries
            .as_mut()
            .ok_or_else(|| self.destroyed("get_or_create"))?;
        let entry = entries.entry(ssrc).or_insert_with(|| {
            trace!("[{}] ssrc {:#010x}: new entry", self.call_id, ssrc);
            #[cfg(test)]
            self.created.fetch_add(1, Ordering::SeqCst);
            Arc::new(SsrcEntry::new(ssrc, self.capacity))
        });
        Ok(Arc::clone(entry))
    }

    /// Returns a handle to one directional context of `ssrc`'s entry,
    /// creating the entry if needed.
    pub fn get_context(&self, ssrc: u32, direction: SsrcDirection) -> Result<SsrcContextHandle> {
        let entry = self.get_or_create(ssrc)?;
        Ok(SsrcContextHandle::new(entry, direction))
    }

    /// Number of entries.
    pub fn len(&self) -> Result<usize> {
        assert_no_entry_lock_held("len");

        let entries = self.entries.read();
        let entries = entries.as_ref().ok_or_else(|| self.destroyed("len"))?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Snapshot of every SSRC seen so far, in ascending order.
    pub fn ssrcs(&self) -> Result<Vec<u32>> {
        assert_no_entry_lock_held("ssrcs");

        let entries = self.entries.read();
        let entries = entries.as_ref().ok_or_else(|| self.destroyed("ssrcs"))?;
        let mut ssrcs: Vec<u32> = entries.keys().copied().collect();
        ssrcs.sort_unstable();
        Ok(ssrcs)
    }

    /// Releases every entry. Any later call on the registry, including a
    /// second `destroy`, returns an error.
    ///
    /// Handles still held by callers stay valid but are no longer reachable
    /// through the registry.
    pub fn destroy(&self) -> Result<()> {
        assert_no_entry_lock_held("destroy");

        let entries = self
            .entries
            .write()
            .take()
            .ok_or(Error::ErrSsrcRegistryAlreadyDestroyed)?;
        debug!(
            "[{}] ssrc registry destroyed, releasing {} entries",
            self.call_id,
            entries.len()
        );
        drop(entries);
        Ok(())
    }

    pub fn is_destroyed(&self) -> bool {
        self.entries.read().is_none()
    }

    fn destroyed(&self, operation: &str) -> Error {
        warn!("[{}] ssrc registry: {} after destroy", self.call_id, operation);
        Error::ErrSsrcRegistryDestroyed
    }

    #[cfg(test)]
    pub(crate) fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl Default for SsrcRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SsrcRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.read().as_ref().map(|entries| entries.len());
        f.debug_struct("SsrcRegistry")
            .field("call_id", &self.call_id)
            .field("entries", &entries)
            .finish()
    }
}
