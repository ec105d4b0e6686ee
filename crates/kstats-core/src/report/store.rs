//! Report store trait.
//!
//! Defines the durable queue the uploader drains.

use super::model::Report;
use crate::error::Result;
use std::fmt;

/// Identifier of one queued report. Slots sort in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Durable storage for pending reports plus the single checkpoint slot.
///
/// The backing storage may be shared with other processes. Implementations
/// must treat an entry vanishing between listing and access as a benign race.
///
/// # Implementation Notes
///
/// On a multithreaded host, callers serialize every mutation behind one lock;
/// implementations only guarantee that slot allocation never hands out the
/// same slot twice.
pub trait ReportStore: Send + Sync {
    /// Overwrites the checkpoint slot with a snapshot of the current session.
    fn enqueue_checkpoint(&self, report: &Report) -> Result<()>;

    /// Moves any checkpoint into the queue, appends `report`, then clears the
    /// checkpoint slot.
    ///
    /// # Returns
    ///
    /// The slot holding the final report.
    fn commit_final(&self, report: &Report) -> Result<SlotId>;

    /// Migrates a checkpoint left behind by an unclean shutdown into the
    /// queue.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(slot))`: an orphaned checkpoint was queued
    /// - `Ok(None)`: there was no checkpoint
    fn recover_checkpoint(&self) -> Result<Option<SlotId>>;

    /// Queued reports in slot order.
    fn list_pending(&self) -> Result<Vec<(SlotId, Report)>>;

    /// Deletes a delivered entry. Removing a missing entry succeeds.
    fn remove(&self, slot: SlotId) -> Result<()>;
}
