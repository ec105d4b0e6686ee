//! Directory-backed `ReportStore`.
//!
//! Directory structure:
//! ```text
//! data_dir/
//! ├── checkpoint.json          # snapshot of the running session
//! ├── .reports.lock            # serializes commit/recovery across processes
//! └── queue/
//!     ├── report-0.json
//!     └── report-1.json
//! ```
//!
//! The directory is shared by every game session on the machine. Any file
//! may disappear between listing and access; that is never an error.

use super::atomic_file::{read_if_exists, remove_if_exists, write_atomic, FileLock};
use kstats_core::error::{Result, TelemetryError};
use kstats_core::report::{Report, ReportStore, SlotId};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CHECKPOINT_FILE: &str = "checkpoint.json";
const LOCK_FILE: &str = ".reports.lock";
const QUEUE_DIR: &str = "queue";
const SLOT_PREFIX: &str = "report-";
const SLOT_SUFFIX: &str = ".json";

/// How long an empty reserved slot may wait for its content before it is
/// treated as abandoned by a dead writer.
pub const DEFAULT_RESERVATION_GRACE: Duration = Duration::from_secs(10 * 60);

pub struct FileReportStore {
    base_dir: PathBuf,
    reservation_grace: Duration,
}

impl FileReportStore {
    /// Creates a store rooted at `base_dir`, creating the directory layout.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(base_dir.join(QUEUE_DIR)).map_err(|e| {
            TelemetryError::storage(format!(
                "Failed to create report directory {}: {}",
                base_dir.display(),
                e
            ))
        })?;
        Ok(Self {
            base_dir,
            reservation_grace: DEFAULT_RESERVATION_GRACE,
        })
    }

    pub fn with_reservation_grace(mut self, grace: Duration) -> Self {
        self.reservation_grace = grace;
        self
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.base_dir.join(CHECKPOINT_FILE)
    }

    pub fn slot_path(&self, slot: SlotId) -> PathBuf {
        self.queue_dir()
            .join(format!("{}{}{}", SLOT_PREFIX, slot.0, SLOT_SUFFIX))
    }

    fn queue_dir(&self) -> PathBuf {
        self.base_dir.join(QUEUE_DIR)
    }

    fn lock(&self) -> Result<FileLock> {
        Ok(FileLock::acquire(&self.base_dir.join(LOCK_FILE))?)
    }

    /// Claims the lowest unused slot by creating its file exclusively.
    ///
    /// The claimed file is empty until filled; readers skip empty slots.
    fn reserve_slot(&self) -> Result<SlotId> {
        let mut n = 0u64;
        loop {
            let slot = SlotId(n);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.slot_path(slot))
            {
                Ok(_) => return Ok(slot),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Moves the checkpoint file into a fresh queue slot.
    fn migrate_checkpoint(&self) -> Result<Option<SlotId>> {
        let checkpoint = self.checkpoint_path();
        if !checkpoint.exists() {
            return Ok(None);
        }

        let slot = self.reserve_slot()?;
        Ok(self.move_checkpoint_to(slot)?.then_some(slot))
    }

    /// Renames the checkpoint over the reserved `slot`.
    ///
    /// Returns `false` and releases the slot when the checkpoint is already
    /// gone.
    fn move_checkpoint_to(&self, slot: SlotId) -> Result<bool> {
        match fs::rename(self.checkpoint_path(), self.slot_path(slot)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Someone else moved it first.
                remove_if_exists(&self.slot_path(slot))?;
                Ok(false)
            }
            Err(e) => {
                remove_if_exists(&self.slot_path(slot))?;
                Err(e.into())
            }
        }
    }

    /// Whether an empty slot was reserved longer ago than the grace period.
    fn is_abandoned(&self, path: &Path) -> bool {
        fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|age| age >= self.reservation_grace)
    }

    fn parse_slot(file_name: &str) -> Option<SlotId> {
        file_name
            .strip_prefix(SLOT_PREFIX)?
            .strip_suffix(SLOT_SUFFIX)?
            .parse()
            .ok()
            .map(SlotId)
    }
}

impl ReportStore for FileReportStore {
    fn enqueue_checkpoint(&self, report: &Report) -> Result<()> {
        write_atomic(&self.checkpoint_path(), report.to_json()?.as_bytes())?;
        Ok(())
    }

    fn commit_final(&self, report: &Report) -> Result<SlotId> {
        let _lock = self.lock()?;

        if let Some(slot) = self.migrate_checkpoint()? {
            tracing::debug!("[FileReportStore] checkpoint moved to slot {}", slot);
        }

        let json = report.to_json()?;
        let slot = self.reserve_slot()?;
        if let Err(e) = write_atomic(&self.slot_path(slot), json.as_bytes()) {
            remove_if_exists(&self.slot_path(slot))?;
            return Err(e.into());
        }

        remove_if_exists(&self.checkpoint_path())?;
        tracing::debug!("[FileReportStore] final report committed to slot {}", slot);
        Ok(slot)
    }

    fn recover_checkpoint(&self) -> Result<Option<SlotId>> {
        let _lock = self.lock()?;
        let recovered = self.migrate_checkpoint()?;
        if let Some(slot) = recovered {
            tracing::info!(
                "[FileReportStore] recovered checkpoint of an unclean shutdown into slot {}",
                slot
            );
        }
        Ok(recovered)
    }

    fn list_pending(&self) -> Result<Vec<(SlotId, Report)>> {
        let mut slots: Vec<SlotId> = fs::read_dir(self.queue_dir())?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| Self::parse_slot(&entry.file_name().to_string_lossy()))
            .collect();
        slots.sort();

        let mut pending = Vec::with_capacity(slots.len());
        for slot in slots {
            let path = self.slot_path(slot);
            let Some(content) = read_if_exists(&path)? else {
                continue;
            };
            if content.trim().is_empty() {
                if self.is_abandoned(&path) {
                    tracing::warn!(
                        "[FileReportStore] releasing abandoned reservation {}",
                        path.display()
                    );
                    remove_if_exists(&path)?;
                }
                // Otherwise reserved but not written yet.
                continue;
            }
            match Report::from_json(&content) {
                Ok(report) => pending.push((slot, report)),
                Err(e) => {
                    tracing::warn!(
                        "[FileReportStore] discarding unreadable report {}: {}",
                        path.display(),
                        e
                    );
                    remove_if_exists(&path)?;
                }
            }
        }
        Ok(pending)
    }

    fn remove(&self, slot: SlotId) -> Result<()> {
        remove_if_exists(&self.slot_path(slot))?;
        Ok(())
    }
}
