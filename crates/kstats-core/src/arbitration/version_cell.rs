use std::sync::atomic::{AtomicI64, Ordering};

/// Sentinel written by a winner. No real declared version can reach it.
pub const RETIRED_VERSION: i64 = i64::MAX;

/// The declared-version marker of one loaded copy of the component.
///
/// Each copy owns exactly one cell for the lifetime of the process and the
/// host exposes it to the other copies through
/// [`LoadedModule::version_marker`](crate::host::LoadedModule::version_marker).
///
/// Contract: the cell starts at the copy's declared version and changes at
/// most once, via [`retire`](Self::retire), to [`RETIRED_VERSION`].
#[derive(Debug)]
pub struct VersionCell {
    declared: AtomicI64,
}

impl VersionCell {
    pub fn new(declared: i64) -> Self {
        Self {
            declared: AtomicI64::new(declared),
        }
    }

    /// Current marker value.
    pub fn get(&self) -> i64 {
        self.declared.load(Ordering::Acquire)
    }

    /// Marks this copy unelectable for any later arbitration in the process.
    ///
    /// Returns `false` if the cell no longer holds `expected`, i.e. it was
    /// already retired.
    pub fn retire(&self, expected: i64) -> bool {
        self.declared
            .compare_exchange(expected, RETIRED_VERSION, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_retired(&self) -> bool {
        self.get() == RETIRED_VERSION
    }
}
