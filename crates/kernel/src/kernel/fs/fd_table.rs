// kernel/src/kernel/fs/fd_table.rs
//! Per-process file-descriptor table.
//!
//! Handles are small integers, unique within their process and never reused:
//! the allocator only counts up, starting above the reserved console handles
//! 0 and 1 (which are never entered into the table). Lookup is a linear
//! scan; table sizes are bounded by the per-process open-file limit, so the
//! simplicity is worth more than the asymptotics.

use alloc::sync::Arc;
use alloc::vec::Vec;

use minnow_os_abi::FIRST_FILE_HANDLE;

use crate::kernel::core::traits::OpenFile;

/// Small integer naming an open file within one process.
pub type Handle = u32;

/// The open files of one process, keyed by handle.
///
/// Owned exclusively by the process descriptor; no lock of its own is
/// needed beyond the process-table lock the caller already holds.
pub struct FdTable {
    entries: Vec<(Handle, Arc<dyn OpenFile>)>,
    next: Handle,
}

impl FdTable {
    /// An empty table whose first allocation will be handle 2.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next: FIRST_FILE_HANDLE,
        }
    }

    /// Records an open file under the next unused handle and returns it.
    pub fn insert(&mut self, file: Arc<dyn OpenFile>) -> Handle {
        let handle = self.next;
        self.next += 1;
        self.entries.push((handle, file));
        handle
    }

    /// The open file behind `handle`, if any.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&Arc<dyn OpenFile>> {
        self.entries
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, file)| file)
    }

    /// Removes `handle` from the table, handing back its file.
    ///
    /// The handle number is retired: it will never be allocated again for
    /// this process.
    pub fn remove(&mut self, handle: Handle) -> Option<Arc<dyn OpenFile>> {
        let index = self.entries.iter().position(|(h, _)| *h == handle)?;
        Some(self.entries.swap_remove(index).1)
    }

    /// Empties the table, handing back every open file. Used by the exit
    /// path to close everything the process left open.
    pub fn drain(&mut self) -> Vec<Arc<dyn OpenFile>> {
        let mut drained = Vec::new();
        core::mem::swap(&mut drained, &mut self.entries);
        drained.into_iter().map(|(_, file)| file).collect()
    }

    /// Number of open handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no open handles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FdTable {
    fn default() -> Self {
        Self::new()
    }
}
