// kernel/src/kernel/fs/mod.rs
//! File-descriptor state and executable write-protection.
//!
//! The per-process descriptor table lives in [`fd_table`]; the global
//! deny-write-on-exec tracker in [`write_protect`]. Both are plumbing for
//! the syscall handlers; the open/read/write/seek/tell/close semantics
//! themselves are implemented in [`crate::kernel::syscall`].

pub mod fd_table;
pub mod write_protect;

pub use fd_table::{FdTable, Handle};
pub use write_protect::WriteProtect;

use alloc::boxed::Box;

use crate::kernel::core::traits::FileSystem;

/// State serialized by the single global file lock.
///
/// Every operation that touches file content (creating, removing, opening,
/// reading, writing, closing, and every write-protection change) runs with
/// this structure locked, serializing file-content operations machine-wide.
/// A coarse discipline, but the one the rest of the kernel can reason about.
pub struct FileContext {
    /// The filesystem collaborator.
    pub backend: Box<dyn FileSystem>,
    /// Deny-write claims held by running executables.
    pub protect: WriteProtect,
}

impl FileContext {
    /// Wraps the filesystem collaborator with an empty protection map.
    #[must_use]
    pub fn new(backend: Box<dyn FileSystem>) -> Self {
        Self {
            backend,
            protect: WriteProtect::new(),
        }
    }
}
