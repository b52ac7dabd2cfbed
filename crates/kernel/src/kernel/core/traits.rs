// kernel/src/kernel/core/traits.rs
//! Collaborator trait seams.
//!
//! The syscall boundary never owns a device, a filesystem or a page table;
//! it reaches all of them through the traits below. The boot path hands
//! concrete implementations to [`crate::kernel::Kernel::new`], and the unit
//! tests substitute in-memory fakes.

use alloc::sync::Arc;
use bitflags::bitflags;

use super::types::{FileId, Pid};

bitflags! {
    /// Access the page-table query reports for one user page.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageFlags: u8 {
        /// The page is currently backed by a physical frame.
        const MAPPED = 1 << 0;
        /// The page may be written by user code.
        const WRITABLE = 1 << 1;
    }
}

/// Page-table query and byte access for one process's address space.
///
/// The trap glue passes the calling process's mapping into
/// [`crate::kernel::Kernel::handle_trap`]; the validator consults
/// [`page_flags`](Self::page_flags) before any byte is touched.
pub trait AddressSpace {
    /// Flags for the page containing `vaddr`. Empty if unmapped.
    fn page_flags(&self, vaddr: u32) -> PageFlags;

    /// Loads one byte of user memory. `None` if the address is not backed.
    fn load(&self, vaddr: u32) -> Option<u8>;

    /// Stores one byte of user memory. `false` if the address is not backed
    /// or not writable.
    fn store(&mut self, vaddr: u32, byte: u8) -> bool;
}

/// One open instance of a file, owned by the filesystem collaborator.
///
/// The object carries its own cursor; `read` and `write` advance it. The
/// deny-write flag also lives here: while it is set, `write` reports 0
/// bytes written. All content operations on these objects run under the
/// kernel's single global file lock.
pub trait OpenFile: Send + Sync {
    /// Stable identity of the underlying file; every open of the same file
    /// reports the same id.
    fn id(&self) -> FileId;

    /// Byte length of the file.
    fn length(&self) -> u32;

    /// Reads from the cursor position, advancing it. Returns bytes read;
    /// short counts signal end of file.
    fn read(&self, buf: &mut [u8]) -> usize;

    /// Writes at the cursor position, advancing it. Returns bytes written;
    /// 0 when the file is write-denied.
    fn write(&self, buf: &[u8]) -> usize;

    /// Moves the cursor to an absolute byte offset.
    fn seek(&self, position: u32);

    /// Current cursor position.
    fn tell(&self) -> u32;

    /// Asserts the underlying file's deny-write flag.
    fn deny_write(&self);

    /// Releases the underlying file's deny-write flag.
    fn allow_write(&self);

    /// Tells the collaborator this open instance is done.
    fn close(&self);
}

/// Filesystem collaborator; owns files and their write-protect flags.
pub trait FileSystem: Send {
    /// Creates an empty file of `initial_size` bytes. `false` if the name
    /// is taken or invalid.
    fn create(&mut self, name: &str, initial_size: u32) -> bool;

    /// Deletes a file by name. `false` if it does not exist.
    fn remove(&mut self, name: &str) -> bool;

    /// Opens a file by name. `None` if it does not exist.
    fn open(&mut self, name: &str) -> Option<Arc<dyn OpenFile>>;
}

/// Console device: the target of handle 1 and the source of handle 0.
pub trait Console: Send + Sync {
    /// Writes the bytes to the console, in order, atomically with respect
    /// to other `put_bytes` calls.
    fn put_bytes(&self, bytes: &[u8]);

    /// Blocks for the next input byte.
    fn read_byte(&self) -> u8;
}

/// Loader/scheduler collaborator that materializes a new user program.
pub trait ProgramLoader: Send + Sync {
    /// Opens the executable image backing `program`, so the kernel can claim
    /// deny-write on it for the child's lifetime. `None` if no such program.
    fn open_executable(&self, program: &str) -> Option<Arc<dyn OpenFile>>;

    /// Hands the prepared process to the scheduler with its full command
    /// line. `false` if the program cannot be started; the kernel rolls the
    /// child back.
    fn start(&self, pid: Pid, command_line: &str) -> bool;
}

/// Machine power control, for the HALT syscall.
pub trait PowerControl: Send + Sync {
    /// Powers the machine off. May return in hosted environments.
    fn shutdown(&self);
}
