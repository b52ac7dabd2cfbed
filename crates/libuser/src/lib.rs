// libuser/src/lib.rs
//! Minnow OS user-mode runtime library.
//!
//! Thin, typed wrappers over the raw syscall stubs in [`syscall`]. User
//! programs link this crate instead of open-coding the trap convention; the
//! numbers and arities come from `minnow_os_abi`, the same crate the kernel
//! dispatcher reads them from, so the two sides cannot drift.

#![no_std]
#![warn(missing_docs)]

pub mod syscall;

pub use syscall::{
    close, create, exec, exit, filesize, halt, open, read, remove, seek, tell, wait, write,
};
