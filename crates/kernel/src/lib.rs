// kernel/src/lib.rs
//! Minnow OS: the user/kernel syscall boundary of a teaching kernel.
//!
//! This crate implements the one place where untrusted data crosses a trust
//! boundary: the trap dispatcher that decodes a syscall number and its
//! argument words from the user stack, validates every user-supplied pointer
//! before it is dereferenced, and routes the call to process control, file
//! lifecycle and I/O handlers.
//!
//! Everything that surrounds the boundary (thread scheduling, page-table
//! management, the on-disk filesystem, trap-frame construction, the program
//! loader) is an external collaborator reached through the traits in
//! [`kernel::core::traits`]. The [`kernel::Kernel`] value ties the
//! collaborators together; the trap glue calls [`kernel::Kernel::handle_trap`]
//! with the faulting process's id, its trap frame and its address space, and
//! acts on the returned [`kernel::syscall::Flow`].
//!
//! Under `cargo test` the crate builds against the host `std` so the unit
//! tests can drive the boundary with in-memory collaborators; every other
//! build is `no_std` + `alloc`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![cfg_attr(test, allow(missing_docs))]

extern crate alloc;

pub mod kernel;

pub use kernel::Kernel;
pub use kernel::syscall::{Flow, TrapFrame};
