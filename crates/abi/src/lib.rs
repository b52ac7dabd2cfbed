// abi/src/lib.rs
//! Minnow OS shared ABI definitions
//!
//! This crate is the single source of truth for the user/kernel syscall
//! contract: the trap vector, the syscall numbers, the number of argument
//! words each call reads from the user stack, and the handful of constants
//! both sides must agree on. It is consumed by the kernel's dispatcher and
//! by `libuser`'s trap stubs, so a number can never drift between the two.
//!
//! # Calling convention
//!
//! A user program pushes the argument words (rightmost first), pushes the
//! syscall number, and raises [`TRAP_VECTOR`]. The kernel reads the number
//! from the word the stack pointer names and the arguments from the words
//! above it, and leaves the return value (for calls that produce one) in the
//! trap frame's accumulator slot.

#![no_std]
#![warn(missing_docs)]

/// Interrupt vector user programs raise to enter the kernel.
pub const TRAP_VECTOR: u8 = 0x30;

/// Console input handle. Reserved; never stored in a descriptor table.
pub const STDIN_HANDLE: u32 = 0;

/// Console output handle. Reserved; never stored in a descriptor table.
pub const STDOUT_HANDLE: u32 = 1;

/// Lowest handle a successful `open` may return.
pub const FIRST_FILE_HANDLE: u32 = 2;

/// Exit status reported for a process the kernel terminated for violating
/// the syscall calling convention.
pub const KILLED_STATUS: i32 = -1;

/// System call numbers.
///
/// The discriminant values are the wire format; they must never change.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyscallNumber {
    /// Power the machine off.
    Halt = 0,
    /// Terminate the calling process with a status word.
    Exit = 1,
    /// Spawn a child process from a command line; returns its pid or -1.
    Exec = 2,
    /// Block for a specific child's termination; returns its status or -1.
    Wait = 3,
    /// Create an empty file of a given size; returns a success flag.
    Create = 4,
    /// Delete a file by name; returns a success flag.
    Remove = 5,
    /// Open a file by name; returns a new handle or -1.
    Open = 6,
    /// Byte length of an open file, or 0 if the handle is unknown.
    Filesize = 7,
    /// Read into a user buffer; returns bytes read or -1.
    Read = 8,
    /// Write from a user buffer; returns bytes written or -1.
    Write = 9,
    /// Reposition an open file's cursor. No return value.
    Seek = 10,
    /// Current cursor position, or 0 if the handle is unknown.
    Tell = 11,
    /// Close a handle. No return value.
    Close = 12,
}

impl SyscallNumber {
    /// Decodes a raw number word. Unknown numbers are a protocol violation
    /// the dispatcher escalates; there is no catch-all variant.
    #[must_use]
    pub const fn from_u32(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Halt,
            1 => Self::Exit,
            2 => Self::Exec,
            3 => Self::Wait,
            4 => Self::Create,
            5 => Self::Remove,
            6 => Self::Open,
            7 => Self::Filesize,
            8 => Self::Read,
            9 => Self::Write,
            10 => Self::Seek,
            11 => Self::Tell,
            12 => Self::Close,
            _ => return None,
        })
    }

    /// Number of argument words the call reads from the user stack,
    /// not counting the syscall number itself.
    #[must_use]
    pub const fn arg_count(self) -> usize {
        match self {
            Self::Halt => 0,
            Self::Exit
            | Self::Exec
            | Self::Wait
            | Self::Remove
            | Self::Open
            | Self::Filesize
            | Self::Tell
            | Self::Close => 1,
            Self::Create | Self::Seek => 2,
            Self::Read | Self::Write => 3,
        }
    }

    /// Whether the call writes a return value into the accumulator slot.
    /// HALT, EXIT, SEEK and CLOSE leave it untouched.
    #[must_use]
    pub const fn returns_value(self) -> bool {
        !matches!(self, Self::Halt | Self::Exit | Self::Seek | Self::Close)
    }

    /// Human-readable name, for trace output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Halt => "halt",
            Self::Exit => "exit",
            Self::Exec => "exec",
            Self::Wait => "wait",
            Self::Create => "create",
            Self::Remove => "remove",
            Self::Open => "open",
            Self::Filesize => "filesize",
            Self::Read => "read",
            Self::Write => "write",
            Self::Seek => "seek",
            Self::Tell => "tell",
            Self::Close => "close",
        }
    }
}
