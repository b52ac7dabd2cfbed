// kernel/src/kernel/syscall/args.rs
//! Typed cursor over the trapped user stack.
//!
//! The trap frame exposes the user stack pointer as an opaque word; the
//! syscall number sits at that word and the arguments above it. `UserArgs`
//! walks those words through [`UserAccess`], so every read is range- and
//! mapping-checked at the moment it happens; argument marshaling and
//! validation cannot be decoupled. A block of arguments that straddles a
//! valid/invalid mapping boundary faults exactly at the first bad word.

use crate::kernel::security::{AccessResult, UserAccess};

/// Cursor over the argument words of one trap.
pub struct UserArgs {
    cursor: u32,
}

impl UserArgs {
    /// Starts at the trapped stack pointer: the first read yields the
    /// syscall number, subsequent reads the argument words.
    #[must_use]
    pub const fn new(esp: u32) -> Self {
        Self { cursor: esp }
    }

    /// Reads the next 32-bit word, validated.
    pub fn next_u32(&mut self, access: &UserAccess<'_>) -> AccessResult<u32> {
        let word = access.read_u32(self.cursor)?;
        self.cursor = self.cursor.wrapping_add(4);
        Ok(word)
    }

    /// Reads the next word as a signed value (exit statuses).
    pub fn next_i32(&mut self, access: &UserAccess<'_>) -> AccessResult<i32> {
        Ok(self.next_u32(access)? as i32)
    }

    /// Reads the next word as a user pointer. The pointee is *not* checked
    /// here; the handler validates it for its full declared length before
    /// any dereference.
    pub fn next_ptr(&mut self, access: &UserAccess<'_>) -> AccessResult<u32> {
        self.next_u32(access)
    }
}
