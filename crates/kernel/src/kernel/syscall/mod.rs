// kernel/src/kernel/syscall/mod.rs
//! System call dispatch and handlers.
//!
//! [`dispatch`] is the trust boundary: it reads the syscall number from the
//! trapped user stack, reads the fixed arity of argument words that number
//! implies (each independently validated by the [`UserArgs`] cursor) and
//! routes to the handler. Two failure classes exist and never mix:
//!
//! - **Protocol violations** (bad syscall number, invalid pointer or range,
//!   an argument block running off a mapping) terminate the caller with
//!   status -1. No error value is ever returned to user code for these; a
//!   process that violates the calling convention cannot be trusted to
//!   handle one.
//! - **Recoverable failures** (file not found, unknown handle, I/O refusal)
//!   come back through the normal return slot as the documented sentinel
//!   (-1, 0 or false depending on the call) and the process keeps running.
//!
//! The handler's return value is written into the frame's accumulator slot
//! only for calls that produce one; HALT, EXIT, SEEK and CLOSE leave the
//! slot untouched. An unrecognized number is never a silent no-op.

mod args;

pub use args::UserArgs;

use alloc::sync::Arc;
use alloc::vec;

use minnow_os_abi::{FIRST_FILE_HANDLE, KILLED_STATUS, STDIN_HANDLE, STDOUT_HANDLE, SyscallNumber};

use crate::kernel::Kernel;
use crate::kernel::core::traits::{AddressSpace, OpenFile};
use crate::kernel::core::types::Pid;
use crate::kernel::fs::Handle;
use crate::kernel::process::lifecycle;
use crate::kernel::security::{Fault, UserAccess};

/// Longest file name the kernel will copy in for CREATE/REMOVE/OPEN.
pub const MAX_PATH_LEN: usize = 128;

/// Longest command line EXEC will copy in.
pub const MAX_CMDLINE_LEN: usize = 4096;

/// Kernel bounce-buffer granularity for file and console transfers.
const IO_CHUNK: usize = 4096;

/// The raw trap state the boundary reads and writes.
///
/// `esp` is the user stack pointer at the moment of the trap: an opaque
/// cursor whose word 0 is the syscall number. `eax` is the accumulator
/// slot the return value is written into. Constructed by the external trap
/// glue; the core never looks at the rest of the saved registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapFrame {
    /// Trapped user stack pointer.
    pub esp: u32,
    /// Accumulator / return-value slot.
    pub eax: u32,
}

/// What the trap glue must do after dispatch returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Return to user mode; the frame holds any return value.
    Resume,
    /// The calling process terminated (voluntarily or forcibly) with this
    /// status. Its thread must not return to user mode.
    Exit(i32),
    /// HALT was requested; stop scheduling.
    Shutdown,
}

/// Decodes and routes one trapped syscall.
pub fn dispatch(
    kernel: &Kernel,
    caller: Pid,
    frame: &mut TrapFrame,
    aspace: &mut dyn AddressSpace,
) -> Flow {
    let mut access = UserAccess::new(aspace);
    let mut args = UserArgs::new(frame.esp);

    // The number word itself must pass validation before anything else.
    let number = match args.next_u32(&access) {
        Ok(number) => number,
        Err(fault) => return faulted(kernel, caller, fault),
    };
    let Some(call) = SyscallNumber::from_u32(number) else {
        log::warn!(
            "[syscall] pid={} unknown syscall number {}",
            caller.as_u32(),
            number
        );
        lifecycle::exit(kernel, caller, KILLED_STATUS);
        return Flow::Exit(KILLED_STATUS);
    };

    #[cfg(feature = "syscall-trace")]
    log::trace!(
        "[syscall] pid={} {} esp={:#x}",
        caller.as_u32(),
        call.name(),
        frame.esp
    );

    let result = match call {
        SyscallNumber::Halt => {
            log::debug!("[syscall] pid={} halt", caller.as_u32());
            kernel.power().shutdown();
            return Flow::Shutdown;
        }
        SyscallNumber::Exit => {
            return match args.next_i32(&access) {
                Ok(status) => {
                    lifecycle::exit(kernel, caller, status);
                    Flow::Exit(status)
                }
                Err(fault) => faulted(kernel, caller, fault),
            };
        }
        SyscallNumber::Exec => sys_exec(kernel, caller, &mut args, &access).map(Some),
        SyscallNumber::Wait => sys_wait(kernel, caller, &mut args, &access).map(Some),
        SyscallNumber::Create => sys_create(kernel, &mut args, &access).map(Some),
        SyscallNumber::Remove => sys_remove(kernel, &mut args, &access).map(Some),
        SyscallNumber::Open => sys_open(kernel, caller, &mut args, &access).map(Some),
        SyscallNumber::Filesize => sys_filesize(kernel, caller, &mut args, &access).map(Some),
        SyscallNumber::Read => sys_read(kernel, caller, &mut args, &mut access).map(Some),
        SyscallNumber::Write => sys_write(kernel, caller, &mut args, &mut access).map(Some),
        SyscallNumber::Seek => sys_seek(kernel, caller, &mut args, &access).map(|()| None),
        SyscallNumber::Tell => sys_tell(kernel, caller, &mut args, &access).map(Some),
        SyscallNumber::Close => sys_close(kernel, caller, &mut args, &access).map(|()| None),
    };

    match result {
        Ok(Some(value)) => {
            frame.eax = value as u32;
            Flow::Resume
        }
        Ok(None) => Flow::Resume,
        Err(fault) => faulted(kernel, caller, fault),
    }
}

/// Escalation path for class-1 violations: kill the caller, never return an
/// error value.
fn faulted(kernel: &Kernel, caller: Pid, fault: Fault) -> Flow {
    lifecycle::kill(kernel, caller, fault);
    Flow::Exit(KILLED_STATUS)
}

/// Clones the open file behind a handle, holding the process-table lock
/// only for the lookup. Returns `None` for reserved and unknown handles.
fn lookup(kernel: &Kernel, caller: Pid, handle: Handle) -> Option<Arc<dyn OpenFile>> {
    let table = kernel.processes().lock();
    table.get(caller)?.fds().get(handle).map(Arc::clone)
}

fn sys_exec(
    kernel: &Kernel,
    caller: Pid,
    args: &mut UserArgs,
    access: &UserAccess<'_>,
) -> Result<i32, Fault> {
    let line_ptr = args.next_ptr(access)?;
    let Some(command_line) = access.read_str(line_ptr, MAX_CMDLINE_LEN)? else {
        return Ok(-1);
    };
    Ok(lifecycle::exec(kernel, caller, &command_line))
}

fn sys_wait(
    kernel: &Kernel,
    caller: Pid,
    args: &mut UserArgs,
    access: &UserAccess<'_>,
) -> Result<i32, Fault> {
    let pid = args.next_u32(access)?;
    Ok(lifecycle::wait(kernel, caller, Pid::new(pid)))
}

fn sys_create(
    kernel: &Kernel,
    args: &mut UserArgs,
    access: &UserAccess<'_>,
) -> Result<i32, Fault> {
    let name_ptr = args.next_ptr(access)?;
    let initial_size = args.next_u32(access)?;
    let Some(name) = access.read_str(name_ptr, MAX_PATH_LEN)? else {
        return Ok(0);
    };
    let created = kernel.files().lock().backend.create(&name, initial_size);
    Ok(i32::from(created))
}

fn sys_remove(
    kernel: &Kernel,
    args: &mut UserArgs,
    access: &UserAccess<'_>,
) -> Result<i32, Fault> {
    let name_ptr = args.next_ptr(access)?;
    let Some(name) = access.read_str(name_ptr, MAX_PATH_LEN)? else {
        return Ok(0);
    };
    let removed = kernel.files().lock().backend.remove(&name);
    Ok(i32::from(removed))
}

fn sys_open(
    kernel: &Kernel,
    caller: Pid,
    args: &mut UserArgs,
    access: &UserAccess<'_>,
) -> Result<i32, Fault> {
    let name_ptr = args.next_ptr(access)?;
    let Some(name) = access.read_str(name_ptr, MAX_PATH_LEN)? else {
        return Ok(-1);
    };
    // Content op first, under the file lock; then the table insertion with
    // the file lock released. The two locks are never held together.
    let Some(file) = kernel.files().lock().backend.open(&name) else {
        return Ok(-1);
    };
    let mut table = kernel.processes().lock();
    let Some(process) = table.get_mut(caller) else {
        return Ok(-1);
    };
    Ok(process.fds_mut().insert(file) as i32)
}

fn sys_filesize(
    kernel: &Kernel,
    caller: Pid,
    args: &mut UserArgs,
    access: &UserAccess<'_>,
) -> Result<i32, Fault> {
    let handle = args.next_u32(access)?;
    // Unknown handles report 0: the ABI has no distinct sentinel here.
    let Some(file) = lookup(kernel, caller, handle) else {
        return Ok(0);
    };
    let _files = kernel.files().lock();
    Ok(file.length() as i32)
}

fn sys_read(
    kernel: &Kernel,
    caller: Pid,
    args: &mut UserArgs,
    access: &mut UserAccess<'_>,
) -> Result<i32, Fault> {
    let handle = args.next_u32(access)?;
    let buf = args.next_ptr(access)?;
    let size = args.next_u32(access)?;

    if handle == STDOUT_HANDLE {
        return Ok(-1);
    }
    if handle == STDIN_HANDLE {
        // Whole buffer validated before the first byte arrives.
        access.check_writable_range(buf, size)?;
        for offset in 0..size {
            let byte = kernel.console().read_byte();
            access.write_byte(buf.wrapping_add(offset), byte)?;
        }
        return Ok(size as i32);
    }

    let Some(file) = lookup(kernel, caller, handle) else {
        return Ok(-1);
    };
    access.check_writable_range(buf, size)?;

    let _files = kernel.files().lock();
    let mut chunk = vec![0u8; IO_CHUNK];
    let mut total: u32 = 0;
    while total < size {
        let want = core::cmp::min(IO_CHUNK as u32, size - total) as usize;
        let got = file.read(&mut chunk[..want]);
        if got == 0 {
            break;
        }
        access.write_bytes(buf.wrapping_add(total), &chunk[..got])?;
        total += got as u32;
        if got < want {
            break;
        }
    }
    Ok(total as i32)
}

fn sys_write(
    kernel: &Kernel,
    caller: Pid,
    args: &mut UserArgs,
    access: &mut UserAccess<'_>,
) -> Result<i32, Fault> {
    let handle = args.next_u32(access)?;
    let buf = args.next_ptr(access)?;
    let size = args.next_u32(access)?;

    if handle == STDIN_HANDLE {
        return Ok(-1);
    }
    if handle == STDOUT_HANDLE {
        access.check_range(buf, size)?;
        let mut chunk = vec![0u8; IO_CHUNK];
        let mut total: u32 = 0;
        while total < size {
            let step = core::cmp::min(IO_CHUNK as u32, size - total) as usize;
            access.read_bytes(buf.wrapping_add(total), &mut chunk[..step])?;
            kernel.console().put_bytes(&chunk[..step]);
            total += step as u32;
        }
        return Ok(size as i32);
    }

    let Some(file) = lookup(kernel, caller, handle) else {
        return Ok(-1);
    };
    access.check_range(buf, size)?;

    let _files = kernel.files().lock();
    let mut chunk = vec![0u8; IO_CHUNK];
    let mut total: u32 = 0;
    while total < size {
        let step = core::cmp::min(IO_CHUNK as u32, size - total) as usize;
        access.read_bytes(buf.wrapping_add(total), &mut chunk[..step])?;
        let written = file.write(&chunk[..step]);
        total += written as u32;
        if written < step {
            break;
        }
    }
    Ok(total as i32)
}

fn sys_seek(
    kernel: &Kernel,
    caller: Pid,
    args: &mut UserArgs,
    access: &UserAccess<'_>,
) -> Result<(), Fault> {
    let handle = args.next_u32(access)?;
    let position = args.next_u32(access)?;
    // Unknown handles: silent no-op.
    if let Some(file) = lookup(kernel, caller, handle) {
        let _files = kernel.files().lock();
        file.seek(position);
    }
    Ok(())
}

fn sys_tell(
    kernel: &Kernel,
    caller: Pid,
    args: &mut UserArgs,
    access: &UserAccess<'_>,
) -> Result<i32, Fault> {
    let handle = args.next_u32(access)?;
    let Some(file) = lookup(kernel, caller, handle) else {
        return Ok(0);
    };
    let _files = kernel.files().lock();
    Ok(file.tell() as i32)
}

fn sys_close(
    kernel: &Kernel,
    caller: Pid,
    args: &mut UserArgs,
    access: &UserAccess<'_>,
) -> Result<(), Fault> {
    let handle = args.next_u32(access)?;
    // The reserved console handles cannot be closed; unknown handles are a
    // silent no-op.
    if handle < FIRST_FILE_HANDLE {
        return Ok(());
    }
    let removed = {
        let mut table = kernel.processes().lock();
        table
            .get_mut(caller)
            .and_then(|process| process.fds_mut().remove(handle))
    };
    if let Some(file) = removed {
        let _files = kernel.files().lock();
        file.close();
    }
    Ok(())
}
