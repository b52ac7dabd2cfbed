// libuser/src/syscall.rs
//! Low-level system call interface.
//!
//! The kernel reads the syscall number from the word the user stack pointer
//! names and the arguments from the words above it, and leaves any return
//! value in the accumulator. The stubs here therefore push the arguments
//! (rightmost first), push the number, raise the trap vector, and pop the
//! words again afterwards.
//!
//! The trap instruction only exists on the x86 target the kernel runs on;
//! on any other architecture the raw stubs are inert stand-ins that report
//! failure, so the workspace still builds and tests on a development host.

use core::ffi::CStr;

use minnow_os_abi::SyscallNumber;

#[cfg(target_arch = "x86")]
unsafe fn trap0(number: u32) -> u32 {
    let ret: u32;
    unsafe {
        core::arch::asm!(
            "push {number}",
            "int 0x30",
            "add esp, 4",
            number = in(reg) number,
            out("eax") ret,
        );
    }
    ret
}

#[cfg(target_arch = "x86")]
unsafe fn trap1(number: u32, arg0: u32) -> u32 {
    let ret: u32;
    unsafe {
        core::arch::asm!(
            "push {arg0}",
            "push {number}",
            "int 0x30",
            "add esp, 8",
            number = in(reg) number,
            arg0 = in(reg) arg0,
            out("eax") ret,
        );
    }
    ret
}

#[cfg(target_arch = "x86")]
unsafe fn trap2(number: u32, arg0: u32, arg1: u32) -> u32 {
    let ret: u32;
    unsafe {
        core::arch::asm!(
            "push {arg1}",
            "push {arg0}",
            "push {number}",
            "int 0x30",
            "add esp, 12",
            number = in(reg) number,
            arg0 = in(reg) arg0,
            arg1 = in(reg) arg1,
            out("eax") ret,
        );
    }
    ret
}

#[cfg(target_arch = "x86")]
unsafe fn trap3(number: u32, arg0: u32, arg1: u32, arg2: u32) -> u32 {
    let ret: u32;
    unsafe {
        core::arch::asm!(
            "push {arg2}",
            "push {arg1}",
            "push {arg0}",
            "push {number}",
            "int 0x30",
            "add esp, 16",
            number = in(reg) number,
            arg0 = in(reg) arg0,
            arg1 = in(reg) arg1,
            arg2 = in(reg) arg2,
            out("eax") ret,
        );
    }
    ret
}

// Host stand-ins: no trap vector to raise, report failure.

#[cfg(not(target_arch = "x86"))]
unsafe fn trap0(_number: u32) -> u32 {
    u32::MAX
}

#[cfg(not(target_arch = "x86"))]
unsafe fn trap1(_number: u32, _arg0: u32) -> u32 {
    u32::MAX
}

#[cfg(not(target_arch = "x86"))]
unsafe fn trap2(_number: u32, _arg0: u32, _arg1: u32) -> u32 {
    u32::MAX
}

#[cfg(not(target_arch = "x86"))]
unsafe fn trap3(_number: u32, _arg0: u32, _arg1: u32, _arg2: u32) -> u32 {
    u32::MAX
}

fn str_arg(s: &CStr) -> u32 {
    s.as_ptr() as usize as u32
}

/// Powers the machine off. Does not return on the real target.
pub fn halt() -> ! {
    unsafe {
        trap0(SyscallNumber::Halt as u32);
    }
    loop {
        core::hint::spin_loop();
    }
}

/// Terminates the calling process with `status`. Does not return on the
/// real target.
pub fn exit(status: i32) -> ! {
    unsafe {
        trap1(SyscallNumber::Exit as u32, status as u32);
    }
    loop {
        core::hint::spin_loop();
    }
}

/// Spawns a child process from a command line; returns its pid or -1.
#[must_use]
pub fn exec(command_line: &CStr) -> i32 {
    unsafe { trap1(SyscallNumber::Exec as u32, str_arg(command_line)) as i32 }
}

/// Blocks for a direct child's termination; returns its exit status or -1.
#[must_use]
pub fn wait(pid: u32) -> i32 {
    unsafe { trap1(SyscallNumber::Wait as u32, pid) as i32 }
}

/// Creates an empty file of `initial_size` bytes.
#[must_use]
pub fn create(name: &CStr, initial_size: u32) -> bool {
    unsafe { trap2(SyscallNumber::Create as u32, str_arg(name), initial_size) != 0 }
}

/// Deletes a file by name.
#[must_use]
pub fn remove(name: &CStr) -> bool {
    unsafe { trap1(SyscallNumber::Remove as u32, str_arg(name)) != 0 }
}

/// Opens a file by name; returns a handle or -1.
#[must_use]
pub fn open(name: &CStr) -> i32 {
    unsafe { trap1(SyscallNumber::Open as u32, str_arg(name)) as i32 }
}

/// Byte length of an open file, or 0 for an unknown handle.
#[must_use]
pub fn filesize(handle: u32) -> i32 {
    unsafe { trap1(SyscallNumber::Filesize as u32, handle) as i32 }
}

/// Reads into `buf`; returns bytes read or -1. Handle 0 reads the console.
#[must_use]
pub fn read(handle: u32, buf: &mut [u8]) -> i32 {
    unsafe {
        trap3(
            SyscallNumber::Read as u32,
            handle,
            buf.as_mut_ptr() as usize as u32,
            buf.len() as u32,
        ) as i32
    }
}

/// Writes from `buf`; returns bytes written or -1. Handle 1 writes the
/// console.
#[must_use]
pub fn write(handle: u32, buf: &[u8]) -> i32 {
    unsafe {
        trap3(
            SyscallNumber::Write as u32,
            handle,
            buf.as_ptr() as usize as u32,
            buf.len() as u32,
        ) as i32
    }
}

/// Moves an open file's cursor to an absolute offset.
pub fn seek(handle: u32, position: u32) {
    unsafe {
        trap2(SyscallNumber::Seek as u32, handle, position);
    }
}

/// Current cursor position, or 0 for an unknown handle.
#[must_use]
pub fn tell(handle: u32) -> u32 {
    unsafe { trap1(SyscallNumber::Tell as u32, handle) }
}

/// Closes a handle. The reserved console handles cannot be closed.
pub fn close(handle: u32) {
    unsafe {
        trap1(SyscallNumber::Close as u32, handle);
    }
}
