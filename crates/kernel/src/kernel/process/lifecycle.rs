// kernel/src/kernel/process/lifecycle.rs
//! Process lifecycle transitions: spawn, exit, wait.
//!
//! These functions implement the running, exiting, reaped state machine
//! and the exactly-once exit-status delivery contract. Locking discipline:
//! the process-table lock and the global file lock are never held at the
//! same time, and neither is ever held across the blocking point in
//! [`wait`].

use alloc::string::ToString;

use minnow_os_abi::KILLED_STATUS;

use crate::kernel::Kernel;
use crate::kernel::core::types::Pid;
use crate::kernel::process::Process;
use crate::kernel::security::Fault;

/// Spawns a child process from a command line.
///
/// The program name is the first whitespace-separated token; the rest of
/// the line travels to the loader for argument passing. The child's
/// executable image is claimed for deny-write before the child can run and
/// stays claimed until it exits. Returns the new pid, or -1 if the program
/// does not exist or the loader refuses to start it.
pub fn exec(kernel: &Kernel, caller: Pid, command_line: &str) -> i32 {
    let Some(program) = command_line.split_whitespace().next() else {
        return -1;
    };

    let Some(image) = kernel.loader().open_executable(program) else {
        log::debug!("[process] exec: no executable {:?}", program);
        return -1;
    };

    {
        let mut files = kernel.files().lock();
        files.protect.claim(&image);
    }

    let pid = {
        let mut table = kernel.processes().lock();
        let pid = table.allocate_pid();
        let mut child = Process::new(pid, program.to_string(), Some(caller));
        child.set_exec_image(image);
        let slot = child.exit_slot();
        if let Some(parent) = table.get_mut(caller) {
            parent.register_child(pid, slot);
        }
        table.add(child);
        pid
    };

    if !kernel.loader().start(pid, command_line) {
        // Roll the child back: nothing ran, nothing may remain claimed.
        let image = {
            let mut table = kernel.processes().lock();
            if let Some(parent) = table.get_mut(caller) {
                parent.take_child(pid);
            }
            table.remove(pid).and_then(|mut child| child.take_exec_image())
        };
        if let Some(image) = image {
            let mut files = kernel.files().lock();
            files.protect.release(image.id());
        }
        log::debug!("[process] exec: loader refused {:?}", command_line);
        return -1;
    }

    log::debug!("[process] exec {:?} -> pid={}", program, pid.as_u32());
    pid.as_u32() as i32
}

/// The exiting transition.
///
/// Detaches the descriptor, prints the standardized termination line,
/// closes every open handle, releases the executable's deny-write claim,
/// and finally records the status into the child-tracking slot and wakes
/// the parent, in that order, so the parent can never observe a child
/// that still holds files open.
pub fn exit(kernel: &Kernel, caller: Pid, status: i32) {
    let Some(mut process) = kernel.processes().lock().remove(caller) else {
        return;
    };

    // Byte-exact format; external test harnesses match on it.
    let line = alloc::format!("{}: exit({})\n", process.name(), status);
    kernel.console().put_bytes(line.as_bytes());

    {
        let mut files = kernel.files().lock();
        for file in process.fds_mut().drain() {
            file.close();
        }
        if let Some(image) = process.take_exec_image() {
            files.protect.release(image.id());
        }
    }

    log::debug!(
        "[process] pid={} exiting with status {}",
        caller.as_u32(),
        status
    );
    process.exit_slot().complete(status);
}

/// Forced termination for a protocol violation.
///
/// The offending access is logged and the process is taken through the
/// normal exiting transition with the killed status; user code never sees
/// an error return.
pub fn kill(kernel: &Kernel, caller: Pid, fault: Fault) {
    log::warn!(
        "[process] pid={} killed: user-memory fault {:?}",
        caller.as_u32(),
        fault
    );
    exit(kernel, caller, KILLED_STATUS);
}

/// Blocks for a specific child's termination and reaps it.
///
/// Fails with -1 when `target` is not a direct, unreaped child of the
/// caller, or when the caller already has a wait outstanding. Otherwise
/// blocks until the child's exiting transition has recorded a status,
/// consumes it exactly once (a second `wait` on the same pid fails) and
/// returns it.
pub fn wait(kernel: &Kernel, caller: Pid, target: Pid) -> i32 {
    let slot = {
        let mut table = kernel.processes().lock();
        let Some(process) = table.get_mut(caller) else {
            return -1;
        };
        if process.waiting_on().is_some() {
            return -1;
        }
        let Some(slot) = process.child_slot(target) else {
            return -1;
        };
        process.set_waiting(target);
        slot
    };

    // Block with no locks held; only the child's completion can wake us.
    let status = slot.wait();

    let mut table = kernel.processes().lock();
    if let Some(process) = table.get_mut(caller) {
        process.take_child(target);
        process.clear_waiting();
    }
    log::debug!(
        "[process] pid={} reaped pid={} status={}",
        caller.as_u32(),
        target.as_u32(),
        status
    );
    status
}
