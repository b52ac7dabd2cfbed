// kernel/src/kernel/mod.rs
//! Kernel subsystems and the [`Kernel`] aggregate that wires them together.

pub mod core;
pub mod fs;
pub mod process;
pub mod security;
pub mod sync;
pub mod syscall;

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use spin::Mutex;

use self::core::traits::{AddressSpace, Console, FileSystem, PowerControl, ProgramLoader};
use self::core::types::Pid;
use self::fs::FileContext;
use self::process::{Process, ProcessTable};
use self::syscall::{Flow, TrapFrame};

/// The syscall core: collaborator handles plus the state the boundary owns.
///
/// One `Kernel` exists per machine. It is shared across every kernel thread
/// that enters the boundary, so all of its state sits behind locks:
///
/// - `processes` guards the process table (descriptors, fd tables, child
///   tracking). Per-process data has no lock of its own; the table lock is
///   the one the scheduler already imposes.
/// - `files` is the single global file lock. Every operation that touches
///   file content (open, read, write, close, the write-protection map)
///   runs under it, serializing file-content operations machine-wide.
///
/// The locks are never held across a blocking point: `wait` releases the
/// table lock before sleeping on the child's semaphore.
pub struct Kernel {
    processes: Mutex<ProcessTable>,
    files: Mutex<FileContext>,
    console: Arc<dyn Console>,
    loader: Arc<dyn ProgramLoader>,
    power: Arc<dyn PowerControl>,
}

impl Kernel {
    /// Wires the boundary to its collaborators.
    #[must_use]
    pub fn new(
        filesystem: Box<dyn FileSystem>,
        console: Arc<dyn Console>,
        loader: Arc<dyn ProgramLoader>,
        power: Arc<dyn PowerControl>,
    ) -> Self {
        Self {
            processes: Mutex::new(ProcessTable::new()),
            files: Mutex::new(FileContext::new(filesystem)),
            console,
            loader,
            power,
        }
    }

    /// Registers the first user process, which has no parent.
    ///
    /// Children of that process are created through the `exec` syscall;
    /// this is only for the process the boot path starts directly.
    pub fn spawn_initial(&self, name: &str) -> Pid {
        let mut table = self.processes.lock();
        let pid = table.allocate_pid();
        table.add(Process::new(pid, name.to_string(), None));
        log::debug!("[process] initial process {} pid={}", name, pid.as_u32());
        pid
    }

    /// Entry point for the external trap glue.
    ///
    /// `caller` is the process the trap came from, `frame` its saved trap
    /// frame and `aspace` its active page mapping. The glue must act on the
    /// returned [`Flow`]: resume user mode, reap the terminated thread, or
    /// stop scheduling after a shutdown.
    pub fn handle_trap(
        &self,
        caller: Pid,
        frame: &mut TrapFrame,
        aspace: &mut dyn AddressSpace,
    ) -> Flow {
        syscall::dispatch(self, caller, frame, aspace)
    }

    pub(crate) fn processes(&self) -> &Mutex<ProcessTable> {
        &self.processes
    }

    pub(crate) fn files(&self) -> &Mutex<FileContext> {
        &self.files
    }

    pub(crate) fn console(&self) -> &dyn Console {
        &*self.console
    }

    pub(crate) fn loader(&self) -> &dyn ProgramLoader {
        &*self.loader
    }

    pub(crate) fn power(&self) -> &dyn PowerControl {
        &*self.power
    }
}
