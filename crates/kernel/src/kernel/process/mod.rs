// kernel/src/kernel/process/mod.rs
//! Process descriptors and parent/child bookkeeping.
//!
//! A process moves through three states: *running* (it has a descriptor in
//! the [`ProcessTable`]), *exiting* (the descriptor is gone and its exit
//! status has been recorded in the [`ExitSlot`] its parent holds), and
//! *reaped* (the parent's `wait` consumed the slot and removed it from its
//! child map). The transitions live in [`lifecycle`]; this module owns the
//! data.

pub mod lifecycle;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;

use minnow_os_abi::KILLED_STATUS;
use spin::Once;

use crate::kernel::core::traits::OpenFile;
use crate::kernel::core::types::Pid;
use crate::kernel::fs::FdTable;
use crate::kernel::sync::Semaphore;

/// Child-tracking entry: a single-writer, single-reader result cell plus
/// the notification primitive that wakes the waiting parent.
///
/// Created when the child is spawned and shared between the child (which
/// completes it exactly once, at termination) and the parent (which consumes
/// it exactly once, in `wait`). The status is written before the semaphore
/// is raised; that ordering is the only happens-before edge between the two
/// processes.
pub struct ExitSlot {
    status: Once<i32>,
    signalled: Semaphore,
}

impl ExitSlot {
    /// A fresh, unsignalled slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: Once::new(),
            signalled: Semaphore::new(0),
        }
    }

    /// Records the child's exit status and wakes the parent. The first call
    /// wins; the status cell is written at most once.
    pub fn complete(&self, status: i32) {
        self.status.call_once(|| status);
        self.signalled.up();
    }

    /// Blocks until the child has completed the slot, then reads the status.
    pub fn wait(&self) -> i32 {
        self.signalled.down();
        self.status.get().copied().unwrap_or(KILLED_STATUS)
    }

    /// Non-blocking view of the recorded status, if any.
    #[must_use]
    pub fn status(&self) -> Option<i32> {
        self.status.get().copied()
    }
}

impl Default for ExitSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor of one running process.
///
/// Owned by the process table. The parent link is a plain pid, never an
/// owning reference, since the parent may exit first. `children` maps each
/// spawned child to the slot it will complete; `waiting_on` enforces the
/// at-most-one-outstanding-wait rule.
pub struct Process {
    pid: Pid,
    name: String,
    parent: Option<Pid>,
    fds: FdTable,
    children: BTreeMap<Pid, Arc<ExitSlot>>,
    waiting_on: Option<Pid>,
    exit_slot: Arc<ExitSlot>,
    exec_image: Option<Arc<dyn OpenFile>>,
}

impl Process {
    /// A fresh descriptor with an empty descriptor table and a fresh exit
    /// slot (shared with the parent by whoever spawns the process).
    #[must_use]
    pub fn new(pid: Pid, name: String, parent: Option<Pid>) -> Self {
        Self {
            pid,
            name,
            parent,
            fds: FdTable::new(),
            children: BTreeMap::new(),
            waiting_on: None,
            exit_slot: Arc::new(ExitSlot::new()),
            exec_image: None,
        }
    }

    /// Process id.
    #[must_use]
    pub const fn pid(&self) -> Pid {
        self.pid
    }

    /// Process name, as printed in the termination line.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent pid, if the process has one.
    #[must_use]
    pub const fn parent(&self) -> Option<Pid> {
        self.parent
    }

    /// The process's file-descriptor table.
    #[must_use]
    pub const fn fds(&self) -> &FdTable {
        &self.fds
    }

    /// Mutable access to the descriptor table.
    pub fn fds_mut(&mut self) -> &mut FdTable {
        &mut self.fds
    }

    /// The slot this process completes when it terminates.
    #[must_use]
    pub fn exit_slot(&self) -> Arc<ExitSlot> {
        Arc::clone(&self.exit_slot)
    }

    /// Registers a spawned child and the slot it will complete.
    pub fn register_child(&mut self, child: Pid, slot: Arc<ExitSlot>) {
        self.children.insert(child, slot);
    }

    /// The slot for a direct, not-yet-reaped child.
    #[must_use]
    pub fn child_slot(&self, child: Pid) -> Option<Arc<ExitSlot>> {
        self.children.get(&child).map(Arc::clone)
    }

    /// Consumes a child entry; after this the child is reaped and a second
    /// `wait` on it will fail.
    pub fn take_child(&mut self, child: Pid) -> Option<Arc<ExitSlot>> {
        self.children.remove(&child)
    }

    /// The child this process is currently blocked waiting on, if any.
    #[must_use]
    pub const fn waiting_on(&self) -> Option<Pid> {
        self.waiting_on
    }

    /// Marks the start of a `wait` on `child`.
    pub fn set_waiting(&mut self, child: Pid) {
        self.waiting_on = Some(child);
    }

    /// Clears the outstanding-wait marker.
    pub fn clear_waiting(&mut self) {
        self.waiting_on = None;
    }

    /// Records the executable image this process runs from, claimed for
    /// deny-write until exit.
    pub fn set_exec_image(&mut self, image: Arc<dyn OpenFile>) {
        self.exec_image = Some(image);
    }

    /// Takes the executable image for release at exit.
    pub fn take_exec_image(&mut self) -> Option<Arc<dyn OpenFile>> {
        self.exec_image.take()
    }
}

/// All running processes, keyed by pid.
pub struct ProcessTable {
    processes: alloc::vec::Vec<Process>,
    next_pid: u32,
}

impl ProcessTable {
    /// An empty table. The first allocated pid is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            processes: alloc::vec::Vec::new(),
            next_pid: 1,
        }
    }

    /// Hands out the next pid. Pids only count up.
    pub fn allocate_pid(&mut self) -> Pid {
        let pid = Pid::new(self.next_pid);
        self.next_pid += 1;
        pid
    }

    /// Adds a descriptor to the table.
    pub fn add(&mut self, process: Process) {
        self.processes.push(process);
    }

    /// The descriptor for `pid`, if the process is still running.
    #[must_use]
    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.processes.iter().find(|p| p.pid() == pid)
    }

    /// Mutable descriptor lookup.
    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.processes.iter_mut().find(|p| p.pid() == pid)
    }

    /// Detaches the descriptor for `pid`: the running-to-exiting transition.
    pub fn remove(&mut self, pid: Pid) -> Option<Process> {
        let index = self.processes.iter().position(|p| p.pid() == pid)?;
        Some(self.processes.swap_remove(index))
    }

    /// Number of running processes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Whether no process is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}
