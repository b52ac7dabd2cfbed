// kernel/src/kernel/fs/write_protect.rs
//! Deny-write-on-exec tracking.
//!
//! While a file backs a running program it must not be modified out from
//! under the executing process. The tracker keys claims by file identity and
//! reference-counts them: the first executor of a file asserts the
//! collaborator's deny-write flag, further executors of the same file only
//! bump the count, and the flag is released when the last executor exits.
//! Two different executables can therefore be protected at the same time.
//!
//! Writes to a protected file are refused by the collaborator's own
//! deny-write check (its `write` reports 0 bytes), so the write path never
//! consults this map. Claims are only taken in `exec` and only released in
//! the exit path, and both run under the global file lock.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;

use crate::kernel::core::traits::OpenFile;
use crate::kernel::core::types::FileId;

struct Claim {
    file: Arc<dyn OpenFile>,
    executors: usize,
}

/// Global map of deny-write claims, keyed by file identity.
pub struct WriteProtect {
    claims: BTreeMap<FileId, Claim>,
}

impl WriteProtect {
    /// An empty map: nothing is protected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            claims: BTreeMap::new(),
        }
    }

    /// Registers one more executor of `file`, asserting deny-write on the
    /// transition from zero claims.
    pub fn claim(&mut self, file: &Arc<dyn OpenFile>) {
        let id = file.id();
        if let Some(claim) = self.claims.get_mut(&id) {
            claim.executors += 1;
            return;
        }
        file.deny_write();
        self.claims.insert(
            id,
            Claim {
                file: Arc::clone(file),
                executors: 1,
            },
        );
        log::debug!("[fs] deny-write asserted on file {}", id.as_u64());
    }

    /// Drops one executor of the file, releasing deny-write when the count
    /// returns to zero.
    pub fn release(&mut self, id: FileId) {
        let Some(claim) = self.claims.get_mut(&id) else {
            return;
        };
        claim.executors -= 1;
        if claim.executors == 0 {
            claim.file.allow_write();
            self.claims.remove(&id);
            log::debug!("[fs] deny-write released on file {}", id.as_u64());
        }
    }

    /// Whether any executor currently protects the file.
    #[must_use]
    pub fn is_protected(&self, id: FileId) -> bool {
        self.claims.contains_key(&id)
    }
}

impl Default for WriteProtect {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingFile {
        id: u64,
        denies: AtomicUsize,
        allows: AtomicUsize,
    }

    impl OpenFile for CountingFile {
        fn id(&self) -> FileId {
            FileId::new(self.id)
        }
        fn length(&self) -> u32 {
            0
        }
        fn read(&self, _buf: &mut [u8]) -> usize {
            0
        }
        fn write(&self, _buf: &[u8]) -> usize {
            0
        }
        fn seek(&self, _position: u32) {}
        fn tell(&self) -> u32 {
            0
        }
        fn deny_write(&self) {
            self.denies.fetch_add(1, Ordering::Relaxed);
        }
        fn allow_write(&self) {
            self.allows.fetch_add(1, Ordering::Relaxed);
        }
        fn close(&self) {}
    }

    #[test]
    fn deny_asserted_once_per_file() {
        let file = Arc::new(CountingFile { id: 7, ..Default::default() });
        let as_open: Arc<dyn OpenFile> = file.clone();
        let mut protect = WriteProtect::new();

        protect.claim(&as_open);
        protect.claim(&as_open);
        assert_eq!(file.denies.load(Ordering::Relaxed), 1);
        assert!(protect.is_protected(FileId::new(7)));

        protect.release(FileId::new(7));
        assert_eq!(file.allows.load(Ordering::Relaxed), 0, "still one executor");
        protect.release(FileId::new(7));
        assert_eq!(file.allows.load(Ordering::Relaxed), 1);
        assert!(!protect.is_protected(FileId::new(7)));
    }

    #[test]
    fn distinct_files_are_protected_independently() {
        let a = Arc::new(CountingFile { id: 1, ..Default::default() });
        let b = Arc::new(CountingFile { id: 2, ..Default::default() });
        let mut protect = WriteProtect::new();

        let open_a: Arc<dyn OpenFile> = a.clone();
        let open_b: Arc<dyn OpenFile> = b.clone();
        protect.claim(&open_a);
        protect.claim(&open_b);
        assert!(protect.is_protected(FileId::new(1)));
        assert!(protect.is_protected(FileId::new(2)));

        protect.release(FileId::new(1));
        assert!(!protect.is_protected(FileId::new(1)));
        assert!(protect.is_protected(FileId::new(2)));
        assert_eq!(b.allows.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn releasing_an_unclaimed_file_is_a_no_op() {
        let mut protect = WriteProtect::new();
        protect.release(FileId::new(42));
        assert!(!protect.is_protected(FileId::new(42)));
    }
}
