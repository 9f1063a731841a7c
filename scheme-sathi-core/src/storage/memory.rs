//! In-process session store

use super::SessionStore;
use crate::session::SessionRecord;
use parking_lot::Mutex;
use std::sync::Arc;

/// Keeps the saved-sessions list in memory.
///
/// Clones share the same slot, so a test can hand one clone to the manager
/// and inspect what was written through the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Vec<SessionRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `records` already in the slot
    pub fn with_records(records: Vec<SessionRecord>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(records)),
        }
    }

    /// Copy of the slot contents
    pub fn snapshot(&self) -> Vec<SessionRecord> {
        self.load_all()
    }
}

impl SessionStore for MemoryStore {
    fn load_all(&self) -> Vec<SessionRecord> {
        self.slot.lock().clone()
    }

    fn save_all(&self, records: &[SessionRecord]) -> crate::Result<()> {
        *self.slot.lock() = records.to_vec();
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_slot() {
        let store = MemoryStore::new();
        let observer = store.clone();

        store.save_all(&[SessionRecord::new()]).unwrap();
        assert_eq!(observer.snapshot().len(), 1);

        store.save_all(&[]).unwrap();
        assert!(observer.snapshot().is_empty());
    }

    #[test]
    fn test_slot_survives_panicking_writer() {
        let store = MemoryStore::with_records(vec![SessionRecord::new()]);
        let writer = store.clone();

        let result = std::thread::spawn(move || {
            let _guard = writer.slot.lock();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(store.load_all().len(), 1);
        store.save_all(&[]).unwrap();
        assert!(store.snapshot().is_empty());
    }
}
