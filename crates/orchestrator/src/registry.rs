use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use uuid::Uuid;

/// Per-run entry: holds the lock that serializes mutating operations.
pub struct RunEntry {
    id: Uuid,
    gate: Mutex<()>,
}

impl RunEntry {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            gate: Mutex::new(()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Acquire the run's write gate. At most one mutating operation per run
    /// holds this at a time; operations on different runs are independent.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}

/// Identity map from run id to its serialization entry.
///
/// Holds no business logic: ids are generated here, everything else about a
/// run lives in the event store. After a process restart entries are
/// recreated lazily via `get_or_insert`; whether the run actually exists is
/// the store's call.
#[derive(Clone, Default)]
pub struct RunRegistry {
    runs: Arc<RwLock<HashMap<Uuid, Arc<RunEntry>>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh run with a collision-free id.
    pub fn create(&self) -> Arc<RunEntry> {
        let entry = Arc::new(RunEntry::new(Uuid::new_v4()));
        self.runs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(entry.id, Arc::clone(&entry));
        entry
    }

    pub fn get(&self, run_id: &Uuid) -> Option<Arc<RunEntry>> {
        self.runs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(run_id)
            .cloned()
    }

    pub fn get_or_insert(&self, run_id: Uuid) -> Arc<RunEntry> {
        if let Some(entry) = self.get(&run_id) {
            return entry;
        }

        let mut runs = self
            .runs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(entry) = runs.get(&run_id) {
            return Arc::clone(entry);
        }

        let entry = Arc::new(RunEntry::new(run_id));
        runs.insert(run_id, Arc::clone(&entry));
        entry
    }

    pub fn len(&self) -> usize {
        self.runs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_generates_distinct_ids() {
        let registry = RunRegistry::new();
        let a = registry.create();
        let b = registry.create();

        assert_ne!(a.id(), b.id());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_get_or_insert_is_idempotent() {
        let registry = RunRegistry::new();
        let run_id = Uuid::new_v4();

        let first = registry.get_or_insert(run_id);
        let second = registry.get_or_insert(run_id);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_gate_serializes_same_run() {
        let registry = RunRegistry::new();
        let entry = registry.create();

        let guard = entry.lock().await;
        assert!(entry.gate.try_lock().is_err());
        drop(guard);
        assert!(entry.gate.try_lock().is_ok());
    }
}
