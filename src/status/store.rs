use std::collections::HashMap;
use std::sync::Mutex;

use super::{RequestIdentity, RequestState};

/// Backing store for the status cache
pub trait StatusStore: Send + Sync {
    fn load(&self, identity: &RequestIdentity) -> Option<RequestState>;

    fn save(&self, identity: &RequestIdentity, state: RequestState);

    /// Apply `apply` to the current state (defaults when absent) and store
    /// the result as one atomic step. Returns the state before the change.
    fn update(
        &self,
        identity: &RequestIdentity,
        apply: &mut dyn FnMut(&mut RequestState),
    ) -> RequestState;

    /// Number of tracked identities
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store; lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    entries: Mutex<HashMap<RequestIdentity, RequestState>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusStore for MemoryStatusStore {
    fn load(&self, identity: &RequestIdentity) -> Option<RequestState> {
        // A poisoned lock still holds consistent Copy values.
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(identity).copied()
    }

    fn save(&self, identity: &RequestIdentity, state: RequestState) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(identity.clone(), state);
    }

    fn update(
        &self,
        identity: &RequestIdentity,
        apply: &mut dyn FnMut(&mut RequestState),
    ) -> RequestState {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let state = entries.entry(identity.clone()).or_default();
        let previous = *state;
        apply(state);
        previous
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing() {
        let store = MemoryStatusStore::new();
        assert!(store.load(&RequestIdentity::new("k", "g", "q")).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_overwrites() {
        let store = MemoryStatusStore::new();
        let id = RequestIdentity::new("k", "g", "q");

        store.save(&id, RequestState { loaded: true, failed: false, offset: 5 });
        store.save(&id, RequestState { loaded: false, failed: true, offset: 9 });

        let state = store.load(&id).unwrap();
        assert!(state.failed);
        assert!(!state.loaded);
        assert_eq!(state.offset, 9);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_returns_previous_state() {
        let store = MemoryStatusStore::new();
        let id = RequestIdentity::new("k", "g", "q");

        let before = store.update(&id, &mut |state: &mut RequestState| state.offset += 10);
        assert_eq!(before, RequestState::default());

        let before = store.update(&id, &mut |state: &mut RequestState| state.offset += 10);
        assert_eq!(before.offset, 10);
        assert_eq!(store.load(&id).unwrap().offset, 20);
    }
}
