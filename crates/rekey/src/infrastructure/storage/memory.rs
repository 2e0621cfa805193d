//! In-memory `Scancode Map` store.
//!
//! Stands in for the registry in tests and on platforms without one. It keeps
//! the same absent/present distinction as the real value.

use std::sync::Mutex;

use super::registry::{ScancodeMapStore, StoreError};

/// A [`ScancodeMapStore`] holding the value in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    value: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Creates a store with no value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `bytes`.
    pub fn with_value(bytes: Vec<u8>) -> Self {
        Self {
            value: Mutex::new(Some(bytes)),
        }
    }

    /// The current raw value.
    pub fn value(&self) -> Option<Vec<u8>> {
        self.value.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ScancodeMapStore for MemoryStore {
    fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.value())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), StoreError> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = Some(bytes.to_vec());
        Ok(())
    }

    fn delete(&self) -> Result<bool, StoreError> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_starts_absent() {
        let store = MemoryStore::new();
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn test_memory_store_write_then_read() {
        let store = MemoryStore::new();
        store.write(&[1, 2, 3]).unwrap();
        assert_eq!(store.read().unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_memory_store_delete_reports_existence() {
        let store = MemoryStore::with_value(vec![0; 16]);
        assert!(store.delete().unwrap());
        assert!(!store.delete().unwrap());
        assert_eq!(store.value(), None);
    }
}
