use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::CartStorage;
use crate::error::StorageError;

/// In-memory key-value storage.
///
/// Intended for tests/dev. `fail_writes(true)` makes every write fail so the
/// persist-failure path of the store can be exercised.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    items: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Synchronous read, for assertions.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.items.read().ok()?.get(key).cloned()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CartStorage for InMemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self
            .items
            .read()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut items = self
            .items
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut items = self
            .items
            .write()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let storage = InMemoryStorage::new();
        storage.set_item("k", "v1").await.unwrap();
        storage.set_item("k", "v2").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("v2"));

        storage.remove_item("k").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn failing_writes_leave_contents_untouched() {
        let storage = InMemoryStorage::new();
        storage.set_item("k", "v1").await.unwrap();
        storage.fail_writes(true);

        assert!(matches!(
            storage.set_item("k", "v2").await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(storage.remove_item("k").await.is_err());
        assert_eq!(storage.peek("k").as_deref(), Some("v1"));

        storage.fail_writes(false);
        storage.set_item("k", "v2").await.unwrap();
        assert_eq!(storage.peek("k").as_deref(), Some("v2"));
    }
}
