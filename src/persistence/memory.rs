//! In-memory storage

use rustc_hash::FxHashMap;

use super::{CartStorage, StorageError};

/// Storage that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: FxHashMap<String, String>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with a pre-filled slot.
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut storage = Self::new();
        storage.slots.insert(key.into(), value.into());

        storage
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn write_then_read() -> TestResult {
        let mut storage = MemoryStorage::new();

        storage.write("cart", "{}")?;

        assert_eq!(storage.read("cart")?.as_deref(), Some("{}"));
        assert_eq!(storage.read("other")?, None);

        Ok(())
    }
}
