use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::KVError;
use crate::traits::KVStore;

/// MemoryStore keeps entries in an in-process `BTreeMap`.
///
/// With a quota set, a write that would push the total size of keys plus
/// values past the quota fails with `KVError::QuotaExceeded` and leaves
/// the store unchanged.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes beyond `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            quota: Some(quota),
        }
    }

    /// Total bytes currently held (keys plus values).
    pub fn used_bytes(&self) -> usize {
        let entries = self.entries.read().unwrap();
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let mut entries = self.entries.write().unwrap();
        if let Some(quota) = self.quota {
            let current: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let used = current + key.len() + value.len();
            if used > quota {
                return Err(KVError::QuotaExceeded { used, quota });
            }
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), KVError> {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key);
        Ok(())
    }

    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError> {
        let mut entries = self.entries.write().unwrap();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites() {
        let store = MemoryStore::new();
        store.set("token", b"one").unwrap();
        store.set("token", b"two").unwrap();
        assert_eq!(store.get("token").unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(16);
        store.set("token", b"abc").unwrap(); // 8 bytes

        let err = store.set("user", b"0123456789").unwrap_err();
        assert!(matches!(err, KVError::QuotaExceeded { used: 22, quota: 16 }));
        assert!(store.get("user").unwrap().is_none());
        assert_eq!(store.used_bytes(), 8);
    }

    #[test]
    fn quota_counts_replacement_not_sum() {
        let store = MemoryStore::with_quota(10);
        store.set("token", b"abcde").unwrap(); // 10 bytes, at the limit
        store.set("token", b"vwxyz").unwrap(); // replacing keeps it at 10
        assert_eq!(store.used_bytes(), 10);
    }

    #[test]
    fn batch_delete_ignores_missing() {
        let store = MemoryStore::new();
        store.set("token", b"t").unwrap();
        store.batch_delete(&["token", "user"]).unwrap();
        assert!(store.is_empty());
    }
}
