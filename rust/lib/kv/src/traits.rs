use crate::error::KVError;

/// KVStore is a flat string-keyed byte store.
///
/// Keys are plain names (`token`, `user`) or namespaced by an identity
/// (`theme_preferences_{id}`). Writes overwrite; deletes of missing keys
/// are not errors.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key.
    fn delete(&self, key: &str) -> Result<(), KVError>;

    /// Delete several keys in one transaction.
    fn batch_delete(&self, keys: &[&str]) -> Result<(), KVError> {
        for key in keys {
            self.delete(key)?;
        }
        Ok(())
    }
}
