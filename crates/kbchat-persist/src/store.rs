use async_trait::async_trait;

use crate::error::Result;

/// Flat string key/value space backing the local history
///
/// Implementations provide device-local storage; every write is independent,
/// there is no multi-key transaction.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Create or replace a value
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}
