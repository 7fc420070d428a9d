//! Durable key-value storage for the session.
//!
//! - `sqlite`: file-backed store used by the binaries.
//! - `memory`: process-local store with the same contract.

mod memory;
mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write every entry, or none of them.
    async fn put_all(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove every key, or none of them. Missing keys are not an error.
    async fn remove_all(&self, keys: &[&str]) -> Result<()>;
}
