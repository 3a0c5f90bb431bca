//! Storage seam for the links table.
//!
//! Both handlers only need three primitives from the table: a point read, an
//! insert that refuses to overwrite, and an atomic counter bump. All
//! concurrency safety lives in the backend's implementation of those.

pub mod dynamo;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::ShortLinkRecord;

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// The conditional insert found the key already taken.
    #[error("short code {0} already exists")]
    Conflict(String),
    #[error("{0}")]
    Backend(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Point lookup by short code.
    async fn get(&self, code: &str) -> Result<Option<ShortLinkRecord>, StoreError>;

    /// Writes `record` only if no row holds its code yet; `Conflict` otherwise.
    async fn put_if_absent(&self, record: &ShortLinkRecord) -> Result<(), StoreError>;

    /// Atomically `clicks += 1` and `last_accessed = at`.
    async fn record_visit(&self, code: &str, at: i64) -> Result<(), StoreError>;
}
