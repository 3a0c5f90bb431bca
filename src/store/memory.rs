use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{LinkStore, StoreError};
use crate::model::ShortLinkRecord;

/// In-process `LinkStore`. Each operation runs under one lock, which gives
/// the same atomicity the real table provides per item.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, ShortLinkRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<MutexGuard<'_, HashMap<String, ShortLinkRecord>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    /// Row count. A poisoned lock still reports the rows it holds.
    pub fn len(&self) -> usize {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn get(&self, code: &str) -> Result<Option<ShortLinkRecord>, StoreError> {
        Ok(self.rows()?.get(code).cloned())
    }

    async fn put_if_absent(&self, record: &ShortLinkRecord) -> Result<(), StoreError> {
        let mut rows = self.rows()?;
        if rows.contains_key(&record.short_code) {
            return Err(StoreError::Conflict(record.short_code.clone()));
        }
        rows.insert(record.short_code.clone(), record.clone());
        Ok(())
    }

    async fn record_visit(&self, code: &str, at: i64) -> Result<(), StoreError> {
        let mut rows = self.rows()?;
        let row = rows
            .get_mut(code)
            .ok_or_else(|| StoreError::Backend(format!("no row for {code}")))?;
        row.clicks += 1;
        row.last_accessed = Some(at);
        Ok(())
    }
}
