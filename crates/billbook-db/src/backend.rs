//! # Key-Value Backend
//!
//! The storage seam under the record store.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         KvBackend                                       │
//! │                                                                         │
//! │  get(key)        → Option<String>   raw JSON, None when never written   │
//! │  commit(batch)   → ()               all-or-nothing                      │
//! │                                                                         │
//! │  WriteBatch                                                             │
//! │  ├── expect(key, Some(raw)) ── current value must equal `raw`           │
//! │  ├── expect(key, None)      ── key must be absent                       │
//! │  ├── put(key, value)                                                    │
//! │  └── delete(key)                                                        │
//! │                                                                         │
//! │  Any failed expectation → DbError::Conflict, nothing applied            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations: [`MemBackend`](crate::memory::MemBackend) for tests and
//! [`Database`](crate::pool::Database) for SQLite.

use crate::error::DbResult;

/// One mutation in a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put { key: String, value: String },
    Delete { key: String },
}

impl WriteOp {
    pub fn key(&self) -> &str {
        match self {
            WriteOp::Put { key, .. } | WriteOp::Delete { key } => key,
        }
    }
}

/// A set of writes applied atomically, guarded by compare-and-set checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    expectations: Vec<(String, Option<String>)>,
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `key` to currently hold `current` (or be absent for `None`).
    pub fn expect(&mut self, key: impl Into<String>, current: Option<String>) -> &mut Self {
        self.expectations.push((key.into(), current));
        self
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Put {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Delete { key: key.into() });
        self
    }

    pub fn expectations(&self) -> &[(String, Option<String>)] {
        &self.expectations
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Keys this batch writes, in order.
    pub fn keys(&self) -> Vec<&str> {
        self.ops.iter().map(WriteOp::key).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Raw string storage with atomic batched writes.
///
/// Methods take `&self`; implementations handle their own interior
/// mutability.
#[allow(async_fn_in_trait)]
pub trait KvBackend {
    /// Reads the raw value under `key`.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Applies every op in `batch`, or none of them.
    async fn commit(&self, batch: WriteBatch) -> DbResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_builder() {
        let mut batch = WriteBatch::new();
        assert!(batch.is_empty());

        batch
            .expect("settings", None)
            .put("settings", "{}")
            .delete("seeded");

        assert_eq!(batch.keys(), vec!["settings", "seeded"]);
        assert_eq!(batch.expectations().len(), 1);
        assert!(!batch.is_empty());
    }
}
