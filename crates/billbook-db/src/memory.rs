//! In-memory backend for tests and throwaway sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::{KvBackend, WriteBatch, WriteOp};
use crate::error::{DbError, DbResult};

/// `HashMap`-backed [`KvBackend`].
///
/// A batch is checked and applied under one lock, which gives the same
/// all-or-nothing behaviour as the SQLite transaction.
#[derive(Debug, Default)]
pub struct MemBackend {
    entries: Mutex<HashMap<String, String>>,
    simulate_write_error: AtomicBool,
    commits: AtomicUsize,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Number of successfully applied batches.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Test helper to write a raw value directly, bypassing batches.
    pub async fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
    }

    /// Copy of every stored key and value.
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.lock().await.clone()
    }
}

impl KvBackend for MemBackend {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn commit(&self, batch: WriteBatch) -> DbResult<()> {
        let mut entries = self.entries.lock().await;

        for (key, expected) in batch.expectations() {
            if entries.get(key) != expected.as_ref() {
                debug!(key = %key, "Write batch expectation failed");
                return Err(DbError::Conflict { key: key.clone() });
            }
        }

        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(DbError::TransactionFailed(
                "Simulated write error".to_string(),
            ));
        }

        for op in batch.ops() {
            match op {
                WriteOp::Put { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                WriteOp::Delete { key } => {
                    entries.remove(key);
                }
            }
        }

        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
