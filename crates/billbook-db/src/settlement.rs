//! # Settlement Engine
//!
//! Commits an invoice draft: the invoice, its stock decrements and the
//! invoice counter advance become visible together or not at all.
//!
//! ## Commit Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      settle(draft)                                      │
//! │                                                                         │
//! │  1. read invoices ── txn_id already settled? ──► return it (replayed)   │
//! │                                                                         │
//! │  2. read settings, products (raw text kept)                             │
//! │                                                                         │
//! │  3. plan_settlement(...)         ← pure, billbook-core                  │
//! │        │                                                                │
//! │        ├── ValidationError ──────► SettleError::Validation, no write    │
//! │        ▼                                                                │
//! │  4. WriteBatch                                                          │
//! │       expect invoices  == raw₁   put invoices  (+ new invoice)          │
//! │       expect products  == raw₂   put products  (stock floored at 0)     │
//! │       expect settings  == raw₃   put settings  (counter + 1)            │
//! │        │                                                                │
//! │        ├── Conflict ─────────────► SettleError::Consistency, no write   │
//! │        ▼                                                                │
//! │  5. Settlement { invoice, stock_changes, skipped_lines }                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Retry Safety
//! The draft's transaction id is stored on the invoice. Settling the same
//! draft again (a double click, a retry after a lost response) returns the
//! invoice already issued instead of issuing a second one.

use billbook_core::settlement::{find_settled, plan_settlement, SkippedLine, StockChange};
use billbook_core::{CoreError, Invoice, InvoiceDraft, Product, Settings};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::backend::{KvBackend, WriteBatch};
use crate::error::DbError;
use crate::store::{next_id_of, RecordStore, INVOICES_KEY, PRODUCTS_KEY, SETTINGS_KEY};

// =============================================================================
// Errors
// =============================================================================

/// Why a settlement did not happen. In every case nothing was written.
#[derive(Debug, Error)]
pub enum SettleError {
    /// The draft is not settleable (no customer name, no lines, ...).
    #[error(transparent)]
    Validation(CoreError),

    /// The stored state changed between read and commit.
    #[error("Settlement aborted, '{key}' changed during commit; nothing was written")]
    Consistency { key: String },

    /// The store failed.
    #[error(transparent)]
    Db(DbError),
}

impl From<CoreError> for SettleError {
    fn from(err: CoreError) -> Self {
        SettleError::Validation(err)
    }
}

impl From<DbError> for SettleError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict { key } => SettleError::Consistency { key },
            DbError::Rejected(core) => SettleError::Validation(core),
            other => SettleError::Db(other),
        }
    }
}

pub type SettleResult<T> = Result<T, SettleError>;

// =============================================================================
// Result
// =============================================================================

/// Outcome of a settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub invoice: Invoice,
    pub stock_changes: Vec<StockChange>,
    /// Lines whose product was missing; their stock step was skipped.
    pub skipped_lines: Vec<SkippedLine>,
    /// True when this draft had already been settled and nothing was written.
    pub replayed: bool,
}

impl Settlement {
    /// Settled, but with some stock steps skipped.
    pub fn is_partial(&self) -> bool {
        !self.skipped_lines.is_empty()
    }
}

// =============================================================================
// Engine
// =============================================================================

#[derive(Debug)]
pub struct SettlementEngine<'a, B> {
    store: &'a RecordStore<B>,
}

impl<'a, B: KvBackend> SettlementEngine<'a, B> {
    pub fn new(store: &'a RecordStore<B>) -> Self {
        SettlementEngine { store }
    }

    /// Settles the draft, dated today (UTC).
    pub async fn settle(&self, draft: &InvoiceDraft) -> SettleResult<Settlement> {
        self.settle_on(draft, Utc::now().date_naive()).await
    }

    /// Settles the draft with an explicit invoice date.
    pub async fn settle_on(
        &self,
        draft: &InvoiceDraft,
        date: NaiveDate,
    ) -> SettleResult<Settlement> {
        let txn_id = draft.txn_id();
        debug!(txn_id = %txn_id, lines = draft.item_count(), "Settling draft");

        let invoices = self.store.load::<Vec<Invoice>>(INVOICES_KEY).await?;

        if let Some(existing) = find_settled(&invoices.value, txn_id) {
            info!(
                txn_id = %txn_id,
                invoice_no = %existing.invoice_no,
                "Draft already settled, returning existing invoice"
            );
            return Ok(Settlement {
                invoice: existing.clone(),
                stock_changes: Vec::new(),
                skipped_lines: Vec::new(),
                replayed: true,
            });
        }

        let settings = self.store.load::<Settings>(SETTINGS_KEY).await?;
        let products = self.store.load::<Vec<Product>>(PRODUCTS_KEY).await?;

        let plan = plan_settlement(
            draft,
            &settings.value,
            &products.value,
            next_id_of(&invoices.value),
            date,
        )?;

        let mut all_invoices = invoices.value;
        all_invoices.push(plan.invoice.clone());

        let mut batch = WriteBatch::new();
        batch
            .expect(INVOICES_KEY, invoices.raw)
            .expect(PRODUCTS_KEY, products.raw)
            .expect(SETTINGS_KEY, settings.raw)
            .put(
                INVOICES_KEY,
                RecordStore::<B>::encode(INVOICES_KEY, &all_invoices)?,
            )
            .put(
                PRODUCTS_KEY,
                RecordStore::<B>::encode(PRODUCTS_KEY, &plan.products)?,
            )
            .put(
                SETTINGS_KEY,
                RecordStore::<B>::encode(SETTINGS_KEY, &plan.settings)?,
            );

        if let Err(err) = self.store.commit(batch).await {
            warn!(txn_id = %txn_id, error = %err, "Settlement commit failed, nothing written");
            return Err(err.into());
        }

        for skipped in &plan.skipped_lines {
            warn!(
                invoice_no = %plan.invoice.invoice_no,
                product_id = skipped.product_id,
                "Product missing, stock not decremented"
            );
        }

        info!(
            invoice_no = %plan.invoice.invoice_no,
            grand_total = %plan.invoice.grand_total,
            status = %plan.invoice.status,
            stock_changes = plan.stock_changes.len(),
            skipped = plan.skipped_lines.len(),
            "Invoice settled"
        );

        Ok(Settlement {
            invoice: plan.invoice,
            stock_changes: plan.stock_changes,
            skipped_lines: plan.skipped_lines,
            replayed: false,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
