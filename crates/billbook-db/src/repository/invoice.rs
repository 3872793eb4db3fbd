//! # Invoice Repository
//!
//! Read access to settled invoices plus the one permitted transition.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Invoice Lifecycle                                  │
//! │                                                                         │
//! │   settlement ──► Unpaid / Partial / Paid ──► cancel() ──► Cancelled     │
//! │                                                                         │
//! │   • Invoices are only created by the settlement engine                  │
//! │   • Amounts are never recomputed after creation                         │
//! │   • Cancelling leaves stock as it is                                    │
//! │   • Cancelled is terminal                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billbook_core::validation::validate_search_query;
use billbook_core::{CoreError, Invoice, InvoiceStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::KvBackend;
use crate::error::{DbError, DbResult};
use crate::repository::matches_query;
use crate::store::RecordStore;

/// Invoice list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFilter {
    /// Only invoices with this status; `None` means all.
    pub status: Option<InvoiceStatus>,
    /// Substring of the invoice number or customer name.
    pub query: String,
}

#[derive(Debug)]
pub struct InvoiceRepository<'a, B> {
    store: &'a RecordStore<B>,
}

impl<'a, B: KvBackend> InvoiceRepository<'a, B> {
    pub fn new(store: &'a RecordStore<B>) -> Self {
        InvoiceRepository { store }
    }

    /// All invoices in issue order.
    pub async fn list(&self) -> DbResult<Vec<Invoice>> {
        self.store.get_all().await
    }

    pub async fn get(&self, id: u64) -> DbResult<Invoice> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", id))
    }

    pub async fn find_by_number(&self, invoice_no: &str) -> DbResult<Option<Invoice>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|inv| inv.invoice_no == invoice_no))
    }

    /// Invoices matching a status and a number / customer name search.
    pub async fn filter(&self, filter: &InvoiceFilter) -> DbResult<Vec<Invoice>> {
        let query = validate_search_query(&filter.query)?.to_lowercase();

        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|inv| filter.status.map_or(true, |status| inv.status == status))
            .filter(|inv| {
                query.is_empty()
                    || matches_query(&inv.invoice_no, &query)
                    || matches_query(&inv.customer_name, &query)
            })
            .collect())
    }

    /// Marks an invoice cancelled and returns it.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No invoice with this id
    /// * `Err(DbError::Rejected)` - Already cancelled
    pub async fn cancel(&self, id: u64) -> DbResult<Invoice> {
        let mut invoice = self.get(id).await?;

        if invoice.status.is_cancelled() {
            return Err(CoreError::InvalidInvoiceStatus {
                invoice_no: invoice.invoice_no,
                status: invoice.status,
                action: "cancel".to_string(),
            }
            .into());
        }

        invoice.status = InvoiceStatus::Cancelled;
        self.store.update(&invoice).await?;

        info!(id, invoice_no = %invoice.invoice_no, "Invoice cancelled");
        Ok(invoice)
    }
}
