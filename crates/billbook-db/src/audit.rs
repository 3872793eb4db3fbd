//! # Consistency Audit
//!
//! Scans stored state for signs of a partial or conflicting commit.
//!
//! ## Checks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Finding                  Condition                                     │
//! │  ───────                  ─────────                                     │
//! │  DuplicateInvoiceNumber   two invoices share an invoice number          │
//! │  DuplicateTransaction     two invoices came from the same draft         │
//! │  TotalsMismatch           stored amounts break a totals identity:       │
//! │                             balance == grand_total − paid               │
//! │                             cgst == sgst                                │
//! │                             cgst + sgst == gst_amount                   │
//! │                             grand_total == subtotal + gst + shipping    │
//! │                                            + round_off                  │
//! │  CounterBehind            next counter ≤ highest number already issued  │
//! │                           under the current prefix                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fmt;

use billbook_core::{Invoice, Settings};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::KvBackend;
use crate::error::DbResult;
use crate::store::RecordStore;

/// One inconsistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AuditFinding {
    DuplicateInvoiceNumber { invoice_no: String, ids: Vec<u64> },
    DuplicateTransaction { txn_id: Uuid, ids: Vec<u64> },
    TotalsMismatch { invoice_no: String, rule: String },
    CounterBehind { current: u64, highest_issued: u64 },
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditFinding::DuplicateInvoiceNumber { invoice_no, ids } => {
                write!(f, "invoice number {} used by ids {:?}", invoice_no, ids)
            }
            AuditFinding::DuplicateTransaction { txn_id, ids } => {
                write!(f, "draft {} settled more than once: ids {:?}", txn_id, ids)
            }
            AuditFinding::TotalsMismatch { invoice_no, rule } => {
                write!(f, "{} violates {}", invoice_no, rule)
            }
            AuditFinding::CounterBehind {
                current,
                highest_issued,
            } => write!(
                f,
                "next invoice counter {} is not above highest issued {}",
                current, highest_issued
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub invoices_checked: usize,
    pub findings: Vec<AuditFinding>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Audits the stored settings and invoices.
pub async fn audit<B: KvBackend>(store: &RecordStore<B>) -> DbResult<AuditReport> {
    let settings = store.settings().await?;
    let invoices: Vec<Invoice> = store.get_all().await?;

    let report = check(&settings, &invoices);

    if report.is_clean() {
        info!(invoices = report.invoices_checked, "Audit clean");
    } else {
        for finding in &report.findings {
            warn!(finding = %finding, "Audit finding");
        }
    }

    Ok(report)
}

/// Runs every check over already-loaded records.
pub fn check(settings: &Settings, invoices: &[Invoice]) -> AuditReport {
    let mut findings = Vec::new();

    let mut by_number: HashMap<&str, Vec<u64>> = HashMap::new();
    let mut by_txn: HashMap<Uuid, Vec<u64>> = HashMap::new();
    for inv in invoices {
        by_number.entry(&inv.invoice_no).or_default().push(inv.id);
        if let Some(txn_id) = inv.txn_id {
            by_txn.entry(txn_id).or_default().push(inv.id);
        }
    }

    let mut numbers: Vec<_> = by_number.into_iter().filter(|(_, ids)| ids.len() > 1).collect();
    numbers.sort();
    findings.extend(numbers.into_iter().map(|(no, ids)| {
        AuditFinding::DuplicateInvoiceNumber {
            invoice_no: no.to_string(),
            ids,
        }
    }));

    let mut txns: Vec<_> = by_txn.into_iter().filter(|(_, ids)| ids.len() > 1).collect();
    txns.sort();
    findings.extend(
        txns.into_iter()
            .map(|(txn_id, ids)| AuditFinding::DuplicateTransaction { txn_id, ids }),
    );

    for inv in invoices {
        for rule in broken_rules(inv) {
            findings.push(AuditFinding::TotalsMismatch {
                invoice_no: inv.invoice_no.clone(),
                rule: rule.to_string(),
            });
        }
    }

    let highest_issued = invoices
        .iter()
        .filter_map(|inv| inv.invoice_no.strip_prefix(settings.invoice_prefix.as_str()))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max();
    if let Some(highest_issued) = highest_issued {
        if settings.current_invoice <= highest_issued {
            findings.push(AuditFinding::CounterBehind {
                current: settings.current_invoice,
                highest_issued,
            });
        }
    }

    AuditReport {
        invoices_checked: invoices.len(),
        findings,
    }
}

fn broken_rules(inv: &Invoice) -> Vec<&'static str> {
    let mut broken = Vec::new();

    if inv.balance != inv.grand_total - inv.paid {
        broken.push("balance = grand total - paid");
    }
    if inv.cgst != inv.sgst {
        broken.push("cgst = sgst");
    }
    if inv.cgst + inv.sgst != inv.gst_amount {
        broken.push("cgst + sgst = gst amount");
    }
    if inv.grand_total != inv.subtotal + inv.gst_amount + inv.shipping + inv.round_off {
        broken.push("grand total = subtotal + gst + shipping + round off");
    }

    broken
}
