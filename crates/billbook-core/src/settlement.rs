//! # Settlement Planning
//!
//! Turns a draft into everything a settlement writes, without writing it.
//!
//! ## Stage, Then Flush
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Settlement Pipeline                                │
//! │                                                                         │
//! │  billbook-core (THIS MODULE, pure)        billbook-db                   │
//! │  ─────────────────────────────────        ───────────                   │
//! │                                                                         │
//! │  draft + settings + products              read current values           │
//! │         │                                        │                      │
//! │         ▼                                        ▼                      │
//! │  1. validate (customer, lines, paid)      plan_settlement(...)          │
//! │  2. invoice_no = prefix + counter                │                      │
//! │  3. snapshot customer, lines, totals             ▼                      │
//! │  4. stock -= qty, floored at 0            ONE WriteBatch:               │
//! │  5. counter += 1                            invoices + products +       │
//! │         │                                   settings, all or nothing    │
//! │         ▼                                                               │
//! │  SettlementPlan                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in a [`SettlementPlan`] is visible until the store flushes it, so
//! a failed validation or a failed flush leaves every collection untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::draft::InvoiceDraft;
use crate::error::{CoreResult, ValidationError};
use crate::types::{Invoice, InvoiceStatus, Product, Settings};
use crate::validation::{
    validate_amount, validate_amount_bound, validate_customer_name, validate_gst_slab,
    validate_quantity,
};

// =============================================================================
// Plan Types
// =============================================================================

/// A stock decrement applied by settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub product_id: u64,
    pub name: String,
    /// Quantity on the invoice line.
    pub qty: i64,
    pub before: i64,
    /// `max(before - qty, 0)`.
    pub after: i64,
}

impl StockChange {
    /// True when the line asked for more than was on hand.
    pub fn was_floored(&self) -> bool {
        self.before - self.qty < 0
    }
}

/// An invoice line whose product no longer exists in the catalog.
///
/// The invoice still carries the line; only the stock step is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SkippedLine {
    pub product_id: u64,
    pub name: String,
    pub qty: i64,
}

/// Everything one settlement will write.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementPlan {
    /// The new invoice, with its id and number assigned.
    pub invoice: Invoice,
    /// The full product collection after stock decrements.
    pub products: Vec<Product>,
    /// Settings with the counter advanced by one.
    pub settings: Settings,
    pub stock_changes: Vec<StockChange>,
    pub skipped_lines: Vec<SkippedLine>,
}

// =============================================================================
// Planning
// =============================================================================

/// Checks the draft can be settled.
///
/// ## Rules
/// - Customer name is required
/// - At least one line
/// - Every line has a quantity in `1..=MAX_ITEM_QUANTITY`, a rate in
///   `0..=MAX_AMOUNT` and a slab GST rate
/// - Shipping stays within MAX_AMOUNT
/// - Paid amount is not negative and within MAX_AMOUNT
///
/// The calculator tolerates a zero or negative quantity mid-edit; a settled
/// invoice never carries one.
pub fn validate_draft(draft: &InvoiceDraft) -> Result<(), ValidationError> {
    validate_customer_name(&draft.customer().name)?;

    if draft.is_empty() {
        return Err(ValidationError::EmptyDraft);
    }

    for line in draft.lines() {
        validate_quantity(line.qty)?;
        validate_amount("rate", line.rate)?;
        validate_gst_slab(line.gst)?;
    }

    validate_amount_bound("shipping", draft.shipping())?;
    validate_amount("paid", draft.paid())?;
    Ok(())
}

/// Finds an invoice already settled from the draft with this transaction id.
pub fn find_settled<'a>(invoices: &'a [Invoice], txn_id: Uuid) -> Option<&'a Invoice> {
    invoices.iter().find(|inv| inv.txn_id == Some(txn_id))
}

/// Plans the settlement of `draft`.
///
/// `invoice_id` is the next free id in the invoice collection and `date` the
/// calendar date the invoice is issued on. Products referenced by the draft
/// but absent from `products` are reported in `skipped_lines`.
pub fn plan_settlement(
    draft: &InvoiceDraft,
    settings: &Settings,
    products: &[Product],
    invoice_id: u64,
    date: NaiveDate,
) -> CoreResult<SettlementPlan> {
    validate_draft(draft)?;

    let totals = draft.totals(settings);
    let paid = draft.paid();
    let customer = draft.customer().clone();

    let invoice = Invoice {
        id: invoice_id,
        invoice_no: settings.next_invoice_no(),
        txn_id: Some(draft.txn_id()),
        date,
        customer_id: customer.customer_id,
        customer_name: customer.name.trim().to_string(),
        customer_mobile: customer.mobile,
        customer_address: customer.address,
        customer_gst: customer.gst.filter(|g| !g.trim().is_empty()),
        items: draft.to_line_items(),
        subtotal: totals.subtotal,
        gst_amount: totals.gst_amount,
        cgst: totals.cgst,
        sgst: totals.sgst,
        shipping: totals.shipping,
        round_off: totals.round_off,
        grand_total: totals.grand_total,
        paid,
        balance: totals.balance(paid),
        payment_mode: draft.payment_mode(),
        status: InvoiceStatus::derive(totals.grand_total, paid),
    };

    let mut updated = products.to_vec();
    let mut stock_changes = Vec::new();
    let mut skipped_lines = Vec::new();

    for line in draft.lines() {
        let qty = line.qty.max(0);
        match updated.iter_mut().find(|p| p.id == line.product_id) {
            Some(product) => {
                let before = product.stock;
                product.stock = (before - qty).max(0);
                stock_changes.push(StockChange {
                    product_id: product.id,
                    name: product.name.clone(),
                    qty,
                    before,
                    after: product.stock,
                });
            }
            None => skipped_lines.push(SkippedLine {
                product_id: line.product_id,
                name: line.name.clone(),
                qty,
            }),
        }
    }

    let mut next_settings = settings.clone();
    next_settings.current_invoice += 1;

    Ok(SettlementPlan {
        invoice,
        products: updated,
        settings: next_settings,
        stock_changes,
        skipped_lines,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::LineUpdate;
    use crate::error::CoreError;
    use crate::money::Money;
    use crate::types::{CustomerSnapshot, TaxRate};

    fn catalog() -> Vec<Product> {
        vec![
            Product {
                id: 1,
                name: "HP Laptop 15s".to_string(),
                code: "HP-15S-001".to_string(),
                selling_price: Money::from_rupees(42000),
                gst: TaxRate::from_percent(18),
                stock: 8,
                ..Default::default()
            },
            Product {
                id: 2,
                name: "Ball Pen Blue".to_string(),
                code: "PEN-BLU-001".to_string(),
                selling_price: Money::from_rupees(10),
                gst: TaxRate::from_percent(12),
                stock: 2,
                ..Default::default()
            },
        ]
    }

    fn settings() -> Settings {
        Settings {
            invoice_prefix: "AKE-2026-".to_string(),
            current_invoice: 1003,
            ..Default::default()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn draft(products: &[Product], qtys: &[(u64, i64)]) -> InvoiceDraft {
        let mut draft = InvoiceDraft::new();
        draft.set_customer(CustomerSnapshot::walk_in("Rajesh Electronics"));
        for (id, qty) in qtys {
            let product = products.iter().find(|p| p.id == *id).unwrap();
            draft.add_item(product).unwrap();
            draft.update_item(*id, LineUpdate::Qty(*qty)).unwrap();
        }
        draft
    }

    #[test]
    fn test_plan_assigns_number_and_advances_counter() {
        let products = catalog();
        let draft = draft(&products, &[(1, 2)]);

        let plan = plan_settlement(&draft, &settings(), &products, 3, date()).unwrap();

        assert_eq!(plan.invoice.id, 3);
        assert_eq!(plan.invoice.invoice_no, "AKE-2026-1003");
        assert_eq!(plan.invoice.txn_id, Some(draft.txn_id()));
        assert_eq!(plan.settings.current_invoice, 1004);
        assert_eq!(plan.invoice.grand_total, Money::from_rupees(99120));
        assert_eq!(plan.invoice.status, InvoiceStatus::Unpaid);
    }

    #[test]
    fn test_plan_decrements_stock_by_line_quantity() {
        let products = catalog();
        let draft = draft(&products, &[(1, 2)]);

        let plan = plan_settlement(&draft, &settings(), &products, 1, date()).unwrap();

        assert_eq!(plan.products[0].stock, 6);
        assert_eq!(plan.products[1].stock, 2);
        assert_eq!(plan.stock_changes.len(), 1);
        assert_eq!(plan.stock_changes[0].before, 8);
        assert_eq!(plan.stock_changes[0].after, 6);
    }

    #[test]
    fn test_oversold_line_floors_stock_at_zero() {
        let products = catalog();
        let draft = draft(&products, &[(2, 5)]);

        let plan = plan_settlement(&draft, &settings(), &products, 1, date()).unwrap();

        assert_eq!(plan.products[1].stock, 0);
        assert!(plan.stock_changes[0].was_floored());
        // The invoice still bills the full quantity
        assert_eq!(plan.invoice.items[0].qty, 5);
    }

    #[test]
    fn test_missing_product_is_skipped_not_fatal() {
        let products = catalog();
        let draft = draft(&products, &[(1, 1), (2, 1)]);
        let remaining: Vec<Product> = products.into_iter().filter(|p| p.id != 2).collect();

        let plan = plan_settlement(&draft, &settings(), &remaining, 1, date()).unwrap();

        assert_eq!(plan.invoice.items.len(), 2);
        assert_eq!(plan.stock_changes.len(), 1);
        assert_eq!(
            plan.skipped_lines,
            vec![SkippedLine {
                product_id: 2,
                name: "Ball Pen Blue".to_string(),
                qty: 1,
            }]
        );
    }

    #[test]
    fn test_invoice_snapshots_customer_and_lines() {
        let products = catalog();
        let mut draft = draft(&products, &[(1, 1)]);
        draft.set_customer(CustomerSnapshot {
            customer_id: Some(1),
            name: "  Rajesh Electronics ".to_string(),
            mobile: "9811122233".to_string(),
            address: "Pune".to_string(),
            gst: Some(" ".to_string()),
        });

        let plan = plan_settlement(&draft, &settings(), &products, 1, date()).unwrap();
        let invoice = plan.invoice;

        assert_eq!(invoice.customer_id, Some(1));
        assert_eq!(invoice.customer_name, "Rajesh Electronics");
        assert_eq!(invoice.customer_gst, None);
        assert_eq!(invoice.items[0].name, "HP Laptop 15s");
        assert_eq!(invoice.date, date());
    }

    #[test]
    fn test_balance_and_status_at_creation() {
        let products = catalog();
        let mut draft = draft(&products, &[(1, 1)]);
        draft.set_paid(Money::from_rupees(10000)).unwrap();

        let plan = plan_settlement(&draft, &settings(), &products, 1, date()).unwrap();

        assert_eq!(plan.invoice.grand_total, Money::from_rupees(49560));
        assert_eq!(plan.invoice.balance, Money::from_rupees(39560));
        assert_eq!(plan.invoice.status, InvoiceStatus::Partial);
    }

    #[test]
    fn test_validation_rejects_before_planning() {
        let products = catalog();

        let mut nameless = draft(&products, &[(1, 1)]);
        nameless.set_customer(CustomerSnapshot::walk_in("   "));
        assert!(matches!(
            plan_settlement(&nameless, &settings(), &products, 1, date()),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let empty = draft(&products, &[]);
        assert!(matches!(
            plan_settlement(&empty, &settings(), &products, 1, date()),
            Err(CoreError::Validation(ValidationError::EmptyDraft))
        ));

        let mut negative = draft(&products, &[(1, 1)]);
        negative.set_paid(Money::from_rupees(-1)).unwrap();
        assert!(matches!(
            plan_settlement(&negative, &settings(), &products, 1, date()),
            Err(CoreError::Validation(ValidationError::Negative { .. }))
        ));
    }

    #[test]
    fn test_unsellable_quantities_are_rejected() {
        let products = catalog();

        for qty in [0, -2] {
            let draft = draft(&products, &[(1, 1), (2, qty)]);
            assert!(
                matches!(
                    plan_settlement(&draft, &settings(), &products, 1, date()),
                    Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
                ),
                "qty {} was accepted",
                qty
            );
        }

        let fine = draft(&products, &[(1, 1), (2, 1)]);
        let plan = plan_settlement(&fine, &settings(), &products, 1, date()).unwrap();
        assert!(plan.invoice.items.iter().all(|item| item.qty >= 1));
    }

    #[test]
    fn test_find_settled_by_txn_id() {
        let products = catalog();
        let draft = draft(&products, &[(1, 1)]);
        let plan = plan_settlement(&draft, &settings(), &products, 1, date()).unwrap();
        let invoices = vec![plan.invoice];

        assert!(find_settled(&invoices, draft.txn_id()).is_some());
        assert!(find_settled(&invoices, Uuid::new_v4()).is_none());
    }
}
