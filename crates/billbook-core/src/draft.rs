//! # Invoice Draft
//!
//! The in-memory invoice being built on the billing screen, and the pure
//! pricing/tax calculator that derives its totals.
//!
//! ## Draft Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Draft Operations                                     │
//! │                                                                         │
//! │  User Action             Draft Method            State Change           │
//! │  ───────────             ────────────            ────────────           │
//! │                                                                         │
//! │  Pick product ─────────► add_item() ───────────► new line, or qty += 1  │
//! │                                                                         │
//! │  Edit qty/rate/disc ───► update_item() ────────► lines[id].field = v    │
//! │                                                                         │
//! │  Click remove ─────────► remove_item() ────────► lines.remove(id)       │
//! │                                                                         │
//! │  Pick customer ────────► select_customer() ────► snapshot copied        │
//! │                                                                         │
//! │  Any render ───────────► totals() ─────────────► (pure, read only)      │
//! │                                                                         │
//! │  NOTE: Totals are never stored on the draft. They are recomputed from   │
//! │        the lines on every read, so they cannot go stale.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Storage
//! Lines live in a map keyed by product id with a parallel ordered key list.
//! Lookup by product is O(1) and the print order is the order lines were
//! first added.
//!
//! ## Calculator
//! ```text
//! taxable_i   = qty_i × rate_i − discount_i          (per line, paise)
//! subtotal    = Σ taxable_i
//! cgst = sgst = Σ round(taxable_i × gst_i / 2)       (per line, never blended)
//! gst_amount  = cgst + sgst
//! raw_total   = subtotal + gst_amount + shipping
//! grand_total = round_to_rupee(raw_total)            (when round-off is on)
//! round_off   = grand_total − raw_total              (signed, |x| < ₹1)
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    Customer, CustomerSnapshot, Discount, InvoiceStatus, LineItem, PaymentMode, Product,
    Settings, TaxRate,
};
use crate::validation::{validate_amount, validate_amount_bound};
use crate::{MAX_DRAFT_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Pricing Options
// =============================================================================

/// Calculator switches, normally taken from [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingOptions {
    /// When off, every line is taxed at 0%.
    pub apply_gst: bool,
    /// When off, line discounts are ignored.
    pub apply_discount: bool,
    /// When off, shipping is ignored.
    pub apply_shipping: bool,
    /// Round the grand total to the nearest rupee.
    pub round_off: bool,
}

impl Default for PricingOptions {
    fn default() -> Self {
        PricingOptions {
            apply_gst: true,
            apply_discount: true,
            apply_shipping: true,
            round_off: true,
        }
    }
}

impl From<&Settings> for PricingOptions {
    fn from(settings: &Settings) -> Self {
        PricingOptions {
            apply_gst: settings.enable_gst,
            apply_discount: settings.enable_discount,
            apply_shipping: settings.enable_shipping,
            round_off: settings.round_off,
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Derived totals of a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub gst_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    /// Shipping as charged (zero when shipping is disabled).
    pub shipping: Money,
    pub round_off: Money,
    pub grand_total: Money,
}

impl InvoiceTotals {
    /// Total before rounding.
    pub fn raw_total(&self) -> Money {
        self.subtotal + self.gst_amount + self.shipping
    }

    /// `grand_total - paid`.
    pub fn balance(&self, paid: Money) -> Money {
        self.grand_total - paid
    }
}

/// Computes invoice totals from an ordered set of lines.
///
/// Tolerates mid-edit input: negative quantities count as zero, discounts
/// are already clamped by [`Discount`], negative shipping counts as zero.
///
/// ```rust
/// use billbook_core::draft::{compute_totals, PricingOptions};
/// use billbook_core::money::Money;
/// use billbook_core::types::{LineItem, TaxRate};
///
/// let lines = vec![LineItem {
///     qty: 2,
///     rate: Money::from_rupees(42000),
///     gst: TaxRate::from_percent(18),
///     ..Default::default()
/// }];
/// let totals = compute_totals(&lines, Money::zero(), PricingOptions::default());
/// assert_eq!(totals.cgst, Money::from_rupees(7560));
/// assert_eq!(totals.grand_total, Money::from_rupees(99120));
/// ```
pub fn compute_totals<'a, I>(lines: I, shipping: Money, options: PricingOptions) -> InvoiceTotals
where
    I: IntoIterator<Item = &'a LineItem>,
{
    let mut subtotal = Money::zero();
    let mut half_gst = Money::zero();

    for line in lines {
        let taxable = if options.apply_discount {
            line.amount()
        } else {
            line.rate.multiply_quantity(line.qty.max(0))
        };
        let rate = if options.apply_gst {
            line.gst
        } else {
            TaxRate::zero()
        };

        subtotal += taxable;
        half_gst += taxable.calculate_half_tax(rate);
    }

    let shipping = if options.apply_shipping {
        shipping.non_negative()
    } else {
        Money::zero()
    };

    let gst_amount = half_gst + half_gst;
    let raw_total = subtotal + gst_amount + shipping;
    let grand_total = if options.round_off {
        raw_total.round_to_rupee()
    } else {
        raw_total
    };

    InvoiceTotals {
        subtotal,
        gst_amount,
        cgst: half_gst,
        sgst: half_gst,
        shipping,
        round_off: grand_total - raw_total,
        grand_total,
    }
}

// =============================================================================
// Line Update
// =============================================================================

/// An edit to one editable field of a draft line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum LineUpdate {
    Qty(i64),
    Rate(Money),
    Discount(Discount),
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// The invoice being composed.
///
/// ## Invariants
/// - Lines are unique by product id (adding the same product bumps qty)
/// - At most [`MAX_DRAFT_ITEMS`] lines
/// - `order` holds exactly the keys of `lines`, in first-added order
///
/// The draft has no store identity. `txn_id` identifies this draft across
/// settlement retries and is replaced whenever the draft is cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    txn_id: Uuid,
    customer: CustomerSnapshot,
    lines: HashMap<u64, LineItem>,
    order: Vec<u64>,
    shipping: Money,
    paid: Money,
    payment_mode: PaymentMode,
}

impl InvoiceDraft {
    /// Creates an empty draft with a fresh transaction id.
    pub fn new() -> Self {
        InvoiceDraft::with_txn_id(Uuid::new_v4())
    }

    /// Creates an empty draft with the payment mode preset from settings.
    pub fn for_settings(settings: &Settings) -> Self {
        let mut draft = InvoiceDraft::new();
        draft.payment_mode = settings.default_payment_mode;
        draft
    }

    /// Creates an empty draft with a known transaction id.
    pub fn with_txn_id(txn_id: Uuid) -> Self {
        InvoiceDraft {
            txn_id,
            customer: CustomerSnapshot::default(),
            lines: HashMap::new(),
            order: Vec::new(),
            shipping: Money::zero(),
            paid: Money::zero(),
            payment_mode: PaymentMode::default(),
        }
    }

    pub fn txn_id(&self) -> Uuid {
        self.txn_id
    }

    // -------------------------------------------------------------------------
    // Customer
    // -------------------------------------------------------------------------

    pub fn customer(&self) -> &CustomerSnapshot {
        &self.customer
    }

    /// Replaces the customer block (typed in, or edited after selection).
    pub fn set_customer(&mut self, customer: CustomerSnapshot) {
        self.customer = customer;
    }

    /// Copies an existing customer's details onto the draft.
    pub fn select_customer(&mut self, customer: &Customer) {
        self.customer = CustomerSnapshot::from(customer);
    }

    // -------------------------------------------------------------------------
    // Lines
    // -------------------------------------------------------------------------

    /// Adds a product, or increases its quantity by one if already present.
    ///
    /// A new line snapshots name, code, selling price and GST rate from the
    /// product as it is right now. A selling price outside
    /// `0..=MAX_AMOUNT` is refused.
    pub fn add_item(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(line) = self.lines.get_mut(&product.id) {
            let new_qty = line.qty.max(0) + 1;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.qty = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_DRAFT_ITEMS {
            return Err(CoreError::DraftTooLarge {
                max: MAX_DRAFT_ITEMS,
            });
        }
        validate_amount("rate", product.selling_price)?;

        self.lines.insert(product.id, LineItem::from_product(product));
        self.order.push(product.id);
        Ok(())
    }

    /// Overwrites one field of a line.
    ///
    /// Quantities of zero or below are kept as typed; the calculator treats
    /// them as zero and settlement refuses them. Rates must lie in
    /// `0..=MAX_AMOUNT`.
    pub fn update_item(&mut self, product_id: u64, update: LineUpdate) -> CoreResult<()> {
        let line = self
            .lines
            .get_mut(&product_id)
            .ok_or(CoreError::LineNotFound(product_id))?;

        match update {
            LineUpdate::Qty(qty) => {
                if qty > MAX_ITEM_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: qty,
                        max: MAX_ITEM_QUANTITY,
                    });
                }
                line.qty = qty;
            }
            LineUpdate::Rate(rate) => {
                validate_amount("rate", rate)?;
                line.rate = rate;
            }
            LineUpdate::Discount(discount) => line.discount = discount,
        }

        Ok(())
    }

    /// Removes a line and returns it.
    pub fn remove_item(&mut self, product_id: u64) -> CoreResult<LineItem> {
        let line = self
            .lines
            .remove(&product_id)
            .ok_or(CoreError::LineNotFound(product_id))?;
        self.order.retain(|id| *id != product_id);
        Ok(line)
    }

    pub fn line(&self, product_id: u64) -> Option<&LineItem> {
        self.lines.get(&product_id)
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = &LineItem> + '_ {
        self.order.iter().filter_map(|id| self.lines.get(id))
    }

    /// Owned copy of the lines in insertion order, as stored on an invoice.
    pub fn to_line_items(&self) -> Vec<LineItem> {
        self.lines().cloned().collect()
    }

    pub fn item_count(&self) -> usize {
        self.order.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines().map(|line| line.qty.max(0)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // -------------------------------------------------------------------------
    // Payment inputs
    // -------------------------------------------------------------------------

    pub fn shipping(&self) -> Money {
        self.shipping
    }

    /// Negative shipping is kept as typed and counts as zero in totals.
    pub fn set_shipping(&mut self, shipping: Money) -> CoreResult<()> {
        validate_amount_bound("shipping", shipping)?;
        self.shipping = shipping;
        Ok(())
    }

    pub fn paid(&self) -> Money {
        self.paid
    }

    /// Only the magnitude is checked here; a negative payment is refused at
    /// settlement.
    pub fn set_paid(&mut self, paid: Money) -> CoreResult<()> {
        validate_amount_bound("paid", paid)?;
        self.paid = paid;
        Ok(())
    }

    pub fn payment_mode(&self) -> PaymentMode {
        self.payment_mode
    }

    pub fn set_payment_mode(&mut self, mode: PaymentMode) {
        self.payment_mode = mode;
    }

    // -------------------------------------------------------------------------
    // Derived values
    // -------------------------------------------------------------------------

    /// Totals under the given settings' toggles.
    pub fn totals(&self, settings: &Settings) -> InvoiceTotals {
        self.totals_with(PricingOptions::from(settings))
    }

    pub fn totals_with(&self, options: PricingOptions) -> InvoiceTotals {
        compute_totals(self.lines(), self.shipping, options)
    }

    /// `grand_total - paid` under the given settings.
    pub fn balance(&self, settings: &Settings) -> Money {
        self.totals(settings).balance(self.paid)
    }

    /// Status the invoice would get if settled now.
    pub fn status(&self, settings: &Settings) -> InvoiceStatus {
        InvoiceStatus::derive(self.totals(settings).grand_total, self.paid)
    }

    /// Empties the draft and starts a new transaction.
    pub fn clear(&mut self) {
        let payment_mode = self.payment_mode;
        *self = InvoiceDraft::new();
        self.payment_mode = payment_mode;
    }
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::MAX_AMOUNT;

    fn product(id: u64, rupees: i64, gst_pct: u32) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            code: format!("SKU-{}", id),
            selling_price: Money::from_rupees(rupees),
            gst: TaxRate::from_percent(gst_pct),
            stock: 100,
            ..Default::default()
        }
    }

    fn draft_with(items: &[(&Product, i64)]) -> InvoiceDraft {
        let mut draft = InvoiceDraft::new();
        for (product, qty) in items {
            draft.add_item(product).unwrap();
            draft.update_item(product.id, LineUpdate::Qty(*qty)).unwrap();
        }
        draft
    }

    #[test]
    fn test_single_line_laptop_invoice() {
        let laptop = product(1, 42000, 18);
        let draft = draft_with(&[(&laptop, 2)]);

        let totals = draft.totals(&Settings::default());
        assert_eq!(totals.subtotal, Money::from_rupees(84000));
        assert_eq!(totals.gst_amount, Money::from_rupees(15120));
        assert_eq!(totals.cgst, Money::from_rupees(7560));
        assert_eq!(totals.sgst, Money::from_rupees(7560));
        assert_eq!(totals.grand_total, Money::from_rupees(99120));
        assert_eq!(totals.round_off, Money::zero());
    }

    #[test]
    fn test_two_lines_with_shipping_rounds_up() {
        let mouse = product(3, 750, 18);
        let paper = product(4, 1499, 18);
        let mut draft = draft_with(&[(&mouse, 3), (&paper, 1)]);
        draft.set_shipping(Money::from_rupees(50)).unwrap();

        let totals = draft.totals(&Settings::default());
        assert_eq!(totals.subtotal, Money::from_rupees(3749));
        assert_eq!(totals.gst_amount, Money::from_paise(67482));
        assert_eq!(totals.cgst, Money::from_paise(33741));
        assert_eq!(totals.grand_total, Money::from_rupees(4474));
        assert_eq!(totals.round_off, Money::from_paise(18));
    }

    #[test]
    fn test_status_follows_paid_amount() {
        let mouse = product(3, 750, 18);
        let paper = product(4, 1499, 18);
        let mut draft = draft_with(&[(&mouse, 3), (&paper, 1)]);
        draft.set_shipping(Money::from_rupees(50)).unwrap();
        let settings = Settings::default();

        assert_eq!(draft.status(&settings), InvoiceStatus::Unpaid);

        draft.set_paid(Money::from_rupees(2000)).unwrap();
        assert_eq!(draft.status(&settings), InvoiceStatus::Partial);
        assert_eq!(draft.balance(&settings), Money::from_rupees(2474));

        draft.set_paid(Money::from_rupees(4474)).unwrap();
        assert_eq!(draft.status(&settings), InvoiceStatus::Paid);
        assert_eq!(draft.balance(&settings), Money::zero());
    }

    #[test]
    fn test_totals_independent_of_line_order() {
        let a = product(1, 199, 5);
        let b = product(2, 1049, 12);
        let c = product(3, 333, 28);

        let forward = draft_with(&[(&a, 3), (&b, 7), (&c, 2)]);
        let backward = draft_with(&[(&c, 2), (&b, 7), (&a, 3)]);

        let settings = Settings::default();
        assert_eq!(forward.totals(&settings), backward.totals(&settings));
    }

    #[test]
    fn test_totals_are_idempotent() {
        let a = product(1, 199, 5);
        let draft = draft_with(&[(&a, 3)]);
        let settings = Settings::default();

        assert_eq!(draft.totals(&settings), draft.totals(&settings));
    }

    #[test]
    fn test_split_halves_always_match() {
        // 0.05 × 5% = 0.0025 per half, rounds to 0 each; halves never drift
        let tiny = product(1, 0, 5);
        let mut draft = draft_with(&[(&tiny, 1)]);
        draft
            .update_item(1, LineUpdate::Rate(Money::from_paise(5)))
            .unwrap();

        let totals = draft.totals(&Settings::default());
        assert_eq!(totals.cgst, totals.sgst);
        assert_eq!(totals.cgst + totals.sgst, totals.gst_amount);
    }

    #[test]
    fn test_round_off_stays_below_one_rupee() {
        let odd = product(1, 0, 18);
        let mut draft = draft_with(&[(&odd, 1)]);

        for paise in [1, 49, 50, 51, 99, 12_345, 99_999] {
            draft
                .update_item(1, LineUpdate::Rate(Money::from_paise(paise)))
                .unwrap();
            let totals = draft.totals(&Settings::default());
            assert!(totals.grand_total.is_whole_rupees());
            assert!(totals.round_off.abs() < Money::from_rupees(1));
            assert_eq!(totals.grand_total, totals.raw_total() + totals.round_off);
        }
    }

    #[test]
    fn test_rounding_disabled_keeps_exact_total() {
        let mouse = product(3, 750, 18);
        let paper = product(4, 1499, 18);
        let mut draft = draft_with(&[(&mouse, 3), (&paper, 1)]);
        draft.set_shipping(Money::from_rupees(50)).unwrap();

        let settings = Settings {
            round_off: false,
            ..Default::default()
        };
        let totals = draft.totals(&settings);
        assert_eq!(totals.grand_total, Money::from_paise(447382));
        assert_eq!(totals.round_off, Money::zero());
    }

    #[test]
    fn test_add_same_product_increments_quantity() {
        let pen = product(6, 10, 12);
        let mut draft = InvoiceDraft::new();

        draft.add_item(&pen).unwrap();
        draft.add_item(&pen).unwrap();

        assert_eq!(draft.item_count(), 1);
        assert_eq!(draft.line(6).unwrap().qty, 2);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut draft = InvoiceDraft::new();
        for id in [5, 2, 9] {
            draft.add_item(&product(id, 10, 5)).unwrap();
        }
        draft.add_item(&product(2, 10, 5)).unwrap();
        draft.remove_item(5).unwrap();

        let ids: Vec<u64> = draft.lines().map(|l| l.product_id).collect();
        assert_eq!(ids, vec![2, 9]);
    }

    #[test]
    fn test_line_snapshot_survives_catalog_edit() {
        let mut laptop = product(1, 42000, 18);
        let mut draft = InvoiceDraft::new();
        draft.add_item(&laptop).unwrap();

        laptop.selling_price = Money::from_rupees(45000);
        laptop.name = "Renamed".to_string();

        let line = draft.line(1).unwrap();
        assert_eq!(line.rate, Money::from_rupees(42000));
        assert_eq!(line.name, "Product 1");
    }

    #[test]
    fn test_bad_quantities_do_not_break_totals() {
        let pen = product(6, 10, 12);
        let mut draft = draft_with(&[(&pen, 1)]);

        draft.update_item(6, LineUpdate::Qty(0)).unwrap();
        assert_eq!(draft.totals(&Settings::default()).grand_total, Money::zero());

        draft.update_item(6, LineUpdate::Qty(-3)).unwrap();
        assert_eq!(draft.totals(&Settings::default()).subtotal, Money::zero());

        assert!(matches!(
            draft.update_item(6, LineUpdate::Qty(MAX_ITEM_QUANTITY + 1)),
            Err(CoreError::QuantityTooLarge { .. })
        ));
    }

    #[test]
    fn test_discount_applies_and_clamps() {
        let chair = product(5, 8500, 18);
        let mut draft = draft_with(&[(&chair, 1)]);

        draft
            .update_item(5, LineUpdate::Discount(Discount::from_percent(10)))
            .unwrap();
        assert_eq!(
            draft.totals(&Settings::default()).subtotal,
            Money::from_rupees(7650)
        );

        draft
            .update_item(5, LineUpdate::Discount(Discount::from_percent(250)))
            .unwrap();
        assert_eq!(draft.totals(&Settings::default()).subtotal, Money::zero());
    }

    #[test]
    fn test_settings_toggles() {
        let chair = product(5, 8500, 18);
        let mut draft = draft_with(&[(&chair, 1)]);
        draft
            .update_item(5, LineUpdate::Discount(Discount::from_percent(10)))
            .unwrap();
        draft.set_shipping(Money::from_rupees(100)).unwrap();

        let settings = Settings {
            enable_gst: false,
            enable_discount: false,
            enable_shipping: false,
            ..Default::default()
        };
        let totals = draft.totals(&settings);
        assert_eq!(totals.subtotal, Money::from_rupees(8500));
        assert_eq!(totals.gst_amount, Money::zero());
        assert_eq!(totals.shipping, Money::zero());
        assert_eq!(totals.grand_total, Money::from_rupees(8500));
    }

    #[test]
    fn test_negative_shipping_ignored() {
        let pen = product(6, 10, 0);
        let mut draft = draft_with(&[(&pen, 1)]);
        draft.set_shipping(Money::from_rupees(-40)).unwrap();

        assert_eq!(
            draft.totals(&Settings::default()).grand_total,
            Money::from_rupees(10)
        );
    }

    #[test]
    fn test_unknown_line_is_an_error() {
        let mut draft = InvoiceDraft::new();
        assert!(matches!(
            draft.update_item(42, LineUpdate::Qty(1)),
            Err(CoreError::LineNotFound(42))
        ));
        assert!(matches!(draft.remove_item(42), Err(CoreError::LineNotFound(42))));
    }

    #[test]
    fn test_draft_line_limit() {
        let mut draft = InvoiceDraft::new();
        for id in 0..MAX_DRAFT_ITEMS as u64 {
            draft.add_item(&product(id, 1, 0)).unwrap();
        }
        assert!(matches!(
            draft.add_item(&product(9999, 1, 0)),
            Err(CoreError::DraftTooLarge { .. })
        ));
    }

    #[test]
    fn test_amounts_above_ceiling_are_refused() {
        let laptop = product(1, 42000, 18);
        let mut draft = draft_with(&[(&laptop, 3)]);
        let too_much = MAX_AMOUNT + Money::from_paise(1);

        assert!(matches!(
            draft.update_item(1, LineUpdate::Rate(too_much)),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(draft.update_item(1, LineUpdate::Rate(Money::from_paise(-1))).is_err());
        assert_eq!(draft.line(1).unwrap().rate, Money::from_rupees(42000));

        assert!(draft.set_shipping(too_much).is_err());
        assert!(draft.set_paid(-too_much).is_err());
        assert_eq!(draft.shipping(), Money::zero());
        assert_eq!(draft.paid(), Money::zero());

        let mispriced = Product {
            selling_price: Money::from_paise(46_116_860_184_273_879),
            ..product(2, 0, 18)
        };
        assert!(draft.add_item(&mispriced).is_err());
        assert_eq!(draft.lines().count(), 1);
    }

    #[test]
    fn test_largest_accepted_bill_stays_positive() {
        let mut draft = InvoiceDraft::new();
        for id in 0..MAX_DRAFT_ITEMS as u64 {
            draft.add_item(&product(id, 0, 28)).unwrap();
            draft.update_item(id, LineUpdate::Rate(MAX_AMOUNT)).unwrap();
            draft
                .update_item(id, LineUpdate::Qty(MAX_ITEM_QUANTITY))
                .unwrap();
        }
        draft.set_shipping(MAX_AMOUNT).unwrap();

        let totals = draft.totals(&Settings::default());
        let expected_subtotal =
            MAX_AMOUNT.multiply_quantity(MAX_ITEM_QUANTITY * MAX_DRAFT_ITEMS as i64);
        assert_eq!(totals.subtotal, expected_subtotal);
        assert!(totals.grand_total > totals.subtotal);
        assert_eq!(totals.cgst, totals.sgst);
    }

    #[test]
    fn test_out_of_range_discount_from_json_is_clamped() {
        let chair = product(5, 8500, 18);
        let mut draft = draft_with(&[(&chair, 1)]);

        let update: LineUpdate =
            serde_json::from_str(r#"{"field":"discount","value":25000}"#).unwrap();
        assert_eq!(update, LineUpdate::Discount(Discount::from_bps(10_000)));
        draft.update_item(5, update).unwrap();

        let totals = draft.totals(&Settings::default());
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.grand_total, Money::zero());

        let negative: LineUpdate =
            serde_json::from_str(r#"{"field":"discount","value":-500}"#).unwrap();
        assert_eq!(negative, LineUpdate::Discount(Discount::none()));
    }

    #[test]
    fn test_clear_starts_new_transaction() {
        let mut draft = draft_with(&[(&product(1, 10, 0), 1)]);
        draft.set_payment_mode(PaymentMode::Upi);
        let before = draft.txn_id();

        draft.clear();

        assert!(draft.is_empty());
        assert_ne!(draft.txn_id(), before);
        assert_eq!(draft.payment_mode(), PaymentMode::Upi);
    }
}
