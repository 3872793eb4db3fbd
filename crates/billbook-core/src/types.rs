//! # Domain Types
//!
//! Core domain types used throughout Billbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Product      │   │    Invoice      │   │    Settings     │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (u64)       │   │  id (u64)       │   │  invoice_prefix │        │
//! │  │  code (SKU)     │   │  invoice_no     │   │  current_invoice│        │
//! │  │  selling_price  │   │  items[]        │   │  default_gst    │        │
//! │  │  gst, stock     │   │  grand_total    │   │  round_off      │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    TaxRate      │   │ InvoiceStatus   │   │  PaymentMode    │        │
//! │  │  bps (u32)      │   │  Unpaid         │   │  Cash, UPI      │        │
//! │  │  1800 = 18%     │   │  Partial, Paid  │   │  Card, Bank     │        │
//! │  └─────────────────┘   │  Cancelled      │   │  Credit         │        │
//! │                        └─────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Invoices never hold live references to products or customers. Names,
//! codes, rates and customer details are copied at the moment the line or the
//! customer is attached, so editing the catalog never rewrites history.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::{DEFAULT_INVOICE_PREFIX, DEFAULT_STARTING_INVOICE, GST_SLABS};

// =============================================================================
// Tax Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. 1800 bps = 18%. Integer rates keep every tax
/// computation in integer paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a whole percentage (18 → 18%).
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        TaxRate(pct * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks the rate is one of the GST slabs (0, 5, 12, 18, 28%).
    pub fn is_gst_slab(&self) -> bool {
        GST_SLABS.iter().any(|slab| slab.bps() == self.0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Line discount in basis points, always within 0..=100%.
///
/// Construction clamps instead of failing: the draft must tolerate whatever
/// the discount field holds mid-edit. Deserialization clamps the same way,
/// so a stored or UI-sent value outside 0..=10000 lands on 0% or 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export)]
pub struct Discount(u32);

impl Discount {
    const MAX_BPS: u32 = 10_000;

    /// Creates a discount from basis points, clamped to 100%.
    #[inline]
    pub fn from_bps(bps: u32) -> Self {
        Discount(bps.min(Self::MAX_BPS))
    }

    /// Creates a discount from a whole percentage, clamped to 100%.
    #[inline]
    pub fn from_percent(pct: u32) -> Self {
        Discount::from_bps(pct.saturating_mul(100))
    }

    /// Creates a discount from a UI percentage such as `12.5`.
    ///
    /// Negative and NaN inputs become 0%, values above 100 become 100%.
    pub fn from_percentage(pct: f64) -> Self {
        if pct.is_nan() || pct <= 0.0 {
            return Discount(0);
        }
        let bps = (pct * 100.0).round().min(Self::MAX_BPS as f64);
        Discount(bps as u32)
    }

    /// No discount.
    #[inline]
    pub const fn none() -> Self {
        Discount(0)
    }

    /// Returns the discount in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the discount as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Discount {
    fn default() -> Self {
        Discount::none()
    }
}

impl<'de> Deserialize<'de> for Discount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bps = i64::deserialize(deserializer)?;
        Ok(Discount::from_bps(bps.clamp(0, Self::MAX_BPS as i64) as u32))
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    /// Store-assigned identifier, immutable once assigned.
    pub id: u64,

    /// Display name, snapshotted onto invoice lines.
    pub name: String,

    /// Product code / SKU. Expected unique, not enforced.
    pub code: String,

    pub category: String,

    /// HSN tax classification code. Stored for print only.
    pub hsn: String,

    pub purchase_price: Money,

    /// Default line rate when the product is added to a draft.
    pub selling_price: Money,

    /// GST rate, one of the slab set.
    pub gst: TaxRate,

    /// Units on hand, never negative.
    pub stock: i64,

    /// Low-stock threshold.
    pub min_stock: i64,

    pub unit: String,

    pub supplier: String,
}

impl Product {
    /// `stock <= min_stock`.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Stock valued at purchase price.
    pub fn stock_value(&self) -> Money {
        self.purchase_price.multiply_quantity(self.stock)
    }

    /// Selling price minus purchase price.
    pub fn unit_margin(&self) -> Money {
        self.selling_price - self.purchase_price
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CustomerType {
    #[default]
    Retail,
    Wholesale,
}

/// A customer record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub id: u64,
    pub name: String,
    pub mobile: String,
    pub address: String,
    /// GSTIN, if the customer is registered.
    pub gst: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
}

/// Customer details frozen onto a draft or invoice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerSnapshot {
    /// Source customer record, when one was picked from the list.
    pub customer_id: Option<u64>,
    pub name: String,
    pub mobile: String,
    pub address: String,
    pub gst: Option<String>,
}

impl CustomerSnapshot {
    /// A walk-in customer typed directly into the draft.
    pub fn walk_in(name: impl Into<String>) -> Self {
        CustomerSnapshot {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl From<&Customer> for CustomerSnapshot {
    fn from(customer: &Customer) -> Self {
        CustomerSnapshot {
            customer_id: Some(customer.id),
            name: customer.name.clone(),
            mobile: customer.mobile.clone(),
            address: customer.address.clone(),
            gst: customer.gst.clone().filter(|g| !g.trim().is_empty()),
        }
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMode {
    #[default]
    Cash,
    #[serde(rename = "UPI")]
    Upi,
    Card,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Credit,
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Payment status of an invoice.
///
/// ## Derivation (creation time only)
/// ```text
/// balance <= 0                 → Paid
/// paid > 0  and balance > 0    → Partial
/// otherwise                    → Unpaid
/// ```
/// `Cancelled` is only ever reached by an explicit user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    /// Derives the payment status from the grand total and the amount paid.
    ///
    /// ```rust
    /// use billbook_core::money::Money;
    /// use billbook_core::types::InvoiceStatus;
    ///
    /// let total = Money::from_rupees(4474);
    /// assert_eq!(InvoiceStatus::derive(total, Money::zero()), InvoiceStatus::Unpaid);
    /// assert_eq!(InvoiceStatus::derive(total, Money::from_rupees(2000)), InvoiceStatus::Partial);
    /// assert_eq!(InvoiceStatus::derive(total, total), InvoiceStatus::Paid);
    /// ```
    pub fn derive(grand_total: Money, paid: Money) -> Self {
        let balance = grand_total - paid;
        if !balance.is_positive() {
            InvoiceStatus::Paid
        } else if paid.is_positive() {
            InvoiceStatus::Partial
        } else {
            InvoiceStatus::Unpaid
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, InvoiceStatus::Cancelled)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Unpaid => write!(f, "Unpaid"),
            InvoiceStatus::Partial => write!(f, "Partial"),
            InvoiceStatus::Paid => write!(f, "Paid"),
            InvoiceStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A line on a draft or invoice.
///
/// Name, code and GST rate are frozen when the product is added; `rate`
/// starts at the selling price and may be edited independently.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    /// Catalog product this line was built from (reference, not ownership).
    pub product_id: u64,
    pub name: String,
    pub code: String,
    pub qty: i64,
    pub rate: Money,
    pub discount: Discount,
    pub gst: TaxRate,
}

impl LineItem {
    /// Builds a one-unit line from the current catalog state of a product.
    pub fn from_product(product: &Product) -> Self {
        LineItem {
            product_id: product.id,
            name: product.name.clone(),
            code: product.code.clone(),
            qty: 1,
            rate: product.selling_price,
            discount: Discount::none(),
            gst: product.gst,
        }
    }

    /// Taxable amount: `qty × rate − discount`, with negative quantities
    /// treated as zero.
    pub fn amount(&self) -> Money {
        let gross = self.rate.multiply_quantity(self.qty.max(0));
        gross.apply_percentage_discount(self.discount)
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A settled invoice.
///
/// Created exactly once by settlement. Amounts are never recomputed; only
/// `status` may change afterwards (to `Cancelled`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Invoice {
    pub id: u64,

    /// `{prefix}{counter}`, e.g. `AKE-2026-1001`.
    pub invoice_no: String,

    /// Draft transaction id, used to make settlement retries idempotent.
    #[ts(as = "Option<String>")]
    pub txn_id: Option<Uuid>,

    #[ts(as = "String")]
    pub date: NaiveDate,

    pub customer_id: Option<u64>,
    pub customer_name: String,
    pub customer_mobile: String,
    pub customer_address: String,
    pub customer_gst: Option<String>,

    /// Lines in insertion order.
    pub items: Vec<LineItem>,

    pub subtotal: Money,
    pub gst_amount: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub shipping: Money,
    pub round_off: Money,
    pub grand_total: Money,
    pub paid: Money,
    pub balance: Money,
    pub payment_mode: PaymentMode,
    pub status: InvoiceStatus,
}

impl Invoice {
    /// The customer block as it was at settlement.
    pub fn customer(&self) -> CustomerSnapshot {
        CustomerSnapshot {
            customer_id: self.customer_id,
            name: self.customer_name.clone(),
            mobile: self.customer_mobile.clone(),
            address: self.customer_address.clone(),
            gst: self.customer_gst.clone(),
        }
    }

    /// Unpaid balance on a live (not cancelled) invoice.
    pub fn is_outstanding(&self) -> bool {
        !self.status.is_cancelled() && self.balance.is_positive()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.qty.max(0)).sum()
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Process-wide business settings.
///
/// Written by the settings form and by settlement, which advances
/// `current_invoice`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    // Business profile
    pub business_name: String,
    pub owner_name: String,
    pub mobile: String,
    pub alt_mobile: String,
    pub email: String,
    pub gst: String,
    pub pan: String,
    pub address: String,

    // Bank details
    pub bank_name: String,
    pub account_no: String,
    pub ifsc: String,
    pub upi: String,

    // Invoice numbering
    pub invoice_prefix: String,
    pub starting_invoice: u64,
    /// Next number to issue. Monotonically increasing.
    pub current_invoice: u64,

    // Pricing
    pub default_gst: TaxRate,
    pub enable_gst: bool,
    pub enable_discount: bool,
    pub enable_shipping: bool,
    pub round_off: bool,
    pub default_payment_mode: PaymentMode,

    // Print footer
    pub terms: String,
    pub notes: String,
}

impl Settings {
    /// Invoice number the next settlement will issue.
    ///
    /// ```rust
    /// use billbook_core::types::Settings;
    ///
    /// let settings = Settings::default();
    /// assert_eq!(settings.next_invoice_no(), "INV-1001");
    /// ```
    pub fn next_invoice_no(&self) -> String {
        format!("{}{}", self.invoice_prefix, self.current_invoice)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            business_name: String::new(),
            owner_name: String::new(),
            mobile: String::new(),
            alt_mobile: String::new(),
            email: String::new(),
            gst: String::new(),
            pan: String::new(),
            address: String::new(),
            bank_name: String::new(),
            account_no: String::new(),
            ifsc: String::new(),
            upi: String::new(),
            invoice_prefix: DEFAULT_INVOICE_PREFIX.to_string(),
            starting_invoice: DEFAULT_STARTING_INVOICE,
            current_invoice: DEFAULT_STARTING_INVOICE,
            default_gst: TaxRate::from_percent(18),
            enable_gst: true,
            enable_discount: true,
            enable_shipping: true,
            round_off: true,
            default_payment_mode: PaymentMode::Cash,
            terms: String::new(),
            notes: String::new(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
