//! # billbook-core: Pure Billing Logic for Billbook
//!
//! This crate is the **heart** of Billbook. It contains the GST invoice math,
//! settlement planning and report folds as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billbook Architecture                            │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │                    Billing UI (external)                         │   │
//! │  │    Product search ──► Invoice form ──► Print view ──► Reports    │   │
//! │  └─────────────────────────────┬────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼────────────────────────────────────┐   │
//! │  │               ★ billbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌──────────────┐  ┌──────────┐   │   │
//! │  │   │   types   │  │   money   │  │    draft     │  │ reports  │   │   │
//! │  │   │  Product  │  │   Money   │  │ InvoiceDraft │  │ Sales    │   │   │
//! │  │   │  Invoice  │  │  GST math │  │  calculator  │  │ GST, ... │   │   │
//! │  │   └───────────┘  └───────────┘  └──────────────┘  └──────────┘   │   │
//! │  │   ┌────────────┐  ┌────────────┐                                 │   │
//! │  │   │ settlement │  │ validation │                                 │   │
//! │  │   │  planning  │  │   rules    │                                 │   │
//! │  │   └────────────┘  └────────────┘                                 │   │
//! │  │                                                                  │   │
//! │  │   NO I/O • NO STORE • NO CLOCK • PURE FUNCTIONS                  │   │
//! │  └─────────────────────────────┬────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼────────────────────────────────────┐   │
//! │  │                 billbook-db (Persistence Layer)                  │   │
//! │  │     Key-value store, repositories, atomic settlement commit      │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Invoice, Settings, etc.)
//! - [`money`] - Money type with integer paise arithmetic
//! - [`draft`] - In-memory invoice draft and the pricing/tax calculator
//! - [`settlement`] - Pure settlement planning (invoice + stock + counter)
//! - [`reports`] - Read-only folds over invoices and products
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same draft and settings in, same totals out
//! 2. **No I/O**: the store, the file system and the clock are FORBIDDEN here
//! 3. **Integer Money**: amounts are paise (i64), rates are basis points
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use billbook_core::draft::InvoiceDraft;
//! use billbook_core::money::Money;
//! use billbook_core::types::{Product, Settings, TaxRate};
//!
//! let laptop = Product {
//!     id: 1,
//!     name: "HP Laptop 15s".to_string(),
//!     code: "HP-15S-001".to_string(),
//!     selling_price: Money::from_rupees(42000),
//!     gst: TaxRate::from_percent(18),
//!     stock: 8,
//!     ..Default::default()
//! };
//!
//! let mut draft = InvoiceDraft::new();
//! draft.add_item(&laptop).unwrap();
//! draft.add_item(&laptop).unwrap();
//!
//! let totals = draft.totals(&Settings::default());
//! assert_eq!(totals.subtotal, Money::from_rupees(84000));
//! assert_eq!(totals.gst_amount, Money::from_rupees(15120));
//! assert_eq!(totals.grand_total, Money::from_rupees(99120));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod draft;
pub mod error;
pub mod money;
pub mod reports;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use billbook_core::Money` instead of
// `use billbook_core::money::Money`

pub use draft::{InvoiceDraft, InvoiceTotals, LineUpdate, PricingOptions};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use settlement::{plan_settlement, SettlementPlan, SkippedLine, StockChange};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// GST slabs a product or default rate may take.
pub const GST_SLABS: [TaxRate; 5] = [
    TaxRate::from_percent(0),
    TaxRate::from_percent(5),
    TaxRate::from_percent(12),
    TaxRate::from_percent(18),
    TaxRate::from_percent(28),
];

/// Prefix used until the business configures its own.
pub const DEFAULT_INVOICE_PREFIX: &str = "INV-";

/// First invoice number of a fresh install.
pub const DEFAULT_STARTING_INVOICE: u64 = 1001;

/// Maximum distinct lines on a single invoice.
///
/// ## Business Reason
/// One printed invoice; anything longer is almost certainly a mistake.
pub const MAX_DRAFT_ITEMS: usize = 100;

/// Maximum quantity on a single line.
///
/// ## Business Reason
/// Catches a mistyped quantity (e.g. 10000 instead of 10) before it wipes
/// out the stock count.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Largest amount accepted for a price, rate, shipping charge or payment
/// (₹100 crore).
///
/// ## Business Reason
/// Far above any real shop bill, and low enough that
/// `MAX_DRAFT_ITEMS × MAX_ITEM_QUANTITY × MAX_AMOUNT` plus GST stays well
/// inside an i64 of paise.
pub const MAX_AMOUNT: Money = Money::from_rupees(1_000_000_000);
