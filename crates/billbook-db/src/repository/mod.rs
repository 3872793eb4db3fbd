//! # Repository Module
//!
//! Validated operations over the record store collections.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layer                                     │
//! │                                                                         │
//! │  UI action                                                              │
//! │       │                                                                 │
//! │       │  store.products().add(product)                                  │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │  ├── validate_product(&product)    ← billbook-core rules                │
//! │  └── store.append(product)         ← one guarded write batch            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  KvBackend (memory or SQLite)                                           │
//! │                                                                         │
//! │  Repositories borrow the store; they are created per call and hold      │
//! │  no state of their own.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD, search, low stock
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer CRUD and search
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Listing, filtering, cancellation
//! - [`SettingsRepository`](settings::SettingsRepository) - Validated settings form

pub mod customer;
pub mod invoice;
pub mod product;
pub mod settings;

/// Case-insensitive substring match used by every search.
pub(crate) fn matches_query(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
