//! # billbook-db: Persistence Layer for Billbook
//!
//! Stores the catalog, customers, invoices and settings, and commits
//! settlements atomically.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billbook Data Flow                               │
//! │                                                                         │
//! │  UI action (save invoice)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │                   billbook-db (THIS CRATE)                       │   │
//! │  │                                                                  │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐     │   │
//! │  │   │  Repositories │    │  Settlement   │    │ Audit / Seed │     │   │
//! │  │   │ product, ...  │    │  Engine       │    │              │     │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────┬───────┘     │   │
//! │  │           └────────────────────┼───────────────────┘             │   │
//! │  │                                ▼                                 │   │
//! │  │                     RecordStore<B: KvBackend>                    │   │
//! │  │                 (JSON collections, CAS batches)                  │   │
//! │  │                                │                                 │   │
//! │  │              ┌─────────────────┴─────────────────┐               │   │
//! │  │              ▼                                   ▼               │   │
//! │  │        MemBackend                          Database              │   │
//! │  │        (tests, demos)                      (SQLite kv_store)     │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - `KvBackend` trait and `WriteBatch`
//! - [`memory`] - In-memory backend
//! - [`pool`] - SQLite backend and connection pool
//! - [`migrations`] - Embedded database migrations
//! - [`store`] - Typed collections over a backend
//! - [`repository`] - Product, customer, invoice and settings operations
//! - [`settlement`] - Atomic, retry-safe invoice settlement
//! - [`audit`] - Consistency checks over stored state
//! - [`seed`] - Demo business data
//! - [`config`] - Config file and environment overrides
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use billbook_db::{BillbookConfig, Database, RecordStore};
//!
//! let config = BillbookConfig::load(None)?;
//! let db = Database::new(config.to_db_config()).await?;
//! let store = RecordStore::new(db);
//!
//! let laptop = store.products().get(1).await?;
//! let mut draft = InvoiceDraft::for_settings(&store.settings().await?);
//! draft.set_customer(CustomerSnapshot::walk_in("Raj Electronics"));
//! draft.add_item(&laptop)?;
//!
//! let settlement = store.settlement().settle(&draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;
pub mod settlement;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use audit::{AuditFinding, AuditReport};
pub use backend::{KvBackend, WriteBatch, WriteOp};
pub use config::BillbookConfig;
pub use error::{DbError, DbResult};
pub use memory::MemBackend;
pub use pool::{Database, DbConfig};
pub use seed::{seed_demo_data, SeedOutcome};
pub use settlement::{SettleError, SettleResult, Settlement, SettlementEngine};
pub use store::{Loaded, Record, RecordStore};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::invoice::{InvoiceFilter, InvoiceRepository};
pub use repository::product::ProductRepository;
pub use repository::settings::SettingsRepository;
