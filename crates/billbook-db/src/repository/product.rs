//! # Product Repository
//!
//! Catalog operations for products.
//!
//! ## Key Operations
//! - Validated add / update
//! - Case-insensitive search across name, code and category
//! - Low-stock listing
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Product Search Works                             │
//! │                                                                         │
//! │  User types: "hub"                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Lowercased substring match on: name, code, category                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HP-15S-001  | HP Laptop 15s     | Electronics                          │
//! │  USB-HUB-001 | USB-C Hub 7-in-1  | Accessories  ← MATCH!                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  First `limit` matches, catalog order                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billbook_core::validation::{validate_product, validate_search_query};
use billbook_core::Product;
use tracing::{debug, info};

use crate::backend::KvBackend;
use crate::error::{DbError, DbResult};
use crate::repository::matches_query;
use crate::store::RecordStore;

/// Repository for catalog products.
///
/// ## Usage
/// ```rust,ignore
/// let results = store.products().search("hub", 6).await?;
/// let laptop = store.products().get(1).await?;
/// ```
#[derive(Debug)]
pub struct ProductRepository<'a, B> {
    store: &'a RecordStore<B>,
}

impl<'a, B: KvBackend> ProductRepository<'a, B> {
    pub fn new(store: &'a RecordStore<B>) -> Self {
        ProductRepository { store }
    }

    /// All products in catalog order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        self.store.get_all().await
    }

    /// Gets a product by id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No product with this id
    pub async fn get(&self, id: u64) -> DbResult<Product> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Adds a product; the id is assigned by the store.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Stored product with its id
    /// * `Err(DbError::Rejected)` - Name or code missing, negative price or
    ///   stock, GST outside the slab set
    pub async fn add(&self, product: Product) -> DbResult<Product> {
        validate_product(&product)?;

        let product = self.store.append(product).await?;
        info!(id = product.id, code = %product.code, "Product added");
        Ok(product)
    }

    /// Saves an edited product. The id identifies the record and never changes.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        validate_product(product)?;

        self.store.update(product).await?;
        debug!(id = product.id, "Product updated");
        Ok(())
    }

    /// Deletes a product. Invoices keep their snapshot of it.
    pub async fn remove(&self, id: u64) -> DbResult<Product> {
        let removed = self.store.remove::<Product>(id).await?;
        info!(id, code = %removed.code, "Product removed");
        Ok(removed)
    }

    /// Searches by name, code or category.
    ///
    /// An empty query returns the first `limit` products.
    pub async fn search(&self, query: &str, limit: usize) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?.to_lowercase();

        debug!(query = %query, limit, "Searching products");

        let products = self
            .list()
            .await?
            .into_iter()
            .filter(|p| {
                query.is_empty()
                    || matches_query(&p.name, &query)
                    || matches_query(&p.code, &query)
                    || matches_query(&p.category, &query)
            })
            .take(limit)
            .collect();

        Ok(products)
    }

    /// Products at or below their minimum stock.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        Ok(billbook_core::reports::low_stock(&self.list().await?))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
