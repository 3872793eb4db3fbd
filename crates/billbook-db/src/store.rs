//! # Record Store
//!
//! Typed collections over a [`KvBackend`].
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         RecordStore<B>                                  │
//! │                                                                         │
//! │   key          type              missing key reads as                   │
//! │   ─────────    ──────────────    ────────────────────                   │
//! │   settings     Settings          Settings::default()                    │
//! │   products     Vec<Product>      []                                     │
//! │   customers    Vec<Customer>     []                                     │
//! │   invoices     Vec<Invoice>      []                                     │
//! │   seeded       bool              false                                  │
//! │                                                                         │
//! │   A value that is present but does not parse is an error, never an      │
//! │   empty collection.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every write is a single [`WriteBatch`] guarded by the raw value it was
//! computed from, so a write based on a stale read fails with
//! [`DbError::Conflict`] instead of silently dropping someone else's change.

use billbook_core::{Customer, Invoice, Product, Settings};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::backend::{KvBackend, WriteBatch};
use crate::error::{DbError, DbResult};
use crate::repository::customer::CustomerRepository;
use crate::repository::invoice::InvoiceRepository;
use crate::repository::product::ProductRepository;
use crate::repository::settings::SettingsRepository;
use crate::settlement::SettlementEngine;

// =============================================================================
// Keys
// =============================================================================

pub const SETTINGS_KEY: &str = "settings";
pub const PRODUCTS_KEY: &str = "products";
pub const CUSTOMERS_KEY: &str = "customers";
pub const INVOICES_KEY: &str = "invoices";
pub const SEEDED_KEY: &str = "seeded";

// =============================================================================
// Record
// =============================================================================

/// A record kept in an id-keyed collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Store key of the collection.
    const KEY: &'static str;
    /// Entity name for error messages.
    const ENTITY: &'static str;

    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
}

impl Record for Product {
    const KEY: &'static str = PRODUCTS_KEY;
    const ENTITY: &'static str = "Product";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Record for Customer {
    const KEY: &'static str = CUSTOMERS_KEY;
    const ENTITY: &'static str = "Customer";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

impl Record for Invoice {
    const KEY: &'static str = INVOICES_KEY;
    const ENTITY: &'static str = "Invoice";

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
}

/// `max(id) + 1`, or 1 for an empty collection.
pub fn next_id_of<R: Record>(records: &[R]) -> u64 {
    records.iter().map(Record::id).max().map_or(1, |max| max + 1)
}

// =============================================================================
// Loaded
// =============================================================================

/// A decoded value together with the raw text it was decoded from.
///
/// The raw text is what a later write must expect to still be there.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub raw: Option<String>,
    pub value: T,
}

// =============================================================================
// Record Store
// =============================================================================

/// Persistent collections for products, customers, invoices and settings.
///
/// ## Usage
/// ```rust,ignore
/// let store = RecordStore::new(MemBackend::new());
/// let product = store.append(product).await?;
/// let all: Vec<Product> = store.get_all().await?;
/// ```
#[derive(Debug)]
pub struct RecordStore<B> {
    backend: B,
}

impl<B: KvBackend> RecordStore<B> {
    pub fn new(backend: B) -> Self {
        RecordStore { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    // -------------------------------------------------------------------------
    // Raw access
    // -------------------------------------------------------------------------

    /// Reads and decodes `key`, falling back to `T::default()` when absent.
    pub async fn load<T>(&self, key: &str) -> DbResult<Loaded<T>>
    where
        T: DeserializeOwned + Default,
    {
        let raw = self.backend.get(key).await?;
        let value = match raw.as_deref() {
            Some(text) => serde_json::from_str(text).map_err(|e| DbError::malformed(key, e))?,
            None => T::default(),
        };
        Ok(Loaded { raw, value })
    }

    /// Encodes a value for storage under `key`.
    pub fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> DbResult<String> {
        serde_json::to_string(value).map_err(|e| DbError::malformed(key, e))
    }

    /// Replaces `key` if it still holds `expected`.
    async fn replace<T: Serialize + ?Sized>(
        &self,
        key: &str,
        expected: Option<String>,
        value: &T,
    ) -> DbResult<()> {
        let mut batch = WriteBatch::new();
        batch.expect(key, expected).put(key, Self::encode(key, value)?);
        self.backend.commit(batch).await
    }

    /// Applies a prepared batch.
    pub async fn commit(&self, batch: WriteBatch) -> DbResult<()> {
        self.backend.commit(batch).await
    }

    // -------------------------------------------------------------------------
    // Collections
    // -------------------------------------------------------------------------

    pub async fn get_all<R: Record>(&self) -> DbResult<Vec<R>> {
        Ok(self.load::<Vec<R>>(R::KEY).await?.value)
    }

    pub async fn get<R: Record>(&self, id: u64) -> DbResult<Option<R>> {
        let records: Vec<R> = self.get_all().await?;
        Ok(records.into_iter().find(|r| r.id() == id))
    }

    /// Overwrites a whole collection.
    pub async fn set_all<R: Record>(&self, records: &[R]) -> DbResult<()> {
        let current = self.load::<Vec<R>>(R::KEY).await?;
        self.replace(R::KEY, current.raw, records).await?;
        debug!(key = R::KEY, count = records.len(), "Collection replaced");
        Ok(())
    }

    /// Appends a record with the next free id and returns it.
    pub async fn append<R: Record>(&self, mut record: R) -> DbResult<R> {
        let Loaded { raw, value: mut records } = self.load::<Vec<R>>(R::KEY).await?;

        record.set_id(next_id_of(&records));
        records.push(record.clone());
        self.replace(R::KEY, raw, &records).await?;

        debug!(key = R::KEY, id = record.id(), "Record appended");
        Ok(record)
    }

    /// Replaces the record with the same id.
    pub async fn update<R: Record>(&self, record: &R) -> DbResult<()> {
        let Loaded { raw, value: mut records } = self.load::<Vec<R>>(R::KEY).await?;

        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| DbError::not_found(R::ENTITY, record.id()))?;
        *slot = record.clone();
        self.replace(R::KEY, raw, &records).await?;

        debug!(key = R::KEY, id = record.id(), "Record updated");
        Ok(())
    }

    /// Removes the record with `id`, returning it.
    pub async fn remove<R: Record>(&self, id: u64) -> DbResult<R> {
        let Loaded { raw, value: mut records } = self.load::<Vec<R>>(R::KEY).await?;

        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| DbError::not_found(R::ENTITY, id))?;
        let removed = records.remove(index);
        self.replace(R::KEY, raw, &records).await?;

        debug!(key = R::KEY, id, "Record removed");
        Ok(removed)
    }

    pub async fn next_id<R: Record>(&self) -> DbResult<u64> {
        let records: Vec<R> = self.get_all().await?;
        Ok(next_id_of(&records))
    }

    // -------------------------------------------------------------------------
    // Settings and seed flag
    // -------------------------------------------------------------------------

    pub async fn settings(&self) -> DbResult<Settings> {
        Ok(self.load::<Settings>(SETTINGS_KEY).await?.value)
    }

    /// Writes settings as given, provided the stored value is still
    /// `expected` (the `raw` of an earlier [`load`](Self::load)). Fails with
    /// [`DbError::Conflict`] otherwise. Use [`SettingsRepository::save`] for
    /// the validated path.
    pub async fn replace_settings(
        &self,
        expected: Option<String>,
        settings: &Settings,
    ) -> DbResult<()> {
        self.replace(SETTINGS_KEY, expected, settings).await
    }

    pub async fn is_seeded(&self) -> DbResult<bool> {
        Ok(self.load::<bool>(SEEDED_KEY).await?.value)
    }

    pub async fn mark_seeded(&self) -> DbResult<()> {
        let mut batch = WriteBatch::new();
        batch.put(SEEDED_KEY, "true");
        self.backend.commit(batch).await
    }

    // -------------------------------------------------------------------------
    // Repositories
    // -------------------------------------------------------------------------

    pub fn products(&self) -> ProductRepository<'_, B> {
        ProductRepository::new(self)
    }

    pub fn customers(&self) -> CustomerRepository<'_, B> {
        CustomerRepository::new(self)
    }

    pub fn invoices(&self) -> InvoiceRepository<'_, B> {
        InvoiceRepository::new(self)
    }

    pub fn business_settings(&self) -> SettingsRepository<'_, B> {
        SettingsRepository::new(self)
    }

    pub fn settlement(&self) -> SettlementEngine<'_, B> {
        SettlementEngine::new(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemBackend;
    use billbook_core::Money;

    fn product(name: &str) -> Product {
        Product {
            name: name.to_string(),
            code: name.to_uppercase(),
            selling_price: Money::from_rupees(10),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_keys_read_as_defaults() {
        let store = RecordStore::new(MemBackend::new());

        assert!(store.get_all::<Product>().await.unwrap().is_empty());
        assert_eq!(store.settings().await.unwrap(), Settings::default());
        assert!(!store.is_seeded().await.unwrap());
        assert_eq!(store.next_id::<Invoice>().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_append_assigns_max_plus_one() {
        let store = RecordStore::new(MemBackend::new());

        let first = store.append(product("pen")).await.unwrap();
        let second = store.append(product("ink")).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        store.remove::<Product>(1).await.unwrap();
        // Ids are not reused below the current maximum
        let third = store.append(product("hub")).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_update_and_remove_missing_record() {
        let store = RecordStore::new(MemBackend::new());
        let mut pen = store.append(product("pen")).await.unwrap();

        pen.stock = 40;
        store.update(&pen).await.unwrap();
        assert_eq!(store.get::<Product>(pen.id).await.unwrap().unwrap().stock, 40);

        let ghost = Product {
            id: 99,
            ..product("ghost")
        };
        assert!(matches!(
            store.update(&ghost).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            store.remove::<Product>(99).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_value_is_an_error() {
        let backend = MemBackend::new();
        backend.insert_raw(PRODUCTS_KEY, "{not json").await;
        let store = RecordStore::new(backend);

        assert!(matches!(
            store.get_all::<Product>().await,
            Err(DbError::Serialization { .. })
        ));
    }

    #[tokio::test]
    async fn test_seed_flag() {
        let store = RecordStore::new(MemBackend::new());
        store.mark_seeded().await.unwrap();
        assert!(store.is_seeded().await.unwrap());
    }

    #[tokio::test]
    async fn test_set_all_replaces_collection() {
        let store = RecordStore::new(MemBackend::new());
        store.append(product("pen")).await.unwrap();

        let replacement = vec![Product {
            id: 7,
            ..product("hub")
        }];
        store.set_all(&replacement).await.unwrap();

        assert_eq!(store.get_all::<Product>().await.unwrap(), replacement);
        assert_eq!(store.next_id::<Product>().await.unwrap(), 8);
    }
}
