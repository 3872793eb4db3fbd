//! # Customer Repository
//!
//! Customer list operations. Invoices copy customer details at settlement,
//! so edits here never change an issued invoice.

use billbook_core::validation::{validate_customer, validate_search_query};
use billbook_core::Customer;
use tracing::{debug, info};

use crate::backend::KvBackend;
use crate::error::{DbError, DbResult};
use crate::repository::matches_query;
use crate::store::RecordStore;

#[derive(Debug)]
pub struct CustomerRepository<'a, B> {
    store: &'a RecordStore<B>,
}

impl<'a, B: KvBackend> CustomerRepository<'a, B> {
    pub fn new(store: &'a RecordStore<B>) -> Self {
        CustomerRepository { store }
    }

    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        self.store.get_all().await
    }

    pub async fn get(&self, id: u64) -> DbResult<Customer> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Adds a customer. Name and mobile are required; a GSTIN, when given,
    /// must be well formed.
    pub async fn add(&self, customer: Customer) -> DbResult<Customer> {
        validate_customer(&customer)?;

        let customer = self.store.append(customer).await?;
        info!(id = customer.id, "Customer added");
        Ok(customer)
    }

    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        validate_customer(customer)?;

        self.store.update(customer).await?;
        debug!(id = customer.id, "Customer updated");
        Ok(())
    }

    pub async fn remove(&self, id: u64) -> DbResult<Customer> {
        let removed = self.store.remove::<Customer>(id).await?;
        info!(id, "Customer removed");
        Ok(removed)
    }

    /// Searches by name substring (case-insensitive) or mobile substring.
    pub async fn search(&self, query: &str, limit: usize) -> DbResult<Vec<Customer>> {
        let query = validate_search_query(query)?.to_lowercase();

        let customers = self
            .list()
            .await?
            .into_iter()
            .filter(|c| {
                query.is_empty() || matches_query(&c.name, &query) || c.mobile.contains(&query)
            })
            .take(limit)
            .collect();

        Ok(customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemBackend;
    use billbook_core::CustomerType;

    fn customer(name: &str, mobile: &str, gst: Option<&str>) -> Customer {
        Customer {
            name: name.to_string(),
            mobile: mobile.to_string(),
            address: "Pune".to_string(),
            gst: gst.map(str::to_string),
            customer_type: CustomerType::Retail,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_and_search() {
        let store = RecordStore::new(MemBackend::new());
        let repo = store.customers();

        repo.add(customer("Raj Electronics", "9011223344", Some("27RAJEL1234A1Z5")))
            .await
            .unwrap();
        repo.add(customer("Suresh Kumar", "9822334455", None))
            .await
            .unwrap();

        assert_eq!(repo.search("raj", 5).await.unwrap().len(), 1);
        assert_eq!(repo.search("98223", 5).await.unwrap()[0].name, "Suresh Kumar");
        assert_eq!(repo.search("", 5).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_requires_name_and_mobile() {
        let store = RecordStore::new(MemBackend::new());
        let repo = store.customers();

        assert!(repo.add(customer("", "9011223344", None)).await.is_err());
        assert!(repo.add(customer("Walk In", "", None)).await.is_err());
        assert!(repo
            .add(customer("Bad GST", "9011223344", Some("12345")))
            .await
            .is_err());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let store = RecordStore::new(MemBackend::new());
        let repo = store.customers();

        let mut suresh = repo
            .add(customer("Suresh Kumar", "9822334455", None))
            .await
            .unwrap();
        suresh.address = "Mumbai".to_string();
        repo.update(&suresh).await.unwrap();
        assert_eq!(repo.get(suresh.id).await.unwrap().address, "Mumbai");

        repo.remove(suresh.id).await.unwrap();
        assert!(matches!(
            repo.get(suresh.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
