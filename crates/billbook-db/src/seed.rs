//! # Demo Data
//!
//! First-run sample business: settings, six products, three customers and
//! two settled invoices.
//!
//! ## Seeding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  is_seeded? ── yes (and not forced) ──► AlreadySeeded, nothing written  │
//! │      │ no                                                               │
//! │      ▼                                                                  │
//! │  WriteBatch                                                             │
//! │    expect seeded == raw                                                 │
//! │    put settings, products, customers, invoices, seeded = true           │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Seeded { products: 6, customers: 3, invoices: 2 }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The demo counter starts at 1003 because 1001 and 1002 are already issued.

use billbook_core::{
    Customer, CustomerType, Discount, Invoice, InvoiceStatus, LineItem, Money, PaymentMode,
    Product, Settings, TaxRate,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::{KvBackend, WriteBatch};
use crate::error::{DbError, DbResult};
use crate::store::{
    RecordStore, CUSTOMERS_KEY, INVOICES_KEY, PRODUCTS_KEY, SEEDED_KEY, SETTINGS_KEY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SeedOutcome {
    Seeded {
        products: usize,
        customers: usize,
        invoices: usize,
    },
    AlreadySeeded,
}

/// Writes the demo business unless the store was already seeded.
///
/// With `force` the demo data replaces whatever is stored.
pub async fn seed_demo_data<B: KvBackend>(
    store: &RecordStore<B>,
    force: bool,
) -> DbResult<SeedOutcome> {
    let seeded = store.load::<bool>(SEEDED_KEY).await?;
    if seeded.value && !force {
        info!("Store already seeded, skipping demo data");
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let products = demo_products();
    let customers = demo_customers();
    let invoices = demo_invoices()?;

    let mut batch = WriteBatch::new();
    batch
        .expect(SEEDED_KEY, seeded.raw)
        .put(
            SETTINGS_KEY,
            RecordStore::<B>::encode(SETTINGS_KEY, &demo_settings())?,
        )
        .put(PRODUCTS_KEY, RecordStore::<B>::encode(PRODUCTS_KEY, &products)?)
        .put(CUSTOMERS_KEY, RecordStore::<B>::encode(CUSTOMERS_KEY, &customers)?)
        .put(INVOICES_KEY, RecordStore::<B>::encode(INVOICES_KEY, &invoices)?)
        .put(SEEDED_KEY, "true");
    store.commit(batch).await?;

    info!(
        products = products.len(),
        customers = customers.len(),
        invoices = invoices.len(),
        force,
        "Demo data seeded"
    );

    Ok(SeedOutcome::Seeded {
        products: products.len(),
        customers: customers.len(),
        invoices: invoices.len(),
    })
}

// =============================================================================
// Records
// =============================================================================

pub fn demo_settings() -> Settings {
    Settings {
        business_name: "AK Enterprises".to_string(),
        owner_name: "Anil Kumar".to_string(),
        mobile: "9876543210".to_string(),
        email: "ak@akenterprises.com".to_string(),
        gst: "27AABCU9603R1ZX".to_string(),
        pan: "AABCU9603R".to_string(),
        address: "123, Main Market, Pune, Maharashtra - 411001".to_string(),
        bank_name: "State Bank of India".to_string(),
        account_no: "1234567890".to_string(),
        ifsc: "SBIN0001234".to_string(),
        upi: "ak@upi".to_string(),
        invoice_prefix: "AKE-2026-".to_string(),
        starting_invoice: 1001,
        current_invoice: 1003,
        terms: "1. Goods once sold will not be taken back.\n\
                2. Subject to local jurisdiction.\n\
                3. E. & O.E."
            .to_string(),
        notes: "Thank you for your business!".to_string(),
        ..Default::default()
    }
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: u64,
    name: &str,
    code: &str,
    category: &str,
    hsn: &str,
    (purchase, selling): (i64, i64),
    gst: u32,
    (stock, min_stock): (i64, i64),
    unit: &str,
    supplier: &str,
) -> Product {
    Product {
        id,
        name: name.to_string(),
        code: code.to_string(),
        category: category.to_string(),
        hsn: hsn.to_string(),
        purchase_price: Money::from_rupees(purchase),
        selling_price: Money::from_rupees(selling),
        gst: TaxRate::from_percent(gst),
        stock,
        min_stock,
        unit: unit.to_string(),
        supplier: supplier.to_string(),
    }
}

pub fn demo_products() -> Vec<Product> {
    vec![
        product(1, "HP Laptop 15s", "HP-15S-001", "Electronics", "8471", (35000, 42000), 18, (15, 3), "Nos", "HP Distributors"),
        product(2, "Dell Mouse Wireless", "DELL-MS-001", "Accessories", "8471", (450, 750), 18, (45, 10), "Nos", "Dell India"),
        product(3, "USB-C Hub 7-in-1", "USB-HUB-001", "Accessories", "8536", (800, 1499), 18, (30, 5), "Nos", "AmazonBasics"),
        product(4, "A4 Paper Ream 500 Sheets", "A4-PAPER-001", "Stationery", "4802", (180, 280), 12, (200, 50), "Box", "Paper World"),
        product(5, "Printer Ink Cartridge Black", "INK-BLK-001", "Stationery", "3215", (320, 550), 18, (2, 5), "Nos", "HP Distributors"),
        product(6, "Hdmi Cable 2m", "HDMI-2M-001", "Cables", "8544", (120, 299), 18, (60, 10), "Nos", "Generic"),
    ]
}

pub fn demo_customers() -> Vec<Customer> {
    let customer = |id, name: &str, mobile: &str, address: &str, gst: Option<&str>, kind| Customer {
        id,
        name: name.to_string(),
        mobile: mobile.to_string(),
        address: address.to_string(),
        gst: gst.map(str::to_string),
        customer_type: kind,
    };

    vec![
        customer(1, "Raj Electronics", "9011223344", "Pune", Some("27RAJEL1234A1Z5"), CustomerType::Wholesale),
        customer(2, "Suresh Kumar", "9822334455", "Mumbai", None, CustomerType::Retail),
        customer(3, "City Computers", "9733445566", "Nashik", Some("27CITYC5678B1Z3"), CustomerType::Wholesale),
    ]
}

fn line(product: &Product, qty: i64) -> LineItem {
    LineItem {
        qty,
        discount: Discount::none(),
        ..LineItem::from_product(product)
    }
}

fn date(y: i32, m: u32, d: u32) -> DbResult<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| DbError::Internal(format!("invalid demo date {}-{}-{}", y, m, d)))
}

pub fn demo_invoices() -> DbResult<Vec<Invoice>> {
    let products = demo_products();
    let customers = demo_customers();
    let (laptop, mouse, hub) = (&products[0], &products[1], &products[2]);
    let (raj, suresh) = (&customers[0], &customers[1]);

    let with_customer = |customer: &Customer| Invoice {
        customer_id: Some(customer.id),
        customer_name: customer.name.clone(),
        customer_mobile: customer.mobile.clone(),
        customer_address: customer.address.clone(),
        customer_gst: customer.gst.clone(),
        ..Default::default()
    };

    Ok(vec![
        Invoice {
            id: 1,
            invoice_no: "AKE-2026-1001".to_string(),
            date: date(2026, 2, 10)?,
            items: vec![line(laptop, 2)],
            subtotal: Money::from_rupees(84000),
            gst_amount: Money::from_rupees(15120),
            cgst: Money::from_rupees(7560),
            sgst: Money::from_rupees(7560),
            shipping: Money::zero(),
            round_off: Money::zero(),
            grand_total: Money::from_rupees(99120),
            paid: Money::from_rupees(99120),
            balance: Money::zero(),
            payment_mode: PaymentMode::BankTransfer,
            status: InvoiceStatus::Paid,
            ..with_customer(raj)
        },
        Invoice {
            id: 2,
            invoice_no: "AKE-2026-1002".to_string(),
            date: date(2026, 2, 15)?,
            items: vec![line(mouse, 3), line(hub, 1)],
            subtotal: Money::from_rupees(3749),
            gst_amount: Money::from_paise(67482),
            cgst: Money::from_paise(33741),
            sgst: Money::from_paise(33741),
            shipping: Money::from_rupees(50),
            round_off: Money::from_paise(18),
            grand_total: Money::from_rupees(4474),
            paid: Money::from_rupees(2000),
            balance: Money::from_rupees(2474),
            payment_mode: PaymentMode::Cash,
            status: InvoiceStatus::Partial,
            ..with_customer(suresh)
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit;
    use crate::memory::MemBackend;
    use billbook_core::validation::{validate_customer, validate_product, validate_settings};

    #[test]
    fn test_demo_records_are_valid() {
        validate_settings(&demo_settings()).unwrap();
        for product in demo_products() {
            validate_product(&product).unwrap();
        }
        for customer in demo_customers() {
            validate_customer(&customer).unwrap();
        }
    }

    #[test]
    fn test_demo_invoices_pass_audit() {
        let report = audit::check(&demo_settings(), &demo_invoices().unwrap());
        assert!(report.is_clean(), "{:?}", report.findings);
    }

    #[tokio::test]
    async fn test_seed_once() {
        let store = RecordStore::new(MemBackend::new());

        let first = seed_demo_data(&store, false).await.unwrap();
        assert_eq!(
            first,
            SeedOutcome::Seeded {
                products: 6,
                customers: 3,
                invoices: 2,
            }
        );
        assert!(store.is_seeded().await.unwrap());
        assert_eq!(store.settings().await.unwrap().next_invoice_no(), "AKE-2026-1003");

        let commits = store.backend().commit_count();
        let second = seed_demo_data(&store, false).await.unwrap();
        assert_eq!(second, SeedOutcome::AlreadySeeded);
        assert_eq!(store.backend().commit_count(), commits);
    }

    #[tokio::test]
    async fn test_force_restores_demo_data() {
        let store = RecordStore::new(MemBackend::new());
        seed_demo_data(&store, false).await.unwrap();
        store.remove::<Product>(1).await.unwrap();

        seed_demo_data(&store, true).await.unwrap();
        assert_eq!(store.get_all::<Product>().await.unwrap().len(), 6);
    }
}
