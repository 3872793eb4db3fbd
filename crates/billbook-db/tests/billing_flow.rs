use std::sync::atomic::{AtomicBool, Ordering};

use billbook_core::reports::{gst_report, outstanding_report, sales_report, DateRange};
use billbook_core::{InvoiceDraft, InvoiceStatus, LineUpdate, Money, PaymentMode, Settings};
use billbook_db::store::{INVOICES_KEY, SETTINGS_KEY};
use billbook_db::{
    audit, seed_demo_data, Database, DbConfig, DbResult, KvBackend, MemBackend, RecordStore,
    SettleError, WriteBatch,
};
use chrono::NaiveDate;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seeded_memory_store() -> RecordStore<MemBackend> {
    let store = RecordStore::new(MemBackend::new());
    seed_demo_data(&store, false).await.unwrap();
    store
}

/// Three ink cartridges for City Computers; only two are in stock.
async fn ink_draft<B: KvBackend>(store: &RecordStore<B>) -> InvoiceDraft {
    let settings = store.settings().await.unwrap();
    let ink = store.products().get(5).await.unwrap();
    let city = store.customers().get(3).await.unwrap();

    let mut draft = InvoiceDraft::for_settings(&settings);
    draft.select_customer(&city);
    draft.add_item(&ink).unwrap();
    draft.update_item(ink.id, LineUpdate::Qty(3)).unwrap();
    draft
}

// =============================================================================
// Memory backend
// =============================================================================

#[tokio::test]
async fn test_settle_on_demo_data() {
    let store = seeded_memory_store().await;
    let draft = ink_draft(&store).await;

    let settlement = store
        .settlement()
        .settle_on(&draft, date(2026, 2, 20))
        .await
        .unwrap();

    let invoice = &settlement.invoice;
    assert_eq!(invoice.invoice_no, "AKE-2026-1003");
    assert_eq!(invoice.customer_gst.as_deref(), Some("27CITYC5678B1Z3"));
    assert_eq!(invoice.subtotal, Money::from_rupees(1650));
    assert_eq!(invoice.cgst, Money::from_paise(14850));
    assert_eq!(invoice.gst_amount, Money::from_rupees(297));
    assert_eq!(invoice.grand_total, Money::from_rupees(1947));
    assert_eq!(invoice.payment_mode, PaymentMode::Cash);
    assert_eq!(invoice.status, InvoiceStatus::Unpaid);

    // Stock floors at zero and the change says so
    assert_eq!(settlement.stock_changes.len(), 1);
    assert!(settlement.stock_changes[0].was_floored());
    assert_eq!(store.products().get(5).await.unwrap().stock, 0);

    assert_eq!(store.settings().await.unwrap().current_invoice, 1004);
    assert!(audit::audit(&store).await.unwrap().is_clean());
}

#[tokio::test]
async fn test_reports_follow_settlement_and_cancellation() {
    let store = seeded_memory_store().await;
    let draft = ink_draft(&store).await;
    store
        .settlement()
        .settle_on(&draft, date(2026, 2, 20))
        .await
        .unwrap();

    let february = DateRange::month_of(date(2026, 2, 1));
    let invoices = store.invoices().list().await.unwrap();

    let sales = sales_report(&invoices, february);
    assert_eq!(sales.invoice_count, 3);
    assert_eq!(sales.total_sales, Money::from_rupees(99120 + 4474 + 1947));
    assert_eq!(
        outstanding_report(&invoices, february).total_due,
        Money::from_rupees(2474 + 1947)
    );

    store.invoices().cancel(2).await.unwrap();
    let invoices = store.invoices().list().await.unwrap();

    assert_eq!(
        outstanding_report(&invoices, february).total_due,
        Money::from_rupees(1947)
    );
    let gst = gst_report(&invoices, february);
    assert_eq!(gst.rows.len(), 2);
    assert_eq!(gst.total_gst, Money::from_rupees(15120 + 297));

    // Cancelling leaves stock as it was
    assert_eq!(store.products().get(2).await.unwrap().stock, 45);
}

/// Lets another writer advance the invoice counter between the settlement's
/// read and its commit, once.
struct RacingBackend {
    inner: MemBackend,
    armed: AtomicBool,
}

impl KvBackend for RacingBackend {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn commit(&self, batch: WriteBatch) -> DbResult<()> {
        if batch.keys().contains(&INVOICES_KEY) && self.armed.swap(false, Ordering::SeqCst) {
            let raw = self.inner.get(SETTINGS_KEY).await?.unwrap_or_default();
            let mut settings: Settings = serde_json::from_str(&raw).unwrap_or_default();
            settings.current_invoice += 1;
            self.inner
                .insert_raw(SETTINGS_KEY, &serde_json::to_string(&settings).unwrap())
                .await;
        }
        self.inner.commit(batch).await
    }
}

#[tokio::test]
async fn test_concurrent_change_aborts_settlement() {
    let store = RecordStore::new(RacingBackend {
        inner: MemBackend::new(),
        armed: AtomicBool::new(false),
    });
    seed_demo_data(&store, false).await.unwrap();
    let draft = ink_draft(&store).await;

    store.backend().armed.store(true, Ordering::SeqCst);
    let err = store
        .settlement()
        .settle_on(&draft, date(2026, 2, 20))
        .await
        .unwrap_err();

    assert!(matches!(err, SettleError::Consistency { .. }));
    assert_eq!(store.invoices().list().await.unwrap().len(), 2);
    assert_eq!(store.products().get(5).await.unwrap().stock, 2);

    // A retry reads fresh state and takes the next free number
    let settlement = store
        .settlement()
        .settle_on(&draft, date(2026, 2, 20))
        .await
        .unwrap();
    assert_eq!(settlement.invoice.invoice_no, "AKE-2026-1004");
    assert!(audit::audit(&store).await.unwrap().is_clean());
}

// =============================================================================
// SQLite backend
// =============================================================================

#[tokio::test]
async fn test_sqlite_settlement_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("billbook.db");

    let draft = {
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let store = RecordStore::new(db);
        seed_demo_data(&store, false).await.unwrap();

        let draft = ink_draft(&store).await;
        store
            .settlement()
            .settle_on(&draft, date(2026, 2, 20))
            .await
            .unwrap();
        store.into_backend().close().await;
        draft
    };

    let db = Database::new(DbConfig::new(&path)).await.unwrap();
    let store = RecordStore::new(db);

    let invoice = store
        .invoices()
        .find_by_number("AKE-2026-1003")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invoice.txn_id, Some(draft.txn_id()));
    assert_eq!(store.settings().await.unwrap().current_invoice, 1004);

    // Settling the same draft after a restart does not issue a second invoice
    let replay = store
        .settlement()
        .settle_on(&draft, date(2026, 2, 21))
        .await
        .unwrap();
    assert!(replay.replayed);
    assert_eq!(replay.invoice, invoice);
    assert_eq!(store.invoices().list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_sqlite_seed_is_guarded() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let store = RecordStore::new(db);

    seed_demo_data(&store, false).await.unwrap();
    store.products().remove(6).await.unwrap();

    // A second run leaves user edits alone
    seed_demo_data(&store, false).await.unwrap();
    assert_eq!(store.products().list().await.unwrap().len(), 5);
}
