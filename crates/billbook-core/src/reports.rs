//! # Reports
//!
//! Read-only folds over settled invoices and the product catalog.
//!
//! ## Report Catalog
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Reports                                        │
//! │                                                                         │
//! │  Report        Input                 Rows                 Totals        │
//! │  ──────        ─────                 ────                 ──────        │
//! │  Sales         invoices in range     every invoice        sales, paid,  │
//! │                                                           balance, gst  │
//! │  GST           invoices in range     live invoices        taxable,      │
//! │                                                           cgst, sgst    │
//! │  Stock         products              every product        value         │
//! │  Outstanding   invoices in range     balance > 0          dues          │
//! │  Dashboard     invoices + products   -                    today, month, │
//! │                                                           profit, dues  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cancelled Invoices
//! A cancelled invoice keeps its amounts but no longer counts: it is listed
//! in the sales report with its status and skipped by every sum.
//!
//! All functions take `today` explicitly; nothing here reads the clock.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Invoice, InvoiceStatus, PaymentMode, Product, Settings, TaxRate};

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive calendar date range, `from <= date <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `from > to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::InvertedRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(DateRange { from, to })
    }

    /// A single day.
    pub fn day(date: NaiveDate) -> Self {
        DateRange {
            from: date,
            to: date,
        }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let from = date.with_day(1).unwrap_or(date);
        let to = from
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        DateRange { from, to }
    }

    /// Every representable date.
    pub fn all() -> Self {
        DateRange {
            from: NaiveDate::MIN,
            to: NaiveDate::MAX,
        }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

fn live_in<'a>(
    invoices: &'a [Invoice],
    range: DateRange,
) -> impl Iterator<Item = &'a Invoice> + 'a {
    invoices
        .iter()
        .filter(move |inv| range.contains(inv.date) && !inv.status.is_cancelled())
}

// =============================================================================
// Sales Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesRow {
    pub invoice_id: u64,
    pub invoice_no: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub customer_name: String,
    pub subtotal: Money,
    pub gst_amount: Money,
    pub grand_total: Money,
    pub paid: Money,
    pub balance: Money,
    pub payment_mode: PaymentMode,
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub rows: Vec<SalesRow>,
    /// Invoices counted in the totals (cancelled excluded).
    pub invoice_count: usize,
    pub total_sales: Money,
    pub total_paid: Money,
    pub total_balance: Money,
    pub total_gst: Money,
}

/// Sales in a date range.
///
/// `rows` lists every invoice dated in the range, cancelled ones included so
/// the register shows them. The count and every total cover live invoices
/// only.
pub fn sales_report(invoices: &[Invoice], range: DateRange) -> SalesReport {
    let rows = invoices
        .iter()
        .filter(|inv| range.contains(inv.date))
        .map(|inv| SalesRow {
            invoice_id: inv.id,
            invoice_no: inv.invoice_no.clone(),
            date: inv.date,
            customer_name: inv.customer_name.clone(),
            subtotal: inv.subtotal,
            gst_amount: inv.gst_amount,
            grand_total: inv.grand_total,
            paid: inv.paid,
            balance: inv.balance,
            payment_mode: inv.payment_mode,
            status: inv.status,
        })
        .collect();

    let mut report = SalesReport {
        rows,
        ..Default::default()
    };

    for inv in live_in(invoices, range) {
        report.invoice_count += 1;
        report.total_sales += inv.grand_total;
        report.total_paid += inv.paid;
        report.total_balance += inv.balance;
        report.total_gst += inv.gst_amount;
    }

    report
}

// =============================================================================
// GST Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GstRow {
    pub invoice_no: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub customer_name: String,
    pub customer_gst: Option<String>,
    pub taxable: Money,
    pub cgst: Money,
    pub sgst: Money,
    pub total_gst: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GstReport {
    pub rows: Vec<GstRow>,
    pub total_taxable: Money,
    pub total_cgst: Money,
    pub total_sgst: Money,
    pub total_gst: Money,
}

/// GST collected in a date range. Cancelled invoices carry no tax liability
/// and are left out.
pub fn gst_report(invoices: &[Invoice], range: DateRange) -> GstReport {
    let mut report = GstReport::default();

    for inv in live_in(invoices, range) {
        report.total_taxable += inv.subtotal;
        report.total_cgst += inv.cgst;
        report.total_sgst += inv.sgst;
        report.total_gst += inv.gst_amount;
        report.rows.push(GstRow {
            invoice_no: inv.invoice_no.clone(),
            date: inv.date,
            customer_name: inv.customer_name.clone(),
            customer_gst: inv.customer_gst.clone(),
            taxable: inv.subtotal,
            cgst: inv.cgst,
            sgst: inv.sgst,
            total_gst: inv.gst_amount,
        });
    }

    report
}

// =============================================================================
// Stock Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub product_id: u64,
    pub name: String,
    pub code: String,
    pub category: String,
    pub unit: String,
    pub stock: i64,
    pub min_stock: i64,
    pub purchase_price: Money,
    /// `stock × purchase_price`.
    pub value: Money,
    pub low_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockReport {
    pub rows: Vec<StockRow>,
    pub total_value: Money,
    pub low_stock_count: usize,
}

/// Current stock valued at purchase price.
pub fn stock_report(products: &[Product]) -> StockReport {
    let rows: Vec<StockRow> = products
        .iter()
        .map(|p| StockRow {
            product_id: p.id,
            name: p.name.clone(),
            code: p.code.clone(),
            category: p.category.clone(),
            unit: p.unit.clone(),
            stock: p.stock,
            min_stock: p.min_stock,
            purchase_price: p.purchase_price,
            value: p.stock_value(),
            low_stock: p.is_low_stock(),
        })
        .collect();

    StockReport {
        total_value: rows.iter().map(|r| r.value).sum(),
        low_stock_count: rows.iter().filter(|r| r.low_stock).count(),
        rows,
    }
}

/// Products at or below their minimum stock.
pub fn low_stock(products: &[Product]) -> Vec<Product> {
    products.iter().filter(|p| p.is_low_stock()).cloned().collect()
}

// =============================================================================
// Outstanding Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OutstandingRow {
    pub invoice_id: u64,
    pub invoice_no: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub customer_name: String,
    pub customer_mobile: String,
    pub grand_total: Money,
    pub paid: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OutstandingReport {
    pub rows: Vec<OutstandingRow>,
    pub total_due: Money,
}

/// Unpaid balances in a date range.
pub fn outstanding_report(invoices: &[Invoice], range: DateRange) -> OutstandingReport {
    let rows: Vec<OutstandingRow> = live_in(invoices, range)
        .filter(|inv| inv.is_outstanding())
        .map(|inv| OutstandingRow {
            invoice_id: inv.id,
            invoice_no: inv.invoice_no.clone(),
            date: inv.date,
            customer_name: inv.customer_name.clone(),
            customer_mobile: inv.customer_mobile.clone(),
            grand_total: inv.grand_total,
            paid: inv.paid,
            balance: inv.balance,
        })
        .collect();

    OutstandingReport {
        total_due: rows.iter().map(|r| r.balance).sum(),
        rows,
    }
}

// =============================================================================
// Profit
// =============================================================================

/// How line rates are stripped of GST before subtracting purchase price.
///
/// ```text
/// DefaultGstInclusive   profit = qty × (rate / (1 + default GST) − purchase)
/// LineGstInclusive      profit = qty × (rate / (1 + line GST)    − purchase)
/// ```
/// Both treat the line rate as GST-inclusive and ignore line discounts.
/// The default basis is the one the dashboard has always shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ProfitBasis {
    #[default]
    DefaultGstInclusive,
    LineGstInclusive,
}

/// Estimated profit across live invoices.
///
/// A line whose product has been deleted is costed at zero.
pub fn total_profit(
    invoices: &[Invoice],
    products: &[Product],
    default_gst: TaxRate,
    basis: ProfitBasis,
) -> Money {
    invoices
        .iter()
        .filter(|inv| !inv.status.is_cancelled())
        .flat_map(|inv| inv.items.iter())
        .map(|line| {
            let purchase = products
                .iter()
                .find(|p| p.id == line.product_id)
                .map(|p| p.purchase_price)
                .unwrap_or_default();
            let rate = match basis {
                ProfitBasis::DefaultGstInclusive => default_gst,
                ProfitBasis::LineGstInclusive => line.gst,
            };
            (line.rate.exclusive_of_tax(rate) - purchase).multiply_quantity(line.qty.max(0))
        })
        .sum()
}

// =============================================================================
// Monthly Sales and Top Products
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    pub year: i32,
    pub month: u32,
    /// Short month name, e.g. `Feb`.
    pub label: String,
    pub total: Money,
}

/// Sales per calendar month for the `months` months ending with `today`'s
/// month, oldest first.
pub fn monthly_sales(invoices: &[Invoice], today: NaiveDate, months: u32) -> Vec<MonthlySales> {
    let current = DateRange::month_of(today).from();

    (0..months)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .map(|start| {
            let range = DateRange::month_of(start);
            MonthlySales {
                year: start.year(),
                month: start.month(),
                label: start.format("%b").to_string(),
                total: live_in(invoices, range).map(|inv| inv.grand_total).sum(),
            }
        })
        .collect()
}

/// The `n` products with the highest unit margin.
pub fn top_margin_products(products: &[Product], n: usize) -> Vec<Product> {
    let mut sorted = products.to_vec();
    sorted.sort_by(|a, b| b.unit_margin().cmp(&a.unit_margin()));
    sorted.truncate(n);
    sorted
}

// =============================================================================
// Dashboard
// =============================================================================

/// Number of trailing months on the dashboard chart.
pub const DASHBOARD_MONTHS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today_sales: Money,
    pub month_sales: Money,
    pub total_profit: Money,
    pub pending_dues: Money,
    pub low_stock: Vec<Product>,
    pub monthly_sales: Vec<MonthlySales>,
    pub top_products: Vec<Product>,
    /// Latest invoices first.
    pub recent_invoices: Vec<Invoice>,
}

/// Builds the dashboard as of `today`.
pub fn dashboard(
    invoices: &[Invoice],
    products: &[Product],
    settings: &Settings,
    today: NaiveDate,
    basis: ProfitBasis,
) -> Dashboard {
    let sum = |range: DateRange| -> Money {
        live_in(invoices, range).map(|inv| inv.grand_total).sum()
    };

    let mut recent: Vec<Invoice> = invoices.to_vec();
    recent.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    recent.truncate(5);

    Dashboard {
        today_sales: sum(DateRange::day(today)),
        month_sales: sum(DateRange::month_of(today)),
        total_profit: total_profit(invoices, products, settings.default_gst, basis),
        pending_dues: outstanding_report(invoices, DateRange::all()).total_due,
        low_stock: low_stock(products),
        monthly_sales: monthly_sales(invoices, today, DASHBOARD_MONTHS),
        top_products: top_margin_products(products, 5),
        recent_invoices: recent,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineItem;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(id: u64, date: NaiveDate, grand: i64, paid: i64, status: InvoiceStatus) -> Invoice {
        Invoice {
            id,
            invoice_no: format!("INV-{}", 1000 + id),
            date,
            customer_name: format!("Customer {}", id),
            subtotal: Money::from_rupees(grand * 100 / 118),
            gst_amount: Money::from_rupees(grand - grand * 100 / 118),
            grand_total: Money::from_rupees(grand),
            paid: Money::from_rupees(paid),
            balance: Money::from_rupees(grand - paid),
            status,
            ..Default::default()
        }
    }

    fn sample() -> Vec<Invoice> {
        vec![
            invoice(1, date(2026, 2, 10), 99120, 99120, InvoiceStatus::Paid),
            invoice(2, date(2026, 2, 15), 4474, 2000, InvoiceStatus::Partial),
            invoice(3, date(2026, 2, 15), 1180, 0, InvoiceStatus::Cancelled),
            invoice(4, date(2026, 3, 1), 590, 0, InvoiceStatus::Unpaid),
        ]
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(date(2026, 2, 10), date(2026, 2, 15)).unwrap();
        assert!(range.contains(date(2026, 2, 10)));
        assert!(range.contains(date(2026, 2, 15)));
        assert!(!range.contains(date(2026, 2, 16)));

        assert!(DateRange::new(date(2026, 2, 16), date(2026, 2, 15)).is_err());
    }

    #[test]
    fn test_month_of_handles_short_months() {
        let feb = DateRange::month_of(date(2026, 2, 14));
        assert_eq!(feb.from(), date(2026, 2, 1));
        assert_eq!(feb.to(), date(2026, 2, 28));

        let dec = DateRange::month_of(date(2025, 12, 31));
        assert_eq!(dec.to(), date(2025, 12, 31));
    }

    #[test]
    fn test_sales_report_lists_cancelled_but_skips_sums() {
        let range = DateRange::month_of(date(2026, 2, 1));
        let report = sales_report(&sample(), range);

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows.iter().filter(|r| r.status.is_cancelled()).count(), 1);
        assert_eq!(report.invoice_count, 2);
        assert_eq!(report.total_sales, Money::from_rupees(99120 + 4474));
        assert_eq!(report.total_paid, Money::from_rupees(99120 + 2000));
        assert_eq!(report.total_balance, Money::from_rupees(2474));
    }

    #[test]
    fn test_gst_report_sums_halves() {
        let mut invoices = sample();
        invoices[0].cgst = Money::from_rupees(7560);
        invoices[0].sgst = Money::from_rupees(7560);
        invoices[0].gst_amount = Money::from_rupees(15120);

        let report = gst_report(&invoices, DateRange::day(date(2026, 2, 10)));

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.total_cgst + report.total_sgst, report.total_gst);
    }

    #[test]
    fn test_outstanding_excludes_paid_and_cancelled() {
        let report = outstanding_report(&sample(), DateRange::all());

        let numbers: Vec<&str> = report.rows.iter().map(|r| r.invoice_no.as_str()).collect();
        assert_eq!(numbers, vec!["INV-1002", "INV-1004"]);
        assert_eq!(report.total_due, Money::from_rupees(2474 + 590));
    }

    #[test]
    fn test_stock_report_values_and_flags() {
        let products = vec![
            Product {
                id: 1,
                purchase_price: Money::from_rupees(320),
                stock: 2,
                min_stock: 5,
                ..Default::default()
            },
            Product {
                id: 2,
                purchase_price: Money::from_rupees(6),
                stock: 500,
                min_stock: 100,
                ..Default::default()
            },
        ];

        let report = stock_report(&products);
        assert_eq!(report.total_value, Money::from_rupees(640 + 3000));
        assert_eq!(report.low_stock_count, 1);
        assert!(report.rows[0].low_stock);
    }

    #[test]
    fn test_profit_bases() {
        let products = vec![Product {
            id: 1,
            purchase_price: Money::from_rupees(80),
            ..Default::default()
        }];
        let line = LineItem {
            product_id: 1,
            qty: 2,
            rate: Money::from_rupees(105),
            gst: TaxRate::from_percent(5),
            ..Default::default()
        };
        let invoices = vec![Invoice {
            items: vec![line],
            ..Default::default()
        }];

        // 105 / 1.18 = 88.98 → (88.98 - 80) × 2
        let default = total_profit(
            &invoices,
            &products,
            TaxRate::from_percent(18),
            ProfitBasis::DefaultGstInclusive,
        );
        assert_eq!(default, Money::from_paise(1796));

        // 105 / 1.05 = 100 → (100 - 80) × 2
        let by_line = total_profit(
            &invoices,
            &products,
            TaxRate::from_percent(18),
            ProfitBasis::LineGstInclusive,
        );
        assert_eq!(by_line, Money::from_rupees(40));
    }

    #[test]
    fn test_profit_costs_missing_product_at_zero() {
        let invoices = vec![Invoice {
            items: vec![LineItem {
                product_id: 99,
                qty: 1,
                rate: Money::from_rupees(118),
                ..Default::default()
            }],
            ..Default::default()
        }];

        let profit = total_profit(
            &invoices,
            &[],
            TaxRate::from_percent(18),
            ProfitBasis::DefaultGstInclusive,
        );
        assert_eq!(profit, Money::from_rupees(100));
    }

    #[test]
    fn test_monthly_sales_trails_today() {
        let series = monthly_sales(&sample(), date(2026, 3, 20), 3);

        let labels: Vec<&str> = series.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar"]);
        assert_eq!(series[0].total, Money::zero());
        assert_eq!(series[1].total, Money::from_rupees(99120 + 4474));
        assert_eq!(series[2].total, Money::from_rupees(590));
    }

    #[test]
    fn test_dashboard_uses_todays_month() {
        let settings = Settings::default();
        let board = dashboard(
            &sample(),
            &[],
            &settings,
            date(2026, 2, 15),
            ProfitBasis::default(),
        );

        assert_eq!(board.today_sales, Money::from_rupees(4474));
        assert_eq!(board.month_sales, Money::from_rupees(99120 + 4474));
        assert_eq!(board.pending_dues, Money::from_rupees(2474 + 590));
        assert_eq!(board.monthly_sales.len(), DASHBOARD_MONTHS as usize);
        assert_eq!(board.recent_invoices[0].id, 4);
    }

    #[test]
    fn test_top_margin_products() {
        let product = |id: u64, buy: i64, sell: i64| Product {
            id,
            purchase_price: Money::from_rupees(buy),
            selling_price: Money::from_rupees(sell),
            ..Default::default()
        };
        let products = vec![product(1, 10, 15), product(2, 100, 300), product(3, 50, 60)];

        let top: Vec<u64> = top_margin_products(&products, 2).iter().map(|p| p.id).collect();
        assert_eq!(top, vec![2, 3]);
    }
}
