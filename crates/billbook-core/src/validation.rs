//! # Validation Module
//!
//! Input validation for catalog records, settings and draft inputs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI forms                                                      │
//! │  ├── Required markers, numeric inputs                                   │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (record-level business rules)                     │
//! │  ├── validate_product / validate_customer / validate_settings           │
//! │  └── Field validators (GSTIN, mobile, GST slab, prices)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Settlement preconditions                                      │
//! │  └── customer name, non-empty draft, every line's qty / rate / GST      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billbook_core::validation::{validate_code, validate_gstin};
//!
//! validate_code("HP-15S-001").unwrap();
//! validate_gstin("27AABCU9603R1ZX").unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Customer, Product, Settings, TaxRate};
use crate::{GST_SLABS, MAX_AMOUNT, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn require_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product code (SKU).
///
/// ## Rules
/// - Must not be empty, at most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ```rust
/// use billbook_core::validation::validate_code;
///
/// assert!(validate_code("A4-PAPER-001").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("has space").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    require_text("code", code, 50)?;

    if !code
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name (required, at most 200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    require_text("name", name, 200)
}

/// Validates a customer name (required, at most 200 characters).
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    require_text("customer name", name, 200)
}

/// Validates an Indian mobile number.
///
/// ## Rules
/// - 10 digits, optionally prefixed with `+91` or `0`
/// - Spaces and hyphens are ignored
pub fn validate_mobile(mobile: &str) -> ValidationResult<()> {
    let digits: String = mobile
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if digits.is_empty() {
        return Err(ValidationError::required("mobile"));
    }

    let local = digits
        .strip_prefix("+91")
        .or_else(|| digits.strip_prefix('0'))
        .unwrap_or(&digits);

    if local.len() != 10 || !local.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "mobile".to_string(),
            reason: "must be a 10 digit number".to_string(),
        });
    }

    Ok(())
}

/// Validates a GSTIN.
///
/// ## Format (15 characters)
/// ```text
///  27   AABCU9603R   1   Z   X
///  ──   ──────────   ─   ─   ─
///  state   PAN     entity Z  check
/// ```
/// The check character is not verified.
pub fn validate_gstin(gstin: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "gst".to_string(),
        reason: reason.to_string(),
    };

    let gstin = gstin.trim();
    let chars: Vec<char> = gstin.chars().collect();

    if chars.len() != 15 {
        return Err(invalid("must be 15 characters"));
    }

    let state_ok = chars[0..2].iter().all(|c| c.is_ascii_digit());
    let pan_ok = chars[2..7].iter().all(|c| c.is_ascii_uppercase())
        && chars[7..11].iter().all(|c| c.is_ascii_digit())
        && chars[11].is_ascii_uppercase();
    let entity_ok = chars[12].is_ascii_alphanumeric();
    let z_ok = chars[13] == 'Z';
    let check_ok = chars[14].is_ascii_alphanumeric();

    if !state_ok {
        return Err(invalid("must start with a two digit state code"));
    }
    if !pan_ok {
        return Err(invalid("characters 3-12 must be a PAN"));
    }
    if !(entity_ok && z_ok && check_ok) {
        return Err(invalid("must end with entity code, 'Z' and check character"));
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string. Empty queries are allowed (match everything).
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates an invoice number prefix (required, at most 20 characters).
pub fn validate_invoice_prefix(prefix: &str) -> ValidationResult<()> {
    require_text("invoice prefix", prefix, 20)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a non-negative amount (prices, rates, paid).
///
/// ## Rules
/// - Must not be negative
/// - Must not exceed MAX_AMOUNT
///
/// ```rust
/// use billbook_core::money::Money;
/// use billbook_core::validation::validate_amount;
/// use billbook_core::MAX_AMOUNT;
///
/// assert!(validate_amount("paid", Money::zero()).is_ok());
/// assert!(validate_amount("paid", Money::from_paise(-1)).is_err());
/// assert!(validate_amount("paid", MAX_AMOUNT + Money::from_paise(1)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT.rupees(),
        });
    }

    Ok(())
}

/// Validates that an amount of either sign stays within MAX_AMOUNT.
///
/// Used where a negative value is tolerated (shipping) or only rejected
/// later (paid, at settlement).
pub fn validate_amount_bound(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.abs() > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: -MAX_AMOUNT.rupees(),
            max: MAX_AMOUNT.rupees(),
        });
    }

    Ok(())
}

/// Validates a stock-like count (stock, min stock).
pub fn validate_count(field: &str, count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates that a GST rate is one of the slabs.
pub fn validate_gst_slab(rate: TaxRate) -> ValidationResult<()> {
    if !rate.is_gst_slab() {
        return Err(ValidationError::NotAllowed {
            field: "gst".to_string(),
            allowed: GST_SLABS
                .iter()
                .map(|slab| format!("{}%", slab.bps() / 100))
                .collect(),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product before it is added or saved.
///
/// Name and code are required; prices, stock and threshold must not be
/// negative; GST must be a slab.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_code(&product.code)?;
    validate_amount("purchase price", product.purchase_price)?;
    validate_amount("selling price", product.selling_price)?;
    validate_gst_slab(product.gst)?;
    validate_count("stock", product.stock)?;
    validate_count("min stock", product.min_stock)?;
    Ok(())
}

/// Validates a customer before it is added or saved.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    validate_customer_name(&customer.name)?;
    validate_mobile(&customer.mobile)?;

    if let Some(gst) = customer.gst.as_deref().filter(|g| !g.trim().is_empty()) {
        validate_gstin(gst)?;
    }

    Ok(())
}

/// Validates the settings form.
pub fn validate_settings(settings: &Settings) -> ValidationResult<()> {
    validate_invoice_prefix(&settings.invoice_prefix)?;
    validate_gst_slab(settings.default_gst)?;

    if settings.current_invoice == 0 {
        return Err(ValidationError::MustBePositive {
            field: "current invoice number".to_string(),
        });
    }

    if !settings.gst.trim().is_empty() {
        validate_gstin(&settings.gst)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
