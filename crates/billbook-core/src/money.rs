//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    3749 × 0.18 = 674.8199999999999  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summed over a long invoice the error leaks into the round-off line     │
//! │  and the printed GST no longer matches the grand total.                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    374900 paise × 1800 bps / 10000 = 67482 paise = ₹674.82 exactly      │
//! │    Every rounding step is explicit and happens at paise precision       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billbook_core::money::Money;
//!
//! let rate = Money::from_rupees(750);          // ₹750.00
//! let line = rate.multiply_quantity(3);        // ₹2,250.00
//! let total = line + Money::from_paise(149900); // ₹3,749.00
//! assert_eq!(total.paise(), 374900);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{Discount, TaxRate};
use crate::MAX_AMOUNT;

/// Paise per rupee.
const PAISE_PER_RUPEE: i64 = 100;

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: round-off adjustments and balances can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as an integer**: the JSON store holds paise, never floats
/// - **Saturating arithmetic**: an out-of-range total pins at the i64 bound
///   instead of wrapping around to a small or negative bill
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.selling_price ──► LineItem.rate ──► taxable ──► CGST / SGST    │
/// │                                                                         │
/// │  subtotal + gst + shipping ──► round_to_rupee() ──► grand_total         │
/// │                                                                         │
/// │  grand_total − paid ──► balance ──► InvoiceStatus                       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// let gst = Money::from_paise(67482); // ₹674.82
    /// assert_eq!(gst.paise(), 67482);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * PAISE_PER_RUPEE)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// ## Note
    /// For negative amounts only the rupee part carries the sign:
    /// `from_major_minor(-5, 50)` is −₹5.50.
    ///
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(674, 82).paise(), 67482);
    /// assert_eq!(Money::from_major_minor(-5, 50).paise(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * PAISE_PER_RUPEE - paise)
        } else {
            Money(rupees * PAISE_PER_RUPEE + paise)
        }
    }

    /// Parses a decimal rupee string such as `"674.82"`, `"50"` or `"-0.18"`.
    ///
    /// At most two fractional digits are accepted, and the magnitude may not
    /// exceed [`MAX_AMOUNT`]. This is the only entry point from free-form UI
    /// input into the engine.
    ///
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal_str("674.82").unwrap().paise(), 67482);
    /// assert_eq!(Money::from_decimal_str("-0.5").unwrap().paise(), -50);
    /// assert!(Money::from_decimal_str("1.234").is_err());
    /// assert!(Money::from_decimal_str("1000000000.01").is_err());
    /// ```
    pub fn from_decimal_str(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim().replace(',', "");
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.as_str()),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("must contain digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must be a decimal number"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }

        let rupees: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount is too large"))?
        };
        let paise: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse::<i64>().unwrap_or(0),
        };

        let total = rupees
            .checked_mul(PAISE_PER_RUPEE)
            .and_then(|r| r.checked_add(paise))
            .filter(|total| *total <= MAX_AMOUNT.paise())
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -total } else { total }))
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / PAISE_PER_RUPEE
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % PAISE_PER_RUPEE).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Returns `true` when the amount is a whole number of rupees.
    #[inline]
    pub const fn is_whole_rupees(&self) -> bool {
        self.0 % PAISE_PER_RUPEE == 0
    }

    /// Clamps negative amounts to zero.
    #[inline]
    pub fn non_negative(self) -> Self {
        Money(self.0.max(0))
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// let rate = Money::from_rupees(42000);
    /// assert_eq!(rate.multiply_quantity(2), Money::from_rupees(84000));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Calculates GST on this amount at the given rate, rounded to the paisa.
    ///
    /// ## Implementation
    /// Integer math in i128: `amount * bps / 10000`, rounded half away from zero.
    ///
    /// ```rust
    /// use billbook_core::money::Money;
    /// use billbook_core::types::TaxRate;
    ///
    /// let taxable = Money::from_rupees(3749);
    /// let gst = taxable.calculate_tax(TaxRate::from_percent(18));
    /// assert_eq!(gst.paise(), 67482); // ₹674.82
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(scale_bps(self.0, rate.bps(), BPS_SCALE))
    }

    /// Calculates one half of the GST on this amount, rounded to the paisa.
    ///
    /// ## Why A Separate Half?
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  Intra-state GST is printed as two equal components:                │
    /// │                                                                     │
    /// │    CGST = taxable × rate / 2                                        │
    /// │    SGST = taxable × rate / 2                                        │
    /// │                                                                     │
    /// │  Rounding each half to paise (instead of halving a rounded total)   │
    /// │  keeps CGST == SGST and CGST + SGST == GST exactly.                 │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    pub fn calculate_half_tax(&self, rate: TaxRate) -> Money {
        Money(scale_bps(self.0, rate.bps(), BPS_SCALE * 2))
    }

    /// Returns the discount portion of this amount, rounded to the paisa.
    pub fn discount_amount(&self, discount: Discount) -> Money {
        Money(scale_bps(self.0, discount.bps(), BPS_SCALE))
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ```rust
    /// use billbook_core::money::Money;
    /// use billbook_core::types::Discount;
    ///
    /// let base = Money::from_rupees(1000);
    /// let discounted = base.apply_percentage_discount(Discount::from_percent(10));
    /// assert_eq!(discounted, Money::from_rupees(900));
    /// ```
    pub fn apply_percentage_discount(&self, discount: Discount) -> Money {
        *self - self.discount_amount(discount)
    }

    /// Rounds to the nearest whole rupee, half away from zero.
    ///
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(447382).round_to_rupee(), Money::from_rupees(4474));
    /// assert_eq!(Money::from_paise(150).round_to_rupee(), Money::from_rupees(2));
    /// assert_eq!(Money::from_paise(149).round_to_rupee(), Money::from_rupees(1));
    /// ```
    pub fn round_to_rupee(&self) -> Money {
        let rupees = div_round_half_away(self.0 as i128, PAISE_PER_RUPEE as i128);
        Money(saturate(rupees).saturating_mul(PAISE_PER_RUPEE))
    }

    /// Strips GST out of a tax-inclusive amount: `amount / (1 + rate)`.
    ///
    /// ```rust
    /// use billbook_core::money::Money;
    /// use billbook_core::types::TaxRate;
    ///
    /// let inclusive = Money::from_rupees(118);
    /// assert_eq!(inclusive.exclusive_of_tax(TaxRate::from_percent(18)), Money::from_rupees(100));
    /// ```
    pub fn exclusive_of_tax(&self, rate: TaxRate) -> Money {
        let divisor = BPS_SCALE + rate.bps() as i128;
        Money(saturate(div_round_half_away(self.0 as i128 * BPS_SCALE, divisor)))
    }
}

/// `amount * bps / scale` in i128, rounded half away from zero.
fn scale_bps(amount: i64, bps: u32, scale: i128) -> i64 {
    saturate(div_round_half_away(amount as i128 * bps as i128, scale))
}

/// Narrows to i64, pinning at the bounds.
fn saturate(n: i128) -> i64 {
    n.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Integer division rounding half away from zero. `d` must be positive.
fn div_round_half_away(n: i128, d: i128) -> i128 {
    let half = d / 2;
    if n >= 0 {
        (n + half) / d
    } else {
        (n - half) / d
    }
}

/// Groups digits the Indian way: last three, then pairs (12,34,567).
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays money the way invoices print it: `₹1,23,456.78`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let rupees = (self.0 / PAISE_PER_RUPEE).unsigned_abs().to_string();
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            group_indian(&rupees),
            self.paise_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
