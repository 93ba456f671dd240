//! # Level-Payment Loan Formulas
//!
//! Fixed-rate, fully amortizing loans paid monthly.
//!
//! ## Notation
//!
//! - `P` = Principal (amount financed)
//! - `r` = Periodic (monthly) rate = annual% / 100 / 12
//! - `n` = Number of monthly payments
//! - `k` = Payments already made
//! - `A` = Level monthly payment
//!
//! ## Formulas
//!
//! ```text
//! A   = P·r / (1 − (1 + r)^−n)          (r > 0)
//! A   = P / n                           (r = 0)
//! B_k = P·(1 + r)^k − A·((1 + r)^k − 1)/r
//! ```

use serde::{Deserialize, Serialize};

/// Convert an annual percent into the monthly periodic rate.
#[inline]
pub fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / 12.0
}

/// Level monthly payment for a fully amortizing loan.
///
/// # Arguments
/// * `principal` - Amount financed
/// * `annual_rate_pct` - Note rate as a percent
/// * `months` - Number of payments
///
/// Returns 0.0 when there is nothing to finance or no payments.
///
/// ```rust
/// use housemath_core::finance::monthly_payment;
///
/// let payment = monthly_payment(240_000.0, 6.0, 360);
/// assert!((payment - 1438.92).abs() < 0.01);
/// ```
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, months: u32) -> f64 {
    if principal <= 0.0 || months == 0 {
        return 0.0;
    }
    let r = monthly_rate(annual_rate_pct);
    let n = months as f64;
    if r == 0.0 {
        return principal / n;
    }
    principal * r / (1.0 - (1.0 + r).powf(-n))
}

/// Interest-only monthly payment (HELOC draw period).
#[inline]
pub fn interest_only_payment(balance: f64, annual_rate_pct: f64) -> f64 {
    balance.max(0.0) * monthly_rate(annual_rate_pct)
}

/// Remaining balance after `payments_made` level payments.
///
/// Clamped to zero once the loan is paid off.
pub fn remaining_balance(
    principal: f64,
    annual_rate_pct: f64,
    months: u32,
    payments_made: u32,
) -> f64 {
    if principal <= 0.0 || payments_made >= months {
        return 0.0;
    }
    let r = monthly_rate(annual_rate_pct);
    let k = payments_made as f64;
    if r == 0.0 {
        return principal * (1.0 - k / months as f64);
    }
    let payment = monthly_payment(principal, annual_rate_pct, months);
    let growth = (1.0 + r).powf(k);
    (principal * growth - payment * (growth - 1.0) / r).max(0.0)
}

/// Total interest paid over the full life of the loan.
pub fn total_interest(principal: f64, annual_rate_pct: f64, months: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    monthly_payment(principal, annual_rate_pct, months) * months as f64 - principal
}

/// One month of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Payment number, starting at 1
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    /// Balance after this payment
    pub balance: f64,
}

/// One year of an amortization schedule, rolled up from monthly rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    /// Loan year, starting at 1
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    /// Balance at the end of the year
    pub ending_balance: f64,
    pub cumulative_principal: f64,
    pub cumulative_interest: f64,
}

/// Full month-by-month amortization schedule.
///
/// The final payment absorbs floating-point residue so the schedule always
/// ends at a zero balance.
pub fn amortization_schedule(
    principal: f64,
    annual_rate_pct: f64,
    months: u32,
) -> Vec<AmortizationRow> {
    let payment = monthly_payment(principal, annual_rate_pct, months);
    if payment == 0.0 {
        return Vec::new();
    }

    let r = monthly_rate(annual_rate_pct);
    let mut balance = principal;
    let mut rows = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let interest = balance * r;
        let mut principal_part = payment - interest;
        if month == months || principal_part > balance {
            principal_part = balance;
        }
        balance -= principal_part;
        rows.push(AmortizationRow {
            month,
            payment: principal_part + interest,
            principal: principal_part,
            interest,
            balance: balance.max(0.0),
        });
    }

    rows
}

/// Roll a monthly schedule up into loan years.
pub fn yearly_summary(rows: &[AmortizationRow]) -> Vec<AmortizationYear> {
    let mut years = Vec::with_capacity(rows.len() / 12 + 1);
    let mut cumulative_principal = 0.0;
    let mut cumulative_interest = 0.0;

    for (index, chunk) in rows.chunks(12).enumerate() {
        let principal_paid: f64 = chunk.iter().map(|r| r.principal).sum();
        let interest_paid: f64 = chunk.iter().map(|r| r.interest).sum();
        cumulative_principal += principal_paid;
        cumulative_interest += interest_paid;
        years.push(AmortizationYear {
            year: index as u32 + 1,
            principal_paid,
            interest_paid,
            ending_balance: chunk.last().map(|r| r.balance).unwrap_or(0.0),
            cumulative_principal,
            cumulative_interest,
        });
    }

    years
}
