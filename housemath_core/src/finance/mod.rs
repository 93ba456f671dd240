//! # Finance Formulas
//!
//! The closed-form time-value-of-money equations every calculator is built on.
//! Keeping them in one place means each formula is tested once and the
//! calculators only do bookkeeping.
//!
//! ## Modules
//!
//! - [`loan`] - Level-payment loans: payment, balance, amortization schedule
//! - [`growth`] - Compounding, annualized returns, break-even helpers
//!
//! ## Conventions
//!
//! - Rates passed to these functions are **annual percents** (6.0 = 6%)
//! - Loans are monthly-pay, monthly-compounding
//! - Amounts are plain f64 dollars

pub mod growth;
pub mod loan;

pub use growth::{annualized_return, break_even_months, compound, ratio_or_zero};
pub use loan::{
    amortization_schedule, interest_only_payment, monthly_payment, monthly_rate, remaining_balance,
    total_interest, yearly_summary, AmortizationRow, AmortizationYear,
};
