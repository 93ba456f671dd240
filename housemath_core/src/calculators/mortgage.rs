//! # Mortgage Calculator
//!
//! Monthly housing payment (PITI + HOA + PMI) and the amortization of the
//! loan over its term.
//!
//! ## Assumptions
//!
//! - Fixed rate, fully amortizing, monthly payments
//! - PMI applies only when the down payment is below 20% and is charged on
//!   the original loan amount for the whole term (no automatic cancellation)
//! - Property tax and insurance are entered as annual amounts and escrowed
//!   monthly
//!
//! ## Example
//!
//! ```rust
//! use housemath_core::calculators::mortgage::{calculate, MortgageInput};
//!
//! let input = MortgageInput::default();
//! let result = calculate(&input).unwrap();
//! assert!((result.monthly_principal_interest - 1438.92).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculators::{checkpoint_years, CalculationOutput, SummaryLine};
use crate::charts::{ChartData, ChartId};
use crate::errors::CalcResult;
use crate::finance::{amortization_schedule, yearly_summary, AmortizationYear};
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

const HOME_PRICE: InputField = InputField::new(
    "home_price",
    "Home Price",
    300_000.0,
    1.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const DOWN_PAYMENT: InputField = InputField::new(
    "down_payment_pct",
    "Down Payment",
    20.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const INTEREST_RATE: InputField = InputField::new(
    "interest_rate_pct",
    "Interest Rate",
    6.0,
    0.0,
    30.0,
    FieldUnit::Percent,
);
const LOAN_TERM: InputField = InputField::new(
    "loan_term_years",
    "Loan Term",
    30.0,
    1.0,
    50.0,
    FieldUnit::Years,
);
const PROPERTY_TAX: InputField = InputField::new(
    "property_tax_annual",
    "Property Tax (annual)",
    3_500.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const INSURANCE: InputField = InputField::new(
    "insurance_annual",
    "Home Insurance (annual)",
    1_200.0,
    0.0,
    1_000_000.0,
    FieldUnit::Currency,
);
const HOA: InputField = InputField::new(
    "hoa_monthly",
    "HOA (monthly)",
    0.0,
    0.0,
    100_000.0,
    FieldUnit::Currency,
);
const PMI_RATE: InputField = InputField::new(
    "pmi_rate_pct",
    "PMI Rate",
    0.5,
    0.0,
    5.0,
    FieldUnit::Percent,
);

/// Inputs read by the mortgage calculator.
pub const FIELDS: &[InputField] = &[
    HOME_PRICE,
    DOWN_PAYMENT,
    INTEREST_RATE,
    LOAN_TERM,
    PROPERTY_TAX,
    INSURANCE,
    HOA,
    PMI_RATE,
];

/// Down payment at or above which PMI is not charged.
pub const PMI_FREE_DOWN_PCT: f64 = 20.0;

/// Input parameters for a mortgage.
///
/// ## JSON Example
///
/// ```json
/// {
///   "home_price": 300000.0,
///   "down_payment_pct": 20.0,
///   "interest_rate_pct": 6.0,
///   "loan_term_years": 30,
///   "property_tax_annual": 3500.0,
///   "insurance_annual": 1200.0,
///   "hoa_monthly": 0.0,
///   "pmi_rate_pct": 0.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageInput {
    pub home_price: f64,
    pub down_payment_pct: f64,
    pub interest_rate_pct: f64,
    pub loan_term_years: u32,
    pub property_tax_annual: f64,
    pub insurance_annual: f64,
    pub hoa_monthly: f64,
    /// Annual PMI as a percent of the loan amount
    pub pmi_rate_pct: f64,
}

impl Default for MortgageInput {
    fn default() -> Self {
        MortgageInput {
            home_price: HOME_PRICE.default,
            down_payment_pct: DOWN_PAYMENT.default,
            interest_rate_pct: INTEREST_RATE.default,
            loan_term_years: LOAN_TERM.default as u32,
            property_tax_annual: PROPERTY_TAX.default,
            insurance_annual: INSURANCE.default,
            hoa_monthly: HOA.default,
            pmi_rate_pct: PMI_RATE.default,
        }
    }
}

impl MortgageInput {
    /// Build from raw UI values (missing fields take their defaults).
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(MortgageInput {
            home_price: values.number(&HOME_PRICE)?,
            down_payment_pct: values.number(&DOWN_PAYMENT)?,
            interest_rate_pct: values.number(&INTEREST_RATE)?,
            loan_term_years: values.whole(&LOAN_TERM)?,
            property_tax_annual: values.number(&PROPERTY_TAX)?,
            insurance_annual: values.number(&INSURANCE)?,
            hoa_monthly: values.number(&HOA)?,
            pmi_rate_pct: values.number(&PMI_RATE)?,
        })
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        HOME_PRICE.check(self.home_price)?;
        DOWN_PAYMENT.check(self.down_payment_pct)?;
        INTEREST_RATE.check(self.interest_rate_pct)?;
        LOAN_TERM.check(self.loan_term_years as f64)?;
        PROPERTY_TAX.check(self.property_tax_annual)?;
        INSURANCE.check(self.insurance_annual)?;
        HOA.check(self.hoa_monthly)?;
        PMI_RATE.check(self.pmi_rate_pct)?;
        Ok(())
    }

    pub fn down_payment(&self) -> f64 {
        self.home_price * self.down_payment_pct / 100.0
    }

    pub fn loan_amount(&self) -> f64 {
        self.home_price - self.down_payment()
    }

    pub fn term_months(&self) -> u32 {
        self.loan_term_years * 12
    }

    pub fn requires_pmi(&self) -> bool {
        self.down_payment_pct < PMI_FREE_DOWN_PCT && self.loan_amount() > 0.0
    }
}

/// Results from a mortgage calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageResult {
    pub loan_amount: f64,
    pub down_payment: f64,
    pub monthly_principal_interest: f64,
    pub monthly_property_tax: f64,
    pub monthly_insurance: f64,
    pub monthly_hoa: f64,
    pub monthly_pmi: f64,
    /// Everything above, summed
    pub total_monthly_payment: f64,
    /// Interest over the life of the loan
    pub total_interest: f64,
    /// Principal plus interest over the life of the loan
    pub total_of_payments: f64,
    /// Yearly roll-up of the amortization schedule
    pub schedule: Vec<AmortizationYear>,
}

impl MortgageResult {
    pub fn summary(&self) -> Vec<SummaryLine> {
        let mut lines = vec![
            SummaryLine::money("Loan Amount", self.loan_amount),
            SummaryLine::money("Down Payment", self.down_payment),
            SummaryLine::money("Principal & Interest", self.monthly_principal_interest),
            SummaryLine::money("Property Tax", self.monthly_property_tax),
            SummaryLine::money("Insurance", self.monthly_insurance),
        ];
        if self.monthly_hoa > 0.0 {
            lines.push(SummaryLine::money("HOA", self.monthly_hoa));
        }
        if self.monthly_pmi > 0.0 {
            lines.push(SummaryLine::money("PMI", self.monthly_pmi));
        }
        lines.push(SummaryLine::money("Total Monthly Payment", self.total_monthly_payment));
        lines.push(SummaryLine::money("Total Interest", self.total_interest));
        lines.push(SummaryLine::money("Total of Payments", self.total_of_payments));
        lines
    }
}

/// Calculate the monthly payment breakdown and amortization.
///
/// # Returns
///
/// * `Ok(MortgageResult)` - Calculation results
/// * `Err(CalcError)` - If inputs are out of range
pub fn calculate(input: &MortgageInput) -> CalcResult<MortgageResult> {
    input.validate()?;

    let loan_amount = input.loan_amount();
    let rows = amortization_schedule(loan_amount, input.interest_rate_pct, input.term_months());
    let monthly_principal_interest = rows.first().map(|r| r.payment).unwrap_or(0.0);
    let total_interest: f64 = rows.iter().map(|r| r.interest).sum();

    let monthly_property_tax = input.property_tax_annual / 12.0;
    let monthly_insurance = input.insurance_annual / 12.0;
    let monthly_pmi = if input.requires_pmi() {
        loan_amount * input.pmi_rate_pct / 100.0 / 12.0
    } else {
        0.0
    };

    let total_monthly_payment = monthly_principal_interest
        + monthly_property_tax
        + monthly_insurance
        + input.hoa_monthly
        + monthly_pmi;

    Ok(MortgageResult {
        loan_amount,
        down_payment: input.down_payment(),
        monthly_principal_interest,
        monthly_property_tax,
        monthly_insurance,
        monthly_hoa: input.hoa_monthly,
        monthly_pmi,
        total_monthly_payment,
        total_interest,
        total_of_payments: loan_amount + total_interest,
        schedule: yearly_summary(&rows),
    })
}

/// Payment breakdown doughnut plus cumulative principal/interest line.
pub fn charts(input: &MortgageInput, result: &MortgageResult) -> Vec<ChartData> {
    let mut slices = vec![
        ("Principal & Interest", result.monthly_principal_interest),
        ("Property Tax", result.monthly_property_tax),
        ("Insurance", result.monthly_insurance),
        ("HOA", result.monthly_hoa),
    ];
    if result.monthly_pmi > 0.0 {
        slices.push(("PMI", result.monthly_pmi));
    }
    let payment = ChartData::doughnut(ChartId::Payment, slices);

    let years = checkpoint_years(input.loan_term_years);
    let at = |year: u32| result.schedule.get(year as usize - 1);
    let labels = years.iter().map(|y| format!("Year {}", y)).collect();
    let amortization = ChartData::line(ChartId::Amortization, labels)
        .with_series(
            "Principal",
            years.iter().map(|&y| at(y).map(|r| r.cumulative_principal).unwrap_or(0.0)).collect(),
        )
        .with_series(
            "Interest",
            years.iter().map(|&y| at(y).map(|r| r.cumulative_interest).unwrap_or(0.0)).collect(),
        )
        .with_series(
            "Balance",
            years.iter().map(|&y| at(y).map(|r| r.ending_balance).unwrap_or(0.0)).collect(),
        );

    vec![payment, amortization]
}

/// Registry entry point.
pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = MortgageInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(
        CalculatorId::Mortgage,
        result.summary(),
        charts(&input, &result),
        &result,
    )
}
