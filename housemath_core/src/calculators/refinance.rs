//! # Refinance Calculator
//!
//! Replaces the remaining balance of an existing loan (plus any cash out)
//! with a new loan. Reports the monthly saving, how long the saving takes to
//! pay back the closing costs, and the lifetime effect once the longer or
//! shorter term is accounted for.

use serde::{Deserialize, Serialize};

use crate::calculators::{CalculationOutput, SummaryLine};
use crate::errors::CalcResult;
use crate::finance::{break_even_months, monthly_payment};
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

const CURRENT_BALANCE: InputField = InputField::new(
    "current_balance",
    "Current Balance",
    250_000.0,
    0.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const CURRENT_RATE: InputField = InputField::new(
    "current_rate_pct",
    "Current Rate",
    7.0,
    0.0,
    30.0,
    FieldUnit::Percent,
);
const REMAINING_YEARS: InputField = InputField::new(
    "remaining_years",
    "Years Remaining",
    25.0,
    1.0,
    50.0,
    FieldUnit::Years,
);
const NEW_RATE: InputField = InputField::new(
    "new_rate_pct",
    "New Rate",
    6.0,
    0.0,
    30.0,
    FieldUnit::Percent,
);
const NEW_TERM: InputField = InputField::new(
    "new_term_years",
    "New Term",
    30.0,
    1.0,
    50.0,
    FieldUnit::Years,
);
const CLOSING_COSTS: InputField = InputField::new(
    "closing_costs",
    "Closing Costs",
    5_000.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const CASH_OUT: InputField = InputField::new(
    "cash_out",
    "Cash Out",
    0.0,
    0.0,
    100_000_000.0,
    FieldUnit::Currency,
);

pub const FIELDS: &[InputField] = &[
    CURRENT_BALANCE,
    CURRENT_RATE,
    REMAINING_YEARS,
    NEW_RATE,
    NEW_TERM,
    CLOSING_COSTS,
    CASH_OUT,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceInput {
    pub current_balance: f64,
    pub current_rate_pct: f64,
    pub remaining_years: u32,
    pub new_rate_pct: f64,
    pub new_term_years: u32,
    pub closing_costs: f64,
    pub cash_out: f64,
}

impl Default for RefinanceInput {
    fn default() -> Self {
        RefinanceInput {
            current_balance: CURRENT_BALANCE.default,
            current_rate_pct: CURRENT_RATE.default,
            remaining_years: REMAINING_YEARS.default as u32,
            new_rate_pct: NEW_RATE.default,
            new_term_years: NEW_TERM.default as u32,
            closing_costs: CLOSING_COSTS.default,
            cash_out: CASH_OUT.default,
        }
    }
}

impl RefinanceInput {
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(RefinanceInput {
            current_balance: values.number(&CURRENT_BALANCE)?,
            current_rate_pct: values.number(&CURRENT_RATE)?,
            remaining_years: values.whole(&REMAINING_YEARS)?,
            new_rate_pct: values.number(&NEW_RATE)?,
            new_term_years: values.whole(&NEW_TERM)?,
            closing_costs: values.number(&CLOSING_COSTS)?,
            cash_out: values.number(&CASH_OUT)?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        CURRENT_BALANCE.check(self.current_balance)?;
        CURRENT_RATE.check(self.current_rate_pct)?;
        REMAINING_YEARS.check(self.remaining_years as f64)?;
        NEW_RATE.check(self.new_rate_pct)?;
        NEW_TERM.check(self.new_term_years as f64)?;
        CLOSING_COSTS.check(self.closing_costs)?;
        CASH_OUT.check(self.cash_out)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinanceResult {
    pub new_loan_amount: f64,
    pub current_payment: f64,
    pub new_payment: f64,
    /// Positive when the new payment is lower
    pub monthly_savings: f64,
    pub break_even_months: Option<f64>,
    pub current_remaining_interest: f64,
    pub new_total_interest: f64,
    /// Current remaining interest minus new interest
    pub interest_savings: f64,
    /// Remaining payments saved, less closing costs, plus cash received
    pub lifetime_savings: f64,
}

impl RefinanceResult {
    pub fn summary(&self) -> Vec<SummaryLine> {
        vec![
            SummaryLine::money("New Loan Amount", self.new_loan_amount),
            SummaryLine::money("Current Payment", self.current_payment),
            SummaryLine::money("New Payment", self.new_payment),
            SummaryLine::money("Monthly Savings", self.monthly_savings),
            SummaryLine::months("Break-even", self.break_even_months),
            SummaryLine::money("Interest Savings", self.interest_savings),
            SummaryLine::money("Lifetime Savings", self.lifetime_savings),
        ]
    }
}

pub fn calculate(input: &RefinanceInput) -> CalcResult<RefinanceResult> {
    input.validate()?;

    let current_months = input.remaining_years * 12;
    let new_months = input.new_term_years * 12;
    let new_loan_amount = input.current_balance + input.cash_out;

    let current_payment =
        monthly_payment(input.current_balance, input.current_rate_pct, current_months);
    let new_payment = monthly_payment(new_loan_amount, input.new_rate_pct, new_months);
    let monthly_savings = current_payment - new_payment;

    let current_total = current_payment * current_months as f64;
    let new_total = new_payment * new_months as f64;
    let current_remaining_interest = (current_total - input.current_balance).max(0.0);
    let new_total_interest = (new_total - new_loan_amount).max(0.0);

    Ok(RefinanceResult {
        new_loan_amount,
        current_payment,
        new_payment,
        monthly_savings,
        break_even_months: break_even_months(input.closing_costs, monthly_savings),
        current_remaining_interest,
        new_total_interest,
        interest_savings: current_remaining_interest - new_total_interest,
        lifetime_savings: current_total - new_total - input.closing_costs + input.cash_out,
    })
}

pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = RefinanceInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(CalculatorId::Refinance, result.summary(), Vec::new(), &result)
}
