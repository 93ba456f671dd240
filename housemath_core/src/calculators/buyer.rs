//! # Buyer Cash-to-Close Calculator
//!
//! How much cash a buyer needs: down payment plus closing costs, less seller
//! credits, plus a reserve cushion of monthly housing payments. Earnest money
//! already on deposit is credited against the amount due at the table.

use serde::{Deserialize, Serialize};

use crate::calculators::{CalculationOutput, SummaryLine};
use crate::errors::CalcResult;
use crate::finance::monthly_payment;
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

const PURCHASE_PRICE: InputField = InputField::new(
    "purchase_price",
    "Purchase Price",
    350_000.0,
    1.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const DOWN_PAYMENT: InputField = InputField::new(
    "down_payment_pct",
    "Down Payment",
    10.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const CLOSING_COSTS: InputField = InputField::new(
    "closing_costs_pct",
    "Closing Costs",
    3.0,
    0.0,
    15.0,
    FieldUnit::Percent,
);
const RESERVES: InputField = InputField::new(
    "reserves_months",
    "Reserves",
    2.0,
    0.0,
    24.0,
    FieldUnit::Months,
);
const EARNEST_MONEY: InputField = InputField::new(
    "earnest_money",
    "Earnest Money",
    5_000.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const SELLER_CREDITS: InputField = InputField::new(
    "seller_credits",
    "Seller Credits",
    0.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const INTEREST_RATE: InputField = InputField::new(
    "interest_rate_pct",
    "Interest Rate",
    6.5,
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
    4_000.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const INSURANCE: InputField = InputField::new(
    "insurance_annual",
    "Insurance (annual)",
    1_500.0,
    0.0,
    1_000_000.0,
    FieldUnit::Currency,
);

pub const FIELDS: &[InputField] = &[
    PURCHASE_PRICE,
    DOWN_PAYMENT,
    CLOSING_COSTS,
    RESERVES,
    EARNEST_MONEY,
    SELLER_CREDITS,
    INTEREST_RATE,
    LOAN_TERM,
    PROPERTY_TAX,
    INSURANCE,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerInput {
    pub purchase_price: f64,
    pub down_payment_pct: f64,
    pub closing_costs_pct: f64,
    pub reserves_months: u32,
    pub earnest_money: f64,
    pub seller_credits: f64,
    pub interest_rate_pct: f64,
    pub loan_term_years: u32,
    pub property_tax_annual: f64,
    pub insurance_annual: f64,
}

impl Default for BuyerInput {
    fn default() -> Self {
        BuyerInput {
            purchase_price: PURCHASE_PRICE.default,
            down_payment_pct: DOWN_PAYMENT.default,
            closing_costs_pct: CLOSING_COSTS.default,
            reserves_months: RESERVES.default as u32,
            earnest_money: EARNEST_MONEY.default,
            seller_credits: SELLER_CREDITS.default,
            interest_rate_pct: INTEREST_RATE.default,
            loan_term_years: LOAN_TERM.default as u32,
            property_tax_annual: PROPERTY_TAX.default,
            insurance_annual: INSURANCE.default,
        }
    }
}

impl BuyerInput {
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(BuyerInput {
            purchase_price: values.number(&PURCHASE_PRICE)?,
            down_payment_pct: values.number(&DOWN_PAYMENT)?,
            closing_costs_pct: values.number(&CLOSING_COSTS)?,
            reserves_months: values.whole(&RESERVES)?,
            earnest_money: values.number(&EARNEST_MONEY)?,
            seller_credits: values.number(&SELLER_CREDITS)?,
            interest_rate_pct: values.number(&INTEREST_RATE)?,
            loan_term_years: values.whole(&LOAN_TERM)?,
            property_tax_annual: values.number(&PROPERTY_TAX)?,
            insurance_annual: values.number(&INSURANCE)?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        PURCHASE_PRICE.check(self.purchase_price)?;
        DOWN_PAYMENT.check(self.down_payment_pct)?;
        CLOSING_COSTS.check(self.closing_costs_pct)?;
        RESERVES.check(self.reserves_months as f64)?;
        EARNEST_MONEY.check(self.earnest_money)?;
        SELLER_CREDITS.check(self.seller_credits)?;
        INTEREST_RATE.check(self.interest_rate_pct)?;
        LOAN_TERM.check(self.loan_term_years as f64)?;
        PROPERTY_TAX.check(self.property_tax_annual)?;
        INSURANCE.check(self.insurance_annual)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerResult {
    pub down_payment: f64,
    pub loan_amount: f64,
    pub closing_costs: f64,
    /// Seller credits actually applied (capped at closing costs)
    pub credits_applied: f64,
    pub monthly_payment: f64,
    pub reserves: f64,
    /// Down payment + closing costs - credits
    pub cash_to_close: f64,
    /// Cash to close less earnest money already deposited
    pub due_at_closing: f64,
    /// Cash to close + reserves
    pub total_cash_needed: f64,
}

impl BuyerResult {
    pub fn summary(&self) -> Vec<SummaryLine> {
        vec![
            SummaryLine::money("Down Payment", self.down_payment),
            SummaryLine::money("Closing Costs", self.closing_costs),
            SummaryLine::money("Seller Credits", self.credits_applied),
            SummaryLine::money("Cash to Close", self.cash_to_close),
            SummaryLine::money("Due at Closing", self.due_at_closing),
            SummaryLine::money("Monthly Payment", self.monthly_payment),
            SummaryLine::money("Reserves", self.reserves),
            SummaryLine::money("Total Cash Needed", self.total_cash_needed),
        ]
    }
}

pub fn calculate(input: &BuyerInput) -> CalcResult<BuyerResult> {
    input.validate()?;

    let down_payment = input.purchase_price * input.down_payment_pct / 100.0;
    let loan_amount = input.purchase_price - down_payment;
    let closing_costs = input.purchase_price * input.closing_costs_pct / 100.0;
    // Credits can't be taken as cash back
    let credits_applied = input.seller_credits.min(closing_costs);

    let principal_interest =
        monthly_payment(loan_amount, input.interest_rate_pct, input.loan_term_years * 12);
    let monthly_payment = principal_interest
        + input.property_tax_annual / 12.0
        + input.insurance_annual / 12.0;
    let reserves = monthly_payment * input.reserves_months as f64;

    let cash_to_close = down_payment + closing_costs - credits_applied;
    let due_at_closing = (cash_to_close - input.earnest_money).max(0.0);

    Ok(BuyerResult {
        down_payment,
        loan_amount,
        closing_costs,
        credits_applied,
        monthly_payment,
        reserves,
        cash_to_close,
        due_at_closing,
        total_cash_needed: cash_to_close + reserves,
    })
}

pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = BuyerInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(CalculatorId::Buyer, result.summary(), Vec::new(), &result)
}
