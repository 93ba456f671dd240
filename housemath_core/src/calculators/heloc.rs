//! # HELOC Calculator
//!
//! Home equity line of credit sizing and payments.
//!
//! ```text
//! credit line = home value × max CLTV − first mortgage balance
//! ```
//!
//! The draw period is interest-only; the balance then amortizes over the
//! repayment period.

use serde::{Deserialize, Serialize};

use crate::calculators::{CalculationOutput, SummaryLine};
use crate::charts::{ChartData, ChartId};
use crate::errors::{CalcError, CalcResult};
use crate::finance::{interest_only_payment, monthly_payment, ratio_or_zero};
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

const HOME_VALUE: InputField = InputField::new(
    "home_value",
    "Home Value",
    500_000.0,
    1.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const MORTGAGE_BALANCE: InputField = InputField::new(
    "mortgage_balance",
    "Mortgage Balance",
    250_000.0,
    0.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const MAX_CLTV: InputField = InputField::new(
    "max_cltv_pct",
    "Max Combined LTV",
    85.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const DRAW_AMOUNT: InputField = InputField::new(
    "draw_amount",
    "Amount Drawn",
    50_000.0,
    0.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const INTEREST_RATE: InputField = InputField::new(
    "interest_rate_pct",
    "Interest Rate",
    8.5,
    0.0,
    30.0,
    FieldUnit::Percent,
);
const DRAW_YEARS: InputField = InputField::new(
    "draw_years",
    "Draw Period",
    10.0,
    0.0,
    30.0,
    FieldUnit::Years,
);
const REPAYMENT_YEARS: InputField = InputField::new(
    "repayment_years",
    "Repayment Period",
    20.0,
    1.0,
    40.0,
    FieldUnit::Years,
);

pub const FIELDS: &[InputField] = &[
    HOME_VALUE,
    MORTGAGE_BALANCE,
    MAX_CLTV,
    DRAW_AMOUNT,
    INTEREST_RATE,
    DRAW_YEARS,
    REPAYMENT_YEARS,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelocInput {
    pub home_value: f64,
    pub mortgage_balance: f64,
    pub max_cltv_pct: f64,
    pub draw_amount: f64,
    pub interest_rate_pct: f64,
    pub draw_years: u32,
    pub repayment_years: u32,
}

impl Default for HelocInput {
    fn default() -> Self {
        HelocInput {
            home_value: HOME_VALUE.default,
            mortgage_balance: MORTGAGE_BALANCE.default,
            max_cltv_pct: MAX_CLTV.default,
            draw_amount: DRAW_AMOUNT.default,
            interest_rate_pct: INTEREST_RATE.default,
            draw_years: DRAW_YEARS.default as u32,
            repayment_years: REPAYMENT_YEARS.default as u32,
        }
    }
}

impl HelocInput {
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(HelocInput {
            home_value: values.number(&HOME_VALUE)?,
            mortgage_balance: values.number(&MORTGAGE_BALANCE)?,
            max_cltv_pct: values.number(&MAX_CLTV)?,
            draw_amount: values.number(&DRAW_AMOUNT)?,
            interest_rate_pct: values.number(&INTEREST_RATE)?,
            draw_years: values.whole(&DRAW_YEARS)?,
            repayment_years: values.whole(&REPAYMENT_YEARS)?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        HOME_VALUE.check(self.home_value)?;
        MORTGAGE_BALANCE.check(self.mortgage_balance)?;
        MAX_CLTV.check(self.max_cltv_pct)?;
        DRAW_AMOUNT.check(self.draw_amount)?;
        INTEREST_RATE.check(self.interest_rate_pct)?;
        DRAW_YEARS.check(self.draw_years as f64)?;
        REPAYMENT_YEARS.check(self.repayment_years as f64)?;
        Ok(())
    }

    /// Maximum line the lender will extend (zero when underwater).
    pub fn credit_line(&self) -> f64 {
        (self.home_value * self.max_cltv_pct / 100.0 - self.mortgage_balance).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelocResult {
    pub home_equity: f64,
    pub credit_line: f64,
    pub remaining_line: f64,
    pub interest_only_payment: f64,
    pub repayment_payment: f64,
    pub draw_period_interest: f64,
    pub repayment_period_interest: f64,
    pub total_interest: f64,
    /// (mortgage + draw) / home value
    pub combined_ltv_pct: f64,
}

impl HelocResult {
    pub fn summary(&self) -> Vec<SummaryLine> {
        vec![
            SummaryLine::money("Home Equity", self.home_equity),
            SummaryLine::money("Credit Line", self.credit_line),
            SummaryLine::money("Remaining Line", self.remaining_line),
            SummaryLine::money("Interest-Only Payment", self.interest_only_payment),
            SummaryLine::money("Repayment Payment", self.repayment_payment),
            SummaryLine::money("Total Interest", self.total_interest),
            SummaryLine::percent("Combined LTV", self.combined_ltv_pct),
        ]
    }
}

pub fn calculate(input: &HelocInput) -> CalcResult<HelocResult> {
    input.validate()?;

    let credit_line = input.credit_line();
    if input.draw_amount > credit_line {
        return Err(CalcError::calculation_failed(
            CalculatorId::Heloc.as_str(),
            format!(
                "draw of {:.2} exceeds the available credit line of {:.2}",
                input.draw_amount, credit_line
            ),
        ));
    }

    let draw = input.draw_amount;
    let io_payment = interest_only_payment(draw, input.interest_rate_pct);
    let repayment_months = input.repayment_years * 12;
    let repayment_payment = monthly_payment(draw, input.interest_rate_pct, repayment_months);
    let draw_period_interest = io_payment * (input.draw_years * 12) as f64;
    let repayment_period_interest = (repayment_payment * repayment_months as f64 - draw).max(0.0);

    Ok(HelocResult {
        home_equity: input.home_value - input.mortgage_balance,
        credit_line,
        remaining_line: credit_line - draw,
        interest_only_payment: io_payment,
        repayment_payment,
        draw_period_interest,
        repayment_period_interest,
        total_interest: draw_period_interest + repayment_period_interest,
        combined_ltv_pct: ratio_or_zero(input.mortgage_balance + draw, input.home_value) * 100.0,
    })
}

/// Principal vs. interest paid in each period.
pub fn charts(input: &HelocInput, result: &HelocResult) -> Vec<ChartData> {
    let labels = vec!["Draw Period".to_string(), "Repayment Period".to_string()];
    let interest = vec![result.draw_period_interest, result.repayment_period_interest];
    vec![ChartData::bar(ChartId::Heloc, labels)
        .with_series("Principal", vec![0.0, input.draw_amount])
        .with_series("Interest", interest)]
}

pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = HelocInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(
        CalculatorId::Heloc,
        result.summary(),
        charts(&input, &result),
        &result,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_heloc() {
        let result = calculate(&HelocInput::default()).unwrap();
        assert!((result.credit_line - 175_000.0).abs() < 1e-9);
        assert!((result.remaining_line - 125_000.0).abs() < 1e-9);
        assert!((result.interest_only_payment - 354.17).abs() < 0.01);
        assert!((result.repayment_payment - 433.91).abs() < 0.01);
        assert!((result.total_interest - 96_638.79).abs() < 0.01);
        assert!((result.combined_ltv_pct - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_draw_over_line_fails() {
        let input = HelocInput {
            draw_amount: 200_000.0,
            ..HelocInput::default()
        };
        let err = calculate(&input).unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
    }

    #[test]
    fn test_underwater_has_no_line() {
        let input = HelocInput {
            mortgage_balance: 450_000.0,
            draw_amount: 0.0,
            ..HelocInput::default()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.credit_line, 0.0);
        assert_eq!(result.total_interest, 0.0);
    }
}
