//! # BRRRR Calculator
//!
//! Buy, Rehab, Rent, Refinance, Repeat: how much cash stays in the deal
//! after a cash-out refinance at the after-repair value, and what the rent
//! returns on whatever is left.
//!
//! A negative `cash_left_in_deal` means the refinance returned more than the
//! total invested; cash-on-cash is then unbounded and reported as `None`.

use serde::{Deserialize, Serialize};

use crate::calculators::{CalculationOutput, SummaryLine};
use crate::charts::{ChartData, ChartId};
use crate::errors::CalcResult;
use crate::finance::monthly_payment;
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

const PURCHASE_PRICE: InputField = InputField::new(
    "purchase_price",
    "Purchase Price",
    150_000.0,
    1.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const REHAB_COST: InputField = InputField::new(
    "rehab_cost",
    "Rehab Budget",
    50_000.0,
    0.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const CLOSING_COSTS: InputField = InputField::new(
    "closing_costs",
    "Purchase Closing Costs",
    5_000.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const HOLDING_COSTS: InputField = InputField::new(
    "holding_costs",
    "Holding Costs (total)",
    6_000.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const ARV: InputField = InputField::new(
    "after_repair_value",
    "After-Repair Value",
    260_000.0,
    1.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const REFI_LTV: InputField = InputField::new(
    "refinance_ltv_pct",
    "Refinance LTV",
    75.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const REFI_RATE: InputField = InputField::new(
    "refinance_rate_pct",
    "Refinance Rate",
    7.0,
    0.0,
    30.0,
    FieldUnit::Percent,
);
const REFI_TERM: InputField = InputField::new(
    "refinance_term_years",
    "Refinance Term",
    30.0,
    1.0,
    50.0,
    FieldUnit::Years,
);
const REFI_CLOSING: InputField = InputField::new(
    "refinance_closing_costs",
    "Refinance Closing Costs",
    4_000.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const MONTHLY_RENT: InputField = InputField::new(
    "monthly_rent",
    "Monthly Rent",
    2_200.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const EXPENSES: InputField = InputField::new(
    "expenses_pct",
    "Operating Expenses",
    35.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);

pub const FIELDS: &[InputField] = &[
    PURCHASE_PRICE,
    REHAB_COST,
    CLOSING_COSTS,
    HOLDING_COSTS,
    ARV,
    REFI_LTV,
    REFI_RATE,
    REFI_TERM,
    REFI_CLOSING,
    MONTHLY_RENT,
    EXPENSES,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrrrrInput {
    pub purchase_price: f64,
    pub rehab_cost: f64,
    pub closing_costs: f64,
    pub holding_costs: f64,
    pub after_repair_value: f64,
    pub refinance_ltv_pct: f64,
    pub refinance_rate_pct: f64,
    pub refinance_term_years: u32,
    pub refinance_closing_costs: f64,
    pub monthly_rent: f64,
    pub expenses_pct: f64,
}

impl Default for BrrrrInput {
    fn default() -> Self {
        BrrrrInput {
            purchase_price: PURCHASE_PRICE.default,
            rehab_cost: REHAB_COST.default,
            closing_costs: CLOSING_COSTS.default,
            holding_costs: HOLDING_COSTS.default,
            after_repair_value: ARV.default,
            refinance_ltv_pct: REFI_LTV.default,
            refinance_rate_pct: REFI_RATE.default,
            refinance_term_years: REFI_TERM.default as u32,
            refinance_closing_costs: REFI_CLOSING.default,
            monthly_rent: MONTHLY_RENT.default,
            expenses_pct: EXPENSES.default,
        }
    }
}

impl BrrrrInput {
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(BrrrrInput {
            purchase_price: values.number(&PURCHASE_PRICE)?,
            rehab_cost: values.number(&REHAB_COST)?,
            closing_costs: values.number(&CLOSING_COSTS)?,
            holding_costs: values.number(&HOLDING_COSTS)?,
            after_repair_value: values.number(&ARV)?,
            refinance_ltv_pct: values.number(&REFI_LTV)?,
            refinance_rate_pct: values.number(&REFI_RATE)?,
            refinance_term_years: values.whole(&REFI_TERM)?,
            refinance_closing_costs: values.number(&REFI_CLOSING)?,
            monthly_rent: values.number(&MONTHLY_RENT)?,
            expenses_pct: values.number(&EXPENSES)?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        PURCHASE_PRICE.check(self.purchase_price)?;
        REHAB_COST.check(self.rehab_cost)?;
        CLOSING_COSTS.check(self.closing_costs)?;
        HOLDING_COSTS.check(self.holding_costs)?;
        ARV.check(self.after_repair_value)?;
        REFI_LTV.check(self.refinance_ltv_pct)?;
        REFI_RATE.check(self.refinance_rate_pct)?;
        REFI_TERM.check(self.refinance_term_years as f64)?;
        REFI_CLOSING.check(self.refinance_closing_costs)?;
        MONTHLY_RENT.check(self.monthly_rent)?;
        EXPENSES.check(self.expenses_pct)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrrrrResult {
    pub all_in_cost: f64,
    pub refinance_loan: f64,
    /// Negative when the refinance pulls out more than was put in
    pub cash_left_in_deal: f64,
    pub monthly_payment: f64,
    pub monthly_noi: f64,
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,
    pub cash_on_cash_pct: Option<f64>,
    pub equity: f64,
}

impl BrrrrResult {
    /// All invested cash came back at refinance.
    pub fn is_infinite_return(&self) -> bool {
        self.cash_left_in_deal <= 0.0
    }

    pub fn summary(&self) -> Vec<SummaryLine> {
        let coc = match self.cash_on_cash_pct {
            Some(pct) => SummaryLine::percent("Cash-on-Cash Return", pct),
            None => SummaryLine::text("Cash-on-Cash Return", "infinite"),
        };
        vec![
            SummaryLine::money("All-In Cost", self.all_in_cost),
            SummaryLine::money("Refinance Loan", self.refinance_loan),
            SummaryLine::money("Cash Left in Deal", self.cash_left_in_deal),
            SummaryLine::money("Monthly Payment", self.monthly_payment),
            SummaryLine::money("Monthly Cash Flow", self.monthly_cash_flow),
            coc,
            SummaryLine::money("Equity", self.equity),
        ]
    }
}

pub fn calculate(input: &BrrrrInput) -> CalcResult<BrrrrResult> {
    input.validate()?;

    let all_in_cost =
        input.purchase_price + input.rehab_cost + input.closing_costs + input.holding_costs;
    let refinance_loan = input.after_repair_value * input.refinance_ltv_pct / 100.0;
    let cash_left_in_deal = all_in_cost + input.refinance_closing_costs - refinance_loan;

    let payment = monthly_payment(
        refinance_loan,
        input.refinance_rate_pct,
        input.refinance_term_years * 12,
    );
    let monthly_noi = input.monthly_rent * (1.0 - input.expenses_pct / 100.0);
    let monthly_cash_flow = monthly_noi - payment;
    let annual_cash_flow = monthly_cash_flow * 12.0;

    let cash_on_cash_pct = if cash_left_in_deal > 0.0 {
        Some(annual_cash_flow / cash_left_in_deal * 100.0)
    } else {
        None
    };

    Ok(BrrrrResult {
        all_in_cost,
        refinance_loan,
        cash_left_in_deal,
        monthly_payment: payment,
        monthly_noi,
        monthly_cash_flow,
        annual_cash_flow,
        cash_on_cash_pct,
        equity: input.after_repair_value - refinance_loan,
    })
}

pub fn charts(_input: &BrrrrInput, result: &BrrrrResult) -> Vec<ChartData> {
    let labels = vec![
        "All-In Cost".to_string(),
        "Refinance Loan".to_string(),
        "Cash Left In".to_string(),
        "Equity".to_string(),
    ];
    vec![ChartData::bar(ChartId::Brrrr, labels).with_series(
        "Amount",
        vec![
            result.all_in_cost,
            result.refinance_loan,
            result.cash_left_in_deal,
            result.equity,
        ],
    )]
}

pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = BrrrrInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(
        CalculatorId::Brrrr,
        result.summary(),
        charts(&input, &result),
        &result,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_brrrr() {
        let result = calculate(&BrrrrInput::default()).unwrap();
        assert!((result.all_in_cost - 211_000.0).abs() < 1e-9);
        assert!((result.refinance_loan - 195_000.0).abs() < 1e-9);
        assert!((result.cash_left_in_deal - 20_000.0).abs() < 1e-9);
        assert!((result.monthly_payment - 1_297.34).abs() < 0.01);
        assert!((result.monthly_cash_flow - 132.66).abs() < 0.01);
        assert!((result.cash_on_cash_pct.unwrap() - 7.96).abs() < 0.01);
        assert!((result.equity - 65_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_cash_out_is_infinite_return() {
        let input = BrrrrInput {
            after_repair_value: 300_000.0,
            ..BrrrrInput::default()
        };
        let result = calculate(&input).unwrap();
        // 225000 loan vs. 215000 in
        assert!((result.cash_left_in_deal - -10_000.0).abs() < 1e-9);
        assert!(result.is_infinite_return());
        assert_eq!(result.cash_on_cash_pct, None);
        assert!(result.summary().iter().any(|l| l.value == "infinite"));
    }

    #[test]
    fn test_zero_ltv_leaves_everything_in() {
        let input = BrrrrInput {
            refinance_ltv_pct: 0.0,
            ..BrrrrInput::default()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.monthly_payment, 0.0);
        assert!((result.cash_left_in_deal - 215_000.0).abs() < 1e-9);
    }
}
