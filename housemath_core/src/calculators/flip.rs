//! # Fix-and-Flip Calculator
//!
//! Profit on buying, renovating and reselling a property, financed with an
//! interest-only short-term loan on part of the purchase price.
//!
//! The 70% rule: pay no more than 70% of the after-repair value (ARV) less
//! the rehab budget.

use serde::{Deserialize, Serialize};

use crate::calculators::{CalculationOutput, SummaryLine};
use crate::charts::{ChartData, ChartId};
use crate::errors::CalcResult;
use crate::finance::{annualized_return, interest_only_payment, ratio_or_zero};
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

/// Share of ARV the 70% rule allows for purchase + rehab.
pub const SEVENTY_PERCENT_RULE: f64 = 0.70;

const PURCHASE_PRICE: InputField = InputField::new(
    "purchase_price",
    "Purchase Price",
    200_000.0,
    1.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const REHAB_COST: InputField = InputField::new(
    "rehab_cost",
    "Rehab Budget",
    40_000.0,
    0.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const ARV: InputField = InputField::new(
    "after_repair_value",
    "After-Repair Value",
    320_000.0,
    1.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const HOLDING_MONTHS: InputField = InputField::new(
    "holding_months",
    "Holding Period",
    6.0,
    1.0,
    60.0,
    FieldUnit::Months,
);
const HOLDING_COSTS: InputField = InputField::new(
    "holding_costs_monthly",
    "Holding Costs (monthly)",
    1_500.0,
    0.0,
    1_000_000.0,
    FieldUnit::Currency,
);
const BUYING_COSTS: InputField = InputField::new(
    "buying_costs_pct",
    "Buying Costs",
    2.0,
    0.0,
    15.0,
    FieldUnit::Percent,
);
const SELLING_COSTS: InputField = InputField::new(
    "selling_costs_pct",
    "Selling Costs",
    8.0,
    0.0,
    15.0,
    FieldUnit::Percent,
);
const LOAN: InputField = InputField::new(
    "loan_pct",
    "Loan (of purchase)",
    80.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const LOAN_RATE: InputField = InputField::new(
    "loan_rate_pct",
    "Loan Rate",
    10.0,
    0.0,
    30.0,
    FieldUnit::Percent,
);
const LOAN_POINTS: InputField = InputField::new(
    "loan_points",
    "Loan Points",
    2.0,
    0.0,
    10.0,
    FieldUnit::Percent,
);

pub const FIELDS: &[InputField] = &[
    PURCHASE_PRICE,
    REHAB_COST,
    ARV,
    HOLDING_MONTHS,
    HOLDING_COSTS,
    BUYING_COSTS,
    SELLING_COSTS,
    LOAN,
    LOAN_RATE,
    LOAN_POINTS,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipInput {
    pub purchase_price: f64,
    pub rehab_cost: f64,
    pub after_repair_value: f64,
    pub holding_months: u32,
    pub holding_costs_monthly: f64,
    pub buying_costs_pct: f64,
    pub selling_costs_pct: f64,
    pub loan_pct: f64,
    pub loan_rate_pct: f64,
    pub loan_points: f64,
}

impl Default for FlipInput {
    fn default() -> Self {
        FlipInput {
            purchase_price: PURCHASE_PRICE.default,
            rehab_cost: REHAB_COST.default,
            after_repair_value: ARV.default,
            holding_months: HOLDING_MONTHS.default as u32,
            holding_costs_monthly: HOLDING_COSTS.default,
            buying_costs_pct: BUYING_COSTS.default,
            selling_costs_pct: SELLING_COSTS.default,
            loan_pct: LOAN.default,
            loan_rate_pct: LOAN_RATE.default,
            loan_points: LOAN_POINTS.default,
        }
    }
}

impl FlipInput {
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(FlipInput {
            purchase_price: values.number(&PURCHASE_PRICE)?,
            rehab_cost: values.number(&REHAB_COST)?,
            after_repair_value: values.number(&ARV)?,
            holding_months: values.whole(&HOLDING_MONTHS)?,
            holding_costs_monthly: values.number(&HOLDING_COSTS)?,
            buying_costs_pct: values.number(&BUYING_COSTS)?,
            selling_costs_pct: values.number(&SELLING_COSTS)?,
            loan_pct: values.number(&LOAN)?,
            loan_rate_pct: values.number(&LOAN_RATE)?,
            loan_points: values.number(&LOAN_POINTS)?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        PURCHASE_PRICE.check(self.purchase_price)?;
        REHAB_COST.check(self.rehab_cost)?;
        ARV.check(self.after_repair_value)?;
        HOLDING_MONTHS.check(self.holding_months as f64)?;
        HOLDING_COSTS.check(self.holding_costs_monthly)?;
        BUYING_COSTS.check(self.buying_costs_pct)?;
        SELLING_COSTS.check(self.selling_costs_pct)?;
        LOAN.check(self.loan_pct)?;
        LOAN_RATE.check(self.loan_rate_pct)?;
        LOAN_POINTS.check(self.loan_points)?;
        Ok(())
    }

    /// Highest purchase price the 70% rule allows.
    pub fn max_offer(&self) -> f64 {
        self.after_repair_value * SEVENTY_PERCENT_RULE - self.rehab_cost
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipResult {
    pub loan_amount: f64,
    pub buying_costs: f64,
    pub holding_costs: f64,
    pub financing_costs: f64,
    pub selling_costs: f64,
    pub total_cost: f64,
    /// Out-of-pocket cash (everything except the loan and the sale costs)
    pub cash_invested: f64,
    pub net_profit: f64,
    pub roi_pct: f64,
    pub annualized_roi_pct: Option<f64>,
    pub max_offer: f64,
    pub meets_seventy_percent_rule: bool,
}

impl FlipResult {
    pub fn summary(&self) -> Vec<SummaryLine> {
        let annualized = match self.annualized_roi_pct {
            Some(pct) => SummaryLine::percent("Annualized ROI", pct),
            None => SummaryLine::text("Annualized ROI", "n/a"),
        };
        vec![
            SummaryLine::money("Total Project Cost", self.total_cost),
            SummaryLine::money("Cash Invested", self.cash_invested),
            SummaryLine::money("Net Profit", self.net_profit),
            SummaryLine::percent("ROI", self.roi_pct),
            annualized,
            SummaryLine::money("70% Rule Max Offer", self.max_offer),
            SummaryLine::text(
                "Meets 70% Rule",
                if self.meets_seventy_percent_rule { "yes" } else { "no" },
            ),
        ]
    }
}

pub fn calculate(input: &FlipInput) -> CalcResult<FlipResult> {
    input.validate()?;

    let loan_amount = input.purchase_price * input.loan_pct / 100.0;
    let months = input.holding_months as f64;
    let buying_costs = input.purchase_price * input.buying_costs_pct / 100.0;
    let holding_costs = input.holding_costs_monthly * months;
    let financing_costs = interest_only_payment(loan_amount, input.loan_rate_pct) * months
        + loan_amount * input.loan_points / 100.0;
    let selling_costs = input.after_repair_value * input.selling_costs_pct / 100.0;

    let total_cost = input.purchase_price
        + input.rehab_cost
        + buying_costs
        + holding_costs
        + financing_costs
        + selling_costs;
    let cash_invested = input.purchase_price - loan_amount
        + input.rehab_cost
        + buying_costs
        + holding_costs
        + financing_costs;
    let net_profit = input.after_repair_value - total_cost;
    let roi = ratio_or_zero(net_profit, cash_invested);
    let annualized_roi_pct = if cash_invested > 0.0 {
        annualized_return(roi, months / 12.0).map(|r| r * 100.0)
    } else {
        None
    };
    let max_offer = input.max_offer();

    Ok(FlipResult {
        loan_amount,
        buying_costs,
        holding_costs,
        financing_costs,
        selling_costs,
        total_cost,
        cash_invested,
        net_profit,
        roi_pct: roi * 100.0,
        annualized_roi_pct,
        max_offer,
        meets_seventy_percent_rule: input.purchase_price <= max_offer,
    })
}

/// Where the sale price goes.
pub fn charts(input: &FlipInput, result: &FlipResult) -> Vec<ChartData> {
    let mut slices = vec![
        ("Purchase", input.purchase_price),
        ("Rehab", input.rehab_cost),
        ("Holding", result.holding_costs),
        ("Financing", result.financing_costs),
        ("Buying & Selling", result.buying_costs + result.selling_costs),
    ];
    if result.net_profit > 0.0 {
        slices.push(("Profit", result.net_profit));
    }
    vec![ChartData::doughnut(ChartId::Flip, slices)]
}

pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = FlipInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(
        CalculatorId::Flip,
        result.summary(),
        charts(&input, &result),
        &result,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flip() {
        let result = calculate(&FlipInput::default()).unwrap();
        // 8000 interest + 3200 points
        assert!((result.financing_costs - 11_200.0).abs() < 1e-6);
        assert!((result.total_cost - 289_800.0).abs() < 1e-6);
        assert!((result.cash_invested - 104_200.0).abs() < 1e-6);
        assert!((result.net_profit - 30_200.0).abs() < 1e-6);
        assert!((result.roi_pct - 28.98).abs() < 0.01);
        assert!((result.annualized_roi_pct.unwrap() - 66.37).abs() < 0.01);
    }

    #[test]
    fn test_seventy_percent_rule() {
        let result = calculate(&FlipInput::default()).unwrap();
        assert!((result.max_offer - 184_000.0).abs() < 1e-9);
        assert!(!result.meets_seventy_percent_rule);

        let input = FlipInput {
            purchase_price: 180_000.0,
            ..FlipInput::default()
        };
        assert!(calculate(&input).unwrap().meets_seventy_percent_rule);
    }

    #[test]
    fn test_losing_flip_chart_has_no_profit_slice() {
        let input = FlipInput {
            after_repair_value: 240_000.0,
            ..FlipInput::default()
        };
        let result = calculate(&input).unwrap();
        assert!(result.net_profit < 0.0);
        let chart = &charts(&input, &result)[0];
        assert!(!chart.labels.contains(&"Profit".to_string()));
    }

    #[test]
    fn test_profitable_chart_sums_to_arv() {
        let input = FlipInput::default();
        let result = calculate(&input).unwrap();
        let chart = &charts(&input, &result)[0];
        assert!((chart.total() - input.after_repair_value).abs() < 1e-6);
    }
}
