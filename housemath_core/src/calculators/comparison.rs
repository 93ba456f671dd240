//! # Loan Comparison Calculator
//!
//! Two loan offers for the same amount, side by side. Discount points are
//! paid up front as a percent of the loan; the points break-even is how long
//! the cheaper payment takes to earn back the extra points.

use serde::{Deserialize, Serialize};

use crate::calculators::{CalculationOutput, SummaryLine};
use crate::charts::{ChartData, ChartId};
use crate::errors::CalcResult;
use crate::finance::{break_even_months, monthly_payment};
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

const LOAN_AMOUNT: InputField = InputField::new(
    "loan_amount",
    "Loan Amount",
    300_000.0,
    1.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const RATE_A: InputField = InputField::new(
    "rate_a_pct",
    "Option A Rate",
    6.5,
    0.0,
    30.0,
    FieldUnit::Percent,
);
const TERM_A: InputField = InputField::new(
    "term_a_years",
    "Option A Term",
    30.0,
    1.0,
    50.0,
    FieldUnit::Years,
);
const POINTS_A: InputField = InputField::new(
    "points_a",
    "Option A Points",
    0.0,
    0.0,
    10.0,
    FieldUnit::Percent,
);
const RATE_B: InputField = InputField::new(
    "rate_b_pct",
    "Option B Rate",
    6.0,
    0.0,
    30.0,
    FieldUnit::Percent,
);
const TERM_B: InputField = InputField::new(
    "term_b_years",
    "Option B Term",
    30.0,
    1.0,
    50.0,
    FieldUnit::Years,
);
const POINTS_B: InputField = InputField::new(
    "points_b",
    "Option B Points",
    1.0,
    0.0,
    10.0,
    FieldUnit::Percent,
);

pub const FIELDS: &[InputField] = &[
    LOAN_AMOUNT,
    RATE_A,
    TERM_A,
    POINTS_A,
    RATE_B,
    TERM_B,
    POINTS_B,
];

/// Terms of one offer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub rate_pct: f64,
    pub term_years: u32,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub loan_amount: f64,
    pub option_a: LoanTerms,
    pub option_b: LoanTerms,
}

impl Default for ComparisonInput {
    fn default() -> Self {
        ComparisonInput {
            loan_amount: LOAN_AMOUNT.default,
            option_a: LoanTerms {
                rate_pct: RATE_A.default,
                term_years: TERM_A.default as u32,
                points: POINTS_A.default,
            },
            option_b: LoanTerms {
                rate_pct: RATE_B.default,
                term_years: TERM_B.default as u32,
                points: POINTS_B.default,
            },
        }
    }
}

impl ComparisonInput {
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(ComparisonInput {
            loan_amount: values.number(&LOAN_AMOUNT)?,
            option_a: LoanTerms {
                rate_pct: values.number(&RATE_A)?,
                term_years: values.whole(&TERM_A)?,
                points: values.number(&POINTS_A)?,
            },
            option_b: LoanTerms {
                rate_pct: values.number(&RATE_B)?,
                term_years: values.whole(&TERM_B)?,
                points: values.number(&POINTS_B)?,
            },
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        LOAN_AMOUNT.check(self.loan_amount)?;
        RATE_A.check(self.option_a.rate_pct)?;
        TERM_A.check(self.option_a.term_years as f64)?;
        POINTS_A.check(self.option_a.points)?;
        RATE_B.check(self.option_b.rate_pct)?;
        TERM_B.check(self.option_b.term_years as f64)?;
        POINTS_B.check(self.option_b.points)?;
        Ok(())
    }
}

/// Cost of one offer over its full term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionCost {
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub points_cost: f64,
    /// Interest + points
    pub total_cost: f64,
}

fn option_cost(loan_amount: f64, terms: &LoanTerms) -> OptionCost {
    let months = terms.term_years * 12;
    let payment = monthly_payment(loan_amount, terms.rate_pct, months);
    let total_interest = (payment * months as f64 - loan_amount).max(0.0);
    let points_cost = loan_amount * terms.points / 100.0;
    OptionCost {
        monthly_payment: payment,
        total_interest,
        points_cost,
        total_cost: total_interest + points_cost,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub option_a: OptionCost,
    pub option_b: OptionCost,
    /// A's payment minus B's (positive when B is cheaper monthly)
    pub monthly_difference: f64,
    /// A's total cost minus B's (positive when B is cheaper overall)
    pub total_cost_difference: f64,
    /// Months for the cheaper payment to recover its extra points
    pub points_break_even_months: Option<f64>,
}

impl ComparisonResult {
    /// "A", "B", or "Tie" by total cost.
    pub fn cheaper_option(&self) -> &'static str {
        if self.total_cost_difference.abs() < 0.005 {
            "Tie"
        } else if self.total_cost_difference > 0.0 {
            "B"
        } else {
            "A"
        }
    }

    pub fn summary(&self) -> Vec<SummaryLine> {
        vec![
            SummaryLine::money("Option A Payment", self.option_a.monthly_payment),
            SummaryLine::money("Option B Payment", self.option_b.monthly_payment),
            SummaryLine::money("Option A Total Cost", self.option_a.total_cost),
            SummaryLine::money("Option B Total Cost", self.option_b.total_cost),
            SummaryLine::money("Monthly Difference", self.monthly_difference),
            SummaryLine::money("Total Cost Difference", self.total_cost_difference),
            SummaryLine::months("Points Break-even", self.points_break_even_months),
            SummaryLine::text("Cheaper Option", self.cheaper_option()),
        ]
    }
}

pub fn calculate(input: &ComparisonInput) -> CalcResult<ComparisonResult> {
    input.validate()?;

    let option_a = option_cost(input.loan_amount, &input.option_a);
    let option_b = option_cost(input.loan_amount, &input.option_b);
    let monthly_difference = option_a.monthly_payment - option_b.monthly_payment;

    // Orient so the saving is measured for whichever option pays less monthly
    let (extra_points, saving) = if monthly_difference >= 0.0 {
        (option_b.points_cost - option_a.points_cost, monthly_difference)
    } else {
        (option_a.points_cost - option_b.points_cost, -monthly_difference)
    };

    Ok(ComparisonResult {
        total_cost_difference: option_a.total_cost - option_b.total_cost,
        points_break_even_months: break_even_months(extra_points, saving),
        monthly_difference,
        option_a,
        option_b,
    })
}

pub fn charts(_input: &ComparisonInput, result: &ComparisonResult) -> Vec<ChartData> {
    let labels = vec!["Total Interest".to_string(), "Points".to_string(), "Total Cost".to_string()];
    let series = |cost: &OptionCost| vec![cost.total_interest, cost.points_cost, cost.total_cost];
    vec![ChartData::bar(ChartId::Comparison, labels)
        .with_series("Option A", series(&result.option_a))
        .with_series("Option B", series(&result.option_b))]
}

pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = ComparisonInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(
        CalculatorId::Comparison,
        result.summary(),
        charts(&input, &result),
        &result,
    )
}
