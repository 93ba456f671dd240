//! # Cash Flow Calculator
//!
//! Monthly rental cash flow: income after vacancy, minus every operating
//! expense and the mortgage payment.
//!
//! Management is charged on collected (post-vacancy) income; maintenance and
//! capital-expenditure reserves are budgeted against scheduled rent.

use serde::{Deserialize, Serialize};

use crate::calculators::{CalculationOutput, SummaryLine};
use crate::charts::{ChartData, ChartId};
use crate::errors::CalcResult;
use crate::finance::ratio_or_zero;
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

const MONTHLY_RENT: InputField = InputField::new(
    "monthly_rent",
    "Monthly Rent",
    2_200.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const OTHER_INCOME: InputField = InputField::new(
    "other_income_monthly",
    "Other Income (monthly)",
    0.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const VACANCY: InputField = InputField::new(
    "vacancy_pct",
    "Vacancy",
    5.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const MANAGEMENT: InputField = InputField::new(
    "management_pct",
    "Management",
    8.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const MAINTENANCE: InputField = InputField::new(
    "maintenance_pct",
    "Maintenance",
    5.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const CAPEX: InputField = InputField::new(
    "capex_pct",
    "CapEx Reserve",
    5.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const MORTGAGE: InputField = InputField::new(
    "mortgage_payment",
    "Mortgage Payment (P&I)",
    1_200.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const PROPERTY_TAX: InputField = InputField::new(
    "property_tax_annual",
    "Property Tax (annual)",
    3_000.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const INSURANCE: InputField = InputField::new(
    "insurance_annual",
    "Insurance (annual)",
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
const UTILITIES: InputField = InputField::new(
    "utilities_monthly",
    "Utilities (monthly)",
    0.0,
    0.0,
    100_000.0,
    FieldUnit::Currency,
);

pub const FIELDS: &[InputField] = &[
    MONTHLY_RENT,
    OTHER_INCOME,
    VACANCY,
    MANAGEMENT,
    MAINTENANCE,
    CAPEX,
    MORTGAGE,
    PROPERTY_TAX,
    INSURANCE,
    HOA,
    UTILITIES,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowInput {
    pub monthly_rent: f64,
    pub other_income_monthly: f64,
    pub vacancy_pct: f64,
    pub management_pct: f64,
    pub maintenance_pct: f64,
    pub capex_pct: f64,
    pub mortgage_payment: f64,
    pub property_tax_annual: f64,
    pub insurance_annual: f64,
    pub hoa_monthly: f64,
    pub utilities_monthly: f64,
}

impl Default for CashFlowInput {
    fn default() -> Self {
        CashFlowInput {
            monthly_rent: MONTHLY_RENT.default,
            other_income_monthly: OTHER_INCOME.default,
            vacancy_pct: VACANCY.default,
            management_pct: MANAGEMENT.default,
            maintenance_pct: MAINTENANCE.default,
            capex_pct: CAPEX.default,
            mortgage_payment: MORTGAGE.default,
            property_tax_annual: PROPERTY_TAX.default,
            insurance_annual: INSURANCE.default,
            hoa_monthly: HOA.default,
            utilities_monthly: UTILITIES.default,
        }
    }
}

impl CashFlowInput {
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(CashFlowInput {
            monthly_rent: values.number(&MONTHLY_RENT)?,
            other_income_monthly: values.number(&OTHER_INCOME)?,
            vacancy_pct: values.number(&VACANCY)?,
            management_pct: values.number(&MANAGEMENT)?,
            maintenance_pct: values.number(&MAINTENANCE)?,
            capex_pct: values.number(&CAPEX)?,
            mortgage_payment: values.number(&MORTGAGE)?,
            property_tax_annual: values.number(&PROPERTY_TAX)?,
            insurance_annual: values.number(&INSURANCE)?,
            hoa_monthly: values.number(&HOA)?,
            utilities_monthly: values.number(&UTILITIES)?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        MONTHLY_RENT.check(self.monthly_rent)?;
        OTHER_INCOME.check(self.other_income_monthly)?;
        VACANCY.check(self.vacancy_pct)?;
        MANAGEMENT.check(self.management_pct)?;
        MAINTENANCE.check(self.maintenance_pct)?;
        CAPEX.check(self.capex_pct)?;
        MORTGAGE.check(self.mortgage_payment)?;
        PROPERTY_TAX.check(self.property_tax_annual)?;
        INSURANCE.check(self.insurance_annual)?;
        HOA.check(self.hoa_monthly)?;
        UTILITIES.check(self.utilities_monthly)?;
        Ok(())
    }
}

/// One monthly expense line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub label: String,
    pub monthly: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowResult {
    pub gross_monthly_income: f64,
    pub vacancy_loss: f64,
    pub effective_monthly_income: f64,
    /// Every expense including the mortgage, in display order
    pub expenses: Vec<ExpenseItem>,
    /// Expenses excluding the mortgage
    pub operating_expenses: f64,
    pub total_expenses: f64,
    pub net_operating_income_monthly: f64,
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,
    /// Operating expenses as a percent of effective income
    pub expense_ratio_pct: f64,
    /// Occupancy needed to cover every expense
    pub break_even_occupancy_pct: f64,
}

impl CashFlowResult {
    pub fn summary(&self) -> Vec<SummaryLine> {
        vec![
            SummaryLine::money("Gross Income", self.gross_monthly_income),
            SummaryLine::money("Effective Income", self.effective_monthly_income),
            SummaryLine::money("Operating Expenses", self.operating_expenses),
            SummaryLine::money("Total Expenses", self.total_expenses),
            SummaryLine::money("Monthly Cash Flow", self.monthly_cash_flow),
            SummaryLine::money("Annual Cash Flow", self.annual_cash_flow),
            SummaryLine::percent("Expense Ratio", self.expense_ratio_pct),
            SummaryLine::percent("Break-even Occupancy", self.break_even_occupancy_pct),
        ]
    }

    pub fn is_positive(&self) -> bool {
        self.monthly_cash_flow > 0.0
    }
}

pub fn calculate(input: &CashFlowInput) -> CalcResult<CashFlowResult> {
    input.validate()?;

    let gross_monthly_income = input.monthly_rent + input.other_income_monthly;
    let vacancy_loss = gross_monthly_income * input.vacancy_pct / 100.0;
    let effective_monthly_income = gross_monthly_income - vacancy_loss;

    let operating = [
        ("Management", effective_monthly_income * input.management_pct / 100.0),
        ("Maintenance", input.monthly_rent * input.maintenance_pct / 100.0),
        ("CapEx Reserve", input.monthly_rent * input.capex_pct / 100.0),
        ("Property Tax", input.property_tax_annual / 12.0),
        ("Insurance", input.insurance_annual / 12.0),
        ("HOA", input.hoa_monthly),
        ("Utilities", input.utilities_monthly),
    ];
    let operating_expenses: f64 = operating.iter().map(|(_, amount)| amount).sum();

    let mut expenses: Vec<ExpenseItem> = vec![ExpenseItem {
        label: "Mortgage".to_string(),
        monthly: input.mortgage_payment,
    }];
    expenses.extend(operating.iter().map(|(label, monthly)| ExpenseItem {
        label: label.to_string(),
        monthly: *monthly,
    }));

    let total_expenses = operating_expenses + input.mortgage_payment;
    let net_operating_income_monthly = effective_monthly_income - operating_expenses;
    let monthly_cash_flow = effective_monthly_income - total_expenses;

    Ok(CashFlowResult {
        gross_monthly_income,
        vacancy_loss,
        effective_monthly_income,
        expenses,
        operating_expenses,
        total_expenses,
        net_operating_income_monthly,
        monthly_cash_flow,
        annual_cash_flow: monthly_cash_flow * 12.0,
        expense_ratio_pct: ratio_or_zero(operating_expenses, effective_monthly_income) * 100.0,
        break_even_occupancy_pct: ratio_or_zero(total_expenses, gross_monthly_income) * 100.0,
    })
}

/// Expense breakdown doughnut (zero lines omitted).
pub fn charts(_input: &CashFlowInput, result: &CashFlowResult) -> Vec<ChartData> {
    let slices: Vec<(String, f64)> = result
        .expenses
        .iter()
        .filter(|item| item.monthly > 0.0)
        .map(|item| (item.label.clone(), item.monthly))
        .collect();
    vec![ChartData::doughnut(ChartId::Expense, slices)]
}

pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = CashFlowInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(
        CalculatorId::Cashflow,
        result.summary(),
        charts(&input, &result),
        &result,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cash_flow() {
        let result = calculate(&CashFlowInput::default()).unwrap();
        assert!((result.vacancy_loss - 110.0).abs() < 1e-9);
        assert!((result.effective_monthly_income - 2090.0).abs() < 1e-9);
        // 167.20 + 110 + 110 + 250 + 100
        assert!((result.operating_expenses - 737.2).abs() < 1e-9);
        assert!((result.monthly_cash_flow - 152.8).abs() < 1e-9);
        assert!((result.annual_cash_flow - 1833.6).abs() < 1e-6);
        assert!(result.is_positive());
    }

    #[test]
    fn test_expense_lines_add_up() {
        let result = calculate(&CashFlowInput::default()).unwrap();
        let sum: f64 = result.expenses.iter().map(|e| e.monthly).sum();
        assert!((sum - result.total_expenses).abs() < 1e-9);
        assert_eq!(result.expenses[0].label, "Mortgage");
    }

    #[test]
    fn test_no_income() {
        let input = CashFlowInput {
            monthly_rent: 0.0,
            ..CashFlowInput::default()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.expense_ratio_pct, 0.0);
        assert_eq!(result.break_even_occupancy_pct, 0.0);
        assert!(!result.is_positive());
    }

    #[test]
    fn test_chart_skips_zero_expenses() {
        let input = CashFlowInput::default();
        let result = calculate(&input).unwrap();
        let chart = &charts(&input, &result)[0];
        assert_eq!(chart.chart, ChartId::Expense);
        assert!(!chart.labels.contains(&"HOA".to_string()));
        assert!(chart.labels.contains(&"Mortgage".to_string()));
    }
}
