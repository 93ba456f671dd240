//! # Investment Property Calculator
//!
//! Returns on a financed rental held for a number of years: cap rate,
//! cash-on-cash, equity build-up and annualized total return.
//!
//! ## Assumptions
//!
//! - Rent and operating expenses stay flat over the holding period
//! - Operating expenses are a percent of effective (post-vacancy) rent
//! - The property appreciates at a constant annual rate
//! - Selling costs are ignored; equity is value minus loan balance

use serde::{Deserialize, Serialize};

use crate::calculators::{CalculationOutput, SummaryLine};
use crate::charts::{ChartData, ChartId};
use crate::errors::CalcResult;
use crate::finance::{
    annualized_return, compound, monthly_payment, ratio_or_zero, remaining_balance,
};
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

const PURCHASE_PRICE: InputField = InputField::new(
    "purchase_price",
    "Purchase Price",
    250_000.0,
    1.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const DOWN_PAYMENT: InputField = InputField::new(
    "down_payment_pct",
    "Down Payment",
    25.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const INTEREST_RATE: InputField = InputField::new(
    "interest_rate_pct",
    "Interest Rate",
    7.0,
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
const CLOSING_COSTS: InputField = InputField::new(
    "closing_costs",
    "Closing Costs",
    7_500.0,
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
const VACANCY: InputField = InputField::new(
    "vacancy_pct",
    "Vacancy",
    5.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const APPRECIATION: InputField = InputField::new(
    "appreciation_pct",
    "Appreciation",
    3.0,
    -20.0,
    30.0,
    FieldUnit::Percent,
);
const HOLDING_YEARS: InputField = InputField::new(
    "holding_years",
    "Holding Period",
    10.0,
    1.0,
    50.0,
    FieldUnit::Years,
);

/// Inputs read by the investment calculator.
pub const FIELDS: &[InputField] = &[
    PURCHASE_PRICE,
    DOWN_PAYMENT,
    INTEREST_RATE,
    LOAN_TERM,
    CLOSING_COSTS,
    MONTHLY_RENT,
    EXPENSES,
    VACANCY,
    APPRECIATION,
    HOLDING_YEARS,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentInput {
    pub purchase_price: f64,
    pub down_payment_pct: f64,
    pub interest_rate_pct: f64,
    pub loan_term_years: u32,
    pub closing_costs: f64,
    pub monthly_rent: f64,
    /// Operating expenses as a percent of effective rent
    pub expenses_pct: f64,
    pub vacancy_pct: f64,
    pub appreciation_pct: f64,
    pub holding_years: u32,
}

impl Default for InvestmentInput {
    fn default() -> Self {
        InvestmentInput {
            purchase_price: PURCHASE_PRICE.default,
            down_payment_pct: DOWN_PAYMENT.default,
            interest_rate_pct: INTEREST_RATE.default,
            loan_term_years: LOAN_TERM.default as u32,
            closing_costs: CLOSING_COSTS.default,
            monthly_rent: MONTHLY_RENT.default,
            expenses_pct: EXPENSES.default,
            vacancy_pct: VACANCY.default,
            appreciation_pct: APPRECIATION.default,
            holding_years: HOLDING_YEARS.default as u32,
        }
    }
}

impl InvestmentInput {
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(InvestmentInput {
            purchase_price: values.number(&PURCHASE_PRICE)?,
            down_payment_pct: values.number(&DOWN_PAYMENT)?,
            interest_rate_pct: values.number(&INTEREST_RATE)?,
            loan_term_years: values.whole(&LOAN_TERM)?,
            closing_costs: values.number(&CLOSING_COSTS)?,
            monthly_rent: values.number(&MONTHLY_RENT)?,
            expenses_pct: values.number(&EXPENSES)?,
            vacancy_pct: values.number(&VACANCY)?,
            appreciation_pct: values.number(&APPRECIATION)?,
            holding_years: values.whole(&HOLDING_YEARS)?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        PURCHASE_PRICE.check(self.purchase_price)?;
        DOWN_PAYMENT.check(self.down_payment_pct)?;
        INTEREST_RATE.check(self.interest_rate_pct)?;
        LOAN_TERM.check(self.loan_term_years as f64)?;
        CLOSING_COSTS.check(self.closing_costs)?;
        MONTHLY_RENT.check(self.monthly_rent)?;
        EXPENSES.check(self.expenses_pct)?;
        VACANCY.check(self.vacancy_pct)?;
        APPRECIATION.check(self.appreciation_pct)?;
        HOLDING_YEARS.check(self.holding_years as f64)?;
        Ok(())
    }

    pub fn loan_amount(&self) -> f64 {
        self.purchase_price * (1.0 - self.down_payment_pct / 100.0)
    }

    pub fn cash_invested(&self) -> f64 {
        self.purchase_price * self.down_payment_pct / 100.0 + self.closing_costs
    }
}

/// Position at the end of one holding year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentYear {
    pub year: u32,
    pub property_value: f64,
    pub loan_balance: f64,
    pub equity: f64,
    pub cumulative_cash_flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentResult {
    pub loan_amount: f64,
    pub cash_invested: f64,
    pub monthly_mortgage_payment: f64,
    pub gross_annual_rent: f64,
    pub effective_annual_rent: f64,
    pub annual_operating_expenses: f64,
    /// Net operating income (before debt service)
    pub net_operating_income: f64,
    pub annual_cash_flow: f64,
    pub monthly_cash_flow: f64,
    pub cap_rate_pct: f64,
    pub cash_on_cash_pct: f64,
    pub gross_rent_multiplier: f64,
    /// NOI / debt service; `None` when there is no loan
    pub debt_service_coverage: Option<f64>,
    pub future_value: f64,
    pub equity_at_end: f64,
    pub total_profit: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: Option<f64>,
    pub yearly: Vec<InvestmentYear>,
}

impl InvestmentResult {
    pub fn summary(&self) -> Vec<SummaryLine> {
        let mut lines = vec![
            SummaryLine::money("Cash Invested", self.cash_invested),
            SummaryLine::money("Net Operating Income", self.net_operating_income),
            SummaryLine::money("Monthly Cash Flow", self.monthly_cash_flow),
            SummaryLine::percent("Cap Rate", self.cap_rate_pct),
            SummaryLine::percent("Cash on Cash Return", self.cash_on_cash_pct),
            SummaryLine::money("Projected Value", self.future_value),
            SummaryLine::money("Equity at Sale", self.equity_at_end),
            SummaryLine::money("Total Profit", self.total_profit),
            SummaryLine::percent("Total Return", self.total_return_pct),
        ];
        match self.annualized_return_pct {
            Some(pct) => lines.push(SummaryLine::percent("Annualized Return", pct)),
            None => lines.push(SummaryLine::text("Annualized Return", "n/a")),
        }
        lines
    }
}

pub fn calculate(input: &InvestmentInput) -> CalcResult<InvestmentResult> {
    input.validate()?;

    let loan_amount = input.loan_amount();
    let months = input.loan_term_years * 12;
    let payment = monthly_payment(loan_amount, input.interest_rate_pct, months);
    let cash_invested = input.cash_invested();

    let gross_annual_rent = input.monthly_rent * 12.0;
    let effective_annual_rent = gross_annual_rent * (1.0 - input.vacancy_pct / 100.0);
    let annual_operating_expenses = effective_annual_rent * input.expenses_pct / 100.0;
    let net_operating_income = effective_annual_rent - annual_operating_expenses;
    let annual_debt_service = payment * 12.0;
    let annual_cash_flow = net_operating_income - annual_debt_service;

    let mut yearly = Vec::with_capacity(input.holding_years as usize);
    for year in 1..=input.holding_years {
        let property_value = compound(input.purchase_price, input.appreciation_pct, year as f64);
        let loan_balance =
            remaining_balance(loan_amount, input.interest_rate_pct, months, year * 12);
        yearly.push(InvestmentYear {
            year,
            property_value,
            loan_balance,
            equity: property_value - loan_balance,
            cumulative_cash_flow: annual_cash_flow * year as f64,
        });
    }

    let hold = input.holding_years as f64;
    let future_value = compound(input.purchase_price, input.appreciation_pct, hold);
    let balance_at_end = remaining_balance(
        loan_amount,
        input.interest_rate_pct,
        months,
        input.holding_years * 12,
    );
    let equity_at_end = future_value - balance_at_end;
    let total_profit = equity_at_end - cash_invested + annual_cash_flow * hold;
    let total_return = ratio_or_zero(total_profit, cash_invested);
    let annualized_return_pct = if cash_invested > 0.0 {
        annualized_return(total_return, hold).map(|r| r * 100.0)
    } else {
        None
    };

    Ok(InvestmentResult {
        loan_amount,
        cash_invested,
        monthly_mortgage_payment: payment,
        gross_annual_rent,
        effective_annual_rent,
        annual_operating_expenses,
        net_operating_income,
        annual_cash_flow,
        monthly_cash_flow: annual_cash_flow / 12.0,
        cap_rate_pct: ratio_or_zero(net_operating_income, input.purchase_price) * 100.0,
        cash_on_cash_pct: ratio_or_zero(annual_cash_flow, cash_invested) * 100.0,
        gross_rent_multiplier: ratio_or_zero(input.purchase_price, gross_annual_rent),
        debt_service_coverage: if annual_debt_service > 0.0 {
            Some(net_operating_income / annual_debt_service)
        } else {
            None
        },
        future_value,
        equity_at_end,
        total_profit,
        total_return_pct: total_return * 100.0,
        annualized_return_pct,
        yearly,
    })
}

/// Equity and cumulative cash flow by year.
pub fn charts(_input: &InvestmentInput, result: &InvestmentResult) -> Vec<ChartData> {
    let labels = result.yearly.iter().map(|y| format!("Year {}", y.year)).collect();
    let chart = ChartData::bar(ChartId::Investment, labels)
        .with_series("Equity", result.yearly.iter().map(|y| y.equity).collect())
        .with_series(
            "Cumulative Cash Flow",
            result.yearly.iter().map(|y| y.cumulative_cash_flow).collect(),
        );
    vec![chart]
}

pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = InvestmentInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(
        CalculatorId::Investment,
        result.summary(),
        charts(&input, &result),
        &result,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_cash() -> InvestmentInput {
        InvestmentInput {
            purchase_price: 200_000.0,
            down_payment_pct: 100.0,
            closing_costs: 0.0,
            monthly_rent: 2_000.0,
            expenses_pct: 40.0,
            vacancy_pct: 0.0,
            appreciation_pct: 0.0,
            holding_years: 5,
            ..InvestmentInput::default()
        }
    }

    #[test]
    fn test_all_cash_returns() {
        let result = calculate(&all_cash()).unwrap();
        // 24000 rent, 40% expenses -> NOI 14400
        assert!((result.net_operating_income - 14_400.0).abs() < 1e-9);
        assert!((result.cap_rate_pct - 7.2).abs() < 1e-9);
        // No debt: cash flow equals NOI and cash-on-cash equals cap rate
        assert!((result.cash_on_cash_pct - result.cap_rate_pct).abs() < 1e-9);
        assert!(result.debt_service_coverage.is_none());
        // 5 years flat: 72000 profit on 200000
        assert!((result.total_profit - 72_000.0).abs() < 1e-6);
        assert!((result.gross_rent_multiplier - 200_000.0 / 24_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_financed_defaults() {
        let result = calculate(&InvestmentInput::default()).unwrap();
        // 250k, 25% down, 7500 closing
        assert!((result.cash_invested - 70_000.0).abs() < 1e-9);
        assert!((result.loan_amount - 187_500.0).abs() < 1e-9);
        assert!((result.monthly_mortgage_payment - 1247.44).abs() < 0.01);
        assert!(result.debt_service_coverage.is_some());
        assert_eq!(result.yearly.len(), 10);
        // Equity grows as the loan amortizes and the property appreciates
        assert!(result.yearly[9].equity > result.yearly[0].equity);
        assert!(result.future_value > 250_000.0);
    }

    #[test]
    fn test_vacancy_reduces_income() {
        let mut input = all_cash();
        input.vacancy_pct = 10.0;
        let result = calculate(&input).unwrap();
        assert!((result.effective_annual_rent - 21_600.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_cash_in_has_no_return_ratio() {
        let input = InvestmentInput {
            down_payment_pct: 0.0,
            closing_costs: 0.0,
            ..InvestmentInput::default()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.cash_invested, 0.0);
        assert_eq!(result.cash_on_cash_pct, 0.0);
        assert!(result.annualized_return_pct.is_none());
    }

    #[test]
    fn test_chart_has_one_bar_per_year() {
        let input = all_cash();
        let result = calculate(&input).unwrap();
        let charts = charts(&input, &result);
        assert_eq!(charts[0].chart, ChartId::Investment);
        assert_eq!(charts[0].labels.len(), 5);
        assert_eq!(charts[0].datasets.len(), 2);
    }
}
