//! # Rent vs. Buy Calculator
//!
//! Year-by-year net worth of a buyer and an otherwise identical renter.
//!
//! ## Model
//!
//! - The buyer pays down payment + closing costs up front; the renter invests
//!   that same cash at the investment return instead
//! - Each year, whichever household has the lower housing cost invests the
//!   difference
//! - Buyer net worth = home value less selling costs, less loan balance, plus
//!   the buyer's portfolio
//! - Property tax and maintenance are percents of the current home value

use serde::{Deserialize, Serialize};

use crate::calculators::{CalculationOutput, SummaryLine};
use crate::errors::CalcResult;
use crate::finance::{compound, monthly_payment, remaining_balance};
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

const HOME_PRICE: InputField = InputField::new(
    "home_price",
    "Home Price",
    400_000.0,
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
    "property_tax_pct",
    "Property Tax Rate",
    1.2,
    0.0,
    10.0,
    FieldUnit::Percent,
);
const MAINTENANCE: InputField = InputField::new(
    "maintenance_pct",
    "Maintenance",
    1.0,
    0.0,
    10.0,
    FieldUnit::Percent,
);
const INSURANCE: InputField = InputField::new(
    "insurance_annual",
    "Insurance (annual)",
    1_500.0,
    0.0,
    1_000_000.0,
    FieldUnit::Currency,
);
const CLOSING_COSTS: InputField = InputField::new(
    "closing_costs_pct",
    "Closing Costs",
    3.0,
    0.0,
    15.0,
    FieldUnit::Percent,
);
const SELLING_COSTS: InputField = InputField::new(
    "selling_costs_pct",
    "Selling Costs",
    6.0,
    0.0,
    15.0,
    FieldUnit::Percent,
);
const MONTHLY_RENT: InputField = InputField::new(
    "monthly_rent",
    "Monthly Rent",
    2_200.0,
    0.0,
    10_000_000.0,
    FieldUnit::Currency,
);
const RENT_INCREASE: InputField = InputField::new(
    "rent_increase_pct",
    "Annual Rent Increase",
    3.0,
    -10.0,
    30.0,
    FieldUnit::Percent,
);
const APPRECIATION: InputField = InputField::new(
    "appreciation_pct",
    "Home Appreciation",
    3.0,
    -20.0,
    30.0,
    FieldUnit::Percent,
);
const INVESTMENT_RETURN: InputField = InputField::new(
    "investment_return_pct",
    "Investment Return",
    6.0,
    -20.0,
    30.0,
    FieldUnit::Percent,
);
const YEARS: InputField =
    InputField::new("years", "Time Horizon", 10.0, 1.0, 50.0, FieldUnit::Years);

pub const FIELDS: &[InputField] = &[
    HOME_PRICE,
    DOWN_PAYMENT,
    INTEREST_RATE,
    LOAN_TERM,
    PROPERTY_TAX,
    MAINTENANCE,
    INSURANCE,
    CLOSING_COSTS,
    SELLING_COSTS,
    MONTHLY_RENT,
    RENT_INCREASE,
    APPRECIATION,
    INVESTMENT_RETURN,
    YEARS,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentBuyInput {
    pub home_price: f64,
    pub down_payment_pct: f64,
    pub interest_rate_pct: f64,
    pub loan_term_years: u32,
    pub property_tax_pct: f64,
    pub maintenance_pct: f64,
    pub insurance_annual: f64,
    pub closing_costs_pct: f64,
    pub selling_costs_pct: f64,
    pub monthly_rent: f64,
    pub rent_increase_pct: f64,
    pub appreciation_pct: f64,
    pub investment_return_pct: f64,
    pub years: u32,
}

impl Default for RentBuyInput {
    fn default() -> Self {
        RentBuyInput {
            home_price: HOME_PRICE.default,
            down_payment_pct: DOWN_PAYMENT.default,
            interest_rate_pct: INTEREST_RATE.default,
            loan_term_years: LOAN_TERM.default as u32,
            property_tax_pct: PROPERTY_TAX.default,
            maintenance_pct: MAINTENANCE.default,
            insurance_annual: INSURANCE.default,
            closing_costs_pct: CLOSING_COSTS.default,
            selling_costs_pct: SELLING_COSTS.default,
            monthly_rent: MONTHLY_RENT.default,
            rent_increase_pct: RENT_INCREASE.default,
            appreciation_pct: APPRECIATION.default,
            investment_return_pct: INVESTMENT_RETURN.default,
            years: YEARS.default as u32,
        }
    }
}

impl RentBuyInput {
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(RentBuyInput {
            home_price: values.number(&HOME_PRICE)?,
            down_payment_pct: values.number(&DOWN_PAYMENT)?,
            interest_rate_pct: values.number(&INTEREST_RATE)?,
            loan_term_years: values.whole(&LOAN_TERM)?,
            property_tax_pct: values.number(&PROPERTY_TAX)?,
            maintenance_pct: values.number(&MAINTENANCE)?,
            insurance_annual: values.number(&INSURANCE)?,
            closing_costs_pct: values.number(&CLOSING_COSTS)?,
            selling_costs_pct: values.number(&SELLING_COSTS)?,
            monthly_rent: values.number(&MONTHLY_RENT)?,
            rent_increase_pct: values.number(&RENT_INCREASE)?,
            appreciation_pct: values.number(&APPRECIATION)?,
            investment_return_pct: values.number(&INVESTMENT_RETURN)?,
            years: values.whole(&YEARS)?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        HOME_PRICE.check(self.home_price)?;
        DOWN_PAYMENT.check(self.down_payment_pct)?;
        INTEREST_RATE.check(self.interest_rate_pct)?;
        LOAN_TERM.check(self.loan_term_years as f64)?;
        PROPERTY_TAX.check(self.property_tax_pct)?;
        MAINTENANCE.check(self.maintenance_pct)?;
        INSURANCE.check(self.insurance_annual)?;
        CLOSING_COSTS.check(self.closing_costs_pct)?;
        SELLING_COSTS.check(self.selling_costs_pct)?;
        MONTHLY_RENT.check(self.monthly_rent)?;
        RENT_INCREASE.check(self.rent_increase_pct)?;
        APPRECIATION.check(self.appreciation_pct)?;
        INVESTMENT_RETURN.check(self.investment_return_pct)?;
        YEARS.check(self.years as f64)?;
        Ok(())
    }
}

/// Both households at the end of one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentBuyYear {
    pub year: u32,
    pub rent_cost: f64,
    pub buy_cost: f64,
    pub home_value: f64,
    pub loan_balance: f64,
    pub buyer_net_worth: f64,
    pub renter_net_worth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentBuyResult {
    pub monthly_mortgage_payment: f64,
    pub upfront_cash: f64,
    pub total_rent_paid: f64,
    pub total_buy_cost: f64,
    pub final_buyer_net_worth: f64,
    pub final_renter_net_worth: f64,
    /// First year the buyer's net worth catches the renter's
    pub break_even_year: Option<u32>,
    pub yearly: Vec<RentBuyYear>,
}

impl RentBuyResult {
    pub fn buying_wins(&self) -> bool {
        self.final_buyer_net_worth >= self.final_renter_net_worth
    }

    pub fn verdict(&self) -> &'static str {
        if self.buying_wins() {
            "Buying comes out ahead"
        } else {
            "Renting comes out ahead"
        }
    }

    pub fn summary(&self) -> Vec<SummaryLine> {
        let break_even = match self.break_even_year {
            Some(year) => format!("year {}", year),
            None => "never".to_string(),
        };
        vec![
            SummaryLine::money("Mortgage Payment", self.monthly_mortgage_payment),
            SummaryLine::money("Total Rent Paid", self.total_rent_paid),
            SummaryLine::money("Total Cost of Owning", self.total_buy_cost),
            SummaryLine::money("Buyer Net Worth", self.final_buyer_net_worth),
            SummaryLine::money("Renter Net Worth", self.final_renter_net_worth),
            SummaryLine::text("Break-even", break_even),
            SummaryLine::text("Verdict", self.verdict()),
        ]
    }
}

pub fn calculate(input: &RentBuyInput) -> CalcResult<RentBuyResult> {
    input.validate()?;

    let down_payment = input.home_price * input.down_payment_pct / 100.0;
    let loan_amount = input.home_price - down_payment;
    let closing_costs = input.home_price * input.closing_costs_pct / 100.0;
    let term_months = input.loan_term_years * 12;
    let payment = monthly_payment(loan_amount, input.interest_rate_pct, term_months);
    let growth = 1.0 + input.investment_return_pct / 100.0;

    let upfront_cash = down_payment + closing_costs;
    let mut renter_portfolio = upfront_cash;
    let mut buyer_portfolio = 0.0;
    let mut total_rent_paid = 0.0;
    let mut total_buy_cost = upfront_cash;
    let mut break_even_year = None;
    let mut yearly = Vec::with_capacity(input.years as usize);

    for year in 1..=input.years {
        let value_start = compound(input.home_price, input.appreciation_pct, (year - 1) as f64);
        let home_value = compound(input.home_price, input.appreciation_pct, year as f64);

        let months_paid = term_months.saturating_sub((year - 1) * 12).min(12);
        let buy_cost = payment * months_paid as f64
            + value_start * (input.property_tax_pct + input.maintenance_pct) / 100.0
            + input.insurance_annual;
        let rent_growth = (1.0 + input.rent_increase_pct / 100.0).powi(year as i32 - 1);
        let rent_cost = input.monthly_rent * 12.0 * rent_growth;

        renter_portfolio *= growth;
        buyer_portfolio *= growth;
        if buy_cost > rent_cost {
            renter_portfolio += buy_cost - rent_cost;
        } else {
            buyer_portfolio += rent_cost - buy_cost;
        }

        let payments_made = (year * 12).min(term_months);
        let loan_balance =
            remaining_balance(loan_amount, input.interest_rate_pct, term_months, payments_made);
        let buyer_net_worth =
            home_value * (1.0 - input.selling_costs_pct / 100.0) - loan_balance + buyer_portfolio;

        if break_even_year.is_none() && buyer_net_worth >= renter_portfolio {
            break_even_year = Some(year);
        }

        total_rent_paid += rent_cost;
        total_buy_cost += buy_cost;
        yearly.push(RentBuyYear {
            year,
            rent_cost,
            buy_cost,
            home_value,
            loan_balance,
            buyer_net_worth,
            renter_net_worth: renter_portfolio,
        });
    }

    let (final_buyer_net_worth, final_renter_net_worth) = yearly
        .last()
        .map(|y| (y.buyer_net_worth, y.renter_net_worth))
        .unwrap_or((0.0, upfront_cash));

    Ok(RentBuyResult {
        monthly_mortgage_payment: payment,
        upfront_cash,
        total_rent_paid,
        total_buy_cost,
        final_buyer_net_worth,
        final_renter_net_worth,
        break_even_year,
        yearly,
    })
}

pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = RentBuyInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(CalculatorId::Rentbuy, result.summary(), Vec::new(), &result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_projection() {
        let result = calculate(&RentBuyInput::default()).unwrap();
        assert_eq!(result.yearly.len(), 10);
        assert!((result.upfront_cash - 92_000.0).abs() < 1e-9);
        assert!((result.monthly_mortgage_payment - 2_022.62).abs() < 0.01);
        // First-year rent is flat 12 months of the starting rent
        assert!((result.yearly[0].rent_cost - 26_400.0).abs() < 1e-9);
        assert!((result.total_rent_paid - 302_646.41).abs() < 0.01);
    }

    #[test]
    fn test_break_even_matches_yearly_rows() {
        let result = calculate(&RentBuyInput::default()).unwrap();
        match result.break_even_year {
            Some(year) => {
                let row = &result.yearly[(year - 1) as usize];
                assert!(row.buyer_net_worth >= row.renter_net_worth);
                assert!(result.yearly[..(year - 1) as usize]
                    .iter()
                    .all(|r| r.buyer_net_worth < r.renter_net_worth));
            }
            None => assert!(result.yearly.iter().all(|r| r.buyer_net_worth < r.renter_net_worth)),
        }
    }

    #[test]
    fn test_cheap_rent_favors_renting() {
        let input = RentBuyInput {
            monthly_rent: 500.0,
            rent_increase_pct: 0.0,
            appreciation_pct: 0.0,
            ..RentBuyInput::default()
        };
        let result = calculate(&input).unwrap();
        assert!(!result.buying_wins());
        assert_eq!(result.break_even_year, None);
        assert_eq!(result.verdict(), "Renting comes out ahead");
    }

    #[test]
    fn test_horizon_beyond_loan_term() {
        let input = RentBuyInput {
            loan_term_years: 5,
            years: 8,
            ..RentBuyInput::default()
        };
        let result = calculate(&input).unwrap();
        let after_payoff = &result.yearly[6];
        assert!(after_payoff.loan_balance.abs() < 1e-6);
        // No mortgage payments once the loan is paid off
        let expected = compound(400_000.0, 3.0, 6.0) * 0.022 + 1_500.0;
        assert!((after_payoff.buy_cost - expected).abs() < 1e-6);
    }
}
