//! # Commission Calculator
//!
//! Splits a sale's total commission between the listing and buyer sides,
//! then the listing side between brokerage and agent.

use serde::{Deserialize, Serialize};

use crate::calculators::{CalculationOutput, SummaryLine};
use crate::charts::{ChartData, ChartId};
use crate::errors::CalcResult;
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

const SALE_PRICE: InputField = InputField::new(
    "sale_price",
    "Sale Price",
    400_000.0,
    1.0,
    100_000_000.0,
    FieldUnit::Currency,
);
const COMMISSION: InputField = InputField::new(
    "commission_pct",
    "Total Commission",
    5.5,
    0.0,
    20.0,
    FieldUnit::Percent,
);
const LISTING_SIDE: InputField = InputField::new(
    "listing_side_pct",
    "Listing Side Share",
    50.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const AGENT_SPLIT: InputField = InputField::new(
    "agent_split_pct",
    "Agent Split",
    70.0,
    0.0,
    100.0,
    FieldUnit::Percent,
);
const TRANSACTION_FEE: InputField = InputField::new(
    "transaction_fee",
    "Transaction Fee",
    395.0,
    0.0,
    100_000.0,
    FieldUnit::Currency,
);

pub const FIELDS: &[InputField] = &[
    SALE_PRICE,
    COMMISSION,
    LISTING_SIDE,
    AGENT_SPLIT,
    TRANSACTION_FEE,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionInput {
    pub sale_price: f64,
    pub commission_pct: f64,
    /// Share of the total commission paid to the listing side
    pub listing_side_pct: f64,
    /// Listing agent's share of the listing side
    pub agent_split_pct: f64,
    pub transaction_fee: f64,
}

impl Default for CommissionInput {
    fn default() -> Self {
        CommissionInput {
            sale_price: SALE_PRICE.default,
            commission_pct: COMMISSION.default,
            listing_side_pct: LISTING_SIDE.default,
            agent_split_pct: AGENT_SPLIT.default,
            transaction_fee: TRANSACTION_FEE.default,
        }
    }
}

impl CommissionInput {
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(CommissionInput {
            sale_price: values.number(&SALE_PRICE)?,
            commission_pct: values.number(&COMMISSION)?,
            listing_side_pct: values.number(&LISTING_SIDE)?,
            agent_split_pct: values.number(&AGENT_SPLIT)?,
            transaction_fee: values.number(&TRANSACTION_FEE)?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        SALE_PRICE.check(self.sale_price)?;
        COMMISSION.check(self.commission_pct)?;
        LISTING_SIDE.check(self.listing_side_pct)?;
        AGENT_SPLIT.check(self.agent_split_pct)?;
        TRANSACTION_FEE.check(self.transaction_fee)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionResult {
    pub total_commission: f64,
    pub listing_side: f64,
    pub buyer_side: f64,
    pub brokerage_share: f64,
    pub agent_gross: f64,
    /// Agent gross less the transaction fee (never negative)
    pub agent_net: f64,
    pub seller_net: f64,
}

impl CommissionResult {
    pub fn summary(&self) -> Vec<SummaryLine> {
        vec![
            SummaryLine::money("Total Commission", self.total_commission),
            SummaryLine::money("Listing Side", self.listing_side),
            SummaryLine::money("Buyer Side", self.buyer_side),
            SummaryLine::money("Brokerage Share", self.brokerage_share),
            SummaryLine::money("Agent Gross", self.agent_gross),
            SummaryLine::money("Agent Net", self.agent_net),
            SummaryLine::money("Seller Net", self.seller_net),
        ]
    }
}

pub fn calculate(input: &CommissionInput) -> CalcResult<CommissionResult> {
    input.validate()?;

    let total_commission = input.sale_price * input.commission_pct / 100.0;
    let listing_side = total_commission * input.listing_side_pct / 100.0;
    let buyer_side = total_commission - listing_side;
    let agent_gross = listing_side * input.agent_split_pct / 100.0;
    let brokerage_share = listing_side - agent_gross;

    Ok(CommissionResult {
        total_commission,
        listing_side,
        buyer_side,
        brokerage_share,
        agent_gross,
        agent_net: (agent_gross - input.transaction_fee).max(0.0),
        seller_net: input.sale_price - total_commission,
    })
}

pub fn charts(_input: &CommissionInput, result: &CommissionResult) -> Vec<ChartData> {
    let fees = result.agent_gross - result.agent_net;
    vec![ChartData::doughnut(
        ChartId::Commission,
        vec![
            ("Buyer Side", result.buyer_side),
            ("Brokerage", result.brokerage_share),
            ("Agent Net", result.agent_net),
            ("Fees", fees),
        ],
    )]
}

pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = CommissionInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(
        CalculatorId::Commission,
        result.summary(),
        charts(&input, &result),
        &result,
    )
}
