//! # Closing Cost Calculator
//!
//! Itemized buyer closing costs for a financed purchase. Percent-based items
//! are charged on either the loan (origination) or the price (title, transfer
//! tax); prepaid escrow covers a number of months of tax and insurance.

use serde::{Deserialize, Serialize};

use crate::calculators::{CalculationOutput, SummaryLine};
use crate::charts::{ChartData, ChartId};
use crate::errors::CalcResult;
use crate::finance::ratio_or_zero;
use crate::ids::CalculatorId;
use crate::inputs::{FieldUnit, InputField, InputValues};

const PURCHASE_PRICE: InputField = InputField::new(
    "purchase_price",
    "Purchase Price",
    300_000.0,
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
const ORIGINATION: InputField = InputField::new(
    "origination_pct",
    "Origination Fee",
    1.0,
    0.0,
    10.0,
    FieldUnit::Percent,
);
const APPRAISAL: InputField = InputField::new(
    "appraisal_fee",
    "Appraisal",
    550.0,
    0.0,
    100_000.0,
    FieldUnit::Currency,
);
const INSPECTION: InputField = InputField::new(
    "inspection_fee",
    "Inspection",
    450.0,
    0.0,
    100_000.0,
    FieldUnit::Currency,
);
const TITLE: InputField = InputField::new(
    "title_insurance_pct",
    "Title Insurance",
    0.5,
    0.0,
    5.0,
    FieldUnit::Percent,
);
const ESCROW: InputField = InputField::new(
    "escrow_fee",
    "Escrow / Settlement",
    1_200.0,
    0.0,
    100_000.0,
    FieldUnit::Currency,
);
const RECORDING: InputField = InputField::new(
    "recording_fee",
    "Recording",
    150.0,
    0.0,
    100_000.0,
    FieldUnit::Currency,
);
const TRANSFER_TAX: InputField = InputField::new(
    "transfer_tax_pct",
    "Transfer Tax",
    0.0,
    0.0,
    10.0,
    FieldUnit::Percent,
);
const PROPERTY_TAX: InputField = InputField::new(
    "property_tax_annual",
    "Property Tax (annual)",
    3_500.0,
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
const PREPAID_MONTHS: InputField = InputField::new(
    "prepaid_months",
    "Prepaid Escrow",
    3.0,
    0.0,
    24.0,
    FieldUnit::Months,
);

pub const FIELDS: &[InputField] = &[
    PURCHASE_PRICE,
    DOWN_PAYMENT,
    ORIGINATION,
    APPRAISAL,
    INSPECTION,
    TITLE,
    ESCROW,
    RECORDING,
    TRANSFER_TAX,
    PROPERTY_TAX,
    INSURANCE,
    PREPAID_MONTHS,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingInput {
    pub purchase_price: f64,
    pub down_payment_pct: f64,
    pub origination_pct: f64,
    pub appraisal_fee: f64,
    pub inspection_fee: f64,
    pub title_insurance_pct: f64,
    pub escrow_fee: f64,
    pub recording_fee: f64,
    pub transfer_tax_pct: f64,
    pub property_tax_annual: f64,
    pub insurance_annual: f64,
    pub prepaid_months: u32,
}

impl Default for ClosingInput {
    fn default() -> Self {
        ClosingInput {
            purchase_price: PURCHASE_PRICE.default,
            down_payment_pct: DOWN_PAYMENT.default,
            origination_pct: ORIGINATION.default,
            appraisal_fee: APPRAISAL.default,
            inspection_fee: INSPECTION.default,
            title_insurance_pct: TITLE.default,
            escrow_fee: ESCROW.default,
            recording_fee: RECORDING.default,
            transfer_tax_pct: TRANSFER_TAX.default,
            property_tax_annual: PROPERTY_TAX.default,
            insurance_annual: INSURANCE.default,
            prepaid_months: PREPAID_MONTHS.default as u32,
        }
    }
}

impl ClosingInput {
    pub fn from_values(values: &InputValues) -> CalcResult<Self> {
        values.check_known(FIELDS)?;
        Ok(ClosingInput {
            purchase_price: values.number(&PURCHASE_PRICE)?,
            down_payment_pct: values.number(&DOWN_PAYMENT)?,
            origination_pct: values.number(&ORIGINATION)?,
            appraisal_fee: values.number(&APPRAISAL)?,
            inspection_fee: values.number(&INSPECTION)?,
            title_insurance_pct: values.number(&TITLE)?,
            escrow_fee: values.number(&ESCROW)?,
            recording_fee: values.number(&RECORDING)?,
            transfer_tax_pct: values.number(&TRANSFER_TAX)?,
            property_tax_annual: values.number(&PROPERTY_TAX)?,
            insurance_annual: values.number(&INSURANCE)?,
            prepaid_months: values.whole(&PREPAID_MONTHS)?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        PURCHASE_PRICE.check(self.purchase_price)?;
        DOWN_PAYMENT.check(self.down_payment_pct)?;
        ORIGINATION.check(self.origination_pct)?;
        APPRAISAL.check(self.appraisal_fee)?;
        INSPECTION.check(self.inspection_fee)?;
        TITLE.check(self.title_insurance_pct)?;
        ESCROW.check(self.escrow_fee)?;
        RECORDING.check(self.recording_fee)?;
        TRANSFER_TAX.check(self.transfer_tax_pct)?;
        PROPERTY_TAX.check(self.property_tax_annual)?;
        INSURANCE.check(self.insurance_annual)?;
        PREPAID_MONTHS.check(self.prepaid_months as f64)?;
        Ok(())
    }

    pub fn loan_amount(&self) -> f64 {
        self.purchase_price * (1.0 - self.down_payment_pct / 100.0)
    }
}

/// One line on the closing statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingItem {
    pub label: String,
    pub amount: f64,
}

impl ClosingItem {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        ClosingItem {
            label: label.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosingResult {
    pub loan_amount: f64,
    pub items: Vec<ClosingItem>,
    pub lender_fees: f64,
    pub third_party_fees: f64,
    pub prepaids: f64,
    pub total_closing_costs: f64,
    /// Total as a percent of the purchase price
    pub percent_of_price: f64,
}

impl ClosingResult {
    pub fn summary(&self) -> Vec<SummaryLine> {
        let mut lines: Vec<SummaryLine> = self
            .items
            .iter()
            .filter(|item| item.amount > 0.0)
            .map(|item| SummaryLine::money(item.label.clone(), item.amount))
            .collect();
        lines.push(SummaryLine::money("Total Closing Costs", self.total_closing_costs));
        lines.push(SummaryLine::percent("Percent of Price", self.percent_of_price));
        lines
    }
}

pub fn calculate(input: &ClosingInput) -> CalcResult<ClosingResult> {
    input.validate()?;

    let loan_amount = input.loan_amount();
    // Appraisal and origination only apply when something is financed
    let financed = loan_amount > 0.0;
    let origination = if financed {
        loan_amount * input.origination_pct / 100.0
    } else {
        0.0
    };
    let appraisal = if financed { input.appraisal_fee } else { 0.0 };
    let title = input.purchase_price * input.title_insurance_pct / 100.0;
    let transfer_tax = input.purchase_price * input.transfer_tax_pct / 100.0;
    let months = input.prepaid_months as f64;
    let prepaid_tax = input.property_tax_annual / 12.0 * months;
    let prepaid_insurance = input.insurance_annual / 12.0 * months;

    let items = vec![
        ClosingItem::new("Origination", origination),
        ClosingItem::new("Appraisal", appraisal),
        ClosingItem::new("Inspection", input.inspection_fee),
        ClosingItem::new("Title Insurance", title),
        ClosingItem::new("Escrow / Settlement", input.escrow_fee),
        ClosingItem::new("Recording", input.recording_fee),
        ClosingItem::new("Transfer Tax", transfer_tax),
        ClosingItem::new("Prepaid Property Tax", prepaid_tax),
        ClosingItem::new("Prepaid Insurance", prepaid_insurance),
    ];

    let lender_fees = origination + appraisal;
    let prepaids = prepaid_tax + prepaid_insurance;
    let total_closing_costs: f64 = items.iter().map(|i| i.amount).sum();
    let third_party_fees = total_closing_costs - lender_fees - prepaids;

    Ok(ClosingResult {
        loan_amount,
        items,
        lender_fees,
        third_party_fees,
        prepaids,
        total_closing_costs,
        percent_of_price: ratio_or_zero(total_closing_costs, input.purchase_price) * 100.0,
    })
}

/// Lender fees vs. third-party fees vs. prepaids.
pub fn charts(_input: &ClosingInput, result: &ClosingResult) -> Vec<ChartData> {
    vec![ChartData::doughnut(
        ChartId::Closing,
        vec![
            ("Lender Fees", result.lender_fees),
            ("Third-Party Fees", result.third_party_fees),
            ("Prepaids", result.prepaids),
        ],
    )]
}

pub fn compute(values: &InputValues) -> CalcResult<CalculationOutput> {
    let input = ClosingInput::from_values(values)?;
    let result = calculate(&input)?;
    CalculationOutput::build(
        CalculatorId::Closing,
        result.summary(),
        charts(&input, &result),
        &result,
    )
}
