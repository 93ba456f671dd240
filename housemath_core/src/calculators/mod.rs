//! # Real Estate Calculators
//!
//! Every calculator follows the same pattern:
//!
//! - `FIELDS` - Static table of the inputs it reads (labels, defaults, ranges)
//! - `*Input` - Typed inputs (JSON-serializable), built with `from_values`
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(&input) -> CalcResult<*Result>` - Pure calculation function
//! - `compute(&values) -> CalcResult<CalculationOutput>` - The registry entry
//!   point: parse, calculate, summarize, chart
//!
//! ## Available Calculators
//!
//! - [`mortgage`] - Monthly payment breakdown and amortization
//! - [`investment`] - Rental property returns over a holding period
//! - [`cashflow`] - Monthly rental income vs. expenses
//! - [`closing`] - Itemized buyer closing costs
//! - [`buyer`] - Total cash needed at closing
//! - [`commission`] - Commission split between sides, brokerage and agent
//! - [`comparison`] - Two loan offers side by side
//! - [`rentbuy`] - Cost of renting vs. buying over time
//! - [`refinance`] - Savings and break-even of a refinance
//! - [`heloc`] - Home equity line of credit sizing and payments
//! - [`flip`] - Fix-and-flip profit and the 70% rule
//! - [`brrrr`] - Buy, rehab, rent, refinance, repeat

pub mod brrrr;
pub mod buyer;
pub mod cashflow;
pub mod closing;
pub mod commission;
pub mod comparison;
pub mod flip;
pub mod heloc;
pub mod investment;
pub mod mortgage;
pub mod refinance;
pub mod rentbuy;

use serde::{Deserialize, Serialize};

use crate::charts::ChartData;
use crate::errors::{CalcError, CalcResult};
use crate::ids::CalculatorId;
use crate::inputs::{InputField, InputValues};
use crate::units::{Dollars, Percent};

/// Signature shared by every calculator's `compute` entry point.
pub type ComputeFn = fn(&InputValues) -> CalcResult<CalculationOutput>;

/// One labelled figure for display (result cards, CLI output, reports).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub label: String,
    pub value: String,
}

impl SummaryLine {
    pub fn text(label: impl Into<String>, value: impl Into<String>) -> Self {
        SummaryLine {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn money(label: impl Into<String>, amount: f64) -> Self {
        Self::text(label, Dollars(amount).to_string())
    }

    pub fn percent(label: impl Into<String>, pct: f64) -> Self {
        Self::text(label, Percent(pct).to_string())
    }

    pub fn months(label: impl Into<String>, months: Option<f64>) -> Self {
        match months {
            Some(m) => Self::text(label, format!("{} months", m)),
            None => Self::text(label, "never"),
        }
    }
}

/// What a dispatched calculation hands back to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutput {
    pub calculator: CalculatorId,
    pub summary: Vec<SummaryLine>,
    pub charts: Vec<ChartData>,
    /// The calculator's typed result, serialized
    pub detail: serde_json::Value,
}

impl CalculationOutput {
    /// Empty output for `calculator`.
    pub fn new(calculator: CalculatorId) -> Self {
        CalculationOutput {
            calculator,
            summary: Vec::new(),
            charts: Vec::new(),
            detail: serde_json::Value::Null,
        }
    }

    /// Assemble an output from a typed result.
    pub fn build<T: Serialize>(
        calculator: CalculatorId,
        summary: Vec<SummaryLine>,
        charts: Vec<ChartData>,
        detail: &T,
    ) -> CalcResult<Self> {
        let detail = serde_json::to_value(detail).map_err(CalcError::serialization)?;
        Ok(CalculationOutput {
            calculator,
            summary,
            charts,
            detail,
        })
    }

    /// Look up a summary value by label.
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.summary
            .iter()
            .find(|line| line.label == label)
            .map(|line| line.value.as_str())
    }
}

/// The built-in compute function for a tab, if it has one.
pub fn compute_fn(id: CalculatorId) -> Option<ComputeFn> {
    let f: ComputeFn = match id {
        CalculatorId::Mortgage => mortgage::compute,
        CalculatorId::Investment => investment::compute,
        CalculatorId::Cashflow => cashflow::compute,
        CalculatorId::Closing => closing::compute,
        CalculatorId::Buyer => buyer::compute,
        CalculatorId::Commission => commission::compute,
        CalculatorId::Comparison => comparison::compute,
        CalculatorId::Rentbuy => rentbuy::compute,
        CalculatorId::Refinance => refinance::compute,
        CalculatorId::Heloc => heloc::compute,
        CalculatorId::Flip => flip::compute,
        CalculatorId::Brrrr => brrrr::compute,
        CalculatorId::Home | CalculatorId::Report => return None,
    };
    Some(f)
}

/// Input table for a tab (empty for view-only tabs).
pub fn fields_for(id: CalculatorId) -> &'static [InputField] {
    match id {
        CalculatorId::Mortgage => mortgage::FIELDS,
        CalculatorId::Investment => investment::FIELDS,
        CalculatorId::Cashflow => cashflow::FIELDS,
        CalculatorId::Closing => closing::FIELDS,
        CalculatorId::Buyer => buyer::FIELDS,
        CalculatorId::Commission => commission::FIELDS,
        CalculatorId::Comparison => comparison::FIELDS,
        CalculatorId::Rentbuy => rentbuy::FIELDS,
        CalculatorId::Refinance => refinance::FIELDS,
        CalculatorId::Heloc => heloc::FIELDS,
        CalculatorId::Flip => flip::FIELDS,
        CalculatorId::Brrrr => brrrr::FIELDS,
        CalculatorId::Home | CalculatorId::Report => &[],
    }
}

/// Chart x-axis labels for checkpoint years: every 5th year plus the last.
pub(crate) fn checkpoint_years(last_year: u32) -> Vec<u32> {
    let mut years: Vec<u32> = (1..=last_year).filter(|y| y % 5 == 0).collect();
    if years.last() != Some(&last_year) && last_year > 0 {
        years.push(last_year);
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_computable_tab_has_fn_and_fields() {
        for id in CalculatorId::computable() {
            assert!(compute_fn(id).is_some(), "{} has no compute fn", id);
            assert!(!fields_for(id).is_empty(), "{} has no fields", id);
        }
        assert!(compute_fn(CalculatorId::Home).is_none());
        assert!(fields_for(CalculatorId::Report).is_empty());
    }

    #[test]
    fn test_defaults_compute_for_every_calculator() {
        for id in CalculatorId::computable() {
            let f = compute_fn(id).unwrap();
            let defaults = InputValues::defaults(fields_for(id));
            let output = f(&defaults)
                .unwrap_or_else(|e| panic!("{} failed on defaults: {}", id, e));
            assert_eq!(output.calculator, id);
            assert!(!output.summary.is_empty(), "{} produced no summary", id);
            assert!(output.detail.is_object(), "{} produced no detail", id);
        }
    }

    #[test]
    fn test_field_defaults_are_in_range() {
        for id in CalculatorId::computable() {
            for field in fields_for(id) {
                assert!(
                    field.check(field.default).is_ok(),
                    "{}.{} default out of range",
                    id,
                    field.name
                );
            }
        }
    }

    #[test]
    fn test_field_names_unique() {
        for id in CalculatorId::computable() {
            let fields = fields_for(id);
            for (i, a) in fields.iter().enumerate() {
                assert!(
                    fields[i + 1..].iter().all(|b| b.name != a.name),
                    "{} declares {} twice",
                    id,
                    a.name
                );
            }
        }
    }

    #[test]
    fn test_checkpoint_years() {
        assert_eq!(checkpoint_years(30), vec![5, 10, 15, 20, 25, 30]);
        assert_eq!(checkpoint_years(7), vec![5, 7]);
        assert_eq!(checkpoint_years(3), vec![3]);
        assert!(checkpoint_years(0).is_empty());
    }

    #[test]
    fn test_summary_line_formats() {
        assert_eq!(SummaryLine::money("x", 1234.5).value, "$1,234.50");
        assert_eq!(SummaryLine::percent("x", 7.126).value, "7.13%");
        assert_eq!(SummaryLine::months("x", None).value, "never");
        assert_eq!(SummaryLine::months("x", Some(18.0)).value, "18 months");
    }
}
