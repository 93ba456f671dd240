//! # Calculator Identifiers
//!
//! The fixed set of tabs the application knows about. Every UI key (tab,
//! panel element, calculate button) is derived from a [`CalculatorId`], so a
//! typo becomes a parse failure instead of a silent lookup miss.
//!
//! `home` and `report` are view-only tabs; the remaining twelve have a
//! computation behind them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;

/// Identifier for one calculator tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculatorId {
    Home,
    Mortgage,
    Investment,
    Cashflow,
    Closing,
    Buyer,
    Commission,
    Comparison,
    Rentbuy,
    Refinance,
    Heloc,
    Flip,
    Brrrr,
    Report,
}

/// Every tab, in navigation order.
pub const ALL_CALCULATORS: [CalculatorId; 14] = [
    CalculatorId::Home,
    CalculatorId::Mortgage,
    CalculatorId::Investment,
    CalculatorId::Cashflow,
    CalculatorId::Closing,
    CalculatorId::Buyer,
    CalculatorId::Commission,
    CalculatorId::Comparison,
    CalculatorId::Rentbuy,
    CalculatorId::Refinance,
    CalculatorId::Heloc,
    CalculatorId::Flip,
    CalculatorId::Brrrr,
    CalculatorId::Report,
];

impl CalculatorId {
    /// Key used in tab attributes and serialized data
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculatorId::Home => "home",
            CalculatorId::Mortgage => "mortgage",
            CalculatorId::Investment => "investment",
            CalculatorId::Cashflow => "cashflow",
            CalculatorId::Closing => "closing",
            CalculatorId::Buyer => "buyer",
            CalculatorId::Commission => "commission",
            CalculatorId::Comparison => "comparison",
            CalculatorId::Rentbuy => "rentbuy",
            CalculatorId::Refinance => "refinance",
            CalculatorId::Heloc => "heloc",
            CalculatorId::Flip => "flip",
            CalculatorId::Brrrr => "brrrr",
            CalculatorId::Report => "report",
        }
    }

    /// Human-readable tab title
    pub fn display_name(&self) -> &'static str {
        match self {
            CalculatorId::Home => "Home",
            CalculatorId::Mortgage => "Mortgage",
            CalculatorId::Investment => "Investment Property",
            CalculatorId::Cashflow => "Cash Flow",
            CalculatorId::Closing => "Closing Costs",
            CalculatorId::Buyer => "Buyer Cash to Close",
            CalculatorId::Commission => "Commission",
            CalculatorId::Comparison => "Loan Comparison",
            CalculatorId::Rentbuy => "Rent vs Buy",
            CalculatorId::Refinance => "Refinance",
            CalculatorId::Heloc => "HELOC",
            CalculatorId::Flip => "Property Flip",
            CalculatorId::Brrrr => "BRRRR Strategy",
            CalculatorId::Report => "Report",
        }
    }

    /// Whether a computation exists for this tab
    pub fn is_computable(&self) -> bool {
        !matches!(self, CalculatorId::Home | CalculatorId::Report)
    }

    /// Panel element key, e.g. `mortgage-calculator`
    pub fn panel_key(&self) -> String {
        format!("{}-calculator", self.as_str())
    }

    /// Calculate-button key, e.g. `calculate-mortgage`
    pub fn button_key(&self) -> String {
        format!("calculate-{}", self.as_str())
    }

    /// Iterate over the tabs that have a computation behind them
    pub fn computable() -> impl Iterator<Item = CalculatorId> {
        ALL_CALCULATORS.into_iter().filter(|id| id.is_computable())
    }
}

impl fmt::Display for CalculatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculatorId {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ALL_CALCULATORS
            .into_iter()
            .find(|id| id.as_str() == key)
            .ok_or_else(|| CalcError::unknown_calculator(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_computable_tabs() {
        assert_eq!(ALL_CALCULATORS.len(), 14);
        assert_eq!(CalculatorId::computable().count(), 12);
        assert!(!CalculatorId::Home.is_computable());
        assert!(!CalculatorId::Report.is_computable());
    }

    #[test]
    fn test_parse_roundtrip() {
        for id in ALL_CALCULATORS {
            assert_eq!(id.as_str().parse::<CalculatorId>().unwrap(), id);
        }
        assert_eq!(" BRRRR ".parse::<CalculatorId>().unwrap(), CalculatorId::Brrrr);
        assert!("taxes".parse::<CalculatorId>().is_err());
    }

    #[test]
    fn test_ui_keys() {
        assert_eq!(CalculatorId::Heloc.panel_key(), "heloc-calculator");
        assert_eq!(CalculatorId::Rentbuy.button_key(), "calculate-rentbuy");
    }

    #[test]
    fn test_serde_uses_lowercase_key() {
        let json = serde_json::to_string(&CalculatorId::Cashflow).unwrap();
        assert_eq!(json, "\"cashflow\"");
        let roundtrip: CalculatorId = serde_json::from_str("\"rentbuy\"").unwrap();
        assert_eq!(roundtrip, CalculatorId::Rentbuy);
    }
}
