//! # Saved Reports
//!
//! The `Report` struct is the container behind the report tab: a set of
//! saved calculator scenarios that can be re-run and rendered together.
//! Reports serialize to `.hmr` (HouseMath report) files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Report
//! ├── meta: ReportMetadata (version, preparer, client, property, timestamps)
//! ├── settings: ReportSettings (title, currency label)
//! └── scenarios: HashMap<Uuid, SavedScenario> (calculator + inputs)
//! ```
//!
//! Only inputs are stored; results are recomputed through the registry when
//! the report is rendered, so a report always reflects the current formulas.
//!
//! ## Example
//!
//! ```rust
//! use housemath_core::ids::CalculatorId;
//! use housemath_core::inputs::InputValues;
//! use housemath_core::registry::CalculatorRegistry;
//! use housemath_core::report::{Report, SavedScenario};
//!
//! let mut report = Report::new("Pat Agent", "The Smiths", "12 Elm St");
//! let base = SavedScenario::new("Base case", CalculatorId::Mortgage, InputValues::new());
//! report.add_scenario(base);
//!
//! let markdown = report.render_markdown(&CalculatorRegistry::builtin());
//! assert!(markdown.contains("$1,438.92"));
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::CalculatorId;
use crate::inputs::InputValues;
use crate::registry::CalculatorRegistry;

/// Current schema version for .hmr files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// File extension for saved reports
pub const REPORT_EXTENSION: &str = "hmr";

/// Root report container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMetadata,
    pub settings: ReportSettings,
    /// Saved scenarios, keyed by UUID
    pub scenarios: HashMap<Uuid, SavedScenario>,
}

impl Report {
    /// Create a new empty report.
    ///
    /// ```rust
    /// use housemath_core::report::Report;
    ///
    /// let report = Report::new("Pat Agent", "The Smiths", "12 Elm St");
    /// assert_eq!(report.meta.client, "The Smiths");
    /// assert_eq!(report.scenario_count(), 0);
    /// ```
    pub fn new(
        preparer: impl Into<String>,
        client: impl Into<String>,
        property_address: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Report {
            meta: ReportMetadata {
                version: SCHEMA_VERSION.to_string(),
                preparer: preparer.into(),
                client: client.into(),
                property_address: property_address.into(),
                created: now,
                modified: now,
            },
            settings: ReportSettings::default(),
            scenarios: HashMap::new(),
        }
    }

    /// Add a scenario. Returns the UUID assigned to it.
    pub fn add_scenario(&mut self, scenario: SavedScenario) -> Uuid {
        let id = Uuid::new_v4();
        self.scenarios.insert(id, scenario);
        self.touch();
        id
    }

    /// Remove a scenario by UUID.
    pub fn remove_scenario(&mut self, id: &Uuid) -> Option<SavedScenario> {
        let scenario = self.scenarios.remove(id);
        if scenario.is_some() {
            self.touch();
        }
        scenario
    }

    pub fn get_scenario(&self, id: &Uuid) -> Option<&SavedScenario> {
        self.scenarios.get(id)
    }

    /// Resolve a full UUID or an unambiguous prefix of one (as printed by
    /// the CLI).
    pub fn find_id(&self, prefix: &str) -> Option<Uuid> {
        let prefix = prefix.trim().to_ascii_lowercase();
        if prefix.is_empty() {
            return None;
        }
        let mut matches = self
            .scenarios
            .keys()
            .filter(|id| id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(id), None) => Some(*id),
            _ => None,
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn scenario_count(&self) -> usize {
        self.scenarios.len()
    }

    /// Scenarios in the order they were saved.
    pub fn ordered_scenarios(&self) -> Vec<(&Uuid, &SavedScenario)> {
        let mut scenarios: Vec<_> = self.scenarios.iter().collect();
        scenarios.sort_by(|(a_id, a), (b_id, b)| {
            a.saved_at
                .cmp(&b.saved_at)
                .then_with(|| a.label.cmp(&b.label))
                .then_with(|| a_id.cmp(b_id))
        });
        scenarios
    }

    /// Re-run every scenario through `registry` and render the results as
    /// Markdown. Failing scenarios render their error instead of a table.
    pub fn render_markdown(&self, registry: &CalculatorRegistry) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}", self.settings.title);
        let _ = writeln!(out);
        if !self.meta.preparer.is_empty() {
            let _ = writeln!(out, "- Prepared by: {}", self.meta.preparer);
        }
        if !self.meta.client.is_empty() {
            let _ = writeln!(out, "- Client: {}", self.meta.client);
        }
        if !self.meta.property_address.is_empty() {
            let _ = writeln!(out, "- Property: {}", self.meta.property_address);
        }
        let _ = writeln!(out, "- Amounts in: {}", self.settings.currency_label);
        let _ = writeln!(out, "- Updated: {}", self.meta.modified.format("%Y-%m-%d %H:%M UTC"));

        if self.scenarios.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "_No saved scenarios._");
            return out;
        }

        for (_, scenario) in self.ordered_scenarios() {
            let _ = writeln!(out);
            let _ = writeln!(out, "## {} ({})", scenario.label, scenario.calculator.display_name());
            let _ = writeln!(out);
            match registry.dispatch(scenario.calculator, &scenario.inputs).into_result() {
                Ok(output) => {
                    let _ = writeln!(out, "| Item | Value |");
                    let _ = writeln!(out, "|------|-------|");
                    for line in &output.summary {
                        let _ = writeln!(out, "| {} | {} |", line.label, line.value);
                    }
                }
                Err(err) => {
                    let _ = writeln!(out, "> Calculation failed: {}", err);
                }
            }
        }
        out
    }
}

impl Default for Report {
    fn default() -> Self {
        Report::new("", "", "")
    }
}

/// Report metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub preparer: String,
    pub client: String,
    pub property_address: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    pub title: String,
    /// Shown in the header, e.g. "USD"
    pub currency_label: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            title: "Property Analysis Report".to_string(),
            currency_label: "USD".to_string(),
        }
    }
}

/// One calculator run worth keeping: which calculator, and its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedScenario {
    pub label: String,
    pub calculator: CalculatorId,
    pub inputs: InputValues,
    pub saved_at: DateTime<Utc>,
}

impl SavedScenario {
    pub fn new(label: impl Into<String>, calculator: CalculatorId, inputs: InputValues) -> Self {
        SavedScenario {
            label: label.into(),
            calculator,
            inputs,
            saved_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new("Pat", "Client", "1 Main St");
        assert_eq!(report.meta.version, SCHEMA_VERSION);
        assert_eq!(report.meta.preparer, "Pat");
        assert_eq!(report.settings.currency_label, "USD");
        assert!(report.scenarios.is_empty());
    }

    #[test]
    fn test_add_and_remove_scenario() {
        let mut report = Report::default();
        let before = report.meta.modified;
        let scenario = SavedScenario::new("A", CalculatorId::Flip, InputValues::new());
        let id = report.add_scenario(scenario);
        assert_eq!(report.scenario_count(), 1);
        assert!(report.meta.modified >= before);
        assert_eq!(report.get_scenario(&id).map(|s| s.calculator), Some(CalculatorId::Flip));

        assert!(report.remove_scenario(&id).is_some());
        assert!(report.remove_scenario(&id).is_none());
        assert_eq!(report.scenario_count(), 0);
    }

    #[test]
    fn test_find_id_by_prefix() {
        let mut report = Report::default();
        let scenario = SavedScenario::new("A", CalculatorId::Heloc, InputValues::new());
        let id = report.add_scenario(scenario);
        let full = id.to_string();
        assert_eq!(report.find_id(&full), Some(id));
        assert_eq!(report.find_id(&full[..8]), Some(id));
        assert_eq!(report.find_id(""), None);
        assert_eq!(report.find_id("zzzz"), None);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut report = Report::new("Pat", "Client", "1 Main St");
        let inputs = InputValues::new().with("home_price", 450_000.0);
        report.add_scenario(SavedScenario::new("Bigger house", CalculatorId::Mortgage, inputs));

        let json = serde_json::to_string_pretty(&report).unwrap();
        assert!(json.contains("\"calculator\": \"mortgage\""));
        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_render_markdown() {
        let mut report = Report::new("Pat", "The Smiths", "12 Elm St");
        report.add_scenario(SavedScenario::new("Base", CalculatorId::Mortgage, InputValues::new()));
        let bad = InputValues::new().with("interest_rate_pct", 99.0);
        report.add_scenario(SavedScenario::new("Broken", CalculatorId::Mortgage, bad));

        let md = report.render_markdown(&CalculatorRegistry::builtin());
        assert!(md.starts_with("# Property Analysis Report"));
        assert!(md.contains("- Client: The Smiths"));
        assert!(md.contains("## Base (Mortgage)"));
        assert!(md.contains("| Principal & Interest | $1,438.92 |"));
        assert!(md.contains("> Calculation failed:"));
    }

    #[test]
    fn test_render_unregistered_calculator() {
        let mut report = Report::default();
        let scenario = SavedScenario::new("Cash flow", CalculatorId::Cashflow, InputValues::new());
        report.add_scenario(scenario);
        let md = report.render_markdown(&CalculatorRegistry::new());
        assert!(md.contains("> Calculation failed:"));
    }

    #[test]
    fn test_render_empty_report() {
        let md = Report::default().render_markdown(&CalculatorRegistry::builtin());
        assert!(md.contains("_No saved scenarios._"));
    }
}
