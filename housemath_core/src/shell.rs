//! # Application Shell
//!
//! [`AppShell`] is the UI controller: it owns the active tab, each
//! calculator's current inputs, the theme and its store, and the
//! [`ChartBoard`]. Front ends forward user actions to it and receive
//! results through a [`ResultView`].
//!
//! ## Flow
//!
//! ```text
//! switch_to("flip")          active tab = flip (no calculation)
//! set_input(flip, k, v)      inputs[flip][k] = v
//! trigger_calculation(flip)  registry.dispatch ─► charts.update ─► view.show_output
//! toggle_theme()             save prefs ─► charts.reinitialize ─► re-run active tab
//! ```

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::calculators::CalculationOutput;
use crate::charts::ChartBoard;
use crate::errors::{CalcError, CalcResult};
use crate::ids::CalculatorId;
use crate::inputs::{find_field, InputValue, InputValues};
use crate::preferences::{PreferenceStore, Preferences};
use crate::registry::{CalculatorRegistry, DispatchOutcome};
use crate::theme::Theme;

/// Receives what the shell wants displayed.
pub trait ResultView {
    fn show_output(&mut self, output: &CalculationOutput);
    fn show_error(&mut self, calculator: CalculatorId, error: &CalcError);
}

/// A view that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl ResultView for NullView {
    fn show_output(&mut self, _output: &CalculationOutput) {}
    fn show_error(&mut self, _calculator: CalculatorId, _error: &CalcError) {}
}

pub struct AppShell<V: ResultView> {
    registry: CalculatorRegistry,
    active: CalculatorId,
    inputs: HashMap<CalculatorId, InputValues>,
    theme: Theme,
    store: Box<dyn PreferenceStore>,
    charts: ChartBoard,
    view: V,
}

impl<V: ResultView> AppShell<V> {
    /// Build a shell on the home tab, with the theme loaded from `store`
    /// and every registered calculator's inputs at their defaults.
    pub fn new(registry: CalculatorRegistry, store: Box<dyn PreferenceStore>, view: V) -> Self {
        let theme = match store.load() {
            Ok(prefs) => prefs.theme,
            Err(err) => {
                warn!(error = %err, "could not load preferences; using defaults");
                Theme::default()
            }
        };
        let inputs = registry
            .ids()
            .into_iter()
            .filter_map(|id| registry.get(id).map(|d| (id, d.inputs.clone())))
            .collect();

        AppShell {
            registry,
            active: CalculatorId::Home,
            inputs,
            theme,
            store,
            charts: ChartBoard::new(theme),
            view,
        }
    }

    pub fn active(&self) -> CalculatorId {
        self.active
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn charts(&self) -> &ChartBoard {
        &self.charts
    }

    pub fn registry(&self) -> &CalculatorRegistry {
        &self.registry
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        self.store.as_ref()
    }

    /// Current inputs for `id`, if it is registered.
    pub fn inputs(&self, id: CalculatorId) -> Option<&InputValues> {
        self.inputs.get(&id)
    }

    /// Make `key` the active tab. Unknown keys are logged and ignored.
    pub fn switch_to(&mut self, key: &str) -> bool {
        match key.parse::<CalculatorId>() {
            Ok(id) => {
                debug!(from = %self.active, to = %id, "switching tab");
                self.active = id;
                true
            }
            Err(_) => {
                warn!("Calculator not found: {}-calculator", key.trim());
                false
            }
        }
    }

    /// Set one input on a calculator.
    ///
    /// Fails for unregistered calculators and for field names the
    /// calculator does not declare. Range checks happen at calculation.
    pub fn set_input(
        &mut self,
        id: CalculatorId,
        field: &str,
        value: impl Into<InputValue>,
    ) -> CalcResult<()> {
        let descriptor = self
            .registry
            .get(id)
            .ok_or_else(|| CalcError::unknown_calculator(id.as_str()))?;
        // Descriptors registered without a field table accept any name
        if !descriptor.fields.is_empty() && find_field(descriptor.fields, field).is_none() {
            return Err(CalcError::invalid_input(
                field,
                "",
                format!("{} has no input named '{}'", id.display_name(), field),
            ));
        }
        let value = value.into();
        debug!(calculator = %id, field, value = %value, "input changed");
        self.inputs.entry(id).or_default().set(field, value);
        Ok(())
    }

    /// Restore a calculator's inputs to its descriptor defaults.
    pub fn reset_inputs(&mut self, id: CalculatorId) {
        if let Some(descriptor) = self.registry.get(id) {
            self.inputs.insert(id, descriptor.inputs.clone());
        }
    }

    /// Label text for a field's current value, e.g. `"20%"` or `"$300,000"`.
    pub fn display_value(&self, id: CalculatorId, field: &str) -> Option<String> {
        let spec = find_field(self.registry.get(id)?.fields, field)?;
        let value = self
            .inputs
            .get(&id)
            .and_then(|inputs| inputs.get(field))
            .and_then(InputValue::as_number)
            .unwrap_or(spec.default);
        Some(spec.display(value))
    }

    /// Run `id` with its current inputs and route the outcome.
    ///
    /// Unregistered ids change nothing.
    pub fn trigger_calculation(&mut self, id: CalculatorId) -> DispatchOutcome {
        let inputs = self.inputs.get(&id).cloned().unwrap_or_default();
        let outcome = self.registry.dispatch(id, &inputs);
        match &outcome {
            DispatchOutcome::Computed(output) => {
                for chart in &output.charts {
                    self.charts.update(chart.clone());
                }
                self.view.show_output(output);
            }
            DispatchOutcome::Failed(err) => self.view.show_error(id, err),
            DispatchOutcome::NotRegistered(_) => {}
        }
        outcome
    }

    /// Run the active tab.
    pub fn calculate_active(&mut self) -> DispatchOutcome {
        self.trigger_calculation(self.active)
    }

    /// Flip the theme, persist it, and redraw.
    ///
    /// A failed save is logged; the in-memory theme still changes.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(err) = self.store.save(&Preferences { theme: self.theme }) {
            warn!(error = %err, "Could not save theme preference");
        }
        self.reinitialize_charts();
        if self.registry.contains(self.active) {
            self.trigger_calculation(self.active);
        }
        self.theme
    }

    /// Toggle only if `theme` differs from the current one.
    pub fn set_theme(&mut self, theme: Theme) -> Theme {
        if theme != self.theme {
            self.toggle_theme();
        }
        self.theme
    }

    /// Destroy every chart and rebuild placeholders for the current theme.
    pub fn reinitialize_charts(&mut self) {
        self.charts.reinitialize(self.theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartHandle, ChartId};
    use crate::preferences::{FilePreferenceStore, MemoryPreferenceStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct RecordingView {
        outputs: Vec<CalculationOutput>,
        errors: Vec<(CalculatorId, String)>,
    }

    impl ResultView for RecordingView {
        fn show_output(&mut self, output: &CalculationOutput) {
            self.outputs.push(output.clone());
        }

        fn show_error(&mut self, calculator: CalculatorId, error: &CalcError) {
            self.errors.push((calculator, error.error_code().to_string()));
        }
    }

    fn shell() -> AppShell<RecordingView> {
        AppShell::new(
            CalculatorRegistry::builtin(),
            Box::new(MemoryPreferenceStore::default()),
            RecordingView::default(),
        )
    }

    fn chart_snapshot<V: ResultView>(shell: &AppShell<V>) -> Vec<ChartHandle> {
        shell.charts().handles().cloned().collect()
    }

    #[test]
    fn test_starts_on_home_with_defaults() {
        let shell = shell();
        assert_eq!(shell.active(), CalculatorId::Home);
        assert_eq!(shell.theme(), Theme::Light);
        assert_eq!(shell.charts().len(), 2);
        assert!(shell.inputs(CalculatorId::Mortgage).unwrap().contains("home_price"));
        assert!(shell.inputs(CalculatorId::Home).is_none());
    }

    #[test]
    fn test_switch_to() {
        let mut shell = shell();
        assert!(shell.switch_to("mortgage"));
        assert_eq!(shell.active(), CalculatorId::Mortgage);
        // Switching alone never calculates
        assert!(shell.view().outputs.is_empty());

        assert!(!shell.switch_to("nonexistent"));
        assert_eq!(shell.active(), CalculatorId::Mortgage);
    }

    #[test]
    fn test_trigger_calculation_updates_charts_and_view() {
        let mut shell = shell();
        let before = shell.charts().get(ChartId::Payment).unwrap().revision;

        let outcome = shell.trigger_calculation(CalculatorId::Mortgage);
        assert!(outcome.is_computed());
        assert_eq!(shell.view().outputs.len(), 1);
        assert_eq!(shell.charts().get(ChartId::Payment).unwrap().revision, before + 1);
        assert!(shell.charts().get(ChartId::Amortization).is_some());
    }

    #[test]
    fn test_set_input_changes_result() {
        let mut shell = shell();
        shell.set_input(CalculatorId::Mortgage, "home_price", 500_000.0).unwrap();
        let output = shell.trigger_calculation(CalculatorId::Mortgage).into_result().unwrap();
        // 400k at 6% for 30 years
        assert_eq!(output.value_of("Principal & Interest"), Some("$2,398.20"));
        assert_eq!(
            shell.display_value(CalculatorId::Mortgage, "home_price").as_deref(),
            Some("$500,000")
        );
        assert_eq!(
            shell.display_value(CalculatorId::Mortgage, "down_payment_pct").as_deref(),
            Some("20%")
        );
    }

    #[test]
    fn test_negative_currency_label() {
        let mut shell = shell();
        shell.set_input(CalculatorId::Mortgage, "home_price", "-100").unwrap();
        assert_eq!(
            shell.display_value(CalculatorId::Mortgage, "home_price").as_deref(),
            Some("-$100")
        );
        shell.set_input(CalculatorId::Mortgage, "home_price", -100_500.0).unwrap();
        assert_eq!(
            shell.display_value(CalculatorId::Mortgage, "home_price").as_deref(),
            Some("-$100,500")
        );
    }

    #[test]
    fn test_set_unknown_field_is_rejected() {
        let mut shell = shell();
        let err = shell.set_input(CalculatorId::Mortgage, "colour", 1.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        let err = shell.set_input(CalculatorId::Home, "x", 1.0).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_CALCULATOR");
    }

    #[test]
    fn test_invalid_input_goes_to_view() {
        let mut shell = shell();
        shell.set_input(CalculatorId::Heloc, "draw_amount", "999999").unwrap();
        let outcome = shell.trigger_calculation(CalculatorId::Heloc);
        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
        assert_eq!(
            shell.view().errors,
            vec![(CalculatorId::Heloc, "CALCULATION_FAILED".to_string())]
        );

        shell.reset_inputs(CalculatorId::Heloc);
        assert!(shell.trigger_calculation(CalculatorId::Heloc).is_computed());
    }

    #[test]
    fn test_unregistered_dispatch_leaves_state_unchanged() {
        let mut registry = CalculatorRegistry::new();
        registry.register_fn(CalculatorId::Mortgage, |_| {
            Ok(CalculationOutput::new(CalculatorId::Mortgage))
        });
        let store = Box::new(MemoryPreferenceStore::default());
        let mut shell = AppShell::new(registry, store, RecordingView::default());
        shell.switch_to("mortgage");

        let charts_before = chart_snapshot(&shell);
        let outcome = shell.trigger_calculation(CalculatorId::Flip);

        assert!(matches!(outcome, DispatchOutcome::NotRegistered(_)));
        assert_eq!(shell.active(), CalculatorId::Mortgage);
        assert_eq!(chart_snapshot(&shell), charts_before);
        assert!(shell.view().outputs.is_empty());
        assert!(shell.view().errors.is_empty());
        assert!(shell.inputs(CalculatorId::Flip).is_none());
    }

    #[test]
    fn test_toggle_theme_twice_restores() {
        let mut shell = shell();
        let original = shell.theme();
        shell.toggle_theme();
        assert_eq!(shell.theme(), Theme::Dark);
        assert_eq!(shell.store().load().unwrap().theme, Theme::Dark);
        shell.toggle_theme();
        assert_eq!(shell.theme(), original);
        assert_eq!(shell.store().load().unwrap().theme, original);
    }

    #[test]
    fn test_toggle_theme_restyles_and_recalculates() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = CalculatorRegistry::new();
        let calls = counter.clone();
        registry.register_fn(CalculatorId::Flip, move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(CalculationOutput::new(CalculatorId::Flip))
        });
        let store = Box::new(MemoryPreferenceStore::default());
        let mut shell = AppShell::new(registry, store, RecordingView::default());

        // Home has no handler: toggling only restyles
        shell.toggle_theme();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(shell.charts().theme(), Theme::Dark);
        let style = &shell.charts().get(ChartId::Payment).unwrap().style;
        assert_eq!(style.text_color, "#f9fafb");

        shell.switch_to("flip");
        shell.toggle_theme();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(shell.charts().theme(), Theme::Light);
    }

    #[test]
    fn test_failed_theme_save_still_toggles() {
        let mut shell = AppShell::new(
            CalculatorRegistry::builtin(),
            Box::new(MemoryPreferenceStore::failing()),
            NullView,
        );
        assert_eq!(shell.toggle_theme(), Theme::Dark);
    }

    #[test]
    fn test_theme_loaded_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = Box::new(FilePreferenceStore::new(&path));
        let mut shell = AppShell::new(CalculatorRegistry::builtin(), store, NullView);
        assert_eq!(shell.theme(), Theme::Dark);
        assert_eq!(shell.charts().theme(), Theme::Dark);

        shell.set_theme(Theme::Light);
        assert!(std::fs::read_to_string(&path).unwrap().contains("light"));
        // Already light: no change, no save needed
        assert_eq!(shell.set_theme(Theme::Light), Theme::Light);
    }

    #[test]
    fn test_reinitialize_charts_drops_results() {
        let mut shell = shell();
        shell.trigger_calculation(CalculatorId::Flip);
        assert!(shell.charts().get(ChartId::Flip).is_some());
        shell.reinitialize_charts();
        assert!(shell.charts().get(ChartId::Flip).is_none());
        assert_eq!(shell.charts().len(), 2);
    }
}
