//! # Calculator Registry
//!
//! Maps each [`CalculatorId`] to the descriptor that knows how to compute it.
//! Front ends never call calculator modules directly; they dispatch by id
//! (or by raw UI key) and get a [`DispatchOutcome`] back.
//!
//! ## Example
//!
//! ```rust
//! use housemath_core::ids::CalculatorId;
//! use housemath_core::inputs::InputValues;
//! use housemath_core::registry::{CalculatorRegistry, DispatchOutcome};
//!
//! let registry = CalculatorRegistry::builtin();
//! match registry.dispatch(CalculatorId::Mortgage, &InputValues::new()) {
//!     DispatchOutcome::Computed(output) => {
//!         assert_eq!(output.value_of("Principal & Interest"), Some("$1,438.92"));
//!     }
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::calculators::{self, CalculationOutput};
use crate::errors::{CalcError, CalcResult};
use crate::ids::CalculatorId;
use crate::inputs::{InputField, InputValues};

/// Type-erased compute handler.
pub type ComputeHandler = Arc<dyn Fn(&InputValues) -> CalcResult<CalculationOutput> + Send + Sync>;

/// Binds a calculator id to its behavior and default inputs.
#[derive(Clone)]
pub struct CalculatorDescriptor {
    pub id: CalculatorId,
    pub compute: ComputeHandler,
    /// Inputs a fresh tab starts with
    pub inputs: InputValues,
    pub fields: &'static [InputField],
}

impl CalculatorDescriptor {
    pub fn new<F>(id: CalculatorId, compute: F) -> Self
    where
        F: Fn(&InputValues) -> CalcResult<CalculationOutput> + Send + Sync + 'static,
    {
        CalculatorDescriptor {
            id,
            compute: Arc::new(compute),
            inputs: InputValues::new(),
            fields: &[],
        }
    }

    /// The built-in descriptor for `id`, seeded with field defaults.
    ///
    /// `None` for view-only tabs.
    pub fn builtin(id: CalculatorId) -> Option<Self> {
        let compute = calculators::compute_fn(id)?;
        let fields = calculators::fields_for(id);
        Some(CalculatorDescriptor {
            id,
            compute: Arc::new(compute),
            inputs: InputValues::defaults(fields),
            fields,
        })
    }

    pub fn with_inputs(mut self, inputs: InputValues) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_fields(mut self, fields: &'static [InputField]) -> Self {
        self.fields = fields;
        self
    }
}

impl fmt::Debug for CalculatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculatorDescriptor")
            .field("id", &self.id)
            .field("inputs", &self.inputs)
            .field("fields", &self.fields.len())
            .finish_non_exhaustive()
    }
}

/// Result of a dispatch. Never panics, never propagates.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Computed(CalculationOutput),
    /// The handler ran and returned an error
    Failed(CalcError),
    /// No handler for this id; nothing ran
    NotRegistered(String),
}

impl DispatchOutcome {
    pub fn is_computed(&self) -> bool {
        matches!(self, DispatchOutcome::Computed(_))
    }

    pub fn output(&self) -> Option<&CalculationOutput> {
        match self {
            DispatchOutcome::Computed(output) => Some(output),
            _ => None,
        }
    }

    /// Collapse into a `CalcResult`, mapping `NotRegistered` to
    /// `UnknownCalculator`.
    pub fn into_result(self) -> CalcResult<CalculationOutput> {
        match self {
            DispatchOutcome::Computed(output) => Ok(output),
            DispatchOutcome::Failed(err) => Err(err),
            DispatchOutcome::NotRegistered(id) => Err(CalcError::unknown_calculator(id)),
        }
    }
}

/// Id → descriptor table.
#[derive(Debug, Clone, Default)]
pub struct CalculatorRegistry {
    descriptors: HashMap<CalculatorId, CalculatorDescriptor>,
}

static GLOBAL: Lazy<CalculatorRegistry> = Lazy::new(CalculatorRegistry::builtin);

impl CalculatorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in calculator.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for id in CalculatorId::computable() {
            if let Some(descriptor) = CalculatorDescriptor::builtin(id) {
                registry.register(descriptor);
            }
        }
        registry
    }

    /// Process-wide built-in registry, created on first use.
    pub fn global() -> &'static CalculatorRegistry {
        &GLOBAL
    }

    /// Store a descriptor. A previous descriptor for the same id is replaced
    /// (with a warning) and returned.
    pub fn register(&mut self, descriptor: CalculatorDescriptor) -> Option<CalculatorDescriptor> {
        let id = descriptor.id;
        let previous = self.descriptors.insert(id, descriptor);
        if previous.is_some() {
            warn!(calculator = %id, "calculator registered twice; replacing previous handler");
        }
        previous
    }

    /// Register a bare handler with no default inputs.
    pub fn register_fn<F>(&mut self, id: CalculatorId, compute: F) -> Option<CalculatorDescriptor>
    where
        F: Fn(&InputValues) -> CalcResult<CalculationOutput> + Send + Sync + 'static,
    {
        self.register(CalculatorDescriptor::new(id, compute))
    }

    /// Run the handler for `id`.
    pub fn dispatch(&self, id: CalculatorId, inputs: &InputValues) -> DispatchOutcome {
        let Some(descriptor) = self.descriptors.get(&id) else {
            warn!(calculator = %id, "no calculator registered");
            return DispatchOutcome::NotRegistered(id.to_string());
        };

        debug!(calculator = %id, inputs = inputs.len(), "dispatching calculation");
        match (descriptor.compute)(inputs) {
            Ok(output) => DispatchOutcome::Computed(output),
            Err(err) => {
                warn!(calculator = %id, code = err.error_code(), "calculation failed: {}", err);
                DispatchOutcome::Failed(err)
            }
        }
    }

    /// Dispatch a raw UI key such as `"mortgage"`.
    pub fn dispatch_key(&self, key: &str, inputs: &InputValues) -> DispatchOutcome {
        match key.parse::<CalculatorId>() {
            Ok(id) => self.dispatch(id, inputs),
            Err(_) => {
                warn!(key, "Calculator not found: {}-calculator", key);
                DispatchOutcome::NotRegistered(key.to_string())
            }
        }
    }

    pub fn get(&self, id: CalculatorId) -> Option<&CalculatorDescriptor> {
        self.descriptors.get(&id)
    }

    pub fn contains(&self, id: CalculatorId) -> bool {
        self.descriptors.contains_key(&id)
    }

    /// Registered ids in tab order.
    pub fn ids(&self) -> Vec<CalculatorId> {
        let mut ids: Vec<CalculatorId> = self.descriptors.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ALL_CALCULATORS;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_stub(id: CalculatorId, counter: Arc<AtomicUsize>) -> CalculatorDescriptor {
        CalculatorDescriptor::new(id, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(CalculationOutput::new(id))
        })
    }

    #[test]
    fn test_dispatch_invokes_each_handler_once() {
        let mut registry = CalculatorRegistry::new();
        let counters: Vec<(CalculatorId, Arc<AtomicUsize>)> = ALL_CALCULATORS
            .iter()
            .map(|&id| (id, Arc::new(AtomicUsize::new(0))))
            .collect();
        for (id, counter) in &counters {
            registry.register(counting_stub(*id, counter.clone()));
        }

        for (id, counter) in &counters {
            let outcome = registry.dispatch(*id, &InputValues::new());
            assert_eq!(outcome.output().map(|o| o.calculator), Some(*id));
            assert_eq!(counter.load(Ordering::SeqCst), 1, "{} not invoked exactly once", id);
        }
        // No handler ran on behalf of another id
        for (_, counter) in &counters {
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_mortgage_stub_counter() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = CalculatorRegistry::new();
        registry.register(counting_stub(CalculatorId::Mortgage, counter.clone()));

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        let outcome = registry.dispatch_key("mortgage", &InputValues::new());
        assert!(outcome.is_computed());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregistered_id_is_a_no_op() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = CalculatorRegistry::new();
        registry.register(counting_stub(CalculatorId::Mortgage, counter.clone()));

        let outcome = registry.dispatch(CalculatorId::Flip, &InputValues::new());
        assert_eq!(outcome, DispatchOutcome::NotRegistered("flip".into()));
        let outcome = registry.dispatch_key("nonexistent", &InputValues::new());
        assert_eq!(outcome, DispatchOutcome::NotRegistered("nonexistent".into()));

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_replaces() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut registry = CalculatorRegistry::new();

        assert!(registry.register(counting_stub(CalculatorId::Heloc, first.clone())).is_none());
        let replaced = registry.register(counting_stub(CalculatorId::Heloc, second.clone()));
        assert_eq!(replaced.map(|d| d.id), Some(CalculatorId::Heloc));
        assert_eq!(registry.len(), 1);

        registry.dispatch(CalculatorId::Heloc, &InputValues::new());
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_calculation_is_returned() {
        let mut registry = CalculatorRegistry::new();
        registry.register_fn(CalculatorId::Buyer, |_| {
            Err(CalcError::calculation_failed("buyer", "boom"))
        });
        match registry.dispatch(CalculatorId::Buyer, &InputValues::new()) {
            DispatchOutcome::Failed(err) => assert_eq!(err.error_code(), "CALCULATION_FAILED"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_builtin_registry() {
        let registry = CalculatorRegistry::builtin();
        assert_eq!(registry.len(), 12);
        assert!(!registry.contains(CalculatorId::Home));
        assert!(!registry.contains(CalculatorId::Report));
        assert_eq!(registry.ids().first(), Some(&CalculatorId::Mortgage));

        let descriptor = registry.get(CalculatorId::Mortgage).unwrap();
        assert!(descriptor.inputs.contains("home_price"));
        assert!(!descriptor.fields.is_empty());

        let outcome = registry.dispatch(CalculatorId::Home, &InputValues::new());
        assert!(matches!(outcome, DispatchOutcome::NotRegistered(_)));
    }

    #[test]
    fn test_invalid_input_fails_without_panicking() {
        let inputs = InputValues::new().with("interest_rate_pct", "abc");
        let outcome = CalculatorRegistry::global().dispatch(CalculatorId::Mortgage, &inputs);
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
