//! # housemath_core - Real Estate Calculation Engine
//!
//! `housemath_core` holds the calculators behind HouseMath together with the
//! registry that dispatches to them and the shell state a front end drives.
//! All inputs and outputs are JSON-serializable, so any front end (CLI,
//! web, GUI) can feed loosely-typed form values in and render the results.
//!
//! ## Design Philosophy
//!
//! - **Stateless calculators**: Pure functions from typed input to result
//! - **Dispatch by id**: Front ends only know [`CalculatorId`]s and the registry
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use housemath_core::{CalculatorId, CalculatorRegistry, InputValues};
//!
//! let inputs = InputValues::new().with("home_price", 400_000.0);
//! let output = CalculatorRegistry::global()
//!     .dispatch(CalculatorId::Mortgage, &inputs)
//!     .into_result()
//!     .unwrap();
//!
//! assert_eq!(output.value_of("Loan Amount"), Some("$320,000.00"));
//! ```
//!
//! ## Modules
//!
//! - [`calculators`] - The twelve calculators and their shared output type
//! - [`registry`] - Id to handler mapping and dispatch
//! - [`shell`] - Active tab, inputs, theme and charts for a front end
//! - [`report`] - Saved scenario collections
//! - [`finance`] - Loan and growth formulas shared by calculators
//! - [`charts`] - Chart data and the board of live chart handles
//! - [`preferences`] - Persisted theme preference
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves and locking

pub mod calculators;
pub mod charts;
pub mod errors;
pub mod file_io;
pub mod finance;
pub mod ids;
pub mod inputs;
pub mod preferences;
pub mod registry;
pub mod report;
pub mod shell;
pub mod theme;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculators::{CalculationOutput, SummaryLine};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_report, save_report, FileLock};
pub use ids::CalculatorId;
pub use inputs::{InputValue, InputValues};
pub use preferences::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, Preferences};
pub use registry::{CalculatorRegistry, DispatchOutcome};
pub use report::{Report, SavedScenario};
pub use shell::{AppShell, ResultView};
pub use theme::Theme;
