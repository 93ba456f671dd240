//! # HouseMath CLI Application
//!
//! Terminal front end for the HouseMath calculators.
//!
//! ## Usage
//!
//! ```bash
//! housemath list                                  # Calculators and their status
//! housemath fields mortgage                       # Inputs, defaults and ranges
//! housemath calc mortgage --set home_price=450000 # Run one calculator
//! housemath calc flip --json                      # Full output as JSON
//! housemath theme toggle                          # Flip and persist the theme
//! housemath report new smiths.hmr --client "The Smiths"
//! housemath report add smiths.hmr mortgage --label "Base case"
//! housemath report show smiths.hmr
//! housemath shell                                 # Interactive session
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default `housemath=warn`).

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use housemath_core::charts::ChartBoard;
use housemath_core::ids::ALL_CALCULATORS;
use housemath_core::file_io::{load_report, load_report_with_lock_check, save_report, FileLock};
use housemath_core::inputs::{InputField, InputValue, InputValues};
use housemath_core::report::REPORT_EXTENSION;
use housemath_core::shell::NullView;
use housemath_core::{
    AppShell, CalcError, CalculationOutput, CalculatorId, CalculatorRegistry, DispatchOutcome,
    FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, Report, ResultView, SavedScenario,
    Theme,
};

#[derive(Parser, Debug)]
#[command(name = "housemath", version, about = "Real estate calculators from the terminal")]
struct Cli {
    /// Preferences file (default: <config dir>/housemath/preferences.json)
    #[arg(long, global = true, env = "HOUSEMATH_PREFS", value_name = "FILE")]
    prefs: Option<PathBuf>,

    /// Keep preferences in memory only
    #[arg(long, global = true, env = "HOUSEMATH_NO_PERSIST")]
    no_persist: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every calculator tab
    List,
    /// Show a calculator's inputs with defaults and ranges
    Fields { calculator: String },
    /// Run a calculator
    Calc {
        calculator: String,
        /// Override an input, e.g. --set home_price=450000
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
        /// Print the full output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change the color theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
    /// Work with saved report files
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
    /// Interactive session (the default)
    Shell,
}

#[derive(Subcommand, Debug)]
enum ThemeAction {
    Show,
    Toggle,
    Set { theme: Theme },
}

#[derive(Subcommand, Debug)]
enum ReportAction {
    /// Create an empty report
    New {
        path: PathBuf,
        #[arg(long, default_value = "")]
        preparer: String,
        #[arg(long, default_value = "")]
        client: String,
        #[arg(long, default_value = "")]
        property: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Save a calculator scenario into a report
    Add {
        path: PathBuf,
        calculator: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
        /// Name recorded in the lock file
        #[arg(long, env = "USER", default_value = "housemath")]
        user: String,
    },
    /// Re-run every scenario and print the report
    Show {
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Remove a scenario by id (or id prefix)
    Remove {
        path: PathBuf,
        id: String,
        #[arg(long, env = "USER", default_value = "housemath")]
        user: String,
    },
}

fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("housemath=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(calc_err) = e.downcast_ref::<CalcError>() {
                if let Ok(json) = serde_json::to_string_pretty(calc_err) {
                    eprintln!();
                    eprintln!("Error JSON:");
                    eprintln!("{}", json);
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let registry = CalculatorRegistry::global();
    let store = preference_store(&cli);

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::List => print_list(registry),
        Commands::Fields { calculator } => {
            let id = parse_calculator(&calculator)?;
            let descriptor = registry
                .get(id)
                .ok_or_else(|| anyhow!("{} has no inputs", id.display_name()))?;
            print_fields(descriptor.fields, |field| field.display(field.default));
        }
        Commands::Calc { calculator, set, json } => {
            let id = parse_calculator(&calculator)?;
            let inputs = inputs_with_overrides(registry, id, &set)?;
            let output = registry.dispatch(id, &inputs).into_result()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_output(&output);
            }
        }
        Commands::Theme { action } => {
            let mut shell = AppShell::new(registry.clone(), store, NullView);
            let theme = match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => shell.theme(),
                ThemeAction::Toggle => shell.toggle_theme(),
                ThemeAction::Set { theme } => shell.set_theme(theme),
            };
            println!("Theme: {}", theme);
        }
        Commands::Report { action } => run_report(registry, action)?,
        Commands::Shell => run_shell(registry.clone(), store)?,
    }
    Ok(())
}

fn preference_store(cli: &Cli) -> Box<dyn PreferenceStore> {
    if cli.no_persist {
        return Box::new(MemoryPreferenceStore::default());
    }
    let path = cli
        .prefs
        .clone()
        .or_else(|| FilePreferenceStore::default_path(dirs::config_dir().as_deref()));
    match path {
        Some(path) => Box::new(FilePreferenceStore::new(path)),
        None => {
            warn!("no config directory found; preferences will not be saved");
            Box::new(MemoryPreferenceStore::default())
        }
    }
}

fn run_report(registry: &CalculatorRegistry, action: ReportAction) -> Result<()> {
    match action {
        ReportAction::New {
            path,
            preparer,
            client,
            property,
            force,
        } => {
            let path = report_path(&path);
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            save_report(&Report::new(preparer, client, property), &path)?;
            println!("Created {}", path.display());
        }
        ReportAction::Add {
            path,
            calculator,
            label,
            set,
            user,
        } => {
            let path = report_path(&path);
            let id = parse_calculator(&calculator)?;
            let inputs = inputs_with_overrides(registry, id, &set)?;
            // Refuse to save a scenario that cannot be calculated
            registry
                .dispatch(id, &inputs)
                .into_result()
                .with_context(|| format!("{} scenario not saved", id.display_name()))?;

            let _lock = FileLock::acquire(&path, user)?;
            let mut report = load_report(&path)?;
            let label = label.unwrap_or_else(|| id.display_name().to_string());
            let scenario_id = report.add_scenario(SavedScenario::new(label, id, inputs));
            save_report(&report, &path)?;
            println!("Added scenario {} to {}", short_id(&scenario_id.to_string()), path.display());
        }
        ReportAction::Show { path, json } => {
            let path = report_path(&path);
            let (report, lock) = load_report_with_lock_check(&path)?;
            if let Some(lock) = lock {
                eprintln!("Note: {} is being edited by {}", path.display(), lock.holder());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for (id, scenario) in report.ordered_scenarios() {
                    println!("[{}] {}", short_id(&id.to_string()), scenario.label);
                }
                println!();
                print!("{}", report.render_markdown(registry));
            }
        }
        ReportAction::Remove { path, id, user } => {
            let path = report_path(&path);
            let _lock = FileLock::acquire(&path, user)?;
            let mut report = load_report(&path)?;
            let uuid = report
                .find_id(&id)
                .ok_or_else(|| anyhow!("no single scenario matches '{}'", id))?;
            if let Some(removed) = report.remove_scenario(&uuid) {
                save_report(&report, &path)?;
                println!("Removed '{}'", removed.label);
            }
        }
    }
    Ok(())
}

struct TerminalView;

impl ResultView for TerminalView {
    fn show_output(&mut self, output: &CalculationOutput) {
        print_output(output);
    }

    fn show_error(&mut self, calculator: CalculatorId, error: &CalcError) {
        println!("{} failed: {}", calculator.display_name(), error);
    }
}

fn run_shell(registry: CalculatorRegistry, store: Box<dyn PreferenceStore>) -> Result<()> {
    let mut shell = AppShell::new(registry, store, TerminalView);

    println!("HouseMath - Real Estate Calculators");
    println!("===================================");
    println!("Theme: {}. Type 'help' for commands.", shell.theme());
    println!();

    while let Some(line) = prompt(&format!("[{}] > ", shell.active())) {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let active = shell.active();

        match command {
            "quit" | "exit" | "q" => break,
            "help" | "?" => print_shell_help(),
            "list" => print_list(shell.registry()),
            "go" => match parts.next() {
                Some(key) => {
                    if !shell.switch_to(key) {
                        println!("No calculator named '{}'", key);
                    }
                }
                None => println!("usage: go <calculator>"),
            },
            "set" => {
                let field = parts.next();
                let value = parts.collect::<Vec<_>>().join(" ");
                let Some(field) = field.filter(|_| !value.is_empty()) else {
                    println!("usage: set <field> <value>");
                    continue;
                };
                match shell.set_input(active, field, parse_value(&value)) {
                    Ok(()) => {
                        if let Some(shown) = shell.display_value(active, field) {
                            println!("{} = {}", field, shown);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            "reset" => {
                shell.reset_inputs(active);
                println!("{} inputs reset", active.display_name());
            }
            "calc" => {
                if let DispatchOutcome::NotRegistered(_) = shell.calculate_active() {
                    println!("{} has nothing to calculate", active.display_name());
                }
            }
            "theme" => println!("Theme: {}", shell.toggle_theme()),
            "charts" => print_charts(shell.charts()),
            "fields" => match shell.registry().get(active) {
                Some(descriptor) => print_fields(descriptor.fields, |field| {
                    shell
                        .display_value(active, field.name)
                        .unwrap_or_else(|| field.display(field.default))
                }),
                None => println!("{} has no inputs", active.display_name()),
            },
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }
    }
    Ok(())
}

fn print_shell_help() {
    println!("  go <calculator>      switch tab (see 'list')");
    println!("  fields               inputs of the current tab");
    println!("  set <field> <value>  change an input");
    println!("  reset                restore default inputs");
    println!("  calc                 run the current tab");
    println!("  charts               show chart state");
    println!("  theme                toggle light/dark");
    println!("  quit                 leave");
}

/// Print `text`, read one line. `None` on EOF or a broken terminal.
fn prompt(text: &str) -> Option<String> {
    print!("{}", text);
    io::stdout().flush().ok()?;

    let mut input = String::new();
    match io::stdin().lock().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

fn print_list(registry: &CalculatorRegistry) {
    for id in ALL_CALCULATORS {
        let status = if registry.contains(id) { "calculator" } else { "view" };
        println!("  {:<12} {:<22} [{}]", id.as_str(), id.display_name(), status);
    }
}

fn print_fields(fields: &[InputField], current: impl Fn(&InputField) -> String) {
    for field in fields {
        println!(
            "  {:<24} {:<28} {:>14}  ({} - {})",
            field.name,
            field.label,
            current(field),
            field.display(field.min),
            field.display(field.max)
        );
    }
}

fn print_output(output: &CalculationOutput) {
    println!("═══════════════════════════════════════");
    println!("  {}", output.calculator.display_name().to_uppercase());
    println!("═══════════════════════════════════════");
    for line in &output.summary {
        println!("  {:<32} {:>16}", line.label, line.value);
    }
    if !output.charts.is_empty() {
        let names: Vec<_> = output.charts.iter().map(|c| c.chart.canvas_key()).collect();
        println!();
        println!("  Charts: {}", names.join(", "));
    }
    println!();
}

fn print_charts(board: &ChartBoard) {
    println!("Charts ({} theme):", board.theme());
    for handle in board.handles() {
        let series: Vec<_> = handle.data.datasets.iter().map(|d| d.label.as_str()).collect();
        println!(
            "  {:<20} {:<9} rev {:<3} {}",
            handle.data.chart.canvas_key(),
            format!("{:?}", handle.data.kind).to_lowercase(),
            handle.revision,
            series.join(", ")
        );
    }
}

fn parse_calculator(key: &str) -> Result<CalculatorId> {
    key.parse::<CalculatorId>()
        .with_context(|| format!("try one of: {}", calculator_keys()))
}

fn calculator_keys() -> String {
    CalculatorId::computable().map(|id| id.as_str()).collect::<Vec<_>>().join(", ")
}

/// Registered defaults for `id` with `--set` overrides applied.
fn inputs_with_overrides(
    registry: &CalculatorRegistry,
    id: CalculatorId,
    overrides: &[(String, String)],
) -> Result<InputValues> {
    let descriptor = registry
        .get(id)
        .ok_or_else(|| anyhow!("{} has nothing to calculate", id.display_name()))?;
    let mut inputs = descriptor.inputs.clone();
    for (field, value) in overrides {
        inputs.set(field.as_str(), parse_value(value));
    }
    Ok(inputs)
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{}'", raw)),
    }
}

fn parse_value(raw: &str) -> InputValue {
    raw.trim()
        .parse::<f64>()
        .map(InputValue::Number)
        .unwrap_or_else(|_| InputValue::Text(raw.trim().to_string()))
}

/// Add the `.hmr` extension when none was given.
fn report_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(REPORT_EXTENSION)
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_calc_command() {
        let cli = Cli::try_parse_from([
            "housemath",
            "calc",
            "flip",
            "--set",
            "rehab_cost=55000",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Calc { calculator, set, json }) => {
                assert_eq!(calculator, "flip");
                assert_eq!(set, vec![("rehab_cost".to_string(), "55000".to_string())]);
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_theme_set() {
        let cli =
            Cli::try_parse_from(["housemath", "--no-persist", "theme", "set", "dark"]).unwrap();
        assert!(cli.no_persist);
        assert!(matches!(
            cli.command,
            Some(Commands::Theme {
                action: Some(ThemeAction::Set { theme: Theme::Dark })
            })
        ));
        assert!(Cli::try_parse_from(["housemath", "theme", "set", "sepia"]).is_err());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("a=1").unwrap(), ("a".to_string(), "1".to_string()));
        assert_eq!(
            parse_assignment(" home_price = $450,000 ").unwrap(),
            ("home_price".to_string(), "$450,000".to_string())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("6.5"), InputValue::Number(6.5));
        assert_eq!(parse_value(" $1,200 "), InputValue::Text("$1,200".to_string()));
    }

    #[test]
    fn test_report_path_adds_extension() {
        assert_eq!(report_path(Path::new("smiths")), PathBuf::from("smiths.hmr"));
        assert_eq!(report_path(Path::new("smiths.json")), PathBuf::from("smiths.json"));
    }

    #[test]
    fn test_inputs_with_overrides() {
        let registry = CalculatorRegistry::builtin();
        let overrides = vec![("home_price".to_string(), "500000".to_string())];
        let inputs = inputs_with_overrides(&registry, CalculatorId::Mortgage, &overrides).unwrap();
        assert_eq!(inputs.get("home_price"), Some(&InputValue::Number(500_000.0)));
        assert!(inputs.contains("down_payment_pct"));
        assert!(inputs_with_overrides(&registry, CalculatorId::Home, &[]).is_err());
    }

    #[test]
    fn test_report_add_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smiths");
        let registry = CalculatorRegistry::builtin();

        run_report(
            &registry,
            ReportAction::New {
                path: path.clone(),
                preparer: "Pat".into(),
                client: "The Smiths".into(),
                property: String::new(),
                force: false,
            },
        )
        .unwrap();
        let file = dir.path().join("smiths.hmr");
        assert!(file.exists());

        run_report(
            &registry,
            ReportAction::Add {
                path: path.clone(),
                calculator: "mortgage".into(),
                label: Some("Base".into()),
                set: vec![],
                user: "pat".into(),
            },
        )
        .unwrap();
        let report = load_report(&file).unwrap();
        assert_eq!(report.scenario_count(), 1);
        assert!(FileLock::check(&file).is_none());

        // Uncalculable scenarios are refused
        let bad = run_report(
            &registry,
            ReportAction::Add {
                path: path.clone(),
                calculator: "mortgage".into(),
                label: None,
                set: vec![("interest_rate_pct".into(), "99".into())],
                user: "pat".into(),
            },
        );
        assert!(bad.is_err());

        let id = report.ordered_scenarios()[0].0.to_string();
        run_report(
            &registry,
            ReportAction::Remove {
                path,
                id: id[..8].to_string(),
                user: "pat".into(),
            },
        )
        .unwrap();
        assert_eq!(load_report(&file).unwrap().scenario_count(), 0);
    }
}
