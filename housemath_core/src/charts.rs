//! # Chart State
//!
//! Renderer-agnostic chart descriptions plus the [`ChartBoard`] that owns
//! every live chart handle. A front end draws whatever the board holds; the
//! calculators only produce [`ChartData`].
//!
//! ## Lifecycle
//!
//! ```text
//! initialize(theme) ──► placeholders for payment + amortization
//! update(data)      ──► replace (or create) one handle, bump its revision
//! reinitialize(t)   ──► destroy_all + initialize(t)   (theme change)
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::theme::Theme;

/// Series colors, assigned in order.
pub const PALETTE: [&str; 8] = [
    "#3b82f6", "#7c3aed", "#ec4899", "#10b981", "#f59e0b", "#ef4444", "#14b8a6", "#6366f1",
];

/// One of the application's chart slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartId {
    Payment,
    Amortization,
    Investment,
    Expense,
    Commission,
    Comparison,
    Closing,
    Heloc,
    Flip,
    Brrrr,
}

impl ChartId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartId::Payment => "payment",
            ChartId::Amortization => "amortization",
            ChartId::Investment => "investment",
            ChartId::Expense => "expense",
            ChartId::Commission => "commission",
            ChartId::Comparison => "comparison",
            ChartId::Closing => "closing",
            ChartId::Heloc => "heloc",
            ChartId::Flip => "flip",
            ChartId::Brrrr => "brrrr",
        }
    }

    /// Canvas key, e.g. `payment-chart`
    pub fn canvas_key(&self) -> String {
        format!("{}-chart", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Doughnut,
    Line,
    Bar,
}

/// One series of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    /// One color per point for doughnuts, a single color for line/bar series
    pub colors: Vec<String>,
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub chart: ChartId,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    /// Single-series doughnut with one palette color per slice.
    pub fn doughnut<L: Into<String>>(chart: ChartId, slices: Vec<(L, f64)>) -> Self {
        let (labels, data): (Vec<String>, Vec<f64>) =
            slices.into_iter().map(|(label, value)| (label.into(), value)).unzip();
        let colors = (0..data.len()).map(|i| PALETTE[i % PALETTE.len()].to_string()).collect();
        ChartData {
            chart,
            kind: ChartKind::Doughnut,
            labels,
            datasets: vec![Dataset {
                label: String::new(),
                data,
                colors,
            }],
        }
    }

    /// Empty line chart over the given x labels.
    pub fn line(chart: ChartId, labels: Vec<String>) -> Self {
        ChartData {
            chart,
            kind: ChartKind::Line,
            labels,
            datasets: Vec::new(),
        }
    }

    /// Empty bar chart over the given x labels.
    pub fn bar(chart: ChartId, labels: Vec<String>) -> Self {
        ChartData {
            chart,
            kind: ChartKind::Bar,
            labels,
            datasets: Vec::new(),
        }
    }

    /// Append a series, colored by its position.
    pub fn with_series(mut self, label: impl Into<String>, data: Vec<f64>) -> Self {
        let color = PALETTE[self.datasets.len() % PALETTE.len()].to_string();
        self.datasets.push(Dataset {
            label: label.into(),
            data,
            colors: vec![color],
        });
        self
    }

    /// Sum of the first series (doughnut total)
    pub fn total(&self) -> f64 {
        self.datasets.first().map(|d| d.data.iter().sum()).unwrap_or(0.0)
    }
}

/// Theme-dependent chart styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartStyle {
    pub text_color: &'static str,
    pub grid_color: &'static str,
}

impl ChartStyle {
    pub fn for_theme(theme: Theme) -> Self {
        if theme.is_dark() {
            ChartStyle {
                text_color: "#f9fafb",
                grid_color: "#374151",
            }
        } else {
            ChartStyle {
                text_color: "#1f2937",
                grid_color: "#e5e7eb",
            }
        }
    }
}

/// A live chart: data, style and how many times it has been redrawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartHandle {
    pub data: ChartData,
    pub style: ChartStyle,
    pub revision: u32,
}

/// Owner of every chart handle in the application.
#[derive(Debug, Clone)]
pub struct ChartBoard {
    theme: Theme,
    handles: BTreeMap<ChartId, ChartHandle>,
}

impl ChartBoard {
    /// Board with placeholder charts for `theme`.
    pub fn new(theme: Theme) -> Self {
        let mut board = ChartBoard {
            theme,
            handles: BTreeMap::new(),
        };
        board.initialize(theme);
        board
    }

    /// Create the placeholder charts shown before any calculation runs.
    pub fn initialize(&mut self, theme: Theme) {
        self.theme = theme;
        for data in placeholders() {
            self.insert(data);
        }
        debug!(theme = %theme, charts = self.handles.len(), "charts initialized");
    }

    /// Destroy every handle.
    pub fn destroy_all(&mut self) {
        self.handles.clear();
    }

    /// Rebuild for a new theme.
    pub fn reinitialize(&mut self, theme: Theme) {
        self.destroy_all();
        self.initialize(theme);
    }

    /// Replace (or create) the handle for `data.chart`.
    pub fn update(&mut self, data: ChartData) {
        self.insert(data);
    }

    fn insert(&mut self, data: ChartData) {
        let style = ChartStyle::for_theme(self.theme);
        let revision = self.handles.get(&data.chart).map(|h| h.revision + 1).unwrap_or(0);
        self.handles.insert(
            data.chart,
            ChartHandle {
                data,
                style,
                revision,
            },
        );
    }

    pub fn get(&self, chart: ChartId) -> Option<&ChartHandle> {
        self.handles.get(&chart)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn handles(&self) -> impl Iterator<Item = &ChartHandle> {
        self.handles.values()
    }
}

/// Placeholder data shown before the first calculation.
fn placeholders() -> Vec<ChartData> {
    let payment = ChartData::doughnut(
        ChartId::Payment,
        vec![
            ("Principal & Interest", 1425.0),
            ("Property Tax", 292.0),
            ("Insurance", 100.0),
            ("HOA", 0.0),
        ],
    );

    let years = [5, 10, 15, 20, 25, 30].iter().map(|y| format!("Year {}", y)).collect();
    let amortization = ChartData::line(ChartId::Amortization, years)
        .with_series("Principal", vec![38_000.0, 83_000.0, 138_000.0, 204_000.0, 280_000.0, 0.0])
        .with_series("Interest", vec![62_000.0, 105_000.0, 137_000.0, 156_000.0, 0.0, 0.0]);

    vec![payment, amortization]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_creates_placeholders() {
        let board = ChartBoard::new(Theme::Light);
        assert_eq!(board.len(), 2);
        let payment = board.get(ChartId::Payment).unwrap();
        assert_eq!(payment.data.kind, ChartKind::Doughnut);
        assert_eq!(payment.data.total(), 1817.0);
        assert_eq!(payment.style.text_color, "#1f2937");
        assert!(board.get(ChartId::Flip).is_none());
    }

    #[test]
    fn test_update_bumps_revision() {
        let mut board = ChartBoard::new(Theme::Light);
        let data = ChartData::doughnut(ChartId::Payment, vec![("P&I", 1000.0)]);
        board.update(data.clone());
        assert_eq!(board.get(ChartId::Payment).unwrap().revision, 1);

        board.update(ChartData::bar(ChartId::Flip, vec!["A".into()]).with_series("x", vec![1.0]));
        assert_eq!(board.get(ChartId::Flip).unwrap().revision, 0);
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn test_reinitialize_restyles_and_drops_results() {
        let mut board = ChartBoard::new(Theme::Light);
        board.update(ChartData::bar(ChartId::Heloc, vec![]));
        board.reinitialize(Theme::Dark);

        assert_eq!(board.len(), 2);
        assert!(board.get(ChartId::Heloc).is_none());
        let style = &board.get(ChartId::Amortization).unwrap().style;
        assert_eq!(style.text_color, "#f9fafb");
        assert_eq!(style.grid_color, "#374151");
    }

    #[test]
    fn test_series_colors_follow_palette() {
        let chart = ChartData::line(ChartId::Amortization, vec![])
            .with_series("a", vec![])
            .with_series("b", vec![]);
        assert_eq!(chart.datasets[0].colors, vec!["#3b82f6".to_string()]);
        assert_eq!(chart.datasets[1].colors, vec!["#7c3aed".to_string()]);
    }

    #[test]
    fn test_canvas_key() {
        assert_eq!(ChartId::Brrrr.canvas_key(), "brrrr-chart");
        assert_eq!(ChartId::Payment.canvas_key(), "payment-chart");
    }
}
