// Chart specifications produced by the mapper and consumed by the renderer.
// Everything here is plain data so a whole dashboard can be dumped as JSON.

use crate::data::{CategoricalColumn, NumericColumn};
use crate::selection::FilterSelection;
use crate::stats::{BoxStats, Metrics, SummaryTable};
use serde::Serialize;

/// Everything one render cycle shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSpec {
    pub selection: FilterSelection,
    pub metrics: Metrics,
    pub scatter: ScatterSpec,
    pub bar: BarSpec,
    pub pie_smoker: PieSpec,
    pub pie_day: PieSpec,
    pub heatmap: HeatmapSpec,
    pub box_plot: BoxPlotSpec,
    pub summary: SummaryTable,
}

// =============================================================================
// Scatter
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSpec {
    pub title: String,
    pub x: NumericColumn,
    pub y: NumericColumn,
    pub color_by: Option<CategoricalColumn>,
    pub size_by: Option<NumericColumn>,
    pub facet_row: Option<CategoricalColumn>,
    pub facet_col: Option<CategoricalColumn>,
    pub nrow: usize,
    pub ncol: usize,
    /// Row-major, `nrow * ncol` entries.
    pub panels: Vec<ScatterPanel>,
    /// Legend entries: (key, color). Empty when color-by is unset.
    pub legend: Vec<(String, String)>,
}

impl ScatterSpec {
    pub fn point_count(&self) -> usize {
        self.panels.iter().map(ScatterPanel::point_count).sum()
    }

    pub fn panel(&self, row: usize, col: usize) -> Option<&ScatterPanel> {
        self.panels.get(row * self.ncol + col)
    }
}

/// One facet cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPanel {
    pub row: usize,
    pub col: usize,
    pub title: Option<String>,
    pub groups: Vec<PointGroup>,
}

impl ScatterPanel {
    pub fn point_count(&self) -> usize {
        self.groups.iter().map(|g| g.points.len()).sum()
    }
}

/// Points sharing one color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointGroup {
    pub key: String,
    pub color: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

// =============================================================================
// Bar
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSpec {
    pub title: String,
    pub x: CategoricalColumn,
    pub y: NumericColumn,
    pub color_by: Option<CategoricalColumn>,
    pub categories: Vec<String>,
    /// Stacked segments; `start`/`end` are cumulative within a category.
    pub segments: Vec<BarSegment>,
    pub legend: Vec<(String, String)>,
}

impl BarSpec {
    /// Height of the full stack for a category.
    pub fn total(&self, category: &str) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.category == category)
            .map(|s| s.end - s.start)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSegment {
    pub category: String,
    pub key: String,
    pub color: String,
    pub start: f64,
    pub end: f64,
}

// =============================================================================
// Pie
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSpec {
    pub title: String,
    pub names: CategoricalColumn,
    pub values: NumericColumn,
    pub color_by: Option<CategoricalColumn>,
    /// Inner radius as a fraction of the outer radius; 0.0 for a full pie.
    pub hole: f64,
    pub slices: Vec<PieSlice>,
}

impl PieSpec {
    pub fn is_donut(&self) -> bool {
        self.hole > 0.0
    }

    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Share of the whole pie, in [0, 1].
    pub fraction: f64,
    pub color: String,
}

// =============================================================================
// Heatmap / Box
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapSpec {
    pub title: String,
    pub columns: Vec<NumericColumn>,
    /// `matrix[i][j]` is the correlation of `columns[i]` with `columns[j]`.
    pub matrix: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotSpec {
    pub title: String,
    pub x: CategoricalColumn,
    pub y: NumericColumn,
    pub boxes: Vec<BoxSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSpec {
    pub category: String,
    pub color: String,
    pub count: usize,
    pub stats: BoxStats,
}
