// Load -> select -> map -> render cycle for the whole dashboard

use crate::csv_reader::{load_dataset, LoadError};
use crate::data::Dataset;
use crate::graph::{self, Chart};
use crate::ir::DashboardSpec;
use crate::mapper::build_dashboard;
use crate::report::format_report;
use crate::selection::FilterSelection;
use crate::RenderOptions;
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

pub const SPEC_FILE_NAME: &str = "dashboard.json";
pub const SUMMARY_FILE_NAME: &str = "summary.txt";

/// Chart names in the order they appear on the dashboard.
pub const CHART_NAMES: [&str; 6] = ["scatter", "bar", "pie_smoker", "pie_day", "heatmap", "box"];

pub struct Dashboard {
    data: Dataset,
}

#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub name: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RenderedDashboard {
    pub spec: DashboardSpec,
    pub charts: Vec<RenderedChart>,
    pub report: String,
}

impl Dashboard {
    /// The dataset is read once; every later selection reuses it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Ok(Self::from_dataset(load_dataset(path)?))
    }

    pub fn from_dataset(data: Dataset) -> Self {
        Self { data }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    pub fn spec(&self, selection: &FilterSelection) -> DashboardSpec {
        build_dashboard(&self.data, selection)
    }

    pub fn render(&self, selection: &FilterSelection, options: &RenderOptions) -> Result<RenderedDashboard> {
        info!("Rendering dashboard ({})", selection);
        let spec = self.spec(selection);
        let ext = options.format.extension();

        let charts = vec![
            render_chart("scatter", &spec.scatter, options, ext)?,
            render_chart("bar", &spec.bar, options, ext)?,
            render_chart("pie_smoker", &spec.pie_smoker, options, ext)?,
            render_chart("pie_day", &spec.pie_day, options, ext)?,
            render_chart("heatmap", &spec.heatmap, options, ext)?,
            render_chart("box", &spec.box_plot, options, ext)?,
        ];
        let report = format_report(&spec.metrics, &spec.summary);

        Ok(RenderedDashboard { spec, charts, report })
    }
}

fn render_chart<C: Chart>(
    name: &'static str,
    chart: &C,
    options: &RenderOptions,
    ext: &str,
) -> Result<RenderedChart> {
    let bytes = graph::render(chart, options).with_context(|| format!("Failed to render {} chart", name))?;
    debug!("Rendered {} ({} bytes)", name, bytes.len());
    Ok(RenderedChart {
        name,
        file_name: format!("{}.{}", name, ext),
        bytes,
    })
}

impl RenderedDashboard {
    pub fn chart(&self, name: &str) -> Option<&RenderedChart> {
        self.charts.iter().find(|c| c.name == name)
    }

    /// Writes every chart plus the JSON spec and the text summary; returns the written paths.
    pub fn write_to_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let mut written = Vec::with_capacity(self.charts.len() + 2);
        for chart in &self.charts {
            let path = dir.join(&chart.file_name);
            fs::write(&path, &chart.bytes).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
            written.push(path);
        }

        let spec_path = dir.join(SPEC_FILE_NAME);
        let json = serde_json::to_string_pretty(&self.spec).context("Failed to serialize dashboard spec")?;
        fs::write(&spec_path, json).with_context(|| format!("Failed to write {}", spec_path.display()))?;
        written.push(spec_path);

        let summary_path = dir.join(SUMMARY_FILE_NAME);
        fs::write(&summary_path, &self.report)
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;
        written.push(summary_path);

        Ok(written)
    }
}
