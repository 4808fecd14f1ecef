use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;
use tipsboard::config::DashboardConfig;
use tipsboard::dashboard::Dashboard;
use tipsboard::parser::apply_selection;
use tipsboard::selection::{parse_categorical_choice, parse_size_choice, FilterSelection};
use tipsboard::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tipsboard")]
#[command(about = "Render the restaurant tips dashboard from a CSV file", long_about = None)]
struct Args {
    /// Path to the tips CSV (default: tips.csv)
    #[arg(long)]
    data: Option<PathBuf>,

    /// JSON config file with data path, output directory, render options and selection
    #[arg(long)]
    config: Option<PathBuf>,

    /// Selection expression, e.g. 'color: day, size: tip, row: sex, col: time'
    #[arg(long)]
    select: Option<String>,

    /// Scatter color encoding (sex, smoker, day, time or none)
    #[arg(long)]
    color: Option<String>,

    /// Scatter point size encoding (total_bill, tip or none)
    #[arg(long)]
    size: Option<String>,

    /// Facet rows by a categorical column (or none)
    #[arg(long)]
    row: Option<String>,

    /// Facet columns by a categorical column (or none)
    #[arg(long)]
    col: Option<String>,

    /// Output directory for charts (default: dashboard)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Chart format: png or svg
    #[arg(long)]
    format: Option<OutputFormat>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Print the dashboard spec as JSON instead of rendering charts
    #[arg(long)]
    json: bool,
}

/// Config selection, then --select, then individual flags; an explicit `none` clears a choice.
fn resolve_selection(base: FilterSelection, args: &Args) -> Result<FilterSelection> {
    let mut selection = base;
    if let Some(expr) = &args.select {
        selection = apply_selection(selection, expr).with_context(|| format!("Invalid selection '{}'", expr))?;
    }
    if let Some(v) = &args.color {
        selection.color = parse_categorical_choice(v).context("Invalid --color")?;
    }
    if let Some(v) = &args.size {
        selection.size = parse_size_choice(v).context("Invalid --size")?;
    }
    if let Some(v) = &args.row {
        selection.facet_row = parse_categorical_choice(v).context("Invalid --row")?;
    }
    if let Some(v) = &args.col {
        selection.facet_col = parse_categorical_choice(v).context("Invalid --col")?;
    }
    Ok(selection)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(data) = &args.data {
        config.data = data.clone();
    }
    if let Some(out) = &args.out {
        config.output_dir = out.clone();
    }
    if let Some(format) = args.format {
        config.render.format = format;
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let selection = resolve_selection(config.selection, &args)?;

    let dashboard = match Dashboard::load(&config.data) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            eprintln!("Load error ({}): {}", e.kind(), e);
            std::process::exit(1);
        }
    };
    info!("Loaded {} rows from {}", dashboard.dataset().len(), config.data.display());

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if args.json {
        let spec = dashboard.spec(&selection);
        let json = serde_json::to_string_pretty(&spec).context("Failed to serialize dashboard spec")?;
        writeln!(handle, "{}", json).context("Failed to write JSON to stdout")?;
        return Ok(());
    }

    let rendered = dashboard
        .render(&selection, &config.render)
        .context("Failed to render dashboard")?;
    write!(handle, "{}", rendered.report).context("Failed to write report to stdout")?;

    let written = rendered.write_to_dir(&config.output_dir)?;
    writeln!(handle, "\nWrote {} files to {}", written.len(), config.output_dir.display())
        .context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
