// Filter-to-chart mapping: (Dataset, FilterSelection) -> DashboardSpec

use crate::data::{CategoricalColumn, Dataset, NumericColumn, Record};
use crate::ir::{
    BarSegment, BarSpec, BoxPlotSpec, BoxSpec, DashboardSpec, HeatmapSpec, PieSlice, PieSpec,
    PointGroup, ScatterPanel, ScatterPoint, ScatterSpec,
};
use crate::palette::{ColorPalette, SizePalette};
use crate::selection::FilterSelection;
use crate::stats;
use log::debug;
use std::collections::{BTreeMap, HashMap};

/// Marker radius used when size-by is unset.
pub const DEFAULT_POINT_RADIUS: f64 = 3.0;

/// Hole ratio of the day donut.
pub const DONUT_HOLE: f64 = 0.4;

/// Group key for charts with no color mapping.
const SINGLE_GROUP: &str = "all";

/// Build every chart for one render cycle. Pure: same inputs, same output.
pub fn build_dashboard(data: &Dataset, selection: &FilterSelection) -> DashboardSpec {
    debug!("building dashboard for {} rows ({})", data.len(), selection);

    DashboardSpec {
        selection: *selection,
        metrics: stats::metrics(data),
        scatter: build_scatter(data, selection),
        bar: build_bar(data, selection.color),
        pie_smoker: build_pie(
            data,
            "Smoker / Non-Smoker Vs. Tips",
            CategoricalColumn::Smoker,
            selection.color,
            0.0,
        ),
        pie_day: build_pie(
            data,
            "Days Vs. Tips",
            CategoricalColumn::Day,
            selection.color,
            DONUT_HOLE,
        ),
        heatmap: build_heatmap(data),
        box_plot: build_box_plot(data),
        summary: stats::describe(data),
    }
}

// =============================================================================
// Scatter
// =============================================================================

/// Total bill against tip with every set encoding applied independently.
pub fn build_scatter(data: &Dataset, selection: &FilterSelection) -> ScatterSpec {
    let row_values = facet_values(data, selection.facet_row);
    let col_values = facet_values(data, selection.facet_col);
    let nrow = row_values.len();
    let ncol = col_values.len();

    let color_keys = match selection.color {
        Some(col) => data.distinct(col),
        None => vec![SINGLE_GROUP.to_string()],
    };
    let color_map = ColorPalette::category10().assign_colors(&color_keys);

    let sizes = SizePalette::default_range();
    let size_domain = selection.size.map(|col| {
        (
            data.min(col).unwrap_or(0.0),
            data.max(col).unwrap_or(0.0),
        )
    });

    let mut panels = Vec::with_capacity(nrow * ncol);
    for (r, row_value) in row_values.iter().enumerate() {
        for (c, col_value) in col_values.iter().enumerate() {
            let mut grouped: BTreeMap<String, Vec<ScatterPoint>> = BTreeMap::new();

            let cell_rows = data.records().iter().filter(|rec| {
                matches_facet(rec, selection.facet_row, row_value)
                    && matches_facet(rec, selection.facet_col, col_value)
            });

            for rec in cell_rows {
                let key = group_key(rec, selection.color);
                let radius = match (selection.size, size_domain) {
                    (Some(col), Some(domain)) => sizes.radius(rec.numeric(col), domain),
                    _ => DEFAULT_POINT_RADIUS,
                };
                grouped.entry(key).or_default().push(ScatterPoint {
                    x: rec.total_bill,
                    y: rec.tip,
                    radius,
                });
            }

            let groups = grouped
                .into_iter()
                .map(|(key, points)| PointGroup {
                    color: color_map.get(&key).cloned().unwrap_or_else(|| ColorPalette::category10().color_at(0)),
                    key,
                    points,
                })
                .collect();

            panels.push(ScatterPanel {
                row: r,
                col: c,
                title: panel_title(selection, row_value.as_deref(), col_value.as_deref()),
                groups,
            });
        }
    }

    ScatterSpec {
        title: "Total Bills Vs. Tips".to_string(),
        x: NumericColumn::TotalBill,
        y: NumericColumn::Tip,
        color_by: selection.color,
        size_by: selection.size,
        facet_row: selection.facet_row,
        facet_col: selection.facet_col,
        nrow,
        ncol,
        panels,
        legend: legend(selection.color, &color_keys, &color_map),
    }
}

fn facet_values(data: &Dataset, facet: Option<CategoricalColumn>) -> Vec<Option<String>> {
    match facet {
        Some(col) => data.distinct(col).into_iter().map(Some).collect(),
        None => vec![None],
    }
}

fn matches_facet(rec: &Record, facet: Option<CategoricalColumn>, value: &Option<String>) -> bool {
    match (facet, value) {
        (Some(col), Some(v)) => rec.category(col) == v,
        _ => true,
    }
}

fn group_key(rec: &Record, color: Option<CategoricalColumn>) -> String {
    match color {
        Some(col) => rec.category(col).to_string(),
        None => SINGLE_GROUP.to_string(),
    }
}

fn panel_title(selection: &FilterSelection, row_value: Option<&str>, col_value: Option<&str>) -> Option<String> {
    let parts: Vec<String> = [
        selection.facet_row.zip(row_value),
        selection.facet_col.zip(col_value),
    ]
    .into_iter()
    .flatten()
    .map(|(col, v)| format!("{} = {}", col, v))
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

fn legend(
    color: Option<CategoricalColumn>,
    keys: &[String],
    color_map: &HashMap<String, String>,
) -> Vec<(String, String)> {
    if color.is_none() {
        return Vec::new();
    }
    keys.iter()
        .filter_map(|k| color_map.get(k).map(|c| (k.clone(), c.clone())))
        .collect()
}

// =============================================================================
// Bar
// =============================================================================

/// Total bill summed per sex, stacked by the color column when one is set.
pub fn build_bar(data: &Dataset, color_by: Option<CategoricalColumn>) -> BarSpec {
    let x = CategoricalColumn::Sex;
    let categories = data.distinct(x);

    let color_keys = match color_by {
        Some(col) => data.distinct(col),
        None => vec![SINGLE_GROUP.to_string()],
    };
    let color_map = ColorPalette::category10().assign_colors(&color_keys);

    // (category, color key) -> sum
    let mut sums: BTreeMap<(String, String), f64> = BTreeMap::new();
    for rec in data.records() {
        let key = (rec.category(x).to_string(), group_key(rec, color_by));
        *sums.entry(key).or_default() += rec.total_bill;
    }

    let mut segments = Vec::new();
    for category in &categories {
        let mut y_cumulative = 0.0;
        for key in &color_keys {
            let Some(&value) = sums.get(&(category.clone(), key.clone())) else {
                continue;
            };
            segments.push(BarSegment {
                category: category.clone(),
                key: if color_by.is_some() { key.clone() } else { category.clone() },
                color: color_map[key].clone(),
                start: y_cumulative,
                end: y_cumulative + value,
            });
            y_cumulative += value;
        }
    }

    BarSpec {
        title: "Sex Vs. Total Bills".to_string(),
        x,
        y: NumericColumn::TotalBill,
        color_by,
        categories,
        segments,
        legend: legend(color_by, &color_keys, &color_map),
    }
}

// =============================================================================
// Pie
// =============================================================================

/// Tip totals per value of `names`, one slice each. With a color column, each
/// slice takes the color of its first row's value in that column.
pub fn build_pie(
    data: &Dataset,
    title: &str,
    names: CategoricalColumn,
    color_by: Option<CategoricalColumn>,
    hole: f64,
) -> PieSpec {
    let values = NumericColumn::Tip;
    let palette = ColorPalette::category10();
    let color_col = color_by.unwrap_or(names);
    let color_map = palette.assign_colors(&data.distinct(color_col));

    // name -> (sum, color key of the first row seen)
    let mut groups: BTreeMap<String, (f64, String)> = BTreeMap::new();
    for rec in data.records() {
        let entry = groups
            .entry(rec.category(names).to_string())
            .or_insert_with(|| (0.0, rec.category(color_col).to_string()));
        entry.0 += rec.numeric(values);
    }

    let total: f64 = groups.values().map(|(sum, _)| sum).sum();

    let slices = groups
        .into_iter()
        .map(|(name, (value, color_key))| PieSlice {
            label: name,
            value,
            fraction: if total > 0.0 { value / total } else { 0.0 },
            color: color_map
                .get(&color_key)
                .cloned()
                .unwrap_or_else(|| palette.color_at(0)),
        })
        .collect();

    PieSpec {
        title: title.to_string(),
        names,
        values,
        color_by,
        hole,
        slices,
    }
}

// =============================================================================
// Heatmap / Box
// =============================================================================

/// Correlation over the numeric-typed columns only.
pub fn build_heatmap(data: &Dataset) -> HeatmapSpec {
    let columns = NumericColumn::ALL.to_vec();
    let matrix = stats::correlation_matrix(data, &columns);
    HeatmapSpec {
        title: "Correlation Heatmap".to_string(),
        columns,
        matrix,
    }
}

/// Tip distribution per day, colored by day. Not filter-driven.
pub fn build_box_plot(data: &Dataset) -> BoxPlotSpec {
    let x = CategoricalColumn::Day;
    let y = NumericColumn::Tip;

    let mut by_day: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for rec in data.records() {
        by_day
            .entry(rec.category(x).to_string())
            .or_default()
            .push(rec.numeric(y));
    }

    let palette = ColorPalette::category10();
    let boxes = by_day
        .into_iter()
        .enumerate()
        .filter_map(|(i, (category, values))| {
            stats::box_stats(&values).map(|stats| BoxSpec {
                category,
                color: palette.color_at(i),
                count: values.len(),
                stats,
            })
        })
        .collect();

    BoxPlotSpec {
        title: "Box Plot of Tips by Day".to_string(),
        x,
        y,
        boxes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::make_dataset;
    use std::collections::BTreeSet;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_scatter_unencoded() {
        let ds = make_dataset();
        let spec = build_scatter(&ds, &FilterSelection::default());
        assert_eq!((spec.nrow, spec.ncol), (1, 1));
        assert_eq!(spec.panels.len(), 1);
        assert_eq!(spec.panels[0].groups.len(), 1);
        assert_eq!(spec.panels[0].title, None);
        assert_eq!(spec.point_count(), ds.len());
        assert!(spec.legend.is_empty());
        assert!(spec.panels[0].groups[0]
            .points
            .iter()
            .all(|p| p.radius == DEFAULT_POINT_RADIUS));
    }

    #[test]
    fn test_scatter_color_by_day_partitions() {
        let ds = make_dataset();
        let selection = FilterSelection {
            color: Some(CategoricalColumn::Day),
            ..Default::default()
        };
        let spec = build_scatter(&ds, &selection);
        let keys: Vec<&str> = spec.panels[0].groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, ds.distinct(CategoricalColumn::Day));
        assert_eq!(spec.point_count(), ds.len());

        let colors: BTreeSet<&str> = spec.panels[0].groups.iter().map(|g| g.color.as_str()).collect();
        assert_eq!(colors.len(), keys.len());
        assert_eq!(spec.legend.len(), keys.len());

        let sat = spec.panels[0].groups.iter().find(|g| g.key == "Sat").unwrap();
        assert_eq!(sat.points.len(), 2);
    }

    #[test]
    fn test_scatter_size_without_color() {
        let ds = make_dataset();
        let selection = FilterSelection {
            size: Some(NumericColumn::Tip),
            ..Default::default()
        };
        let spec = build_scatter(&ds, &selection);
        let points = &spec.panels[0].groups[0].points;
        let biggest = points.iter().find(|p| p.y == 10.0).unwrap();
        let smallest = points.iter().find(|p| p.y == 1.0).unwrap();
        assert_eq!(biggest.radius, SizePalette::default_range().max_radius);
        assert_eq!(smallest.radius, SizePalette::default_range().min_radius);
    }

    #[test]
    fn test_scatter_facet_grid() {
        let ds = make_dataset();
        let selection = FilterSelection {
            facet_row: Some(CategoricalColumn::Sex),
            facet_col: Some(CategoricalColumn::Time),
            ..Default::default()
        };
        let spec = build_scatter(&ds, &selection);
        assert_eq!((spec.nrow, spec.ncol), (2, 2));
        assert_eq!(spec.panels.len(), 4);
        assert_eq!(spec.point_count(), ds.len());

        let panel = spec.panel(1, 0).unwrap();
        assert_eq!(panel.title.as_deref(), Some("sex = Male | time = Dinner"));
        assert_eq!(panel.point_count(), 3);

        let female_lunch = spec.panel(0, 1).unwrap();
        assert_eq!(female_lunch.point_count(), 1);
    }

    #[test]
    fn test_scatter_facet_col_only_title() {
        let ds = make_dataset();
        let selection = FilterSelection {
            facet_col: Some(CategoricalColumn::Smoker),
            ..Default::default()
        };
        let spec = build_scatter(&ds, &selection);
        assert_eq!((spec.nrow, spec.ncol), (1, 2));
        assert_eq!(spec.panels[1].title.as_deref(), Some("smoker = Yes"));
    }

    #[test]
    fn test_bar_totals() {
        let ds = make_dataset();
        let plain = build_bar(&ds, None);
        assert_eq!(plain.categories, vec!["Female", "Male"]);
        assert_eq!(plain.segments.len(), 2);
        assert!(approx(plain.total("Female"), 16.99 + 3.07 + 10.07));

        let stacked = build_bar(&ds, Some(CategoricalColumn::Smoker));
        assert!(approx(stacked.total("Male"), plain.total("Male")));
        let male: Vec<&BarSegment> = stacked.segments.iter().filter(|s| s.category == "Male").collect();
        assert_eq!(male.len(), 2);
        assert_eq!(male[0].start, 0.0);
        assert_eq!(male[1].start, male[0].end);
        assert_eq!(stacked.legend.len(), 2);
    }

    #[test]
    fn test_pie_smoker() {
        let ds = make_dataset();
        let pie = build_pie(&ds, "t", CategoricalColumn::Smoker, None, 0.0);
        assert!(!pie.is_donut());
        assert_eq!(pie.slices.len(), 2);
        let total_tip: f64 = ds.numeric(NumericColumn::Tip).iter().sum();
        assert!(approx(pie.total(), total_tip));
        let fractions: f64 = pie.slices.iter().map(|s| s.fraction).sum();
        assert!(approx(fractions, 1.0));
        assert_ne!(pie.slices[0].color, pie.slices[1].color);
    }

    #[test]
    fn test_pie_colored_keeps_one_slice_per_name() {
        let ds = make_dataset();
        let pie = build_pie(&ds, "t", CategoricalColumn::Day, Some(CategoricalColumn::Sex), DONUT_HOLE);
        assert!(pie.is_donut());

        let labels: Vec<&str> = pie.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Fri", "Sat", "Sun", "Thur"]);
        let values: Vec<f64> = pie.slices.iter().map(|s| s.value).collect();
        for (got, want) in values.iter().zip([2.2, 11.0, 6.17, 5.83]) {
            assert!(approx(*got, want), "{} != {}", got, want);
        }

        // First Sun row is Female; the other days open with a Male row
        let colors = ColorPalette::category10().assign_colors(&ds.distinct(CategoricalColumn::Sex));
        assert_eq!(pie.slices[2].color, colors["Female"]);
        assert_eq!(pie.slices[0].color, colors["Male"]);
        assert_eq!(pie.slices[1].color, pie.slices[3].color);
    }

    #[test]
    fn test_pie_color_same_as_names() {
        let ds = make_dataset();
        let pie = build_pie(&ds, "t", CategoricalColumn::Day, Some(CategoricalColumn::Day), 0.0);
        assert_eq!(pie.slices.len(), 4);
    }

    #[test]
    fn test_box_plot_by_day() {
        let ds = make_dataset();
        let spec = build_box_plot(&ds);
        let days: Vec<&str> = spec.boxes.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(days, vec!["Fri", "Sat", "Sun", "Thur"]);
        let counts: usize = spec.boxes.iter().map(|b| b.count).sum();
        assert_eq!(counts, ds.len());
        let fri = &spec.boxes[0];
        assert_eq!(fri.stats.median, 2.2);
    }

    #[test]
    fn test_metrics_ignore_selection() {
        let ds = make_dataset();
        let a = build_dashboard(&ds, &FilterSelection::default());
        let b = build_dashboard(
            &ds,
            &FilterSelection {
                color: Some(CategoricalColumn::Time),
                size: Some(NumericColumn::TotalBill),
                facet_row: Some(CategoricalColumn::Day),
                facet_col: Some(CategoricalColumn::Sex),
            },
        );
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.metrics.max_total_bill, 50.81);
        assert_eq!(a.metrics.max_tip, 10.0);
    }

    #[test]
    fn test_heatmap_numeric_only() {
        let ds = make_dataset();
        let spec = build_heatmap(&ds);
        assert_eq!(spec.columns, NumericColumn::ALL.to_vec());
        for i in 0..spec.columns.len() {
            assert_eq!(spec.matrix[i][i], 1.0);
            for j in 0..spec.columns.len() {
                assert_eq!(spec.matrix[i][j], spec.matrix[j][i]);
            }
        }
    }
}
