use crate::ir::{BarSpec, BoxPlotSpec, HeatmapSpec, PieSpec, ScatterSpec};
use crate::palette::coolwarm;
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use std::ops::Range;

/// A chart spec that knows how to draw itself on any plotters backend.
pub trait Chart {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static;
}

/// Largest accepted width or height in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

/// Draw `chart` and encode it in the configured output format.
pub fn render<C: Chart>(chart: &C, options: &RenderOptions) -> Result<Vec<u8>> {
    let (width, height) = (options.width, options.height);
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        anyhow::bail!(
            "Cannot render a {}x{} image (each side must be 1..={})",
            width,
            height,
            MAX_DIMENSION
        );
    }

    match options.format {
        OutputFormat::Png => {
            let len = (width as usize)
                .checked_mul(height as usize)
                .and_then(|n| n.checked_mul(3))
                .with_context(|| format!("Image buffer for {}x{} overflows", width, height))?;
            let mut buffer = vec![0u8; len];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
                chart.draw(&root)?;
                root.present().context("Failed to present drawing")?;
            }
            encode_png(&buffer, width, height)
        }
        OutputFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
                chart.draw(&root)?;
                root.present().context("Failed to present drawing")?;
            }
            Ok(svg.into_bytes())
        }
    }
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

// =============================================================================
// Scatter
// =============================================================================

impl Chart for ScatterSpec {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let points: Vec<(f64, f64)> = self
            .panels
            .iter()
            .flat_map(|p| p.groups.iter())
            .flat_map(|g| g.points.iter().map(|pt| (pt.x, pt.y)))
            .collect();
        if points.is_empty() {
            anyhow::bail!("Cannot draw a scatter chart with no data points");
        }

        // Facets share one pair of axes
        let x_range = padded(points.iter().map(|p| p.0));
        let y_range = padded(points.iter().map(|p| p.1));

        root.fill(&WHITE).context("Failed to fill background")?;
        let body = root
            .titled(&self.title, ("sans-serif", 24.0))
            .context("Failed to draw title")?;

        let cells = body.split_evenly((self.nrow.max(1), self.ncol.max(1)));
        for (idx, (panel, area)) in self.panels.iter().zip(cells.iter()).enumerate() {
            let mut chart = ChartBuilder::on(area)
                .margin(10)
                .caption(panel.title.as_deref().unwrap_or(""), ("sans-serif", 16))
                .x_label_area_size(35)
                .y_label_area_size(45)
                .build_cartesian_2d(x_range.clone(), y_range.clone())
                .context("Failed to build chart")?;

            chart
                .configure_mesh()
                .x_desc(self.x.name())
                .y_desc(self.y.name())
                .draw()
                .context("Failed to draw mesh")?;

            for group in &panel.groups {
                let color = parse_color(&group.color);
                let series = chart
                    .draw_series(group.points.iter().map(|p| {
                        Circle::new((p.x, p.y), p.radius.round().max(1.0) as i32, color.mix(0.7).filled())
                    }))
                    .context("Failed to draw point series")?;
                if self.color_by.is_some() {
                    series
                        .label(group.key.as_str())
                        .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
                }
            }

            // Legend once, on the first panel
            if idx == 0 && !self.legend.is_empty() {
                chart
                    .configure_series_labels()
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK)
                    .draw()
                    .context("Failed to draw legend")?;
            }
        }

        Ok(())
    }
}

// =============================================================================
// Bar
// =============================================================================

impl Chart for BarSpec {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        if self.categories.is_empty() || self.segments.is_empty() {
            anyhow::bail!("Cannot create bar chart with no data");
        }

        let y_max = self
            .segments
            .iter()
            .map(|s| s.end)
            .fold(0.0f64, f64::max);
        let n = self.categories.len();

        root.fill(&WHITE).context("Failed to fill background")?;
        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(&self.title, ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(categorical_range(n), 0.0..(y_max * 1.05).max(1.0))
            .context("Failed to build chart")?;

        let categories = &self.categories;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| category_label(categories, *x))
            .x_desc(self.x.name())
            .y_desc(self.y.name())
            .draw()
            .context("Failed to draw mesh")?;

        let bar_width = 0.8;
        let mut labelled: Vec<&str> = Vec::new();
        for segment in &self.segments {
            let Some(cat_idx) = categories.iter().position(|c| *c == segment.category) else {
                continue;
            };
            let x_center = cat_idx as f64;
            let color = parse_color(&segment.color);

            let series = chart
                .draw_series(std::iter::once(Rectangle::new(
                    [
                        (x_center - bar_width / 2.0, segment.start),
                        (x_center + bar_width / 2.0, segment.end),
                    ],
                    color.filled(),
                )))
                .context("Failed to draw bar")?;

            if self.color_by.is_some() && !labelled.contains(&segment.key.as_str()) {
                labelled.push(&segment.key);
                series
                    .label(segment.key.as_str())
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
            }
        }

        if !self.legend.is_empty() {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .context("Failed to draw legend")?;
        }

        Ok(())
    }
}

// =============================================================================
// Pie / Donut
// =============================================================================

impl Chart for PieSpec {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        if self.slices.is_empty() || self.total() <= 0.0 {
            anyhow::bail!("Cannot draw a pie chart with no values");
        }

        root.fill(&WHITE).context("Failed to fill background")?;
        let body = root
            .titled(&self.title, ("sans-serif", 20.0))
            .context("Failed to draw title")?;

        let (w, _) = body.dim_in_pixel();
        let (pie_area, legend_area) = body.split_horizontally((w as f64 * 0.7) as i32);

        let (pw, ph) = pie_area.dim_in_pixel();
        let center = (pw as f64 / 2.0, ph as f64 / 2.0);
        let outer = pw.min(ph) as f64 * 0.42;
        let inner = outer * self.hole.clamp(0.0, 0.95);

        let label_style = TextStyle::from(("sans-serif", 13.0).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));

        // Clockwise from twelve o'clock
        let mut start = -PI / 2.0;
        for slice in &self.slices {
            let sweep = slice.fraction * 2.0 * PI;
            let end = start + sweep;
            let color = parse_color(&slice.color);

            let polygon = wedge(center, outer, inner, start, end);
            pie_area
                .draw(&Polygon::new(polygon, color.filled()))
                .context("Failed to draw slice")?;

            if slice.fraction >= 0.03 {
                let mid = start + sweep / 2.0;
                let r = (outer + inner.max(outer * 0.3)) / 2.0;
                let at = (
                    (center.0 + r * mid.cos()).round() as i32,
                    (center.1 + r * mid.sin()).round() as i32,
                );
                pie_area
                    .draw(&Text::new(format!("{:.1}%", slice.fraction * 100.0), at, label_style.clone()))
                    .context("Failed to draw slice label")?;
            }
            start = end;
        }

        draw_legend(&legend_area, self.slices.iter().map(|s| (s.label.as_str(), s.color.as_str())))
    }
}

/// Polygon outline of an annular sector (or a plain sector when `inner` is 0).
fn wedge(center: (f64, f64), outer: f64, inner: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let steps = (((end - start).abs() / (PI / 180.0)).ceil() as usize).max(2);
    let at = |radius: f64, angle: f64| {
        (
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        )
    };

    let mut points = Vec::with_capacity(steps * 2 + 2);
    for i in 0..=steps {
        let a = start + (end - start) * i as f64 / steps as f64;
        points.push(at(outer, a));
    }
    if inner > 0.0 {
        for i in (0..=steps).rev() {
            let a = start + (end - start) * i as f64 / steps as f64;
            points.push(at(inner, a));
        }
    } else {
        points.push(at(0.0, start));
    }
    points
}

fn draw_legend<'a, DB, I>(area: &DrawingArea<DB, Shift>, entries: I) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    I: Iterator<Item = (&'a str, &'a str)>,
{
    let style = TextStyle::from(("sans-serif", 13.0).into_font()).color(&BLACK);
    for (i, (label, color)) in entries.enumerate() {
        let y = 20 + i as i32 * 20;
        area.draw(&Rectangle::new([(5, y - 6), (17, y + 6)], parse_color(color).filled()))
            .context("Failed to draw legend swatch")?;
        area.draw(&Text::new(label.to_string(), (24, y - 7), style.clone()))
            .context("Failed to draw legend label")?;
    }
    Ok(())
}

// =============================================================================
// Heatmap
// =============================================================================

impl Chart for HeatmapSpec {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let k = self.columns.len();
        if k == 0 {
            anyhow::bail!("Cannot draw a heatmap with no columns");
        }
        let names: Vec<String> = self.columns.iter().map(|c| c.name().to_string()).collect();
        // Row 0 is drawn at the top
        let reversed: Vec<String> = names.iter().rev().cloned().collect();

        root.fill(&WHITE).context("Failed to fill background")?;
        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(&self.title, ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(categorical_range(k), categorical_range(k))
            .context("Failed to build chart")?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(k)
            .y_labels(k)
            .x_label_formatter(&|x| category_label(&names, *x))
            .y_label_formatter(&|y| category_label(&reversed, *y))
            .draw()
            .context("Failed to draw mesh")?;

        let cells: Vec<(usize, usize, f64)> = self
            .matrix
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, &value)| (i, j, value)))
            .collect();

        chart
            .draw_series(cells.iter().map(|&(i, j, value)| {
                let y = (k - 1 - i) as f64;
                let x = j as f64;
                Rectangle::new(
                    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                    parse_color(&coolwarm(value)).filled(),
                )
            }))
            .context("Failed to draw heatmap cells")?;

        let annot = TextStyle::from(("sans-serif", 16.0).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        chart
            .draw_series(cells.iter().map(|&(i, j, value)| {
                Text::new(format!("{:.2}", value), (j as f64, (k - 1 - i) as f64), annot.clone())
            }))
            .context("Failed to draw heatmap annotations")?;

        Ok(())
    }
}

// =============================================================================
// Box plot
// =============================================================================

impl Chart for BoxPlotSpec {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        if self.boxes.is_empty() {
            anyhow::bail!("Cannot draw a box plot with no groups");
        }

        let y_range = padded(self.boxes.iter().flat_map(|b| {
            std::iter::once(b.stats.lower_whisker)
                .chain(std::iter::once(b.stats.upper_whisker))
                .chain(b.stats.outliers.iter().copied())
        }));
        let categories: Vec<String> = self.boxes.iter().map(|b| b.category.clone()).collect();
        let n = categories.len();

        root.fill(&WHITE).context("Failed to fill background")?;
        let mut chart = ChartBuilder::on(root)
            .margin(10)
            .caption(&self.title, ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(categorical_range(n), y_range)
            .context("Failed to build chart")?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x| category_label(&categories, *x))
            .x_desc(self.x.name())
            .y_desc(self.y.name())
            .draw()
            .context("Failed to draw mesh")?;

        let half_width = 0.3;
        let cap_half = 0.12;
        for (i, b) in self.boxes.iter().enumerate() {
            let x = i as f64;
            let color = parse_color(&b.color);
            let s = &b.stats;

            let lines = vec![
                vec![(x, s.lower_whisker), (x, s.q1)],
                vec![(x, s.q3), (x, s.upper_whisker)],
                vec![(x - cap_half, s.lower_whisker), (x + cap_half, s.lower_whisker)],
                vec![(x - cap_half, s.upper_whisker), (x + cap_half, s.upper_whisker)],
            ];
            chart
                .draw_series(lines.into_iter().map(|pts| PathElement::new(pts, color.stroke_width(2))))
                .context("Failed to draw whiskers")?;

            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x - half_width, s.q3), (x + half_width, s.q1)],
                    color.mix(0.6).filled(),
                )))
                .context("Failed to draw box")?
                .label(b.category.as_str())
                .legend(move |(lx, ly)| Rectangle::new([(lx, ly - 5), (lx + 10, ly + 5)], color.filled()));

            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(x - half_width, s.median), (x + half_width, s.median)],
                    WHITE.stroke_width(2),
                )))
                .context("Failed to draw median")?;

            chart
                .draw_series(s.outliers.iter().map(|&v| Circle::new((x, v), 3, color.filled())))
                .context("Failed to draw outliers")?;
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .context("Failed to draw legend")?;

        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Axis range for `n` categories centred on 0..n-1.
fn categorical_range(n: usize) -> Range<f64> {
    -0.5..(n.max(1) as f64 - 0.5)
}

/// Label for a categorical tick; empty between categories.
fn category_label(categories: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

/// Data range padded by 5% on each side, or by 1 when flat.
fn padded<I: Iterator<Item = f64>>(values: I) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

/// Parse a `#RRGGBB` or `#RGB` color, falling back to blue.
pub fn parse_color(color_str: &str) -> RGBColor {
    parse_hex_color(color_str).unwrap_or(BLUE)
}

fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim().strip_prefix('#')?;
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(RGBColor(r, g, b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::make_dataset;
    use crate::data::CategoricalColumn;
    use crate::mapper;
    use crate::selection::FilterSelection;

    fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
    }

    fn small_png() -> RenderOptions {
        RenderOptions { width: 320, height: 240, format: OutputFormat::Png }
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_color("#FF0000"), RGBColor(255, 0, 0));
        assert_eq!(parse_color("#1f77b4"), RGBColor(31, 119, 180));
        assert_eq!(parse_color("#F00"), RGBColor(255, 0, 0));
        assert_eq!(parse_color("red"), BLUE);
        assert_eq!(parse_color("#12345"), BLUE);
    }

    #[test]
    fn test_category_label() {
        let cats = vec!["Fri".to_string(), "Sat".to_string()];
        assert_eq!(category_label(&cats, 0.0), "Fri");
        assert_eq!(category_label(&cats, 1.0), "Sat");
        assert_eq!(category_label(&cats, 0.5), "");
        assert_eq!(category_label(&cats, 2.0), "");
        assert_eq!(category_label(&cats, -1.0), "");
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded(vec![5.0].into_iter()), 4.0..6.0);
        let r = padded(vec![0.0, 10.0].into_iter());
        assert!(r.start < 0.0 && r.end > 10.0);
        assert_eq!(padded(std::iter::empty()), 0.0..1.0);
    }

    #[test]
    fn test_wedge_closes_on_center() {
        let pts = wedge((50.0, 50.0), 40.0, 0.0, 0.0, PI / 2.0);
        assert_eq!(*pts.last().unwrap(), (50, 50));
        assert_eq!(pts[0], (90, 50));

        let ring = wedge((50.0, 50.0), 40.0, 20.0, 0.0, PI / 2.0);
        assert_eq!(*ring.last().unwrap(), (70, 50));
    }

    #[test]
    fn test_render_every_chart_png() {
        let ds = make_dataset();
        let selection = FilterSelection {
            color: Some(CategoricalColumn::Day),
            facet_col: Some(CategoricalColumn::Time),
            ..Default::default()
        };
        let spec = mapper::build_dashboard(&ds, &selection);
        let opts = small_png();

        assert!(is_valid_png(&render(&spec.scatter, &opts).unwrap()));
        assert!(is_valid_png(&render(&spec.bar, &opts).unwrap()));
        assert!(is_valid_png(&render(&spec.pie_smoker, &opts).unwrap()));
        assert!(is_valid_png(&render(&spec.pie_day, &opts).unwrap()));
        assert!(is_valid_png(&render(&spec.heatmap, &opts).unwrap()));
        assert!(is_valid_png(&render(&spec.box_plot, &opts).unwrap()));
    }

    #[test]
    fn test_render_svg() {
        let ds = make_dataset();
        let spec = mapper::build_dashboard(&ds, &FilterSelection::default());
        let opts = RenderOptions { format: OutputFormat::Svg, ..small_png() };
        let bytes = render(&spec.heatmap, &opts).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("<svg"));
    }

    #[test]
    fn test_render_rejects_bad_dimensions() {
        let ds = make_dataset();
        let spec = mapper::build_dashboard(&ds, &FilterSelection::default());

        let huge = RenderOptions { width: 70_000, height: 70_000, ..small_png() };
        assert!(render(&spec.heatmap, &huge).is_err());
        let svg_huge = RenderOptions { format: OutputFormat::Svg, ..huge };
        assert!(render(&spec.heatmap, &svg_huge).is_err());
        let flat = RenderOptions { height: 0, ..small_png() };
        assert!(render(&spec.heatmap, &flat).is_err());
    }

    #[test]
    fn test_render_rejects_empty() {
        let ds = make_dataset();
        let mut spec = mapper::build_dashboard(&ds, &FilterSelection::default());
        spec.pie_day.slices.clear();
        assert!(render(&spec.pie_day, &small_png()).is_err());
        spec.scatter.panels.clear();
        assert!(render(&spec.scatter, &small_png()).is_err());
    }
}
