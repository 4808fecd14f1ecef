// Color and size palettes for mapped aesthetics

use std::collections::HashMap;

/// Qualitative palette for categorical color mappings, cycled when exhausted.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<&'static str>,
}

impl ColorPalette {
    /// The ten-color d3 "category10" scheme.
    pub fn category10() -> Self {
        Self {
            colors: vec![
                "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
                "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
            ],
        }
    }

    pub fn color_at(&self, index: usize) -> String {
        self.colors[index % self.colors.len()].to_string()
    }

    /// Assign one color per key, in the order given.
    pub fn assign_colors(&self, keys: &[String]) -> HashMap<String, String> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), self.color_at(i)))
            .collect()
    }
}

/// Linear mapping from a numeric domain onto marker radii.
#[derive(Debug, Clone, Copy)]
pub struct SizePalette {
    pub min_radius: f64,
    pub max_radius: f64,
}

impl SizePalette {
    pub fn default_range() -> Self {
        Self { min_radius: 2.0, max_radius: 12.0 }
    }

    /// Radius for `value` given the data domain `(lo, hi)`. A flat domain maps to the midpoint.
    pub fn radius(&self, value: f64, domain: (f64, f64)) -> f64 {
        let (lo, hi) = domain;
        let span = hi - lo;
        if !(span > 0.0) {
            return (self.min_radius + self.max_radius) / 2.0;
        }
        let t = ((value - lo) / span).clamp(0.0, 1.0);
        self.min_radius + t * (self.max_radius - self.min_radius)
    }
}

/// Diverging blue-white-red colormap for values in [-1, 1]. NaN maps to gray.
pub fn coolwarm(value: f64) -> String {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    if value.is_nan() {
        return "#808080".to_string();
    }
    let v = value.clamp(-1.0, 1.0);
    let (from, to, t) = if v < 0.0 { (MID, COLD, -v) } else { (MID, WARM, v) };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        lerp(from.0, to.0),
        lerp(from.1, to.1),
        lerp(from.2, to.2)
    )
}
