// Descriptive statistics over the numeric columns

use crate::data::{Dataset, NumericColumn};
use serde::Serialize;

/// Row labels of the summary table, in display order.
pub const SUMMARY_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// `describe()`-style statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: NumericColumn,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Values in [`SUMMARY_ROWS`] order.
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q1,
            self.median,
            self.q3,
            self.max,
        ]
    }
}

/// Summary statistics for every numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub columns: Vec<ColumnSummary>,
}

impl SummaryTable {
    pub fn get(&self, column: NumericColumn) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == column)
    }
}

/// The four headline metrics shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub max_total_bill: f64,
    pub max_tip: f64,
    pub min_total_bill: f64,
    pub min_tip: f64,
}

impl Metrics {
    /// Labelled values in display order.
    pub fn labelled(&self) -> [(&'static str, f64); 4] {
        [
            ("Max. Total Bill", self.max_total_bill),
            ("Max. Tip", self.max_tip),
            ("Min. Total Bill", self.min_total_bill),
            ("Min. Tip", self.min_tip),
        ]
    }
}

/// Box statistics for one group of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn metrics(data: &Dataset) -> Metrics {
    Metrics {
        max_total_bill: data.max(NumericColumn::TotalBill).unwrap_or(f64::NAN),
        max_tip: data.max(NumericColumn::Tip).unwrap_or(f64::NAN),
        min_total_bill: data.min(NumericColumn::TotalBill).unwrap_or(f64::NAN),
        min_tip: data.min(NumericColumn::Tip).unwrap_or(f64::NAN),
    }
}

pub fn describe(data: &Dataset) -> SummaryTable {
    let columns = NumericColumn::ALL
        .iter()
        .map(|&col| summarize(col, &data.numeric(col)))
        .collect();
    SummaryTable { columns }
}

fn summarize(column: NumericColumn, values: &[f64]) -> ColumnSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let (min, max) = match (sorted.first(), sorted.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => (f64::NAN, f64::NAN),
    };

    ColumnSummary {
        column,
        count,
        mean: mean(values),
        std: std_dev(values),
        min,
        q1: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.50),
        q3: percentile(&sorted, 0.75),
        max,
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). NaN below two values.
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Linear-interpolated percentile of already sorted data, `p` in [0, 1].
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    let n = sorted_data.len();
    if n == 0 { return f64::NAN; }
    if n == 1 { return sorted_data[0]; }

    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;

    if lower_idx == upper_idx {
        sorted_data[lower_idx]
    } else {
        let weight = rank - lower_idx as f64;
        sorted_data[lower_idx] * (1.0 - weight) + sorted_data[upper_idx] * weight
    }
}

/// Pearson correlation coefficient. NaN when either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mx = mean(xs);
    let my = mean(ys);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

/// Symmetric correlation matrix over `columns`, diagonal fixed at 1.0.
pub fn correlation_matrix(data: &Dataset, columns: &[NumericColumn]) -> Vec<Vec<f64>> {
    let series: Vec<Vec<f64>> = columns.iter().map(|&c| data.numeric(c)).collect();
    let k = series.len();
    let mut matrix = vec![vec![1.0; k]; k];

    for i in 0..k {
        for j in (i + 1)..k {
            let r = pearson(&series[i], &series[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

/// Quartiles, 1.5 IQR whiskers and outliers of a group of values.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut ys = values.to_vec();
    ys.sort_by(f64::total_cmp);

    let q1 = percentile(&ys, 0.25);
    let median = percentile(&ys, 0.50);
    let q3 = percentile(&ys, 0.75);
    let iqr = q3 - q1;

    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    // Whiskers: range of data within fences
    let lower_whisker = ys.iter().copied().find(|&v| v >= lower_fence).unwrap_or(q1);
    let upper_whisker = ys.iter().rev().copied().find(|&v| v <= upper_fence).unwrap_or(q3);

    let outliers = ys
        .iter()
        .copied()
        .filter(|&v| v < lower_fence || v > upper_fence)
        .collect();

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::make_dataset;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_percentile_interpolates() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&data, 0.0), 1.0);
        assert_eq!(percentile(&data, 1.0), 4.0);
        assert!(approx(percentile(&data, 0.25), 1.75));
        assert!(approx(percentile(&data, 0.5), 2.5));
        assert!(percentile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_std_dev_sample() {
        // 2,4,4,4,5,5,7,9: population std 2, sample std sqrt(32/7)
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx(std_dev(&data), (32.0f64 / 7.0).sqrt()));
        assert!(std_dev(&[1.0]).is_nan());
    }

    #[test]
    fn test_describe_counts_match_rows() {
        let ds = make_dataset();
        let table = describe(&ds);
        assert_eq!(table.columns.len(), 3);
        for col in &table.columns {
            assert_eq!(col.count, ds.len());
        }
        let tip = table.get(NumericColumn::Tip).unwrap();
        assert_eq!(tip.max, 10.0);
        assert_eq!(tip.min, 1.0);
        assert!(tip.q1 <= tip.median && tip.median <= tip.q3);
    }

    #[test]
    fn test_describe_values_order() {
        let ds = make_dataset();
        let size = describe(&ds).get(NumericColumn::Size).unwrap().clone();
        let values = size.values();
        assert_eq!(values[0], 8.0);
        assert!(approx(values[1], 19.0 / 8.0));
        assert_eq!(values[3], 1.0);
        assert_eq!(values[7], 4.0);
    }

    #[test]
    fn test_metrics() {
        let m = metrics(&make_dataset());
        assert_eq!(m.max_total_bill, 50.81);
        assert_eq!(m.max_tip, 10.0);
        assert_eq!(m.min_total_bill, 3.07);
        assert_eq!(m.min_tip, 1.0);
        assert_eq!(m.labelled()[1], ("Max. Tip", 10.0));
    }

    #[test]
    fn test_pearson_perfect() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!(approx(pearson(&xs, &[2.0, 4.0, 6.0, 8.0]), 1.0));
        assert!(approx(pearson(&xs, &[8.0, 6.0, 4.0, 2.0]), -1.0));
        assert!(pearson(&xs, &[5.0, 5.0, 5.0, 5.0]).is_nan());
    }

    #[test]
    fn test_correlation_matrix_symmetric() {
        let ds = make_dataset();
        let m = correlation_matrix(&ds, &NumericColumn::ALL);
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(m[i][j], m[j][i]);
                assert!(m[i][j] >= -1.0 && m[i][j] <= 1.0);
            }
        }
        // Bill and tip move together in this sample
        assert!(m[0][1] > 0.5);
    }

    #[test]
    fn test_box_stats_outlier() {
        let stats = box_stats(&[1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 30.0]).unwrap();
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 3.5);
        assert_eq!(stats.outliers, vec![30.0]);
        assert_eq!(stats.upper_whisker, 4.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert!(box_stats(&[]).is_none());
    }
}
