use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One row of the tips table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Record {
    pub total_bill: f64,
    pub tip: f64,
    pub sex: String,
    pub smoker: String,
    pub day: String,
    pub time: String,
    pub size: u32,
}

impl Record {
    pub fn numeric(&self, col: NumericColumn) -> f64 {
        match col {
            NumericColumn::TotalBill => self.total_bill,
            NumericColumn::Tip => self.tip,
            NumericColumn::Size => self.size as f64,
        }
    }

    pub fn category(&self, col: CategoricalColumn) -> &str {
        match col {
            CategoricalColumn::Sex => &self.sex,
            CategoricalColumn::Smoker => &self.smoker,
            CategoricalColumn::Day => &self.day,
            CategoricalColumn::Time => &self.time,
        }
    }
}

/// Columns holding category labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalColumn {
    Sex,
    Smoker,
    Day,
    Time,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 4] = [
        CategoricalColumn::Sex,
        CategoricalColumn::Smoker,
        CategoricalColumn::Day,
        CategoricalColumn::Time,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalColumn::Sex => "sex",
            CategoricalColumn::Smoker => "smoker",
            CategoricalColumn::Day => "day",
            CategoricalColumn::Time => "time",
        }
    }
}

/// Numeric-typed columns. `Size` is the integer party size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    TotalBill,
    Tip,
    Size,
}

impl NumericColumn {
    /// In table order, as used by the summary table and the heatmap.
    pub const ALL: [NumericColumn; 3] = [
        NumericColumn::TotalBill,
        NumericColumn::Tip,
        NumericColumn::Size,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::TotalBill => "total_bill",
            NumericColumn::Tip => "tip",
            NumericColumn::Size => "size",
        }
    }
}

impl fmt::Display for CategoricalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CategoricalColumn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        CategoricalColumn::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("'{}' is not a categorical column (expected sex, smoker, day or time)", s))
    }
}

impl FromStr for NumericColumn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        NumericColumn::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("'{}' is not a numeric column (expected total_bill, tip or size)", s))
    }
}

/// The loaded table. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All values of a numeric column, in row order.
    pub fn numeric(&self, col: NumericColumn) -> Vec<f64> {
        self.records.iter().map(|r| r.numeric(col)).collect()
    }

    /// Distinct labels of a categorical column, sorted.
    pub fn distinct(&self, col: CategoricalColumn) -> Vec<String> {
        let set: BTreeSet<&str> = self.records.iter().map(|r| r.category(col)).collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Largest value of a numeric column, `None` on an empty table.
    pub fn max(&self, col: NumericColumn) -> Option<f64> {
        self.records
            .iter()
            .map(|r| r.numeric(col))
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }

    pub fn min(&self, col: NumericColumn) -> Option<f64> {
        self.records
            .iter()
            .map(|r| r.numeric(col))
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
    }
}
