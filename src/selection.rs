use crate::data::{CategoricalColumn, NumericColumn};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Choices offered for size-by; party size is excluded.
pub const SIZE_CHOICES: [NumericColumn; 2] = [NumericColumn::TotalBill, NumericColumn::Tip];

/// The four independent user choices driving the charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub color: Option<CategoricalColumn>,
    pub size: Option<NumericColumn>,
    pub facet_row: Option<CategoricalColumn>,
    pub facet_col: Option<CategoricalColumn>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        *self == FilterSelection::default()
    }

    /// Reject choices outside the offered sets.
    pub fn validate(&self) -> Result<()> {
        if let Some(col) = self.size {
            check_size_choice(col)?;
        }
        Ok(())
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show<T: fmt::Display>(v: &Option<T>) -> String {
            v.as_ref().map_or_else(|| "none".to_string(), |c| c.to_string())
        }
        write!(
            f,
            "color: {}, size: {}, row: {}, col: {}",
            show(&self.color),
            show(&self.size),
            show(&self.facet_row),
            show(&self.facet_col)
        )
    }
}

/// Parse one categorical choice; "none" (any case) or an empty string means unset.
pub fn parse_categorical_choice(value: &str) -> Result<Option<CategoricalColumn>> {
    if is_none(value) {
        return Ok(None);
    }
    let col: CategoricalColumn = value.parse()?;
    Ok(Some(col))
}

/// Parse a size-by choice, restricted to [`SIZE_CHOICES`].
pub fn parse_size_choice(value: &str) -> Result<Option<NumericColumn>> {
    if is_none(value) {
        return Ok(None);
    }
    let col: NumericColumn = value
        .parse()
        .with_context(|| format!("invalid size-by choice '{}'", value))?;
    check_size_choice(col)?;
    Ok(Some(col))
}

fn check_size_choice(col: NumericColumn) -> Result<()> {
    if !SIZE_CHOICES.contains(&col) {
        bail!("'{}' cannot be used for size-by (expected total_bill or tip)", col);
    }
    Ok(())
}

fn is_none(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("none")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choices() {
        assert_eq!(parse_categorical_choice("day").unwrap(), Some(CategoricalColumn::Day));
        assert_eq!(parse_categorical_choice("None").unwrap(), None);
        assert_eq!(parse_categorical_choice("").unwrap(), None);
        assert!(parse_categorical_choice("tip").is_err());

        assert_eq!(parse_size_choice("tip").unwrap(), Some(NumericColumn::Tip));
        assert_eq!(parse_size_choice("none").unwrap(), None);
        assert!(parse_size_choice("size").is_err());
        assert!(parse_size_choice("sex").is_err());
    }

    #[test]
    fn test_validate_size_choice() {
        let ok = FilterSelection {
            size: Some(NumericColumn::TotalBill),
            color: Some(CategoricalColumn::Day),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
        assert!(FilterSelection::default().validate().is_ok());

        let party_size = FilterSelection {
            size: Some(NumericColumn::Size),
            ..Default::default()
        };
        assert!(party_size.validate().is_err());
    }

    #[test]
    fn test_display() {
        let sel = FilterSelection {
            color: Some(CategoricalColumn::Smoker),
            ..Default::default()
        };
        assert_eq!(sel.to_string(), "color: smoker, size: none, row: none, col: none");
        assert!(FilterSelection::default().is_empty());
    }
}
