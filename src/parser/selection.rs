// Parser for compact selection expressions
// Format: color: day, size: tip, row: sex, col: time

use super::lexer::{identifier, ws};
use crate::selection::{parse_categorical_choice, parse_size_choice, FilterSelection};
use anyhow::{anyhow, bail, Result};
use nom::{
    character::complete::char,
    combinator::{all_consuming, opt},
    multi::separated_list0,
    sequence::{separated_pair, terminated},
    IResult,
};

/// Parse a list of `key: value` pairs separated by commas (trailing comma allowed)
pub fn parse_assignments(input: &str) -> IResult<&str, Vec<(String, String)>> {
    terminated(
        separated_list0(
            ws(char(',')),
            separated_pair(ws(identifier), char(':'), ws(identifier)),
        ),
        opt(ws(char(','))),
    )(input)
}

/// Parse a full selection expression into a [`FilterSelection`].
///
/// Keys may come in any order but at most once each. `row`/`col` also accept
/// their long forms `facet_row`/`facet_col`, and `none` leaves a key unset.
pub fn parse_selection(input: &str) -> Result<FilterSelection> {
    apply_selection(FilterSelection::default(), input)
}

/// Like [`parse_selection`], but keys absent from `input` keep their value in `base`.
/// A key given as `none` is cleared.
pub fn apply_selection(base: FilterSelection, input: &str) -> Result<FilterSelection> {
    let (_, pairs) = all_consuming(ws(parse_assignments))(input)
        .map_err(|e| anyhow!("invalid selection '{}': {:?}", input, e))?;

    let mut selection = base;
    let mut seen: Vec<&'static str> = Vec::new();

    for (key, value) in &pairs {
        let canonical = match key.to_ascii_lowercase().as_str() {
            "color" | "colour" => "color",
            "size" => "size",
            "row" | "facet_row" => "row",
            "col" | "column" | "facet_col" => "col",
            other => bail!("unknown selection key '{}' (expected color, size, row or col)", other),
        };
        if seen.contains(&canonical) {
            bail!("selection key '{}' given more than once", canonical);
        }
        seen.push(canonical);

        match canonical {
            "color" => selection.color = parse_categorical_choice(value)?,
            "size" => selection.size = parse_size_choice(value)?,
            "row" => selection.facet_row = parse_categorical_choice(value)?,
            _ => selection.facet_col = parse_categorical_choice(value)?,
        }
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CategoricalColumn, NumericColumn};

    #[test]
    fn test_apply_selection_keeps_and_clears() {
        let base = FilterSelection {
            color: Some(CategoricalColumn::Sex),
            size: Some(NumericColumn::Tip),
            ..Default::default()
        };
        let sel = apply_selection(base, "color: none, row: day").unwrap();
        assert_eq!(sel.color, None);
        assert_eq!(sel.size, Some(NumericColumn::Tip));
        assert_eq!(sel.facet_row, Some(CategoricalColumn::Day));
        assert_eq!(apply_selection(base, "").unwrap(), base);
    }

    #[test]
    fn test_parse_full_selection() {
        let sel = parse_selection("color: day, size: tip, row: sex, col: time").unwrap();
        assert_eq!(sel.color, Some(CategoricalColumn::Day));
        assert_eq!(sel.size, Some(NumericColumn::Tip));
        assert_eq!(sel.facet_row, Some(CategoricalColumn::Sex));
        assert_eq!(sel.facet_col, Some(CategoricalColumn::Time));
    }

    #[test]
    fn test_parse_any_order_and_whitespace() {
        let sel = parse_selection("  col:smoker ,color :  sex  ").unwrap();
        assert_eq!(sel.color, Some(CategoricalColumn::Sex));
        assert_eq!(sel.facet_col, Some(CategoricalColumn::Smoker));
        assert_eq!(sel.size, None);
    }

    #[test]
    fn test_parse_empty_is_all_none() {
        assert!(parse_selection("").unwrap().is_empty());
        assert!(parse_selection("color: none, size: None").unwrap().is_empty());
    }

    #[test]
    fn test_parse_long_key_forms() {
        let sel = parse_selection("facet_row: day, facet_col: time,").unwrap();
        assert_eq!(sel.facet_row, Some(CategoricalColumn::Day));
        assert_eq!(sel.facet_col, Some(CategoricalColumn::Time));
    }

    #[test]
    fn test_parse_duplicate_key() {
        let err = parse_selection("color: day, color: sex").unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_parse_unknown_key() {
        let err = parse_selection("shape: day").unwrap_err();
        assert!(err.to_string().contains("unknown selection key"));
    }

    #[test]
    fn test_parse_wrong_column_kind() {
        assert!(parse_selection("size: day").is_err());
        assert!(parse_selection("color: tip").is_err());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_selection("color day").is_err());
        assert!(parse_selection("color: day size: tip").is_err());
    }
}
