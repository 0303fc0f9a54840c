//! Cell Coercion Module
//! Explicit string → number conversion for table cells.
//!
//! Every cell is stored as a string regardless of its column's declared type.
//! Charting and statistics go through [`parse_numeric_cell`] so the lossy
//! "unparsable → 0" policy lives in exactly one place ([`numeric_or_zero`]).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CellParseError {
    #[error("empty cell")]
    Empty,
    #[error("not a number: {0:?}")]
    NotANumber(String),
    #[error("not a finite number: {0:?}")]
    NotFinite(String),
}

/// Parse a cell as a finite decimal number.
///
/// Surrounding whitespace is ignored. Empty cells, non-numeric text and
/// non-finite values (`inf`, `NaN`) are failures.
pub fn parse_numeric_cell(raw: &str) -> Result<f64, CellParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CellParseError::Empty);
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| CellParseError::NotANumber(raw.to_string()))?;

    if !value.is_finite() {
        return Err(CellParseError::NotFinite(raw.to_string()));
    }

    Ok(value)
}

/// Lossy coercion used by the chart projector: absent or unparsable → `0.0`.
pub fn numeric_or_zero(raw: Option<&str>) -> f64 {
    raw.and_then(|v| parse_numeric_cell(v).ok()).unwrap_or(0.0)
}

/// Whether a cell counts as numeric for column classification.
pub fn is_numeric_cell(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| parse_numeric_cell(v).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_cell_accepts_decimals() {
        assert_eq!(parse_numeric_cell("42"), Ok(42.0));
        assert_eq!(parse_numeric_cell(" -3.5 "), Ok(-3.5));
        assert_eq!(parse_numeric_cell("1e3"), Ok(1000.0));
    }

    #[test]
    fn test_parse_numeric_cell_rejects_empty_and_text() {
        assert_eq!(parse_numeric_cell(""), Err(CellParseError::Empty));
        assert_eq!(parse_numeric_cell("   "), Err(CellParseError::Empty));
        assert!(matches!(
            parse_numeric_cell("12abc"),
            Err(CellParseError::NotANumber(_))
        ));
    }

    #[test]
    fn test_parse_numeric_cell_rejects_non_finite() {
        assert!(matches!(
            parse_numeric_cell("inf"),
            Err(CellParseError::NotFinite(_))
        ));
        assert!(matches!(
            parse_numeric_cell("NaN"),
            Err(CellParseError::NotFinite(_))
        ));
    }

    #[test]
    fn test_numeric_or_zero_defaults() {
        assert_eq!(numeric_or_zero(Some("7.25")), 7.25);
        assert_eq!(numeric_or_zero(Some("n/a")), 0.0);
        assert_eq!(numeric_or_zero(None), 0.0);
        assert!(!is_numeric_cell(Some("")));
        assert!(is_numeric_cell(Some("0")));
    }
}
