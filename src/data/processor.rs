//! Data Processor Module
//! Column selection and numeric filtering of a loaded DataFrame.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Please select at least one column")]
    Empty,
    #[error("Column '{0}' does not exist")]
    UnknownColumn(String),
    #[error("No numeric columns available for visualization after selection")]
    NoNumeric,
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Handles column projection and numeric filtering.
pub struct DataProcessor;

impl DataProcessor {
    /// Project the frame onto `names`, keeping every row.
    ///
    /// Repeated names collapse to their first occurrence, which also fixes
    /// the output column order.
    pub fn select(df: &DataFrame, names: &[String]) -> Result<DataFrame, SelectionError> {
        if names.is_empty() {
            return Err(SelectionError::Empty);
        }

        let mut unique: Vec<&str> = Vec::with_capacity(names.len());
        for name in names {
            if df.column(name).is_err() {
                return Err(SelectionError::UnknownColumn(name.clone()));
            }
            if !unique.contains(&name.as_str()) {
                unique.push(name);
            }
        }

        log::debug!("Selected {} of {} columns", unique.len(), df.width());
        Ok(df.select(unique)?)
    }

    /// Names of columns whose dtype is an integer or float, in frame order.
    pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| Self::is_numeric(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Like [`numeric_columns`](Self::numeric_columns), but an empty result
    /// is an error.
    pub fn require_numeric(df: &DataFrame) -> Result<Vec<String>, SelectionError> {
        let numeric = Self::numeric_columns(df);
        if numeric.is_empty() {
            return Err(SelectionError::NoNumeric);
        }
        Ok(numeric)
    }

    pub fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Column values as f64, one entry per row. Missing, NaN and infinite
    /// values are `None`.
    pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, PolarsError> {
        let column = df.column(name)?;
        let values_f64 = column.cast(&DataType::Float64)?;
        let values_ca = values_f64.f64()?;

        Ok(values_ca
            .into_iter()
            .map(|v| v.filter(|v| v.is_finite()))
            .collect())
    }

    /// First `n` rows rendered as strings for the preview grid.
    pub fn preview_rows(df: &DataFrame, n: usize) -> Vec<Vec<String>> {
        let head = df.head(Some(n));
        (0..head.height())
            .map(|row| {
                head.get_columns()
                    .iter()
                    .map(|col| {
                        col.get(row)
                            .map(|v| {
                                if v.is_null() {
                                    String::new()
                                } else {
                                    v.to_string().trim_matches('"').to_string()
                                }
                            })
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "a" => [1i64, 2, 3, 4],
            "b" => [0.5f64, 1.5, 2.5, 3.5],
            "label" => ["w", "x", "y", "z"]
        )
        .unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_projects_columns() {
        let df = sample();
        let selected = DataProcessor::select(&df, &names(&["label", "a"])).unwrap();
        assert_eq!(selected.width(), 2);
        assert_eq!(selected.height(), df.height());
        let cols: Vec<String> = selected
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(cols, vec!["label", "a"]);
    }

    #[test]
    fn test_select_every_subset_keeps_rows() {
        let df = sample();
        let all = names(&["a", "b", "label"]);
        for mask in 1u8..8 {
            let subset: Vec<String> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, n)| n.clone())
                .collect();
            let selected = DataProcessor::select(&df, &subset).unwrap();
            assert_eq!(selected.width(), subset.len());
            assert_eq!(selected.height(), 4);
        }
    }

    #[test]
    fn test_select_empty_fails() {
        assert!(matches!(
            DataProcessor::select(&sample(), &[]),
            Err(SelectionError::Empty)
        ));
    }

    #[test]
    fn test_select_unknown_fails() {
        let err = DataProcessor::select(&sample(), &names(&["a", "missing"])).unwrap_err();
        assert!(matches!(err, SelectionError::UnknownColumn(ref n) if n == "missing"));
    }

    #[test]
    fn test_select_collapses_duplicates() {
        let selected = DataProcessor::select(&sample(), &names(&["a", "a", "b"])).unwrap();
        assert_eq!(selected.width(), 2);
    }

    #[test]
    fn test_numeric_columns() {
        assert_eq!(DataProcessor::numeric_columns(&sample()), names(&["a", "b"]));
    }

    #[test]
    fn test_numeric_columns_idempotent() {
        let df = sample();
        let first = DataProcessor::numeric_columns(&df);
        let reselected = DataProcessor::select(&df, &first).unwrap();
        assert_eq!(DataProcessor::numeric_columns(&reselected), first);
    }

    #[test]
    fn test_no_numeric_is_terminal() {
        let df = DataProcessor::select(&sample(), &names(&["label"])).unwrap();
        assert!(DataProcessor::numeric_columns(&df).is_empty());
        assert!(matches!(
            DataProcessor::require_numeric(&df),
            Err(SelectionError::NoNumeric)
        ));
    }

    #[test]
    fn test_column_values_marks_missing() {
        let df = df!("v" => [Some(1.0f64), None, Some(f64::NAN), Some(4.0)]).unwrap();
        let values = DataProcessor::column_values(&df, "v").unwrap();
        assert_eq!(values, vec![Some(1.0), None, None, Some(4.0)]);
    }

    #[test]
    fn test_column_values_drops_infinities() {
        let df = df!("v" => [1.0f64, f64::INFINITY, 2.0, f64::NEG_INFINITY]).unwrap();
        let values = DataProcessor::column_values(&df, "v").unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(2.0), None]);
    }

    #[test]
    fn test_preview_rows() {
        let rows = DataProcessor::preview_rows(&sample(), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["1", "0.5", "w"]);
    }
}
