//! The basic ordered-value container: a named column of uniform mode.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{escape_literal, fmt_number};

/// Errors from positional column edits.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ColumnError {
    /// The offered value does not match the column's mode.
    #[error("column '{column}' holds {mode} values, not {offered}")]
    #[diagnostic(code(statchain::graph::column_mode))]
    ModeMismatch {
        column: String,
        mode: &'static str,
        offered: &'static str,
    },

    /// The index is past the end of the column.
    #[error("index {index} out of bounds for column '{column}' of length {len}")]
    #[diagnostic(code(statchain::graph::column_bounds))]
    OutOfBounds {
        column: String,
        index: usize,
        len: usize,
    },
}

/// Which value mode a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMode {
    Numeric,
    Text,
}

/// One cell, carried across the mode boundary by positional accessors.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    fn label(&self) -> &'static str {
        match self {
            CellValue::Number(_) => "numeric",
            CellValue::Text(_) => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ColumnValues {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

/// An ordered sequence of values of uniform mode.
///
/// Columns are owned exclusively by the table or node that produced them;
/// they are cloned, never shared, when they cross node boundaries.
/// Equality is structural: mode plus ordered values plus name.
///
/// ```
/// use statchain::Column;
/// use statchain::graph::CellValue;
///
/// let mut col = Column::numeric("speed", vec![88.0, 101.5]);
/// col.push(CellValue::Number(94.2)).unwrap();
/// assert_eq!(col.len(), 3);
/// assert_eq!(col.get(2), Some(CellValue::Number(94.2)));
/// assert!(col.push(CellValue::Text("fast".into())).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    /// A column of numbers.
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values),
        }
    }

    /// A column of strings.
    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Text(values),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn mode(&self) -> ColumnMode {
        match self.values {
            ColumnValues::Numeric(_) => ColumnMode::Numeric,
            ColumnValues::Text(_) => ColumnMode::Text,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.mode() == ColumnMode::Numeric
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The numeric values, if this is a numeric column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Text(_) => None,
        }
    }

    /// The text values, if this is a text column.
    pub fn as_text(&self) -> Option<&[String]> {
        match &self.values {
            ColumnValues::Numeric(_) => None,
            ColumnValues::Text(v) => Some(v),
        }
    }

    pub fn get(&self, index: usize) -> Option<CellValue> {
        match &self.values {
            ColumnValues::Numeric(v) => v.get(index).map(|n| CellValue::Number(*n)),
            ColumnValues::Text(v) => v.get(index).map(|s| CellValue::Text(s.clone())),
        }
    }

    /// Replace the value at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: CellValue) -> Result<CellValue, ColumnError> {
        let Column { name, values } = self;
        match values {
            ColumnValues::Numeric(v) => {
                let len = v.len();
                match value {
                    CellValue::Number(n) => {
                        let slot = v
                            .get_mut(index)
                            .ok_or_else(|| out_of_bounds(name, index, len))?;
                        Ok(CellValue::Number(std::mem::replace(slot, n)))
                    }
                    offered => Err(mode_mismatch(name, "numeric", &offered)),
                }
            }
            ColumnValues::Text(v) => {
                let len = v.len();
                match value {
                    CellValue::Text(s) => {
                        let slot = v
                            .get_mut(index)
                            .ok_or_else(|| out_of_bounds(name, index, len))?;
                        Ok(CellValue::Text(std::mem::replace(slot, s)))
                    }
                    offered => Err(mode_mismatch(name, "text", &offered)),
                }
            }
        }
    }

    /// Insert a value at `index`, shifting later values down.
    pub fn insert(&mut self, index: usize, value: CellValue) -> Result<(), ColumnError> {
        let Column { name, values } = self;
        match values {
            ColumnValues::Numeric(v) => match value {
                CellValue::Number(n) if index <= v.len() => {
                    v.insert(index, n);
                    Ok(())
                }
                CellValue::Number(_) => Err(out_of_bounds(name, index, v.len())),
                offered => Err(mode_mismatch(name, "numeric", &offered)),
            },
            ColumnValues::Text(v) => match value {
                CellValue::Text(s) if index <= v.len() => {
                    v.insert(index, s);
                    Ok(())
                }
                CellValue::Text(_) => Err(out_of_bounds(name, index, v.len())),
                offered => Err(mode_mismatch(name, "text", &offered)),
            },
        }
    }

    /// Append a value.
    pub fn push(&mut self, value: CellValue) -> Result<(), ColumnError> {
        let at = self.len();
        self.insert(at, value)
    }

    /// Remove and return the value at `index`.
    pub fn remove(&mut self, index: usize) -> Result<CellValue, ColumnError> {
        let Column { name, values } = self;
        match values {
            ColumnValues::Numeric(v) => {
                if index >= v.len() {
                    return Err(out_of_bounds(name, index, v.len()));
                }
                Ok(CellValue::Number(v.remove(index)))
            }
            ColumnValues::Text(v) => {
                if index >= v.len() {
                    return Err(out_of_bounds(name, index, v.len()));
                }
                Ok(CellValue::Text(v.remove(index)))
            }
        }
    }

    /// Iterate the values in order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = CellValue> + '_> {
        match &self.values {
            ColumnValues::Numeric(v) => Box::new(v.iter().map(|n| CellValue::Number(*n))),
            ColumnValues::Text(v) => Box::new(v.iter().cloned().map(CellValue::Text)),
        }
    }

    /// Render the column as an engine vector literal, `c(…)`.
    pub fn engine_literal(&self) -> String {
        let body = match &self.values {
            ColumnValues::Numeric(v) => v
                .iter()
                .map(|n| fmt_number(*n))
                .collect::<Vec<_>>()
                .join(", "),
            ColumnValues::Text(v) => v
                .iter()
                .map(|s| format!("\"{}\"", escape_literal(s)))
                .collect::<Vec<_>>()
                .join(", "),
        };
        format!("c({body})")
    }
}

fn out_of_bounds(name: &str, index: usize, len: usize) -> ColumnError {
    ColumnError::OutOfBounds {
        column: name.to_string(),
        index,
        len,
    }
}

fn mode_mismatch(name: &str, mode: &'static str, offered: &CellValue) -> ColumnError {
    ColumnError::ModeMismatch {
        column: name.to_string(),
        mode,
        offered: offered.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_edits_respect_mode() {
        let mut col = Column::numeric("n", vec![1.0, 2.0]);
        assert_eq!(
            col.set(0, CellValue::Number(5.0)).unwrap(),
            CellValue::Number(1.0)
        );
        assert!(matches!(
            col.set(1, CellValue::Text("x".into())),
            Err(ColumnError::ModeMismatch { .. })
        ));
        assert!(matches!(
            col.set(9, CellValue::Number(0.0)),
            Err(ColumnError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn insert_and_remove_shift_values() {
        let mut col = Column::text("t", vec!["a".into(), "c".into()]);
        col.insert(1, CellValue::Text("b".into())).unwrap();
        assert_eq!(col.as_text().unwrap(), ["a", "b", "c"]);
        assert_eq!(col.remove(0).unwrap(), CellValue::Text("a".into()));
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn engine_literal_quotes_text() {
        let col = Column::text("t", vec!["a".into(), "b \"c\"".into()]);
        assert_eq!(col.engine_literal(), r#"c("a", "b \"c\"")"#);

        let col = Column::numeric("n", vec![1.0, 2.5]);
        assert_eq!(col.engine_literal(), "c(1, 2.5)");
    }

    #[test]
    fn equality_is_structural() {
        let a = Column::numeric("x", vec![1.0]);
        let b = Column::numeric("x", vec![1.0]);
        let c = Column::text("x", vec!["1".into()]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
