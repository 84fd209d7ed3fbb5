//! Column kinds and edit-input validation.
//!
//! Every column carries a `ColumnKind`. Input typed into the editor is parsed
//! against it before it touches a row; input that does not fit is rejected
//! with `GridError::InvalidCellValue` and the row stays as it was.
//!
//! Kinds are either configured or inferred from the loaded data:
//! a column whose non-null cells are all numbers is `Number`, all text is
//! `Text`, anything else is `Any`.

use serde::{Deserialize, Serialize};

use crate::cell::CellValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Accepts any input, stored as text
    #[default]
    Any,
    /// Accepts any input, stored as text
    Text,
    /// Accepts finite numbers only (surrounding whitespace ignored)
    Number,
}

impl ColumnKind {
    /// Infer a kind from a column's loaded cells.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let mut saw_number = false;
        let mut saw_text = false;
        for cell in cells {
            match cell {
                CellValue::Null => {}
                CellValue::Number(_) => saw_number = true,
                CellValue::Text(_) => saw_text = true,
                CellValue::Bool(_) => return ColumnKind::Any,
            }
        }
        match (saw_number, saw_text) {
            (true, false) => ColumnKind::Number,
            (false, true) => ColumnKind::Text,
            _ => ColumnKind::Any,
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Any => "any value",
            ColumnKind::Text => "text",
            ColumnKind::Number => "a number",
        }
    }

    /// Parse editor input into a cell value, or `None` if it does not fit.
    pub fn parse_input(&self, input: &str) -> Option<CellValue> {
        match self {
            ColumnKind::Any | ColumnKind::Text => Some(CellValue::text(input)),
            ColumnKind::Number => {
                let n: f64 = input.trim().parse().ok()?;
                if n.is_finite() {
                    Some(CellValue::number(n))
                } else {
                    None
                }
            }
        }
    }
}

/// A column as the widget sees it: a title and the kind its cells must have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub title: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(title: impl Into<String>, kind: ColumnKind) -> Self {
        Self { title: title.into(), kind }
    }
}
