// ============================================================
// PREPARED TABLE
// ============================================================
// The review grid: typed columns plus row cells aligned to them

use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::opinion::Opinion;

pub const QUALIFIED: &str = "Yes";
pub const NOT_QUALIFIED: &str = "No";

/// Derived label for a score. Comparison is inclusive at the threshold.
pub fn qualification_label(score: f64, threshold: f64) -> &'static str {
    if score >= threshold {
        QUALIFIED
    } else {
        NOT_QUALIFIED
    }
}

/// How a column is populated and what the editor may do with it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Projected (and renamed) from the source file
    Source,
    /// Computed from the score; never editable
    Derived,
    /// Reviewer column, free text
    FreeText,
    /// Reviewer column, restricted to `Opinion` labels
    Opinion,
}

impl ColumnKind {
    pub fn is_editable(self) -> bool {
        !matches!(self, ColumnKind::Derived)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// One row of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    /// Position in the source file (0-based); written as the index column
    pub index: usize,

    /// Cell values, aligned with `PreparedTable::columns`
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedTable {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<DisplayRow>,
}

impl PreparedTable {
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<DisplayRow>) -> Self {
        Self { columns, rows }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let position = self.column_position(column)?;
        self.rows
            .get(row)
            .and_then(|r| r.cells.get(position))
            .map(String::as_str)
    }

    /// Apply a reviewer edit. Derived cells are read-only and opinion
    /// cells only take `""` or a valid opinion, stored as its label.
    pub fn set_cell(&mut self, row: usize, column: &str, value: &str) -> Result<()> {
        let position = self.column_position(column).ok_or_else(|| {
            AppError::ValidationError(format!("Unknown column '{}'", column))
        })?;

        let stored = match self.columns[position].kind {
            ColumnKind::Derived => {
                return Err(AppError::ValidationError(format!(
                    "Column '{}' is computed and cannot be edited",
                    column
                )))
            }
            ColumnKind::Opinion if value.is_empty() => String::new(),
            ColumnKind::Opinion => value.parse::<Opinion>()?.label().to_string(),
            ColumnKind::Source | ColumnKind::FreeText => value.to_string(),
        };

        let row_count = self.rows.len();
        let target = self.rows.get_mut(row).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Row {} is out of range (table has {} rows)",
                row, row_count
            ))
        })?;
        target.cells[position] = stored;
        Ok(())
    }
}
