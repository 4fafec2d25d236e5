// ============================================================
// TABLE PREPARATION CONFIGURATION
// ============================================================
// Which source columns to show, how to name them, and how the
// qualification flag is derived

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One source column to keep, with the name it is displayed under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub source: String,
    pub display: String,
}

impl ColumnRename {
    pub fn new(source: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            display: display.into(),
        }
    }
}

/// Configuration for turning a source table into the review grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePreparationConfig {
    /// Source columns to keep, in display order (default: customer_id -> Customer ID)
    pub columns: Vec<ColumnRename>,

    /// Numeric column compared against the threshold (default: RFM_score)
    pub score_column: String,

    /// Minimum score for a customer to count as valuable, inclusive (default: 15)
    pub threshold: f64,

    /// Name of the derived Yes/No column (default: Valuable customer)
    pub derived_column: String,

    /// Empty columns appended for the reviewer to fill (default: opinion)
    pub user_columns: Vec<String>,

    /// User column restricted to the fixed opinion choices (default: opinion)
    pub opinion_column: String,
}

impl Default for TablePreparationConfig {
    fn default() -> Self {
        Self {
            columns: vec![ColumnRename::new("customer_id", "Customer ID")],
            score_column: "RFM_score".to_string(),
            threshold: 15.0,
            derived_column: "Valuable customer".to_string(),
            user_columns: vec!["opinion".to_string()],
            opinion_column: "opinion".to_string(),
        }
    }
}

impl TablePreparationConfig {
    /// Display names of every prepared column, in order
    pub fn output_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|c| c.display.as_str())
            .chain(std::iter::once(self.derived_column.as_str()))
            .chain(self.user_columns.iter().map(String::as_str))
            .collect()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.columns.is_empty() {
            return Err("at least one source column must be kept".to_string());
        }
        if self.score_column.trim().is_empty() {
            return Err("score_column must not be empty".to_string());
        }
        if !self.threshold.is_finite() {
            return Err("threshold must be a finite number".to_string());
        }
        if self.derived_column.trim().is_empty() {
            return Err("derived_column must not be empty".to_string());
        }
        if !self.user_columns.iter().any(|c| c == &self.opinion_column) {
            return Err(format!(
                "opinion_column '{}' must be one of user_columns",
                self.opinion_column
            ));
        }

        let mut seen = HashSet::new();
        for name in self.output_columns() {
            if name.trim().is_empty() {
                return Err("column names must not be empty".to_string());
            }
            if !seen.insert(name) {
                return Err(format!("duplicate display column '{}'", name));
            }
        }
        Ok(())
    }
}
