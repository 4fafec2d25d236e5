// ============================================================
// TABLE PREPARER USE CASE
// ============================================================
// Read the source table, derive the qualification flag, project
// and rename columns, append empty reviewer columns

use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::domain::error::AppError;
use crate::domain::table::{
    qualification_label, ColumnKind, ColumnSpec, DisplayRow, PreparedTable, SourceTable,
    TablePreparationConfig, NOT_QUALIFIED, QUALIFIED,
};
use crate::infrastructure::csv::CsvParser;

/// Cell values read as a missing score, the same set common data-frame
/// CSV readers treat as NA by default.
pub const MISSING_SCORE_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub struct TablePreparer {
    config: TablePreparationConfig,
}

impl TablePreparer {
    pub fn new(config: TablePreparationConfig) -> Self {
        Self { config }
    }

    /// Read `csv_path` and build the review grid
    pub fn prepare(&self, csv_path: &Path) -> Result<PreparedTable, AppError> {
        let start = Instant::now();

        self.config.validate().map_err(|e| {
            AppError::ValidationError(format!("Invalid table preparation config: {}", e))
        })?;

        let source = CsvParser::new().parse_file(csv_path)?;
        let table = self.prepare_source(&source)?;

        info!(
            path = %csv_path.display(),
            rows = table.rows.len(),
            qualified = self.count_qualified(&table),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Prepared review table"
        );
        Ok(table)
    }

    /// Build the review grid from an already parsed table
    pub fn prepare_source(&self, source: &SourceTable) -> Result<PreparedTable, AppError> {
        let score_index = source.column_index(&self.config.score_column).ok_or_else(|| {
            AppError::SchemaError(format!(
                "Score column '{}' is missing from the source table",
                self.config.score_column
            ))
        })?;

        let missing: Vec<&str> = self
            .config
            .columns
            .iter()
            .filter(|c| source.column_index(&c.source).is_none())
            .map(|c| c.source.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::SchemaError(format!(
                "Columns missing from the source table: {}",
                missing.join(", ")
            )));
        }

        let kept: Vec<usize> = self
            .config
            .columns
            .iter()
            .filter_map(|c| source.column_index(&c.source))
            .collect();

        let mut rows = Vec::with_capacity(source.len());
        for (index, record) in source.records.iter().enumerate() {
            let label = self.derive_label(index, &record[score_index])?;

            let mut cells: Vec<String> = kept.iter().map(|&i| record[i].clone()).collect();
            cells.push(label.to_string());
            cells.extend(self.config.user_columns.iter().map(|_| String::new()));

            rows.push(DisplayRow { index, cells });
        }

        Ok(PreparedTable::new(self.column_specs(), rows))
    }

    fn column_specs(&self) -> Vec<ColumnSpec> {
        let mut columns: Vec<ColumnSpec> = self
            .config
            .columns
            .iter()
            .map(|c| ColumnSpec {
                name: c.display.clone(),
                kind: ColumnKind::Source,
            })
            .collect();

        columns.push(ColumnSpec {
            name: self.config.derived_column.clone(),
            kind: ColumnKind::Derived,
        });

        columns.extend(self.config.user_columns.iter().map(|name| ColumnSpec {
            name: name.clone(),
            kind: if name == &self.config.opinion_column {
                ColumnKind::Opinion
            } else {
                ColumnKind::FreeText
            },
        }));
        columns
    }

    /// Missing scores never qualify
    fn derive_label(&self, row: usize, raw: &str) -> Result<&'static str, AppError> {
        let raw = raw.trim();
        if MISSING_SCORE_TOKENS.contains(&raw) {
            return Ok(NOT_QUALIFIED);
        }
        let score = raw.parse::<f64>().map_err(|_| {
            AppError::ParseError(format!(
                "Row {}: score '{}' in column '{}' is not numeric",
                row + 1,
                raw,
                self.config.score_column
            ))
        })?;
        if score.is_nan() {
            return Ok(NOT_QUALIFIED);
        }
        Ok(qualification_label(score, self.config.threshold))
    }

    fn count_qualified(&self, table: &PreparedTable) -> usize {
        match table.column_position(&self.config.derived_column) {
            Some(position) => table
                .rows
                .iter()
                .filter(|r| r.cells[position] == QUALIFIED)
                .count(),
            None => 0,
        }
    }
}
