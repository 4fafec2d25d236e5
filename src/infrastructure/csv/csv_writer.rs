// ============================================================
// CSV WRITER
// ============================================================
// Serialize the review grid with its row index as the first column

use std::io::Write;

use csv::WriterBuilder;

use crate::domain::error::AppError;
use crate::domain::table::PreparedTable;

pub struct CsvWriter {
    delimiter: u8,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write header + rows. The index column has an empty header cell.
    pub fn write_table<W: Write>(&self, table: &PreparedTable, sink: W) -> Result<(), AppError> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(sink);

        let header = std::iter::once("").chain(table.columns.iter().map(|c| c.name.as_str()));
        writer
            .write_record(header)
            .map_err(|e| AppError::IoError(format!("Failed to write CSV header: {}", e)))?;

        for row in &table.rows {
            let index = row.index.to_string();
            let record = std::iter::once(index.as_str()).chain(row.cells.iter().map(String::as_str));
            writer.write_record(record).map_err(|e| {
                AppError::IoError(format!("Failed to write CSV row {}: {}", row.index, e))
            })?;
        }

        writer
            .flush()
            .map_err(|e| AppError::IoError(format!("Failed to flush CSV output: {}", e)))?;
        Ok(())
    }
}
