// ============================================================
// CSV PARSER
// ============================================================
// Read the source table with encoding detection and error handling

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::{UTF_8, WINDOWS_1252};
use tracing::{debug, warn};

use crate::domain::error::AppError;
use crate::domain::table::SourceTable;

/// Comma separated, values kept verbatim
#[derive(Debug, Default)]
pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a CSV file into a source table
    pub fn parse_file(&self, path: &Path) -> Result<SourceTable, AppError> {
        let content = self.read_with_encoding_detection(path)?;
        let table = self.parse_content(&content)?;
        debug!(
            path = %path.display(),
            columns = table.headers.len(),
            rows = table.len(),
            "Parsed source CSV"
        );
        Ok(table)
    }

    /// Parse CSV content from string
    pub fn parse_content(&self, content: &str) -> Result<SourceTable, AppError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true) // short rows are padded below
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(AppError::ParseError("CSV has no header row".to_string()));
        }

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;

            if record.len() > headers.len() {
                return Err(AppError::ParseError(format!(
                    "CSV row {} has {} fields but the header has {}",
                    index + 1,
                    record.len(),
                    headers.len()
                )));
            }

            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            cells.resize(headers.len(), String::new());
            records.push(cells);
        }

        Ok(SourceTable::new(headers, records))
    }

    /// Read file bytes, decoding as UTF-8 with a Windows-1252 fallback
    fn read_with_encoding_detection(&self, path: &Path) -> Result<String, AppError> {
        let buffer = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                AppError::NotFound(format!("Source CSV '{}' does not exist", path.display()))
            }
            _ => AppError::IoError(format!(
                "Failed to read source CSV '{}': {}",
                path.display(),
                e
            )),
        })?;

        // decode_without_bom_handling would keep the BOM in the first header
        let (content, _, had_errors) = UTF_8.decode(&buffer);
        if !had_errors {
            return Ok(content.into_owned());
        }

        warn!(
            path = %path.display(),
            "Source CSV is not valid UTF-8, decoding as Windows-1252"
        );
        let (content, _, _) = WINDOWS_1252.decode(&buffer);
        Ok(content.into_owned())
    }
}
