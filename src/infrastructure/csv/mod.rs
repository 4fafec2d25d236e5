// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Reading the source table and writing reviewer submissions

mod csv_parser;
mod csv_writer;

pub use csv_parser::CsvParser;
pub use csv_writer::CsvWriter;
