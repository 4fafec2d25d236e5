// ============================================================
// TABLE DOMAIN LAYER
// ============================================================
// Core types for the review grid
// No I/O, no async, no external dependencies

mod preparation_config;
mod prepared_table;
mod source_table;

pub use preparation_config::{ColumnRename, TablePreparationConfig};
pub use prepared_table::{
    qualification_label, ColumnKind, ColumnSpec, DisplayRow, PreparedTable, NOT_QUALIFIED,
    QUALIFIED,
};
pub use source_table::SourceTable;
