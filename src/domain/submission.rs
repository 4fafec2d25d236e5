use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::table::PreparedTable;

/// Timestamp layout used in output file names. No characters that are
/// illegal in file names on common platforms.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.6f";
/// Rendered length of `FILE_TIMESTAMP_FORMAT`.
pub const FILE_TIMESTAMP_BYTES: usize = 26;

/// Common file system limit for a single path component, in bytes.
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Longest reviewer part that still fits `<reviewer>_<timestamp>.csv`
/// into `MAX_FILE_NAME_BYTES`.
pub const MAX_REVIEWER_BYTES: usize =
    MAX_FILE_NAME_BYTES - "_".len() - FILE_TIMESTAMP_BYTES - ".csv".len();

/// A reviewer's edited grid, ready to be written once.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub reviewer: String,
    pub submitted_at: DateTime<Local>,
    pub table: PreparedTable,
}

impl Submission {
    pub fn new(reviewer: String, submitted_at: DateTime<Local>, table: PreparedTable) -> Self {
        Self {
            reviewer,
            submitted_at,
            table,
        }
    }

    /// `<reviewer>_<timestamp>.csv`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.csv",
            self.reviewer,
            self.submitted_at.format(FILE_TIMESTAMP_FORMAT)
        )
    }
}
