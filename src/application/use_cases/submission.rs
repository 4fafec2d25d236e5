use std::path::PathBuf;

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, info};

use crate::domain::error::{AppError, Result};
use crate::domain::submission::{Submission, MAX_REVIEWER_BYTES};
use crate::domain::table::PreparedTable;
use crate::infrastructure::csv::CsvWriter;
use crate::infrastructure::storage::write_new_file;

pub const EMPTY_IDENTITY_MESSAGE: &str = "Please enter your name before submitting.";
pub const SUCCESS_MESSAGE: &str = "Submission successful.";

static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N} _.\-]").unwrap());

/// Trim the name and replace anything that could escape the output
/// directory or break a file name. Long names are cut on a character
/// boundary so the file name stays within the file system limit.
/// Returns `None` when nothing is left.
pub fn normalize_identity(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut safe = UNSAFE_NAME_CHARS.replace_all(trimmed, "_").into_owned();
    if safe.len() > MAX_REVIEWER_BYTES {
        let cut = safe
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= MAX_REVIEWER_BYTES)
            .last()
            .unwrap_or(0);
        safe.truncate(cut);
        safe.truncate(safe.trim_end().len());
    }
    Some(safe)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub file_name: String,
    pub path: PathBuf,
}

pub struct SubmissionHandler {
    output_dir: PathBuf,
    writer: CsvWriter,
}

impl SubmissionHandler {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            writer: CsvWriter::new(),
        }
    }

    pub fn submit(&self, identity: &str, table: &PreparedTable) -> Result<SubmissionReceipt> {
        self.submit_at(identity, table, Local::now())
    }

    /// Write one new file for this reviewer. Nothing is written when
    /// the identity is empty.
    pub fn submit_at(
        &self,
        identity: &str,
        table: &PreparedTable,
        at: DateTime<Local>,
    ) -> Result<SubmissionReceipt> {
        let reviewer = normalize_identity(identity)
            .ok_or_else(|| AppError::EmptyIdentity(EMPTY_IDENTITY_MESSAGE.to_string()))?;

        let submission = Submission::new(reviewer, at, table.clone());
        let file_name = submission.file_name();

        let path = write_new_file(&self.output_dir, &file_name, |sink| {
            self.writer.write_table(&submission.table, sink)
        })
        .map_err(|e| {
            error!(
                error = %e,
                reviewer = %submission.reviewer,
                output_dir = %self.output_dir.display(),
                "Failed to write submission"
            );
            e
        })?;

        info!(
            reviewer = %submission.reviewer,
            path = %path.display(),
            rows = submission.table.rows.len(),
            "Submission written"
        );

        Ok(SubmissionReceipt { file_name, path })
    }
}
