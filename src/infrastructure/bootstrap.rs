use std::error::Error;
use std::sync::{Arc, Mutex};

use tracing::error;

use crate::application::{ReviewSessionUseCase, SubmissionHandler, TablePreparer};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::storage::ensure_output_dir;
use crate::interfaces::http::{add_log, LogEntry};

pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<ReviewSessionUseCase>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

/// Prepare the review table once and wire the session store. Any
/// failure here is fatal: the page is never served with a bad table.
pub fn setup(config: AppConfig) -> Result<AppContext, Box<dyn Error>> {
    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));

    let table = TablePreparer::new(config.table.clone())
        .prepare(&config.source_csv)
        .map_err(|err| {
            error!(
                error = %err,
                source_csv = %config.source_csv.display(),
                "Failed to prepare review table"
            );
            err
        })?;
    add_log(
        &logs,
        "INFO",
        "Preparer",
        &format!(
            "Loaded {} rows from {} ({})",
            table.rows.len(),
            config.source_csv.display(),
            table.column_names().join(", ")
        ),
    );

    let output_dir = ensure_output_dir(&config.output_dir).map_err(|err| {
        error!(
            error = %err,
            output_dir = %config.output_dir.display(),
            "Failed to create output dir"
        );
        err
    })?;
    add_log(
        &logs,
        "INFO",
        "Submission",
        &format!("Submissions will be written to {}", output_dir.display()),
    );

    let sessions = ReviewSessionUseCase::new(
        table,
        SubmissionHandler::new(output_dir),
        config.sessions,
    );

    Ok(AppContext {
        config: Arc::new(config),
        sessions: Arc::new(sessions),
        logs,
    })
}
