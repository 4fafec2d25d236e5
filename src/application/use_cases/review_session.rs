use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};
use uuid::Uuid;

use crate::application::use_cases::submission::{SubmissionHandler, SUCCESS_MESSAGE};
use crate::domain::error::{AppError, Result};
use crate::domain::review_session::{
    ReviewSession, SessionLimits, SessionPhase, StatusMessage,
};
use crate::domain::table::PreparedTable;

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub session: ReviewSession,
    pub file_name: String,
    pub path: PathBuf,
}

/// Per-session review state. The prepared table is computed once at
/// startup; each session edits its own copy. Idle sessions are dropped
/// when new ones are created.
pub struct ReviewSessionUseCase {
    template: Arc<PreparedTable>,
    submissions: SubmissionHandler,
    limits: SessionLimits,
    sessions: Mutex<HashMap<String, ReviewSession>>,
}

impl ReviewSessionUseCase {
    pub fn new(
        template: PreparedTable,
        submissions: SubmissionHandler,
        limits: SessionLimits,
    ) -> Self {
        Self {
            template: Arc::new(template),
            submissions,
            limits,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn create_session(&self) -> ReviewSession {
        self.create_session_at(now_millis())
    }

    fn create_session_at(&self, now: i64) -> ReviewSession {
        let id = Uuid::new_v4().to_string();
        let session = ReviewSession::new(id.clone(), (*self.template).clone(), now);

        let mut sessions = self.lock();
        self.evict(&mut sessions, now);
        sessions.insert(id.clone(), session.clone());
        info!(
            session_id = %id,
            rows = session.table.rows.len(),
            active = sessions.len(),
            "Review session started"
        );
        session
    }

    pub fn get_session(&self, session_id: &str) -> Result<ReviewSession> {
        self.lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| session_not_found(session_id))
    }

    pub fn session_count(&self) -> usize {
        self.lock().len()
    }

    /// Store the name input as typed; normalization happens on submit.
    pub fn set_reviewer_name(&self, session_id: &str, name: String) -> Result<ReviewSession> {
        self.update(session_id, |session| {
            session.reviewer_name = name;
            Ok(())
        })
    }

    pub fn edit_cell(
        &self,
        session_id: &str,
        row: usize,
        column: &str,
        value: &str,
    ) -> Result<ReviewSession> {
        self.update(session_id, |session| {
            session.table.set_cell(row, column, value).map_err(|e| {
                warn!(
                    session_id = %session.id,
                    row,
                    column,
                    error = %e,
                    "Rejected cell edit"
                );
                e
            })
        })
    }

    /// Write the session's current grid. The session stays editable
    /// afterwards so the reviewer can submit again.
    pub fn submit(&self, session_id: &str) -> Result<SubmitOutcome> {
        let mut sessions = self.lock();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        session.touch(now_millis());

        match self.submissions.submit(&session.reviewer_name, &session.table) {
            Ok(receipt) => {
                session.phase = SessionPhase::SubmittedValid {
                    file_name: receipt.file_name.clone(),
                };
                session.message = Some(StatusMessage::success(SUCCESS_MESSAGE));
                session.submission_count += 1;
                Ok(SubmitOutcome {
                    session: session.clone(),
                    file_name: receipt.file_name,
                    path: receipt.path,
                })
            }
            Err(err) => {
                session.phase = match err {
                    AppError::EmptyIdentity(_) => SessionPhase::SubmittedInvalid,
                    _ => SessionPhase::Initial,
                };
                session.message = Some(StatusMessage::error(err.message()));
                Err(err)
            }
        }
    }

    pub fn end_session(&self, session_id: &str) -> Result<()> {
        self.lock()
            .remove(session_id)
            .map(|_| info!(session_id = %session_id, "Review session ended"))
            .ok_or_else(|| session_not_found(session_id))
    }

    /// Expired sessions go first; if the store is still full the least
    /// recently touched ones follow, leaving room for one more.
    fn evict(&self, sessions: &mut HashMap<String, ReviewSession>, now: i64) {
        let before = sessions.len();
        sessions.retain(|_, session| !self.limits.is_expired(session, now));

        let capacity = self.limits.max_sessions.saturating_sub(1);
        while sessions.len() > capacity {
            let oldest = sessions
                .values()
                .min_by_key(|session| session.updated_at)
                .map(|session| session.id.clone());
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, active = sessions.len(), "Evicted idle review sessions");
        }
    }

    fn update<F>(&self, session_id: &str, apply: F) -> Result<ReviewSession>
    where
        F: FnOnce(&mut ReviewSession) -> Result<()>,
    {
        let mut sessions = self.lock();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| session_not_found(session_id))?;
        apply(session)?;
        session.touch(now_millis());
        Ok(session.clone())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ReviewSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn session_not_found(session_id: &str) -> AppError {
    AppError::NotFound(format!("Review session '{}' not found", session_id))
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::{ColumnKind, ColumnSpec, DisplayRow};
    use std::fs;
    use std::path::PathBuf;

    fn template() -> PreparedTable {
        PreparedTable::new(
            vec![
                ColumnSpec { name: "Customer ID".into(), kind: ColumnKind::Source },
                ColumnSpec { name: "Valuable customer".into(), kind: ColumnKind::Derived },
                ColumnSpec { name: "opinion".into(), kind: ColumnKind::Opinion },
            ],
            vec![
                DisplayRow { index: 0, cells: vec!["C1".into(), "Yes".into(), "".into()] },
                DisplayRow { index: 1, cells: vec!["C2".into(), "No".into(), "".into()] },
            ],
        )
    }

    fn use_case() -> (ReviewSessionUseCase, PathBuf) {
        let dir = std::env::temp_dir().join(format!("rfm_sessions_{}", Uuid::new_v4()));
        (
            ReviewSessionUseCase::new(
                template(),
                SubmissionHandler::new(dir.clone()),
                SessionLimits::default(),
            ),
            dir,
        )
    }

    fn limited(idle_timeout_minutes: u64, max_sessions: usize) -> ReviewSessionUseCase {
        let dir = std::env::temp_dir().join(format!("rfm_sessions_{}", Uuid::new_v4()));
        ReviewSessionUseCase::new(
            template(),
            SubmissionHandler::new(dir),
            SessionLimits { idle_timeout_minutes, max_sessions },
        )
    }

    #[test]
    fn sessions_are_isolated() {
        let (use_case, _) = use_case();
        let a = use_case.create_session();
        let b = use_case.create_session();

        use_case.edit_cell(&a.id, 0, "opinion", "agree").unwrap();

        assert_eq!(
            use_case.get_session(&a.id).unwrap().table.cell(0, "opinion"),
            Some("👍 Agree")
        );
        assert_eq!(
            use_case.get_session(&b.id).unwrap().table.cell(0, "opinion"),
            Some("")
        );
    }

    #[test]
    fn new_session_starts_initial_with_empty_user_columns() {
        let (use_case, _) = use_case();
        let session = use_case.create_session();
        assert_eq!(session.phase, SessionPhase::Initial);
        assert!(session.table.rows.iter().all(|r| r.cells[2].is_empty()));
        assert!(!session.name_input.disabled);
    }

    #[test]
    fn submit_without_name_is_invalid_and_writes_nothing() {
        let (use_case, dir) = use_case();
        let session = use_case.create_session();

        let err = use_case.submit(&session.id).unwrap_err();
        assert_eq!(err.kind(), "empty_identity");

        let session = use_case.get_session(&session.id).unwrap();
        assert_eq!(session.phase, SessionPhase::SubmittedInvalid);
        assert_eq!(
            session.message.unwrap().text,
            "Please enter your name before submitting."
        );
        assert!(!dir.exists());
    }

    #[test]
    fn submit_with_name_writes_current_grid_and_stays_editable() {
        let (use_case, dir) = use_case();
        let session = use_case.create_session();
        use_case.set_reviewer_name(&session.id, "Ana".into()).unwrap();
        use_case.edit_cell(&session.id, 1, "opinion", "not_sure").unwrap();

        let outcome = use_case.submit(&session.id).unwrap();
        assert!(matches!(
            outcome.session.phase,
            SessionPhase::SubmittedValid { ref file_name } if file_name == &outcome.file_name
        ));
        assert_eq!(outcome.session.message.unwrap().text, "Submission successful.");

        let written = fs::read_to_string(dir.join(&outcome.file_name)).unwrap();
        assert!(written.contains("1,C2,No,🤷 Not sure"));

        use_case.edit_cell(&session.id, 0, "opinion", "agree").unwrap();
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn rejected_edit_keeps_state() {
        let (use_case, _) = use_case();
        let session = use_case.create_session();
        assert!(use_case
            .edit_cell(&session.id, 0, "Valuable customer", "No")
            .is_err());
        assert_eq!(
            use_case
                .get_session(&session.id)
                .unwrap()
                .table
                .cell(0, "Valuable customer"),
            Some("Yes")
        );
    }

    #[test]
    fn unknown_and_ended_sessions_are_not_found() {
        let (use_case, _) = use_case();
        assert_eq!(use_case.get_session("nope").unwrap_err().kind(), "not_found");

        let session = use_case.create_session();
        use_case.end_session(&session.id).unwrap();
        assert_eq!(use_case.session_count(), 0);
        assert_eq!(use_case.submit(&session.id).unwrap_err().kind(), "not_found");
    }

    #[test]
    fn idle_sessions_are_evicted_on_create() {
        let use_case = limited(1, 100);
        let stale = use_case.create_session_at(1_000);
        let active = use_case.create_session_at(30_000);

        let fresh = use_case.create_session_at(61_001 + 1_000);

        assert_eq!(use_case.get_session(&stale.id).unwrap_err().kind(), "not_found");
        assert!(use_case.get_session(&active.id).is_ok());
        assert!(use_case.get_session(&fresh.id).is_ok());
        assert_eq!(use_case.session_count(), 2);
    }

    #[test]
    fn touching_a_session_keeps_it_alive() {
        let use_case = limited(1, 100);
        let session = use_case.create_session_at(0);
        use_case.lock().get_mut(&session.id).unwrap().touch(50_000);

        use_case.create_session_at(100_000);
        assert!(use_case.get_session(&session.id).is_ok());

        use_case.create_session_at(110_001);
        assert!(use_case.get_session(&session.id).is_err());
        assert_eq!(use_case.session_count(), 2);
    }

    #[test]
    fn store_is_capped_by_dropping_least_recent() {
        let use_case = limited(480, 2);
        let first = use_case.create_session_at(1);
        let second = use_case.create_session_at(2);
        let third = use_case.create_session_at(3);

        assert_eq!(use_case.session_count(), 2);
        assert!(use_case.get_session(&first.id).is_err());
        assert!(use_case.get_session(&second.id).is_ok());
        assert!(use_case.get_session(&third.id).is_ok());
    }
}
