use serde::{Deserialize, Serialize};

use crate::domain::table::PreparedTable;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LabelVisibility {
    Visible,
    Hidden,
    Collapsed,
}

/// Display state of the reviewer name input, kept for the whole session.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NameInputState {
    pub visibility: LabelVisibility,
    pub disabled: bool,
}

impl Default for NameInputState {
    fn default() -> Self {
        Self {
            visibility: LabelVisibility::Visible,
            disabled: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionPhase {
    Initial,
    SubmittedInvalid,
    SubmittedValid { file_name: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
    pub id: String,
    pub reviewer_name: String,
    pub name_input: NameInputState,
    pub table: PreparedTable,
    pub phase: SessionPhase,
    pub message: Option<StatusMessage>,
    pub submission_count: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ReviewSession {
    pub fn new(id: String, table: PreparedTable, now: i64) -> Self {
        Self {
            id,
            reviewer_name: String::new(),
            name_input: NameInputState::default(),
            table,
            phase: SessionPhase::Initial,
            message: None,
            submission_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, now: i64) {
        self.updated_at = now;
    }
}

/// How long an untouched session is kept, and how many are held at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLimits {
    pub idle_timeout_minutes: u64,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: 480,
            max_sessions: 1000,
        }
    }
}

impl SessionLimits {
    pub fn idle_timeout_millis(&self) -> i64 {
        i64::try_from(self.idle_timeout_minutes.saturating_mul(60_000)).unwrap_or(i64::MAX)
    }

    /// Idle for longer than the timeout, measured from the last touch.
    pub fn is_expired(&self, session: &ReviewSession, now: i64) -> bool {
        now.saturating_sub(session.updated_at) > self.idle_timeout_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expires_after_idle_timeout() {
        let limits = SessionLimits {
            idle_timeout_minutes: 1,
            max_sessions: 10,
        };
        let mut session = ReviewSession::new("s".into(), PreparedTable::new(vec![], vec![]), 0);

        assert!(!limits.is_expired(&session, 60_000));
        assert!(limits.is_expired(&session, 60_001));

        session.touch(30_000);
        assert!(!limits.is_expired(&session, 60_001));
    }
}
