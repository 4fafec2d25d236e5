use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::opinion::Opinion;
use crate::domain::review_session::{NameInputState, ReviewSession, SessionPhase, StatusMessage};
use crate::domain::table::ColumnKind;
use crate::infrastructure::config::AppConfig;

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewerNameRequest {
    #[validate(length(max = 200, message = "Name is too long"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CellEditRequest {
    pub row: usize,
    #[validate(length(min = 1, message = "Column is required"))]
    pub column: String,
    #[validate(length(max = 2000, message = "Value is too long"))]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct OptionView {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView {
    pub name: String,
    pub label: String,
    pub kind: ColumnKind,
    pub editable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RowView {
    pub index: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub hide_index: bool,
    pub full_width: bool,
    pub height_px: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub title: String,
    pub name_label: String,
    pub reviewer_name: String,
    pub name_input: NameInputState,
    pub editor: EditorView,
    pub columns: Vec<ColumnView>,
    pub rows: Vec<RowView>,
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<StatusMessage>,
    pub submission_count: u32,
}

impl SessionView {
    pub fn from_session(session: ReviewSession, config: &AppConfig) -> Self {
        let editor = &config.editor;
        let columns = session
            .table
            .columns
            .iter()
            .map(|column| match column.kind {
                ColumnKind::Opinion => ColumnView {
                    name: column.name.clone(),
                    label: editor.opinion_label.clone(),
                    kind: column.kind,
                    editable: true,
                    options: Some(
                        Opinion::ALL
                            .iter()
                            .map(|o| OptionView {
                                value: o.key(),
                                label: o.label(),
                            })
                            .collect(),
                    ),
                    help: Some(editor.opinion_help.clone()),
                    width: Some(editor.opinion_width.clone()),
                },
                kind => ColumnView {
                    name: column.name.clone(),
                    label: column.name.clone(),
                    kind,
                    editable: kind.is_editable(),
                    options: None,
                    help: None,
                    width: None,
                },
            })
            .collect();

        Self {
            id: session.id,
            title: config.page_title.clone(),
            name_label: config.name_label.clone(),
            reviewer_name: session.reviewer_name,
            name_input: session.name_input,
            editor: EditorView {
                hide_index: editor.hide_index,
                full_width: editor.full_width,
                height_px: editor.height_px,
            },
            columns,
            rows: session
                .table
                .rows
                .into_iter()
                .map(|r| RowView {
                    index: r.index,
                    cells: r.cells,
                })
                .collect(),
            phase: session.phase,
            message: session.message,
            submission_count: session.submission_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub message: String,
    pub file_name: String,
    pub session: SessionView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
