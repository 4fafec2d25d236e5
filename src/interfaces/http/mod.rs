pub mod dto;
mod error;
pub mod page;

use actix_cors::Cors;
use actix_web::{
    delete, dev::Server, get, patch, post, put, web, App, HttpResponse, HttpServer, Responder,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use validator::Validate;

use crate::application::ReviewSessionUseCase;
use crate::domain::error::AppError;
use crate::infrastructure::config::AppConfig;
use dto::{CellEditRequest, ReviewerNameRequest, SessionView, SubmitResponse};
use error::validation_error;

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<ReviewSessionUseCase>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl HttpState {
    fn view(&self, session: crate::domain::review_session::ReviewSession) -> SessionView {
        SessionView::from_session(session, &self.config)
    }

    fn fail(&self, source: &str, context: &str, err: AppError) -> HttpResponse {
        let level = match err {
            AppError::NotFound(_) | AppError::EmptyIdentity(_) | AppError::ValidationError(_) => {
                "WARN"
            }
            _ => "ERROR",
        };
        add_log(&self.logs, level, source, &format!("{}: {}", context, err));
        actix_web::ResponseError::error_response(&err)
    }
}

#[get("/")]
async fn index(data: web::Data<HttpState>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page::render_page(&data.config.page_title))
}

#[post("/sessions")]
async fn create_session(data: web::Data<HttpState>) -> impl Responder {
    let session = data.sessions.create_session();
    add_log(
        &data.logs,
        "INFO",
        "Session",
        &format!(
            "Session {} started ({} active)",
            session.id,
            data.sessions.session_count()
        ),
    );
    HttpResponse::Created().json(data.view(session))
}

#[get("/sessions/{id}")]
async fn get_session(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    match data.sessions.get_session(&path) {
        Ok(session) => HttpResponse::Ok().json(data.view(session)),
        Err(e) => data.fail("Session", "Failed to load session", e),
    }
}

#[put("/sessions/{id}/reviewer")]
async fn set_reviewer(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    req: web::Json<ReviewerNameRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return data.fail("Session", "Invalid reviewer name", validation_error(errors));
    }

    match data
        .sessions
        .set_reviewer_name(&path, req.into_inner().name)
    {
        Ok(session) => HttpResponse::Ok().json(data.view(session)),
        Err(e) => data.fail("Session", "Failed to set reviewer name", e),
    }
}

#[patch("/sessions/{id}/cells")]
async fn edit_cell(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    req: web::Json<CellEditRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return data.fail("Editor", "Invalid cell edit", validation_error(errors));
    }

    match data
        .sessions
        .edit_cell(&path, req.row, &req.column, &req.value)
    {
        Ok(session) => HttpResponse::Ok().json(data.view(session)),
        Err(e) => data.fail(
            "Editor",
            &format!("Rejected edit of row {} column '{}'", req.row, req.column),
            e,
        ),
    }
}

#[post("/sessions/{id}/submit")]
async fn submit(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    match data.sessions.submit(&path) {
        Ok(outcome) => {
            add_log(
                &data.logs,
                "INFO",
                "Submission",
                &format!("Wrote {}", outcome.path.display()),
            );
            let message = outcome
                .session
                .message
                .as_ref()
                .map(|m| m.text.clone())
                .unwrap_or_default();
            HttpResponse::Ok().json(SubmitResponse {
                message,
                file_name: outcome.file_name,
                session: data.view(outcome.session),
            })
        }
        Err(e) => data.fail("Submission", "Submission failed", e),
    }
}

#[delete("/sessions/{id}")]
async fn end_session(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    match data.sessions.end_session(&path) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => data.fail("Session", "Failed to end session", e),
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data
        .logs
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    HttpResponse::Ok().json(&*logs)
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    logs.push(entry);
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(
        web::scope("/api")
            .service(create_session)
            .service(get_session)
            .service(set_reviewer)
            .service(edit_cell)
            .service(submit)
            .service(end_session)
            .service(get_logs),
    );
}

pub fn start_server(
    config: Arc<AppConfig>,
    sessions: Arc<ReviewSessionUseCase>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
) -> std::io::Result<Server> {
    let bind = (config.server.host.clone(), config.server.port);
    let state = web::Data::new(HttpState {
        config,
        sessions,
        logs,
    });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Local tool, any origin

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind)?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{SubmissionHandler, TablePreparer};
    use crate::domain::table::{SourceTable, TablePreparationConfig};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn state() -> (web::Data<HttpState>, PathBuf) {
        let output_dir = std::env::temp_dir().join(format!("rfm_http_{}", Uuid::new_v4()));
        let source = SourceTable::new(
            vec!["customer_id".into(), "RFM_score".into()],
            vec![
                vec!["C1".into(), "15".into()],
                vec!["C2".into(), "14".into()],
            ],
        );
        let table = TablePreparer::new(TablePreparationConfig::default())
            .prepare_source(&source)
            .unwrap();

        let config = AppConfig {
            output_dir: output_dir.clone(),
            ..AppConfig::default()
        };
        let sessions = ReviewSessionUseCase::new(
            table,
            SubmissionHandler::new(output_dir.clone()),
            config.sessions,
        );
        (
            web::Data::new(HttpState {
                config: Arc::new(config),
                sessions: Arc::new(sessions),
                logs: Arc::new(Mutex::new(Vec::new())),
            }),
            output_dir,
        )
    }

    #[actix_web::test]
    async fn serves_page_with_title() {
        let (state, _) = state();
        let app = actix_test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = actix_test::TestRequest::get().uri("/").to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("<h1>Valuable clients - RFM Analysis</h1>"));
    }

    #[actix_web::test]
    async fn session_view_describes_editor() {
        let (state, _) = state();
        let app = actix_test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = actix_test::TestRequest::post().uri("/api/sessions").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let view: Value = actix_test::read_body_json(resp).await;

        assert_eq!(view["nameLabel"], "Enter your name 👇");
        assert_eq!(view["editor"]["hideIndex"], true);
        assert_eq!(view["editor"]["heightPx"], 600);
        assert_eq!(view["columns"][1]["editable"], false);
        assert_eq!(view["columns"][2]["label"], "Your Opinion");
        assert_eq!(view["columns"][2]["options"].as_array().unwrap().len(), 3);
        assert_eq!(view["rows"][0]["cells"], json!(["C1", "Yes", ""]));
        assert_eq!(view["rows"][1]["cells"], json!(["C2", "No", ""]));
        assert_eq!(view["phase"]["state"], "initial");
    }

    #[actix_web::test]
    async fn invalid_opinion_is_rejected() {
        let (state, _) = state();
        let app = actix_test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = actix_test::TestRequest::post().uri("/api/sessions").to_request();
        let view: Value = actix_test::call_and_read_body_json(&app, req).await;
        let id = view["id"].as_str().unwrap().to_string();

        let req = actix_test::TestRequest::patch()
            .uri(&format!("/api/sessions/{}/cells", id))
            .set_json(json!({"row": 0, "column": "opinion", "value": "love it"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = actix_test::TestRequest::get()
            .uri(&format!("/api/sessions/{}", id))
            .to_request();
        let view: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["rows"][0]["cells"][2], "");
    }

    #[actix_web::test]
    async fn submit_flow_writes_one_file() {
        let (state, output_dir) = state();
        let app = actix_test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = actix_test::TestRequest::post().uri("/api/sessions").to_request();
        let view: Value = actix_test::call_and_read_body_json(&app, req).await;
        let id = view["id"].as_str().unwrap().to_string();

        let req = actix_test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/submit", id))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "empty_identity");
        assert_eq!(body["message"], "Please enter your name before submitting.");
        assert!(!output_dir.exists());

        let req = actix_test::TestRequest::patch()
            .uri(&format!("/api/sessions/{}/cells", id))
            .set_json(json!({"row": 1, "column": "opinion", "value": "disagree"}))
            .to_request();
        assert!(actix_test::call_service(&app, req).await.status().is_success());

        let req = actix_test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/reviewer", id))
            .set_json(json!({"name": "Ana"}))
            .to_request();
        assert!(actix_test::call_service(&app, req).await.status().is_success());

        let req = actix_test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/submit", id))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["message"], "Submission successful.");

        let file_name = body["fileName"].as_str().unwrap();
        assert!(file_name.starts_with("Ana_") && file_name.ends_with(".csv"));
        assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 1);
        assert_eq!(
            fs::read_to_string(output_dir.join(file_name)).unwrap(),
            ",Customer ID,Valuable customer,opinion\n0,C1,Yes,\n1,C2,No,👎 Disagree\n"
        );
        fs::remove_dir_all(output_dir).ok();
    }

    #[actix_web::test]
    async fn unknown_session_is_404() {
        let (state, _) = state();
        let app = actix_test::init_service(App::new().app_data(state).configure(configure)).await;

        let req = actix_test::TestRequest::get().uri("/api/sessions/missing").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn session_start_is_logged_with_active_count() {
        let (state, _) = state();
        let app = actix_test::init_service(App::new().app_data(state).configure(configure)).await;

        for _ in 0..2 {
            let req = actix_test::TestRequest::post().uri("/api/sessions").to_request();
            actix_test::call_service(&app, req).await;
        }

        let req = actix_test::TestRequest::get().uri("/api/logs").to_request();
        let logs: Value = actix_test::call_and_read_body_json(&app, req).await;
        let last = logs.as_array().unwrap().last().unwrap();
        assert!(last["message"].as_str().unwrap().ends_with("(2 active)"));
    }

    #[test]
    fn log_ring_is_bounded() {
        let logs = Mutex::new(Vec::new());
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            add_log(&logs, "INFO", "Test", &format!("entry {}", i));
        }
        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].message, "entry 5");
    }
}
