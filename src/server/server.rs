use anyhow::Result;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tower_http::services::ServeDir;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use crate::jobs::{JobError, JobRunner};
use crate::store::{MediaItem, MediaStore};

use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub name: &'static str,
    pub version: &'static str,
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

async fn list_media(State(store): State<GuardedMediaStore>) -> Response {
    match store.list_items() {
        Ok(items) => Json(items).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{}", err)).into_response(),
    }
}

async fn get_media(State(store): State<GuardedMediaStore>, Path(id): Path<String>) -> Response {
    match store.get_item(&id) {
        Ok(Some(item)) => Json(item).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{}", err)).into_response(),
    }
}

async fn put_media(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<String>,
    Json(mut data): Json<serde_json::Value>,
) -> Response {
    // The id in the path is authoritative over whatever the body carries.
    if let Some(fields) = data.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
    }
    let item = match MediaItem::from_value(data) {
        Ok(item) => item,
        Err(err) => return (StatusCode::BAD_REQUEST, format!("{}", err)).into_response(),
    };
    match store.upsert_item(&item) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{}", err)).into_response(),
    }
}

async fn delete_media(State(store): State<GuardedMediaStore>, Path(id): Path<String>) -> Response {
    match store.delete_item(&id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{}", err)).into_response(),
    }
}

async fn list_jobs(State(job_runner): State<GuardedJobRunner>) -> Response {
    Json(job_runner.list()).into_response()
}

async fn run_job(State(job_runner): State<GuardedJobRunner>, Path(id): Path<String>) -> Response {
    match job_runner.run_job(&id).await {
        Ok(completed) => Json(json!({
            "success": true,
            "duration_ms": completed.duration_ms,
            "report": completed.report,
        }))
        .into_response(),
        Err(JobError::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(err @ JobError::AlreadyRunning) => (
            StatusCode::CONFLICT,
            Json(json!({ "success": false, "error": err.to_string() })),
        )
            .into_response(),
        Err(JobError::ExecutionFailed(msg)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": msg })),
        )
            .into_response(),
    }
}

impl ServerState {
    fn new(
        config: ServerConfig,
        store: Arc<dyn MediaStore>,
        job_runner: Arc<JobRunner>,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            store,
            job_runner,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    store: Arc<dyn MediaStore>,
    job_runner: Arc<JobRunner>,
) -> Result<Router> {
    let state = ServerState::new(config.clone(), store, job_runner);

    let media_routes: Router = Router::new()
        .route("/", get(list_media))
        .route("/{id}", get(get_media))
        .route("/{id}", put(put_media))
        .route("/{id}", delete(delete_media))
        .with_state(state.clone());

    let job_routes: Router = Router::new()
        .route("/", get(list_jobs))
        .route("/{id}/run", post(run_job))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router
        .nest("/v1/media", media_routes)
        .nest("/v1/jobs", job_routes);

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(
    store: Arc<dyn MediaStore>,
    job_runner: Arc<JobRunner>,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    frontend_dir_path: Option<String>,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        frontend_dir_path,
    };
    let app = make_app(config, store, job_runner)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
