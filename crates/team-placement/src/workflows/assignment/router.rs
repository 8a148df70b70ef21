use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::gateway::PersistenceGateway;
use super::service::{AssignmentService, AssignmentServiceError};

/// Router builder exposing the admin-triggered assignment run.
pub fn assignment_router<G>(service: Arc<AssignmentService<G>>) -> Router
where
    G: PersistenceGateway + 'static,
{
    Router::new()
        .route("/api/v1/assignments/run", post(run_handler::<G>))
        .route("/api/v1/assignments/run/log", post(run_log_handler::<G>))
        .route("/api/v1/assignments/preview", post(preview_handler::<G>))
        .with_state(service)
}

pub(crate) async fn run_handler<G>(State(service): State<Arc<AssignmentService<G>>>) -> Response
where
    G: PersistenceGateway + 'static,
{
    match service.run() {
        Ok(report) => (StatusCode::OK, axum::Json(report.to_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn preview_handler<G>(
    State(service): State<Arc<AssignmentService<G>>>,
) -> Response
where
    G: PersistenceGateway + 'static,
{
    match service.preview() {
        Ok(report) => (StatusCode::OK, axum::Json(report.to_view())).into_response(),
        Err(error) => error_response(error),
    }
}

/// Run and hand back the text log as a download.
pub(crate) async fn run_log_handler<G>(
    State(service): State<Arc<AssignmentService<G>>>,
) -> Response
where
    G: PersistenceGateway + 'static,
{
    let report = match service.run() {
        Ok(report) => report,
        Err(error) => return error_response(error),
    };

    let disposition = format!("attachment; filename=\"{}\"", report.log_filename());
    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        report.log,
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

fn error_response(error: AssignmentServiceError) -> Response {
    let status = match &error {
        AssignmentServiceError::TeamDirectory(_) | AssignmentServiceError::ApplicantPool(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        AssignmentServiceError::Directory(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssignmentServiceError::RunInProgress => StatusCode::CONFLICT,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
