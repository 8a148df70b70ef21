use crate::infra::{AppState, InMemoryGateway};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use team_placement::workflows::assignment::{
    assignment_router, AssignmentService, CapacityRow, TeamDirectory,
};

#[derive(Debug, Serialize)]
pub(crate) struct TeamsResponse {
    pub(crate) technical: Vec<CapacityRow>,
    pub(crate) constant: Vec<CapacityRow>,
}

pub(crate) fn with_assignment_routes(
    service: Arc<AssignmentService<InMemoryGateway>>,
    gateway: InMemoryGateway,
) -> axum::Router {
    assignment_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/teams",
            axum::routing::get(teams_endpoint).layer(Extension(gateway)),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Current seat counts for both pools.
pub(crate) async fn teams_endpoint(Extension(gateway): Extension<InMemoryGateway>) -> Response {
    match TeamDirectory::from_teams(&gateway.teams()) {
        Ok(directory) => (
            StatusCode::OK,
            Json(TeamsResponse {
                technical: directory.technical().rows(),
                constant: directory.constant().rows(),
            }),
        )
            .into_response(),
        Err(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}
