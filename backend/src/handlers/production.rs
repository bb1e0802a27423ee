//! Production run HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::production::{
    CreateCircleRunInput, CreatePattaRunInput, CreatePlRunInput, ProductionService, RunFilter,
};
use crate::AppState;

// ============================================================================
// Circle runs
// ============================================================================

/// List circle runs
pub async fn list_circle_runs(
    State(state): State<AppState>,
    Query(filter): Query<RunFilter>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.list_circle_runs(&filter).await {
        Ok(runs) => (StatusCode::OK, Json(serde_json::json!({ "runs": runs }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a circle run
pub async fn get_circle_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.get_circle_run(run_id).await {
        Ok(run) => (StatusCode::OK, Json(run)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a circle run
pub async fn create_circle_run(
    State(state): State<AppState>,
    Json(input): Json<CreateCircleRunInput>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.create_circle_run(input).await {
        Ok(run) => (StatusCode::CREATED, Json(run)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Undo a circle run
pub async fn delete_circle_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.delete_circle_run(run_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Patta runs
// ============================================================================

/// List patta runs
pub async fn list_patta_runs(
    State(state): State<AppState>,
    Query(filter): Query<RunFilter>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.list_patta_runs(&filter).await {
        Ok(runs) => (StatusCode::OK, Json(serde_json::json!({ "runs": runs }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a patta run
pub async fn create_patta_run(
    State(state): State<AppState>,
    Json(input): Json<CreatePattaRunInput>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.create_patta_run(input).await {
        Ok(run) => (StatusCode::CREATED, Json(run)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Undo a patta run
pub async fn delete_patta_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.delete_patta_run(run_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// PL runs
// ============================================================================

/// List PL runs
pub async fn list_pl_runs(
    State(state): State<AppState>,
    Query(filter): Query<RunFilter>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.list_pl_runs(&filter).await {
        Ok(runs) => (StatusCode::OK, Json(serde_json::json!({ "runs": runs }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a PL run
pub async fn create_pl_run(
    State(state): State<AppState>,
    Json(input): Json<CreatePlRunInput>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.create_pl_run(input).await {
        Ok(run) => (StatusCode::CREATED, Json(run)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Undo a PL run
pub async fn delete_pl_run(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductionService::new(state.db.clone());

    match service.delete_pl_run(run_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
