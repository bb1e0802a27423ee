//! Coil register HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::coil::{CoilService, CreateCoilInput, UpdateCoilInput};
use crate::AppState;

/// List all coils
pub async fn list_coils(State(state): State<AppState>) -> impl IntoResponse {
    let service = CoilService::new(state.db.clone());

    match service.list_coils().await {
        Ok(coils) => (StatusCode::OK, Json(serde_json::json!({ "coils": coils }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a coil with its availability
pub async fn get_coil(State(state): State<AppState>, Path(coil_id): Path<Uuid>) -> impl IntoResponse {
    let service = CoilService::new(state.db.clone());

    match service.get_coil(coil_id).await {
        Ok(coil) => (StatusCode::OK, Json(coil)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a purchased coil
pub async fn create_coil(
    State(state): State<AppState>,
    Json(input): Json<CreateCoilInput>,
) -> impl IntoResponse {
    let service = CoilService::new(state.db.clone());

    match service.create_coil(input).await {
        Ok(coil) => (StatusCode::CREATED, Json(coil)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Edit a coil
pub async fn update_coil(
    State(state): State<AppState>,
    Path(coil_id): Path<Uuid>,
    Json(input): Json<UpdateCoilInput>,
) -> impl IntoResponse {
    let service = CoilService::new(state.db.clone());

    match service.update_coil(coil_id, input).await {
        Ok(coil) => (StatusCode::OK, Json(coil)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete an unused coil
pub async fn delete_coil(State(state): State<AppState>, Path(coil_id): Path<Uuid>) -> impl IntoResponse {
    let service = CoilService::new(state.db.clone());

    match service.delete_coil(coil_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
