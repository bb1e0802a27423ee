//! Customer order HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::order::{
    CancelOrderInput, CreateOrderInput, OrderFilter, OrderService, UpdateOrderInput,
};
use crate::AppState;

/// List orders with remaining quantities
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.list_orders(&filter).await {
        Ok(orders) => (StatusCode::OK, Json(serde_json::json!({ "orders": orders }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get an order
pub async fn get_order(State(state): State<AppState>, Path(order_id): Path<Uuid>) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.get_order(order_id).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create an order
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.create_order(input).await {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Edit an order and refresh its fulfillment
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateOrderInput>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.update_order(order_id, input).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete an order; its sales stay and are unlinked
pub async fn delete_order(State(state): State<AppState>, Path(order_id): Path<Uuid>) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.delete_order(order_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Cancel an order. A missing body is treated as missing remarks.
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    input: Option<Json<CancelOrderInput>>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());
    let input = input.map(|Json(input)| input).unwrap_or_default();

    match service.cancel_order(order_id, input).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Reopen a cancelled order
pub async fn uncancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.uncancel_order(order_id).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Recompute an order's fulfillment from its linked sales
pub async fn recompute_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.recompute(order_id).await {
        Ok(Some(order)) => (StatusCode::OK, Json(order)).into_response(),
        Ok(None) => crate::error::AppError::NotFound("Order".to_string()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// All sales linked to an order, across product lines
pub async fn get_order_sales(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = OrderService::new(state.db.clone());

    match service.get_linked_sales(order_id).await {
        Ok(sales) => (StatusCode::OK, Json(serde_json::json!({ "order_id": order_id, "sales": sales }))).into_response(),
        Err(e) => e.into_response(),
    }
}
