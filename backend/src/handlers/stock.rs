//! Stock position HTTP handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::services::stock::{ScrapStock, StockFilter, StockService};
use crate::AppState;

/// Coil stock
pub async fn list_coil_stock(
    State(state): State<AppState>,
    Query(filter): Query<StockFilter>,
) -> AppResult<Json<Value>> {
    let service = StockService::new(state.db.clone());
    let rows = service.list_coil_stock(&filter).await?;
    Ok(Json(json!({ "stock": rows })))
}

/// Circle stock
pub async fn list_circle_stock(
    State(state): State<AppState>,
    Query(filter): Query<StockFilter>,
) -> AppResult<Json<Value>> {
    let service = StockService::new(state.db.clone());
    let rows = service.list_circle_stock(&filter).await?;
    Ok(Json(json!({ "stock": rows })))
}

/// Patta stock
pub async fn list_patta_stock(
    State(state): State<AppState>,
    Query(filter): Query<StockFilter>,
) -> AppResult<Json<Value>> {
    let service = StockService::new(state.db.clone());
    let rows = service.list_patta_stock(&filter).await?;
    Ok(Json(json!({ "stock": rows })))
}

/// PL stock
pub async fn list_pl_stock(
    State(state): State<AppState>,
    Query(filter): Query<StockFilter>,
) -> AppResult<Json<Value>> {
    let service = StockService::new(state.db.clone());
    let rows = service.list_pl_stock(&filter).await?;
    Ok(Json(json!({ "stock": rows })))
}

/// Pooled scrap
pub async fn get_scrap_stock(State(state): State<AppState>) -> AppResult<Json<ScrapStock>> {
    let service = StockService::new(state.db.clone());
    Ok(Json(service.get_scrap_stock().await?))
}
