//! Sale HTTP handlers, shared by all four product lines
//!
//! Routes bind the product line; each handler takes it as a plain argument.

use axum::{http::StatusCode, response::IntoResponse, Json};
use shared::SaleKind;
use uuid::Uuid;

use crate::services::sale::{CreateSaleInput, SaleFilter, SaleService};
use crate::AppState;

/// List sales of one product line
pub async fn list_sales(state: AppState, kind: SaleKind, filter: SaleFilter) -> impl IntoResponse {
    let service = SaleService::new(state.db.clone());

    match service.list_sales(kind, &filter).await {
        Ok(sales) => (StatusCode::OK, Json(serde_json::json!({ "kind": kind, "sales": sales }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a sale
pub async fn create_sale(state: AppState, kind: SaleKind, input: CreateSaleInput) -> impl IntoResponse {
    let service = SaleService::new(state.db.clone());

    match service.create_sale(kind, input).await {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Undo a sale
pub async fn undo_sale(state: AppState, kind: SaleKind, sale_id: Uuid) -> impl IntoResponse {
    let service = SaleService::new(state.db.clone());

    match service.undo_sale(kind, sale_id).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => e.into_response(),
    }
}
