//! Route definitions for the Steelworks workshop platform

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use shared::SaleKind;
use uuid::Uuid;

use crate::services::sale::{CreateSaleInput, SaleFilter};
use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/coils", coil_routes())
        .nest("/circle-runs", circle_run_routes())
        .nest("/patta-runs", patta_run_routes())
        .nest("/pl-runs", pl_run_routes())
        .nest("/stock", stock_routes())
        .nest("/circle-sales", sale_routes(SaleKind::Circle))
        .nest("/coil-sales", sale_routes(SaleKind::Coil))
        .nest("/scrap-sales", sale_routes(SaleKind::Scrap))
        .nest("/pl-sales", sale_routes(SaleKind::Pl))
        .nest("/orders", order_routes())
        .nest("/reports", report_routes())
}

/// Coil register routes
fn coil_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_coils).post(handlers::create_coil))
        .route(
            "/:coil_id",
            get(handlers::get_coil)
                .put(handlers::update_coil)
                .delete(handlers::delete_coil),
        )
}

/// Circle run routes
fn circle_run_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_circle_runs).post(handlers::create_circle_run))
        .route(
            "/:run_id",
            get(handlers::get_circle_run).delete(handlers::delete_circle_run),
        )
}

/// Patta run routes
fn patta_run_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_patta_runs).post(handlers::create_patta_run))
        .route("/:run_id", delete(handlers::delete_patta_run))
}

/// PL run routes
fn pl_run_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_pl_runs).post(handlers::create_pl_run))
        .route("/:run_id", delete(handlers::delete_pl_run))
}

/// Stock position routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/coils", get(handlers::list_coil_stock))
        .route("/circles", get(handlers::list_circle_stock))
        .route("/patta", get(handlers::list_patta_stock))
        .route("/pl", get(handlers::list_pl_stock))
        .route("/scrap", get(handlers::get_scrap_stock))
}

/// Sale routes for one product line
fn sale_routes(kind: SaleKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(move |State(state): State<AppState>, Query(filter): Query<SaleFilter>| {
                handlers::list_sales(state, kind, filter)
            })
            .post(move |State(state): State<AppState>, Json(input): Json<CreateSaleInput>| {
                handlers::create_sale(state, kind, input)
            }),
        )
        .route(
            "/:sale_id",
            delete(move |State(state): State<AppState>, Path(sale_id): Path<Uuid>| {
                handlers::undo_sale(state, kind, sale_id)
            }),
        )
}

/// Customer order routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route(
            "/:order_id",
            get(handlers::get_order)
                .put(handlers::update_order)
                .delete(handlers::delete_order),
        )
        .route("/:order_id/cancel", patch(handlers::cancel_order))
        .route("/:order_id/uncancel", patch(handlers::uncancel_order))
        .route("/:order_id/recompute", post(handlers::recompute_order))
        .route("/:order_id/sales", get(handlers::get_order_sales))
}

/// Reporting routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/yield", get(handlers::get_yield_report))
        .route("/profitability", get(handlers::get_profitability_report))
}
