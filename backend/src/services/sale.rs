//! Sale service: circle, coil, scrap and PL sales
//!
//! Recording or undoing a sale and refreshing the linked order's fulfillment
//! happen in one transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{sale_amount, validate_positive_weight, validate_qty, validate_rate, Availability, SaleKind};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::order::{ensure_linkable, recompute_fulfillment, Order};
use crate::services::stock::{
    circle_availability, coil_availability, pl_availability, scrap_availability,
};

/// Sale service for all four product lines
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Sale record, uniform across product lines
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sale {
    pub id: Uuid,
    /// Stock row sold from; absent for scrap
    pub source_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub sold_qty: i64,
    pub sold_weight_kg: Decimal,
    pub rate_per_kg: Decimal,
    pub amount: Decimal,
    pub buyer: Option<String>,
    pub sale_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Outcome of recording or undoing a sale
#[derive(Debug, Serialize)]
pub struct SaleOutcome {
    pub kind: SaleKind,
    pub sale: Sale,
    /// Linked order after its fulfillment was refreshed
    pub order: Option<Order>,
}

/// Input for recording a sale. Field names accepted in either snake_case or
/// the camelCase the shop-floor client sends.
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    #[serde(
        default,
        alias = "sourceId",
        alias = "stock_id",
        alias = "stockId",
        alias = "circle_stock_id",
        alias = "circleStockId",
        alias = "coil_id",
        alias = "coilId",
        alias = "pl_stock_id",
        alias = "plStockId"
    )]
    pub source_id: Option<Uuid>,
    #[serde(default, alias = "orderId")]
    pub order_id: Option<Uuid>,
    #[serde(default, alias = "soldQty", alias = "qty", alias = "quantity")]
    pub sold_qty: Option<i64>,
    #[serde(alias = "soldWeightKg", alias = "weight_kg", alias = "weightKg", alias = "weight")]
    pub sold_weight_kg: Decimal,
    #[serde(default, alias = "ratePerKg", alias = "rate", alias = "price")]
    pub rate_per_kg: Option<Decimal>,
    #[serde(default, alias = "buyerName", alias = "customer")]
    pub buyer: Option<String>,
    #[serde(default, alias = "saleDate", alias = "date")]
    pub sale_date: Option<NaiveDate>,
}

/// Filter for sale listings
#[derive(Debug, Default, Deserialize)]
pub struct SaleFilter {
    #[serde(alias = "orderId")]
    pub order_id: Option<Uuid>,
}

fn select_sql(kind: SaleKind) -> String {
    let source = kind.source_column().unwrap_or("NULL::UUID");
    format!(
        "SELECT id, {source} AS source_id, order_id, sold_qty, sold_weight_kg, rate_per_kg, \
         amount, buyer, sale_date, created_at FROM {}",
        kind.table()
    )
}

fn returning_sql(kind: SaleKind) -> String {
    let source = kind.source_column().unwrap_or("NULL::UUID");
    format!(
        "RETURNING id, {source} AS source_id, order_id, sold_qty, sold_weight_kg, rate_per_kg, \
         amount, buyer, sale_date, created_at"
    )
}

impl CreateSaleInput {
    fn validate_for(&self, kind: SaleKind) -> AppResult<()> {
        validate_positive_weight(self.sold_weight_kg)
            .map_err(|m| AppError::invalid("sold_weight_kg", m))?;
        if let Some(rate) = self.rate_per_kg {
            validate_rate(rate).map_err(|m| AppError::invalid("rate_per_kg", m))?;
        }
        if let Some(qty) = self.sold_qty {
            validate_qty(qty).map_err(|m| AppError::invalid("sold_qty", m))?;
        }
        if kind == SaleKind::Scrap && self.sold_qty.is_some_and(|qty| qty != 0) {
            return Err(AppError::invalid("sold_qty", "Scrap is sold by weight only"));
        }
        if kind.source_column().is_some() && self.source_id.is_none() {
            return Err(AppError::invalid("source_id", "Stock to sell from is required"));
        }
        Ok(())
    }
}

/// Refuse a sale larger than what is left. Pieces only bind stock counted in pieces.
fn check_sale_supply(
    kind: SaleKind,
    available: &Availability,
    sold_qty: i64,
    sold_weight_kg: Decimal,
) -> AppResult<()> {
    let stock_kind = kind.stock_kind();
    if available.is_exhausted() {
        return Err(AppError::InsufficientStock(format!(
            "No {} stock is left to sell",
            stock_kind.as_str()
        )));
    }

    let pieces = if stock_kind.tracks_pieces() { sold_qty } else { 0 };
    if !available.can_supply(pieces, sold_weight_kg) {
        return Err(AppError::InsufficientStock(format!(
            "Requested {} pcs / {} kg but only {} pcs / {} kg {} is available",
            pieces,
            sold_weight_kg,
            available.available_qty(),
            available.available_weight_kg(),
            stock_kind.as_str()
        )));
    }
    Ok(())
}

async fn availability_for(
    conn: &mut PgConnection,
    kind: SaleKind,
    source_id: Option<Uuid>,
) -> AppResult<Availability> {
    let found = match (kind, source_id) {
        (SaleKind::Scrap, _) => Some(scrap_availability(conn).await?),
        (SaleKind::Circle, Some(id)) => circle_availability(conn, id).await?,
        (SaleKind::Coil, Some(id)) => coil_availability(conn, id).await?,
        (SaleKind::Pl, Some(id)) => pl_availability(conn, id).await?,
        (_, None) => None,
    };

    found.ok_or_else(|| AppError::NotFound(format!("{} stock", kind.stock_kind().as_str())))
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List sales of one kind, newest first
    pub async fn list_sales(&self, kind: SaleKind, filter: &SaleFilter) -> AppResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "{} WHERE ($1::UUID IS NULL OR order_id = $1) ORDER BY sale_date DESC, created_at DESC",
            select_sql(kind)
        ))
        .bind(filter.order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(sales)
    }

    /// Record a sale and refresh the linked order
    pub async fn create_sale(&self, kind: SaleKind, input: CreateSaleInput) -> AppResult<SaleOutcome> {
        input.validate_for(kind)?;

        let sold_qty = input.sold_qty.unwrap_or(0);
        let rate_per_kg = input.rate_per_kg.unwrap_or(Decimal::ZERO);
        let amount = sale_amount(input.sold_weight_kg, rate_per_kg);

        let mut tx = self.db.begin().await?;

        if let Some(order_id) = input.order_id {
            ensure_linkable(&mut tx, order_id).await?;
        }

        let available = availability_for(&mut tx, kind, input.source_id).await?;
        check_sale_supply(kind, &available, sold_qty, input.sold_weight_kg)?;

        let sale_date = input.sale_date.unwrap_or_else(|| Utc::now().date_naive());
        let sale = match kind.source_column() {
            Some(column) => {
                sqlx::query_as::<_, Sale>(&format!(
                    "INSERT INTO {} ({column}, order_id, sold_qty, sold_weight_kg, rate_per_kg, amount, buyer, sale_date) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) {}",
                    kind.table(),
                    returning_sql(kind)
                ))
                .bind(input.source_id)
                .bind(input.order_id)
                .bind(sold_qty)
                .bind(input.sold_weight_kg)
                .bind(rate_per_kg)
                .bind(amount)
                .bind(&input.buyer)
                .bind(sale_date)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Sale>(&format!(
                    "INSERT INTO {} (order_id, sold_qty, sold_weight_kg, rate_per_kg, amount, buyer, sale_date) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) {}",
                    kind.table(),
                    returning_sql(kind)
                ))
                .bind(input.order_id)
                .bind(sold_qty)
                .bind(input.sold_weight_kg)
                .bind(rate_per_kg)
                .bind(amount)
                .bind(&input.buyer)
                .bind(sale_date)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let order = match sale.order_id {
            Some(order_id) => recompute_fulfillment(&mut tx, order_id).await?,
            None => None,
        };

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            kind = kind.as_str(),
            sold_weight_kg = %sale.sold_weight_kg,
            order_id = ?sale.order_id,
            "Sale recorded"
        );
        Ok(SaleOutcome { kind, sale, order })
    }

    /// Undo a sale. Its stock becomes available again and the linked order,
    /// if any, is recomputed without it.
    pub async fn undo_sale(&self, kind: SaleKind, sale_id: Uuid) -> AppResult<SaleOutcome> {
        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            "DELETE FROM {} WHERE id = $1 {}",
            kind.table(),
            returning_sql(kind)
        ))
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(kind.to_string()))?;

        let order = match sale.order_id {
            Some(order_id) => recompute_fulfillment(&mut tx, order_id).await?,
            None => None,
        };

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            kind = kind.as_str(),
            order_id = ?sale.order_id,
            "Sale undone"
        );
        Ok(SaleOutcome { kind, sale, order })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_circle_sale_is_normalized() {
        let input: CreateSaleInput = serde_json::from_value(serde_json::json!({
            "circleStockId": "0d8f6f0e-49a4-4f0e-9f5a-6c5a3c7b2e10",
            "orderId": "6a0b1e0c-3b3c-4a3b-8d1c-9a2f3e4d5c6b",
            "soldQty": 120,
            "soldWeightKg": "145.5",
            "ratePerKg": "82.40",
            "buyerName": "Shree Utensils",
            "saleDate": "2024-03-18"
        }))
        .unwrap();

        assert!(input.source_id.is_some());
        assert!(input.order_id.is_some());
        assert_eq!(input.sold_qty, Some(120));
        assert_eq!(input.buyer.as_deref(), Some("Shree Utensils"));
        assert!(input.validate_for(SaleKind::Circle).is_ok());
    }

    #[test]
    fn scrap_sale_needs_no_source() {
        let input: CreateSaleInput = serde_json::from_value(serde_json::json!({
            "weight": 40,
            "rate": 28
        }))
        .unwrap();

        assert!(input.source_id.is_none());
        assert!(input.validate_for(SaleKind::Scrap).is_ok());
        assert!(matches!(
            input.validate_for(SaleKind::Coil),
            Err(AppError::Validation { field, .. }) if field == "source_id"
        ));
    }

    #[test]
    fn zero_weight_is_rejected() {
        let input: CreateSaleInput = serde_json::from_value(serde_json::json!({
            "coil_id": "0d8f6f0e-49a4-4f0e-9f5a-6c5a3c7b2e10",
            "sold_weight_kg": 0
        }))
        .unwrap();

        assert!(matches!(
            input.validate_for(SaleKind::Coil),
            Err(AppError::Validation { field, .. }) if field == "sold_weight_kg"
        ));
    }

    #[test]
    fn scrap_sale_with_pieces_is_rejected() {
        let input: CreateSaleInput = serde_json::from_value(serde_json::json!({
            "weight": 40,
            "qty": 1
        }))
        .unwrap();

        assert!(matches!(
            input.validate_for(SaleKind::Scrap),
            Err(AppError::Validation { field, .. }) if field == "sold_qty"
        ));
    }

    #[test]
    fn coil_sale_keeps_its_count() {
        let input: CreateSaleInput = serde_json::from_value(serde_json::json!({
            "coilId": "0d8f6f0e-49a4-4f0e-9f5a-6c5a3c7b2e10",
            "qty": 1,
            "weight": 2500
        }))
        .unwrap();
        assert!(input.validate_for(SaleKind::Coil).is_ok());

        // A coil has no piece balance; the count must not trip the supply check
        let coil = Availability {
            initial_weight_kg: Decimal::from(5000),
            consumed_weight_kg: Decimal::from(1000),
            ..Default::default()
        };
        assert!(check_sale_supply(SaleKind::Coil, &coil, 1, Decimal::from(2500)).is_ok());
        assert!(check_sale_supply(SaleKind::Coil, &coil, 1, Decimal::from(4001)).is_err());
    }

    #[test]
    fn circle_pieces_are_checked() {
        let circles = Availability {
            initial_qty: 640,
            initial_weight_kg: Decimal::from(780),
            consumed_qty: 600,
            consumed_weight_kg: Decimal::from(700),
        };
        assert!(check_sale_supply(SaleKind::Circle, &circles, 40, Decimal::from(80)).is_ok());
        let err = check_sale_supply(SaleKind::Circle, &circles, 41, Decimal::from(10)).unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(msg) if msg.contains("only 40 pcs")));
    }

    #[test]
    fn sold_out_stock_is_reported() {
        let scrap = Availability {
            initial_weight_kg: Decimal::from(150),
            consumed_weight_kg: Decimal::from(150),
            ..Default::default()
        };
        let err = check_sale_supply(SaleKind::Scrap, &scrap, 0, Decimal::ONE).unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(msg) if msg.starts_with("No scrap")));
    }

    #[test]
    fn scrap_rows_select_a_null_source() {
        assert!(select_sql(SaleKind::Scrap).contains("NULL::UUID AS source_id"));
        assert!(select_sql(SaleKind::Pl).contains("pl_stock_id AS source_id"));
        assert!(returning_sql(SaleKind::Circle).starts_with("RETURNING id, circle_stock_id"));
    }
}
