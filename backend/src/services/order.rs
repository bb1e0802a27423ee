//! Customer order service: order CRUD, cancellation and fulfillment recompute

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    check_cancel, check_linkable, check_uncancel, recompute_status, remaining_qty,
    remaining_weight, validate_order_targets, FulfilledTotals, FulfillmentTarget, OrderStatus,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Order service for managing customer orders and their fulfillment
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

const ORDER_COLUMNS: &str = r#"
    id, customer, company, grade, thickness_mm, size, ordered_qty, ordered_weight_kg,
    fulfilled_qty, fulfilled_weight_kg, status, order_date, due_date, notes,
    cancelled_at, cancel_remarks, created_at, updated_at
"#;

/// Every sale linked to an order, across all product lines
const LINKED_SALES_SQL: &str = r#"
    SELECT sold_qty, sold_weight_kg FROM circle_sales WHERE order_id = $1
    UNION ALL
    SELECT sold_qty, sold_weight_kg FROM coil_sales WHERE order_id = $1
    UNION ALL
    SELECT sold_qty, sold_weight_kg FROM scrap_sales WHERE order_id = $1
    UNION ALL
    SELECT sold_qty, sold_weight_kg FROM pl_sales WHERE order_id = $1
"#;

/// Customer order record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub customer: String,
    pub company: Option<String>,
    pub grade: Option<String>,
    pub thickness_mm: Option<Decimal>,
    pub size: Option<String>,
    pub ordered_qty: Option<i64>,
    pub ordered_weight_kg: Option<Decimal>,
    pub fulfilled_qty: i64,
    pub fulfilled_weight_kg: Decimal,
    pub status: String,
    pub order_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancel_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn target(&self) -> FulfillmentTarget {
        FulfillmentTarget {
            ordered_qty: self.ordered_qty,
            ordered_weight_kg: self.ordered_weight_kg,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }
}

/// Order as returned by the listing, with what is still owed
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub remaining_qty: i64,
    pub remaining_weight_kg: Decimal,
}

impl From<Order> for OrderSummary {
    fn from(order: Order) -> Self {
        let remaining_weight_kg = remaining_weight(order.ordered_weight_kg, order.fulfilled_weight_kg);
        let remaining_qty = remaining_qty(order.ordered_qty, order.fulfilled_qty);
        Self {
            order,
            remaining_qty,
            remaining_weight_kg,
        }
    }
}

/// A sale of any product line linked to an order
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LinkedSale {
    pub kind: String,
    pub id: Uuid,
    pub sold_qty: i64,
    pub sold_weight_kg: Decimal,
    pub rate_per_kg: Decimal,
    pub amount: Decimal,
    pub buyer: Option<String>,
    pub sale_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an order
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderInput {
    #[serde(alias = "customerName", alias = "customer_name")]
    #[validate(length(min = 1, max = 255, message = "must not be empty"))]
    pub customer: String,
    #[serde(alias = "companyName", alias = "company_name")]
    pub company: Option<String>,
    pub grade: Option<String>,
    #[serde(alias = "thicknessMm", alias = "thickness")]
    pub thickness_mm: Option<Decimal>,
    pub size: Option<String>,
    #[serde(alias = "orderedQty", alias = "quantity", alias = "qty")]
    pub ordered_qty: Option<i64>,
    #[serde(alias = "orderedWeightKg", alias = "ordered_weight", alias = "weight_kg")]
    pub ordered_weight_kg: Option<Decimal>,
    #[serde(alias = "orderDate")]
    pub order_date: Option<NaiveDate>,
    #[serde(alias = "dueDate")]
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Input for editing an order; absent fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateOrderInput {
    #[serde(alias = "customerName", alias = "customer_name")]
    #[validate(length(min = 1, max = 255, message = "must not be empty"))]
    pub customer: Option<String>,
    #[serde(alias = "companyName", alias = "company_name")]
    pub company: Option<String>,
    pub grade: Option<String>,
    #[serde(alias = "thicknessMm", alias = "thickness")]
    pub thickness_mm: Option<Decimal>,
    pub size: Option<String>,
    #[serde(alias = "orderedQty", alias = "quantity", alias = "qty")]
    pub ordered_qty: Option<i64>,
    #[serde(alias = "orderedWeightKg", alias = "ordered_weight", alias = "weight_kg")]
    pub ordered_weight_kg: Option<Decimal>,
    #[serde(alias = "orderDate")]
    pub order_date: Option<NaiveDate>,
    #[serde(alias = "dueDate")]
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Input for cancelling an order
#[derive(Debug, Default, Deserialize)]
pub struct CancelOrderInput {
    #[serde(alias = "remark", alias = "reason", alias = "cancelRemarks", alias = "cancel_remarks")]
    pub remarks: Option<String>,
}

/// Filter for the order listing
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub customer: Option<String>,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List orders, newest first, with remaining quantities
    pub async fn list_orders(&self, filter: &OrderFilter) -> AppResult<Vec<OrderSummary>> {
        let status = filter
            .status
            .as_deref()
            .map(|s| s.parse::<OrderStatus>())
            .transpose()
            .map_err(|e| AppError::invalid("status", &e.to_string()))?;

        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR customer ILIKE '%' || $2 || '%')
            ORDER BY order_date DESC, created_at DESC
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(filter.customer.as_deref())
        .fetch_all(&self.db)
        .await?;

        Ok(orders.into_iter().map(OrderSummary::from).collect())
    }

    /// Get a single order
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<OrderSummary> {
        let mut conn = self.db.acquire().await?;
        fetch_order(&mut conn, order_id, false)
            .await?
            .map(OrderSummary::from)
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    /// Create a new order. Fulfillment starts empty and status Pending.
    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<Order> {
        input.validate()?;
        validate_order_targets(input.ordered_qty, input.ordered_weight_kg)
            .map_err(|m| AppError::invalid("ordered_qty/ordered_weight_kg", m))?;

        let order_date = input.order_date.unwrap_or_else(|| Utc::now().date_naive());

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (
                customer, company, grade, thickness_mm, size, ordered_qty, ordered_weight_kg,
                status, order_date, due_date, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(input.customer.trim())
        .bind(&input.company)
        .bind(&input.grade)
        .bind(input.thickness_mm)
        .bind(&input.size)
        .bind(input.ordered_qty)
        .bind(input.ordered_weight_kg)
        .bind(OrderStatus::Pending.as_str())
        .bind(order_date)
        .bind(input.due_date)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(order_id = %order.id, customer = %order.customer, "Order created");
        Ok(order)
    }

    /// Edit an order, then bring its fulfillment in line with the new targets
    pub async fn update_order(&self, order_id: Uuid, input: UpdateOrderInput) -> AppResult<Order> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        let existing = fetch_order(&mut tx, order_id, true)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let ordered_qty = input.ordered_qty.or(existing.ordered_qty);
        let ordered_weight_kg = input.ordered_weight_kg.or(existing.ordered_weight_kg);
        validate_order_targets(ordered_qty, ordered_weight_kg)
            .map_err(|m| AppError::invalid("ordered_qty/ordered_weight_kg", m))?;

        let customer = input.customer.unwrap_or(existing.customer);

        sqlx::query(
            r#"
            UPDATE orders
            SET customer = $1, company = $2, grade = $3, thickness_mm = $4, size = $5,
                ordered_qty = $6, ordered_weight_kg = $7, order_date = $8, due_date = $9,
                notes = $10, updated_at = NOW()
            WHERE id = $11
            "#,
        )
        .bind(customer.trim())
        .bind(input.company.or(existing.company))
        .bind(input.grade.or(existing.grade))
        .bind(input.thickness_mm.or(existing.thickness_mm))
        .bind(input.size.or(existing.size))
        .bind(ordered_qty)
        .bind(ordered_weight_kg)
        .bind(input.order_date.unwrap_or(existing.order_date))
        .bind(input.due_date.or(existing.due_date))
        .bind(input.notes.or(existing.notes))
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        let order = recompute_fulfillment(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;
        tx.commit().await?;

        Ok(order)
    }

    /// Hard-delete an order. Linked sales stay and lose their order link.
    pub async fn delete_order(&self, order_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }

        tracing::info!(order_id = %order_id, "Order deleted");
        Ok(())
    }

    /// Soft-cancel an order. Requires remarks; cancelling twice is a conflict.
    pub async fn cancel_order(&self, order_id: Uuid, input: CancelOrderInput) -> AppResult<Order> {
        let mut tx = self.db.begin().await?;
        let existing = fetch_order(&mut tx, order_id, true)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let remarks = check_cancel(existing.is_cancelled(), input.remarks.as_deref())?.to_string();

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET cancelled_at = NOW(), cancel_remarks = $1, status = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(&remarks)
        .bind(OrderStatus::Cancelled.as_str())
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(order_id = %order_id, remarks = %remarks, "Order cancelled");
        Ok(order)
    }

    /// Lift a cancellation and recompute fulfillment from the linked sales
    pub async fn uncancel_order(&self, order_id: Uuid) -> AppResult<Order> {
        let mut tx = self.db.begin().await?;
        let existing = fetch_order(&mut tx, order_id, true)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        check_uncancel(existing.is_cancelled())?;

        sqlx::query(
            r#"
            UPDATE orders
            SET cancelled_at = NULL, cancel_remarks = NULL, status = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(OrderStatus::Pending.as_str())
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        let order = recompute_fulfillment(&mut tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?;
        tx.commit().await?;

        tracing::info!(order_id = %order_id, status = %order.status, "Order reinstated");
        Ok(order)
    }

    /// Recompute an order's fulfillment on demand. `None` when the order does not exist.
    pub async fn recompute(&self, order_id: Uuid) -> AppResult<Option<Order>> {
        let mut tx = self.db.begin().await?;
        let order = recompute_fulfillment(&mut tx, order_id).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// All sales linked to an order, newest first
    pub async fn get_linked_sales(&self, order_id: Uuid) -> AppResult<Vec<LinkedSale>> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
            .bind(order_id)
            .fetch_one(&self.db)
            .await?;

        if !exists {
            return Err(AppError::NotFound("Order".to_string()));
        }

        let sales = sqlx::query_as::<_, LinkedSale>(
            r#"
            SELECT * FROM (
                SELECT 'circle' AS kind, id, sold_qty, sold_weight_kg, rate_per_kg, amount, buyer, sale_date, created_at
                FROM circle_sales WHERE order_id = $1
                UNION ALL
                SELECT 'coil', id, sold_qty, sold_weight_kg, rate_per_kg, amount, buyer, sale_date, created_at
                FROM coil_sales WHERE order_id = $1
                UNION ALL
                SELECT 'scrap', id, sold_qty, sold_weight_kg, rate_per_kg, amount, buyer, sale_date, created_at
                FROM scrap_sales WHERE order_id = $1
                UNION ALL
                SELECT 'pl', id, sold_qty, sold_weight_kg, rate_per_kg, amount, buyer, sale_date, created_at
                FROM pl_sales WHERE order_id = $1
            ) linked
            ORDER BY sale_date DESC, created_at DESC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(sales)
    }
}

/// Load an order, optionally locking its row for the rest of the transaction
pub(crate) async fn fetch_order(
    conn: &mut PgConnection,
    order_id: Uuid,
    for_update: bool,
) -> AppResult<Option<Order>> {
    let lock = if for_update { "FOR UPDATE" } else { "" };
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 {lock}"
    ))
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(order)
}

/// Synchronize an order's cached fulfillment with the sales linked to it.
///
/// Missing orders are a silent no-op (`None`). Cancelled orders are returned
/// untouched. Runs on the caller's connection so that a sale mutation and the
/// recompute it triggers commit together.
pub(crate) async fn recompute_fulfillment(
    conn: &mut PgConnection,
    order_id: Uuid,
) -> AppResult<Option<Order>> {
    let Some(order) = fetch_order(conn, order_id, true).await? else {
        tracing::debug!(order_id = %order_id, "Recompute skipped: order not found");
        return Ok(None);
    };

    let linked = sqlx::query_as::<_, (i64, Decimal)>(LINKED_SALES_SQL)
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

    let totals = FulfilledTotals::sum(linked);
    let Some(status) = recompute_status(order.is_cancelled(), &order.target(), &totals) else {
        tracing::debug!(order_id = %order_id, "Recompute skipped: order is cancelled");
        return Ok(Some(order));
    };
    tracing::debug!(
        order_id = %order_id,
        fulfilled_qty = totals.qty,
        fulfilled_weight_kg = %totals.weight_kg,
        status = %status,
        "Recomputed order fulfillment"
    );

    let refreshed = sqlx::query_as::<_, Order>(&format!(
        r#"
        UPDATE orders
        SET fulfilled_qty = $1, fulfilled_weight_kg = $2, status = $3, updated_at = NOW()
        WHERE id = $4
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(totals.qty)
    .bind(totals.weight_kg)
    .bind(status.as_str())
    .bind(order_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Some(refreshed))
}

/// Make sure a sale may be linked to the given order
pub(crate) async fn ensure_linkable(conn: &mut PgConnection, order_id: Uuid) -> AppResult<()> {
    let order = fetch_order(conn, order_id, true)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

    check_linkable(order.is_cancelled())?;
    Ok(())
}
