//! Stock service: derived availability for coils, circles, patta, PL and scrap
//!
//! No stock table stores a running balance. Every figure here is the
//! initial amount minus the runs and sales that reference it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::Availability;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::AppResult;

/// Stock service for availability queries
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Coil stock row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CoilStock {
    pub coil_id: Uuid,
    pub coil_number: String,
    pub grade: String,
    pub thickness_mm: Decimal,
    pub purchase_date: NaiveDate,
    pub initial_weight_kg: Decimal,
    pub processed_weight_kg: Decimal,
    pub sold_weight_kg: Decimal,
    pub available_weight_kg: Decimal,
}

/// Circle stock row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CircleStock {
    pub id: Uuid,
    pub circle_run_id: Uuid,
    pub coil_id: Uuid,
    pub coil_number: String,
    pub grade: String,
    pub thickness_mm: Decimal,
    pub size_mm: Decimal,
    pub initial_qty: i64,
    pub initial_weight_kg: Decimal,
    pub sold_qty: i64,
    pub sold_weight_kg: Decimal,
    pub available_qty: i64,
    pub available_weight_kg: Decimal,
}

/// Patta (strip) stock row, one per patta run
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PattaStock {
    pub patta_run_id: Uuid,
    pub coil_id: Uuid,
    pub coil_number: String,
    pub grade: String,
    pub thickness_mm: Decimal,
    pub patta_width_mm: Option<Decimal>,
    pub run_date: NaiveDate,
    pub initial_weight_kg: Decimal,
    pub consumed_weight_kg: Decimal,
    pub available_weight_kg: Decimal,
}

/// PL stock row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlStock {
    pub id: Uuid,
    pub pl_run_id: Uuid,
    pub coil_id: Uuid,
    pub coil_number: String,
    pub grade: String,
    pub thickness_mm: Decimal,
    pub size: String,
    pub initial_qty: i64,
    pub initial_weight_kg: Decimal,
    pub sold_qty: i64,
    pub sold_weight_kg: Decimal,
    pub available_qty: i64,
    pub available_weight_kg: Decimal,
}

/// Pooled scrap position
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ScrapStock {
    pub from_circle_runs_kg: Decimal,
    pub from_patta_runs_kg: Decimal,
    pub from_pl_runs_kg: Decimal,
    pub produced_kg: Decimal,
    pub sold_kg: Decimal,
    pub available_kg: Decimal,
}

/// Query parameters for stock listings
#[derive(Debug, Default, Deserialize)]
pub struct StockFilter {
    /// Hide rows with nothing left
    pub available_only: Option<bool>,
}

impl StockFilter {
    fn available_only(&self) -> bool {
        self.available_only.unwrap_or(false)
    }
}

pub(crate) const COIL_STOCK_SQL: &str = r#"
    SELECT c.id AS coil_id, c.coil_number, c.grade, c.thickness_mm, c.purchase_date,
           c.weight_kg AS initial_weight_kg,
           (COALESCE(cr.input_kg, 0) + COALESCE(pr.input_kg, 0))::NUMERIC AS processed_weight_kg,
           COALESCE(cs.sold_kg, 0)::NUMERIC AS sold_weight_kg,
           (c.weight_kg - COALESCE(cr.input_kg, 0) - COALESCE(pr.input_kg, 0) - COALESCE(cs.sold_kg, 0))::NUMERIC
               AS available_weight_kg
    FROM coils c
    LEFT JOIN (SELECT coil_id, SUM(input_weight_kg) AS input_kg FROM circle_runs GROUP BY coil_id) cr
           ON cr.coil_id = c.id
    LEFT JOIN (SELECT coil_id, SUM(input_weight_kg) AS input_kg FROM patta_runs GROUP BY coil_id) pr
           ON pr.coil_id = c.id
    LEFT JOIN (SELECT coil_id, SUM(sold_weight_kg) AS sold_kg FROM coil_sales GROUP BY coil_id) cs
           ON cs.coil_id = c.id
"#;

pub(crate) const CIRCLE_STOCK_SQL: &str = r#"
    SELECT st.id, st.circle_run_id, st.coil_id, c.coil_number, st.grade, st.thickness_mm, st.size_mm,
           st.initial_qty, st.initial_weight_kg,
           COALESCE(s.sold_qty, 0)::BIGINT AS sold_qty,
           COALESCE(s.sold_kg, 0)::NUMERIC AS sold_weight_kg,
           (st.initial_qty - COALESCE(s.sold_qty, 0))::BIGINT AS available_qty,
           (st.initial_weight_kg - COALESCE(s.sold_kg, 0))::NUMERIC AS available_weight_kg
    FROM circle_stock st
    JOIN coils c ON c.id = st.coil_id
    LEFT JOIN (
        SELECT circle_stock_id, SUM(sold_qty) AS sold_qty, SUM(sold_weight_kg) AS sold_kg
        FROM circle_sales GROUP BY circle_stock_id
    ) s ON s.circle_stock_id = st.id
"#;

pub(crate) const PATTA_STOCK_SQL: &str = r#"
    SELECT p.id AS patta_run_id, p.coil_id, c.coil_number, c.grade, c.thickness_mm, p.patta_width_mm,
           p.run_date, p.output_weight_kg AS initial_weight_kg,
           COALESCE(l.input_kg, 0)::NUMERIC AS consumed_weight_kg,
           (p.output_weight_kg - COALESCE(l.input_kg, 0))::NUMERIC AS available_weight_kg
    FROM patta_runs p
    JOIN coils c ON c.id = p.coil_id
    LEFT JOIN (SELECT patta_run_id, SUM(input_weight_kg) AS input_kg FROM pl_runs GROUP BY patta_run_id) l
           ON l.patta_run_id = p.id
"#;

pub(crate) const PL_STOCK_SQL: &str = r#"
    SELECT st.id, st.pl_run_id, st.coil_id, c.coil_number, st.grade, st.thickness_mm, st.size,
           st.initial_qty, st.initial_weight_kg,
           COALESCE(s.sold_qty, 0)::BIGINT AS sold_qty,
           COALESCE(s.sold_kg, 0)::NUMERIC AS sold_weight_kg,
           (st.initial_qty - COALESCE(s.sold_qty, 0))::BIGINT AS available_qty,
           (st.initial_weight_kg - COALESCE(s.sold_kg, 0))::NUMERIC AS available_weight_kg
    FROM pl_stock st
    JOIN coils c ON c.id = st.coil_id
    LEFT JOIN (
        SELECT pl_stock_id, SUM(sold_qty) AS sold_qty, SUM(sold_weight_kg) AS sold_kg
        FROM pl_sales GROUP BY pl_stock_id
    ) s ON s.pl_stock_id = st.id
"#;

pub(crate) const SCRAP_STOCK_SQL: &str = r#"
    SELECT cr.kg AS from_circle_runs_kg,
           pr.kg AS from_patta_runs_kg,
           lr.kg AS from_pl_runs_kg,
           (cr.kg + pr.kg + lr.kg)::NUMERIC AS produced_kg,
           ss.kg AS sold_kg,
           (cr.kg + pr.kg + lr.kg - ss.kg)::NUMERIC AS available_kg
    FROM (SELECT COALESCE(SUM(scrap_weight_kg), 0)::NUMERIC AS kg FROM circle_runs) cr,
         (SELECT COALESCE(SUM(scrap_weight_kg), 0)::NUMERIC AS kg FROM patta_runs) pr,
         (SELECT COALESCE(SUM(scrap_weight_kg), 0)::NUMERIC AS kg FROM pl_runs) lr,
         (SELECT COALESCE(SUM(sold_weight_kg), 0)::NUMERIC AS kg FROM scrap_sales) ss
"#;

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Coil stock, newest purchase first
    pub async fn list_coil_stock(&self, filter: &StockFilter) -> AppResult<Vec<CoilStock>> {
        let rows = sqlx::query_as::<_, CoilStock>(&format!(
            "SELECT * FROM ({COIL_STOCK_SQL}) s WHERE NOT $1 OR s.available_weight_kg > 0 \
             ORDER BY s.purchase_date DESC, s.coil_number"
        ))
        .bind(filter.available_only())
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Circle stock grouped by run
    pub async fn list_circle_stock(&self, filter: &StockFilter) -> AppResult<Vec<CircleStock>> {
        let rows = sqlx::query_as::<_, CircleStock>(&format!(
            "SELECT * FROM ({CIRCLE_STOCK_SQL}) s WHERE NOT $1 OR s.available_weight_kg > 0 \
             ORDER BY s.size_mm, s.coil_number"
        ))
        .bind(filter.available_only())
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Patta stock, one row per patta run
    pub async fn list_patta_stock(&self, filter: &StockFilter) -> AppResult<Vec<PattaStock>> {
        let rows = sqlx::query_as::<_, PattaStock>(&format!(
            "SELECT * FROM ({PATTA_STOCK_SQL}) s WHERE NOT $1 OR s.available_weight_kg > 0 \
             ORDER BY s.run_date DESC"
        ))
        .bind(filter.available_only())
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// PL stock grouped by run
    pub async fn list_pl_stock(&self, filter: &StockFilter) -> AppResult<Vec<PlStock>> {
        let rows = sqlx::query_as::<_, PlStock>(&format!(
            "SELECT * FROM ({PL_STOCK_SQL}) s WHERE NOT $1 OR s.available_weight_kg > 0 \
             ORDER BY s.size, s.coil_number"
        ))
        .bind(filter.available_only())
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Pooled scrap position
    pub async fn get_scrap_stock(&self) -> AppResult<ScrapStock> {
        let row = sqlx::query_as::<_, ScrapStock>(SCRAP_STOCK_SQL)
            .fetch_one(&self.db)
            .await?;

        Ok(row)
    }
}

// ============================================================================
// Availability checks used inside write transactions
// ============================================================================
//
// Each check first locks the source row so that two writers drawing on the
// same stock serialize; the aggregate is then read under that lock.

/// Availability of a coil, `None` if the coil does not exist
pub(crate) async fn coil_availability(
    conn: &mut PgConnection,
    coil_id: Uuid,
) -> AppResult<Option<Availability>> {
    let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM coils WHERE id = $1 FOR UPDATE")
        .bind(coil_id)
        .fetch_optional(&mut *conn)
        .await?;
    if locked.is_none() {
        return Ok(None);
    }

    let row = sqlx::query_as::<_, CoilStock>(&format!("{COIL_STOCK_SQL} WHERE c.id = $1"))
        .bind(coil_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(Some(Availability {
        initial_qty: 0,
        initial_weight_kg: row.initial_weight_kg,
        consumed_qty: 0,
        consumed_weight_kg: row.processed_weight_kg + row.sold_weight_kg,
    }))
}

/// Availability of a patta run's output, `None` if the run does not exist
pub(crate) async fn patta_availability(
    conn: &mut PgConnection,
    patta_run_id: Uuid,
) -> AppResult<Option<Availability>> {
    let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM patta_runs WHERE id = $1 FOR UPDATE")
        .bind(patta_run_id)
        .fetch_optional(&mut *conn)
        .await?;
    if locked.is_none() {
        return Ok(None);
    }

    let row = sqlx::query_as::<_, PattaStock>(&format!("{PATTA_STOCK_SQL} WHERE p.id = $1"))
        .bind(patta_run_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(Some(Availability {
        initial_qty: 0,
        initial_weight_kg: row.initial_weight_kg,
        consumed_qty: 0,
        consumed_weight_kg: row.consumed_weight_kg,
    }))
}

/// Availability of a circle stock row
pub(crate) async fn circle_availability(
    conn: &mut PgConnection,
    circle_stock_id: Uuid,
) -> AppResult<Option<Availability>> {
    let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM circle_stock WHERE id = $1 FOR UPDATE")
        .bind(circle_stock_id)
        .fetch_optional(&mut *conn)
        .await?;
    if locked.is_none() {
        return Ok(None);
    }

    let row = sqlx::query_as::<_, CircleStock>(&format!("{CIRCLE_STOCK_SQL} WHERE st.id = $1"))
        .bind(circle_stock_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(Some(Availability {
        initial_qty: row.initial_qty,
        initial_weight_kg: row.initial_weight_kg,
        consumed_qty: row.sold_qty,
        consumed_weight_kg: row.sold_weight_kg,
    }))
}

/// Availability of a PL stock row
pub(crate) async fn pl_availability(
    conn: &mut PgConnection,
    pl_stock_id: Uuid,
) -> AppResult<Option<Availability>> {
    let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM pl_stock WHERE id = $1 FOR UPDATE")
        .bind(pl_stock_id)
        .fetch_optional(&mut *conn)
        .await?;
    if locked.is_none() {
        return Ok(None);
    }

    let row = sqlx::query_as::<_, PlStock>(&format!("{PL_STOCK_SQL} WHERE st.id = $1"))
        .bind(pl_stock_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(Some(Availability {
        initial_qty: row.initial_qty,
        initial_weight_kg: row.initial_weight_kg,
        consumed_qty: row.sold_qty,
        consumed_weight_kg: row.sold_weight_kg,
    }))
}

/// Availability of the scrap pool. Scrap has no row to lock, so writers take
/// a transaction-scoped advisory lock instead.
pub(crate) async fn scrap_availability(conn: &mut PgConnection) -> AppResult<Availability> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext('scrap_pool'))")
        .execute(&mut *conn)
        .await?;

    let row = sqlx::query_as::<_, ScrapStock>(SCRAP_STOCK_SQL)
        .fetch_one(&mut *conn)
        .await?;

    Ok(Availability {
        initial_qty: 0,
        initial_weight_kg: row.produced_kg,
        consumed_qty: 0,
        consumed_weight_kg: row.sold_kg,
    })
}
