//! Production service: circle, patta and PL runs
//!
//! A circle run consumes coil and yields one circle stock row. A patta run
//! consumes coil and yields strip (patta). A PL run consumes patta and yields
//! one PL stock row. Scrap from every run joins the scrap pool.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{validate_qty, validate_run_weights, Availability, DateRange, RunKind, RunWeights};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::{coil_availability, patta_availability, scrap_availability};

/// Production service for recording and undoing runs
#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
}

/// Circle run record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CircleRun {
    pub id: Uuid,
    pub coil_id: Uuid,
    pub run_date: NaiveDate,
    pub input_weight_kg: Decimal,
    pub circle_size_mm: Decimal,
    pub output_qty: i64,
    pub output_weight_kg: Decimal,
    pub scrap_weight_kg: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Patta run record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PattaRun {
    pub id: Uuid,
    pub coil_id: Uuid,
    pub run_date: NaiveDate,
    pub input_weight_kg: Decimal,
    pub patta_width_mm: Option<Decimal>,
    pub output_weight_kg: Decimal,
    pub scrap_weight_kg: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// PL run record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlRun {
    pub id: Uuid,
    pub patta_run_id: Uuid,
    pub run_date: NaiveDate,
    pub input_weight_kg: Decimal,
    pub pl_size: String,
    pub output_qty: i64,
    pub output_weight_kg: Decimal,
    pub scrap_weight_kg: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A run together with its yield figures and the stock row it produced
#[derive(Debug, Clone, Serialize)]
pub struct RunRecorded<T: Serialize> {
    #[serde(flatten)]
    pub run: T,
    pub stock_id: Option<Uuid>,
    pub yield_percent: Decimal,
    pub process_loss_kg: Decimal,
}

impl<T: Serialize> RunRecorded<T> {
    fn new(run: T, stock_id: Option<Uuid>, weights: RunWeights) -> Self {
        Self {
            run,
            stock_id,
            yield_percent: weights.yield_percent(),
            process_loss_kg: weights.process_loss_kg(),
        }
    }
}

/// Input for recording a circle run
#[derive(Debug, Deserialize)]
pub struct CreateCircleRunInput {
    #[serde(alias = "coilId")]
    pub coil_id: Uuid,
    #[serde(alias = "runDate", alias = "date")]
    pub run_date: Option<NaiveDate>,
    #[serde(alias = "inputWeightKg", alias = "input_weight")]
    pub input_weight_kg: Decimal,
    #[serde(alias = "circleSizeMm", alias = "size_mm", alias = "size")]
    pub circle_size_mm: Decimal,
    #[serde(alias = "outputQty", alias = "qty", alias = "pieces")]
    pub output_qty: i64,
    #[serde(alias = "outputWeightKg", alias = "output_weight")]
    pub output_weight_kg: Decimal,
    #[serde(alias = "scrapWeightKg", alias = "scrap_weight")]
    pub scrap_weight_kg: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for recording a patta run
#[derive(Debug, Deserialize)]
pub struct CreatePattaRunInput {
    #[serde(alias = "coilId")]
    pub coil_id: Uuid,
    #[serde(alias = "runDate", alias = "date")]
    pub run_date: Option<NaiveDate>,
    #[serde(alias = "inputWeightKg", alias = "input_weight")]
    pub input_weight_kg: Decimal,
    #[serde(alias = "pattaWidthMm", alias = "width_mm", alias = "width")]
    pub patta_width_mm: Option<Decimal>,
    #[serde(alias = "outputWeightKg", alias = "output_weight")]
    pub output_weight_kg: Decimal,
    #[serde(alias = "scrapWeightKg", alias = "scrap_weight")]
    pub scrap_weight_kg: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for recording a PL run
#[derive(Debug, Deserialize)]
pub struct CreatePlRunInput {
    #[serde(alias = "pattaRunId", alias = "patta_id")]
    pub patta_run_id: Uuid,
    #[serde(alias = "runDate", alias = "date")]
    pub run_date: Option<NaiveDate>,
    #[serde(alias = "inputWeightKg", alias = "input_weight")]
    pub input_weight_kg: Decimal,
    #[serde(alias = "plSize", alias = "size")]
    pub pl_size: String,
    #[serde(alias = "outputQty", alias = "qty", alias = "pieces")]
    pub output_qty: i64,
    #[serde(alias = "outputWeightKg", alias = "output_weight")]
    pub output_weight_kg: Decimal,
    #[serde(alias = "scrapWeightKg", alias = "scrap_weight")]
    pub scrap_weight_kg: Option<Decimal>,
    pub notes: Option<String>,
}

/// Filter for run listings
#[derive(Debug, Default, Deserialize)]
pub struct RunFilter {
    pub coil_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RunFilter {
    fn range(&self) -> DateRange {
        DateRange::from_bounds(self.start_date, self.end_date)
    }
}

fn check_weights(weights: &RunWeights, qty: Option<i64>) -> AppResult<()> {
    validate_run_weights(weights).map_err(|m| AppError::invalid("weights", m))?;
    if let Some(qty) = qty {
        validate_qty(qty).map_err(|m| AppError::invalid("output_qty", m))?;
    }
    Ok(())
}

fn check_supply(kind: RunKind, available: &Availability, input_weight_kg: Decimal) -> AppResult<()> {
    if input_weight_kg > available.available_weight_kg() {
        return Err(AppError::InsufficientStock(format!(
            "{} run needs {} kg but only {} kg is available",
            kind,
            input_weight_kg,
            available.available_weight_kg()
        )));
    }
    Ok(())
}

/// Removing a run takes its scrap out of the pool; refuse when that scrap is already sold
fn check_scrap_release(kind: RunKind, scrap_pool: &Availability, run_scrap_kg: Decimal) -> AppResult<()> {
    let left = scrap_pool.available_weight_kg() - run_scrap_kg;
    if left < Decimal::ZERO {
        return Err(AppError::conflict(
            &format!("{}_run", kind.as_str()),
            format!("{} kg of the scrap from this run has already been sold", -left),
        ));
    }
    Ok(())
}

/// Lock the scrap pool and check the run's scrap can leave it. A missing run
/// passes; the delete itself reports it.
async fn release_scrap(conn: &mut PgConnection, kind: RunKind, run_id: Uuid) -> AppResult<()> {
    let scrap_pool = scrap_availability(conn).await?;

    let scrap_kg = sqlx::query_scalar::<_, Decimal>(&format!(
        "SELECT scrap_weight_kg FROM {} WHERE id = $1 FOR UPDATE",
        kind.table()
    ))
    .bind(run_id)
    .fetch_optional(&mut *conn)
    .await?;

    match scrap_kg {
        Some(kg) => check_scrap_release(kind, &scrap_pool, kg),
        None => Ok(()),
    }
}

/// Grade and thickness of a coil, copied onto stock rows cut from it
async fn coil_spec(conn: &mut PgConnection, coil_id: Uuid) -> AppResult<(String, Decimal)> {
    let spec = sqlx::query_as::<_, (String, Decimal)>("SELECT grade, thickness_mm FROM coils WHERE id = $1")
        .bind(coil_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(spec)
}

impl ProductionService {
    /// Create a new ProductionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------------
    // Circle runs
    // ------------------------------------------------------------------------

    /// Record a circle run and the circle stock it produced
    pub async fn create_circle_run(&self, input: CreateCircleRunInput) -> AppResult<RunRecorded<CircleRun>> {
        let weights = RunWeights::new(
            input.input_weight_kg,
            input.output_weight_kg,
            input.scrap_weight_kg.unwrap_or(Decimal::ZERO),
        );
        check_weights(&weights, Some(input.output_qty))?;
        if input.circle_size_mm <= Decimal::ZERO {
            return Err(AppError::invalid("circle_size_mm", "Circle size must be positive"));
        }

        let mut tx = self.db.begin().await?;
        let available = coil_availability(&mut tx, input.coil_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Coil".to_string()))?;
        check_supply(RunKind::Circle, &available, weights.input_weight_kg)?;

        let run_date = input.run_date.unwrap_or_else(|| Utc::now().date_naive());
        let run = sqlx::query_as::<_, CircleRun>(
            r#"
            INSERT INTO circle_runs (
                coil_id, run_date, input_weight_kg, circle_size_mm, output_qty,
                output_weight_kg, scrap_weight_kg, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, coil_id, run_date, input_weight_kg, circle_size_mm, output_qty,
                      output_weight_kg, scrap_weight_kg, notes, created_at
            "#,
        )
        .bind(input.coil_id)
        .bind(run_date)
        .bind(weights.input_weight_kg)
        .bind(input.circle_size_mm)
        .bind(input.output_qty)
        .bind(weights.output_weight_kg)
        .bind(weights.scrap_weight_kg)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        let (grade, thickness_mm) = coil_spec(&mut tx, input.coil_id).await?;
        let stock_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO circle_stock (
                circle_run_id, coil_id, grade, thickness_mm, size_mm, initial_qty, initial_weight_kg
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(run.id)
        .bind(run.coil_id)
        .bind(&grade)
        .bind(thickness_mm)
        .bind(run.circle_size_mm)
        .bind(run.output_qty)
        .bind(run.output_weight_kg)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            run_id = %run.id,
            coil_id = %run.coil_id,
            output_qty = run.output_qty,
            yield_percent = %weights.yield_percent(),
            "Circle run recorded"
        );
        Ok(RunRecorded::new(run, Some(stock_id), weights))
    }

    /// List circle runs
    pub async fn list_circle_runs(&self, filter: &RunFilter) -> AppResult<Vec<CircleRun>> {
        let range = filter.range();
        let runs = sqlx::query_as::<_, CircleRun>(
            r#"
            SELECT id, coil_id, run_date, input_weight_kg, circle_size_mm, output_qty,
                   output_weight_kg, scrap_weight_kg, notes, created_at
            FROM circle_runs
            WHERE ($1::UUID IS NULL OR coil_id = $1)
              AND run_date BETWEEN $2 AND $3
            ORDER BY run_date DESC, created_at DESC
            "#,
        )
        .bind(filter.coil_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(runs)
    }

    /// Get a circle run with its yield figures
    pub async fn get_circle_run(&self, run_id: Uuid) -> AppResult<RunRecorded<CircleRun>> {
        let run = sqlx::query_as::<_, CircleRun>(
            r#"
            SELECT id, coil_id, run_date, input_weight_kg, circle_size_mm, output_qty,
                   output_weight_kg, scrap_weight_kg, notes, created_at
            FROM circle_runs
            WHERE id = $1
            "#,
        )
        .bind(run_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Circle run".to_string()))?;

        let stock_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM circle_stock WHERE circle_run_id = $1")
            .bind(run_id)
            .fetch_optional(&self.db)
            .await?;

        let weights = RunWeights::new(run.input_weight_kg, run.output_weight_kg, run.scrap_weight_kg);
        Ok(RunRecorded::new(run, stock_id, weights))
    }

    /// Undo a circle run. Refused once any of its circles has been sold.
    pub async fn delete_circle_run(&self, run_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let sold = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM circle_sales s
                JOIN circle_stock st ON st.id = s.circle_stock_id
                WHERE st.circle_run_id = $1
            )
            "#,
        )
        .bind(run_id)
        .fetch_one(&mut *tx)
        .await?;

        if sold {
            return Err(AppError::conflict(
                "circle_run",
                "Circles from this run have already been sold",
            ));
        }
        release_scrap(&mut tx, RunKind::Circle, run_id).await?;

        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", RunKind::Circle.table()))
            .bind(run_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Circle run".to_string()));
        }
        tx.commit().await?;

        tracing::info!(run_id = %run_id, "Circle run deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Patta runs
    // ------------------------------------------------------------------------

    /// Record a patta run
    pub async fn create_patta_run(&self, input: CreatePattaRunInput) -> AppResult<RunRecorded<PattaRun>> {
        let weights = RunWeights::new(
            input.input_weight_kg,
            input.output_weight_kg,
            input.scrap_weight_kg.unwrap_or(Decimal::ZERO),
        );
        check_weights(&weights, None)?;

        let mut tx = self.db.begin().await?;
        let available = coil_availability(&mut tx, input.coil_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Coil".to_string()))?;
        check_supply(RunKind::Patta, &available, weights.input_weight_kg)?;

        let run_date = input.run_date.unwrap_or_else(|| Utc::now().date_naive());
        let run = sqlx::query_as::<_, PattaRun>(
            r#"
            INSERT INTO patta_runs (
                coil_id, run_date, input_weight_kg, patta_width_mm, output_weight_kg,
                scrap_weight_kg, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, coil_id, run_date, input_weight_kg, patta_width_mm, output_weight_kg,
                      scrap_weight_kg, notes, created_at
            "#,
        )
        .bind(input.coil_id)
        .bind(run_date)
        .bind(weights.input_weight_kg)
        .bind(input.patta_width_mm)
        .bind(weights.output_weight_kg)
        .bind(weights.scrap_weight_kg)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(run_id = %run.id, coil_id = %run.coil_id, "Patta run recorded");
        Ok(RunRecorded::new(run, None, weights))
    }

    /// List patta runs
    pub async fn list_patta_runs(&self, filter: &RunFilter) -> AppResult<Vec<PattaRun>> {
        let range = filter.range();
        let runs = sqlx::query_as::<_, PattaRun>(
            r#"
            SELECT id, coil_id, run_date, input_weight_kg, patta_width_mm, output_weight_kg,
                   scrap_weight_kg, notes, created_at
            FROM patta_runs
            WHERE ($1::UUID IS NULL OR coil_id = $1)
              AND run_date BETWEEN $2 AND $3
            ORDER BY run_date DESC, created_at DESC
            "#,
        )
        .bind(filter.coil_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(runs)
    }

    /// Undo a patta run. Refused once PL has been cut from it.
    pub async fn delete_patta_run(&self, run_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let consumed = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM pl_runs WHERE patta_run_id = $1)",
        )
        .bind(run_id)
        .fetch_one(&mut *tx)
        .await?;

        if consumed {
            return Err(AppError::conflict(
                "patta_run",
                "PL has already been cut from this patta",
            ));
        }
        release_scrap(&mut tx, RunKind::Patta, run_id).await?;

        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", RunKind::Patta.table()))
            .bind(run_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Patta run".to_string()));
        }
        tx.commit().await?;

        tracing::info!(run_id = %run_id, "Patta run deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // PL runs
    // ------------------------------------------------------------------------

    /// Record a PL run and the PL stock it produced
    pub async fn create_pl_run(&self, input: CreatePlRunInput) -> AppResult<RunRecorded<PlRun>> {
        let weights = RunWeights::new(
            input.input_weight_kg,
            input.output_weight_kg,
            input.scrap_weight_kg.unwrap_or(Decimal::ZERO),
        );
        check_weights(&weights, Some(input.output_qty))?;
        let pl_size = input.pl_size.trim();
        if pl_size.is_empty() {
            return Err(AppError::invalid("pl_size", "PL size is required"));
        }

        let mut tx = self.db.begin().await?;
        let available = patta_availability(&mut tx, input.patta_run_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Patta run".to_string()))?;
        check_supply(RunKind::Pl, &available, weights.input_weight_kg)?;

        let run_date = input.run_date.unwrap_or_else(|| Utc::now().date_naive());
        let run = sqlx::query_as::<_, PlRun>(
            r#"
            INSERT INTO pl_runs (
                patta_run_id, run_date, input_weight_kg, pl_size, output_qty,
                output_weight_kg, scrap_weight_kg, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, patta_run_id, run_date, input_weight_kg, pl_size, output_qty,
                      output_weight_kg, scrap_weight_kg, notes, created_at
            "#,
        )
        .bind(input.patta_run_id)
        .bind(run_date)
        .bind(weights.input_weight_kg)
        .bind(pl_size)
        .bind(input.output_qty)
        .bind(weights.output_weight_kg)
        .bind(weights.scrap_weight_kg)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        let coil_id = sqlx::query_scalar::<_, Uuid>("SELECT coil_id FROM patta_runs WHERE id = $1")
            .bind(input.patta_run_id)
            .fetch_one(&mut *tx)
            .await?;
        let (grade, thickness_mm) = coil_spec(&mut tx, coil_id).await?;

        let stock_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO pl_stock (
                pl_run_id, coil_id, grade, thickness_mm, size, initial_qty, initial_weight_kg
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(run.id)
        .bind(coil_id)
        .bind(&grade)
        .bind(thickness_mm)
        .bind(&run.pl_size)
        .bind(run.output_qty)
        .bind(run.output_weight_kg)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(run_id = %run.id, patta_run_id = %run.patta_run_id, "PL run recorded");
        Ok(RunRecorded::new(run, Some(stock_id), weights))
    }

    /// List PL runs
    pub async fn list_pl_runs(&self, filter: &RunFilter) -> AppResult<Vec<PlRun>> {
        let range = filter.range();
        let runs = sqlx::query_as::<_, PlRun>(
            r#"
            SELECT l.id, l.patta_run_id, l.run_date, l.input_weight_kg, l.pl_size, l.output_qty,
                   l.output_weight_kg, l.scrap_weight_kg, l.notes, l.created_at
            FROM pl_runs l
            JOIN patta_runs p ON p.id = l.patta_run_id
            WHERE ($1::UUID IS NULL OR p.coil_id = $1)
              AND l.run_date BETWEEN $2 AND $3
            ORDER BY l.run_date DESC, l.created_at DESC
            "#,
        )
        .bind(filter.coil_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(runs)
    }

    /// Undo a PL run. Refused once any of its PL has been sold.
    pub async fn delete_pl_run(&self, run_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let sold = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM pl_sales s
                JOIN pl_stock st ON st.id = s.pl_stock_id
                WHERE st.pl_run_id = $1
            )
            "#,
        )
        .bind(run_id)
        .fetch_one(&mut *tx)
        .await?;

        if sold {
            return Err(AppError::conflict("pl_run", "PL from this run has already been sold"));
        }
        release_scrap(&mut tx, RunKind::Pl, run_id).await?;

        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", RunKind::Pl.table()))
            .bind(run_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("PL run".to_string()));
        }
        tx.commit().await?;

        tracing::info!(run_id = %run_id, "PL run deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_run_input_accepts_aliases() {
        let input: CreateCircleRunInput = serde_json::from_value(serde_json::json!({
            "coilId": "5f0c6f62-2a55-4b36-8f40-3a4a3c0b8d11",
            "inputWeightKg": 1000,
            "circleSizeMm": 250,
            "pieces": 640,
            "outputWeightKg": 780,
            "scrapWeightKg": 200
        }))
        .unwrap();

        assert_eq!(input.output_qty, 640);
        assert_eq!(input.scrap_weight_kg, Some(Decimal::from(200)));
        assert!(input.run_date.is_none());
    }

    #[test]
    fn unbalanced_run_is_rejected() {
        let weights = RunWeights::new(Decimal::from(100), Decimal::from(90), Decimal::from(20));
        assert!(matches!(
            check_weights(&weights, Some(5)),
            Err(AppError::Validation { field, .. }) if field == "weights"
        ));
    }

    #[test]
    fn negative_pieces_are_rejected() {
        let weights = RunWeights::new(Decimal::from(100), Decimal::from(90), Decimal::from(5));
        assert!(check_weights(&weights, Some(-1)).is_err());
        assert!(check_weights(&weights, None).is_ok());
    }

    #[test]
    fn supply_check_reports_shortfall() {
        let available = Availability {
            initial_weight_kg: Decimal::from(500),
            consumed_weight_kg: Decimal::from(450),
            ..Default::default()
        };
        let err = check_supply(RunKind::Circle, &available, Decimal::from(60)).unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(msg) if msg.contains("50 kg")));
        assert!(check_supply(RunKind::Circle, &available, Decimal::from(50)).is_ok());
    }

    #[test]
    fn sold_scrap_blocks_run_delete() {
        // 200 kg produced by the run, 150 kg of it sold
        let pool = Availability {
            initial_weight_kg: Decimal::from(200),
            consumed_weight_kg: Decimal::from(150),
            ..Default::default()
        };
        let err = check_scrap_release(RunKind::Circle, &pool, Decimal::from(200)).unwrap_err();
        assert!(matches!(
            err,
            AppError::Conflict { ref resource, ref message }
                if resource == "circle_run" && message.starts_with("150 kg")
        ));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[test]
    fn unsold_scrap_can_leave_the_pool() {
        // Pool holds 500 kg from several runs, 300 kg sold; this run made 200 kg
        let pool = Availability {
            initial_weight_kg: Decimal::from(500),
            consumed_weight_kg: Decimal::from(300),
            ..Default::default()
        };
        assert!(check_scrap_release(RunKind::Patta, &pool, Decimal::from(200)).is_ok());
        assert!(check_scrap_release(RunKind::Pl, &pool, Decimal::ZERO).is_ok());
        assert!(check_scrap_release(RunKind::Pl, &pool, Decimal::new(2000001, 4)).is_err());
    }
}
