//! Coil service: purchase register for raw coils

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{validate_positive_weight, validate_rate, validate_thickness, Coil};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::stock::{coil_availability, COIL_STOCK_SQL};

const COIL_COLUMNS: &str = r#"
    id, coil_number, grade, thickness_mm, width_mm, supplier, purchase_date,
    weight_kg, rate_per_kg, notes, created_at, updated_at
"#;

/// Coil service for the purchase register
#[derive(Clone)]
pub struct CoilService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct CoilRow {
    id: Uuid,
    coil_number: String,
    grade: String,
    thickness_mm: Decimal,
    width_mm: Option<Decimal>,
    supplier: Option<String>,
    purchase_date: NaiveDate,
    weight_kg: Decimal,
    rate_per_kg: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CoilRow> for Coil {
    fn from(row: CoilRow) -> Self {
        Coil {
            id: row.id,
            coil_number: row.coil_number,
            grade: row.grade,
            thickness_mm: row.thickness_mm,
            width_mm: row.width_mm,
            supplier: row.supplier,
            purchase_date: row.purchase_date,
            weight_kg: row.weight_kg,
            rate_per_kg: row.rate_per_kg,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CoilListRow {
    #[sqlx(flatten)]
    coil: CoilRow,
    consumed_weight_kg: Decimal,
    available_weight_kg: Decimal,
}

/// Coil with its purchase cost and what is left of it
#[derive(Debug, Serialize)]
pub struct CoilDetail {
    #[serde(flatten)]
    pub coil: Coil,
    pub purchase_cost: Decimal,
    pub consumed_weight_kg: Decimal,
    pub available_weight_kg: Decimal,
}

/// Input for registering a coil
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCoilInput {
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    #[serde(alias = "coilNumber", alias = "coil_no", alias = "coilNo")]
    pub coil_number: String,
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub grade: String,
    #[serde(alias = "thicknessMm", alias = "thickness")]
    pub thickness_mm: Decimal,
    #[serde(default, alias = "widthMm", alias = "width")]
    pub width_mm: Option<Decimal>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub supplier: Option<String>,
    #[serde(default, alias = "purchaseDate", alias = "date")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(alias = "weightKg", alias = "weight")]
    pub weight_kg: Decimal,
    #[serde(default, alias = "ratePerKg", alias = "rate")]
    pub rate_per_kg: Option<Decimal>,
    pub notes: Option<String>,
}

/// Input for editing a coil; absent fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCoilInput {
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    #[serde(default, alias = "coilNumber", alias = "coil_no", alias = "coilNo")]
    pub coil_number: Option<String>,
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub grade: Option<String>,
    #[serde(default, alias = "thicknessMm", alias = "thickness")]
    pub thickness_mm: Option<Decimal>,
    #[serde(default, alias = "widthMm", alias = "width")]
    pub width_mm: Option<Decimal>,
    pub supplier: Option<String>,
    #[serde(default, alias = "purchaseDate", alias = "date")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default, alias = "weightKg", alias = "weight")]
    pub weight_kg: Option<Decimal>,
    #[serde(default, alias = "ratePerKg", alias = "rate")]
    pub rate_per_kg: Option<Decimal>,
    pub notes: Option<String>,
}

fn check_measurements(thickness_mm: Decimal, weight_kg: Decimal, rate_per_kg: Decimal) -> AppResult<()> {
    validate_thickness(thickness_mm).map_err(|m| AppError::invalid("thickness_mm", m))?;
    validate_positive_weight(weight_kg).map_err(|m| AppError::invalid("weight_kg", m))?;
    validate_rate(rate_per_kg).map_err(|m| AppError::invalid("rate_per_kg", m))?;
    Ok(())
}

impl CoilService {
    /// Create a new CoilService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List coils, newest purchase first, with what is left of each
    pub async fn list_coils(&self) -> AppResult<Vec<CoilDetail>> {
        let rows = sqlx::query_as::<_, CoilListRow>(&format!(
            r#"
            SELECT c.id, c.coil_number, c.grade, c.thickness_mm, c.width_mm, c.supplier,
                   c.purchase_date, c.weight_kg, c.rate_per_kg, c.notes, c.created_at, c.updated_at,
                   (s.processed_weight_kg + s.sold_weight_kg)::NUMERIC AS consumed_weight_kg,
                   s.available_weight_kg
            FROM coils c
            JOIN ({COIL_STOCK_SQL}) s ON s.coil_id = c.id
            ORDER BY c.purchase_date DESC, c.coil_number
            "#
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let coil = Coil::from(row.coil);
                CoilDetail {
                    purchase_cost: coil.purchase_cost(),
                    consumed_weight_kg: row.consumed_weight_kg,
                    available_weight_kg: row.available_weight_kg,
                    coil,
                }
            })
            .collect())
    }

    /// Get a coil with its availability
    pub async fn get_coil(&self, coil_id: Uuid) -> AppResult<CoilDetail> {
        let mut tx = self.db.begin().await?;

        let available = coil_availability(&mut tx, coil_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Coil".to_string()))?;
        let row = sqlx::query_as::<_, CoilRow>(&format!("SELECT {COIL_COLUMNS} FROM coils WHERE id = $1"))
            .bind(coil_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let coil = Coil::from(row);
        Ok(CoilDetail {
            purchase_cost: coil.purchase_cost(),
            consumed_weight_kg: available.consumed_weight_kg,
            available_weight_kg: available.available_weight_kg(),
            coil,
        })
    }

    /// Register a purchased coil
    pub async fn create_coil(&self, input: CreateCoilInput) -> AppResult<Coil> {
        input.validate()?;
        let rate_per_kg = input.rate_per_kg.unwrap_or(Decimal::ZERO);
        check_measurements(input.thickness_mm, input.weight_kg, rate_per_kg)?;

        let row = sqlx::query_as::<_, CoilRow>(&format!(
            r#"
            INSERT INTO coils (
                coil_number, grade, thickness_mm, width_mm, supplier, purchase_date,
                weight_kg, rate_per_kg, notes
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, CURRENT_DATE), $7, $8, $9)
            RETURNING {COIL_COLUMNS}
            "#
        ))
        .bind(input.coil_number.trim())
        .bind(input.grade.trim())
        .bind(input.thickness_mm)
        .bind(input.width_mm)
        .bind(&input.supplier)
        .bind(input.purchase_date)
        .bind(input.weight_kg)
        .bind(rate_per_kg)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(coil_id = %row.id, coil_number = %row.coil_number, "Coil registered");
        Ok(row.into())
    }

    /// Edit a coil. Its weight may not drop below what runs and sales have
    /// already taken from it.
    pub async fn update_coil(&self, coil_id: Uuid, input: UpdateCoilInput) -> AppResult<Coil> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let available = coil_availability(&mut tx, coil_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Coil".to_string()))?;
        let current = sqlx::query_as::<_, CoilRow>(&format!("SELECT {COIL_COLUMNS} FROM coils WHERE id = $1"))
            .bind(coil_id)
            .fetch_one(&mut *tx)
            .await?;

        let thickness_mm = input.thickness_mm.unwrap_or(current.thickness_mm);
        let weight_kg = input.weight_kg.unwrap_or(current.weight_kg);
        let rate_per_kg = input.rate_per_kg.unwrap_or(current.rate_per_kg);
        check_measurements(thickness_mm, weight_kg, rate_per_kg)?;

        if weight_kg < available.consumed_weight_kg {
            return Err(AppError::InsufficientStock(format!(
                "{} kg of this coil is already processed or sold",
                available.consumed_weight_kg
            )));
        }

        let row = sqlx::query_as::<_, CoilRow>(&format!(
            r#"
            UPDATE coils
            SET coil_number = $1, grade = $2, thickness_mm = $3, width_mm = $4, supplier = $5,
                purchase_date = $6, weight_kg = $7, rate_per_kg = $8, notes = $9, updated_at = NOW()
            WHERE id = $10
            RETURNING {COIL_COLUMNS}
            "#
        ))
        .bind(input.coil_number.as_deref().map(str::trim).unwrap_or(&current.coil_number))
        .bind(input.grade.as_deref().map(str::trim).unwrap_or(&current.grade))
        .bind(thickness_mm)
        .bind(input.width_mm.or(current.width_mm))
        .bind(input.supplier.as_ref().or(current.supplier.as_ref()))
        .bind(input.purchase_date.unwrap_or(current.purchase_date))
        .bind(weight_kg)
        .bind(rate_per_kg)
        .bind(input.notes.as_ref().or(current.notes.as_ref()))
        .bind(coil_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(coil_id = %coil_id, "Coil updated");
        Ok(row.into())
    }

    /// Delete a coil that nothing has been made from or sold out of
    pub async fn delete_coil(&self, coil_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM circle_runs WHERE coil_id = $1)
                OR EXISTS(SELECT 1 FROM patta_runs WHERE coil_id = $1)
                OR EXISTS(SELECT 1 FROM coil_sales WHERE coil_id = $1)
            "#,
        )
        .bind(coil_id)
        .fetch_one(&mut *tx)
        .await?;

        if referenced {
            return Err(AppError::conflict(
                "coil",
                "Coil has production runs or sales recorded against it",
            ));
        }

        let result = sqlx::query("DELETE FROM coils WHERE id = $1")
            .bind(coil_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Coil".to_string()));
        }
        tx.commit().await?;

        tracing::info!(coil_id = %coil_id, "Coil deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_input_accepts_camel_case() {
        let input: CreateCoilInput = serde_json::from_value(serde_json::json!({
            "coilNumber": "HR-2291",
            "grade": "J3",
            "thickness": "0.80",
            "weightKg": 5230,
            "ratePerKg": "61.25"
        }))
        .unwrap();

        assert_eq!(input.coil_number, "HR-2291");
        assert!(input.validate().is_ok());
        assert!(input.purchase_date.is_none());
    }

    #[test]
    fn empty_coil_number_fails_validation() {
        let input: CreateCoilInput = serde_json::from_value(serde_json::json!({
            "coil_number": "",
            "grade": "304",
            "thickness_mm": 1,
            "weight_kg": 100
        }))
        .unwrap();

        let err: AppError = input.validate().unwrap_err().into();
        assert!(matches!(err, AppError::ValidationError(msg) if msg.starts_with("coil_number")));
    }

    #[test]
    fn measurements_are_checked() {
        assert!(check_measurements(Decimal::ONE, Decimal::from(100), Decimal::ZERO).is_ok());
        assert!(matches!(
            check_measurements(Decimal::ZERO, Decimal::from(100), Decimal::ZERO),
            Err(AppError::Validation { field, .. }) if field == "thickness_mm"
        ));
        assert!(matches!(
            check_measurements(Decimal::ONE, Decimal::from(100), Decimal::from(-1)),
            Err(AppError::Validation { field, .. }) if field == "rate_per_kg"
        ));
    }
}
