//! Reporting service for analytics and data export
//! Provides the dashboard, per-coil yield and per-coil profitability reports

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{margin_percent, process_loss, purchase_cost, yield_percent, DateRange, OrderStatus};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::{CIRCLE_STOCK_SQL, COIL_STOCK_SQL, PL_STOCK_SQL, SCRAP_STOCK_SQL};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Order count for one status
#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub coil_count: i64,
    pub purchased_weight_kg: Decimal,
    pub purchase_value: Decimal,
    pub available_coil_kg: Decimal,
    pub available_circle_qty: i64,
    pub available_circle_kg: Decimal,
    pub available_pl_qty: i64,
    pub available_pl_kg: Decimal,
    pub available_scrap_kg: Decimal,
    pub revenue_this_month: Decimal,
    pub revenue_all_time: Decimal,
    pub orders_by_status: Vec<StatusCount>,
    pub open_order_remaining_kg: Decimal,
}

#[derive(Debug, FromRow)]
struct CoilOutputRow {
    coil_id: Uuid,
    coil_number: String,
    grade: String,
    thickness_mm: Decimal,
    weight_kg: Decimal,
    circle_input_kg: Decimal,
    circle_output_kg: Decimal,
    circle_qty: i64,
    patta_input_kg: Decimal,
    patta_output_kg: Decimal,
    pl_input_kg: Decimal,
    pl_output_kg: Decimal,
    pl_qty: i64,
    scrap_kg: Decimal,
}

/// Yield report entry, one per coil
#[derive(Debug, Serialize)]
pub struct CoilYieldReport {
    pub coil_id: Uuid,
    pub coil_number: String,
    pub grade: String,
    pub thickness_mm: Decimal,
    pub weight_kg: Decimal,
    pub input_consumed_kg: Decimal,
    pub circle_output_kg: Decimal,
    pub circle_qty: i64,
    pub patta_output_kg: Decimal,
    pub pl_output_kg: Decimal,
    pub pl_qty: i64,
    pub scrap_kg: Decimal,
    pub yield_percent: Decimal,
    pub process_loss_kg: Decimal,
}

impl From<CoilOutputRow> for CoilYieldReport {
    fn from(row: CoilOutputRow) -> Self {
        let input_consumed_kg = row.circle_input_kg + row.patta_input_kg;
        // Patta cut into PL is counted once, as PL.
        let finished_kg = row.circle_output_kg + (row.patta_output_kg - row.pl_input_kg) + row.pl_output_kg;

        Self {
            coil_id: row.coil_id,
            coil_number: row.coil_number,
            grade: row.grade,
            thickness_mm: row.thickness_mm,
            weight_kg: row.weight_kg,
            input_consumed_kg,
            circle_output_kg: row.circle_output_kg,
            circle_qty: row.circle_qty,
            patta_output_kg: row.patta_output_kg,
            pl_output_kg: row.pl_output_kg,
            pl_qty: row.pl_qty,
            scrap_kg: row.scrap_kg,
            yield_percent: yield_percent(input_consumed_kg, finished_kg),
            process_loss_kg: process_loss(input_consumed_kg, finished_kg, row.scrap_kg),
        }
    }
}

#[derive(Debug, FromRow)]
struct CoilRevenueRow {
    coil_id: Uuid,
    coil_number: String,
    grade: String,
    purchase_date: NaiveDate,
    weight_kg: Decimal,
    rate_per_kg: Decimal,
    coil_revenue: Decimal,
    circle_revenue: Decimal,
    pl_revenue: Decimal,
}

/// Profitability report entry, one per coil
#[derive(Debug, Serialize)]
pub struct CoilProfitabilityReport {
    pub coil_id: Uuid,
    pub coil_number: String,
    pub grade: String,
    pub purchase_date: NaiveDate,
    pub purchase_cost: Decimal,
    pub coil_revenue: Decimal,
    pub circle_revenue: Decimal,
    pub pl_revenue: Decimal,
    pub total_revenue: Decimal,
    pub gross_margin: Decimal,
    pub margin_percent: Decimal,
}

impl From<CoilRevenueRow> for CoilProfitabilityReport {
    fn from(row: CoilRevenueRow) -> Self {
        let cost = purchase_cost(row.weight_kg, row.rate_per_kg);
        let total_revenue = row.coil_revenue + row.circle_revenue + row.pl_revenue;

        Self {
            coil_id: row.coil_id,
            coil_number: row.coil_number,
            grade: row.grade,
            purchase_date: row.purchase_date,
            purchase_cost: cost,
            coil_revenue: row.coil_revenue,
            circle_revenue: row.circle_revenue,
            pl_revenue: row.pl_revenue,
            total_revenue,
            gross_margin: total_revenue - cost,
            margin_percent: margin_percent(total_revenue, cost),
        }
    }
}

/// Report filter parameters
#[derive(Debug, Default, Deserialize)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportFilter {
    fn range(&self) -> AppResult<DateRange> {
        let range = DateRange::from_bounds(self.start_date, self.end_date);
        if !range.is_valid() {
            return Err(AppError::invalid("end_date", "End date is before start date"));
        }
        Ok(range)
    }
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Per-coil yield for runs dated within the filter range
    pub async fn get_yield_report(&self, filter: &ReportFilter) -> AppResult<Vec<CoilYieldReport>> {
        let range = filter.range()?;

        let rows = sqlx::query_as::<_, CoilOutputRow>(
            r#"
            SELECT
                c.id AS coil_id, c.coil_number, c.grade, c.thickness_mm, c.weight_kg,
                COALESCE(cr.input_kg, 0)::NUMERIC AS circle_input_kg,
                COALESCE(cr.output_kg, 0)::NUMERIC AS circle_output_kg,
                COALESCE(cr.qty, 0)::BIGINT AS circle_qty,
                COALESCE(pr.input_kg, 0)::NUMERIC AS patta_input_kg,
                COALESCE(pr.output_kg, 0)::NUMERIC AS patta_output_kg,
                COALESCE(lr.input_kg, 0)::NUMERIC AS pl_input_kg,
                COALESCE(lr.output_kg, 0)::NUMERIC AS pl_output_kg,
                COALESCE(lr.qty, 0)::BIGINT AS pl_qty,
                (COALESCE(cr.scrap_kg, 0) + COALESCE(pr.scrap_kg, 0) + COALESCE(lr.scrap_kg, 0))::NUMERIC
                    AS scrap_kg
            FROM coils c
            LEFT JOIN (
                SELECT coil_id, SUM(input_weight_kg) AS input_kg, SUM(output_weight_kg) AS output_kg,
                       SUM(output_qty) AS qty, SUM(scrap_weight_kg) AS scrap_kg
                FROM circle_runs WHERE run_date BETWEEN $1 AND $2
                GROUP BY coil_id
            ) cr ON cr.coil_id = c.id
            LEFT JOIN (
                SELECT coil_id, SUM(input_weight_kg) AS input_kg, SUM(output_weight_kg) AS output_kg,
                       SUM(scrap_weight_kg) AS scrap_kg
                FROM patta_runs WHERE run_date BETWEEN $1 AND $2
                GROUP BY coil_id
            ) pr ON pr.coil_id = c.id
            LEFT JOIN (
                SELECT p.coil_id, SUM(l.input_weight_kg) AS input_kg, SUM(l.output_weight_kg) AS output_kg,
                       SUM(l.output_qty) AS qty, SUM(l.scrap_weight_kg) AS scrap_kg
                FROM pl_runs l
                JOIN patta_runs p ON p.id = l.patta_run_id
                WHERE l.run_date BETWEEN $1 AND $2
                GROUP BY p.coil_id
            ) lr ON lr.coil_id = c.id
            WHERE cr.coil_id IS NOT NULL OR pr.coil_id IS NOT NULL OR lr.coil_id IS NOT NULL
            ORDER BY c.purchase_date DESC, c.coil_number
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(CoilYieldReport::from).collect())
    }

    /// Per-coil purchase cost against every sale traced back to the coil,
    /// for coils purchased within the filter range
    pub async fn get_profitability_report(
        &self,
        filter: &ReportFilter,
    ) -> AppResult<Vec<CoilProfitabilityReport>> {
        let range = filter.range()?;

        let rows = sqlx::query_as::<_, CoilRevenueRow>(
            r#"
            SELECT
                c.id AS coil_id, c.coil_number, c.grade, c.purchase_date, c.weight_kg, c.rate_per_kg,
                COALESCE(cs.revenue, 0)::NUMERIC AS coil_revenue,
                COALESCE(ci.revenue, 0)::NUMERIC AS circle_revenue,
                COALESCE(pl.revenue, 0)::NUMERIC AS pl_revenue
            FROM coils c
            LEFT JOIN (
                SELECT coil_id, SUM(amount) AS revenue FROM coil_sales GROUP BY coil_id
            ) cs ON cs.coil_id = c.id
            LEFT JOIN (
                SELECT st.coil_id, SUM(s.amount) AS revenue
                FROM circle_sales s JOIN circle_stock st ON st.id = s.circle_stock_id
                GROUP BY st.coil_id
            ) ci ON ci.coil_id = c.id
            LEFT JOIN (
                SELECT st.coil_id, SUM(s.amount) AS revenue
                FROM pl_sales s JOIN pl_stock st ON st.id = s.pl_stock_id
                GROUP BY st.coil_id
            ) pl ON pl.coil_id = c.id
            WHERE c.purchase_date BETWEEN $1 AND $2
            ORDER BY c.purchase_date DESC, c.coil_number
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(CoilProfitabilityReport::from).collect())
    }

    /// Get dashboard metrics
    pub async fn get_dashboard_metrics(&self) -> AppResult<DashboardMetrics> {
        // Purchases
        let (coil_count, purchased_weight_kg, purchase_value): (i64, Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(weight_kg), 0)::NUMERIC,
                   COALESCE(SUM(ROUND(weight_kg * rate_per_kg, 2)), 0)::NUMERIC
            FROM coils
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        // Stock on hand
        let available_coil_kg: Decimal = sqlx::query_scalar(&format!(
            "SELECT COALESCE(SUM(available_weight_kg), 0)::NUMERIC FROM ({COIL_STOCK_SQL}) s"
        ))
        .fetch_one(&self.db)
        .await?;

        let (available_circle_qty, available_circle_kg): (i64, Decimal) = sqlx::query_as(&format!(
            "SELECT COALESCE(SUM(available_qty), 0)::BIGINT, COALESCE(SUM(available_weight_kg), 0)::NUMERIC \
             FROM ({CIRCLE_STOCK_SQL}) s"
        ))
        .fetch_one(&self.db)
        .await?;

        let (available_pl_qty, available_pl_kg): (i64, Decimal) = sqlx::query_as(&format!(
            "SELECT COALESCE(SUM(available_qty), 0)::BIGINT, COALESCE(SUM(available_weight_kg), 0)::NUMERIC \
             FROM ({PL_STOCK_SQL}) s"
        ))
        .fetch_one(&self.db)
        .await?;

        let available_scrap_kg: Decimal =
            sqlx::query_scalar(&format!("SELECT available_kg FROM ({SCRAP_STOCK_SQL}) s"))
                .fetch_one(&self.db)
                .await?;

        // Revenue across every product line
        let (revenue_this_month, revenue_all_time): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount) FILTER (
                       WHERE sale_date >= DATE_TRUNC('month', CURRENT_DATE)::DATE
                   ), 0)::NUMERIC,
                   COALESCE(SUM(amount), 0)::NUMERIC
            FROM (
                SELECT amount, sale_date FROM circle_sales
                UNION ALL SELECT amount, sale_date FROM coil_sales
                UNION ALL SELECT amount, sale_date FROM scrap_sales
                UNION ALL SELECT amount, sale_date FROM pl_sales
            ) sales
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        // Orders
        let counts: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
                .fetch_all(&self.db)
                .await?;

        let orders_by_status = OrderStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: *status,
                count: counts
                    .iter()
                    .find(|(s, _)| s == status.as_str())
                    .map(|(_, n)| *n)
                    .unwrap_or(0),
            })
            .collect();

        let open_order_remaining_kg: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(GREATEST(ordered_weight_kg - fulfilled_weight_kg, 0)), 0)::NUMERIC
            FROM orders
            WHERE status IN ('Pending', 'Partial') AND ordered_weight_kg IS NOT NULL
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardMetrics {
            coil_count,
            purchased_weight_kg,
            purchase_value,
            available_coil_kg,
            available_circle_qty,
            available_circle_kg,
            available_pl_qty,
            available_pl_kg,
            available_scrap_kg,
            revenue_this_month,
            revenue_all_time,
            orders_by_status,
            open_order_remaining_kg,
        })
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn output_row() -> CoilOutputRow {
        CoilOutputRow {
            coil_id: Uuid::nil(),
            coil_number: "HR-2291".to_string(),
            grade: "J3".to_string(),
            thickness_mm: dec("0.8"),
            weight_kg: dec("5000"),
            circle_input_kg: dec("1000"),
            circle_output_kg: dec("780"),
            circle_qty: 640,
            patta_input_kg: dec("1000"),
            patta_output_kg: dec("950"),
            pl_input_kg: dec("500"),
            pl_output_kg: dec("470"),
            pl_qty: 300,
            scrap_kg: dec("290"),
        }
    }

    #[test]
    fn yield_counts_patta_cut_into_pl_once() {
        let report = CoilYieldReport::from(output_row());

        assert_eq!(report.input_consumed_kg, dec("2000"));
        // 780 circles + 450 uncut patta + 470 PL
        assert_eq!(report.yield_percent, dec("85"));
        // 2000 - 1700 - 290
        assert_eq!(report.process_loss_kg, dec("10"));
    }

    #[test]
    fn profitability_adds_all_revenue_lines() {
        let report = CoilProfitabilityReport::from(CoilRevenueRow {
            coil_id: Uuid::nil(),
            coil_number: "HR-2291".to_string(),
            grade: "J3".to_string(),
            purchase_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            weight_kg: dec("1000"),
            rate_per_kg: dec("60"),
            coil_revenue: dec("10000"),
            circle_revenue: dec("40000"),
            pl_revenue: dec("25000"),
        });

        assert_eq!(report.purchase_cost, dec("60000"));
        assert_eq!(report.total_revenue, dec("75000"));
        assert_eq!(report.gross_margin, dec("15000"));
        assert_eq!(report.margin_percent, dec("20"));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let filter = ReportFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 1),
        };
        assert!(filter.range().is_err());
    }

    #[test]
    fn csv_export_writes_header_row() {
        let report = CoilYieldReport::from(output_row());
        let csv = ReportingService::export_to_csv(&[report]).unwrap();
        let header = csv.lines().next().unwrap();

        assert!(header.starts_with("coil_id,coil_number,grade"));
        assert!(header.ends_with("yield_percent,process_loss_kg"));
    }
}
