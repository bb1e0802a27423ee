//! Reporting handlers for analytics and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::reporting::{DashboardMetrics, ReportFilter, ReportingService};
use crate::AppState;

/// Report query string. Dates are `YYYY-MM-DD`; anything else is rejected with 400.
#[derive(Deserialize)]
pub struct ReportQuery {
    #[serde(alias = "startDate")]
    pub start_date: Option<NaiveDate>,
    #[serde(alias = "endDate")]
    pub end_date: Option<NaiveDate>,
    pub format: Option<String>, // "json" or "csv"
}

impl ReportQuery {
    fn filter(&self) -> ReportFilter {
        ReportFilter {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    fn wants_csv(&self) -> bool {
        self.format.as_deref().is_some_and(|f| f.eq_ignore_ascii_case("csv"))
    }
}

fn render<T: Serialize>(query: &ReportQuery, data: Vec<T>, filename: &str) -> AppResult<Response> {
    if query.wants_csv() {
        let csv = ReportingService::export_to_csv(&data)?;
        let disposition = format!("attachment; filename=\"{}\"", filename);
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(data).into_response())
    }
}

/// Get dashboard metrics
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardMetrics>> {
    let service = ReportingService::new(state.db.clone());
    let metrics = service.get_dashboard_metrics().await?;
    Ok(Json(metrics))
}

/// Get per-coil yield report
pub async fn get_yield_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db.clone());
    let data = service.get_yield_report(&query.filter()).await?;
    render(&query, data, "coil_yield.csv")
}

/// Get per-coil profitability report
pub async fn get_profitability_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db.clone());
    let data = service.get_profitability_report(&query.filter()).await?;
    render(&query, data, "coil_profitability.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, Uri};

    fn parse(uri: &str) -> Result<ReportQuery, StatusCode> {
        let uri: Uri = uri.parse().unwrap();
        Query::<ReportQuery>::try_from_uri(&uri)
            .map(|Query(q)| q)
            .map_err(|rejection| rejection.status())
    }

    #[test]
    fn dates_and_format_are_read() {
        let query = parse("/api/reports/yield?start_date=2024-01-01&endDate=2024-03-31&format=CSV").unwrap();
        let filter = query.filter();
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.end_date, NaiveDate::from_ymd_opt(2024, 3, 31));
        assert!(query.wants_csv());
    }

    #[test]
    fn malformed_date_is_a_bad_request() {
        assert_eq!(
            parse("/api/reports/yield?start_date=2024-13-01").err(),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            parse("/api/reports/profitability?end_date=last-week").err(),
            Some(StatusCode::BAD_REQUEST)
        );
    }

    #[test]
    fn missing_dates_leave_the_range_open() {
        let query = parse("/api/reports/yield").unwrap();
        assert!(query.filter().start_date.is_none());
        assert!(!query.wants_csv());
    }
}
