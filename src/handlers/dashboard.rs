// src/handlers/dashboard.rs
use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};

use crate::dtos::dashboard::{DailySeries, DashboardQuery, DashboardResponse};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, PartialEq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub quick_filter: Option<String>,
}

/// Resolves the reporting interval. An explicit start/end pair wins and
/// clears the quick-filter selection; otherwise the quick filter applies,
/// falling back to the last 30 days.
pub fn resolve_period(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    quick: Option<&str>,
    today: NaiveDate,
) -> Period {
    if let (Some(start), Some(end)) = (start, end) {
        return Period {
            start,
            end,
            quick_filter: None,
        };
    }

    match quick {
        Some("today") => Period {
            start: today,
            end: today,
            quick_filter: Some("today".to_string()),
        },
        Some("7") => Period {
            start: today - Duration::days(6),
            end: today,
            quick_filter: Some("7".to_string()),
        },
        _ => Period {
            start: today - Duration::days(29),
            end: today,
            quick_filter: Some("30".to_string()),
        },
    }
}

/// One entry per calendar day in [start, end]; days without sales are 0.
pub fn fill_daily_series(
    start: NaiveDate,
    end: NaiveDate,
    rows: &[(NaiveDate, f64)],
) -> DailySeries {
    let by_day: HashMap<NaiveDate, f64> = rows.iter().copied().collect();

    let mut days = Vec::new();
    let mut totals = Vec::new();
    for day in start.iter_days().take_while(|day| *day <= end) {
        days.push(day.format("%Y-%m-%d").to_string());
        totals.push(by_day.get(&day).copied().unwrap_or(0.0));
    }

    DailySeries { days, totals }
}

// GET /dashboard - Stock and sales metrics for the selected period
pub async fn get_dashboard(
    State(AppState { db_pool }): State<AppState>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let today = Utc::now().date_naive();
    let period = resolve_period(
        params.start_date,
        params.end_date,
        params.quick.as_deref(),
        today,
    );

    let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&db_pool)
        .await?;

    let total_stock_units: i64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM products")
            .fetch_one(&db_pool)
            .await?;

    // Stock is valued at cost, not at sale price.
    let stock_value: f64 =
        sqlx::query_scalar("SELECT COALESCE(SUM(cost_price * quantity), 0.0) FROM products")
            .fetch_one(&db_pool)
            .await?;

    let period_revenue: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(quantity * unit_price), 0.0) FROM sales
         WHERE sale_date BETWEEN ? AND ?",
    )
    .bind(period.start)
    .bind(period.end)
    .fetch_one(&db_pool)
    .await?;

    let today_revenue: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(quantity * unit_price), 0.0) FROM sales WHERE sale_date = ?",
    )
    .bind(today)
    .fetch_one(&db_pool)
    .await?;

    // Profit against the product's current cost price, not the cost at the
    // time of sale.
    let period_profit: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM((s.unit_price - p.cost_price) * s.quantity), 0.0)
         FROM sales s
         JOIN products p ON p.id = s.product_id
         WHERE s.sale_date BETWEEN ? AND ?",
    )
    .bind(period.start)
    .bind(period.end)
    .fetch_one(&db_pool)
    .await?;

    let daily_rows: Vec<(NaiveDate, f64)> = sqlx::query_as(
        "SELECT sale_date, SUM(quantity * unit_price) FROM sales
         WHERE sale_date BETWEEN ? AND ?
         GROUP BY sale_date
         ORDER BY sale_date",
    )
    .bind(period.start)
    .bind(period.end)
    .fetch_all(&db_pool)
    .await?;

    let daily_series = fill_daily_series(period.start, period.end, &daily_rows);

    Ok(Json(DashboardResponse {
        total_products,
        total_stock_units,
        stock_value,
        period_revenue,
        today_revenue,
        period_profit,
        start_date: period.start,
        end_date: period.end,
        quick_filter: period.quick_filter,
        daily_series,
    }))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Query, State};
    use chrono::NaiveDate;

    use super::*;
    use crate::test_utils::{create_test_product, create_test_sale, setup_test_state, today};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn explicit_range_overrides_quick_filter() {
        let period = resolve_period(
            Some(date("2024-01-01")),
            Some(date("2024-01-03")),
            Some("7"),
            date("2024-03-10"),
        );

        assert_eq!(period.start, date("2024-01-01"));
        assert_eq!(period.end, date("2024-01-03"));
        assert_eq!(period.quick_filter, None);
    }

    #[test]
    fn quick_filter_today_is_single_day() {
        let period = resolve_period(None, None, Some("today"), date("2024-03-10"));

        assert_eq!(period.start, date("2024-03-10"));
        assert_eq!(period.end, date("2024-03-10"));
        assert_eq!(period.quick_filter.as_deref(), Some("today"));
    }

    #[test]
    fn quick_filter_seven_spans_a_week_inclusive() {
        let period = resolve_period(None, None, Some("7"), date("2024-03-10"));

        assert_eq!(period.start, date("2024-03-04"));
        assert_eq!(period.end, date("2024-03-10"));
        assert_eq!(period.quick_filter.as_deref(), Some("7"));
    }

    #[test]
    fn default_period_is_last_thirty_days() {
        let period = resolve_period(None, None, None, date("2024-03-10"));

        assert_eq!(period.start, date("2024-02-10"));
        assert_eq!(period.end, date("2024-03-10"));
        assert_eq!(period.quick_filter.as_deref(), Some("30"));
    }

    #[test]
    fn partial_explicit_range_falls_back_to_quick_filter() {
        let period = resolve_period(Some(date("2024-03-01")), None, Some("today"), date("2024-03-10"));

        assert_eq!(period.start, date("2024-03-10"));
        assert_eq!(period.end, date("2024-03-10"));
    }

    #[test]
    fn daily_series_zero_fills_gaps() {
        let rows = vec![(date("2024-01-02"), 24.0)];
        let series = fill_daily_series(date("2024-01-01"), date("2024-01-03"), &rows);

        assert_eq!(series.days, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(series.totals, vec![0.0, 24.0, 0.0]);
    }

    #[tokio::test]
    async fn dashboard_metrics_for_recorded_sale() {
        let state = setup_test_state().await;
        let product_id = create_test_product(&state.db_pool, "P-1", 5.0, 10.0, 10).await;
        create_test_sale(&state.db_pool, product_id, 3, 8.0, today()).await;

        let dashboard = get_dashboard(
            State(state),
            Query(DashboardQuery {
                start_date: None,
                end_date: None,
                quick: None,
            }),
        )
        .await
        .unwrap();

        let body = dashboard.0;
        assert_eq!(body.total_products, 1);
        assert_eq!(body.total_stock_units, 7);
        assert_eq!(body.stock_value, 35.0);
        assert_eq!(body.period_revenue, 24.0);
        assert_eq!(body.today_revenue, 24.0);
        assert_eq!(body.period_profit, 9.0);
        assert_eq!(body.quick_filter.as_deref(), Some("30"));
        assert_eq!(body.daily_series.days.len(), 30);
        assert_eq!(body.daily_series.totals.iter().sum::<f64>(), 24.0);
    }

    #[tokio::test]
    async fn dashboard_explicit_range_returns_exact_days() {
        let state = setup_test_state().await;
        let product_id = create_test_product(&state.db_pool, "P-1", 5.0, 10.0, 10).await;
        create_test_sale(&state.db_pool, product_id, 2, 8.0, date("2024-01-02")).await;

        let dashboard = get_dashboard(
            State(state),
            Query(DashboardQuery {
                start_date: Some(date("2024-01-01")),
                end_date: Some(date("2024-01-03")),
                quick: Some("7".to_string()),
            }),
        )
        .await
        .unwrap();

        let body = dashboard.0;
        assert_eq!(body.quick_filter, None);
        assert_eq!(body.daily_series.days.len(), 3);
        assert_eq!(body.daily_series.totals, vec![0.0, 16.0, 0.0]);
        assert_eq!(body.period_revenue, 16.0);
    }

    #[tokio::test]
    async fn empty_store_reports_zeroes() {
        let state = setup_test_state().await;

        let dashboard = get_dashboard(
            State(state),
            Query(DashboardQuery {
                start_date: None,
                end_date: None,
                quick: Some("today".to_string()),
            }),
        )
        .await
        .unwrap();

        let body = dashboard.0;
        assert_eq!(body.total_products, 0);
        assert_eq!(body.total_stock_units, 0);
        assert_eq!(body.stock_value, 0.0);
        assert_eq!(body.period_revenue, 0.0);
        assert_eq!(body.period_profit, 0.0);
        assert_eq!(body.daily_series.days.len(), 1);
    }
}
