use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Preset period selector: "today", "7" or "30". Ignored when an
    /// explicit start_date/end_date pair is supplied.
    pub quick: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_products: i64,
    pub total_stock_units: i64,
    pub stock_value: f64,
    pub period_revenue: f64,
    pub today_revenue: f64,
    pub period_profit: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub quick_filter: Option<String>,
    pub daily_series: DailySeries,
}

/// Two aligned sequences, one entry per calendar day in the period.
#[derive(Debug, Serialize)]
pub struct DailySeries {
    pub days: Vec<String>,
    pub totals: Vec<f64>,
}
