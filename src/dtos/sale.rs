use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub sale_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSaleRequest {
    pub quantity: i64,
    pub unit_price: f64,
    pub sale_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SaleListQuery {
    pub product_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct SaleResponse {
    pub id: i64,
    pub product_id: i64,
    pub product_code: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub line_total: f64,
    pub sale_date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}
