use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct Sale {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub sale_date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}
