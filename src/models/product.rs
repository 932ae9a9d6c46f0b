use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct Product {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub cost_price: f64,
    pub sale_price: f64,
    pub quantity: i64,
    pub image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
