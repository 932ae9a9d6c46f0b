use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Singleton row (id = 1), created by the startup bootstrap.
#[derive(Debug, FromRow)]
pub struct Settings {
    pub id: i64,
    pub store_name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub updated_at: Option<DateTime<Utc>>,
}
