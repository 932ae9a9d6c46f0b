// src/database.rs
use std::str::FromStr;

use bcrypt::{hash, DEFAULT_COST};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::AppError;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// One-shot startup initialization: the settings singleton and the default
/// admin account. Safe to run on every start; existing rows are left alone.
pub async fn bootstrap(pool: &SqlitePool) -> Result<(), AppError> {
    ensure_settings(pool).await?;
    ensure_admin_user(pool).await?;
    Ok(())
}

async fn ensure_settings(pool: &SqlitePool) -> Result<(), AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE id = 1)")
            .fetch_one(pool)
            .await?;

    if exists {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO settings (id, store_name, primary_color, secondary_color, accent_color)
         VALUES (1, ?, ?, ?, ?)",
    )
    .bind("My Store")
    .bind("#0d6efd")
    .bind("#6c757d")
    .bind("#198754")
    .execute(pool)
    .await?;

    info!("Created default settings row");
    Ok(())
}

async fn ensure_admin_user(pool: &SqlitePool) -> Result<(), AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
            .bind("admin")
            .fetch_one(pool)
            .await?;

    if exists {
        return Ok(());
    }

    let password = match std::env::var("ADMIN_PASSWORD") {
        Ok(p) => p,
        Err(_) => {
            warn!("ADMIN_PASSWORD not set, using default admin password");
            "admin123".to_string()
        }
    };

    let password_hash = hash(&password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Hash error: {e}")))?;

    sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
        .bind("admin")
        .bind(password_hash)
        .execute(pool)
        .await?;

    info!("Created default admin user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::test_utils::setup_test_pool;

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let pool = setup_test_pool().await;

        super::bootstrap(&pool).await.unwrap();
        super::bootstrap(&pool).await.unwrap();

        let admins: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = 'admin'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(admins, 1);

        let settings_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(settings_rows, 1);
    }
}
