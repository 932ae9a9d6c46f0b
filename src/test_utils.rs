// src/test_utils.rs
//
// Shared helpers for handler tests: an in-memory SQLite pool with the
// embedded migrations applied, plus small entity factories.
use std::str::FromStr;

use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::database;
use crate::dtos::sale::CreateSaleRequest;
use crate::handlers::sale::create_sale;
use crate::middleware::auth::AuthContext;
use crate::state::AppState;

pub async fn setup_test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    // A second pooled connection would see a different in-memory database,
    // so the pool is capped at one.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    database::run_migrations(&pool).await.unwrap();
    pool
}

pub async fn setup_test_state() -> AppState {
    AppState::new(setup_test_pool().await)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub async fn create_test_product(
    pool: &SqlitePool,
    code: &str,
    cost_price: f64,
    sale_price: f64,
    quantity: i64,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO products (code, name, cost_price, sale_price, quantity)
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(code)
    .bind(format!("Product {code}"))
    .bind(cost_price)
    .bind(sale_price)
    .bind(quantity)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Records a sale through the handler so stock is adjusted as in production.
pub async fn create_test_sale(
    pool: &SqlitePool,
    product_id: i64,
    quantity: i64,
    unit_price: f64,
    sale_date: NaiveDate,
) -> i64 {
    let (_, sale) = create_sale(
        State(AppState::new(pool.clone())),
        Json(CreateSaleRequest {
            product_id,
            quantity,
            unit_price,
            sale_date,
        }),
    )
    .await
    .unwrap();
    sale.0.id
}

pub async fn create_test_user(pool: &SqlitePool, username: &str, password: &str) -> i64 {
    // Low bcrypt cost keeps the test suite fast.
    let password_hash = bcrypt::hash(password, 4).unwrap();
    sqlx::query_scalar("INSERT INTO users (username, password_hash) VALUES (?, ?) RETURNING id")
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn product_quantity(pool: &SqlitePool, product_id: i64) -> i64 {
    sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn auth_context(user_id: i64, username: &str) -> AuthContext {
    AuthContext {
        user_id,
        username: username.to_string(),
    }
}
