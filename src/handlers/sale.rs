// src/handlers/sale.rs
//
// Every sale mutation pairs with an equal-and-opposite adjustment to the
// product's quantity, inside one transaction.
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::dtos::sale::{CreateSaleRequest, SaleListQuery, SaleResponse, UpdateSaleRequest};
use crate::error::AppError;
use crate::models::product::Product;
use crate::models::sale::Sale;
use crate::state::AppState;

pub async fn create_sale(
    State(AppState { db_pool }): State<AppState>,
    Json(req): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), AppError> {
    if req.quantity <= 0 {
        return Err(AppError::validation("Quantity must be greater than 0"));
    }

    let mut tx = db_pool.begin().await?;

    let product = sqlx::query_as::<_, Product>(
        "SELECT id, code, name, cost_price, sale_price, quantity, image, created_at
         FROM products WHERE id = ?",
    )
    .bind(req.product_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    if req.quantity > product.quantity {
        return Err(AppError::validation("Insufficient stock"));
    }
    if req.unit_price <= product.cost_price {
        return Err(AppError::validation("Unit price must be above cost price"));
    }

    // Guarded decrement: the condition re-checks stock so two concurrent
    // creations cannot both pass the read above and oversell.
    let updated = sqlx::query(
        "UPDATE products SET quantity = quantity - ?1 WHERE id = ?2 AND quantity >= ?1",
    )
    .bind(req.quantity)
    .bind(req.product_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::validation("Insufficient stock"));
    }

    let sale = sqlx::query_as::<_, Sale>(
        "INSERT INTO sales (product_id, quantity, unit_price, sale_date)
         VALUES (?, ?, ?, ?)
         RETURNING id, product_id, quantity, unit_price, sale_date, created_at",
    )
    .bind(req.product_id)
    .bind(req.quantity)
    .bind(req.unit_price)
    .bind(req.sale_date)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(SaleResponse {
            id: sale.id,
            product_id: product.id,
            product_code: product.code,
            product_name: product.name,
            quantity: sale.quantity,
            unit_price: sale.unit_price,
            line_total: sale.quantity as f64 * sale.unit_price,
            sale_date: sale.sale_date,
            created_at: sale.created_at,
        }),
    ))
}

pub async fn update_sale(
    State(AppState { db_pool }): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSaleRequest>,
) -> Result<Json<SaleResponse>, AppError> {
    if req.quantity <= 0 {
        return Err(AppError::validation("Quantity must be greater than 0"));
    }

    let mut tx = db_pool.begin().await?;

    let sale = sqlx::query_as::<_, Sale>(
        "SELECT id, product_id, quantity, unit_price, sale_date, created_at
         FROM sales WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("Sale not found"))?;

    let stock: i64 = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?")
        .bind(sale.product_id)
        .fetch_one(&mut *tx)
        .await?;

    // Only the increase in sold units has to come out of remaining stock.
    let delta = req.quantity - sale.quantity;
    if delta > stock {
        return Err(AppError::validation("Insufficient stock"));
    }

    let updated = sqlx::query(
        "UPDATE products SET quantity = quantity - ?1 WHERE id = ?2 AND quantity >= ?1",
    )
    .bind(delta)
    .bind(sale.product_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::validation("Insufficient stock"));
    }

    sqlx::query("UPDATE sales SET quantity = ?, unit_price = ?, sale_date = ? WHERE id = ?")
        .bind(req.quantity)
        .bind(req.unit_price)
        .bind(req.sale_date)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    fetch_sale_by_id(&db_pool, id).await.map(Json)
}

pub async fn delete_sale(
    State(AppState { db_pool }): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<()>, AppError> {
    let mut tx = db_pool.begin().await?;

    let sale = sqlx::query_as::<_, Sale>(
        "SELECT id, product_id, quantity, unit_price, sale_date, created_at
         FROM sales WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("Sale not found"))?;

    sqlx::query("UPDATE products SET quantity = quantity + ? WHERE id = ?")
        .bind(sale.quantity)
        .bind(sale.product_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM sales WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(()))
}

pub async fn get_sale(
    State(AppState { db_pool }): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SaleResponse>, AppError> {
    fetch_sale_by_id(&db_pool, id).await.map(Json)
}

pub async fn list_sales(
    State(AppState { db_pool }): State<AppState>,
    Query(params): Query<SaleListQuery>,
) -> Result<Json<Vec<SaleResponse>>, AppError> {
    let mut sql = String::from(
        "SELECT s.id, s.product_id, p.code AS product_code, p.name AS product_name,
                s.quantity, s.unit_price, s.quantity * s.unit_price AS line_total,
                s.sale_date, s.created_at
         FROM sales s
         JOIN products p ON p.id = s.product_id
         WHERE 1=1",
    );

    if params.product_id.is_some() {
        sql.push_str(" AND s.product_id = ?");
    }
    if params.start_date.is_some() {
        sql.push_str(" AND s.sale_date >= ?");
    }
    if params.end_date.is_some() {
        sql.push_str(" AND s.sale_date <= ?");
    }
    sql.push_str(" ORDER BY s.sale_date DESC, s.id DESC");

    let mut query = sqlx::query_as::<_, SaleResponse>(&sql);
    if let Some(product_id) = params.product_id {
        query = query.bind(product_id);
    }
    if let Some(start_date) = params.start_date {
        query = query.bind(start_date);
    }
    if let Some(end_date) = params.end_date {
        query = query.bind(end_date);
    }

    let sales = query.fetch_all(&db_pool).await?;
    Ok(Json(sales))
}

async fn fetch_sale_by_id(db_pool: &sqlx::SqlitePool, id: i64) -> Result<SaleResponse, AppError> {
    sqlx::query_as::<_, SaleResponse>(
        "SELECT s.id, s.product_id, p.code AS product_code, p.name AS product_name,
                s.quantity, s.unit_price, s.quantity * s.unit_price AS line_total,
                s.sale_date, s.created_at
         FROM sales s
         JOIN products p ON p.id = s.product_id
         WHERE s.id = ?",
    )
    .bind(id)
    .fetch_optional(db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Sale not found"))
}
