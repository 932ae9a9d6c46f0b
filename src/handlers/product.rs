// src/handlers/product.rs
use axum::{
    extract::{Path, State},
    Json,
};
use sqlx::Error as SqlxError;
use tracing::{error, instrument};

use crate::dtos::product::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use crate::error::AppError;
use crate::models::product::Product;
use crate::state::AppState;

fn map_unique_violation(err: SqlxError, message: &str) -> AppError {
    match err {
        SqlxError::Database(db_err) if db_err.is_unique_violation() => {
            AppError::validation(message)
        }
        other => other.into(),
    }
}

// GET /products - List all products
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    match sqlx::query_as::<_, Product>(
        "SELECT id, code, name, cost_price, sale_price, quantity, image, created_at
         FROM products ORDER BY name",
    )
    .fetch_all(&state.db_pool)
    .await
    {
        Ok(products) => {
            let response = products.into_iter().map(ProductResponse::from).collect();
            Ok(Json(response))
        }
        Err(e) => {
            error!(?e, "Failed to fetch products");
            Err(e.into())
        }
    }
}

// GET /products/:id - Get single product
#[instrument(skip(state), fields(id))]
pub async fn get_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, code, name, cost_price, sale_price, quantity, image, created_at
         FROM products WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ProductResponse::from(product)))
}

// POST /products - Create new product
#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    if payload.code.trim().is_empty() {
        return Err(AppError::validation("Product code required"));
    }
    if payload.quantity < 0 {
        return Err(AppError::validation("Quantity cannot be negative"));
    }
    if payload.sale_price <= payload.cost_price {
        return Err(AppError::validation("Sale price must be above cost price"));
    }

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (code, name, cost_price, sale_price, quantity, image)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING id, code, name, cost_price, sale_price, quantity, image, created_at",
    )
    .bind(&payload.code)
    .bind(&payload.name)
    .bind(payload.cost_price)
    .bind(payload.sale_price)
    .bind(payload.quantity)
    .bind(&payload.image)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| map_unique_violation(e, "Product code already exists"))?;

    Ok(Json(ProductResponse::from(product)))
}

// PUT /products/:id - Update product
//
// Note: sale_price is not re-checked against cost_price here, only at
// creation.
#[instrument(skip(state, payload), fields(id))]
pub async fn update_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    if let Some(quantity) = payload.quantity {
        if quantity < 0 {
            return Err(AppError::validation("Quantity cannot be negative"));
        }
    }

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET
         code = COALESCE(?, code),
         name = COALESCE(?, name),
         cost_price = COALESCE(?, cost_price),
         sale_price = COALESCE(?, sale_price),
         quantity = COALESCE(?, quantity),
         image = COALESCE(?, image)
         WHERE id = ?
         RETURNING id, code, name, cost_price, sale_price, quantity, image, created_at",
    )
    .bind(payload.code)
    .bind(payload.name)
    .bind(payload.cost_price)
    .bind(payload.sale_price)
    .bind(payload.quantity)
    .bind(payload.image)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await
    .map_err(|e| map_unique_violation(e, "Product code already exists"))?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ProductResponse::from(product)))
}

// DELETE /products/:id - Delete product
#[instrument(skip(state), fields(id))]
pub async fn delete_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<()>, AppError> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(&state.db_pool)
        .await
        .map_err(|e| match e {
            SqlxError::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::validation("Product has recorded sales and cannot be deleted")
            }
            other => other.into(),
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Product not found"));
    }

    Ok(Json(()))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};
    use axum::Json;

    use super::*;
    use crate::dtos::sale::CreateSaleRequest;
    use crate::error::AppError;
    use crate::handlers::sale::create_sale;
    use crate::test_utils::{create_test_product, setup_test_state, today};

    fn update_payload() -> UpdateProductRequest {
        UpdateProductRequest {
            code: None,
            name: None,
            cost_price: None,
            sale_price: None,
            quantity: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_sale_price_not_above_cost() {
        let state = setup_test_state().await;

        let err = create_product(
            State(state),
            Json(CreateProductRequest {
                code: "P-1".to_string(),
                name: "Widget".to_string(),
                cost_price: 5.0,
                sale_price: 5.0,
                quantity: 10,
                image: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn create_rejects_duplicate_code() {
        let state = setup_test_state().await;
        create_test_product(&state.db_pool, "P-1", 5.0, 8.0, 10).await;

        let err = create_product(
            State(state),
            Json(CreateProductRequest {
                code: "P-1".to_string(),
                name: "Widget".to_string(),
                cost_price: 5.0,
                sale_price: 8.0,
                quantity: 10,
                image: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    // Current behavior: only creation checks sale_price > cost_price, an
    // update can push sale_price at or below cost without error.
    #[tokio::test]
    async fn update_does_not_revalidate_price_margin() {
        let state = setup_test_state().await;
        let product_id = create_test_product(&state.db_pool, "P-1", 5.0, 8.0, 10).await;

        let updated = update_product(
            Path(product_id),
            State(state),
            Json(UpdateProductRequest {
                sale_price: Some(4.0),
                ..update_payload()
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.0.sale_price, 4.0);
        assert_eq!(updated.0.cost_price, 5.0);
    }

    #[tokio::test]
    async fn delete_rejects_product_with_sales() {
        let state = setup_test_state().await;
        let product_id = create_test_product(&state.db_pool, "P-1", 5.0, 8.0, 10).await;

        create_sale(
            State(state.clone()),
            Json(CreateSaleRequest {
                product_id,
                quantity: 2,
                unit_price: 8.0,
                sale_date: today(),
            }),
        )
        .await
        .unwrap();

        let err = delete_product(Path(product_id), State(state))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn delete_missing_product_is_not_found() {
        let state = setup_test_state().await;

        let err = delete_product(Path(999), State(state)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
