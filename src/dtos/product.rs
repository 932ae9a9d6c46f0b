// src/dtos/product.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub code: String,
    pub name: String,
    pub cost_price: f64,
    pub sale_price: f64,
    pub quantity: i64,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub cost_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub quantity: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub cost_price: f64,
    pub sale_price: f64,
    pub quantity: i64,
    pub image: Option<String>,
    pub created_at: Option<String>,
}

// Convert from Model to Response DTO
impl From<crate::models::product::Product> for ProductResponse {
    fn from(product: crate::models::product::Product) -> Self {
        Self {
            id: product.id,
            code: product.code,
            name: product.name,
            cost_price: product.cost_price,
            sale_price: product.sale_price,
            quantity: product.quantity,
            image: product.image,
            created_at: product.created_at.map(|dt| dt.to_rfc3339()),
        }
    }
}
