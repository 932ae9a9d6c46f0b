// src/handlers/settings.rs
use axum::extract::State;
use axum::Json;

use crate::dtos::settings::{SettingsResponse, UpdateSettingsRequest};
use crate::error::AppError;
use crate::models::settings::Settings;
use crate::state::AppState;

// GET /settings - The singleton store configuration
pub async fn get_settings(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = sqlx::query_as::<_, Settings>(
        "SELECT id, store_name, primary_color, secondary_color, accent_color, updated_at
         FROM settings WHERE id = 1",
    )
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Settings not initialized"))?;

    Ok(Json(SettingsResponse::from(settings)))
}

// PUT /settings - Update the singleton row in place
pub async fn update_settings(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = sqlx::query_as::<_, Settings>(
        "UPDATE settings SET
         store_name = COALESCE(?, store_name),
         primary_color = COALESCE(?, primary_color),
         secondary_color = COALESCE(?, secondary_color),
         accent_color = COALESCE(?, accent_color),
         updated_at = CURRENT_TIMESTAMP
         WHERE id = 1
         RETURNING id, store_name, primary_color, secondary_color, accent_color, updated_at",
    )
    .bind(payload.store_name)
    .bind(payload.primary_color)
    .bind(payload.secondary_color)
    .bind(payload.accent_color)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Settings not initialized"))?;

    Ok(Json(SettingsResponse::from(settings)))
}
