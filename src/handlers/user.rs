// src/handlers/user.rs
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::Error as SqlxError;

use crate::auth::jwt::sign_token;
use crate::dtos::user::{
    CreateUserRequest, LoginRequest, LoginResponse, RegisterUserRequest, UpdateUserRequest,
    UserResponse,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::user::User;
use crate::state::AppState;

fn map_unique_violation(err: SqlxError) -> AppError {
    match err {
        SqlxError::Database(db_err) if db_err.is_unique_violation() => {
            AppError::validation("Username already exists")
        }
        other => other.into(),
    }
}

fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        created_at: user.created_at,
    }
}

async fn insert_user(
    db_pool: &sqlx::SqlitePool,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    if username.trim().is_empty() {
        return Err(AppError::validation("Username required"));
    }
    if password.len() < 6 {
        return Err(AppError::validation("Password too short"));
    }

    let password_hash = hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Hash error: {e}")))?;

    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password_hash) VALUES (?, ?)
         RETURNING id, username, password_hash, created_at",
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(db_pool)
    .await
    .map_err(map_unique_violation)
}

pub async fn register_user(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = insert_user(&db_pool, &payload.username, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(user_response(user))))
}

pub async fn login_user(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::validation("Username required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("Password required"));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
    )
    .bind(&payload.username)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::validation("Invalid credentials"))?;

    let ok = verify(&payload.password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Password verify error: {e}")))?;

    if !ok {
        return Err(AppError::validation("Invalid credentials"));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::internal("JWT secret not configured"))?;

    let token = sign_token(user.id, &user.username, &secret)?;

    // 8 hours = 28800 seconds
    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "Bearer",
        expires_in_seconds: 8 * 60 * 60,
    }))
}

// Authenticated endpoint: returns the profile for the id in AuthContext
pub async fn get_me(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE id = ?",
    )
    .bind(auth.user_id)
    .fetch_one(&db_pool)
    .await?;

    Ok(Json(user_response(user)))
}

pub async fn list_users(
    State(AppState { db_pool }): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users ORDER BY username",
    )
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(users.into_iter().map(user_response).collect()))
}

pub async fn create_user(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    if payload.password != payload.password_confirm {
        return Err(AppError::validation("Passwords do not match"));
    }

    let user = insert_user(&db_pool, &payload.username, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(user_response(user))))
}

// PUT /users/:id - Edit a user. Without a new password the stored hash is
// left untouched.
pub async fn update_user(
    State(AppState { db_pool }): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let password_hash = match &payload.password {
        Some(password) => {
            if payload.password_confirm.as_deref() != Some(password.as_str()) {
                return Err(AppError::validation("Passwords do not match"));
            }
            if password.len() < 6 {
                return Err(AppError::validation("Password too short"));
            }
            Some(
                hash(password, DEFAULT_COST)
                    .map_err(|e| AppError::internal(format!("Hash error: {e}")))?,
            )
        }
        None => None,
    };

    if let Some(username) = &payload.username {
        if username.trim().is_empty() {
            return Err(AppError::validation("Username required"));
        }
    }

    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET
         username = COALESCE(?, username),
         password_hash = COALESCE(?, password_hash)
         WHERE id = ?
         RETURNING id, username, password_hash, created_at",
    )
    .bind(payload.username)
    .bind(password_hash)
    .bind(id)
    .fetch_optional(&db_pool)
    .await
    .map_err(map_unique_violation)?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(user_response(user)))
}

// DELETE /users/:id - The authenticated account cannot delete itself.
pub async fn delete_user(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<()>, AppError> {
    if id == auth.user_id {
        return Err(AppError::validation("You cannot delete your own account"));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("User not found"));
    }

    Ok(Json(()))
}
