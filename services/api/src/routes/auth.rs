//! Registration and login handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use common::error::DatabaseError;
use serde_json::json;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{ConflictField, LoginRequest, NewUser, RegisterRequest, UserProfile},
    password::{hash_password, verify_password},
    response::success,
    state::AppState,
    validation::{validate_login, validate_registration},
};

const REGISTER_FAILED: &str = "Server error during registration.";
const LOGIN_FAILED: &str = "Server error during login.";

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let registration = validate_registration(request)?;

    let existing = state
        .users
        .find_conflicting(
            &registration.username,
            &registration.email,
            &registration.mobile,
        )
        .await
        .map_err(ApiError::internal(REGISTER_FAILED))?;

    if let Some(existing) = existing {
        let field = ConflictField::between(&existing, &registration.username, &registration.email);
        return Err(ApiError::Conflict(field.message().to_string()));
    }

    let password_hash =
        hash_password(&registration.password).map_err(ApiError::internal(REGISTER_FAILED))?;

    let new_user = NewUser {
        username: registration.username,
        password_hash,
        first_name: registration.first_name,
        last_name: registration.last_name,
        email: registration.email,
        mobile: registration.mobile,
    };

    // A concurrent registration can still win the race to the unique index
    let user = state.users.create(&new_user).await.map_err(|e| match e {
        DatabaseError::UniqueViolation { constraint } => {
            let message = constraint
                .as_deref()
                .and_then(ConflictField::from_constraint)
                .map_or("User already exists.", ConflictField::message);
            ApiError::Conflict(message.to_string())
        }
        other => ApiError::internal(REGISTER_FAILED)(other),
    })?;

    info!("Registered user {} ({})", user.username, user.id);

    Ok(success(
        StatusCode::CREATED,
        "User registered successfully",
        json!({ "userId": user.id }),
    ))
}

/// User login endpoint
///
/// An unknown username is reported as 404 and a wrong password as 401. This
/// reveals which usernames exist; it is kept as the documented API contract.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let (username, password) = validate_login(request)?;

    info!("Login attempt for user: {}", username);

    let user = state
        .users
        .find_by_username(&username)
        .await
        .map_err(ApiError::internal(LOGIN_FAILED))?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let matches =
        verify_password(&user.password_hash, &password).map_err(ApiError::internal(LOGIN_FAILED))?;
    if !matches {
        return Err(ApiError::Unauthorized("Invalid credentials.".to_string()));
    }

    let user = state
        .users
        .record_login(user.id, Utc::now())
        .await
        .map_err(ApiError::internal(LOGIN_FAILED))?;

    let token = state
        .jwt_service
        .generate_token(user.id)
        .map_err(ApiError::internal(LOGIN_FAILED))?;

    Ok(success(
        StatusCode::OK,
        "Login successful",
        json!({
            "token": token,
            "user": UserProfile::from(&user),
        }),
    ))
}
