use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{mint_token, AuthUser};
use crate::db::operations::users;
use crate::response::{json_error, json_ok, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    email: String,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    user: AuthUser,
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();
    let username = payload.username.trim().to_string();

    if !email.contains('@') {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "INVALID_EMAIL",
            "a valid email address is required",
        ));
    }
    if username.is_empty() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "INVALID_USERNAME",
            "username must not be empty",
        ));
    }
    if payload.password.len() < 8 {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "INVALID_PASSWORD",
            "password must be at least 8 characters",
        ));
    }

    if users::find_by_email(state.db(), &email).await?.is_some() {
        return Err(AppError::conflict("email is already registered"));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal(e.to_string()))?;
    let user = users::insert_user(state.db(), &email, &username, &password_hash).await?;

    state
        .energy()
        .grant(&user.id, state.config().starting_energy)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    let token = mint_token(
        &user.id,
        &state.config().auth_secret,
        state.config().auth_token_ttl_seconds,
    );

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        json_ok(AuthResponse {
            token,
            user: AuthUser {
                id: user.id,
                email: user.email,
                username: user.username,
            },
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();

    let Some(user) = users::find_by_email(state.db(), &email).await? else {
        return Err(AppError::unauthorized("invalid email or password"));
    };

    let valid = bcrypt::verify(&payload.password, &user.password_hash)
        .map_err(|e| AppError::internal(e.to_string()))?;
    if !valid {
        return Err(AppError::unauthorized("invalid email or password"));
    }

    let token = mint_token(
        &user.id,
        &state.config().auth_secret,
        state.config().auth_token_ttl_seconds,
    );

    Ok(json_ok(AuthResponse {
        token,
        user: AuthUser {
            id: user.id,
            email: user.email,
            username: user.username,
        },
    }))
}
