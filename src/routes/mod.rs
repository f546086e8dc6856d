mod auth;
mod decks;
mod health;
mod quiz;
mod study;
mod users;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::live))
        .route("/health/info", get(health::info))
        .nest("/api/auth", auth::router())
        .nest("/api/users", users::router())
        .nest("/api/decks", decks::router())
        .nest("/api/study/sessions", study::router())
        .nest("/api/quiz/tokens", quiz::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found")
}
