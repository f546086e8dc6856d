use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::Serialize;

use crate::auth::require_user;
use crate::response::{json_ok, AppError};
use crate::services::energy::EnergyLedger;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnergyResponse {
    amount: i64,
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/me", get(me))
        .route("/me/energy", get(energy))
}

async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(&state, &headers).await?;
    Ok(json_ok(user))
}

async fn energy(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(&state, &headers).await?;
    let amount = state
        .energy()
        .balance(&user.id)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;
    Ok(json_ok(EnergyResponse { amount }))
}
