use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::require_user;
use crate::response::{json_error, json_ok, AppError};
use crate::services::quiz_token::{self, QuizSize, QuizTokenError};
use crate::services::study_entry::{self, EntryResolution};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueTokenRequest {
    deck_id: String,
    num_questions: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssuedTokenResponse {
    token: String,
    deck_id: String,
    num_questions: i64,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedeemTokenRequest {
    token: String,
    deck_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RedeemedTokenResponse {
    granted: bool,
    deck_id: String,
    num_questions: i64,
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", post(issue_token))
        .route("/redeem", post(redeem_token))
}

/// Issues a quiz access token for a deck the user can study. Costs a fixed
/// amount of energy; the deduction happens atomically inside the issuer,
/// so a failed issuance never charges the user.
async fn issue_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<IssueTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(&state, &headers).await?;

    let size = QuizSize::try_from(payload.num_questions).map_err(quiz_error)?;

    // Token scope follows deck access: no tokens for decks the user cannot
    // study, and none for empty decks.
    match study_entry::resolve(state.db(), Some(payload.deck_id.as_str()), Some(&user)).await? {
        EntryResolution::Granted(_) => {}
        EntryResolution::NotFound | EntryResolution::Unauthenticated => {
            return Err(json_error(
                StatusCode::NOT_FOUND,
                "DECK_NOT_FOUND",
                "deck not found",
            ))
        }
        EntryResolution::Forbidden => return Err(AppError::forbidden("this deck is private")),
        EntryResolution::Empty => {
            return Err(json_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_DECK",
                "this deck doesn't have any flashcards yet",
            ))
        }
    }

    let token = quiz_token::issue(
        state.energy(),
        state.tokens(),
        &user.id,
        &payload.deck_id,
        size,
        state.config().quiz_energy_cost,
        state.config().quiz_token_ttl_seconds,
    )
    .await
    .map_err(quiz_error)?;

    Ok((
        StatusCode::CREATED,
        json_ok(IssuedTokenResponse {
            token: token.token,
            deck_id: token.deck_id,
            num_questions: token.num_questions,
            expires_at: token.expires_at,
        }),
    ))
}

/// Gate into the generated quiz: consumes the token exactly once.
async fn redeem_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RedeemTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(&state, &headers).await?;

    let token = quiz_token::redeem(state.tokens(), &payload.token, &payload.deck_id, &user.id)
        .await
        .map_err(quiz_error)?;

    Ok(json_ok(RedeemedTokenResponse {
        granted: true,
        deck_id: token.deck_id,
        num_questions: token.num_questions,
    }))
}

fn quiz_error(err: QuizTokenError) -> AppError {
    match err {
        QuizTokenError::InvalidQuestionCount(_) => json_error(
            StatusCode::BAD_REQUEST,
            "INVALID_QUESTION_COUNT",
            "number of questions must be 10, 15 or 20",
        ),
        QuizTokenError::InsufficientEnergy => json_error(
            StatusCode::CONFLICT,
            "INSUFFICIENT_ENERGY",
            "you don't have enough energy to generate a quiz",
        ),
        QuizTokenError::TokenNotFound => json_error(
            StatusCode::NOT_FOUND,
            "TOKEN_NOT_FOUND",
            "quiz access token not found",
        ),
        QuizTokenError::TokenExpired => json_error(
            StatusCode::GONE,
            "TOKEN_EXPIRED",
            "quiz access token has expired",
        ),
        QuizTokenError::TokenAlreadyConsumed => json_error(
            StatusCode::CONFLICT,
            "TOKEN_ALREADY_CONSUMED",
            "quiz access token was already used",
        ),
        QuizTokenError::TokenScopeMismatch => json_error(
            StatusCode::FORBIDDEN,
            "TOKEN_SCOPE_MISMATCH",
            "quiz access token was issued for a different deck",
        ),
        QuizTokenError::Ledger(e) => AppError::internal(e.to_string()),
        QuizTokenError::Store(e) => AppError::internal(e.to_string()),
    }
}
