use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::maybe_user;
use crate::db::operations::decks::{DeckRecord, FlashcardRecord};
use crate::response::{json_error, json_ok, AppError};
use crate::services::mastery::StudyMode;
use crate::services::session::{
    NavAction, SessionContext, SessionError, SessionSnapshot,
};
use crate::services::study_entry::{self, EntryResolution};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartSessionRequest {
    deck_id: Option<String>,
    mode: StudyMode,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartSessionResponse {
    session: SessionSnapshot,
    deck: DeckRecord,
    flashcards: Vec<FlashcardRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TickResponse {
    elapsed_seconds: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AbandonedResponse {
    discarded: bool,
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", post(start_session))
        .route("/:sessionId", get(get_session).delete(abandon_session))
        .route("/:sessionId/tick", post(tick_session))
        .route("/:sessionId/end", post(end_session))
        .route("/:sessionId/flip", post(flip_card))
        .route("/:sessionId/next", post(next_card))
        .route("/:sessionId/prev", post(prev_card))
}

/// Entry point for every study mode: resolves the deck, then starts the
/// in-memory session. A blocked entry (missing deck, no access, empty
/// deck) never constructs a session.
async fn start_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<StartSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = maybe_user(&state, &headers).await?;

    let entry = study_entry::resolve(state.db(), payload.deck_id.as_deref(), user.as_ref()).await?;

    let entry = match entry {
        EntryResolution::Granted(entry) => entry,
        EntryResolution::NotFound => {
            return Err(json_error(
                StatusCode::NOT_FOUND,
                "DECK_NOT_FOUND",
                "deck not found",
            ))
        }
        EntryResolution::Unauthenticated => {
            return Err(AppError::unauthorized("authentication required"))
        }
        EntryResolution::Forbidden => return Err(AppError::forbidden("this deck is private")),
        EntryResolution::Empty => {
            return Err(json_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_DECK",
                "this deck doesn't have any flashcards yet",
            ))
        }
    };

    // Granted entries only resolve for an authenticated user.
    let Some(user) = user else {
        return Err(AppError::unauthorized("authentication required"));
    };

    let snapshot = state
        .sessions()
        .start(SessionContext {
            deck_id: entry.deck.id.clone(),
            user_id: user.id.clone(),
            mode: payload.mode,
            initial_mastery: entry.initial_mastery,
            card_count: entry.cards.len(),
        })
        .map_err(session_error)?;

    Ok((
        StatusCode::CREATED,
        json_ok(StartSessionResponse {
            session: snapshot,
            deck: entry.deck,
            flashcards: entry.cards,
        }),
    ))
}

/// Status + the end-session confirmation preview: studied time, projected
/// mastery, gain, and whether the mode cap blocks further progress.
async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_session_user(&state, &headers).await?;
    let session = state
        .sessions()
        .snapshot(&session_id, &user)
        .map_err(session_error)?;
    let preview = state
        .sessions()
        .preview(&session_id, &user)
        .map_err(session_error)?;

    Ok(json_ok(serde_json::json!({
        "session": session,
        "preview": preview,
    })))
}

async fn tick_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_session_user(&state, &headers).await?;
    let elapsed_seconds = state
        .sessions()
        .tick(&session_id, &user)
        .map_err(session_error)?;
    Ok(json_ok(TickResponse { elapsed_seconds }))
}

async fn end_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_session_user(&state, &headers).await?;
    let outcome = state
        .sessions()
        .end(&session_id, &user)
        .await
        .map_err(session_error)?;
    Ok(json_ok(outcome))
}

async fn abandon_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_session_user(&state, &headers).await?;
    state
        .sessions()
        .abandon(&session_id, &user)
        .map_err(session_error)?;
    Ok(json_ok(AbandonedResponse { discarded: true }))
}

async fn flip_card(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    navigate(state, headers, session_id, NavAction::Flip).await
}

async fn next_card(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    navigate(state, headers, session_id, NavAction::Next).await
}

async fn prev_card(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    navigate(state, headers, session_id, NavAction::Prev).await
}

async fn navigate(
    state: AppState,
    headers: HeaderMap,
    session_id: String,
    action: NavAction,
) -> Result<axum::response::Response, AppError> {
    let user = require_session_user(&state, &headers).await?;
    let position = state
        .sessions()
        .navigate(&session_id, &user, action)
        .map_err(session_error)?;
    Ok(json_ok(position).into_response())
}

async fn require_session_user(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    crate::auth::require_user(state, headers)
        .await
        .map(|user| user.id)
}

fn session_error(err: SessionError) -> AppError {
    match err {
        SessionError::AlreadyActive => json_error(
            StatusCode::CONFLICT,
            "SESSION_ACTIVE",
            "a session is already active for this deck",
        ),
        SessionError::NotFound => json_error(
            StatusCode::NOT_FOUND,
            "SESSION_NOT_FOUND",
            "session not found",
        ),
        SessionError::SaveInProgress => json_error(
            StatusCode::CONFLICT,
            "SAVE_IN_PROGRESS",
            "this session is already being saved",
        ),
        SessionError::SaveFailed(message) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SAVE_FAILED",
            format!("progress could not be saved, try again: {message}"),
        ),
        SessionError::NotFlipMode => json_error(
            StatusCode::BAD_REQUEST,
            "NOT_FLIP_MODE",
            "card navigation is only available in flip mode",
        ),
    }
}
