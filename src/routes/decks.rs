use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use serde::{Deserialize, Serialize};

use crate::auth::require_user;
use crate::db::operations::decks::{self, DeckRecord, FlashcardRecord, Visibility};
use crate::db::operations::progress;
use crate::response::{json_error, json_ok, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDeckRequest {
    name: String,
    #[serde(default)]
    description: String,
    visibility: Option<String>,
    #[serde(default)]
    flashcards: Vec<CardInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardInput {
    question: String,
    answer: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeckDetail {
    #[serde(flatten)]
    deck: DeckRecord,
    flashcards: Vec<FlashcardRecord>,
    mastery: f64,
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list_decks).post(create_deck))
        .route("/:deckId", get(get_deck))
}

async fn create_deck(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateDeckRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(&state, &headers).await?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "INVALID_NAME",
            "deck name must not be empty",
        ));
    }

    let visibility = match payload.visibility.as_deref() {
        None => Visibility::Private,
        Some(raw) => Visibility::parse(raw).ok_or_else(|| {
            json_error(
                StatusCode::BAD_REQUEST,
                "INVALID_VISIBILITY",
                "visibility must be 'public' or 'private'",
            )
        })?,
    };

    for card in &payload.flashcards {
        if card.question.trim().is_empty() || card.answer.trim().is_empty() {
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                "INVALID_FLASHCARD",
                "every flashcard needs a question and an answer",
            ));
        }
    }

    let cards: Vec<(String, String)> = payload
        .flashcards
        .iter()
        .map(|c| (c.question.trim().to_string(), c.answer.trim().to_string()))
        .collect();

    let deck = decks::insert_deck(
        state.db(),
        &user.id,
        name,
        payload.description.trim(),
        visibility,
        &cards,
    )
    .await?;

    Ok((StatusCode::CREATED, json_ok(deck)))
}

async fn list_decks(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(&state, &headers).await?;
    let library = decks::list_library(state.db(), &user.id).await?;
    Ok(json_ok(library))
}

async fn get_deck(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(deck_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(&state, &headers).await?;

    let Some(deck) = decks::find_deck(state.db(), &deck_id).await? else {
        return Err(json_error(
            StatusCode::NOT_FOUND,
            "DECK_NOT_FOUND",
            "deck not found",
        ));
    };

    if deck.visibility != Visibility::Public && deck.owner_id != user.id {
        return Err(AppError::forbidden("this deck is private"));
    }

    let flashcards = decks::list_cards(state.db(), &deck_id).await?;
    let mastery = progress::get_mastery(state.db(), &deck_id, &user.id).await?;

    Ok(json_ok(DeckDetail {
        deck,
        flashcards,
        mastery,
    }))
}

use axum::Json;
