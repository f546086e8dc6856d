use chrono::Utc;
use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

use crate::db::Database;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub visibility: Visibility,
    pub card_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardRecord {
    pub id: String,
    pub question: String,
    pub answer: String,
}

pub async fn insert_deck(
    db: &Database,
    owner_id: &str,
    name: &str,
    description: &str,
    visibility: Visibility,
    cards: &[(String, String)],
) -> Result<DeckRecord, sqlx::Error> {
    let deck_id = Uuid::new_v4().to_string();
    let mut tx = db.pool().begin().await?;

    sqlx::query(
        r#"
        INSERT INTO decks (id, owner_id, name, description, visibility, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&deck_id)
    .bind(owner_id)
    .bind(name)
    .bind(description)
    .bind(visibility.as_str())
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *tx)
    .await?;

    for (position, (question, answer)) in cards.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO flashcards (id, deck_id, position, question, answer)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&deck_id)
        .bind(position as i64)
        .bind(question)
        .bind(answer)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(DeckRecord {
        id: deck_id,
        owner_id: owner_id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        visibility,
        card_count: cards.len() as i64,
    })
}

pub async fn find_deck(db: &Database, deck_id: &str) -> Result<Option<DeckRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT d.id, d.owner_id, d.name, d.description, d.visibility,
               (SELECT COUNT(*) FROM flashcards f WHERE f.deck_id = d.id) AS card_count
        FROM decks d
        WHERE d.id = ?
        LIMIT 1
        "#,
    )
    .bind(deck_id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.map(|row| map_deck(&row)))
}

/// Own decks plus everyone's public decks, newest first.
pub async fn list_library(db: &Database, user_id: &str) -> Result<Vec<DeckRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT d.id, d.owner_id, d.name, d.description, d.visibility,
               (SELECT COUNT(*) FROM flashcards f WHERE f.deck_id = d.id) AS card_count
        FROM decks d
        WHERE d.owner_id = ? OR d.visibility = 'public'
        ORDER BY d.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows.iter().map(map_deck).collect())
}

pub async fn list_cards(db: &Database, deck_id: &str) -> Result<Vec<FlashcardRecord>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, question, answer FROM flashcards WHERE deck_id = ? ORDER BY position",
    )
    .bind(deck_id)
    .fetch_all(db.pool())
    .await?;

    Ok(rows
        .iter()
        .map(|row| FlashcardRecord {
            id: row.get("id"),
            question: row.get("question"),
            answer: row.get("answer"),
        })
        .collect())
}

fn map_deck(row: &sqlx::sqlite::SqliteRow) -> DeckRecord {
    let visibility: String = row.get("visibility");
    DeckRecord {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        description: row.get("description"),
        visibility: Visibility::parse(&visibility).unwrap_or(Visibility::Private),
        card_count: row.get("card_count"),
    }
}
