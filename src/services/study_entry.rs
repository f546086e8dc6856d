use crate::auth::AuthUser;
use crate::db::operations::{decks, progress};
use crate::db::operations::decks::{DeckRecord, FlashcardRecord, Visibility};
use crate::db::Database;

/// Everything a study mode needs before a session may start.
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    pub deck: DeckRecord,
    pub cards: Vec<FlashcardRecord>,
    pub initial_mastery: f64,
}

/// Outcome of resolving a study-mode entry point. The presentation layer
/// pattern-matches on this instead of steering control flow through
/// redirects; a blocked entry never constructs a session.
#[derive(Debug)]
pub enum EntryResolution {
    Granted(ResolvedEntry),
    NotFound,
    Unauthenticated,
    Forbidden,
    Empty,
}

pub async fn resolve(
    db: &Database,
    deck_id: Option<&str>,
    user: Option<&AuthUser>,
) -> Result<EntryResolution, sqlx::Error> {
    let Some(deck_id) = deck_id.filter(|id| !id.trim().is_empty()) else {
        return Ok(EntryResolution::NotFound);
    };
    let Some(user) = user else {
        return Ok(EntryResolution::Unauthenticated);
    };

    let Some(deck) = decks::find_deck(db, deck_id).await? else {
        return Ok(EntryResolution::NotFound);
    };

    if deck.visibility != Visibility::Public && deck.owner_id != user.id {
        // No deck content leaves this function on the denied path.
        return Ok(EntryResolution::Forbidden);
    }

    let cards = decks::list_cards(db, deck_id).await?;
    if cards.is_empty() {
        return Ok(EntryResolution::Empty);
    }

    let initial_mastery = progress::get_mastery(db, deck_id, &user.id).await?;

    Ok(EntryResolution::Granted(ResolvedEntry {
        deck,
        cards,
        initial_mastery,
    }))
}
