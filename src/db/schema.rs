use sqlx::SqlitePool;

/// Bootstrap DDL. Applied at startup; every statement is idempotent.
const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        username TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS decks (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL REFERENCES users(id),
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        visibility TEXT NOT NULL DEFAULT 'private'
            CHECK (visibility IN ('public', 'private')),
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS flashcards (
        id TEXT PRIMARY KEY,
        deck_id TEXT NOT NULL REFERENCES decks(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        question TEXT NOT NULL,
        answer TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_flashcards_deck
        ON flashcards(deck_id, position)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS progress (
        deck_id TEXT NOT NULL REFERENCES decks(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES users(id),
        mastery REAL NOT NULL DEFAULT 0
            CHECK (mastery >= 0 AND mastery <= 100),
        seconds_studied INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (deck_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS energy_balances (
        user_id TEXT PRIMARY KEY REFERENCES users(id),
        amount INTEGER NOT NULL DEFAULT 0 CHECK (amount >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quiz_access_tokens (
        token TEXT PRIMARY KEY,
        deck_id TEXT NOT NULL REFERENCES decks(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES users(id),
        num_questions INTEGER NOT NULL,
        issued_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL,
        consumed INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_quiz_tokens_expiry
        ON quiz_access_tokens(expires_at)
    "#,
];

pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
