use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::energy::{EnergyError, EnergyLedger};

/// Allowed quiz lengths. Anything outside this set is rejected before any
/// energy is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuizSize {
    Ten,
    Fifteen,
    Twenty,
}

impl QuizSize {
    pub fn question_count(self) -> i64 {
        match self {
            QuizSize::Ten => 10,
            QuizSize::Fifteen => 15,
            QuizSize::Twenty => 20,
        }
    }
}

impl TryFrom<i64> for QuizSize {
    type Error = QuizTokenError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(QuizSize::Ten),
            15 => Ok(QuizSize::Fifteen),
            20 => Ok(QuizSize::Twenty),
            other => Err(QuizTokenError::InvalidQuestionCount(other)),
        }
    }
}

/// Short-lived single-use credential scoped to one (deck, user, size).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAccessToken {
    pub token: String,
    pub deck_id: String,
    pub user_id: String,
    pub num_questions: i64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("token store error: {0}")]
pub struct TokenStoreError(pub String);

/// Storage boundary for issued tokens. `consume` is the redemption's
/// atomic core: it flips `consumed` iff the token is still unconsumed and
/// unexpired, and reports whether this call won.
pub trait TokenStore: Send + Sync {
    fn insert(
        &self,
        token: &QuizAccessToken,
    ) -> impl Future<Output = Result<(), TokenStoreError>> + Send;

    fn fetch(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<QuizAccessToken>, TokenStoreError>> + Send;

    fn consume(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, TokenStoreError>> + Send;

    fn delete_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, TokenStoreError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum QuizTokenError {
    #[error("invalid question count: {0}")]
    InvalidQuestionCount(i64),
    #[error("not enough energy to start a quiz")]
    InsufficientEnergy,
    #[error("quiz access token not found")]
    TokenNotFound,
    #[error("quiz access token has expired")]
    TokenExpired,
    #[error("quiz access token was already used")]
    TokenAlreadyConsumed,
    #[error("quiz access token was issued for a different deck")]
    TokenScopeMismatch,
    #[error(transparent)]
    Ledger(#[from] EnergyError),
    #[error(transparent)]
    Store(#[from] TokenStoreError),
}

/// Deducts the quiz cost and mints a token in that order. The deduction is
/// atomic at the ledger, so a failed check costs nothing; a failed mint
/// after a successful deduction refunds the cost.
pub async fn issue<L, S>(
    ledger: &L,
    store: &S,
    user_id: &str,
    deck_id: &str,
    size: QuizSize,
    cost: i64,
    ttl_seconds: i64,
) -> Result<QuizAccessToken, QuizTokenError>
where
    L: EnergyLedger,
    S: TokenStore,
{
    if !ledger.try_deduct(user_id, cost).await? {
        return Err(QuizTokenError::InsufficientEnergy);
    }

    let now = Utc::now();
    let token = QuizAccessToken {
        token: Uuid::new_v4().to_string(),
        deck_id: deck_id.to_string(),
        user_id: user_id.to_string(),
        num_questions: size.question_count(),
        issued_at: now,
        expires_at: now + Duration::seconds(ttl_seconds),
        consumed: false,
    };

    if let Err(err) = store.insert(&token).await {
        tracing::warn!(user_id, error = %err, "token mint failed after deduction, refunding");
        if let Err(refund_err) = ledger.credit(user_id, cost).await {
            tracing::error!(user_id, error = %refund_err, "energy refund failed");
        }
        return Err(err.into());
    }

    tracing::info!(
        user_id,
        deck_id,
        num_questions = token.num_questions,
        "quiz access token issued"
    );
    Ok(token)
}

/// Validates and consumes a token for entry into the requested deck's quiz.
/// At most one concurrent redemption can succeed; every failure cause has
/// its own error so the caller can surface a distinct message.
pub async fn redeem<S>(
    store: &S,
    token: &str,
    requested_deck_id: &str,
    requesting_user_id: &str,
) -> Result<QuizAccessToken, QuizTokenError>
where
    S: TokenStore,
{
    let Some(record) = store.fetch(token).await? else {
        return Err(QuizTokenError::TokenNotFound);
    };

    if record.deck_id != requested_deck_id || record.user_id != requesting_user_id {
        return Err(QuizTokenError::TokenScopeMismatch);
    }

    let now = Utc::now();
    if store.consume(token, now).await? {
        return Ok(QuizAccessToken {
            consumed: true,
            ..record
        });
    }

    // The conditional update refused: re-read to name the cause.
    let record = store
        .fetch(token)
        .await?
        .ok_or(QuizTokenError::TokenNotFound)?;
    if record.consumed {
        Err(QuizTokenError::TokenAlreadyConsumed)
    } else {
        Err(QuizTokenError::TokenExpired)
    }
}
