use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use super::flip::FlipNavigator;
use super::mastery::{MasteryPolicy, StudyMode};

/// Wall-clock time spent in an active session. Counting starts at zero,
/// never decreases, and `stop` freezes the value so a retried persist
/// always sees the same elapsed seconds.
#[derive(Debug)]
pub struct ElapsedTimer {
    started: Instant,
    frozen: Option<u64>,
}

impl ElapsedTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            frozen: None,
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        match self.frozen {
            Some(secs) => secs,
            None => self.started.elapsed().as_secs(),
        }
    }

    /// Idempotent: the first stop wins, later stops keep the frozen value.
    pub fn stop(&mut self) -> u64 {
        if self.frozen.is_none() {
            self.frozen = Some(self.started.elapsed().as_secs());
        }
        self.elapsed_seconds()
    }

    #[cfg(test)]
    pub fn backdate(&mut self, seconds: u64) {
        self.started -= Duration::from_secs(seconds);
    }
}

#[derive(Debug, thiserror::Error)]
#[error("progress save failed: {0}")]
pub struct PersistError(pub String);

/// Write-back boundary for the final mastery/time of a session. Must be
/// idempotent under retry; the manager guarantees at most one logical end
/// per session, so last-write-wins is acceptable.
pub trait SessionPersister: Send + Sync {
    fn save(
        &self,
        deck_id: &str,
        user_id: &str,
        mastery: f64,
        seconds_studied: u64,
    ) -> impl Future<Output = Result<(), PersistError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("a session is already active for this deck")]
    AlreadyActive,
    #[error("session not found")]
    NotFound,
    #[error("a save for this session is already in flight")]
    SaveInProgress,
    #[error("session save failed: {0}")]
    SaveFailed(String),
    #[error("card navigation is only available in flip mode")]
    NotFlipMode,
}

/// Inputs a session starts from, resolved once by the entry point and
/// passed in whole so the controller has no hidden mutable context.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub deck_id: String,
    pub user_id: String,
    pub mode: StudyMode,
    pub initial_mastery: f64,
    pub card_count: usize,
}

#[derive(Debug)]
enum SessionState {
    Active,
    Ending { frozen_seconds: u64, save_in_flight: bool },
}

#[derive(Debug)]
struct StudySession {
    id: String,
    deck_id: String,
    user_id: String,
    mode: StudyMode,
    started_at: DateTime<Utc>,
    initial_mastery: f64,
    card_count: usize,
    timer: ElapsedTimer,
    navigator: Option<FlipNavigator>,
    state: SessionState,
    last_touched: Instant,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub deck_id: String,
    pub mode: StudyMode,
    pub started_at: DateTime<Utc>,
    pub initial_mastery: f64,
    pub elapsed_seconds: u64,
    pub card_count: usize,
}

/// What the end-session confirmation dialog shows before the learner
/// commits: studied time, projected mastery, and whether the mode cap
/// blocks further gain.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPreview {
    pub elapsed_seconds: u64,
    pub projected_mastery: f64,
    pub mastery_gain: f64,
    pub cap_reached: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndOutcome {
    pub final_mastery: f64,
    pub mastery_gain: f64,
    pub seconds_studied: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPosition {
    pub current_index: usize,
    pub is_flipped: bool,
    pub total_cards: usize,
}

#[derive(Debug, Clone, Copy)]
pub enum NavAction {
    Flip,
    Next,
    Prev,
}

#[derive(Default)]
struct SessionTable {
    by_id: HashMap<String, StudySession>,
    active_pairs: HashMap<(String, String), String>,
}

/// Owns every live study session for the process. Sessions exist only in
/// memory between `start` and `end`; an abandoned session is simply
/// dropped, with no partial credit.
pub struct SessionManager<P> {
    persister: P,
    policy: MasteryPolicy,
    table: Mutex<SessionTable>,
}

impl<P: SessionPersister> SessionManager<P> {
    pub fn new(persister: P, policy: MasteryPolicy) -> Self {
        Self {
            persister,
            policy,
            table: Mutex::new(SessionTable::default()),
        }
    }

    pub fn start(&self, ctx: SessionContext) -> Result<SessionSnapshot, SessionError> {
        let mut table = self.table.lock();
        let pair = (ctx.user_id.clone(), ctx.deck_id.clone());
        if table.active_pairs.contains_key(&pair) {
            return Err(SessionError::AlreadyActive);
        }

        let navigator = match ctx.mode {
            StudyMode::Flip => FlipNavigator::new(ctx.card_count),
            _ => None,
        };

        let session = StudySession {
            id: Uuid::new_v4().to_string(),
            deck_id: ctx.deck_id,
            user_id: ctx.user_id,
            mode: ctx.mode,
            started_at: Utc::now(),
            initial_mastery: ctx.initial_mastery,
            card_count: ctx.card_count,
            timer: ElapsedTimer::start(),
            navigator,
            state: SessionState::Active,
            last_touched: Instant::now(),
        };

        let snapshot = snapshot_of(&session);
        table.active_pairs.insert(pair, session.id.clone());
        table.by_id.insert(session.id.clone(), session);

        tracing::info!(
            session_id = %snapshot.session_id,
            deck_id = %snapshot.deck_id,
            mode = snapshot.mode.as_str(),
            "study session started"
        );

        Ok(snapshot)
    }

    /// Sampling hook for the caller's scheduling loop. A no-op outside
    /// `active`; always reports the current elapsed seconds.
    pub fn tick(&self, session_id: &str, user_id: &str) -> Result<u64, SessionError> {
        let mut table = self.table.lock();
        let session = owned_session(&mut table, session_id, user_id)?;
        session.last_touched = Instant::now();
        Ok(session.timer.elapsed_seconds())
    }

    pub fn preview(&self, session_id: &str, user_id: &str) -> Result<SessionPreview, SessionError> {
        let mut table = self.table.lock();
        let session = owned_session(&mut table, session_id, user_id)?;
        let elapsed = session.timer.elapsed_seconds();
        let projected = self
            .policy
            .compute(session.initial_mastery, elapsed, session.mode);
        Ok(SessionPreview {
            elapsed_seconds: elapsed,
            projected_mastery: projected,
            mastery_gain: projected - session.initial_mastery,
            cap_reached: self
                .policy
                .cap_reached(session.initial_mastery, elapsed, session.mode),
        })
    }

    pub fn snapshot(&self, session_id: &str, user_id: &str) -> Result<SessionSnapshot, SessionError> {
        let mut table = self.table.lock();
        let session = owned_session(&mut table, session_id, user_id)?;
        Ok(snapshot_of(session))
    }

    pub fn navigate(
        &self,
        session_id: &str,
        user_id: &str,
        action: NavAction,
    ) -> Result<CardPosition, SessionError> {
        let mut table = self.table.lock();
        let session = owned_session(&mut table, session_id, user_id)?;
        session.last_touched = Instant::now();
        let navigator = session.navigator.as_mut().ok_or(SessionError::NotFlipMode)?;
        match action {
            NavAction::Flip => navigator.flip(),
            NavAction::Next => navigator.next(),
            NavAction::Prev => navigator.prev(),
        }
        Ok(CardPosition {
            current_index: navigator.current_index(),
            is_flipped: navigator.is_flipped(),
            total_cards: navigator.total_cards(),
        })
    }

    /// Ends the session: freezes the timer, computes the final mastery from
    /// the frozen elapsed time, then persists. Concurrent calls collapse to
    /// a single persist; on failure the session stays in `ending` and the
    /// call can be retried without double-counting time.
    pub async fn end(&self, session_id: &str, user_id: &str) -> Result<EndOutcome, SessionError> {
        let (deck_id, final_mastery, gain, seconds) = {
            let mut table = self.table.lock();
            let session = owned_session(&mut table, session_id, user_id)?;

            let frozen = match session.state {
                SessionState::Active => {
                    let frozen = session.timer.stop();
                    session.state = SessionState::Ending {
                        frozen_seconds: frozen,
                        save_in_flight: true,
                    };
                    frozen
                }
                SessionState::Ending { save_in_flight: true, .. } => {
                    return Err(SessionError::SaveInProgress);
                }
                SessionState::Ending {
                    frozen_seconds,
                    ref mut save_in_flight,
                } => {
                    *save_in_flight = true;
                    frozen_seconds
                }
            };

            let final_mastery = self
                .policy
                .compute(session.initial_mastery, frozen, session.mode);
            (
                session.deck_id.clone(),
                final_mastery,
                final_mastery - session.initial_mastery,
                frozen,
            )
        };

        let result = self
            .persister
            .save(&deck_id, user_id, final_mastery, seconds)
            .await;

        let mut table = self.table.lock();
        match result {
            Ok(()) => {
                if let Some(session) = table.by_id.remove(session_id) {
                    table
                        .active_pairs
                        .remove(&(session.user_id, session.deck_id));
                }
                tracing::info!(
                    session_id,
                    deck_id = %deck_id,
                    final_mastery,
                    seconds_studied = seconds,
                    "study session ended"
                );
                Ok(EndOutcome {
                    final_mastery,
                    mastery_gain: gain,
                    seconds_studied: seconds,
                })
            }
            Err(err) => {
                if let Some(session) = table.by_id.get_mut(session_id) {
                    if let SessionState::Ending {
                        ref mut save_in_flight,
                        ..
                    } = session.state
                    {
                        *save_in_flight = false;
                    }
                }
                tracing::warn!(session_id, error = %err, "session save failed, staying retryable");
                Err(SessionError::SaveFailed(err.to_string()))
            }
        }
    }

    /// Silent discard. Abandonment is an accepted loss, not an error.
    pub fn abandon(&self, session_id: &str, user_id: &str) -> Result<(), SessionError> {
        let mut table = self.table.lock();
        owned_session(&mut table, session_id, user_id)?;
        if let Some(session) = table.by_id.remove(session_id) {
            table
                .active_pairs
                .remove(&(session.user_id, session.deck_id));
        }
        tracing::debug!(session_id, "study session abandoned");
        Ok(())
    }

    /// Drops sessions nobody has touched for `max_idle`. Used by the
    /// cleanup worker; equivalent to abandonment.
    pub fn discard_stale(&self, max_idle: Duration) -> usize {
        let mut table = self.table.lock();
        let stale: Vec<String> = table
            .by_id
            .values()
            .filter(|s| s.last_touched.elapsed() >= max_idle)
            .map(|s| s.id.clone())
            .collect();
        for id in &stale {
            if let Some(session) = table.by_id.remove(id) {
                table
                    .active_pairs
                    .remove(&(session.user_id, session.deck_id));
            }
        }
        stale.len()
    }

    pub fn active_count(&self) -> usize {
        self.table.lock().by_id.len()
    }

    #[cfg(test)]
    pub fn backdate_session(&self, session_id: &str, seconds: u64) {
        let mut table = self.table.lock();
        if let Some(session) = table.by_id.get_mut(session_id) {
            session.timer.backdate(seconds);
        }
    }
}

fn snapshot_of(session: &StudySession) -> SessionSnapshot {
    SessionSnapshot {
        session_id: session.id.clone(),
        deck_id: session.deck_id.clone(),
        mode: session.mode,
        started_at: session.started_at,
        initial_mastery: session.initial_mastery,
        elapsed_seconds: session.timer.elapsed_seconds(),
        card_count: session.card_count,
    }
}

fn owned_session<'a>(
    table: &'a mut SessionTable,
    session_id: &str,
    user_id: &str,
) -> Result<&'a mut StudySession, SessionError> {
    match table.by_id.get_mut(session_id) {
        Some(session) if session.user_id == user_id => Ok(session),
        _ => Err(SessionError::NotFound),
    }
}
