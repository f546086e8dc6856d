use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::db::operations::energy::SqlEnergyLedger;
use crate::db::operations::progress::SqlProgressStore;
use crate::db::operations::tokens::SqlTokenStore;
use crate::db::Database;
use crate::services::mastery::MasteryPolicy;
use crate::services::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    config: Arc<Config>,
    db: Database,
    sessions: Arc<SessionManager<SqlProgressStore>>,
    energy: SqlEnergyLedger,
    tokens: SqlTokenStore,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        let sessions = SessionManager::new(
            SqlProgressStore::new(db.clone()),
            MasteryPolicy::default(),
        );
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            config: Arc::new(config),
            energy: SqlEnergyLedger::new(db.clone()),
            tokens: SqlTokenStore::new(db.clone()),
            sessions: Arc::new(sessions),
            db,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn sessions(&self) -> &SessionManager<SqlProgressStore> {
        &self.sessions
    }

    pub fn energy(&self) -> &SqlEnergyLedger {
        &self.energy
    }

    pub fn tokens(&self) -> &SqlTokenStore {
        &self.tokens
    }
}
