//! Application state: the key/value store, config, and in-flight sessions.
//!
//! This module owns:
//!   - the persistence backend (memory or JSON files, chosen from config)
//!   - in-flight sessions by id, bounded by count and age
//!   - the lock that serializes read-modify-write cycles on stored records
//!
//! There is no process-wide singleton; handlers receive `Arc<AppState>`.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument};

use crate::config::AppConfig;
use crate::difficulty::SessionParameters;
use crate::domain::{Task, Track};
use crate::store::{FileStore, KeyValueStore, MemoryStore};

/// A running 3-task session.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub island: Option<u8>,
    pub track: Track,
    pub params: SessionParameters,
    pub hard_mode: bool,
    pub tasks: Vec<Task>,
    /// Index of the task currently awaiting a correct answer.
    pub step: usize,
    pub mistakes: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub config: AppConfig,
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
    /// Held across load-modify-save of profile, analytics and progress.
    pub records: Arc<Mutex<()>>,
}

impl AppState {
    /// Build state from config. A data directory that cannot be opened falls back to memory.
    #[instrument(level = "info", skip_all)]
    pub fn new(config: AppConfig) -> Self {
        let store: Arc<dyn KeyValueStore> = match &config.store.data_dir {
            Some(dir) => match FileStore::open(dir) {
                Ok(fs) => {
                    info!(target: "talentia_backend", dir = %fs.dir().display(), "Using file store");
                    Arc::new(fs)
                }
                Err(e) => {
                    error!(target: "talentia_backend", dir = %dir.display(), error = %e, "Cannot open data dir; using in-memory store");
                    Arc::new(MemoryStore::new())
                }
            },
            None => {
                info!(target: "talentia_backend", "No data dir configured; using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };
        Self::with_store(config, store)
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            records: Arc::new(Mutex::new(())),
        }
    }

    /// Register a session. Expired sessions are dropped first; at the cap the oldest make room.
    pub async fn insert_session(&self, session: Session) {
        let limits = &self.config.sessions;
        let mut sessions = self.sessions.write().await;

        let cutoff = session.created_at - Duration::minutes(limits.ttl_minutes);
        let before = sessions.len();
        sessions.retain(|_, s| s.created_at > cutoff);

        if sessions.len() >= limits.max_live {
            let mut by_age: Vec<(DateTime<Utc>, String)> =
                sessions.values().map(|s| (s.created_at, s.id.clone())).collect();
            by_age.sort();
            let excess = sessions.len() + 1 - limits.max_live.max(1);
            for (_, id) in by_age.into_iter().take(excess) {
                sessions.remove(&id);
            }
        }

        let evicted = before.saturating_sub(sessions.len());
        if evicted > 0 {
            debug!(target: "session", evicted, live = sessions.len(), "Evicted stale sessions");
        }
        sessions.insert(session.id.clone(), session);
    }

    #[cfg(test)]
    pub async fn get_session(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }
}
