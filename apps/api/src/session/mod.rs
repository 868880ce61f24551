//! Session context: the authentication flag and the latest batch results.
//!
//! Sessions live in memory only and are discarded on restart. Each analysis
//! run replaces a session's results wholesale; a reset clears them. A session
//! left idle for longer than the store's TTL is evicted.

pub mod access;
pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::batch::BatchOutcome;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub authenticated: bool,
    /// `None` until the first analysis completes, and again after a reset.
    pub results: Option<BatchOutcome>,
    /// Refreshed on every lookup or update.
    pub last_seen: Instant,
}

impl Session {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.last_seen) > ttl
    }
}

/// In-memory session map shared by all handlers.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    /// `ttl` is the idle time after which a session is dropped.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            ttl,
        }
    }

    pub async fn create(&self, authenticated: bool) -> Session {
        let now = Instant::now();
        let session = Session {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            authenticated,
            results: None,
            last_seen: now,
        };

        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(self.ttl, now));
        if sessions.len() < before {
            debug!("Evicted {} idle sessions", before - sessions.len());
        }
        sessions.insert(session.id, session.clone());
        drop(sessions);

        info!("Created session {}", session.id);
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<Session, AppError> {
        let mut sessions = self.inner.write().await;
        let session = live_session(&mut sessions, id, self.ttl)?;
        Ok(session.clone())
    }

    /// Like `get`, but rejects sessions that have not passed the access gate.
    pub async fn require_access(&self, id: Uuid) -> Result<Session, AppError> {
        let session = self.get(id).await?;
        if !session.authenticated {
            return Err(AppError::Unauthorized);
        }
        Ok(session)
    }

    /// Marks the session authenticated for the rest of its life.
    pub async fn authenticate(&self, id: Uuid) -> Result<(), AppError> {
        self.update(id, |s| s.authenticated = true).await
    }

    pub async fn replace_results(&self, id: Uuid, outcome: BatchOutcome) -> Result<(), AppError> {
        self.update(id, move |s| s.results = Some(outcome)).await
    }

    /// Clears results; authentication is kept.
    pub async fn reset(&self, id: Uuid) -> Result<(), AppError> {
        self.update(id, |s| s.results = None).await
    }

    async fn update<F>(&self, id: Uuid, apply: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.inner.write().await;
        let session = live_session(&mut sessions, id, self.ttl)?;
        apply(session);
        Ok(())
    }
}

/// Looks up a session and refreshes its idle clock. An expired entry is removed and reads as missing.
fn live_session(
    sessions: &mut HashMap<Uuid, Session>,
    id: Uuid,
    ttl: Duration,
) -> Result<&mut Session, AppError> {
    let now = Instant::now();
    if sessions.get(&id).is_some_and(|s| s.is_expired(ttl, now)) {
        sessions.remove(&id);
        info!("Session {id} expired");
    }
    let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
    session.last_seen = now;
    Ok(session)
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
