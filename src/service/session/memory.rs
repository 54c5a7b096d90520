//! In-process session store backend.
//!
//! Holds all conversation state in a mutex-guarded map. State lives for the
//! process lifetime and is lost on restart; that is accepted behavior for
//! this service, not a defect.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::base::types::{Res, Session, Void};

use super::{GenericSessionStore, SessionStore};

// Extra methods on `SessionStore` applied by the in-memory implementation.

impl SessionStore {
    pub fn memory() -> Self {
        Self {
            inner: Arc::new(MemorySessionStore::default()),
        }
    }
}

// Specific implementations.

/// In-memory session store implementation.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

#[async_trait]
impl GenericSessionStore for MemorySessionStore {
    #[instrument(name = "MemorySessionStore::get_or_create", skip_all)]
    async fn get_or_create(&self, session_id: &str) -> Res<Session> {
        let mut sessions = self.sessions.lock().await;

        Ok(sessions.entry(session_id.to_string()).or_default().clone())
    }

    #[instrument(name = "MemorySessionStore::commit", skip_all)]
    async fn commit(&self, session_id: &str, session: Session) -> Void {
        let mut sessions = self.sessions.lock().await;

        sessions.insert(session_id.to_string(), session);

        Ok(())
    }

    #[instrument(name = "MemorySessionStore::reset", skip_all)]
    async fn reset(&self, session_id: &str) -> Void {
        let mut sessions = self.sessions.lock().await;

        sessions.remove(session_id);

        Ok(())
    }
}

// Tests.
