//! Session storage for in-flight bug report conversations.
//!
//! The store keeps the per-session conversation state: prior turns, the
//! current draft, and the completion flag. The default backend is an
//! in-process map; the `GenericSessionStore` trait keeps the backing
//! pluggable so a multi-instance deployment can swap in an external
//! key-value store.

pub mod memory;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Res, Session, Void};

// Traits.

/// Generic session store trait that backends must implement.
///
/// Turns operate on a snapshot: the coordinator reads with `get_or_create`,
/// computes the turn against it, and publishes the outcome with `commit`.
/// Overlapping turns for the same session resolve last-writer-wins; the
/// design assumes a user does not send overlapping turns for one session.
#[async_trait]
pub trait GenericSessionStore: Send + Sync + 'static {
    /// Gets the session by its ID, creating an empty one if it does not exist.
    async fn get_or_create(&self, session_id: &str) -> Res<Session>;

    /// Publishes the outcome of one turn for the session.
    async fn commit(&self, session_id: &str, session: Session) -> Void;

    /// Destroys the session. Idempotent; absent sessions are not an error.
    async fn reset(&self, session_id: &str) -> Void;
}

// Structs.

/// Session store for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<dyn GenericSessionStore>,
}

impl SessionStore {
    pub fn new(inner: Arc<dyn GenericSessionStore>) -> Self {
        Self { inner }
    }
}

impl Deref for SessionStore {
    type Target = dyn GenericSessionStore;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}
