//! Runtime services and shared state for the bug-report-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    server,
    service::{llm::LlmClient, session::SessionStore, store::StoreClient, tracker::TrackerClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the session store, the service clients, and the
/// configuration. It is designed to be trivially cloneable, allowing it to be
/// passed around (and into axum state) without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The session store instance.
    pub sessions: SessionStore,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The blob store client instance.
    pub store: StoreClient,
    /// The ticket tracker client instance.
    pub tracker: TrackerClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the session store.
        let sessions = SessionStore::memory();

        // Initialize the LLM client.
        let llm = LlmClient::openai(&config);

        // Initialize the blob store client.
        let store = StoreClient::http(&config);

        // Initialize the tracker client.
        let tracker = TrackerClient::jira();

        Ok(Self {
            config,
            sessions,
            llm,
            store,
            tracker,
        })
    }

    pub async fn start(self) -> Void {
        server::serve(self).await
    }
}
