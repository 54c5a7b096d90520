pub mod openai;

use crate::base::types::{AgentReply, InterviewContext, Res};
use async_trait::async_trait;
use std::sync::Arc;
use std::ops::Deref;

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the core functionality for interacting with large language models.
/// Implementing this trait allows different LLM providers to be used for the interview.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Run one turn of the bug report interview.
    ///
    /// Takes the prior conversation, the new transcript, optional console
    /// logs, and the current draft, and returns the agent's conversational
    /// reply together with the fields it extracted from this turn. The
    /// provider's payload is untrusted and must be schema-validated before
    /// it is returned; an unparsable payload is an error, never a guess.
    async fn get_interview_agent_response(&self, context: &InterviewContext) -> Res<AgentReply>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}
