//! Request coordinator for one inbound chat turn.
//!
//! Each session is a two-state machine: COLLECTING while the draft has
//! missing fields, COMPLETE once the detector fires. The completing turn
//! runs the artifact uploads and ticket creation; COMPLETE is terminal and
//! only an explicit reset (which deletes the session) leaves it.

use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{ChatRequest, ChatResponse, ChatTurn, InterviewContext, Res, TrackerTarget},
    },
    interaction::report::{self, CompletedReport},
    service::{llm::LlmClient, session::SessionStore, store::StoreClient, tracker::TrackerClient},
};

/// Failures that abort a chat turn.
///
/// Upload and ticket failures are deliberately absent: they are partial
/// results carried inside a successful response, not turn failures.
#[derive(Debug, Error)]
pub enum TurnError {
    /// The request shape is invalid; rejected before any external call.
    #[error("{0}")]
    InvalidRequest(String),
    /// The completion API call failed, timed out, or returned an unparsable
    /// payload. The session draft is left at its last known-good value.
    #[error("Bug report agent is unavailable: {0}")]
    AgentUnavailable(#[source] crate::base::types::Err),
    /// The session store failed.
    #[error("Internal error: {0}")]
    Internal(#[source] crate::base::types::Err),
}

/// Handle one turn of the bug report conversation.
#[instrument(skip_all, fields(session_id = %request.session_id))]
pub async fn handle_chat_turn(
    request: ChatRequest,
    sessions: &SessionStore,
    llm: &LlmClient,
    store: &StoreClient,
    tracker: &TrackerClient,
    config: &Config,
) -> Result<ChatResponse, TurnError> {
    let transcript = request.transcript.trim().to_string();
    if transcript.is_empty() {
        return Err(TurnError::InvalidRequest("Transcript cannot be empty.".to_string()));
    }
    if request.session_id.trim().is_empty() {
        return Err(TurnError::InvalidRequest("Session ID cannot be empty.".to_string()));
    }

    let mut session = sessions.get_or_create(&request.session_id).await.map_err(TurnError::Internal)?;

    // COMPLETE is terminal: the report was already filed, so later turns
    // short-circuit until the caller resets the session.
    if session.complete {
        return Ok(ChatResponse {
            success: true,
            user_response: "This bug report has already been submitted. Reset the session to file a new one.".to_string(),
            bug_report_complete: true,
            collected_info: session.draft,
            jira_ticket: None,
            s3_urls: None,
            status_message: None,
        });
    }

    // A session the server has not seen yet may be seeded from client-side
    // history; the stored history stays authoritative afterwards.
    if session.history.is_empty()
        && let Some(seed) = &request.conversation_history
    {
        session.history = seed.clone();
    }

    let context = InterviewContext {
        transcript: transcript.clone(),
        console_logs: request.console_logs.clone(),
        history: session.history.clone(),
        draft: session.draft.clone(),
    };

    // The agent call runs against a snapshot; nothing is committed on
    // failure, so the stored draft keeps its last known-good value.
    let reply = llm.get_interview_agent_response(&context).await.map_err(TurnError::AgentUnavailable)?;

    session.draft = session.draft.merged(&reply.extracted);
    session.history.push(ChatTurn::user(transcript));
    session.history.push(ChatTurn::assistant(reply.user_response.clone()));

    if !session.draft.is_complete() {
        let collected_info = session.draft.clone();
        commit(sessions, &request.session_id, session).await?;

        return Ok(ChatResponse {
            success: true,
            user_response: reply.user_response,
            bug_report_complete: false,
            collected_info,
            jira_ticket: None,
            s3_urls: None,
            status_message: None,
        });
    }

    info!("Bug report complete; processing uploads and ticket creation.");

    let completed = CompletedReport {
        report_id: report::report_id(request.user_id.as_deref()),
        draft: session.draft.clone(),
        transcript: report::render_transcript(&session.history),
        console_logs: request.console_logs.clone(),
        screen_recording: request.screen_recording.clone(),
    };

    let target = TrackerTarget::resolve(config, &request.tracker_overrides());
    let outcome = report::process_completed_report(&completed, target, store, tracker).await;

    session.complete = true;
    let collected_info = session.draft.clone();
    commit(sessions, &request.session_id, session).await?;

    Ok(ChatResponse {
        success: true,
        user_response: reply.user_response,
        bug_report_complete: true,
        collected_info,
        status_message: Some(if outcome.jira_ticket.success {
            "Bug report submitted successfully!".to_string()
        } else {
            "Bug report collected, but ticket creation failed.".to_string()
        }),
        jira_ticket: Some(outcome.jira_ticket),
        s3_urls: Some(outcome.s3_urls),
    })
}

/// Reset the session. Idempotent; the next turn starts from scratch.
#[instrument(skip_all, fields(session_id = %session_id))]
pub async fn handle_reset(session_id: &str, sessions: &SessionStore) -> Res<()> {
    sessions.reset(session_id).await
}

async fn commit(sessions: &SessionStore, session_id: &str, session: crate::base::types::Session) -> Result<(), TurnError> {
    sessions.commit(session_id, session).await.map_err(TurnError::Internal)
}
