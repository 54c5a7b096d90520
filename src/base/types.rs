//! Common types and result aliases used throughout the application.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The catch-all error type for the application.
pub type Err = anyhow::Error;
/// The result type for the application.
pub type Res<T> = Result<T, Err>;
/// A result with no success value.
pub type Void = Res<()>;

// Conversation types.

/// Role of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The person reporting the bug.
    User,
    /// The interview agent.
    Assistant,
}

impl ChatRole {
    /// Display name used when rendering a transcript (`User: ...` / `Assistant: ...`).
    pub fn title(&self) -> &'static str {
        match self {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        }
    }
}

/// One turn of the interview conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who spoke.
    pub role: ChatRole,
    /// What was said.
    pub content: String,
}

impl ChatTurn {
    /// A turn spoken by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// A turn spoken by the interview agent.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

// Bug report draft.

/// The structured bug report being collected from the user.
///
/// Unset fields serialize away, so the wire-level `collected_info` mapping
/// only carries the fields gathered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugReportDraft {
    /// Clear, concise title for the bug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// What the bug is, what went wrong.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The steps that lead to the bug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_to_reproduce: Option<String>,
    /// What should have happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_behavior: Option<String>,
    /// What actually happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_behavior: Option<String>,
    /// Browser, OS, device, version information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// How critical the bug is (Critical/High/Medium/Low).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

impl BugReportDraft {
    /// Field accessors paired with their human-readable names, in report order.
    pub fn fields(&self) -> [(&'static str, &Option<String>); 7] {
        [
            ("Title", &self.title),
            ("Description", &self.description),
            ("Steps to Reproduce", &self.steps_to_reproduce),
            ("Expected Behavior", &self.expected_behavior),
            ("Actual Behavior", &self.actual_behavior),
            ("Environment", &self.environment),
            ("Severity", &self.severity),
        ]
    }

    /// True iff every recognized field is present and non-empty.
    pub fn is_complete(&self) -> bool {
        self.fields().iter().all(|(_, value)| is_set(value))
    }

    /// Human-readable names of the fields still missing, in report order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields().iter().filter(|(_, value)| !is_set(value)).map(|(name, _)| *name).collect()
    }

    /// Merge another draft into this one, taking the incoming value wherever
    /// it is non-empty after trimming. Existing values are never cleared.
    pub fn merged(&self, incoming: &BugReportDraft) -> BugReportDraft {
        BugReportDraft {
            title: merge_field(&self.title, &incoming.title),
            description: merge_field(&self.description, &incoming.description),
            steps_to_reproduce: merge_field(&self.steps_to_reproduce, &incoming.steps_to_reproduce),
            expected_behavior: merge_field(&self.expected_behavior, &incoming.expected_behavior),
            actual_behavior: merge_field(&self.actual_behavior, &incoming.actual_behavior),
            environment: merge_field(&self.environment, &incoming.environment),
            severity: merge_field(&self.severity, &incoming.severity),
        }
    }

    /// Render the collected fields as a bulleted summary for the agent prompt.
    pub fn summary(&self) -> String {
        let lines = self
            .fields()
            .iter()
            .filter_map(|(name, value)| value.as_deref().filter(|v| !v.trim().is_empty()).map(|v| format!("- {name}: {v}")))
            .collect::<Vec<_>>();

        if lines.is_empty() { "No information collected yet.".to_string() } else { lines.join("\n") }
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn merge_field(current: &Option<String>, incoming: &Option<String>) -> Option<String> {
    match incoming.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Some(v.to_string()),
        None => current.clone(),
    }
}

// Session.

/// Conversation state held per session identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Ordered prior turns, oldest first.
    pub history: Vec<ChatTurn>,
    /// The last known-good draft.
    pub draft: BugReportDraft,
    /// Terminal flag; only a reset leaves this state.
    pub complete: bool,
}

// LLM agent types.

/// Everything the interview agent needs for one turn.
#[derive(Debug, Clone)]
pub struct InterviewContext {
    /// The user's new message for this turn.
    pub transcript: String,
    /// Console logs supplied with the request, if any.
    pub console_logs: Option<String>,
    /// Prior turns, oldest first.
    pub history: Vec<ChatTurn>,
    /// The draft as collected before this turn.
    pub draft: BugReportDraft,
}

/// Validated output of one interview agent call: the conversational reply and
/// the fields the model extracted from this turn (not yet merged).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    /// The agent's conversational reply to the user.
    pub user_response: String,
    /// The fields the agent extracted from this turn (not yet merged).
    pub extracted: BugReportDraft,
}

// Tracker types.

/// Resolved ticket-system target: config values with per-request overrides
/// applied (request-supplied values take precedence).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerTarget {
    /// API key for the tracker.
    pub api_key: String,
    /// Base URL of the tracker instance.
    pub base_url: String,
    /// Project to create issues under.
    pub project_key: String,
    /// Reporter email for basic auth, if any.
    pub email: Option<String>,
}

/// Per-request tracker credential overrides from the chat request body.
#[derive(Debug, Clone, Default)]
pub struct TrackerOverrides {
    /// Overrides the configured API key.
    pub api_key: Option<String>,
    /// Overrides the configured base URL.
    pub base_url: Option<String>,
    /// Overrides the configured project key.
    pub project_key: Option<String>,
    /// Overrides the configured reporter email.
    pub email: Option<String>,
}

/// A successfully created tracker issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    /// Issue key, e.g. `BUG-42`.
    pub issue_key: String,
    /// Browse URL for the issue.
    pub issue_url: String,
}

/// Outcome of ticket creation as reported to the caller. Ticket failure is
/// data in the response, not an error status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketResult {
    /// Whether the issue was created.
    pub success: bool,
    /// Issue key when created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_key: Option<String>,
    /// Browse URL when created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_url: Option<String>,
    /// Failure description when not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TicketResult {
    /// A successful result for a created issue.
    pub fn created(issue: CreatedIssue) -> Self {
        Self {
            success: true,
            issue_key: Some(issue.issue_key),
            issue_url: Some(issue.issue_url),
            error: None,
        }
    }

    /// A failed result carrying the failure description.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            issue_key: None,
            issue_url: None,
            error: Some(error.into()),
        }
    }
}

// Artifacts.

/// The artifacts that may accompany a completed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Plain-text rendering of the conversation.
    Transcription,
    /// Console logs supplied with the request.
    ConsoleLogs,
    /// Screen recording supplied with the request.
    ScreenRecording,
}

impl ArtifactKind {
    /// Wire-level label under which the locator is reported.
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Transcription => "transcription",
            ArtifactKind::ConsoleLogs => "console_logs",
            ArtifactKind::ScreenRecording => "screen_recording",
        }
    }

    /// Object name within the per-report prefix.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Transcription => "transcription.txt",
            ArtifactKind::ConsoleLogs => "console_logs.txt",
            ArtifactKind::ScreenRecording => "screen_recording.webm",
        }
    }

    /// MIME type the object is uploaded with.
    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactKind::Transcription | ArtifactKind::ConsoleLogs => "text/plain",
            ArtifactKind::ScreenRecording => "video/webm",
        }
    }
}

// Wire types.

/// Request body for `POST /bug-report-chat`. Field names are the wire contract.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's message for this turn.
    pub transcript: String,
    /// Identifier of the conversation this turn belongs to.
    pub session_id: String,
    /// Identifier of the reporting user; folded into the report ID.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Console logs to attach to the report.
    #[serde(default)]
    pub console_logs: Option<String>,
    /// Base64-encoded screen recording, optionally with a data-URL prefix.
    #[serde(default)]
    pub screen_recording: Option<String>,
    /// Optional client-side history used to seed a session the server has not seen.
    #[serde(default)]
    pub conversation_history: Option<Vec<ChatTurn>>,
    /// Per-request tracker API key override.
    #[serde(default)]
    pub jira_api_key: Option<String>,
    /// Per-request tracker base URL override.
    #[serde(default)]
    pub jira_base_url: Option<String>,
    /// Per-request tracker project key override.
    #[serde(default)]
    pub jira_project_key: Option<String>,
    /// Per-request reporter email override.
    #[serde(default)]
    pub jira_email: Option<String>,
}

impl ChatRequest {
    /// The tracker credential overrides carried by this request.
    pub fn tracker_overrides(&self) -> TrackerOverrides {
        TrackerOverrides {
            api_key: self.jira_api_key.clone(),
            base_url: self.jira_base_url.clone(),
            project_key: self.jira_project_key.clone(),
            email: self.jira_email.clone(),
        }
    }
}

/// Response body for `POST /bug-report-chat`. The ticket, locator, and status
/// fields are only present on the turn that completes the report.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// Whether the turn was handled.
    pub success: bool,
    /// The agent's conversational reply to show the user.
    pub user_response: String,
    /// Whether the report is complete (and the session terminal).
    pub bug_report_complete: bool,
    /// The fields collected so far.
    pub collected_info: BugReportDraft,
    /// Ticket creation outcome; completing turn only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_ticket: Option<TicketResult>,
    /// Locators for the uploaded artifacts, by label; completing turn only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_urls: Option<BTreeMap<String, String>>,
    /// Human-readable submission status; completing turn only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

/// Request body for `POST /bug-report-chat/reset`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetRequest {
    /// Identifier of the session to destroy.
    pub session_id: String,
}

/// Acknowledgment for a reset.
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    /// Always true; resetting an absent session is not an error.
    pub success: bool,
}

// Tests.
