#![cfg(test)]

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bug_report_bot::{
    base::{
        config::{Config, ConfigInner},
        types::{AgentReply, BugReportDraft, ChatRequest, CreatedIssue, InterviewContext, Res, TrackerTarget},
    },
    interaction::chat_turn::{self, TurnError},
    service::{
        llm::{GenericLlmClient, LlmClient},
        session::SessionStore,
        store::{GenericStoreClient, StoreClient},
        tracker::{GenericTrackerClient, TrackerClient},
    },
};
use mockall::mock;

// Mocks.

mock! {
    pub Llm {}

    #[async_trait]
    impl GenericLlmClient for Llm {
        async fn get_interview_agent_response(&self, context: &InterviewContext) -> Res<AgentReply>;
    }
}

mock! {
    pub Store {}

    #[async_trait]
    impl GenericStoreClient for Store {
        async fn put_object(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Res<String>;
    }
}

mock! {
    pub Tracker {}

    #[async_trait]
    impl GenericTrackerClient for Tracker {
        async fn create_issue(&self, target: &TrackerTarget, draft: &BugReportDraft, attachments: &BTreeMap<String, String>) -> Res<CreatedIssue>;
    }
}

// Helpers.

fn create_test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            openai_api_key: "test_key".to_string(),
            jira_api_key: Some("jira_key".to_string()),
            jira_base_url: Some("https://example.atlassian.net".to_string()),
            jira_project_key: Some("BUG".to_string()),
            jira_email: Some("reporter@example.com".to_string()),
            storage_endpoint: Some("https://blobs.example.com".to_string()),
            ..Default::default()
        }),
    }
}

fn create_test_config_without_tracker() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            openai_api_key: "test_key".to_string(),
            storage_endpoint: Some("https://blobs.example.com".to_string()),
            ..Default::default()
        }),
    }
}

fn chat_request(session_id: &str, transcript: &str) -> ChatRequest {
    serde_json::from_value(serde_json::json!({
        "transcript": transcript,
        "session_id": session_id,
    }))
    .unwrap()
}

fn full_draft() -> BugReportDraft {
    BugReportDraft {
        title: Some("Login crash".to_string()),
        description: Some("App crashes on login".to_string()),
        steps_to_reproduce: Some("Open app, log in".to_string()),
        expected_behavior: Some("Dashboard loads".to_string()),
        actual_behavior: Some("App crashes".to_string()),
        environment: Some("Chrome 127 / macOS".to_string()),
        severity: Some("High".to_string()),
    }
}

/// LLM mock that extracts a single description field and asks a follow-up.
fn get_partial_llm() -> MockLlm {
    let mut mock = MockLlm::new();

    mock.expect_get_interview_agent_response().returning(|_| {
        Ok(AgentReply {
            user_response: "Thanks! Could you share the steps to reproduce?".to_string(),
            extracted: BugReportDraft {
                description: Some("App crashes on login".to_string()),
                ..Default::default()
            },
        })
    });

    mock
}

/// LLM mock whose extraction completes the draft in one turn.
fn get_completing_llm() -> MockLlm {
    let mut mock = MockLlm::new();

    mock.expect_get_interview_agent_response().returning(|_| {
        Ok(AgentReply {
            user_response: "I have everything I need, filing the report now.".to_string(),
            extracted: full_draft(),
        })
    });

    mock
}

fn get_ok_store() -> MockStore {
    let mut mock = MockStore::new();

    mock.expect_put_object().returning(|key, _, _| Ok(format!("https://blobs.example.com/bug-report-artifacts/{key}")));

    mock
}

fn get_ok_tracker() -> MockTracker {
    let mut mock = MockTracker::new();

    mock.expect_create_issue().returning(|target, _, _| {
        Ok(CreatedIssue {
            issue_key: "BUG-42".to_string(),
            issue_url: format!("{}/browse/BUG-42", target.base_url),
        })
    });

    mock
}

// Tests.

#[tokio::test]
async fn test_first_turn_collects_partial_draft() {
    let config = create_test_config();
    let sessions = SessionStore::memory();
    let llm = LlmClient::new(Arc::new(get_partial_llm()));
    let store = StoreClient::new(Arc::new(get_ok_store()));
    let tracker = TrackerClient::new(Arc::new(get_ok_tracker()));

    let response = chat_turn::handle_chat_turn(chat_request("s1", "App crashes on login"), &sessions, &llm, &store, &tracker, &config)
        .await
        .unwrap();

    assert!(response.success);
    assert!(!response.bug_report_complete);
    assert!(response.user_response.contains("steps to reproduce"));
    assert_eq!(response.collected_info.description.as_deref(), Some("App crashes on login"));
    assert!(response.collected_info.title.is_none());
    assert!(response.jira_ticket.is_none());
    assert!(response.s3_urls.is_none());

    // The session carries both turns of the exchange.
    let session = sessions.get_or_create("s1").await.unwrap();
    assert_eq!(session.history.len(), 2);
    assert!(!session.complete);
}

#[tokio::test]
async fn test_complete_iff_every_field_non_empty() {
    let config = create_test_config();
    let sessions = SessionStore::memory();
    let store = StoreClient::new(Arc::new(get_ok_store()));
    let tracker = TrackerClient::new(Arc::new(get_ok_tracker()));

    // Six of seven fields: still collecting.
    let mut almost = full_draft();
    almost.severity = None;
    let mut mock = MockLlm::new();
    mock.expect_get_interview_agent_response().returning(move |_| {
        Ok(AgentReply {
            user_response: "How severe is this for you?".to_string(),
            extracted: almost.clone(),
        })
    });
    let llm = LlmClient::new(Arc::new(mock));

    let response = chat_turn::handle_chat_turn(chat_request("s1", "Everything but severity"), &sessions, &llm, &store, &tracker, &config)
        .await
        .unwrap();
    assert!(!response.bug_report_complete);
    assert!(!response.collected_info.is_complete());

    // The seventh field arrives: complete.
    let mut mock = MockLlm::new();
    mock.expect_get_interview_agent_response().returning(|_| {
        Ok(AgentReply {
            user_response: "Thanks, filing now.".to_string(),
            extracted: BugReportDraft {
                severity: Some("High".to_string()),
                ..Default::default()
            },
        })
    });
    let llm = LlmClient::new(Arc::new(mock));

    let response = chat_turn::handle_chat_turn(chat_request("s1", "It is high severity"), &sessions, &llm, &store, &tracker, &config)
        .await
        .unwrap();
    assert!(response.bug_report_complete);
    assert!(response.collected_info.is_complete());
}

#[tokio::test]
async fn test_completing_turn_uploads_artifacts_and_creates_ticket() {
    let config = create_test_config();
    let sessions = SessionStore::memory();
    let llm = LlmClient::new(Arc::new(get_completing_llm()));
    let store = StoreClient::new(Arc::new(get_ok_store()));
    let tracker = TrackerClient::new(Arc::new(get_ok_tracker()));

    let mut request = chat_request("s1", "Full report in one message");
    request.console_logs = Some("TypeError: x is undefined".to_string());
    request.screen_recording = Some(BASE64.encode(b"webm-bytes"));

    let response = chat_turn::handle_chat_turn(request, &sessions, &llm, &store, &tracker, &config).await.unwrap();

    assert!(response.bug_report_complete);

    let ticket = response.jira_ticket.unwrap();
    assert!(ticket.success);
    assert_eq!(ticket.issue_key.as_deref(), Some("BUG-42"));
    assert_eq!(ticket.issue_url.as_deref(), Some("https://example.atlassian.net/browse/BUG-42"));

    let urls = response.s3_urls.unwrap();
    assert_eq!(urls.len(), 3);
    assert!(urls.contains_key("transcription"));
    assert!(urls.contains_key("console_logs"));
    assert!(urls.contains_key("screen_recording"));
    assert_eq!(response.status_message.as_deref(), Some("Bug report submitted successfully!"));

    // The session is terminal; a later turn short-circuits without new work.
    let session = sessions.get_or_create("s1").await.unwrap();
    assert!(session.complete);

    let followup = chat_turn::handle_chat_turn(chat_request("s1", "Anything else?"), &sessions, &llm, &store, &tracker, &config)
        .await
        .unwrap();
    assert!(followup.bug_report_complete);
    assert!(followup.jira_ticket.is_none());
    assert!(followup.user_response.contains("already been submitted"));
}

#[tokio::test]
async fn test_agent_failure_leaves_session_draft_unchanged() {
    let config = create_test_config();
    let sessions = SessionStore::memory();
    let store = StoreClient::new(Arc::new(get_ok_store()));
    let tracker = TrackerClient::new(Arc::new(get_ok_tracker()));

    // First turn succeeds and stores a partial draft.
    let llm = LlmClient::new(Arc::new(get_partial_llm()));
    chat_turn::handle_chat_turn(chat_request("s1", "App crashes on login"), &sessions, &llm, &store, &tracker, &config)
        .await
        .unwrap();
    let before = sessions.get_or_create("s1").await.unwrap();

    // Second turn: the completion API is down.
    let mut mock = MockLlm::new();
    mock.expect_get_interview_agent_response().returning(|_| Err(anyhow::anyhow!("connection refused")));
    let llm = LlmClient::new(Arc::new(mock));

    let result = chat_turn::handle_chat_turn(chat_request("s1", "More details"), &sessions, &llm, &store, &tracker, &config).await;

    assert!(matches!(result, Err(TurnError::AgentUnavailable(_))));

    let after = sessions.get_or_create("s1").await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_failed_upload_is_partial_and_ticket_still_created() {
    let config = create_test_config();
    let sessions = SessionStore::memory();
    let llm = LlmClient::new(Arc::new(get_completing_llm()));
    let tracker = TrackerClient::new(Arc::new(get_ok_tracker()));

    // The screen recording upload fails; the other two succeed.
    let mut store_mock = MockStore::new();
    store_mock.expect_put_object().returning(|key, _, _| {
        if key.ends_with("screen_recording.webm") {
            Err(anyhow::anyhow!("503 from blob gateway"))
        } else {
            Ok(format!("https://blobs.example.com/bug-report-artifacts/{key}"))
        }
    });
    let store = StoreClient::new(Arc::new(store_mock));

    let mut request = chat_request("s1", "Full report in one message");
    request.console_logs = Some("TypeError: x is undefined".to_string());
    request.screen_recording = Some(BASE64.encode(b"webm-bytes"));

    let response = chat_turn::handle_chat_turn(request, &sessions, &llm, &store, &tracker, &config).await.unwrap();

    let urls = response.s3_urls.unwrap();
    assert_eq!(urls.len(), 2);
    assert!(urls.contains_key("transcription"));
    assert!(urls.contains_key("console_logs"));
    assert!(!urls.contains_key("screen_recording"));

    // Ticket creation is unaffected by the partial upload failure.
    assert!(response.jira_ticket.unwrap().success);
}

#[tokio::test]
async fn test_missing_tracker_credentials_fail_ticket_but_keep_uploads() {
    let config = create_test_config_without_tracker();
    let sessions = SessionStore::memory();
    let llm = LlmClient::new(Arc::new(get_completing_llm()));
    let store = StoreClient::new(Arc::new(get_ok_store()));

    // The tracker must never be called without a resolved target.
    let mut tracker_mock = MockTracker::new();
    tracker_mock.expect_create_issue().times(0);
    let tracker = TrackerClient::new(Arc::new(tracker_mock));

    let mut request = chat_request("s1", "Full report in one message");
    request.console_logs = Some("TypeError: x is undefined".to_string());

    let response = chat_turn::handle_chat_turn(request, &sessions, &llm, &store, &tracker, &config).await.unwrap();

    assert!(response.bug_report_complete);

    let ticket = response.jira_ticket.unwrap();
    assert!(!ticket.success);
    assert!(ticket.error.unwrap().contains("credentials"));

    let urls = response.s3_urls.unwrap();
    assert!(urls.contains_key("transcription"));
    assert!(urls.contains_key("console_logs"));
}

#[tokio::test]
async fn test_request_credentials_override_config() {
    let config = create_test_config();
    let sessions = SessionStore::memory();
    let llm = LlmClient::new(Arc::new(get_completing_llm()));
    let store = StoreClient::new(Arc::new(get_ok_store()));

    let mut tracker_mock = MockTracker::new();
    tracker_mock
        .expect_create_issue()
        .withf(|target, _, _| target.api_key == "override_key" && target.project_key == "OVR" && target.base_url == "https://example.atlassian.net")
        .returning(|target, _, _| {
            Ok(CreatedIssue {
                issue_key: "OVR-1".to_string(),
                issue_url: format!("{}/browse/OVR-1", target.base_url),
            })
        });
    let tracker = TrackerClient::new(Arc::new(tracker_mock));

    let mut request = chat_request("s1", "Full report in one message");
    request.jira_api_key = Some("override_key".to_string());
    request.jira_project_key = Some("OVR".to_string());

    let response = chat_turn::handle_chat_turn(request, &sessions, &llm, &store, &tracker, &config).await.unwrap();

    assert_eq!(response.jira_ticket.unwrap().issue_key.as_deref(), Some("OVR-1"));
}

#[tokio::test]
async fn test_reset_then_turn_behaves_like_first_turn() {
    let config = create_test_config();
    let sessions = SessionStore::memory();
    let store = StoreClient::new(Arc::new(get_ok_store()));
    let tracker = TrackerClient::new(Arc::new(get_ok_tracker()));

    // Build up some state.
    let llm = LlmClient::new(Arc::new(get_partial_llm()));
    chat_turn::handle_chat_turn(chat_request("s1", "App crashes on login"), &sessions, &llm, &store, &tracker, &config)
        .await
        .unwrap();

    // Reset is idempotent.
    chat_turn::handle_reset("s1", &sessions).await.unwrap();
    chat_turn::handle_reset("s1", &sessions).await.unwrap();

    // The next turn must see no residual history or draft.
    let mut mock = MockLlm::new();
    mock.expect_get_interview_agent_response()
        .withf(|context| context.history.is_empty() && context.draft == BugReportDraft::default())
        .returning(|_| {
            Ok(AgentReply {
                user_response: "What went wrong?".to_string(),
                extracted: BugReportDraft::default(),
            })
        });
    let llm = LlmClient::new(Arc::new(mock));

    let response = chat_turn::handle_chat_turn(chat_request("s1", "Fresh start"), &sessions, &llm, &store, &tracker, &config)
        .await
        .unwrap();

    assert!(!response.bug_report_complete);
    assert_eq!(response.collected_info, BugReportDraft::default());
}

#[tokio::test]
async fn test_empty_transcript_is_rejected_before_any_external_call() {
    let config = create_test_config();
    let sessions = SessionStore::memory();

    // None of the collaborators may be touched.
    let mut llm_mock = MockLlm::new();
    llm_mock.expect_get_interview_agent_response().times(0);
    let llm = LlmClient::new(Arc::new(llm_mock));
    let mut store_mock = MockStore::new();
    store_mock.expect_put_object().times(0);
    let store = StoreClient::new(Arc::new(store_mock));
    let mut tracker_mock = MockTracker::new();
    tracker_mock.expect_create_issue().times(0);
    let tracker = TrackerClient::new(Arc::new(tracker_mock));

    let result = chat_turn::handle_chat_turn(chat_request("s1", "   "), &sessions, &llm, &store, &tracker, &config).await;

    assert!(matches!(result, Err(TurnError::InvalidRequest(_))));
}

#[tokio::test]
async fn test_client_history_seeds_unknown_session() {
    let config = create_test_config();
    let sessions = SessionStore::memory();
    let store = StoreClient::new(Arc::new(get_ok_store()));
    let tracker = TrackerClient::new(Arc::new(get_ok_tracker()));

    let mut mock = MockLlm::new();
    mock.expect_get_interview_agent_response()
        .withf(|context| context.history.len() == 2)
        .returning(|_| {
            Ok(AgentReply {
                user_response: "Noted.".to_string(),
                extracted: BugReportDraft::default(),
            })
        });
    let llm = LlmClient::new(Arc::new(mock));

    let mut request = chat_request("s-new", "And it happens every time");
    request.conversation_history = Some(vec![
        bug_report_bot::base::types::ChatTurn::user("It crashed"),
        bug_report_bot::base::types::ChatTurn::assistant("What were you doing?"),
    ]);

    chat_turn::handle_chat_turn(request, &sessions, &llm, &store, &tracker, &config).await.unwrap();

    // Seeded history plus the new exchange.
    let session = sessions.get_or_create("s-new").await.unwrap();
    assert_eq!(session.history.len(), 4);
}
