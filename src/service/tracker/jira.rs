//! Jira Cloud backend for the ticket tracker.
//!
//! Issues are created with `POST {base_url}/rest/api/3/issue` using basic
//! auth (`email:api_key`, base64-encoded). Jira Cloud's v3 API requires the
//! description in Atlassian Document Format, so the draft fields are rendered
//! as ADF paragraphs with bold labels, and attachment locators as a bullet
//! list.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::base::types::{BugReportDraft, CreatedIssue, Res, TrackerTarget};

use super::{GenericTrackerClient, TrackerClient};

// Extra methods on `TrackerClient` applied by the Jira implementation.

impl TrackerClient {
    pub fn jira() -> Self {
        let client = JiraTrackerClient::new();
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// Jira tracker client implementation.
#[derive(Clone)]
pub struct JiraTrackerClient {
    client: reqwest::Client,
}

impl Default for JiraTrackerClient {
    fn default() -> Self {
        Self::new()
    }
}

impl JiraTrackerClient {
    /// Create a new Jira tracker client.
    #[instrument(name = "JiraTrackerClient::new", skip_all)]
    pub fn new() -> Self {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build().unwrap_or_default();

        Self { client }
    }
}

#[async_trait]
impl GenericTrackerClient for JiraTrackerClient {
    #[instrument(name = "JiraTrackerClient::create_issue", skip_all)]
    async fn create_issue(&self, target: &TrackerTarget, draft: &BugReportDraft, attachments: &BTreeMap<String, String>) -> Res<CreatedIssue> {
        let base_url = target.base_url.trim_end_matches('/');
        let url = format!("{base_url}/rest/api/3/issue");

        let payload = build_issue_payload(&target.project_key, draft, attachments);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, auth_header(target))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Jira issue creation failed with status {status}: {body}"));
        }

        let created = response.json::<CreatedIssueBody>().await?;

        info!("Created issue {}.", created.key);

        Ok(CreatedIssue {
            issue_url: format!("{base_url}/browse/{}", created.key),
            issue_key: created.key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CreatedIssueBody {
    key: String,
}

/// Basic auth header for Jira Cloud. Without a reporter email the raw API key
/// is used as the credential, matching tokens that already embed `email:key`.
fn auth_header(target: &TrackerTarget) -> String {
    let credential = match &target.email {
        Some(email) => BASE64.encode(format!("{email}:{}", target.api_key)),
        None => BASE64.encode(&target.api_key),
    };

    format!("Basic {credential}")
}

/// Build the issue creation payload for a completed draft.
fn build_issue_payload(project_key: &str, draft: &BugReportDraft, attachments: &BTreeMap<String, String>) -> Value {
    let mut fields = json!({
        "project": { "key": project_key },
        "summary": draft.title.as_deref().unwrap_or("Bug Report"),
        "issuetype": { "name": "Bug" },
        "description": build_description_adf(draft, attachments),
        "labels": ["bug-report"],
    });

    // Jira rejects unknown priority names; only set the ones the severity map
    // produces, and leave the project default in place for the medium tier.
    if let Some(priority) = severity_to_priority(draft.severity.as_deref()) {
        fields["priority"] = json!({ "name": priority });
    }

    json!({ "fields": fields })
}

/// Map report severity to a Jira priority name. `None` means keep the default.
fn severity_to_priority(severity: Option<&str>) -> Option<&'static str> {
    match severity.map(str::to_lowercase).as_deref() {
        Some("critical") => Some("Highest"),
        Some("high") => Some("High"),
        Some("low") => Some("Low"),
        Some("lowest") => Some("Lowest"),
        _ => None,
    }
}

/// Render the draft as an Atlassian Document Format description.
fn build_description_adf(draft: &BugReportDraft, attachments: &BTreeMap<String, String>) -> Value {
    let mut content = Vec::new();

    for (name, value) in draft.fields() {
        // The title is the issue summary; skip it in the body.
        if name == "Title" {
            continue;
        }

        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            content.push(labeled_paragraph(name, value));
        }
    }

    if !attachments.is_empty() {
        content.push(json!({
            "type": "paragraph",
            "content": [{ "type": "text", "text": "Attachments:", "marks": [{ "type": "strong" }] }]
        }));
        content.push(json!({
            "type": "bulletList",
            "content": attachments
                .iter()
                .map(|(label, url)| json!({
                    "type": "listItem",
                    "content": [{
                        "type": "paragraph",
                        "content": [{ "type": "text", "text": format!("{label}: {url}") }]
                    }]
                }))
                .collect::<Vec<_>>()
        }));
    }

    if content.is_empty() {
        content.push(json!({
            "type": "paragraph",
            "content": [{ "type": "text", "text": "No description provided." }]
        }));
    }

    json!({
        "type": "doc",
        "version": 1,
        "content": content
    })
}

fn labeled_paragraph(label: &str, value: &str) -> Value {
    json!({
        "type": "paragraph",
        "content": [
            { "type": "text", "text": format!("{label}: "), "marks": [{ "type": "strong" }] },
            { "type": "text", "text": value }
        ]
    })
}

// Tests.
