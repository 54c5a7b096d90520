pub mod jira;

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;

use crate::base::{
    config::Config,
    types::{BugReportDraft, CreatedIssue, Res, TrackerOverrides, TrackerTarget},
};

// Traits.

/// Generic ticket tracker client trait that clients must implement.
///
/// The tracker turns a completed draft into an external issue. Implementing
/// this trait allows different ticket systems to receive the reports.
#[async_trait]
pub trait GenericTrackerClient: Send + Sync + 'static {
    /// Creates one issue from a completed draft.
    ///
    /// Attachment locators (label to URL) are folded into the issue body.
    /// Errors are converted by the caller into a failed `TicketResult`; they
    /// never abort the chat turn.
    async fn create_issue(&self, target: &TrackerTarget, draft: &BugReportDraft, attachments: &BTreeMap<String, String>) -> Res<CreatedIssue>;
}

// Structs.

/// Tracker client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TrackerClient {
    inner: Arc<dyn GenericTrackerClient>,
}

impl TrackerClient {
    pub fn new(inner: Arc<dyn GenericTrackerClient>) -> Self {
        Self { inner }
    }
}

impl Deref for TrackerClient {
    type Target = dyn GenericTrackerClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

// Target resolution.

impl TrackerTarget {
    /// Resolve the ticket-system target from process configuration and the
    /// per-request overrides; request-supplied values take precedence. Returns
    /// `None` when any required value (api key, base URL, project key) is
    /// missing, which the caller reports as a failed ticket result.
    pub fn resolve(config: &Config, overrides: &TrackerOverrides) -> Option<TrackerTarget> {
        let api_key = pick(&overrides.api_key, &config.jira_api_key)?;
        let base_url = pick(&overrides.base_url, &config.jira_base_url)?;
        let project_key = pick(&overrides.project_key, &config.jira_project_key)?;
        let email = pick(&overrides.email, &config.jira_email);

        Some(TrackerTarget {
            api_key,
            base_url,
            project_key,
            email,
        })
    }
}

fn pick(request_value: &Option<String>, config_value: &Option<String>) -> Option<String> {
    request_value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .or(config_value.as_deref().filter(|v| !v.trim().is_empty()))
        .map(str::to_string)
}

// Tests.
