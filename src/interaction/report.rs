//! Completion pipeline for a finished bug report.
//!
//! Runs once per session, on the turn that completes the draft: upload the
//! supplied artifacts to blob storage, then file the tracker ticket with the
//! successful locators folded in. Uploads are attempted even when the ticket
//! will later fail, and each artifact fails independently.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::{
    base::types::{ArtifactKind, BugReportDraft, ChatTurn, Res, TicketResult, TrackerTarget},
    service::{store::StoreClient, tracker::TrackerClient},
};

/// Inputs to the completion pipeline for one report.
#[derive(Debug, Clone)]
pub struct CompletedReport {
    pub report_id: String,
    pub draft: BugReportDraft,
    pub transcript: String,
    pub console_logs: Option<String>,
    pub screen_recording: Option<String>,
}

/// What the completing turn reports back to the caller.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    /// Locators for the artifacts that uploaded successfully, by label.
    pub s3_urls: BTreeMap<String, String>,
    pub jira_ticket: TicketResult,
}

/// Unique identifier used as the object prefix for a report's artifacts.
pub fn report_id(user_id: Option<&str>) -> String {
    format!("bug_{}_{}", Utc::now().format("%Y%m%d_%H%M%S"), user_id.unwrap_or("anonymous"))
}

/// Render the conversation as a plain-text transcript for upload.
pub fn render_transcript(history: &[ChatTurn]) -> String {
    history.iter().map(|turn| format!("{}: {}", turn.role.title(), turn.content)).collect::<Vec<_>>().join("\n")
}

/// Process a completed report: upload artifacts, then create the ticket.
///
/// Neither step can fail the turn. A failed upload drops its label from the
/// locator mapping; a failed ticket creation is returned as an unsuccessful
/// `TicketResult`.
#[instrument(skip_all, fields(report_id = %report.report_id))]
pub async fn process_completed_report(report: &CompletedReport, target: Option<TrackerTarget>, store: &StoreClient, tracker: &TrackerClient) -> ReportOutcome {
    let s3_urls = upload_artifacts(report, store).await;

    let jira_ticket = match target {
        Some(target) => match tracker.create_issue(&target, &report.draft, &s3_urls).await {
            Ok(issue) => TicketResult::created(issue),
            Err(err) => {
                warn!("Ticket creation failed: {err}");
                TicketResult::failed(format!("Failed to create tracker ticket: {err}"))
            }
        },
        None => {
            warn!("Tracker credentials are missing; skipping ticket creation.");
            TicketResult::failed("Tracker credentials are missing (api key, base URL, and project key are required).")
        }
    };

    ReportOutcome { s3_urls, jira_ticket }
}

/// Upload each supplied artifact concurrently, capturing outcomes independently.
#[instrument(skip_all)]
async fn upload_artifacts(report: &CompletedReport, store: &StoreClient) -> BTreeMap<String, String> {
    let mut uploads = Vec::new();

    uploads.push(upload_one(store, &report.report_id, ArtifactKind::Transcription, Ok(report.transcript.clone().into_bytes())));

    if let Some(logs) = report.console_logs.as_deref().filter(|l| !l.is_empty()) {
        uploads.push(upload_one(store, &report.report_id, ArtifactKind::ConsoleLogs, Ok(logs.as_bytes().to_vec())));
    }

    if let Some(recording) = report.screen_recording.as_deref().filter(|r| !r.is_empty()) {
        uploads.push(upload_one(store, &report.report_id, ArtifactKind::ScreenRecording, decode_recording(recording)));
    }

    let mut urls = BTreeMap::new();

    for (kind, result) in join_all(uploads).await {
        match result {
            Ok(url) => {
                urls.insert(kind.label().to_string(), url);
            }
            Err(err) => {
                warn!("Upload of {} failed: {err}", kind.label());
            }
        }
    }

    info!("Uploaded {} artifact(s).", urls.len());

    urls
}

/// One artifact upload; the byte source itself may already have failed (bad base64).
async fn upload_one(store: &StoreClient, report_id: &str, kind: ArtifactKind, bytes: Res<Vec<u8>>) -> (ArtifactKind, Res<String>) {
    let result = match bytes {
        Ok(bytes) => store.put_object(&format!("{report_id}/{}", kind.file_name()), kind.content_type(), bytes).await,
        Err(err) => Err(err),
    };

    (kind, result)
}

/// Decode a base64 screen recording, tolerating a `data:...;base64,` prefix.
fn decode_recording(recording: &str) -> Res<Vec<u8>> {
    let encoded = recording.rsplit_once(',').map_or(recording, |(_, tail)| tail);

    BASE64.decode(encoded.trim()).map_err(|err| anyhow::anyhow!("Invalid base64 screen recording: {err}"))
}

// Tests.
