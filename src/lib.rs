//! Library root for `bug-report-bot`.
//!
//! Bug-report-bot is an OpenAI-powered intake service that:
//! - Interviews a user to assemble a structured bug report
//! - Uploads conversation artifacts (transcript, console logs, screen recording) to blob storage
//! - Files a ticket with a Jira-compatible tracker once the report is complete
//!
//! The service exposes a small HTTP API and keeps conversation state in an
//! in-process session store. The architecture is built around extensible
//! traits that allow for different implementations of each service.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the bug-report-bot runtime:
/// - Creates the runtime context with the session store and service clients
/// - Starts the HTTP server for processing chat turns
pub async fn start(config: Config) -> Void {
    info!("Starting bug-report-bot ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
