//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for various services used by the bug-report-bot:
//! - Session storage (in-memory by default)
//! - LLM services (e.g., OpenAI)
//! - Blob storage for report artifacts (HTTP object gateway)
//! - Ticket trackers (e.g., Jira)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod llm;
pub mod session;
pub mod store;
pub mod tracker;
