//! Request handling for the bug report conversation.
//!
//! This module coordinates one inbound chat turn across the services:
//! - Session lookup and the per-session collecting/complete state machine
//! - The interview agent call and draft merging
//! - The completion pipeline (artifact uploads, then ticket creation)

pub mod chat_turn;
pub mod report;
