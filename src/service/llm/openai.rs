//! OpenAI-backed interview agent.
//!
//! One Responses API call per turn: the model receives the running draft,
//! the prior turns, and the new transcript, and must answer with a strict
//! JSON-schema payload carrying its conversational reply plus the fields it
//! extracted. The payload is parsed or rejected; completeness is decided by
//! the caller, never by the model.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{
        Content, CreateResponseArgs, Input, InputItem, InputMessageArgs, OutputContent, Response, ResponseFormatJsonSchema, Role, TextConfig, TextResponseFormat,
    },
};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::timeout;
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{AgentReply, BugReportDraft, InterviewContext, Res},
};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Build the interview input: draft status and conversation so far, then the new transcript.
    #[instrument(name = "OpenAiLlmClient::build_interview_input", skip_all)]
    fn build_interview_input(&self, context: &InterviewContext) -> Res<Input> {
        let missing = context.draft.missing_fields();
        let missing = if missing.is_empty() { "None - all information collected!".to_string() } else { missing.join(", ") };

        let console_logs = match &context.console_logs {
            Some(_) => "Console logs were provided and will be attached to the report.",
            None => "No console logs provided.",
        };

        let history = if context.history.is_empty() {
            "No previous conversation.".to_string()
        } else {
            context.history.iter().map(|turn| format!("{}: {}", turn.role.title(), turn.content)).collect::<Vec<_>>().join("\n")
        };

        Ok(Input::Items(vec![
            InputItem::Message(
                InputMessageArgs::default()
                    .role(Role::System)
                    .content(format!("## Collected Information So Far\n\n{}\n\n## Missing Information\n\n{missing}\n\n", context.draft.summary()))
                    .build()?,
            ),
            InputItem::Message(InputMessageArgs::default().role(Role::Developer).content(format!("## Console Logs\n\n{console_logs}\n\n")).build()?),
            InputItem::Message(InputMessageArgs::default().role(Role::Developer).content(format!("## Conversation So Far\n\n{history}\n\n")).build()?),
            InputItem::Message(InputMessageArgs::default().role(Role::User).content(format!("# User Message\n\n{}\n\n", context.transcript)).build()?),
        ]))
    }

    /// Make a single OpenAI API call with a client-enforced timeout.
    async fn call_openai_api(&self, request_builder: CreateResponseArgs) -> Res<Response> {
        const TIMEOUT: u64 = 120;

        let request = request_builder.build()?;

        match timeout(Duration::from_secs(TIMEOUT), self.client.responses().create(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(anyhow::anyhow!("OpenAI API call failed: {err}")),
            Err(_) => Err(anyhow::anyhow!("OpenAI API call timed out after {TIMEOUT}s")),
        }
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::get_interview_agent_response", skip_all)]
    async fn get_interview_agent_response(&self, context: &InterviewContext) -> Res<AgentReply> {
        let input = self.build_interview_input(context)?;

        let text_config = get_openai_text_config().clone();

        let mut request = CreateResponseArgs::default();
        request
            .instructions(self.config.interview_agent_system_directive.clone())
            .max_output_tokens(self.config.openai_max_tokens)
            .model(&self.config.openai_interview_agent_model)
            .temperature(self.config.openai_interview_agent_temperature)
            .text(text_config)
            .input(input);

        let response = self.call_openai_api(request).await?;

        parse_interview_response(&response)
    }
}

/// Extract and validate the interview payload from the raw response.
///
/// The model output is untrusted: anything other than a single message whose
/// text parses against the payload schema is rejected.
#[instrument(skip_all)]
pub fn parse_interview_response(response: &Response) -> Res<AgentReply> {
    info!("LLM response has {} outputs.", response.output.len());

    for output in &response.output {
        match output {
            OutputContent::Message(message) => {
                for message_content in &message.content {
                    match message_content {
                        Content::OutputText(text) => {
                            return parse_interview_payload(&text.text);
                        }
                        Content::Refusal(reason) => {
                            return Err(anyhow::anyhow!("Request refused: {reason:#?}"));
                        }
                    }
                }
            }
            _ => {
                info!("Skipping non-message output.");
            }
        }
    }

    Err(anyhow::anyhow!("LLM response contained no message output."))
}

/// Strict parse of the agent payload text. Parse-or-reject; no repair.
pub fn parse_interview_payload(text: &str) -> Res<AgentReply> {
    let payload = serde_json::from_str::<InterviewPayload>(text).map_err(|err| anyhow::anyhow!("Unparsable interview agent payload: {err}"))?;

    Ok(AgentReply {
        user_response: payload.user_response,
        extracted: payload.bug_report,
    })
}

/// Schema-validated shape of the agent's structured output.
#[derive(Debug, Deserialize)]
struct InterviewPayload {
    user_response: String,
    bug_report: BugReportDraft,
}

// Statics.

static OPENAI_TEXT_CONFIG: OnceLock<TextConfig> = OnceLock::new();

fn get_openai_text_config() -> &'static TextConfig {
    OPENAI_TEXT_CONFIG.get_or_init(|| TextConfig {
        format: TextResponseFormat::JsonSchema(ResponseFormatJsonSchema {
            name: "BugReportInterviewTurn".to_string(),
            description: Some("One turn of the bug report interview: reply text plus extracted fields.".to_string()),
            schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "user_response": { "type": "string" },
                    "bug_report": {
                        "type": "object",
                        "properties": {
                            "title": { "type": ["string", "null"] },
                            "description": { "type": ["string", "null"] },
                            "steps_to_reproduce": { "type": ["string", "null"] },
                            "expected_behavior": { "type": ["string", "null"] },
                            "actual_behavior": { "type": ["string", "null"] },
                            "environment": { "type": ["string", "null"] },
                            "severity": { "type": ["string", "null"], "enum": ["Critical", "High", "Medium", "Low", null] }
                        },
                        "required": ["title", "description", "steps_to_reproduce", "expected_behavior", "actual_behavior", "environment", "severity"],
                        "additionalProperties": false
                    }
                },
                "required": ["user_response", "bug_report"],
                "additionalProperties": false
            })),
            strict: Some(true),
        }),
    })
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_payload() {
        let text = serde_json::json!({
            "user_response": "Got it. What browser are you on?",
            "bug_report": {
                "title": null,
                "description": "App crashes on login",
                "steps_to_reproduce": null,
                "expected_behavior": null,
                "actual_behavior": null,
                "environment": null,
                "severity": null
            }
        })
        .to_string();

        let reply = parse_interview_payload(&text).unwrap();

        assert_eq!(reply.user_response, "Got it. What browser are you on?");
        assert_eq!(reply.extracted.description.as_deref(), Some("App crashes on login"));
        assert!(reply.extracted.title.is_none());
    }

    #[test]
    fn rejects_non_json_payload() {
        let result = parse_interview_payload("I could not produce JSON, sorry!");

        assert!(result.is_err());
    }

    #[test]
    fn rejects_payload_missing_reply_text() {
        let text = serde_json::json!({ "bug_report": {} }).to_string();

        let result = parse_interview_payload(&text);

        assert!(result.is_err());
    }

    #[test]
    fn payload_with_all_fields_yields_complete_extraction() {
        let text = serde_json::json!({
            "user_response": "Thanks, I have everything I need!",
            "bug_report": {
                "title": "Login crash",
                "description": "App crashes on login",
                "steps_to_reproduce": "Open app, log in",
                "expected_behavior": "Dashboard loads",
                "actual_behavior": "Crash",
                "environment": "Chrome 127 / macOS",
                "severity": "High"
            }
        })
        .to_string();

        let reply = parse_interview_payload(&text).unwrap();

        assert!(reply.extracted.is_complete());
    }
}
