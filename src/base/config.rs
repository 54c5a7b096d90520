//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::prompts;

use super::types::Res;

/// Default OpenAI interview agent model to use
fn default_openai_interview_agent_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default sampling temperature for the interview agent
fn default_openai_interview_agent_temperature() -> f32 {
    0.7
}

/// Default max output tokens for the interview agent
fn default_openai_max_tokens() -> u32 {
    1500
}

/// Default system directive for the interview agent.
fn default_interview_agent_system_directive() -> String {
    prompts::INTERVIEW_AGENT_SYSTEM_DIRECTIVE.to_string()
}

/// Default listen address for the HTTP server.
fn default_listen_address() -> String {
    "0.0.0.0:8000".to_string()
}

/// Default bucket for uploaded report artifacts.
fn default_storage_bucket() -> String {
    "bug-report-artifacts".to_string()
}

/// Configuration for the bug-report-bot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// The shared inner configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// The configuration values, loaded from the environment and an optional file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// OpenAI API key (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// OpenAI interview agent model to use (`OPENAI_INTERVIEW_AGENT_MODEL`).
    #[serde(default = "default_openai_interview_agent_model")]
    pub openai_interview_agent_model: String,
    /// Optional custom system directive to override the default (`INTERVIEW_AGENT_SYSTEM_DIRECTIVE`).
    #[serde(default = "default_interview_agent_system_directive")]
    pub interview_agent_system_directive: String,
    /// Sampling temperature to use for the interview agent model (`OPENAI_INTERVIEW_AGENT_TEMPERATURE`).
    /// Value between 0 and 2. Higher values like 0.8 make output more random,
    /// while lower values like 0.2 make it more focused and deterministic.
    #[serde(default = "default_openai_interview_agent_temperature")]
    pub openai_interview_agent_temperature: f32,
    /// Max output tokens for the interview agent model (`OPENAI_MAX_TOKENS`).
    /// Maximum number of tokens that can be generated in the response.
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,
    /// Address the HTTP server binds to (`LISTEN_ADDRESS`).
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Tracker API key (`JIRA_API_KEY`); may be supplied per-request instead.
    #[serde(default)]
    pub jira_api_key: Option<String>,
    /// Tracker base URL (`JIRA_BASE_URL`); may be supplied per-request instead.
    #[serde(default)]
    pub jira_base_url: Option<String>,
    /// Tracker project key (`JIRA_PROJECT_KEY`); may be supplied per-request instead.
    #[serde(default)]
    pub jira_project_key: Option<String>,
    /// Reporter email for tracker basic auth (`JIRA_EMAIL`); may be supplied per-request instead.
    #[serde(default)]
    pub jira_email: Option<String>,
    /// Blob storage gateway endpoint (`STORAGE_ENDPOINT`); uploads fail individually when unset.
    #[serde(default)]
    pub storage_endpoint: Option<String>,
    /// Blob storage access token (`STORAGE_ACCESS_TOKEN`).
    #[serde(default)]
    pub storage_access_token: Option<String>,
    /// Blob storage bucket for report artifacts (`STORAGE_BUCKET`).
    #[serde(default = "default_storage_bucket")]
    pub storage_bucket: String,
}

impl Config {
    /// Load configuration from the environment (prefix `BUG_REPORT_BOT`) and
    /// an optional TOML file, then validate the ranged values.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("BUG_REPORT_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.openai_interview_agent_temperature < 0.0 || result.openai_interview_agent_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI interview agent temperature must be between 0 and 2."));
        }

        if result.openai_max_tokens < 1 || result.openai_max_tokens > 128000 {
            return Err(anyhow::anyhow!("OpenAI max tokens must be between 1 and 128000."));
        }

        Ok(result)
    }
}
