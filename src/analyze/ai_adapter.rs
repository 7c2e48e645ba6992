// src/analyze/ai_adapter.rs
//! Completion client: provider abstraction over the hosted chat-completion
//! service, plus mock/disabled implementations for tests and keyless runs.
//! The prompt template and the structured parser are coupled; change one and
//! the other must follow.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_MODEL: &str = "FACTLENS_MODEL";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Whole-request budget. On expiry the call is cancelled and reported as a
/// timeout, never silently retried.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(45);

const MAX_TOKENS: u32 = 600;

/// Errors crossing the analysis-pipeline boundary. Completion failures
/// propagate to the caller; the API layer maps them onto HTTP statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    MissingApiKey,
    Upstream { status: u16, body: String },
    Timeout,
    Transport(String),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => {
                write!(f, "Missing {ENV_OPENAI_API_KEY} environment variable")
            }
            Self::Upstream { status, body } => {
                write!(f, "completion provider returned {status}: {body}")
            }
            Self::Timeout => write!(f, "analysis request timed out, please retry"),
            Self::Transport(msg) => write!(f, "completion request failed: {msg}"),
        }
    }
}

impl std::error::Error for CompletionError {}

/// The line-oriented template the structured parser expects the model to
/// follow.
pub fn build_prompt(title: &str, content: &str) -> String {
    format!(
        "FactLens-EN-v2\n\
         Title:{title}\n\
         Credibility:X/10\n\
         Facts:1.conf:0.XX<fact>sentence</fact>\n\
         Opinions:1.conf:0.XX<opinion>sentence</opinion>\n\
         Bias:-E:N conf:0.XX -B:N -M:N -F:N -Stance:neutral/leaning X%\n\
         Pub:xxx(≤15w) PR:xxx(≤8w) Sum:xxx(≤8w)\n\
         Text:{content}"
    )
}

/// Seam for the hosted text-generation collaborator.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the raw model reply text for the parser.
    async fn complete(&self, title: &str, content: &str) -> Result<String, CompletionError>;

    fn provider_name(&self) -> &'static str;

    fn has_api_key(&self) -> bool {
        true
    }
}

pub type DynCompletionClient = Arc<dyn CompletionClient>;

/// OpenAI Chat Completions provider. Requires `OPENAI_API_KEY`.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("factlens/0.1")
            .connect_timeout(Duration::from_secs(4))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model,
        }
    }

    /// Key and model from the environment; an absent key yields a provider
    /// whose calls fail with `MissingApiKey` (fatal to that request only).
    pub fn from_env() -> Self {
        let api_key = std::env::var(ENV_OPENAI_API_KEY).unwrap_or_default();
        let model = std::env::var(ENV_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(api_key, model)
    }

    async fn request(&self, prompt: &str) -> Result<String, CompletionError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
            max_tokens: MAX_TOKENS,
        };

        let resp = self
            .http
            .post(COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "completion provider error");
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;
        // A missing/empty choices array is not an error here; the parser
        // degrades an empty reply into an error-flagged report.
        Ok(body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl CompletionClient for OpenAiProvider {
    async fn complete(&self, title: &str, content: &str) -> Result<String, CompletionError> {
        if self.api_key.is_empty() {
            return Err(CompletionError::MissingApiKey);
        }
        let prompt = build_prompt(title, content);
        match tokio::time::timeout(COMPLETION_TIMEOUT, self.request(&prompt)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout),
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Deterministic client for tests and local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub reply: String,
}

#[async_trait]
impl CompletionClient for MockProvider {
    async fn complete(&self, _title: &str, _content: &str) -> Result<String, CompletionError> {
        Ok(self.reply.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Always fails with the configuration error; used when no credential exists.
pub struct DisabledProvider;

#[async_trait]
impl CompletionClient for DisabledProvider {
    async fn complete(&self, _title: &str, _content: &str) -> Result<String, CompletionError> {
        Err(CompletionError::MissingApiKey)
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }

    fn has_api_key(&self) -> bool {
        false
    }
}
