use crate::error::ExplainError;
use crate::prompt::build_prompt;
use crate::Explainer;
use async_trait::async_trait;
use kindred_core::ProductRecord;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Groq's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// First choice's content, trimmed. Missing or blank content is an error.
fn first_choice(response: ChatResponse) -> Result<String, ExplainError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(ExplainError::EmptyResponse)
}

/// Explainer backed by an OpenAI-compatible `/chat/completions` API.
pub struct ChatCompletionsExplainer {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl ChatCompletionsExplainer {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ExplainError> {
        let client = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            client,
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl Explainer for ChatCompletionsExplainer {
    async fn explain(
        &self,
        source: &ProductRecord,
        recommended: &ProductRecord,
    ) -> Result<String, ExplainError> {
        let prompt = build_prompt(source, recommended);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        debug!(
            "Requesting explanation for {} -> {} from {}",
            source.id, recommended.id, self.model
        );
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExplainError::Api {
                status: status.as_u16(),
                body,
            });
        }

        first_choice(response.json::<ChatResponse>().await?)
    }
}

/// Explainer used when no API key is configured. Always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledExplainer;

#[async_trait]
impl Explainer for DisabledExplainer {
    async fn explain(
        &self,
        _source: &ProductRecord,
        _recommended: &ProductRecord,
    ) -> Result<String, ExplainError> {
        Err(ExplainError::NotConfigured)
    }
}
