//! OpenAI chat completions binding for [`Identifier`].

use crate::features::error::IdentifyError;
use crate::identify::{IdentifyRequest, Identifier};
use async_trait::async_trait;
use bon::bon;
use serde::{Deserialize, Serialize};

// =============================================================================
// OpenAI Identifier
// =============================================================================

pub struct OpenAiIdentifier {
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

#[bon]
impl OpenAiIdentifier {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";
    pub const DEFAULT_MAX_TOKENS: u32 = 400;

    /// Builds the client. A missing API key is accepted here; every call then
    /// fails with [`IdentifyError::MissingApiKey`].
    ///
    /// `client` overrides the HTTP client, for custom proxies or TLS setup.
    #[builder]
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        client: Option<reqwest::Client>,
    ) -> Result<Self, IdentifyError> {
        let client = match client {
            Some(client) => client,
            None => reqwest::Client::builder().build()?,
        };
        Ok(Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url
                .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            max_tokens: max_tokens.unwrap_or(Self::DEFAULT_MAX_TOKENS),
            client,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_request(&self, request: &IdentifyRequest) -> ChatCompletionRequest {
        let prompt = request.prompt();
        let content = match &request.image_data_url {
            Some(url) => MessageContent::Parts(vec![
                ContentPart::Text { text: prompt },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: url.clone() },
                },
            ]),
            None => MessageContent::Text(prompt),
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            max_tokens: self.max_tokens,
        }
    }
}

// =============================================================================
// OpenAI API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ChatCompletionResponse {
    /// First choice's text, or empty when the service sent nothing.
    fn into_reply(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default()
    }
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// =============================================================================
// Identifier Implementation
// =============================================================================

#[async_trait]
impl Identifier for OpenAiIdentifier {
    fn name(&self) -> &str {
        "openai"
    }

    async fn describe(&self, request: IdentifyRequest) -> Result<String, IdentifyError> {
        let api_key = self.api_key.as_deref().ok_or(IdentifyError::MissingApiKey)?;

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.chat_request(&request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(IdentifyError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body)?;
        Ok(completion.into_reply())
    }
}

// =============================================================================
// Tests
// =============================================================================
