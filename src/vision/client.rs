use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::BackendError;
use crate::config::ApiConfig;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const PING_MAX_TOKENS: u32 = 10;
const RECOGNIZE_MAX_TOKENS: u32 = 1024;
const TEMPERATURE: f64 = 0.2;

const PING_TEXT: &str = "Hello, this is a test message.";
const RECOGNIZE_TEXT: &str =
    "Recognize the mathematical formula in the image and output pure LaTeX code";

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    ImageUrl { image_url: ImageUrl },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl<'a> ChatRequest<'a> {
    pub(crate) fn ping(config: &'a ApiConfig) -> Self {
        Self {
            model: &config.model_name,
            messages: vec![
                ChatMessage::system(&config.system_prompt),
                ChatMessage {
                    role: "user",
                    content: MessageContent::Text(PING_TEXT),
                },
            ],
            max_tokens: PING_MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }

    pub(crate) fn recognize(config: &'a ApiConfig, png_base64: &str) -> Self {
        Self {
            model: &config.model_name,
            messages: vec![
                ChatMessage::system(&config.system_prompt),
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: format!("data:image/png;base64,{png_base64}"),
                            },
                        },
                        ContentPart::Text {
                            text: RECOGNIZE_TEXT,
                        },
                    ]),
                },
            ],
            max_tokens: RECOGNIZE_MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

impl<'a> ChatMessage<'a> {
    fn system(prompt: &'a str) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(prompt),
        }
    }
}

/// Thin client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Clone)]
pub struct VisionClient {
    http: reqwest::Client,
}

impl VisionClient {
    pub fn new() -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(BackendError::Network)?;
        Ok(Self { http })
    }

    /// Send a tiny chat request to prove the URL, key and model are usable.
    pub async fn ping(&self, config: &ApiConfig) -> Result<(), BackendError> {
        self.post(config, &ChatRequest::ping(config)).await?;
        Ok(())
    }

    /// Ask the model for the LaTeX of a base64-encoded PNG. Returns raw content.
    pub async fn recognize(
        &self,
        config: &ApiConfig,
        png_base64: &str,
    ) -> Result<String, BackendError> {
        let response = self
            .post(config, &ChatRequest::recognize(config, png_base64))
            .await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| BackendError::MalformedResponse(err.to_string()))?;
        Ok(first_choice_content(body))
    }

    async fn post(
        &self,
        config: &ApiConfig,
        request: &ChatRequest<'_>,
    ) -> Result<reqwest::Response, BackendError> {
        let response = self
            .http
            .post(format!("{}/chat/completions", config.base_url()))
            .bearer_auth(config.api_key.trim())
            .json(request)
            .send()
            .await
            .map_err(BackendError::Network)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

fn first_choice_content(response: ChatResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default()
}
