//! HTTP client for the text-generation provider (OpenAI chat completions).

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};
use crate::text::{count_chars, count_words};
use crate::types::ToolKind;

const PROVIDER: &str = "openai";

/// A successful text generation, with the counts callers persist.
#[derive(Debug, Clone)]
pub struct TextGeneration {
    pub content: String,
    pub word_count: i64,
    pub character_count: i64,
}

impl TextGeneration {
    fn from_content(content: String) -> Self {
        let word_count = count_words(&content);
        let character_count = count_chars(&content);
        Self {
            content,
            word_count,
            character_count,
        }
    }
}

/// HTTP client for the chat-completions API
pub struct TextClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
    base_url: String,
}

impl TextClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if no API key can be resolved.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let api_key = config.resolved_api_key()?;
        let base_url = config.endpoint.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| Error::Config(format!("invalid openai api_key: {}", e)))?,
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            base_url,
        })
    }

    /// Generate content for a prompt using the given tool persona.
    ///
    /// `max_tokens` falls back to the configured default when `None`.
    pub async fn generate(
        &self,
        prompt: &str,
        tool: &ToolKind,
        language: &str,
        max_tokens: Option<u32>,
    ) -> Result<TextGeneration> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(tool, language),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            max_tokens: max_tokens.unwrap_or(self.config.max_tokens),
            temperature: 0.7,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Error::provider(
                PROVIDER,
                format!("API error ({}): {}", status, error_text),
            ));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("failed to parse response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::provider(PROVIDER, "no content generated"))?;

        Ok(TextGeneration::from_content(content))
    }
}

/// Per-tool system personas sent with every generation.
///
/// The closed tool set each gets a tailored instruction; anything else falls
/// back to the generic writing-assistant persona.
pub fn system_prompt(tool: &ToolKind, language: &str) -> String {
    let persona = match tool {
        ToolKind::Rewrite => {
            "You are an expert text rewriter. Improve the given text while keeping its \
             original meaning, with better clarity, flow and engagement."
        }
        ToolKind::Article => {
            "You are an expert copywriter who creates complete, SEO-optimized articles. \
             Write well-structured articles with an introduction, body and conclusion. \
             Include subheadings and be informative."
        }
        ToolKind::Email => {
            "You are a business-communication expert. Write professional, clear and \
             persuasive emails with a tone appropriate for the context."
        }
        ToolKind::Social => {
            "You are a social-media content expert. Create engaging posts with a \
             call-to-action and relevant hashtags."
        }
        ToolKind::Product => {
            "You are a copywriter specialized in product descriptions. Write persuasive \
             copy that highlights benefits and features and creates urgency to buy."
        }
        ToolKind::Correction => {
            "You are an expert proofreader. Fix grammar, spelling and style mistakes \
             while keeping the original tone of the text."
        }
        _ => {
            "You are a specialized writing assistant. Help create high-quality \
             content."
        }
    };

    format!("{} Respond in {}.", persona, language)
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
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
    content: String,
}
