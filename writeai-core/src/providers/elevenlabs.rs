//! HTTP client for the voice-synthesis provider (ElevenLabs text-to-speech).

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Serialize;

use crate::config::ElevenLabsConfig;
use crate::error::{Error, Result};
use crate::text::count_chars;
use crate::types::VoiceSettings;

const PROVIDER: &str = "elevenlabs";

/// HTTP client for the text-to-speech API
pub struct VoiceClient {
    config: ElevenLabsConfig,
    http_client: reqwest::Client,
    base_url: String,
}

impl VoiceClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if no API key can be resolved.
    pub fn new(config: ElevenLabsConfig) -> Result<Self> {
        let api_key = config.resolved_api_key()?;
        let base_url = config.endpoint.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("audio/mpeg"));
        headers.insert(
            "xi-api-key",
            HeaderValue::from_str(&api_key)
                .map_err(|e| Error::Config(format!("invalid elevenlabs api_key: {}", e)))?,
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

    /// Synthesize speech for a text, returning the raw audio bytes (MP3).
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        settings: VoiceSettings,
    ) -> Result<Vec<u8>> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, voice_id);
        let settings = settings.clamped();

        let request = SynthesisRequest {
            text,
            model_id: &self.config.model,
            voice_settings: SynthesisSettings {
                stability: settings.stability,
                similarity_boost: settings.similarity_boost,
                style: settings.style,
                use_speaker_boost: true,
            },
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

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("failed to read audio body: {}", e)))?;

        if bytes.is_empty() {
            return Err(Error::provider(PROVIDER, "empty audio payload"));
        }

        Ok(bytes.to_vec())
    }
}

/// Estimate spoken duration from text length, at roughly 10 characters per
/// second. The provider does not report a duration, and we deliberately do
/// not decode the MP3 to measure it.
pub fn estimate_duration_secs(text: &str) -> i64 {
    let chars = count_chars(text);
    (chars + 9) / 10
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: SynthesisSettings,
}

#[derive(Serialize)]
struct SynthesisSettings {
    stability: f64,
    similarity_boost: f64,
    style: f64,
    use_speaker_boost: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        if std::env::var("ELEVENLABS_API_KEY").is_err() {
            assert!(VoiceClient::new(ElevenLabsConfig::default()).is_err());
        }
    }

    #[test]
    fn test_client_with_key() {
        let config = ElevenLabsConfig {
            api_key: Some("el-test".to_string()),
            ..Default::default()
        };
        assert!(VoiceClient::new(config).is_ok());
    }

    #[test]
    fn test_estimate_duration() {
        assert_eq!(estimate_duration_secs(""), 0);
        assert_eq!(estimate_duration_secs(&"x".repeat(10)), 1);
        assert_eq!(estimate_duration_secs(&"x".repeat(11)), 2);
        assert_eq!(estimate_duration_secs(&"x".repeat(95)), 10);
    }

    #[test]
    fn test_synthesis_request_shape() {
        let request = SynthesisRequest {
            text: "hello",
            model_id: "eleven_multilingual_v2",
            voice_settings: SynthesisSettings {
                stability: 0.5,
                similarity_boost: 0.75,
                style: 0.3,
                use_speaker_boost: true,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model_id"], "eleven_multilingual_v2");
        assert_eq!(json["voice_settings"]["similarity_boost"], 0.75);
        assert_eq!(json["voice_settings"]["use_speaker_boost"], true);
    }
}
