//! The secondary, advisory sentiment provider.
//!
//! Its answer only ever feeds the primary system instruction. Every failure
//! collapses to `None` so it can never block or fail a send.

use async_trait::async_trait;
use tracing::debug;

use crate::api::deepseek::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat};
use crate::core::config::ProviderSettings;
use crate::core::message::SentimentResult;
use crate::core::prompt::advisor_prompt;
use crate::core::provider_error::ProviderError;
use crate::core::reply::result_from_json;
use crate::utils::auth::{add_auth_headers, AuthScheme};
use crate::utils::url::construct_api_url;

pub const PROVIDER_NAME: &str = "DeepSeek";

#[async_trait]
pub trait SentimentAdvisor: Send + Sync {
    /// A best-effort judgment of `text`, or `None` on any failure.
    async fn advise(&self, text: &str) -> Option<SentimentResult>;
}

pub struct DeepSeekAdvisor {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl DeepSeekAdvisor {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ProviderError::from_reqwest(PROVIDER_NAME, e))?;
        Ok(Self { client, settings })
    }

    async fn request_judgment(&self, text: &str) -> Result<SentimentResult, ProviderError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey {
                provider: PROVIDER_NAME,
                env_var: "DEEPSEEK_API_KEY",
            })?;

        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: advisor_prompt(text),
            }],
            response_format: ResponseFormat::json_object(),
        };

        let chat_url = construct_api_url(&self.settings.base_url, "chat/completions");
        let http_request = self
            .client
            .post(chat_url)
            .header("Content-Type", "application/json");
        let response = add_auth_headers(http_request, AuthScheme::Bearer, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(PROVIDER_NAME, status, &error_text));
        }

        let body = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER_NAME, e))?;
        let content = body.first_content().ok_or(ProviderError::EmptyResponse {
            provider: PROVIDER_NAME,
        })?;

        result_from_json(content).ok_or_else(|| ProviderError::Body {
            provider: PROVIDER_NAME,
            detail: "content is not a sentiment object".to_string(),
        })
    }
}

#[async_trait]
impl SentimentAdvisor for DeepSeekAdvisor {
    async fn advise(&self, text: &str) -> Option<SentimentResult> {
        if text.trim().is_empty() {
            return None;
        }

        match self.request_judgment(text).await {
            Ok(result) => {
                debug!(sentiment = %result.sentiment, "advisor judgment received");
                Some(result)
            }
            Err(err) => {
                debug!(error = %err, "advisor judgment unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::SentimentCategory;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn advisor(base_url: String) -> DeepSeekAdvisor {
        DeepSeekAdvisor::new(ProviderSettings {
            base_url,
            model: "deepseek-chat".to_string(),
            api_key: Some("d-key".to_string()),
            timeout: Duration::from_millis(500),
        })
        .unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "x",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
    }

    #[tokio::test]
    async fn parses_json_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer d-key"))
            .and(body_partial_json(json!({
                "model": "deepseek-chat",
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                r#"{"sentiment":"positive","confidence":0.8,"emoji":"😀","explanation":"happy"}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let result = advisor(server.uri()).advise("I love it").await.unwrap();
        assert_eq!(result.sentiment, SentimentCategory::Positive);
        assert_eq!(result.explanation, "happy");
    }

    #[tokio::test]
    async fn empty_text_skips_request() {
        let server = MockServer::start().await;
        assert!(advisor(server.uri()).advise("  ").await.is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failures_collapse_to_none() {
        let cases = [
            ResponseTemplate::new(500).set_body_string("boom"),
            ResponseTemplate::new(200).set_body_string("not json"),
            ResponseTemplate::new(200).set_body_json(json!({"choices": []})),
            ResponseTemplate::new(200).set_body_json(completion("I think it is positive")),
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(completion("{}")),
        ];

        for template in cases {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(template)
                .mount(&server)
                .await;
            assert!(advisor(server.uri()).advise("text").await.is_none());
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_none() {
        let result = advisor("http://127.0.0.1:9".to_string()).advise("text").await;
        assert!(result.is_none());
    }
}
