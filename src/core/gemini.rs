use async_trait::async_trait;
use tracing::debug;

use crate::api::gemini::{GenerateContentRequest, GenerateContentResponse};
use crate::core::config::ProviderSettings;
use crate::core::provider_error::ProviderError;
use crate::utils::auth::{add_auth_headers, AuthScheme};
use crate::utils::url::generate_content_url;

pub const PROVIDER_NAME: &str = "Gemini";

/// The conversational provider producing the user-facing reply.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Raw reply text for one request; structured results are extracted by
    /// the caller.
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, ProviderError>;
}

pub struct GeminiClient {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl GeminiClient {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ProviderError::from_reqwest(PROVIDER_NAME, e))?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }
}

#[async_trait]
impl ChatProvider for GeminiClient {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, ProviderError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey {
                provider: PROVIDER_NAME,
                env_var: "GEMINI_API_KEY",
            })?;

        let url = generate_content_url(&self.settings.base_url, &self.settings.model);
        debug!(
            model = %self.settings.model,
            turns = request.contents.len(),
            "sending generateContent request"
        );

        let http_request = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        let response = add_auth_headers(http_request, AuthScheme::GoogApiKey, api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            debug!(%status, "generateContent failed");
            return Err(ProviderError::status(PROVIDER_NAME, status, &error_text));
        }

        let body = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER_NAME, e))?;

        body.text().ok_or(ProviderError::EmptyResponse {
            provider: PROVIDER_NAME,
        })
    }
}
