//! Authentication headers for provider requests.

/// How a provider expects its API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>` (OpenAI-compatible APIs such as DeepSeek)
    Bearer,
    /// `x-goog-api-key: <key>` (Google Generative Language API)
    GoogApiKey,
}

pub const GOOG_API_KEY_HEADER: &str = "x-goog-api-key";

/// Add the scheme's authentication header to an HTTP request
pub fn add_auth_headers(
    request: reqwest::RequestBuilder,
    scheme: AuthScheme,
    api_key: &str,
) -> reqwest::RequestBuilder {
    match scheme {
        AuthScheme::Bearer => request.bearer_auth(api_key),
        AuthScheme::GoogApiKey => request.header(GOOG_API_KEY_HEADER, api_key),
    }
}
