//! Endpoint construction for the provider clients.

/// Strip trailing slashes so endpoints can be appended with a single `/`.
///
/// ```
/// use sentiment_oracle::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.deepseek.com/"), "https://api.deepseek.com");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path without doubling slashes.
///
/// ```
/// use sentiment_oracle::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.deepseek.com/", "/chat/completions"),
///     "https://api.deepseek.com/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

/// `models/{model}:generateContent` under the given API root. A `models/`
/// prefix already present on the model id is not repeated.
pub fn generate_content_url(base_url: &str, model: &str) -> String {
    let model = model.trim().trim_start_matches("models/");
    construct_api_url(base_url, &format!("models/{model}:generateContent"))
}
