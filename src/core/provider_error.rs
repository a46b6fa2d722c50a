use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} API key is not set ({env_var})")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("request to {provider} timed out")]
    Timeout { provider: &'static str },

    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned status {status}: {summary}")]
    Status {
        provider: &'static str,
        status: u16,
        summary: String,
    },

    #[error("{provider} returned an unreadable body: {detail}")]
    Body {
        provider: &'static str,
        detail: String,
    },

    #[error("{provider} returned no text")]
    EmptyResponse { provider: &'static str },
}

impl ProviderError {
    pub fn from_reqwest(provider: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ProviderError::Timeout { provider }
        } else if source.is_decode() {
            ProviderError::Body {
                provider,
                detail: source.to_string(),
            }
        } else {
            ProviderError::Transport { provider, source }
        }
    }

    pub fn status(provider: &'static str, status: reqwest::StatusCode, body: &str) -> Self {
        ProviderError::Status {
            provider,
            status: status.as_u16(),
            summary: summarize_api_error(body),
        }
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// One-line description of an error body, preferring the provider's own
/// `error.message`.
pub fn summarize_api_error(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value) {
            if !summary.is_empty() {
                return summary;
            }
        }
    }

    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(200) {
        Some((cut, _)) => format!("{}…", &collapsed[..cut]),
        None => collapsed,
    }
}
