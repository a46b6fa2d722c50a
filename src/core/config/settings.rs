use std::fmt;
use std::time::Duration;

use crate::core::config::data::Config;

/// Environment variables holding the primary key, in lookup order.
pub const PRIMARY_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];
pub const SECONDARY_KEY_VAR: &str = "DEEPSEEK_API_KEY";

/// Everything a provider client needs, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub primary_model: Option<String>,
    pub secondary_model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub primary: ProviderSettings,
    /// `None` when no secondary key is present or the advisor is disabled.
    pub secondary: Option<ProviderSettings>,
    pub max_attachment_bytes: u64,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Settings {
    pub fn resolve(
        config: &Config,
        overrides: &SettingsOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let primary_key = PRIMARY_KEY_VARS
            .iter()
            .find_map(|var| non_empty(env(var)));

        let primary = ProviderSettings {
            base_url: config.primary_base_url().to_string(),
            model: overrides
                .primary_model
                .clone()
                .unwrap_or_else(|| config.primary_model().to_string()),
            api_key: primary_key,
            timeout: Duration::from_secs(config.primary_timeout_secs()),
        };

        let secondary = non_empty(env(SECONDARY_KEY_VAR))
            .filter(|_| config.secondary_enabled())
            .map(|key| ProviderSettings {
                base_url: config.secondary_base_url().to_string(),
                model: overrides
                    .secondary_model
                    .clone()
                    .unwrap_or_else(|| config.secondary_model().to_string()),
                api_key: Some(key),
                timeout: Duration::from_secs(config.secondary_timeout_secs()),
            });

        Settings {
            primary,
            secondary,
            max_attachment_bytes: config.max_attachment_bytes(),
        }
    }

    pub fn from_process_env(config: &Config, overrides: &SettingsOverrides) -> Self {
        Self::resolve(config, overrides, |name| std::env::var(name).ok())
    }
}
