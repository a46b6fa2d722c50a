use crate::core::attachment::DEFAULT_MAX_ATTACHMENT_BYTES;
use crate::core::config::data::Config;

pub const DEFAULT_PRIMARY_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_PRIMARY_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PRIMARY_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_SECONDARY_MODEL: &str = "deepseek-chat";
pub const DEFAULT_SECONDARY_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_SECONDARY_TIMEOUT_SECS: u64 = 15;

/// Keys accepted by `config set` / `config unset`.
pub const CONFIG_KEYS: &[&str] = &[
    "primary-model",
    "primary-base-url",
    "primary-timeout",
    "secondary-model",
    "secondary-base-url",
    "secondary-timeout",
    "secondary-enabled",
    "max-attachment-bytes",
];

impl Config {
    pub fn primary_model(&self) -> &str {
        self.primary.model.as_deref().unwrap_or(DEFAULT_PRIMARY_MODEL)
    }

    pub fn primary_base_url(&self) -> &str {
        self.primary
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_PRIMARY_BASE_URL)
    }

    pub fn primary_timeout_secs(&self) -> u64 {
        self.primary
            .timeout_secs
            .unwrap_or(DEFAULT_PRIMARY_TIMEOUT_SECS)
    }

    pub fn secondary_model(&self) -> &str {
        self.secondary
            .model
            .as_deref()
            .unwrap_or(DEFAULT_SECONDARY_MODEL)
    }

    pub fn secondary_base_url(&self) -> &str {
        self.secondary
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_SECONDARY_BASE_URL)
    }

    pub fn secondary_timeout_secs(&self) -> u64 {
        self.secondary
            .timeout_secs
            .unwrap_or(DEFAULT_SECONDARY_TIMEOUT_SECS)
    }

    pub fn secondary_enabled(&self) -> bool {
        self.secondary.enabled.unwrap_or(true)
    }

    pub fn max_attachment_bytes(&self) -> u64 {
        self.max_attachment_bytes
            .unwrap_or(DEFAULT_MAX_ATTACHMENT_BYTES)
    }

    /// Apply `config set <key> <value>`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }

        match key {
            "primary-model" => self.primary.model = Some(value.to_string()),
            "primary-base-url" => self.primary.base_url = Some(value.to_string()),
            "primary-timeout" => self.primary.timeout_secs = Some(parse_secs(key, value)?),
            "secondary-model" => self.secondary.model = Some(value.to_string()),
            "secondary-base-url" => self.secondary.base_url = Some(value.to_string()),
            "secondary-timeout" => self.secondary.timeout_secs = Some(parse_secs(key, value)?),
            "secondary-enabled" => self.secondary.enabled = Some(parse_toggle(key, value)?),
            "max-attachment-bytes" => {
                let bytes = value
                    .parse::<u64>()
                    .map_err(|_| format!("{key} expects a whole number of bytes"))?;
                self.max_attachment_bytes = Some(bytes);
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Apply `config unset <key>`, restoring the built-in default.
    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "primary-model" => self.primary.model = None,
            "primary-base-url" => self.primary.base_url = None,
            "primary-timeout" => self.primary.timeout_secs = None,
            "secondary-model" => self.secondary.model = None,
            "secondary-base-url" => self.secondary.base_url = None,
            "secondary-timeout" => self.secondary.timeout_secs = None,
            "secondary-enabled" => self.secondary.enabled = None,
            "max-attachment-bytes" => self.max_attachment_bytes = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {key} (expected one of: {})",
        CONFIG_KEYS.join(", ")
    )
}

fn parse_secs(key: &str, value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(format!("{key} expects a positive number of seconds")),
    }
}

fn parse_toggle(key: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("{key} expects on or off")),
    }
}
