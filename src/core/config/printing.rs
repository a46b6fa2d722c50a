use crate::core::config::data::Config;
use crate::core::config::settings::{PRIMARY_KEY_VARS, SECONDARY_KEY_VAR};

fn key_status(present: bool) -> &'static str {
    if present {
        "set"
    } else {
        "not set"
    }
}

impl Config {
    /// Print the effective configuration. Key values are never printed.
    pub fn print_all(&self, env: impl Fn(&str) -> Option<String>) {
        let has_key = |name: &str| env(name).is_some_and(|value| !value.trim().is_empty());

        println!("Current configuration:");
        println!("  primary-model: {}", self.primary_model());
        println!("  primary-base-url: {}", self.primary_base_url());
        println!("  primary-timeout: {}s", self.primary_timeout_secs());
        println!("  secondary-model: {}", self.secondary_model());
        println!("  secondary-base-url: {}", self.secondary_base_url());
        println!("  secondary-timeout: {}s", self.secondary_timeout_secs());
        println!(
            "  secondary-enabled: {}",
            if self.secondary_enabled() { "on" } else { "off" }
        );
        println!("  max-attachment-bytes: {}", self.max_attachment_bytes());
        println!("Environment:");
        for var in PRIMARY_KEY_VARS {
            println!("  {var}: {}", key_status(has_key(var)));
        }
        println!("  {SECONDARY_KEY_VAR}: {}", key_status(has_key(SECONDARY_KEY_VAR)));
    }
}
