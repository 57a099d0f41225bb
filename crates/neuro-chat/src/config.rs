use std::env;
use std::fmt::{self, Debug};

use neuro_chat_openai_model::{OpenAIConfig, OpenAIConfigBuilder};

/// The environment variable holding the provider credential.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

/// Settings read once at start-up.
pub struct Config {
    api_key: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Returns `None` if the API key is missing or blank.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_key = lookup(API_KEY_VAR)?.trim().to_owned();
        if api_key.is_empty() {
            return None;
        }
        Some(Self { api_key })
    }

    /// Returns the provider configuration for this credential.
    pub fn provider_config(&self) -> OpenAIConfig {
        OpenAIConfigBuilder::with_api_key(self.api_key.as_str()).build()
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(|name| {
            (name == API_KEY_VAR).then(|| " gsk_test \n".to_owned())
        })
        .unwrap();
        assert_eq!(config.api_key, "gsk_test");
        assert_eq!(config.provider_config().model(), "llama-3.3-70b-versatile");
        assert!(!format!("{config:?}").contains("gsk_test"));
    }

    #[test]
    fn test_missing_key() {
        assert!(Config::from_lookup(|_| None).is_none());
        assert!(Config::from_lookup(|_| Some("   ".to_owned())).is_none());
    }
}
