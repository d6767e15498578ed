/*!
 * Per-user settings attached to every translation request.
 *
 * The store is read once per batch, so edits made while a whole-file run is
 * in progress apply from the next batch on.
 */

use std::env;
use std::fmt::Debug;

use crate::app_config::TranslationConfig;
use crate::providers::ProviderKind;

/// Environment variable overriding the configured API key
pub const API_KEY_ENV: &str = "AISUB_API_KEY";

/// Source of the optional request settings.
///
/// Empty values mean "not set" and are left out of the request.
pub trait CredentialStore: Send + Sync + Debug {
    fn api_key(&self) -> String;
    fn prompt_template(&self) -> String;
    fn base_host(&self) -> String;
    fn provider(&self) -> ProviderKind;
}

/// Settings taken from the config file, with the API key overridable from the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigCredentials {
    api_key: String,
    prompt_template: String,
    base_host: String,
    provider: ProviderKind,
}

impl ConfigCredentials {
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            prompt_template: config.prompt_template.clone(),
            base_host: config.base_host.clone(),
            provider: config.provider,
        }
    }

    /// Same as `new`, but a non-empty `AISUB_API_KEY` wins over the file
    pub fn from_env(config: &TranslationConfig) -> Self {
        let mut credentials = Self::new(config);
        if let Ok(key) = env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                credentials.api_key = key.trim().to_string();
            }
        }
        credentials
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_prompt_template(mut self, prompt_template: impl Into<String>) -> Self {
        self.prompt_template = prompt_template.into();
        self
    }

    pub fn with_base_host(mut self, base_host: impl Into<String>) -> Self {
        self.base_host = base_host.into();
        self
    }

    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = provider;
        self
    }
}

impl CredentialStore for ConfigCredentials {
    fn api_key(&self) -> String {
        self.api_key.clone()
    }

    fn prompt_template(&self) -> String {
        self.prompt_template.clone()
    }

    fn base_host(&self) -> String {
        self.base_host.clone()
    }

    fn provider(&self) -> ProviderKind {
        self.provider
    }
}

/// `Some(value)` when the value holds anything besides whitespace
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}
