/*!
 * Core translation service implementation.
 *
 * `TranslationService` performs exactly one backend round trip per batch and
 * turns the reply into translated entries or a typed error. Retrying is left to
 * the orchestrator.
 */

use log::{debug, warn};
use std::sync::Arc;

use crate::app_config::TranslationConfig;
use crate::credentials::{non_empty, CredentialStore};
use crate::errors::TranslationError;
use crate::providers::http::HttpBackend;
use crate::providers::{TranslateBackend, TranslateReply, TranslateRequest};
use crate::subtitle_processor::SubtitleEntry;

/// Comma glyphs stripped from the end of a batch
const TRAILING_COMMAS: [char; 2] = [',', '，'];

/// Translation service wrapping one backend
#[derive(Debug, Clone)]
pub struct TranslationService {
    backend: Arc<dyn TranslateBackend>,

    /// Redirects open the purchase flow instead of failing as a rate limit
    enable_shop: bool,
}

impl TranslationService {
    /// Create a service over any backend, commercial gate off
    pub fn new(backend: Arc<dyn TranslateBackend>) -> Self {
        Self {
            backend,
            enable_shop: false,
        }
    }

    /// Create a service talking HTTP to the configured endpoint
    pub fn from_config(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let backend = HttpBackend::new(&config.endpoint, config.timeout_secs)?;
        Ok(Self::new(Arc::new(backend)).with_shop(config.enable_shop))
    }

    pub fn with_shop(mut self, enable_shop: bool) -> Self {
        self.enable_shop = enable_shop;
        self
    }

    pub fn shop_enabled(&self) -> bool {
        self.enable_shop
    }

    /// Build the request body for one batch
    pub fn build_request(
        batch: &[SubtitleEntry],
        target_lang: &str,
        credentials: &dyn CredentialStore,
    ) -> TranslateRequest {
        let mut sentences: Vec<String> = batch.iter().map(|entry| entry.content.clone()).collect();
        if let Some(last) = sentences.last_mut() {
            strip_trailing_comma(last);
        }

        TranslateRequest {
            target_lang: target_lang.to_string(),
            sentences,
            api_key: non_empty(credentials.api_key()),
            prompt_template: non_empty(credentials.prompt_template()),
            base_host: non_empty(credentials.base_host()),
            provider: credentials.provider(),
        }
    }

    /// Translate one batch in a single round trip.
    ///
    /// The result has the batch's positions and time ranges with translated content.
    pub async fn translate_batch(
        &self,
        batch: &[SubtitleEntry],
        target_lang: &str,
        credentials: &dyn CredentialStore,
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        let request = Self::build_request(batch, target_lang, credentials);
        debug!(
            "Translating {} entries to {} via {}",
            request.sentences.len(),
            target_lang,
            request.provider
        );

        match self.backend.translate(request).await? {
            TranslateReply::Translations(translations) => zip_translations(batch, translations),
            TranslateReply::ErrorMessage(message) => Err(TranslationError::Api(message)),
            TranslateReply::Redirect { location } => {
                if self.enable_shop {
                    Err(TranslationError::Redirected { location })
                } else {
                    warn!("Translate backend redirected to {}, treating it as a rate limit", location);
                    Err(TranslationError::RateLimited)
                }
            }
        }
    }
}

fn strip_trailing_comma(sentence: &mut String) {
    if sentence.ends_with(TRAILING_COMMAS) {
        sentence.pop();
    }
}

fn zip_translations(
    batch: &[SubtitleEntry],
    translations: Vec<String>,
) -> Result<Vec<SubtitleEntry>, TranslationError> {
    if translations.len() != batch.len() {
        return Err(TranslationError::MismatchedResponse {
            expected: batch.len(),
            actual: translations.len(),
        });
    }

    Ok(batch
        .iter()
        .zip(translations)
        .map(|(entry, text)| entry.with_content(text))
        .collect())
}
