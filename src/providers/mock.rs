/*!
 * Scripted backend for tests and dry runs.
 *
 * This module provides a backend that simulates different behaviors:
 * - `MockBackend::working()` - Always succeeds, tagging each sentence
 * - `MockBackend::fail_times(k)` - Fails the first `k` calls, then succeeds
 * - `MockBackend::failing()` - Always fails with an error
 * - `MockBackend::redirecting(url)` / `MockBackend::error_message(msg)` - gate replies
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use super::{TranslateBackend, TranslateReply, TranslateRequest};

/// Behavior mode for the mock backend
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails the first `times` requests, then succeeds
    FailTimes { times: usize },
    /// Always fails with a transport error
    Failing,
    /// Answers with a structured error message
    ErrorMessage(String),
    /// Answers with a redirect
    Redirect(String),
    /// Drops the last sentence of every reply
    Truncated,
}

/// Mock backend recording every request it receives
#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Requests received so far, shared between clones
    requests: Arc<Mutex<Vec<TranslateRequest>>>,
    /// Custom sentence translator (optional)
    custom_response: Option<fn(&str, &str) -> String>,
    /// Fail any request whose sentences match this predicate (optional)
    fail_when: Option<fn(&TranslateRequest) -> bool>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
            fail_when: None,
        }
    }

    /// Create a working mock backend that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a backend failing the first `times` requests
    pub fn fail_times(times: usize) -> Self {
        Self::new(MockBehavior::FailTimes { times })
    }

    /// Create a failing mock backend that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a backend that answers every request with a redirect
    pub fn redirecting(location: impl Into<String>) -> Self {
        Self::new(MockBehavior::Redirect(location.into()))
    }

    /// Create a backend that answers every request with an error payload
    pub fn error_message(message: impl Into<String>) -> Self {
        Self::new(MockBehavior::ErrorMessage(message.into()))
    }

    /// Create a backend that returns one sentence too few
    pub fn truncated() -> Self {
        Self::new(MockBehavior::Truncated)
    }

    /// Set a custom translator, called with `(sentence, target_lang)`
    pub fn with_custom_response(mut self, generator: fn(&str, &str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Fail every request matching the predicate, whatever the behavior
    pub fn with_failure_when(mut self, predicate: fn(&TranslateRequest) -> bool) -> Self {
        self.fail_when = Some(predicate);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<TranslateRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn translate_sentences(&self, request: &TranslateRequest) -> Vec<String> {
        request.sentences.iter()
            .map(|sentence| match self.custom_response {
                Some(generator) => generator(sentence, &request.target_lang),
                None => format!("[{}] {}", request.target_lang, sentence),
            })
            .collect()
    }
}

#[async_trait]
impl TranslateBackend for MockBackend {
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateReply, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(request.clone());

        if self.fail_when.is_some_and(|predicate| predicate(&request)) {
            return Err(ProviderError::ApiError {
                status_code: 503,
                message: format!("Simulated failure for request #{}", count + 1),
            });
        }

        match &self.behavior {
            MockBehavior::Working => Ok(TranslateReply::Translations(self.translate_sentences(&request))),

            MockBehavior::FailTimes { times } => {
                if count < *times {
                    Err(ProviderError::ApiError {
                        status_code: 429,
                        message: format!("Simulated rate limit (request #{})", count + 1),
                    })
                } else {
                    Ok(TranslateReply::Translations(self.translate_sentences(&request)))
                }
            }

            MockBehavior::Failing => Err(ProviderError::RequestFailed(
                "Simulated backend failure".to_string(),
            )),

            MockBehavior::ErrorMessage(message) => Ok(TranslateReply::ErrorMessage(message.clone())),

            MockBehavior::Redirect(location) => Ok(TranslateReply::Redirect {
                location: location.clone(),
            }),

            MockBehavior::Truncated => {
                let mut translations = self.translate_sentences(&request);
                translations.pop();
                Ok(TranslateReply::Translations(translations))
            }
        }
    }
}
