/*!
 * Whole-document translation.
 *
 * `DocumentTranslator` walks the batches of a document strictly in order and
 * retries each one a bounded number of times with a fixed cooldown. Progress is
 * exposed as a `RunState` and a `TranslateFileStatus`, and every finished batch
 * is handed to a `BatchListener` before the next one starts.
 */

use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::app_config::BatchConfig;
use crate::credentials::CredentialStore;
use crate::errors::TranslationError;
use crate::subtitle_processor::SubtitleEntry;

use super::batch::partition;
use super::core::TranslationService;

/// Bounded retry with a fixed cooldown between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per batch, including the first one
    pub max_attempts: u32,

    /// Wait after a failed attempt before the next one
    pub cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            cooldown: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            cooldown: Duration::from_millis(config.retry_cooldown_ms),
        }
    }
}

/// Delay strategy used between attempts
#[async_trait]
pub trait Sleeper: Send + Sync + Debug {
    async fn sleep(&self, duration: Duration);
}

/// Real delay on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately, for tests and dry runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Sleeper for NoDelay {
    async fn sleep(&self, _duration: Duration) {}
}

/// Receives each batch as soon as it is translated
pub trait BatchListener: Send {
    fn on_batch_done(&mut self, batch_index: usize, batch: &[SubtitleEntry]);
}

impl<F> BatchListener for F
where
    F: FnMut(usize, &[SubtitleEntry]) + Send,
{
    fn on_batch_done(&mut self, batch_index: usize, batch: &[SubtitleEntry]) {
        (*self)(batch_index, batch)
    }
}

/// Listener that ignores every batch
#[derive(Debug, Default)]
pub struct NoopListener;

impl BatchListener for NoopListener {
    fn on_batch_done(&mut self, _batch_index: usize, _batch: &[SubtitleEntry]) {}
}

/// Shared stop flag, checked before every attempt
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where a document run currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running {
        batch_index: usize,
        attempt: u32,
    },
    /// Cooling down after `attempt` failed
    Retrying {
        batch_index: usize,
        attempt: u32,
    },
    Aborted {
        batch_index: usize,
    },
    Completed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Aborted { .. } | Self::Completed)
    }
}

/// Progress of a whole-file run, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TranslateFileStatus {
    pub is_translating: bool,
    /// Batches finished so far
    pub trans_count: usize,
}

#[derive(Debug, Default)]
struct RunProgress {
    state: RunState,
    status: TranslateFileStatus,
}

/// Sequential, retrying translator for whole documents
#[derive(Debug)]
pub struct DocumentTranslator {
    service: TranslationService,
    policy: RetryPolicy,
    page_size: usize,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancellationToken,
    progress: Mutex<RunProgress>,
}

impl DocumentTranslator {
    /// Create a translator with the default policy, page size 10 and real delays
    pub fn new(service: TranslationService) -> Self {
        Self {
            service,
            policy: RetryPolicy::default(),
            page_size: 10,
            sleeper: Arc::new(TokioSleeper),
            cancel: CancellationToken::new(),
            progress: Mutex::new(RunProgress::default()),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        self.progress().state.clone()
    }

    pub fn status(&self) -> TranslateFileStatus {
        self.progress().status
    }

    fn progress(&self) -> std::sync::MutexGuard<'_, RunProgress> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: RunState) {
        let mut progress = self.progress();
        progress.status.is_translating = !state.is_terminal() && state != RunState::Idle;
        progress.state = state;
    }

    /// Translate a whole document, batch by batch.
    ///
    /// Returns every translated entry in order, or the first batch failure
    /// wrapped in `TranslationError::Document`. Batches finished before a
    /// failure have already reached the listener.
    pub async fn translate_document(
        &self,
        entries: &[SubtitleEntry],
        target_lang: &str,
        credentials: &dyn CredentialStore,
        listener: &mut dyn BatchListener,
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        let batches = partition(entries, self.page_size);
        info!("Translating {} entries in {} batches", entries.len(), batches.len());

        self.progress().status = TranslateFileStatus {
            is_translating: true,
            trans_count: 0,
        };

        let mut translated = Vec::with_capacity(entries.len());
        for (batch_index, batch) in batches.iter().enumerate() {
            match self.translate_with_retry(batch_index, batch, target_lang, credentials).await {
                Ok(result) => {
                    let start = translated.len();
                    translated.extend(result);
                    listener.on_batch_done(batch_index, &translated[start..]);
                    self.progress().status.trans_count = batch_index + 1;
                    debug!("Translated {} of {}", translated.len(), entries.len());
                }
                Err(source) => {
                    self.set_state(RunState::Aborted { batch_index });
                    let batch_content = batch
                        .iter()
                        .map(|entry| entry.content.as_str())
                        .collect::<Vec<_>>()
                        .join(" | ");
                    error!("Translate file failed at batch {}: {}", batch_index, source);
                    return Err(TranslationError::Document {
                        batch_index,
                        batch_content,
                        source: Box::new(source),
                    });
                }
            }
        }

        self.set_state(RunState::Completed);
        info!("Translated {} entries", translated.len());
        Ok(translated)
    }

    async fn translate_with_retry(
        &self,
        batch_index: usize,
        batch: &[SubtitleEntry],
        target_lang: &str,
        credentials: &dyn CredentialStore,
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        let mut attempt = 1;
        loop {
            if self.cancel.is_cancelled() {
                return Err(TranslationError::Cancelled);
            }
            self.set_state(RunState::Running { batch_index, attempt });

            let err = match self.service.translate_batch(batch, target_lang, credentials).await {
                Ok(result) => return Ok(result),
                Err(err) => err,
            };
            if !err.is_retryable() || attempt >= self.policy.max_attempts {
                return Err(err);
            }

            warn!(
                "Batch {} attempt {}/{} failed: {}",
                batch_index, attempt, self.policy.max_attempts, err
            );
            self.set_state(RunState::Retrying { batch_index, attempt });
            self.sleeper.sleep(self.policy.cooldown).await;
            attempt += 1;
        }
    }
}
