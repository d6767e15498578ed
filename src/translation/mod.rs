/*!
 * Subtitle translation through a remote backend.
 *
 * - `batch`: splitting documents into page-sized batches
 * - `core`: one request per batch, reply interpretation
 * - `orchestrator`: sequential whole-document runs with bounded retry
 */

pub use self::batch::{page_count, partition, select_page};
pub use self::core::TranslationService;
pub use self::orchestrator::{
    BatchListener, CancellationToken, DocumentTranslator, NoDelay, NoopListener, RetryPolicy,
    RunState, Sleeper, TokioSleeper, TranslateFileStatus,
};

pub mod batch;
pub mod core;
pub mod orchestrator;
