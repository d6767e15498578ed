/*!
 * # aisub - batched subtitle translation
 *
 * A Rust library for translating subtitle files through a remote translate
 * service, one page-sized batch at a time.
 *
 * ## Features
 *
 * - Parse and serialize SRT, keeping cue numbers and timing untouched
 * - Convert WebVTT, ASS/SSA, sloppy SRT and plain text to SRT
 * - Translate the page on screen or the whole file, with bounded retry
 * - Stream finished batches to the caller while a run is in progress
 * - Export original, translated and bilingual SRT
 *
 * ## Architecture
 *
 * - `subtitle_processor`: SRT data model and codec
 * - `format_conversion`: conversion of other caption formats
 * - `translation`: batching, single-batch requests and whole-document runs
 * - `pagination`: page navigation and the translated-entry buffer
 * - `providers`: translate backends (HTTP and scripted)
 * - `credentials`: per-user request settings
 * - `app_config`: configuration file handling
 * - `app_controller`: one loaded document and the operations on it
 * - `file_utils`: file system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod credentials;
pub mod errors;
pub mod file_utils;
pub mod format_conversion;
pub mod language_utils;
pub mod pagination;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, ExportFlavor};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry, TimeRange};
