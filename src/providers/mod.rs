/*!
 * Translation backends.
 *
 * The translate capability is an external collaborator. This module defines the
 * request and reply shapes it works with, and contains:
 * - `http`: client for the web translation endpoints
 * - `mock`: scripted backend for tests and dry runs
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;

use crate::errors::ProviderError;

/// Which translation endpoint handles a request
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// LLM-backed endpoint, honours API key, prompt template and base host
    #[default]
    Primary,
    /// Alternate machine translation endpoint
    Google,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Google => write!(f, "google"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "primary" | "openai" => Ok(Self::Primary),
            "google" => Ok(Self::Google),
            _ => Err(anyhow::anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Body of one translation request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    /// Target language code
    pub target_lang: String,

    /// Sentences to translate, in cue order
    pub sentences: Vec<String>,

    /// User supplied API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// User supplied prompt template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,

    /// User supplied host for the upstream model API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_host: Option<String>,

    /// Endpoint selector, not part of the body
    #[serde(skip)]
    pub provider: ProviderKind,
}

/// The three outcomes a backend can report
#[derive(Debug, Clone, PartialEq)]
pub enum TranslateReply {
    /// Translated sentences, aligned with the request
    Translations(Vec<String>),

    /// The backend rejected the request with a message
    ErrorMessage(String),

    /// The backend answered with a redirect
    Redirect {
        /// Target of the redirect
        location: String,
    },
}

/// Common trait for all translation backends
///
/// Implementations perform exactly one round trip per call; retrying is the
/// orchestrator's job.
#[async_trait]
pub trait TranslateBackend: Send + Sync + Debug {
    /// Send one batch of sentences
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateReply, ProviderError>;
}

pub mod http;
pub mod mock;
