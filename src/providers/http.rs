use std::time::Duration;
use reqwest::{header, redirect, Client, StatusCode};
use serde_json::Value;
use async_trait::async_trait;
use log::{debug, error};
use url::Url;

use crate::errors::ProviderError;
use super::{ProviderKind, TranslateBackend, TranslateReply, TranslateRequest};

/// Client for the web translation endpoints
#[derive(Debug)]
pub struct HttpBackend {
    /// HTTP client for API requests, redirects disabled
    client: Client,
    /// Base URL the `/api/...` routes hang off
    endpoint: Url,
}

impl HttpBackend {
    /// Create a new client for the given base URL
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ProviderError::ConnectionError(format!("Invalid endpoint {}: {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            // Redirects are reported to the caller, never followed
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// Route for the selected provider
    pub fn route(&self, provider: ProviderKind) -> Result<Url, ProviderError> {
        let path = match provider {
            ProviderKind::Primary => "api/translate",
            ProviderKind::Google => "api/googleTran",
        };
        let mut base = self.endpoint.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))
    }
}

#[async_trait]
impl TranslateBackend for HttpBackend {
    async fn translate(&self, request: TranslateRequest) -> Result<TranslateReply, ProviderError> {
        let url = self.route(request.provider)?;
        debug!("POST {} with {} sentences", url, request.sentences.len());

        let response = self.client.post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_redirection() {
            let location = response.headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            return Ok(TranslateReply::Redirect { location });
        }

        let body = response.text().await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read response body: {}", e)))?;

        parse_reply_body(status, &body)
    }
}

/// Interpret a response body from the translate endpoints.
///
/// Accepts a bare array of strings, `{"translations": [...]}` or
/// `{"errorMessage": "..."}`. An error message wins over the status code.
pub fn parse_reply_body(status: StatusCode, body: &str) -> Result<TranslateReply, ProviderError> {
    let value: Option<Value> = serde_json::from_str(body).ok();

    if let Some(message) = value.as_ref()
        .and_then(|v| v.get("errorMessage"))
        .and_then(Value::as_str)
    {
        return Ok(TranslateReply::ErrorMessage(message.to_string()));
    }

    if !status.is_success() {
        error!("Translate API error ({}): {}", status, body);
        return Err(ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body.to_string(),
        });
    }

    let translations = match value {
        Some(Value::Array(items)) => items,
        Some(Value::Object(mut map)) => match map.remove("translations") {
            Some(Value::Array(items)) => items,
            _ => return Err(ProviderError::ParseError("missing translations field".to_string())),
        },
        _ => return Err(ProviderError::ParseError(format!("unexpected body: {}", body))),
    };

    translations
        .into_iter()
        .map(|item| match item {
            Value::String(text) => Ok(text),
            other => Err(ProviderError::ParseError(format!("expected a string, got {}", other))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(TranslateReply::Translations)
}
