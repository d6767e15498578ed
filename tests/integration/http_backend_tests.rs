/*!
 * Integration tests for the HTTP backend against a local fake server
 */

use std::sync::Arc;

use aisub::credentials::ConfigCredentials;
use aisub::errors::{ProviderError, TranslationError};
use aisub::providers::http::HttpBackend;
use aisub::providers::{ProviderKind, TranslateBackend, TranslateReply, TranslateRequest};
use aisub::subtitle_processor::parse_srt_string;
use aisub::translation::TranslationService;
use crate::common;
use crate::common::fake_server::{json_response, redirect_response, FakeServer};

fn request(provider: ProviderKind) -> TranslateRequest {
    TranslateRequest {
        target_lang: "zh".to_string(),
        sentences: vec!["Hi".to_string(), "Bye".to_string()],
        api_key: Some("sk-test".to_string()),
        prompt_template: None,
        base_host: None,
        provider,
    }
}

fn translating_server(path: &str, _body: &str) -> String {
    match path {
        "/api/translate" => json_response("200 OK", r#"["嗨","再见"]"#),
        "/api/googleTran" => json_response("200 OK", r#"{"translations":["你好","拜拜"]}"#),
        _ => json_response("404 Not Found", "{}"),
    }
}

fn redirecting_server(_path: &str, _body: &str) -> String {
    redirect_response("/shop")
}

fn failing_server(_path: &str, _body: &str) -> String {
    json_response("500 Internal Server Error", r#"{"errorMessage":"model overloaded"}"#)
}

fn broken_server(_path: &str, _body: &str) -> String {
    json_response("502 Bad Gateway", "upstream down")
}

#[tokio::test]
async fn test_translate_shouldPostCamelCaseJsonToProviderRoute() {
    common::init_logging();
    let server = FakeServer::start(translating_server).await.unwrap();
    let backend = HttpBackend::new(&server.base_url, 5).unwrap();

    let reply = backend.translate(request(ProviderKind::Primary)).await.unwrap();
    assert_eq!(reply, TranslateReply::Translations(vec!["嗨".to_string(), "再见".to_string()]));

    let reply = backend.translate(request(ProviderKind::Google)).await.unwrap();
    assert_eq!(reply, TranslateReply::Translations(vec!["你好".to_string(), "拜拜".to_string()]));

    let seen = server.requests();
    assert_eq!(seen[0].path, "/api/translate");
    assert_eq!(seen[1].path, "/api/googleTran");
    let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "targetLang": "zh", "sentences": ["Hi", "Bye"], "apiKey": "sk-test" })
    );
}

#[tokio::test]
async fn test_translate_withRedirect_shouldNotFollowIt() {
    let server = FakeServer::start(redirecting_server).await.unwrap();
    let backend = HttpBackend::new(&server.base_url, 5).unwrap();

    let reply = backend.translate(request(ProviderKind::Primary)).await.unwrap();
    assert_eq!(reply, TranslateReply::Redirect { location: "/shop".to_string() });
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_translate_withErrorPayload_shouldSurfaceMessage() {
    let server = FakeServer::start(failing_server).await.unwrap();
    let backend = HttpBackend::new(&server.base_url, 5).unwrap();
    let reply = backend.translate(request(ProviderKind::Primary)).await.unwrap();
    assert_eq!(reply, TranslateReply::ErrorMessage("model overloaded".to_string()));
}

#[tokio::test]
async fn test_translate_withPlainServerError_shouldReturnApiError() {
    let server = FakeServer::start(broken_server).await.unwrap();
    let backend = HttpBackend::new(&server.base_url, 5).unwrap();
    let err = backend.translate(request(ProviderKind::Primary)).await.unwrap_err();
    assert!(matches!(err, ProviderError::ApiError { status_code: 502, .. }));
}

#[tokio::test]
async fn test_service_overHttp_shouldMapRedirectToRateLimit() {
    let server = FakeServer::start(redirecting_server).await.unwrap();
    let service = TranslationService::new(Arc::new(HttpBackend::new(&server.base_url, 5).unwrap()));
    let entries = parse_srt_string(common::HI_BYE_SRT);

    let err = service
        .translate_batch(&entries, "zh", &ConfigCredentials::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TranslationError::RateLimited));
}

#[tokio::test]
async fn test_translate_withUnreachableHost_shouldFailWithRequestError() {
    // Nothing listens on the discard port
    let backend = HttpBackend::new("http://127.0.0.1:9", 2).unwrap();
    let err = backend.translate(request(ProviderKind::Primary)).await.unwrap_err();
    assert!(matches!(err, ProviderError::RequestFailed(_)));
}
