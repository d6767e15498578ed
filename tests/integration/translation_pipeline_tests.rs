/*!
 * Integration tests for whole-document translation runs
 */

use std::sync::Arc;

use aisub::credentials::ConfigCredentials;
use aisub::errors::TranslationError;
use aisub::providers::mock::MockBackend;
use aisub::providers::TranslateRequest;
use aisub::subtitle_processor::{parse_srt_string, to_srt_string, SubtitleEntry};
use aisub::translation::{DocumentTranslator, NoDelay, NoopListener, RunState, TranslationService};
use crate::common;

fn translator(backend: &MockBackend, page_size: usize) -> DocumentTranslator {
    DocumentTranslator::new(TranslationService::new(Arc::new(backend.clone())))
        .with_page_size(page_size)
        .with_sleeper(Arc::new(NoDelay))
}

fn mentions_line_25(request: &TranslateRequest) -> bool {
    request.sentences.iter().any(|s| s == "Line 25")
}

#[tokio::test]
async fn test_endToEnd_withHiBye_shouldReplaceContentOnly() {
    common::init_logging();
    let backend = MockBackend::working().with_custom_response(common::hi_bye_to_chinese);
    let translator = translator(&backend, 1);
    let entries = parse_srt_string(common::HI_BYE_SRT);

    let mut batches = Vec::new();
    let mut listener = |idx: usize, batch: &[SubtitleEntry]| batches.push((idx, batch.len()));
    let translated = translator
        .translate_document(&entries, "zh", &ConfigCredentials::default(), &mut listener)
        .await
        .unwrap();

    assert_eq!(batches, vec![(0, 1), (1, 1)]);
    assert_eq!(backend.request_count(), 2);
    assert_eq!(
        to_srt_string(&translated),
        "1\n00:00:01,000 --> 00:00:02,000\n嗨\n\n2\n00:00:03,000 --> 00:00:04,000\n再见\n\n"
    );
}

#[tokio::test]
async fn test_retryCeiling_shouldSucceedOnlyBelowFiveFailures() {
    common::init_logging();
    let entries = common::numbered_entries(4);

    for failures in 0..5 {
        let backend = MockBackend::fail_times(failures);
        let result = translator(&backend, 10)
            .translate_document(&entries, "fr", &ConfigCredentials::default(), &mut NoopListener)
            .await;
        assert!(result.is_ok(), "k = {}", failures);
        assert_eq!(backend.request_count(), failures + 1);
    }

    let backend = MockBackend::fail_times(5);
    let result = translator(&backend, 10)
        .translate_document(&entries, "fr", &ConfigCredentials::default(), &mut NoopListener)
        .await;
    assert!(result.is_err());
    assert_eq!(backend.request_count(), 5);
}

#[tokio::test]
async fn test_failFast_withThirdBatchFailing_shouldStreamOnlyEarlierBatches() {
    common::init_logging();
    let entries = common::numbered_entries(40);
    let backend = MockBackend::working().with_failure_when(mentions_line_25);
    let translator = translator(&backend, 10);

    let mut done = Vec::new();
    let mut listener = |idx: usize, _batch: &[SubtitleEntry]| done.push(idx);
    let err = translator
        .translate_document(&entries, "de", &ConfigCredentials::default(), &mut listener)
        .await
        .unwrap_err();

    assert_eq!(done, vec![0, 1]);
    assert_eq!(backend.request_count(), 2 + 5);
    assert_eq!(translator.state(), RunState::Aborted { batch_index: 2 });
    assert_eq!(translator.status().trans_count, 2);
    match err {
        TranslationError::Document { batch_index, batch_content, .. } => {
            assert_eq!(batch_index, 2);
            assert!(batch_content.contains("Line 25"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_trailingComma_shouldBeStrippedFromLastSentenceOfEachBatch() {
    let backend = MockBackend::working();
    let translator = translator(&backend, 2);
    let mut entries = common::numbered_entries(4);
    entries[1].content = "hello,".to_string();
    entries[2].content = "wait,".to_string();
    entries[3].content = "hello".to_string();

    translator
        .translate_document(&entries, "fr", &ConfigCredentials::default(), &mut NoopListener)
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests[0].sentences, vec!["Line 1".to_string(), "hello".to_string()]);
    assert_eq!(requests[1].sentences, vec!["wait,".to_string(), "hello".to_string()]);
}

#[tokio::test]
async fn test_credentials_shouldBeSentWithEveryBatch() {
    let backend = MockBackend::working();
    let translator = translator(&backend, 1);
    let credentials = ConfigCredentials::default()
        .with_api_key("sk-user")
        .with_prompt_template("Translate into {{lang}}");

    translator
        .translate_document(&common::numbered_entries(3), "ko", &credentials, &mut NoopListener)
        .await
        .unwrap();

    for request in backend.requests() {
        assert_eq!(request.target_lang, "ko");
        assert_eq!(request.api_key.as_deref(), Some("sk-user"));
        assert_eq!(request.prompt_template.as_deref(), Some("Translate into {{lang}}"));
        assert_eq!(request.base_host, None);
    }
}

#[tokio::test]
async fn test_emptyDocument_shouldCompleteWithoutRequests() {
    let backend = MockBackend::working();
    let translator = translator(&backend, 10);
    let translated = translator
        .translate_document(&[], "fr", &ConfigCredentials::default(), &mut NoopListener)
        .await
        .unwrap();
    assert!(translated.is_empty());
    assert_eq!(backend.request_count(), 0);
    assert_eq!(translator.state(), RunState::Completed);
}
