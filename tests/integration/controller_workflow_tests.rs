/*!
 * Integration tests for the load, translate and export workflow
 */

use std::fs;
use std::sync::Arc;

use aisub::app_config::Config;
use aisub::app_controller::{Controller, ExportFlavor, RunRequest};
use aisub::credentials::ConfigCredentials;
use aisub::file_utils::DirectorySink;
use aisub::providers::mock::MockBackend;
use aisub::providers::TranslateRequest;
use aisub::subtitle_processor::parse_srt_string;
use aisub::translation::{NoDelay, TranslationService};
use crate::common;

fn controller(backend: &MockBackend) -> Controller {
    let service = TranslationService::new(Arc::new(backend.clone()));
    Controller::new(Config::default(), service, Arc::new(ConfigCredentials::default()))
        .with_sleeper(Arc::new(NoDelay))
}

fn mentions_line_15(request: &TranslateRequest) -> bool {
    request.sentences.iter().any(|s| s == "Line 15")
}

#[test]
fn test_loadBytes_shouldResetPageAndBuffer() {
    let backend = MockBackend::working();
    let mut controller = controller(&backend);

    controller.load_bytes("long.srt", common::numbered_srt(25).as_bytes()).unwrap();
    assert!(controller.view_mut().go_to(2));
    assert_eq!(controller.current_entries().len(), 5);

    let count = controller.load_bytes("short.srt", common::HI_BYE_SRT.as_bytes()).unwrap();
    assert_eq!(count, 2);
    assert_eq!(controller.file_name(), Some("short.srt"));
    assert_eq!(controller.view().current_page(), 0);
    assert_eq!(controller.view().label(), "1 / 1");
    assert!(controller.translated().is_empty());
}

#[test]
fn test_loadBytes_withUnsupportedText_shouldKeepPreviousDocument() {
    let backend = MockBackend::working();
    let mut controller = controller(&backend);
    controller.load_bytes("a.srt", common::HI_BYE_SRT.as_bytes()).unwrap();

    let err = controller.load_bytes("b.srt", b"00:00 --> nonsense\n").unwrap_err();
    assert!(format!("{:#}", err).contains("Cannot convert to a valid SRT file"));
    assert_eq!(controller.file_name(), Some("a.srt"));
    assert_eq!(controller.entries().len(), 2);
}

#[tokio::test]
async fn test_translateCurrentPage_shouldFillOnlyThatPage() {
    let backend = MockBackend::working();
    let mut controller = controller(&backend);
    controller.load_bytes("long.srt", common::numbered_srt(25).as_bytes()).unwrap();
    controller.view_mut().go_to(1);

    let translated = controller.translate_current_page().await.unwrap();
    assert_eq!(translated.len(), 10);
    assert_eq!(translated[0].pos, 11);
    assert!(controller.translated().page(0).is_empty());
    assert_eq!(controller.translated().page(1), translated);
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn test_translateFile_withFailure_shouldKeepStreamedBatches() {
    common::init_logging();
    let backend = MockBackend::working().with_failure_when(mentions_line_15);
    let mut controller = controller(&backend);
    controller.load_bytes("long.srt", common::numbered_srt(25).as_bytes()).unwrap();

    let err = controller.translate_file().await.unwrap_err();
    assert!(err.to_string().contains("translate file failed"));

    let status = controller.status();
    assert!(!status.is_translating);
    assert_eq!(status.trans_count, 1);
    assert_eq!(controller.translated().translated_count(), 10);
    assert_eq!(parse_srt_string(&controller.render(ExportFlavor::Translated).unwrap()).len(), 10);
}

#[tokio::test]
async fn test_export_shouldWriteAllFlavorsWithDefaultNames() {
    let backend = MockBackend::working().with_custom_response(common::hi_bye_to_chinese);
    let mut controller = controller(&backend);
    controller.load_bytes("hi.srt", common::HI_BYE_SRT.as_bytes()).unwrap();
    controller.translate_file().await.unwrap();

    let dir = common::create_temp_dir().unwrap();
    let sink = DirectorySink::new(dir.path());
    for flavor in [ExportFlavor::Original, ExportFlavor::Translated, ExportFlavor::Bilingual] {
        controller.export(flavor, &sink).unwrap();
    }

    assert_eq!(fs::read_to_string(dir.path().join("original.srt")).unwrap(), common::HI_BYE_SRT);
    assert_eq!(
        fs::read_to_string(dir.path().join("translated.srt")).unwrap(),
        "1\n00:00:01,000 --> 00:00:02,000\n嗨\n\n2\n00:00:03,000 --> 00:00:04,000\n再见\n\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("translated_bilingual.srt")).unwrap(),
        "1\n00:00:01,000 --> 00:00:02,000\nHi\n嗨\n\n2\n00:00:03,000 --> 00:00:04,000\nBye\n再见\n\n"
    );
}

#[tokio::test]
async fn test_run_withSinglePage_shouldWriteTranslatedFile() {
    let backend = MockBackend::working();
    let mut controller = controller(&backend);
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(dir.path(), "movie.srt", &common::numbered_srt(25)).unwrap();
    let out = dir.path().join("out");

    let request = RunRequest { page: Some(2), bilingual: true, force_overwrite: false };
    let written = controller.run(&input, &out, &request).await.unwrap();
    assert_eq!(written.len(), 2);

    let translated = parse_srt_string(&fs::read_to_string(out.join("translated.srt")).unwrap());
    assert_eq!(translated.len(), 5);
    assert_eq!(translated[0].content, "[zh] Line 21");

    // Existing output is left alone without --force-overwrite
    let written = controller.run(&input, &out, &request).await.unwrap();
    assert!(written.is_empty());
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn test_runFolder_shouldTranslateEachFileIntoItsOwnDirectory() {
    let backend = MockBackend::working();
    let mut controller = controller(&backend);
    let dir = common::create_temp_dir().unwrap();
    let input_dir = dir.path().join("subs");
    fs::create_dir_all(&input_dir).unwrap();
    common::create_test_file(&input_dir, "a.srt", common::HI_BYE_SRT).unwrap();
    common::create_test_file(&input_dir, "b.vtt", "WEBVTT\n\n00:01.000 --> 00:02.000\nHello\n").unwrap();
    common::create_test_file(&input_dir, "c.srt", "\u{0}\u{1}").unwrap();
    let out = dir.path().join("out");

    let written = controller
        .run_folder(&input_dir, &out, &RunRequest::default())
        .await
        .unwrap();

    assert_eq!(written.len(), 2);
    assert!(out.join("a").join("translated.srt").exists());
    assert!(out.join("b").join("translated.srt").exists());
    assert!(!out.join("c").exists());
}
