/*!
 * Tests for the SRT data model and codec
 */

use aisub::errors::SubtitleError;
use aisub::subtitle_processor::{
    merge_bilingual, parse_srt_string, to_srt_string, SubtitleCollection, SubtitleEntry, TimeRange,
};
use crate::common;

#[test]
fn test_roundTrip_withSeveralDocuments_shouldReparseToSameEntries() {
    let documents = [
        common::HI_BYE_SRT.to_string(),
        common::numbered_srt(37),
        "7\n01:02:03,004 --> 01:02:05,000\nfirst line\nsecond line\n\n3\n00:00:00,000 --> 00:00:00,001\n<i>tag</i>\n\n".to_string(),
    ];

    for document in &documents {
        let parsed = parse_srt_string(document);
        let reparsed = parse_srt_string(&to_srt_string(&parsed));
        assert_eq!(parsed, reparsed);
    }
}

#[test]
fn test_parse_withCanonicalText_shouldMatchEntries() {
    assert_eq!(parse_srt_string(&common::numbered_srt(12)), common::numbered_entries(12));
}

#[test]
fn test_time_range_display_shouldUseCommaMillis() {
    let range = TimeRange::new(3_723_004, 3_725_000);
    assert_eq!(range.to_string(), "01:02:03,004 --> 01:02:05,000");
    assert_eq!("01:02:03,004 --> 01:02:05,000".parse::<TimeRange>().unwrap(), range);
}

#[test]
fn test_entry_display_shouldEndWithBlankLine() {
    let entry = SubtitleEntry::new(4, TimeRange::new(0, 1000), "a\nb");
    assert_eq!(entry.to_string(), "4\n00:00:00,000 --> 00:00:01,000\na\nb\n\n");
}

#[test]
fn test_mergeBilingual_shouldFollowPositionMatches() {
    let original = vec![SubtitleEntry::new(1, TimeRange::new(0, 1), "A")];
    let translated = vec![SubtitleEntry::new(1, TimeRange::new(0, 1), "B")];
    assert_eq!(merge_bilingual(&translated, &original)[0].content, "A\nB");

    let duplicated = vec![
        SubtitleEntry::new(1, TimeRange::new(0, 1), "A"),
        SubtitleEntry::new(1, TimeRange::new(2, 3), "A2"),
    ];
    assert_eq!(merge_bilingual(&translated, &duplicated)[0].content, "B");
    assert_eq!(merge_bilingual(&translated, &[])[0].content, "B");
}

#[test]
fn test_collection_fromText_withWebVtt_shouldConvert() {
    let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHi\n\n00:00:03.000 --> 00:00:04.000\nBye\n";
    let collection = SubtitleCollection::from_text("clip.vtt", vtt).unwrap();
    assert_eq!(collection.to_srt_string(), common::HI_BYE_SRT);
}

#[test]
fn test_collection_fromBytes_shouldEnforceLimitAndEncoding() {
    let srt = common::HI_BYE_SRT.as_bytes();
    assert_eq!(
        SubtitleCollection::from_bytes("a.srt", srt, 10).unwrap_err(),
        SubtitleError::FileTooLarge { size: srt.len() as u64, limit: 10 }
    );
    assert_eq!(
        SubtitleCollection::from_bytes("a.bin", &[0x00, 0x9f, 0x92, 0x96], 1024).unwrap_err(),
        SubtitleError::NotText
    );
    assert_eq!(
        SubtitleCollection::from_bytes("a.srt", b"1\n00:00:01,000 --> garbage\n", 1024).unwrap_err(),
        SubtitleError::UnsupportedFormat
    );
}

#[test]
fn test_collection_display_shouldSummarize() {
    let collection = SubtitleCollection::from_text("a.srt", common::HI_BYE_SRT).unwrap();
    let summary = collection.to_string();
    assert!(summary.contains("Source: a.srt"));
    assert!(summary.contains("Entries: 2"));
}
