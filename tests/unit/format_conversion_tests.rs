/*!
 * Tests for converting other caption formats to SRT
 */

use aisub::format_conversion::{convert_to_canonical, PLAIN_TEXT_CUE_MS};
use aisub::subtitle_processor::{is_valid_format, parse_srt_string, TimeRange};
use crate::common;

#[test]
fn test_convert_withCanonicalInput_shouldBeIdempotent() {
    let input = common::numbered_srt(15);
    let once = convert_to_canonical(&input).unwrap();
    let twice = convert_to_canonical(&once).unwrap();
    assert_eq!(parse_srt_string(&once), parse_srt_string(&input));
    assert_eq!(once, twice);
}

#[test]
fn test_convert_everyRule_shouldProduceValidSrt() {
    let inputs = [
        "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\nHello\n",
        "[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\nDialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hello\n",
        "00:00:01,000 --> 00:00:02,000\nHello\n",
        "Hello\nWorld\n",
    ];
    for input in inputs {
        let converted = convert_to_canonical(input).unwrap();
        assert!(is_valid_format(&converted), "not canonical: {:?}", converted);
    }
}

#[test]
fn test_convert_withShortVttTimestamps_shouldExpandHours() {
    let vtt = "WEBVTT\n\n01:05.250 --> 01:06.000\nShort form\n";
    let entries = parse_srt_string(&convert_to_canonical(vtt).unwrap());
    assert_eq!(entries[0].time_range, TimeRange::new(65_250, 66_000));
}

#[test]
fn test_convert_withAssWithoutFormatLine_shouldUseDefaultFields() {
    let ass = "[Events]\nDialogue: 0,0:01:00.50,0:01:02.00,Default,,0,0,0,,Line one\\NLine two\n";
    let entries = parse_srt_string(&convert_to_canonical(ass).unwrap());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].time_range, TimeRange::new(60_500, 62_000));
    assert_eq!(entries[0].content, "Line one\nLine two");
}

#[test]
fn test_convert_withPlainText_shouldLayCuesEndToEnd() {
    let entries = parse_srt_string(&convert_to_canonical("a\nb\nc\n").unwrap());
    let ends: Vec<u64> = entries.iter().map(|e| e.time_range.end_ms).collect();
    assert_eq!(ends, vec![PLAIN_TEXT_CUE_MS, 2 * PLAIN_TEXT_CUE_MS, 3 * PLAIN_TEXT_CUE_MS]);
    assert_eq!(entries.iter().map(|e| e.pos).collect::<Vec<_>>(), vec![1, 2, 3]);
}
