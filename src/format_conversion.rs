/*!
 * Best-effort conversion of non-SRT subtitle text into canonical SRT.
 *
 * Rules are tried in order and the first one that yields at least one cue wins:
 *
 * 1. Canonical SRT, re-serialized as is
 * 2. WebVTT (`WEBVTT` header, `.` millisecond separator, optional cue ids)
 * 3. ASS/SSA (`[Events]` section with `Dialogue:` lines)
 * 4. Loose SRT (timing lines present but indices missing or timestamps sloppy)
 * 5. Plain text without any timing: one synthetic cue per non-empty line,
 *    each lasting `PLAIN_TEXT_CUE_MS`, laid end to end from zero
 *
 * Anything else is reported as unsupported by returning `None`.
 */

use regex::Regex;
use once_cell::sync::Lazy;
use log::debug;

use crate::subtitle_processor::{
    is_valid_format, normalize_text, parse_srt_string, split_blocks, to_srt_string, SubtitleEntry,
    TimeRange,
};

/// Duration of each synthetic cue built from plain text
pub const PLAIN_TEXT_CUE_MS: u64 = 3_000;

// @const: Sloppy timestamp: any hour width, 1-2 digit minutes/seconds, `,` `.` or `:` before millis
static LOOSE_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{1,2}):(\d{1,2})(?:[,.:](\d{1,3}))?$").unwrap()
});

// @const: ASS override blocks such as {\i1} or {\pos(10,20)}
static ASS_OVERRIDE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

/// Default ASS v4+ event format, used when the file omits its `Format:` line
const DEFAULT_ASS_FORMAT: [&str; 10] = [
    "layer", "start", "end", "style", "name", "marginl", "marginr", "marginv", "effect", "text",
];

/// Convert subtitle text to canonical SRT, or `None` when no rule applies
pub fn convert_to_canonical(text: &str) -> Option<String> {
    if is_valid_format(text) {
        return Some(to_srt_string(&parse_srt_string(text)));
    }

    let normalized = normalize_text(text);
    if normalized.trim().is_empty() || has_control_characters(&normalized) {
        return None;
    }

    let rules: [(&str, fn(&str) -> Option<Vec<SubtitleEntry>>); 4] = [
        ("webvtt", convert_webvtt),
        ("ass", convert_ass),
        ("loose srt", convert_loose_srt),
        ("plain text", convert_plain_text),
    ];

    for (name, rule) in rules {
        if let Some(entries) = rule(&normalized).filter(|entries| !entries.is_empty()) {
            debug!("Converted subtitle text with the {} rule ({} cues)", name, entries.len());
            return Some(to_srt_string(&entries));
        }
    }

    None
}

fn has_control_characters(text: &str) -> bool {
    text.chars().any(|c| c.is_control() && c != '\n' && c != '\t')
}

/// Parse a timestamp in any of the sloppy forms into milliseconds
fn parse_loose_timestamp(value: &str) -> Option<u64> {
    let caps = LOOSE_TIMESTAMP_REGEX.captures(value.trim())?;
    let hours: u64 = caps.get(1).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: u64 = caps.get(3)?.as_str().parse().ok()?;
    // "5" after the separator means 500ms, "05" means 50ms
    let millis: u64 = match caps.get(4) {
        Some(m) => format!("{:0<3}", m.as_str()).parse().ok()?,
        None => 0,
    };
    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    Some((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
}

/// Parse `start --> end [settings]`
fn parse_timing_line(line: &str) -> Option<TimeRange> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some(TimeRange::new(parse_loose_timestamp(start)?, parse_loose_timestamp(end)?))
}

fn numbered(cues: Vec<(TimeRange, String)>) -> Vec<SubtitleEntry> {
    cues.into_iter()
        .enumerate()
        .map(|(idx, (time_range, content))| SubtitleEntry::new(idx + 1, time_range, content))
        .collect()
}

/// Cues from blocks whose timing line is the first or second line
fn timed_blocks(blocks: &[Vec<&str>]) -> Vec<(TimeRange, String)> {
    let mut cues = Vec::new();
    for block in blocks {
        let Some(timing_idx) = block.iter().take(2).position(|line| line.contains("-->")) else {
            continue;
        };
        let Some(time_range) = parse_timing_line(block[timing_idx]) else {
            continue;
        };
        let content = &block[timing_idx + 1..];
        if content.is_empty() {
            continue;
        }
        cues.push((time_range, content.join("\n")));
    }
    cues
}

fn is_webvtt(text: &str) -> bool {
    text.trim_start().starts_with("WEBVTT")
}

fn has_ass_sections(text: &str) -> bool {
    text.lines().map(str::trim).any(|line| {
        line.eq_ignore_ascii_case("[events]") || line.eq_ignore_ascii_case("[script info]")
    })
}

fn convert_webvtt(text: &str) -> Option<Vec<SubtitleEntry>> {
    if !is_webvtt(text) {
        return None;
    }

    let blocks: Vec<Vec<&str>> = split_blocks(text)
        .into_iter()
        .skip(1)
        .filter(|block| {
            let first = block.first().copied().unwrap_or_default();
            !(first.starts_with("NOTE") || first.starts_with("STYLE") || first.starts_with("REGION"))
        })
        .collect();

    Some(numbered(timed_blocks(&blocks)))
}

fn convert_ass(text: &str) -> Option<Vec<SubtitleEntry>> {
    let mut in_events = false;
    let mut format: Vec<String> = DEFAULT_ASS_FORMAT.iter().map(|f| f.to_string()).collect();
    let mut cues = Vec::new();
    let mut saw_events = false;

    for line in text.lines().map(str::trim) {
        if line.starts_with('[') {
            in_events = line.eq_ignore_ascii_case("[events]");
            saw_events |= in_events;
            continue;
        }
        if !in_events {
            continue;
        }
        if let Some(fields) = line.strip_prefix("Format:") {
            format = fields.split(',').map(|f| f.trim().to_lowercase()).collect();
        } else if let Some(fields) = line.strip_prefix("Dialogue:") {
            if let Some(cue) = parse_dialogue(fields, &format) {
                cues.push(cue);
            }
        }
    }

    if !saw_events {
        return None;
    }
    Some(numbered(cues))
}

fn parse_dialogue(fields: &str, format: &[String]) -> Option<(TimeRange, String)> {
    let values: Vec<&str> = fields.splitn(format.len(), ',').collect();

    let start = parse_loose_timestamp(ass_field(format, &values, "start")?)?;
    let end = parse_loose_timestamp(ass_field(format, &values, "end")?)?;
    let raw_text = ass_field(format, &values, "text")?;

    let content = ASS_OVERRIDE_REGEX
        .replace_all(raw_text, "")
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ");
    let content = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if content.is_empty() {
        return None;
    }

    Some((TimeRange::new(start, end), content))
}

fn ass_field<'a>(format: &[String], values: &[&'a str], name: &str) -> Option<&'a str> {
    let idx = format.iter().position(|f| f == name)?;
    values.get(idx).copied()
}

fn convert_loose_srt(text: &str) -> Option<Vec<SubtitleEntry>> {
    if !text.contains("-->") {
        return None;
    }
    Some(numbered(timed_blocks(&split_blocks(text))))
}

fn convert_plain_text(text: &str) -> Option<Vec<SubtitleEntry>> {
    if text.contains("-->") || is_webvtt(text) || has_ass_sections(text) {
        return None;
    }

    let cues = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(idx, line)| {
            let start = idx as u64 * PLAIN_TEXT_CUE_MS;
            (TimeRange::new(start, start + PLAIN_TEXT_CUE_MS), line.to_string())
        })
        .collect();

    Some(numbered(cues))
}
