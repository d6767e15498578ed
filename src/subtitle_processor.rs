use std::fmt;
use std::str::FromStr;
use regex::Regex;
use once_cell::sync::Lazy;
use log::{debug, warn};

use crate::errors::SubtitleError;
use crate::format_conversion;

// @module: Caption records and the canonical SRT codec

// @const: SRT time range line, optional trailing cue settings are ignored
static TIME_RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):([0-5]\d):([0-5]\d),(\d{3})\s*-->\s*(\d+):([0-5]\d):([0-5]\d),(\d{3})(?:\s.*)?$").unwrap()
});

/// Start and end of a cue, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl TimeRange {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        TimeRange { start_ms, end_ms }
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    fn millis_from_captures(caps: &regex::Captures, start_idx: usize) -> Option<u64> {
        let field = |offset: usize| -> Option<u64> {
            caps.get(start_idx + offset)?.as_str().parse().ok()
        };
        let hours = field(0)?;
        let minutes = field(1)?;
        let seconds = field(2)?;
        let millis = field(3)?;

        Some((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms)
        )
    }
}

impl FromStr for TimeRange {
    type Err = SubtitleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let caps = TIME_RANGE_REGEX
            .captures(line.trim())
            .ok_or(SubtitleError::UnsupportedFormat)?;
        match (
            Self::millis_from_captures(&caps, 1),
            Self::millis_from_captures(&caps, 5),
        ) {
            (Some(start_ms), Some(end_ms)) => Ok(TimeRange { start_ms, end_ms }),
            _ => Err(SubtitleError::UnsupportedFormat),
        }
    }
}

/// One subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    /// Sequence number as written in the source file
    pub pos: usize,

    /// Time range of the cue
    pub time_range: TimeRange,

    /// Caption text, lines joined with `\n`
    pub content: String,
}

impl SubtitleEntry {
    pub fn new(pos: usize, time_range: TimeRange, content: impl Into<String>) -> Self {
        SubtitleEntry {
            pos,
            time_range,
            content: content.into(),
        }
    }

    /// Build a record with the same position and timing but different text
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        SubtitleEntry {
            pos: self.pos,
            time_range: self.time_range,
            content: content.into(),
        }
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.pos)?;
        writeln!(f, "{}", self.time_range)?;
        writeln!(f, "{}", self.content)?;
        writeln!(f)
    }
}

/// Strip a byte order mark and unify line endings
pub(crate) fn normalize_text(text: &str) -> String {
    text.trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Group lines into blocks separated by blank lines
pub(crate) fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Parse one canonical block: position, time range, one or more content lines
fn parse_block(lines: &[&str]) -> Option<SubtitleEntry> {
    if lines.len() < 3 {
        return None;
    }
    let pos = lines[0].trim().parse::<usize>().ok()?;
    let time_range = lines[1].parse::<TimeRange>().ok()?;

    Some(SubtitleEntry {
        pos,
        time_range,
        content: lines[2..].join("\n"),
    })
}

/// Check whether the text starts with a canonical SRT block.
///
/// This only looks at the first block; use [`parse_srt_string`] to read the
/// whole document.
pub fn is_valid_format(text: &str) -> bool {
    let normalized = normalize_text(text);
    split_blocks(&normalized)
        .first()
        .is_some_and(|block| parse_block(block).is_some())
}

/// Parse canonical SRT text into subtitle entries.
///
/// Blocks that do not match the grammar are skipped. Positions are kept as
/// written, never renumbered.
pub fn parse_srt_string(content: &str) -> Vec<SubtitleEntry> {
    let normalized = normalize_text(content);
    let blocks = split_blocks(&normalized);
    let mut entries = Vec::with_capacity(blocks.len());

    for (block_idx, block) in blocks.iter().enumerate() {
        match parse_block(block) {
            Some(entry) => entries.push(entry),
            None => warn!(
                "Skipping malformed subtitle block {} starting with {:?}",
                block_idx + 1,
                block.first().copied().unwrap_or_default()
            ),
        }
    }

    entries
}

/// Serialize entries back to SRT text
pub fn to_srt_string(entries: &[SubtitleEntry]) -> String {
    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.to_string());
    }
    output
}

/// Put the original text above the translated text for every cue.
///
/// A translated entry is merged only when exactly one original shares its
/// position; otherwise its content is left untouched.
pub fn merge_bilingual(translated: &[SubtitleEntry], original: &[SubtitleEntry]) -> Vec<SubtitleEntry> {
    translated
        .iter()
        .map(|entry| {
            let mut matches = original.iter().filter(|o| o.pos == entry.pos);
            match (matches.next(), matches.next()) {
                (Some(source), None) => {
                    entry.with_content(format!("{}\n{}", source.content, entry.content))
                }
                (None, _) => {
                    debug!("No original cue at position {}, keeping translation only", entry.pos);
                    entry.clone()
                }
                (Some(_), Some(_)) => {
                    warn!("Several original cues share position {}, keeping translation only", entry.pos);
                    entry.clone()
                }
            }
        })
        .collect()
}

/// A decoded subtitle document
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Name of the file the text came from
    pub source_name: String,

    /// Parsed entries in source order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Decode, size-check, convert and parse raw file bytes
    pub fn from_bytes(source_name: impl Into<String>, bytes: &[u8], max_file_size: u64) -> Result<Self, SubtitleError> {
        let size = bytes.len() as u64;
        if size > max_file_size {
            return Err(SubtitleError::FileTooLarge { size, limit: max_file_size });
        }

        let text = decode_text(bytes)?;
        Self::from_text(source_name, &text)
    }

    /// Parse decoded text, converting it to SRT first when needed
    pub fn from_text(source_name: impl Into<String>, text: &str) -> Result<Self, SubtitleError> {
        let entries = if is_valid_format(text) {
            parse_srt_string(text)
        } else {
            let converted = format_conversion::convert_to_canonical(text)
                .ok_or(SubtitleError::UnsupportedFormat)?;
            parse_srt_string(&converted)
        };

        Ok(SubtitleCollection {
            source_name: source_name.into(),
            entries,
        })
    }

    /// Serialize the collection as SRT text
    pub fn to_srt_string(&self) -> String {
        to_srt_string(&self.entries)
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {}", self.source_name)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

/// Decode UTF-8 text, or UTF-16 text carrying a byte order mark
fn decode_text(bytes: &[u8]) -> Result<String, SubtitleError> {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => {
            let text = std::str::from_utf8(bytes).map_err(|_| SubtitleError::NotText)?;
            if text.contains('\0') {
                return Err(SubtitleError::NotText);
            }
            Ok(text.to_string())
        }
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String, SubtitleError> {
    if bytes.len() % 2 != 0 {
        return Err(SubtitleError::NotText);
    }
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|_| SubtitleError::NotText)
}
