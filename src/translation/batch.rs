/*!
 * Splitting a document into fixed-size batches.
 *
 * A batch is also a page: the same size drives both the translation requests
 * and the page view, so batch `i` always covers entries `i*size .. (i+1)*size`.
 */

use crate::subtitle_processor::SubtitleEntry;

/// Split entries into consecutive batches of `page_size`.
///
/// Every batch but the last holds exactly `page_size` entries. A size of zero
/// puts everything into a single batch.
pub fn partition(entries: &[SubtitleEntry], page_size: usize) -> Vec<&[SubtitleEntry]> {
    if entries.is_empty() {
        return Vec::new();
    }
    if page_size == 0 {
        return vec![entries];
    }
    entries.chunks(page_size).collect()
}

/// Entries of the page at `page_index`, empty when the page lies past the data
pub fn select_page(entries: &[SubtitleEntry], page_index: usize, page_size: usize) -> &[SubtitleEntry] {
    if page_size == 0 {
        return if page_index == 0 { entries } else { &[] };
    }
    let start = page_index.saturating_mul(page_size);
    if start >= entries.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(entries.len());
    &entries[start..end]
}

/// Number of batches `partition` yields for `total` entries
pub fn page_count(total: usize, page_size: usize) -> usize {
    match (total, page_size) {
        (0, _) => 0,
        (_, 0) => 1,
        _ => total.div_ceil(page_size),
    }
}
