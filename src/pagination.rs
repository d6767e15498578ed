/*!
 * Page navigation and the translated-entry buffer behind it.
 */

use crate::subtitle_processor::SubtitleEntry;
use crate::translation::batch::{page_count, select_page};

/// Which page of a document is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView {
    current_page: usize,
    page_size: usize,
    total: usize,
}

impl PageView {
    pub fn new(total: usize, page_size: usize) -> Self {
        Self {
            current_page: 0,
            page_size,
            total,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Move by `delta` pages. Returns false and stays put when the target
    /// page would start at or past the end of the document.
    pub fn go_to(&mut self, delta: isize) -> bool {
        let Some(target) = self.current_page.checked_add_signed(delta) else {
            return false;
        };
        if target.saturating_mul(self.page_size) >= self.total {
            return false;
        }
        self.current_page = target;
        true
    }

    /// Jump straight to a zero-based page, with the same bounds as `go_to`
    pub fn go_to_page(&mut self, page_index: usize) -> bool {
        let delta = page_index as isize - self.current_page as isize;
        self.go_to(delta)
    }

    pub fn current_entries<'a>(&self, entries: &'a [SubtitleEntry]) -> &'a [SubtitleEntry] {
        select_page(entries, self.current_page, self.page_size)
    }

    pub fn page_count(&self) -> usize {
        page_count(self.total, self.page_size)
    }

    /// One-based position for display, e.g. "1 / 3"
    pub fn label(&self) -> String {
        format!("{} / {}", self.current_page + 1, self.page_count())
    }
}

/// Translated entries stored at the index of their source entry.
///
/// Slots stay empty until the batch covering them has been translated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslatedBuffer {
    slots: Vec<Option<SubtitleEntry>>,
    page_size: usize,
}

impl TranslatedBuffer {
    pub fn new(page_size: usize) -> Self {
        Self {
            slots: Vec::new(),
            page_size,
        }
    }

    /// Write a translated batch starting at `batch_index * page_size`
    pub fn place_batch(&mut self, batch_index: usize, batch: &[SubtitleEntry]) {
        let start = batch_index * self.page_size;
        let end = start + batch.len();
        if self.slots.len() < end {
            self.slots.resize(end, None);
        }
        for (slot, entry) in self.slots[start..end].iter_mut().zip(batch) {
            *slot = Some(entry.clone());
        }
    }

    /// Translated entries of one page, skipping untranslated slots
    pub fn page(&self, page_index: usize) -> Vec<SubtitleEntry> {
        let start = page_index.saturating_mul(self.page_size).min(self.slots.len());
        let end = start.saturating_add(self.page_size).min(self.slots.len());
        self.slots[start..end].iter().flatten().cloned().collect()
    }

    /// All translated entries in document order
    pub fn entries(&self) -> Vec<SubtitleEntry> {
        self.slots.iter().flatten().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn translated_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
