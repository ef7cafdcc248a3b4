use crate::text::{self, TextChunk};

/// Book metadata extracted from the package document.
///
/// `title` falls back to the source filename (extension stripped) and
/// `author` to [`crate::epub::UNKNOWN_AUTHOR`] when the package document
/// does not declare them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpubMetadata {
    pub title: String,
    pub author: String,
    pub language: Option<String>,
    pub publisher: Option<String>,
}

/// One chapter of extracted plain text.
///
/// Titles are auto-numbered in spine order; fragments under the minimum
/// length threshold (nav pages, covers) never become chapters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chapter {
    pub title: String,
    pub text: String,
}

/// Terminal output of ingestion, owned by the caller thereafter.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedEpub {
    pub metadata: EpubMetadata,
    /// Chapters in declared spine order.
    pub chapters: Vec<Chapter>,
    /// All chapter texts joined with single spaces.
    pub full_text: String,
}

impl ParsedEpub {
    /// Re-segment the full text into sentence-respecting playback chunks.
    pub fn chunks(&self, target_words: usize) -> Vec<TextChunk> {
        text::create_text_chunks(&self.full_text, target_words)
    }
}
