//! Sentence-respecting text chunking and word tokenization for playback.

pub mod language;

pub use language::{DEFAULT_LANGUAGE, detect_language, preferred_voice_tags};

use once_cell::sync::Lazy;
use regex::Regex;

/// Default chunk size. A pacing choice for one screen of read-aloud text,
/// not a protocol constant; callers may pass any target.
pub const DEFAULT_CHUNK_WORDS: usize = 40;

// A sentence is a run of non-terminal characters followed by terminal
// punctuation. Text with no terminal punctuation at all is one sentence.
static SENTENCES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+").expect("valid regex"));
static WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("valid regex"));

/// A contiguous, sentence-respecting slice of text sized for one screen of
/// paced reading. `index` always equals the chunk's position in the
/// sequence it was produced in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextChunk {
    pub text: String,
    pub words: Vec<String>,
    pub index: usize,
}

/// One word with its half-open byte range into the exact chunk text it was
/// tokenized from: `&text[start..end] == word` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WordPosition {
    pub word: String,
    pub start: usize,
    pub end: usize,
}

/// Split text into chunks of approximately `target_words` words.
///
/// Sentences are accumulated greedily with single-space joins; a chunk
/// closes when the next sentence would push it over the target and it
/// already holds something. A sentence is never split across two chunks,
/// so chunk sizes are approximate. Trailing text after the final terminal
/// punctuation mark belongs to no sentence and is dropped, a deliberate
/// carry-over from how the chunker has always segmented prose. The final
/// partial chunk is emitted if non-empty.
pub fn chunk_text(text: &str, target_words: usize) -> Vec<String> {
    let matched: Vec<&str> = SENTENCES.find_iter(text).map(|m| m.as_str()).collect();
    let sentences = if matched.is_empty() { vec![text] } else { matched };

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_words = 0usize;

    for sentence in sentences {
        let sentence = sentence.trim();
        let sentence_words = sentence.split_whitespace().count().max(1);

        if current_words + sentence_words > target_words && !current.is_empty() {
            chunks.push(current);
            current = sentence.to_string();
            current_words = sentence_words;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(sentence);
            current_words += sentence_words;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Chunk text and attach per-chunk word lists and positions.
pub fn create_text_chunks(text: &str, target_words: usize) -> Vec<TextChunk> {
    chunk_text(text, target_words)
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let words = text.split_whitespace().map(str::to_owned).collect();
            TextChunk { text, words, index }
        })
        .collect()
}

/// Map every maximal non-whitespace run of `text` to a [`WordPosition`].
///
/// Offsets are local to the given string; playback re-runs this per
/// displayed chunk rather than caching across chunk boundaries.
pub fn tokenize_with_positions(text: &str) -> Vec<WordPosition> {
    WORDS
        .find_iter(text)
        .map(|m| WordPosition {
            word: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_respects_sentence_boundaries() {
        let text = "One two three four. Five six seven eight. Nine ten.";
        let chunks = chunk_text(text, 6);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "One two three four.");
        assert_eq!(chunks[1], "Five six seven eight. Nine ten.");
    }

    #[test]
    fn test_chunk_joins_are_single_spaced() {
        let text = "Uno due.   Tre quattro.  Cinque sei.";
        let chunks = chunk_text(text, 40);
        assert_eq!(chunks, vec!["Uno due. Tre quattro. Cinque sei.".to_string()]);
    }

    #[test]
    fn test_chunk_drops_text_after_last_terminal() {
        let chunks = chunk_text("Fine della storia. parole rimaste", 40);
        assert_eq!(chunks, vec!["Fine della storia.".to_string()]);
    }

    #[test]
    fn test_chunk_oversized_sentence_stays_whole() {
        let text = "A very long single sentence that exceeds the target word count by a lot.";
        let chunks = chunk_text(text, 3);
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn test_chunk_text_without_terminal_punctuation() {
        let text = "no punctuation here at all";
        assert_eq!(chunk_text(text, 40), vec![text.to_string()]);
    }

    #[test]
    fn test_chunk_empty_text() {
        assert!(chunk_text("", 40).is_empty());
        assert!(chunk_text("   ", 40).is_empty());
    }

    #[test]
    fn test_create_text_chunks_indices_and_words() {
        let text = "Uno due tre. Quattro cinque sei. Sette otto nove.";
        let chunks = create_text_chunks(text, 4);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(
                chunk.words,
                chunk.text.split_whitespace().collect::<Vec<_>>()
            );
            assert!(!chunk.words.is_empty());
        }
    }

    #[test]
    fn test_tokenize_positions_slice_back() {
        let text = "Nel mezzo  del cammin";
        let tokens = tokenize_with_positions(text);

        assert_eq!(tokens.len(), 4);
        for token in &tokens {
            assert_eq!(&text[token.start..token.end], token.word);
        }
        assert_eq!(tokens[0].word, "Nel");
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[1].start, 4);
        // Double space between "mezzo" and "del" shifts the next start.
        assert_eq!(tokens[2].word, "del");
    }

    #[test]
    fn test_tokenize_empty_and_whitespace() {
        assert!(tokenize_with_positions("").is_empty());
        assert!(tokenize_with_positions(" \t\n ").is_empty());
    }

    #[test]
    fn test_tokenize_multibyte_offsets() {
        let text = "più tardi";
        let tokens = tokenize_with_positions(text);
        assert_eq!(tokens.len(), 2);
        assert_eq!(&text[tokens[0].start..tokens[0].end], "più");
        assert_eq!(&text[tokens[1].start..tokens[1].end], "tardi");
    }
}
