//! # leggio
//!
//! EPUB ingestion and sentence-aware text chunking for read-aloud apps.
//!
//! ## Features
//!
//! - Parse EPUB 2/3 archives into plain-text chapters with metadata
//! - Detect DRM-protected books before any content is surfaced
//! - Split text into sentence-respecting chunks sized for paced reading
//! - Tokenize chunks with byte offsets for word-level highlighting
//! - Guess the book's language for voice selection
//! - Drive any speech backend through [`TtsEngine`] and [`PlaybackSession`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use leggio::{parse_epub, detect_language};
//!
//! let bytes = std::fs::read("book.epub")?;
//! let book = parse_epub(bytes, "book.epub")?;
//!
//! println!("{} by {}", book.metadata.title, book.metadata.author);
//! println!("language: {}", detect_language(&book.full_text));
//!
//! for chunk in book.chunks(40) {
//!     println!("[{}] {}", chunk.index, chunk.text);
//! }
//! # Ok::<(), leggio::Error>(())
//! ```
//!
//! ## Playback
//!
//! Chunks carry their word lists so a UI can highlight the word being
//! spoken. [`PlaybackSession`] wraps a [`TtsEngine`] implementation and
//! maps the engine's character-offset boundary events to word indices,
//! dropping events from utterances that were already replaced.

pub mod book;
pub mod epub;
pub mod error;
pub mod io;
pub mod text;
pub mod tts;

pub use book::{Chapter, EpubMetadata, ParsedEpub};
pub use epub::parse_epub;
pub use error::{Error, Result};
pub use io::{ByteFetch, FileFetch, MemoryFetch};
pub use text::{
    DEFAULT_CHUNK_WORDS, TextChunk, WordPosition, chunk_text, create_text_chunks,
    detect_language, preferred_voice_tags, tokenize_with_positions,
};
pub use tts::{PlaybackSession, SpeakCallbacks, SpeakRequest, TtsEngine};
