//! Speech synthesis interface and playback session state.
//!
//! The engine trait is deliberately small: platform backends (native
//! synthesizers, remote services) implement it, and [`PlaybackSession`]
//! layers chunk-aware word highlighting and stale-callback suppression on
//! top. The library ships no engine of its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::error::Result;
use crate::text::{TextChunk, WordPosition, tokenize_with_positions};

/// Callbacks delivered while an utterance plays. Engines must invoke them
/// from at most one thread at a time.
#[derive(Default)]
pub struct SpeakCallbacks {
    /// Called at each word boundary with the character offset into the
    /// utterance text where the word starts.
    pub on_boundary: Option<Box<dyn FnMut(usize) + Send>>,
    /// Called once when the utterance finishes naturally. Not called after
    /// `stop`.
    pub on_complete: Option<Box<dyn FnOnce() + Send>>,
    /// Called once if synthesis fails mid-utterance.
    pub on_error: Option<Box<dyn FnOnce(String) + Send>>,
}

impl SpeakCallbacks {
    pub fn none() -> Self {
        Self::default()
    }
}

/// One utterance to synthesize.
pub struct SpeakRequest<'a> {
    pub text: &'a str,
    /// Engine-specific voice identifier; `None` means the engine default.
    pub voice_id: Option<&'a str>,
    pub words_per_minute: u32,
    pub callbacks: SpeakCallbacks,
}

/// A speech synthesis backend.
///
/// `speak` replaces any current utterance. `pause`/`resume` affect the
/// current utterance only and are no-ops when nothing is playing.
pub trait TtsEngine {
    fn speak(&mut self, request: SpeakRequest<'_>) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn is_playing(&self) -> bool;
    fn is_paused(&self) -> bool;
}

/// Drives chunk playback over any [`TtsEngine`], translating the engine's
/// character-offset boundary events into word indices.
///
/// Every `speak_chunk` bumps an internal generation counter and binds the
/// supplied callbacks to that generation. Engines may keep delivering
/// events for an utterance that was already replaced; the session drops
/// those instead of letting a dead utterance move the highlight.
pub struct PlaybackSession<E: TtsEngine> {
    engine: E,
    generation: Arc<AtomicU64>,
}

impl<E: TtsEngine> PlaybackSession<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Speak one chunk, reporting word indices as playback reaches them.
    ///
    /// Any utterance already in flight is stopped first. `on_word` receives
    /// the index into `chunk.words` of the word being spoken.
    pub fn speak_chunk(
        &mut self,
        chunk: &TextChunk,
        voice_id: Option<&str>,
        words_per_minute: u32,
        mut on_word: impl FnMut(usize) + Send + 'static,
        on_complete: impl FnOnce() + Send + 'static,
        on_error: impl FnOnce(String) + Send + 'static,
    ) -> Result<()> {
        self.engine.stop()?;
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation, index = chunk.index, "speaking chunk");

        let tokens = tokenize_with_positions(&chunk.text);

        let counter = Arc::clone(&self.generation);
        let boundary = Box::new(move |char_offset: usize| {
            if counter.load(Ordering::Acquire) != generation {
                return;
            }
            if let Some(word_index) = word_index_at(&tokens, char_offset) {
                on_word(word_index);
            }
        });

        let counter = Arc::clone(&self.generation);
        let complete = Box::new(move || {
            if counter.load(Ordering::Acquire) == generation {
                on_complete();
            }
        });

        let counter = Arc::clone(&self.generation);
        let error = Box::new(move |message: String| {
            if counter.load(Ordering::Acquire) == generation {
                on_error(message);
            }
        });

        self.engine.speak(SpeakRequest {
            text: &chunk.text,
            voice_id,
            words_per_minute,
            callbacks: SpeakCallbacks {
                on_boundary: Some(boundary),
                on_complete: Some(complete),
                on_error: Some(error),
            },
        })
    }

    /// Stop playback and invalidate all outstanding callbacks.
    pub fn stop(&mut self) -> Result<()> {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.engine.stop()
    }

    pub fn pause(&mut self) -> Result<()> {
        self.engine.pause()
    }

    pub fn resume(&mut self) -> Result<()> {
        self.engine.resume()
    }

    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    pub fn is_paused(&self) -> bool {
        self.engine.is_paused()
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}

/// Index of the token whose byte range contains `char_offset`, if any.
/// Offsets inside inter-word whitespace map to nothing.
pub fn word_index_at(tokens: &[WordPosition], char_offset: usize) -> Option<usize> {
    tokens
        .iter()
        .position(|t| t.start <= char_offset && char_offset < t.end)
}
