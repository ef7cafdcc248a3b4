//! Chunking, tokenization, and language detection tests.
//!
//! The property tests pin the two guarantees playback relies on: chunking
//! never loses or reorders words, and token offsets always slice back to
//! the exact word in the chunk text.

use proptest::prelude::*;

use leggio::{
    DEFAULT_CHUNK_WORDS, chunk_text, create_text_chunks, detect_language,
    tokenize_with_positions,
};

// ============================================================================
// Chunking
// ============================================================================

#[test]
fn test_chunk_indices_are_sequential() {
    let text = "Prima frase corta. Seconda frase un poco piu lunga. Terza frase. \
                Quarta frase ancora. Quinta e ultima frase del brano.";
    let chunks = create_text_chunks(text, 8);

    assert!(chunks.len() > 1);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
        assert_eq!(chunk.words.len(), chunk.text.split_whitespace().count());
    }
}

#[test]
fn test_chunking_preserves_every_word() {
    let text = "Nel mezzo del cammin di nostra vita. Mi ritrovai per una selva oscura. \
                Che la diritta via era smarrita. Ahi quanto a dir qual era e cosa dura.";
    let chunks = chunk_text(text, 7);

    let original: Vec<&str> = text.split_whitespace().collect();
    let rejoined = chunks.join(" ");
    let chunked: Vec<&str> = rejoined.split_whitespace().collect();
    assert_eq!(chunked, original);
}

#[test]
fn test_text_without_punctuation_is_one_chunk() {
    let text = "parole senza alcuna punteggiatura finale";
    assert_eq!(chunk_text(text, DEFAULT_CHUNK_WORDS), vec![text.to_string()]);
    assert_eq!(chunk_text(text, 2), vec![text.to_string()]);
}

#[test]
fn test_default_sized_chunks_stay_near_target() {
    let sentence = "Una frase di esattamente otto parole per il test. ";
    let text = sentence.repeat(20);
    let chunks = create_text_chunks(&text, DEFAULT_CHUNK_WORDS);

    for chunk in &chunks {
        // Nine words per sentence; four fit under a 40-word target.
        assert!(chunk.words.len() <= DEFAULT_CHUNK_WORDS);
    }
}

// ============================================================================
// Tokenization
// ============================================================================

#[test]
fn test_token_offsets_slice_back_to_words() {
    let text = "C'era una volta,  in più  d'un racconto";
    let tokens = tokenize_with_positions(text);

    assert_eq!(tokens.len(), 7);
    let mut previous_end = 0;
    for token in &tokens {
        assert_eq!(&text[token.start..token.end], token.word);
        assert!(token.start >= previous_end);
        previous_end = token.end;
    }
}

// ============================================================================
// Language Detection
// ============================================================================

#[test]
fn test_detects_english_prose() {
    let text = "It was the best of times, and they said that these years would be \
                remembered for all that there was about them, from the first day \
                to the last, when everything could have been different.";
    assert_eq!(detect_language(text), "en");
}

#[test]
fn test_numerals_fall_back_to_default() {
    assert_eq!(detect_language("100 200 300 400 500 600"), "it");
}

#[test]
fn test_empty_text_falls_back_to_default() {
    assert_eq!(detect_language(""), "it");
}

// ============================================================================
// Properties
// ============================================================================

fn sentence_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec("[a-zàè]{1,8}", 1..12),
        prop_oneof![Just('.'), Just('!'), Just('?')],
    )
        .prop_map(|(words, terminal)| format!("{}{}", words.join(" "), terminal))
}

proptest! {
    #[test]
    fn prop_tokenize_matches_split_whitespace(text in "\\PC{0,200}") {
        let tokens = tokenize_with_positions(&text);
        let words: Vec<&str> = text.split_whitespace().collect();

        prop_assert_eq!(tokens.len(), words.len());
        let mut previous_end = 0;
        for (token, word) in tokens.iter().zip(&words) {
            prop_assert_eq!(&token.word, word);
            prop_assert_eq!(&text[token.start..token.end], token.word.as_str());
            prop_assert!(token.start >= previous_end);
            previous_end = token.end;
        }
    }

    #[test]
    fn prop_chunking_never_loses_words(
        sentences in prop::collection::vec(sentence_strategy(), 1..20),
        target in 1usize..60,
    ) {
        let text = sentences.join(" ");
        let chunks = chunk_text(&text, target);

        let original: Vec<&str> = text.split_whitespace().collect();
        let rejoined = chunks.join(" ");
        let chunked: Vec<&str> = rejoined.split_whitespace().collect();
        prop_assert_eq!(chunked, original);

        for chunk in &chunks {
            prop_assert!(!chunk.trim().is_empty());
            prop_assert!(!chunk.contains("  "));
        }
    }

    #[test]
    fn prop_chunk_words_match_text(
        sentences in prop::collection::vec(sentence_strategy(), 1..10),
    ) {
        let text = sentences.join(" ");
        for chunk in create_text_chunks(&text, 10) {
            let from_text: Vec<&str> = chunk.text.split_whitespace().collect();
            prop_assert_eq!(&chunk.words, &from_text);

            let tokens = tokenize_with_positions(&chunk.text);
            prop_assert_eq!(tokens.len(), chunk.words.len());
        }
    }
}
