//! Lexicon-based language detection for voice selection.

/// Fallback language when detection is inconclusive.
pub const DEFAULT_LANGUAGE: &str = "it";

/// How many tokens of the sample are scored.
const SAMPLE_TOKENS: usize = 500;

/// A best score below this is treated as "no recognizable language".
const MIN_SCORE: usize = 3;

// Common function words per supported language. The tuple order is part of
// the contract: ties between equal scores resolve to the earliest entry.
const LEXICONS: [(&str, &[&str]); 5] = [
    (
        "it",
        &[
            "che", "della", "per", "con", "sono", "una", "degli", "nella", "alla", "questo",
            "anche", "essere", "come", "più", "suo", "stato", "quando", "molto", "però", "ancora",
        ],
    ),
    (
        "en",
        &[
            "the", "and", "for", "with", "are", "have", "this", "that", "from", "they", "been",
            "them", "their", "which", "about", "would", "there", "could", "these", "when",
        ],
    ),
    (
        "fr",
        &[
            "les", "des", "pour", "dans", "que", "qui", "une", "avec", "est", "sont", "par",
            "sur", "pas", "plus", "peut", "tout", "comme", "mais", "été", "cette",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "den", "dem", "des", "ein", "eine", "ist", "nicht",
            "auch", "sich", "von", "mit", "wird", "oder", "sie", "aber", "aus",
        ],
    ),
    (
        "es",
        &[
            "los", "las", "del", "que", "para", "con", "una", "por", "como", "más", "pero",
            "sus", "les", "ese", "esta", "son", "todo", "también", "fue", "era",
        ],
    ),
];

/// Guess the language of a text sample from common-word frequencies.
///
/// Scores the first 500 lowercased tokens longer than 2 characters against
/// each lexicon and returns the best-scoring language code. Ties resolve to
/// the first language in the fixed it/en/fr/de/es order, an arbitrary but
/// deterministic tie-break. Returns [`DEFAULT_LANGUAGE`] when the best
/// score is below 3 or the sample has no usable tokens.
pub fn detect_language(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .take(SAMPLE_TOKENS)
        .collect();

    if tokens.is_empty() {
        return DEFAULT_LANGUAGE;
    }

    let mut best = DEFAULT_LANGUAGE;
    let mut best_score = 0usize;
    for (lang, lexicon) in LEXICONS {
        let score = tokens.iter().filter(|t| lexicon.contains(t)).count();
        tracing::trace!(lang, score, "language score");
        if score > best_score {
            best_score = score;
            best = lang;
        }
    }

    if best_score < MIN_SCORE {
        DEFAULT_LANGUAGE
    } else {
        best
    }
}

/// Voice tag preference list for a detected language, most specific first.
/// Unknown codes fall back to the default language's list.
pub fn preferred_voice_tags(lang: &str) -> &'static [&'static str] {
    match lang {
        "it" => &["it-IT", "it"],
        "en" => &["en-US", "en-GB", "en"],
        "fr" => &["fr-FR", "fr"],
        "de" => &["de-DE", "de"],
        "es" => &["es-ES", "es"],
        _ => &["it-IT", "it"],
    }
}
