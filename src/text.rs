//! Text normalization and lightweight analysis helpers.
//!
//! Shared by extractors (cleaning, truncation) and processors (keywords,
//! reading time, emotions). All lengths are counted in characters, not bytes.

use std::sync::LazyLock;

use regex::Regex;

/// Marker appended to truncated text
pub const ELLIPSIS: &str = "...";

/// Default maximum number of keywords returned by [`extract_keywords`]
pub const DEFAULT_MAX_KEYWORDS: usize = 10;

/// Default reading speed for [`calculate_reading_time`]
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Unicode "Other" (control, format, surrogate, private use, unassigned),
/// minus whitespace
static NON_PRINTABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{C}&&\S]").expect("valid non-printable pattern"));

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must", "can", "this", "that",
    "these", "those",
];

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "amazing", "excellent", "wonderful", "fantastic", "love", "like", "enjoy",
    "happy", "excited",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "dislike", "angry", "frustrated", "disappointed", "sad",
];

const NEUTRAL_WORDS: &[&str] = &["okay", "fine", "normal", "standard", "regular"];

/// Emotion categories in canonical order
const EMOTIONS: [(&str, &[&str]); 3] = [
    ("positive", POSITIVE_WORDS),
    ("negative", NEGATIVE_WORDS),
    ("neutral", NEUTRAL_WORDS),
];

/// Strip non-printable characters (keeping whitespace), collapse whitespace
/// runs to a single space and trim.
///
/// Non-printable means the Unicode control, format, private-use, surrogate
/// and unassigned categories, so zero-width spaces, byte order marks and soft
/// hyphens are dropped along with ASCII control codes.
pub fn clean_text(text: &str) -> String {
    let printable = NON_PRINTABLE.replace_all(text, "");

    printable.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shorten `text` to at most `max_length` characters.
///
/// Text that fits is returned unchanged. Longer text keeps its first
/// `max_length - 3` characters followed by [`ELLIPSIS`]. Below 3 there is no
/// room for the marker, so the text is cut to `max_length` characters.
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let marker_len = ELLIPSIS.chars().count();
    if max_length < marker_len {
        return text.chars().take(max_length).collect();
    }

    let mut truncated: String = text.chars().take(max_length - marker_len).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Number of whitespace-delimited words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.iter().any(|stop| *stop == word)
}

/// Most frequent meaningful words of `text`.
///
/// Tokens are lower-cased whitespace splits; tokens of 3 characters or less
/// and stop words are ignored. Results are ordered by descending frequency,
/// equal counts keep the order in which the words first appeared.
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    let lowered = text.to_lowercase();

    // (word, count) in first-occurrence order
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for word in lowered.split_whitespace() {
        if word.chars().count() <= 3 || is_stop_word(word) {
            continue;
        }
        match counts.iter_mut().find(|(w, _)| *w == word) {
            Some((_, count)) => *count += 1,
            None => counts.push((word, 1)),
        }
    }

    // sort_by is stable, so ties stay in first-occurrence order
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(max_keywords)
        .map(|(word, _)| word.to_string())
        .collect()
}

/// Estimated reading time in whole minutes, never less than 1.
///
/// A rate of 0 words per minute is treated as 1.
pub fn calculate_reading_time(text: &str, words_per_minute: usize) -> usize {
    let rate = words_per_minute.max(1);
    (word_count(text) / rate).max(1)
}

/// Emotion categories whose keywords occur in `text`.
///
/// Matching is case-insensitive substring search, so categories are not
/// exclusive. Results follow the fixed order positive, negative, neutral;
/// text matching nothing is `["neutral"]`.
pub fn extract_emotions(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();

    let detected: Vec<&'static str> = EMOTIONS
        .iter()
        .filter(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map(|(name, _)| *name)
        .collect();

    if detected.is_empty() {
        vec!["neutral"]
    } else {
        detected
    }
}
