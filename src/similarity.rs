use rustc_hash::FxHashSet;

/// Classic edit distance: insertions, deletions and substitutions all cost 1.
#[inline]
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Ratio in `[0, 1]` of how much of the longer string survives the edit.
///
/// Identical strings score 1. Lengths are counted in chars.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    let (longer, shorter, longer_len) = if a_len >= b_len {
        (a, b, a_len)
    } else {
        (b, a, b_len)
    };
    (longer_len - levenshtein(longer, shorter)) as f64 / longer_len as f64
}

/// True iff the two strings share at least one word of `min_word_length` chars or more.
pub fn has_word_overlap(a: &str, b: &str, min_word_length: usize) -> bool {
    let words_a: FxHashSet<&str> = significant_words(a, min_word_length).collect();
    significant_words(b, min_word_length).any(|word| words_a.contains(word))
}

fn significant_words(text: &str, min_word_length: usize) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .filter(move |word| word.chars().count() >= min_word_length)
}
