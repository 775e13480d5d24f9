use std::collections::HashSet;
use std::sync::OnceLock;

use rand::seq::SliceRandom;

/// Search terms used to pull a random image for each round.
pub const SEARCH_TERMS: &[&str] = &[
    "nature", "city", "technology", "business", "people", "food", "travel",
    "architecture", "abstract", "landscape", "portrait", "lifestyle", "sports",
    "animals", "flowers", "ocean", "mountains", "sunset", "art", "design",
];

// Function words and temporal/quantifier adverbs that are too common to be
// worth guessing. Membership is checked against lowercased tokens.
static COMMON_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "from",
    "up", "about", "into", "through", "during", "before", "after", "above", "below",
    "between", "among", "under", "over", "around", "near", "far", "here", "there", "where",
    "when", "why", "how", "what", "who", "which", "that", "this", "these", "those", "some",
    "any", "all", "both", "each", "every", "other", "another", "such", "same", "different",
    "new", "old", "good", "bad", "big", "small", "large", "little", "long", "short",
    "high", "low", "great", "first", "last", "next", "previous", "main", "major", "minor",
    "important", "necessary", "possible", "available", "present", "current", "recent",
    "early", "late", "young", "mature", "fresh", "clean", "dirty", "hot", "cold", "warm",
    "cool", "dry", "wet", "full", "empty", "open", "closed", "free", "busy", "ready",
    "finished", "complete", "partial", "total", "whole", "half", "quarter", "double",
    "single", "multiple", "several", "many", "few", "most", "least", "more", "less",
    "much", "enough", "too", "very", "quite", "rather", "pretty", "fairly", "almost",
    "nearly", "approximately", "exactly", "precisely", "just", "only", "even", "still",
    "yet", "already", "soon", "now", "then", "today", "yesterday", "tomorrow", "always",
    "never", "sometimes", "often", "usually", "rarely", "hardly", "barely", "scarcely",
    "extremely", "highly", "completely", "totally", "entirely", "fully", "partly",
    "partially", "mostly", "mainly", "primarily", "especially", "particularly",
    "specifically", "generally", "normally", "typically", "commonly", "frequently",
    "regularly", "occasionally", "seldom", "forever", "permanently", "temporarily",
    "briefly", "quickly", "slowly", "suddenly", "gradually", "immediately", "instantly",
    "eventually", "finally", "ultimately", "initially", "originally", "previously",
    "formerly", "recently", "lately", "currently", "presently", "nowadays", "tonight",
    "whose", "whom",
];

static COMMON_WORD_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// Check whether a word is too common to be worth guessing.
pub fn is_common_word(word: &str) -> bool {
    COMMON_WORD_SET
        .get_or_init(|| COMMON_WORDS.iter().copied().collect())
        .contains(word)
}

/// Pick a uniformly random search term from the fixed vocabulary.
pub fn random_search_term() -> &'static str {
    let mut rng = rand::thread_rng();
    SEARCH_TERMS.choose(&mut rng).copied().unwrap_or("nature")
}
