use crate::services::lexicon::is_common_word;

/// Word characters match the original title text: alphanumerics plus '_'.
/// Everything else is treated as punctuation and becomes a separator.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split a title into normalized tokens: lowercase, punctuation replaced by
/// spaces, split on whitespace runs, empty tokens dropped. Any input,
/// including the empty string, yields a (possibly empty) sequence.
pub fn tokenize(title: &str) -> Vec<String> {
    title
        .to_lowercase()
        .chars()
        .map(|c| if is_word_char(c) { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// A word is guessable when it is at least 3 characters long and not on the
/// common-word exclusion list.
pub fn is_guessable(word: &str) -> bool {
    word.chars().count() >= 3 && !is_common_word(word)
}

/// The guessable words of a title, in order, duplicates preserved.
/// Duplicates matter for scoring: each occurrence earns points.
pub fn guessable_words(title: &str) -> Vec<String> {
    tokenize(title)
        .into_iter()
        .filter(|word| is_guessable(word))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_strips_punctuation() {
        assert_eq!(
            tokenize("Sunset, Over The Ocean!"),
            vec!["sunset", "over", "the", "ocean"]
        );
        assert_eq!(tokenize("rock-climbing"), vec!["rock", "climbing"]);
        assert_eq!(tokenize(""), Vec::<String>::new());
        assert_eq!(tokenize("  ...  "), Vec::<String>::new());
    }

    #[test]
    fn test_guessable_words_filters_short_and_common() {
        // "beautiful"(9), "mountain"(8), "sunset"(6) and "view"(4) all pass
        // the length rule and none of them is on the common list.
        assert_eq!(
            guessable_words("Beautiful Mountain Sunset View"),
            vec!["beautiful", "mountain", "sunset", "view"]
        );

        // "the" is common, "a" and "of" are too short; "view" (4 chars,
        // not common) stays guessable.
        assert_eq!(
            guessable_words("A View of the Ocean"),
            vec!["view", "ocean"]
        );
    }

    #[test]
    fn test_guessable_words_preserves_duplicates_and_order() {
        assert_eq!(
            guessable_words("Ocean waves, ocean sky"),
            vec!["ocean", "waves", "ocean", "sky"]
        );
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let once = guessable_words("Beautiful, busy city streets at sunset");
        let again = guessable_words(&once.join(" "));
        assert_eq!(once, again);
    }
}
