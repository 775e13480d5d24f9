use std::collections::HashSet;

use crate::services::round::Difficulty;
use crate::services::tokenizer::is_word_char;

/// Render the display string for a title: hidden words are replaced with
/// underscores of matching length, everything else (casing, punctuation,
/// spacing) passes through verbatim.
///
/// The reconstruction is a single left-to-right scan over the original
/// title, so identical spellings in different positions resolve identically
/// and a spelling occurring inside a longer word is never touched.
pub fn render_masked_title(
    title: &str,
    guessable: &[String],
    revealed: &HashSet<String>,
    difficulty: Difficulty,
    hidden: &[String],
) -> String {
    let guessable_set: HashSet<&str> = guessable.iter().map(String::as_str).collect();

    let mut output = String::with_capacity(title.len());
    let mut word = String::new();

    for c in title.chars() {
        if is_word_char(c) {
            word.push(c);
        } else {
            flush_word(&mut output, &word, &guessable_set, revealed, difficulty, hidden);
            word.clear();
            output.push(c);
        }
    }
    flush_word(&mut output, &word, &guessable_set, revealed, difficulty, hidden);

    output
}

fn flush_word(
    output: &mut String,
    word: &str,
    guessable: &HashSet<&str>,
    revealed: &HashSet<String>,
    difficulty: Difficulty,
    hidden: &[String],
) {
    if word.is_empty() {
        return;
    }
    let spelling = word.to_lowercase();
    if should_mask(&spelling, guessable, revealed, difficulty, hidden) {
        output.extend(std::iter::repeat('_').take(word.chars().count()));
    } else {
        output.push_str(word);
    }
}

fn should_mask(
    spelling: &str,
    guessable: &HashSet<&str>,
    revealed: &HashSet<String>,
    difficulty: Difficulty,
    hidden: &[String],
) -> bool {
    if !guessable.contains(spelling) || revealed.contains(spelling) {
        return false;
    }
    match difficulty {
        // Hard mode hides every guessable word until it is guessed.
        Difficulty::Hard => true,
        // Easy mode only hides the pre-selected words; the rest of the
        // guessable words stay visible for the whole round.
        Difficulty::Easy => hidden.iter().any(|h| h == spelling),
    }
}
