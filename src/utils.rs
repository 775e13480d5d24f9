use std::collections::HashSet;

/// Format a number of seconds as M:SS for the countdown display.
pub fn format_clock(total_secs: u32) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Distinct spellings of a word list, first occurrence order preserved.
pub fn distinct_spellings(words: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .iter()
        .filter(|word| seen.insert(word.as_str()))
        .cloned()
        .collect()
}
