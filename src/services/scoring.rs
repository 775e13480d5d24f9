/// Points awarded per occurrence of a correctly guessed spelling.
pub const POINTS_PER_OCCURRENCE: u32 = 10;

/// Flat bonus for revealing every required word before the clock runs out.
/// Applied once per round, and only on natural completion, never on forfeit.
pub const COMPLETION_BONUS: u32 = 100;

/// Points for a correct guess that matches `occurrences` positions in the title.
pub fn guess_points(occurrences: usize) -> u32 {
    POINTS_PER_OCCURRENCE * occurrences as u32
}
