//! Score formulas for interactive blocks.
//!
//! Every score is an integer percentage in `0..=100`. These functions are
//! pure; the interaction machines decide when a block is complete and feed
//! their counters in here.

/// Highest possible block score.
pub const MAX_SCORE: u8 = 100;

/// Points lost per wrong fill-in-the-blank attempt.
pub const FILL_IN_BLANK_PENALTY: u32 = 20;

/// Points lost per wrong pairing in a matching game.
pub const MATCHING_GAME_PENALTY: u32 = 5;

/// Floor for a matching game with at least one correct match.
pub const MATCHING_GAME_MIN_SCORE: u8 = 10;

pub const TRUE_OR_FALSE_PENALTY: u32 = 50;
pub const SINGLE_CHOICE_PENALTY: u32 = 25;
pub const MULTIPLE_CHOICE_PENALTY: u32 = 20;

/// `100 - wrong_attempts * penalty`, floored at zero.
pub fn penalized_score(wrong_attempts: u32, penalty: u32) -> u8 {
    let lost = wrong_attempts.saturating_mul(penalty);
    u32::from(MAX_SCORE).saturating_sub(lost) as u8
}

/// Fill in the blank: 0 once the answer was revealed, otherwise 20 points off
/// per wrong attempt.
pub fn fill_in_blank_score(wrong_attempts: u32, revealed: bool) -> u8 {
    if revealed {
        return 0;
    }
    penalized_score(wrong_attempts, FILL_IN_BLANK_PENALTY)
}

/// Matching game: share of correct pairs, 5 points off per wrong pairing,
/// never below 10 once something was matched.
pub fn matching_game_score(correct_matches: u32, total_pairs: u32, wrong_attempts: u32) -> u8 {
    if correct_matches == 0 || total_pairs == 0 {
        return 0;
    }
    let ratio = i64::from(correct_matches.min(total_pairs)) * 100 / i64::from(total_pairs);
    let raw = ratio - i64::from(wrong_attempts) * i64::from(MATCHING_GAME_PENALTY);
    raw.clamp(i64::from(MATCHING_GAME_MIN_SCORE), i64::from(MAX_SCORE)) as u8
}

/// Choice-based blocks: fixed penalty per wrong attempt, 0 once revealed.
pub fn choice_score(wrong_attempts: u32, penalty: u32, revealed: bool) -> u8 {
    if revealed {
        return 0;
    }
    penalized_score(wrong_attempts, penalty)
}
