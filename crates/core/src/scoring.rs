//! Scoring module - line-clear points, drop rewards, currency and level progression
//!
//! Rules:
//! - A clear of N rows scores `LINE_SCORES[min(N, 4)] * level`.
//! - Soft drop pays `SOFT_DROP_REWARD` per successful step; hard drop pays
//!   `HARD_DROP_MULTIPLIER` per row fallen. Both go to score and currency alike.
//! - A clearing lock pays `count * 10 + combo * 5` currency, using the combo
//!   value after it has been incremented for this lock.
//! - Level-up is an exact-multiple check on the line total after the increment,
//!   so a clear that jumps over a multiple of ten does not level up.

use crate::types::{
    CLEAR_REWARD_PER_LINE, COMBO_REWARD, DROP_SPEEDUP_DENOMINATOR, DROP_SPEEDUP_NUMERATOR,
    HARD_DROP_MULTIPLIER, LINES_PER_LEVEL, LINE_SCORES, SOFT_DROP_REWARD,
};

/// Points for clearing `count` rows at `level`
///
/// Counts above 4 use the 4-row entry.
pub fn line_clear_score(count: usize, level: u32) -> u32 {
    let idx = count.min(LINE_SCORES.len() - 1);
    LINE_SCORES[idx].saturating_mul(level)
}

/// Score and currency for one successful soft-drop step
pub fn soft_drop_reward() -> u32 {
    SOFT_DROP_REWARD
}

/// Score and currency for a hard drop that fell `falls` rows
pub fn hard_drop_reward(falls: u32) -> u32 {
    falls.saturating_mul(HARD_DROP_MULTIPLIER)
}

/// Currency for a clearing lock
pub fn clear_gp_reward(count: usize, combo: u32) -> u32 {
    (count as u32)
        .saturating_mul(CLEAR_REWARD_PER_LINE)
        .saturating_add(combo.saturating_mul(COMBO_REWARD))
}

/// Whether the post-increment line total triggers a level-up
pub fn levels_up(total_lines: u32) -> bool {
    total_lines > 0 && total_lines % LINES_PER_LEVEL == 0
}

/// Drop interval after one level-up, never below `floor_ms`
pub fn next_drop_interval(current_ms: u32, floor_ms: u32) -> u32 {
    let reduced = (current_ms as u64 * DROP_SPEEDUP_NUMERATOR as u64
        / DROP_SPEEDUP_DENOMINATOR as u64) as u32;
    reduced.max(floor_ms)
}
