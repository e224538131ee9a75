//! Yacht scoring rules and the upper-sum successor function.

use crate::constants::*;
use crate::dice_mechanics::{total_pips, DiceCounts};

/// Score for placing a 5-dice multiset in the given category.
///
/// Categories 0–5 are the upper section: face value × count.
/// Categories 6–11 are Full House, Four of a Kind, Little Straight,
/// Big Straight, Choice and Yacht.
pub fn calculate_category_score(counts: &DiceCounts, category: usize) -> i32 {
    match category {
        CATEGORY_ONES | CATEGORY_TWOS | CATEGORY_THREES | CATEGORY_FOURS | CATEGORY_FIVES
        | CATEGORY_SIXES => counts[category] as i32 * (category as i32 + 1),
        CATEGORY_FULL_HOUSE => {
            let has_three = counts.iter().any(|&c| c == 3);
            let has_two = counts.iter().any(|&c| c == 2);
            if has_three && has_two {
                total_pips(counts)
            } else {
                0
            }
        }
        CATEGORY_FOUR_OF_A_KIND => {
            if counts.iter().any(|&c| c >= 4) {
                total_pips(counts)
            } else {
                0
            }
        }
        CATEGORY_LITTLE_STRAIGHT => {
            if has_run(counts, 4) {
                15
            } else {
                0
            }
        }
        CATEGORY_BIG_STRAIGHT => {
            if has_run(counts, 5) {
                30
            } else {
                0
            }
        }
        CATEGORY_CHOICE => total_pips(counts),
        CATEGORY_YACHT => {
            if counts.iter().any(|&c| c == 5) {
                50
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// True if `len` consecutive faces are each present at least once.
fn has_run(counts: &DiceCounts, len: usize) -> bool {
    counts.windows(len).any(|w| w.iter().all(|&c| c >= 1))
}

/// Successor upper sum: min(upper + points, 63) for upper categories, unchanged otherwise.
#[inline]
pub fn update_upper_sum(upper_sum: i32, category: usize, points: i32) -> i32 {
    if is_upper_category(category) {
        (upper_sum + points).min(UPPER_BONUS_THRESHOLD)
    } else {
        upper_sum
    }
}

/// Bonus paid by the transition `upper_sum -> new_upper_sum`: 35 on first reaching 63.
#[inline]
pub fn upper_bonus(upper_sum: i32, new_upper_sum: i32) -> f64 {
    if upper_sum < UPPER_BONUS_THRESHOLD && new_upper_sum >= UPPER_BONUS_THRESHOLD {
        UPPER_BONUS
    } else {
        0.0
    }
}
