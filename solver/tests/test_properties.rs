//! Property-based tests for core game mechanics.

use proptest::prelude::*;

use yacht::constants::*;
use yacht::dice_mechanics::{
    count_dice, dice_to_counts, multinomial, total_pips, DiceCode, DiceCounts,
};
use yacht::game_mechanics::{calculate_category_score, update_upper_sum, upper_bonus};
use yacht::phase0_tables::{enumerate_keep_patterns, enumerate_roll_patterns, PatternTables};

/// Strategy: five dice, each 1-6, as face counts.
fn dice_strategy() -> impl Strategy<Value = DiceCounts> {
    prop::array::uniform5(1..=6u8).prop_map(|d| dice_to_counts(&d))
}

/// Strategy: 0..=5 dice as face counts.
fn partial_dice_strategy() -> impl Strategy<Value = DiceCounts> {
    prop::collection::vec(1..=6u8, 0..=5).prop_map(|d| dice_to_counts(&d))
}

/// Strategy: a valid category index (0-11).
fn category_strategy() -> impl Strategy<Value = usize> {
    0..CATEGORY_COUNT
}

proptest! {
    // 1. Scores are non-negative and bounded by 50
    #[test]
    fn score_in_range(dice in dice_strategy(), cat in category_strategy()) {
        let score = calculate_category_score(&dice, cat);
        prop_assert!((0..=50).contains(&score), "score={score} for dice={dice:?} cat={cat}");
    }

    // 2. Choice always scores the pip total, and every pip-scoring category is 0 or that total
    #[test]
    fn pip_categories(dice in dice_strategy()) {
        let pips = total_pips(&dice);
        prop_assert_eq!(calculate_category_score(&dice, CATEGORY_CHOICE), pips);
        for cat in [CATEGORY_FULL_HOUSE, CATEGORY_FOUR_OF_A_KIND] {
            let s = calculate_category_score(&dice, cat);
            prop_assert!(s == 0 || s == pips);
        }
    }

    // 3. A big straight is always a little straight
    #[test]
    fn big_straight_implies_little(dice in dice_strategy()) {
        if calculate_category_score(&dice, CATEGORY_BIG_STRAIGHT) > 0 {
            prop_assert_eq!(calculate_category_score(&dice, CATEGORY_LITTLE_STRAIGHT), 15);
        }
    }

    // 4. Five of a kind scores Yacht and never Full House
    #[test]
    fn yacht_five_of_a_kind(face in 0..6usize) {
        let mut dice = [0u8; 6];
        dice[face] = 5;
        prop_assert_eq!(calculate_category_score(&dice, CATEGORY_YACHT), 50);
        prop_assert_eq!(calculate_category_score(&dice, CATEGORY_FULL_HOUSE), 0);
        let four_of_a_kind = calculate_category_score(&dice, CATEGORY_FOUR_OF_A_KIND);
        prop_assert_eq!(four_of_a_kind, 5 * (face as i32 + 1));
    }

    // 5. Encoding is injective on valid multisets and addition matches count addition
    #[test]
    fn code_add_matches_counts(a in partial_dice_strategy(), b in partial_dice_strategy()) {
        prop_assume!(count_dice(&a) + count_dice(&b) <= NUM_DICE);
        let sum = DiceCode::encode(&a).add(DiceCode::encode(&b));
        let mut expected = a;
        for f in 0..6 {
            expected[f] += b[f];
        }
        prop_assert_eq!(sum.decode(), expected);
        prop_assert_eq!(sum.dice_count(), count_dice(&expected));
    }

    // 6. Upper sum never exceeds 63 and the bonus is paid only when crossing
    #[test]
    fn upper_sum_capped(up in 0..=63i32, cat in category_strategy(), points in 0..=30i32) {
        let new_up = update_upper_sum(up, cat, points);
        prop_assert!(new_up <= UPPER_BONUS_THRESHOLD);
        prop_assert!(new_up >= up);
        let bonus = upper_bonus(up, new_up);
        prop_assert!(bonus == 0.0 || (up < 63 && new_up == 63 && bonus == UPPER_BONUS));
    }

    // 7. Keep pattern count is the product of (count + 1)
    #[test]
    fn keep_pattern_count(dice in partial_dice_strategy()) {
        let expected: usize = dice.iter().map(|&c| c as usize + 1).product();
        prop_assert_eq!(enumerate_keep_patterns(&dice).len(), expected);
    }
}

// 8. Roll pattern probabilities are multinomial / 6^n and sum to 1 (non-proptest)
#[test]
fn roll_probabilities_sum_to_one() {
    for n in 0..=NUM_DICE {
        let patterns = enumerate_roll_patterns(n);
        let outcomes = 6f64.powi(n as i32);
        for p in &patterns {
            assert_eq!(p.probability, multinomial(&p.counts) as f64 / outcomes);
        }
        let sum: f64 = patterns.iter().map(|p| p.probability).sum();
        assert!((sum - 1.0).abs() < 1e-9, "n={n} sum={sum}");
    }
}

// 9. Every roll pattern's keep list has the product size and contains empty and full
#[test]
fn keep_table_covers_every_roll() {
    let tables = PatternTables::new();
    for n in 0..=NUM_DICE {
        for roll in tables.rolls(n) {
            let keeps = tables.keeps(roll.code);
            let expected: usize = roll.counts.iter().map(|&c| c as usize + 1).product();
            assert_eq!(keeps.len(), expected, "roll {:?}", roll.counts);
            assert!(keeps.iter().any(|k| k.code == DiceCode::EMPTY));
            assert!(keeps.iter().any(|k| k.code == roll.code));
        }
    }
}

// 10. Spot checks of the scoring rules
#[test]
fn scoring_spot_checks() {
    assert_eq!(calculate_category_score(&[5, 0, 0, 0, 0, 0], CATEGORY_YACHT), 50);
    assert_eq!(calculate_category_score(&[4, 1, 0, 0, 0, 0], CATEGORY_YACHT), 0);
    assert_eq!(calculate_category_score(&[0, 2, 3, 0, 0, 0], CATEGORY_FULL_HOUSE), 13);
    assert_eq!(calculate_category_score(&[0, 0, 0, 0, 5, 0], CATEGORY_FULL_HOUSE), 0);
    assert_eq!(calculate_category_score(&[1, 1, 1, 2, 0, 0], CATEGORY_LITTLE_STRAIGHT), 15);
    assert_eq!(calculate_category_score(&[0, 1, 1, 1, 1, 1], CATEGORY_BIG_STRAIGHT), 30);
    assert_eq!(calculate_category_score(&[0, 1, 1, 1, 1, 1], CATEGORY_CHOICE), 20);
    assert_eq!(calculate_category_score(&[3, 0, 0, 0, 0, 2], CATEGORY_ONES), 3);
}
