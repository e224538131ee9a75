//! Decision queries over a finished expected-value table.
//!
//! None of these mutate the table. Keep decisions reuse the turn evaluator,
//! so the answers agree with the values the solver stored.

use crate::constants::*;
use crate::dice_mechanics::{add_counts, count_dice, is_sub_multiset, DiceCode, DiceCounts};
use crate::game_mechanics::calculate_category_score;
use crate::phase0_tables::PatternTables;
use crate::types::{ExpectedValueTable, GameState, RerollRule};
use crate::widget_solver::{category_choice_value, TurnSolver, STAGE_FIRST_KEEP, STAGE_SECOND_KEEP};

/// Best keep after a roll, with its expected value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeepDecision {
    /// Dice held after the decision. Under [`RerollRule::LockKept`] this
    /// includes the dice that were already locked.
    pub held: DiceCounts,
    pub expected_value: f64,
}

/// Immediate points + bonus + future value of scoring `points` in `category`.
///
/// Returns `NEG_INFINITY` if the category is already used or out of range,
/// or if `upper_sum` is outside 0..=63.
pub fn evaluate_category_choice(
    table: &ExpectedValueTable,
    upper_sum: i32,
    used_mask: usize,
    category: usize,
    points: i32,
) -> f64 {
    if !valid_upper_sum(upper_sum)
        || category >= CATEGORY_COUNT
        || is_category_used(used_mask, category)
    {
        return f64::NEG_INFINITY;
    }
    category_choice_value(table, upper_sum, used_mask, category, points)
}

/// Best category for a final 5-dice multiset. `None` if no category is open,
/// `dice` is not five dice, or `upper_sum` is outside 0..=63.
pub fn choose_best_category(
    table: &ExpectedValueTable,
    upper_sum: i32,
    used_mask: usize,
    dice: &DiceCounts,
) -> Option<(usize, f64)> {
    if !valid_upper_sum(upper_sum) || count_dice(dice) != NUM_DICE {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for cat in 0..CATEGORY_COUNT {
        if is_category_used(used_mask, cat) {
            continue;
        }
        let points = calculate_category_score(dice, cat);
        let val = category_choice_value(table, upper_sum, used_mask, cat, points);
        if best.map_or(true, |(_, b)| val > b) {
            best = Some((cat, val));
        }
    }
    best
}

/// Turn stage whose keep decision follows roll number `rolls_done` (1 or 2).
fn keep_stage(rolls_done: usize) -> Option<usize> {
    match rolls_done {
        1 => Some(STAGE_FIRST_KEEP),
        2 => Some(STAGE_SECOND_KEEP),
        _ => None,
    }
}

fn valid_upper_sum(upper_sum: i32) -> bool {
    (0..=UPPER_BONUS_THRESHOLD).contains(&upper_sum)
}

fn valid_turn_input(state: &GameState, kept: &DiceCounts, rolled: &DiceCounts) -> bool {
    !state.is_terminal()
        && valid_upper_sum(state.upper_sum)
        && count_dice(kept) + count_dice(rolled) == NUM_DICE
}

/// Best keep after roll `rolls_done` (1 or 2), given the dice already
/// `kept` and the dice just `rolled`.
///
/// Returns `None` for invalid input: a terminal state, an upper sum outside
/// 0..=63, dice not totalling five, or no keep decision at that roll.
pub fn choose_best_keep(
    tables: &PatternTables,
    table: &ExpectedValueTable,
    reroll_rule: RerollRule,
    state: GameState,
    rolls_done: usize,
    kept: &DiceCounts,
    rolled: &DiceCounts,
) -> Option<KeepDecision> {
    let stage = keep_stage(rolls_done)?;
    if !valid_turn_input(&state, kept, rolled) {
        return None;
    }

    let kept_code = DiceCode::encode(kept);
    let mut solver = TurnSolver::new(tables, table, reroll_rule, state);
    let (choices, base) = solver.keep_choices(kept_code, DiceCode::encode(rolled));

    let mut best: Option<KeepDecision> = None;
    for keep in choices {
        let held = base.add(keep.code);
        let val = solver.stage_value(stage + 1, held);
        if best.map_or(true, |b| val > b.expected_value) {
            best = Some(KeepDecision {
                held: held.decode(),
                expected_value: val,
            });
        }
    }
    best
}

/// Expected value of holding `held` after roll `rolls_done`.
///
/// `held` must be reachable under `reroll_rule`: kept ⊆ held ⊆ kept + rolled
/// for [`RerollRule::LockKept`], held ⊆ kept + rolled for
/// [`RerollRule::FreeReroll`]. Returns `None` otherwise.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_chosen_keep(
    tables: &PatternTables,
    table: &ExpectedValueTable,
    reroll_rule: RerollRule,
    state: GameState,
    rolls_done: usize,
    kept: &DiceCounts,
    rolled: &DiceCounts,
    held: &DiceCounts,
) -> Option<f64> {
    let stage = keep_stage(rolls_done)?;
    if !valid_turn_input(&state, kept, rolled) {
        return None;
    }

    let combined = add_counts(kept, rolled);
    let reachable = is_sub_multiset(held, &combined)
        && (reroll_rule == RerollRule::FreeReroll || is_sub_multiset(kept, held));
    if !reachable {
        return None;
    }

    let mut solver = TurnSolver::new(tables, table, reroll_rule, state);
    Some(solver.stage_value(stage + 1, DiceCode::encode(held)))
}
