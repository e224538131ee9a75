//! Per-turn evaluation: E(S) for one turn-start state S = (upper_sum, used_mask).
//!
//! A turn is resolved forward from the empty kept multiset through four
//! stages, memoized by (stage, kept dice) in a [`TurnCache`] that lives only
//! as long as the turn:
//!
//! | Stage | Meaning |
//! |-------|---------|
//! | 0 | roll the free dice, then choose what to keep |
//! | 1 | second roll, then choose what to keep |
//! | 2 | final roll, no choice |
//! | 3 | choose a category for the five dice |
//!
//! Stage 3 reads successor cells of the expected-value table, which must be
//! final before the turn is evaluated.

use crate::constants::*;
use crate::dice_mechanics::DiceCode;
use crate::game_mechanics::{update_upper_sum, upper_bonus};
use crate::phase0_tables::PatternTables;
use crate::types::{ExpectedValueTable, GameState, KeepPattern, RerollRule};

pub const STAGE_FIRST_KEEP: usize = 0;
pub const STAGE_SECOND_KEEP: usize = 1;
pub const STAGE_FINAL_ROLL: usize = 2;
pub const STAGE_SCORING: usize = 3;

const NUM_STAGES: usize = 4;

/// Memo for one turn, indexed by (stage, dense index of the kept multiset).
pub struct TurnCache {
    values: Vec<f64>,
}

impl Default for TurnCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnCache {
    pub fn new() -> Self {
        Self {
            values: vec![f64::NAN; NUM_STAGES * NUM_DICE_MULTISETS],
        }
    }

    #[inline(always)]
    fn get(&self, stage: usize, kept_idx: usize) -> Option<f64> {
        let v = self.values[stage * NUM_DICE_MULTISETS + kept_idx];
        if v.is_nan() {
            None
        } else {
            Some(v)
        }
    }

    #[inline(always)]
    fn insert(&mut self, stage: usize, kept_idx: usize, value: f64) {
        self.values[stage * NUM_DICE_MULTISETS + kept_idx] = value;
    }

    /// Number of memoized sub-states.
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Value of scoring `points` in `category` from (upper_sum, used_mask):
/// points + bonus + E(successor).
#[inline]
pub fn category_choice_value(
    table: &ExpectedValueTable,
    upper_sum: i32,
    used_mask: usize,
    category: usize,
    points: i32,
) -> f64 {
    let new_mask = used_mask | (1 << category);
    let new_upper = update_upper_sum(upper_sum, category, points);
    points as f64 + upper_bonus(upper_sum, new_upper) + table.get(new_upper as usize, new_mask)
}

/// Evaluator for one turn-start state. Owns the turn's memo.
pub struct TurnSolver<'a> {
    tables: &'a PatternTables,
    table: &'a ExpectedValueTable,
    reroll_rule: RerollRule,
    state: GameState,
    cache: TurnCache,
}

impl<'a> TurnSolver<'a> {
    pub fn new(
        tables: &'a PatternTables,
        table: &'a ExpectedValueTable,
        reroll_rule: RerollRule,
        state: GameState,
    ) -> Self {
        debug_assert!((0..=UPPER_BONUS_THRESHOLD).contains(&state.upper_sum));
        Self {
            tables,
            table,
            reroll_rule,
            state,
            cache: TurnCache::new(),
        }
    }

    /// E(S): expected value of the whole turn plus everything after it.
    pub fn solve(&mut self) -> f64 {
        if self.state.is_terminal() {
            return 0.0;
        }
        self.stage_value(STAGE_FIRST_KEEP, DiceCode::EMPTY)
    }

    /// Value of reaching `stage` holding `kept`. Memoized.
    pub fn stage_value(&mut self, stage: usize, kept: DiceCode) -> f64 {
        let kept_idx = self.tables.index_of(kept);
        if let Some(v) = self.cache.get(stage, kept_idx) {
            return v;
        }

        let value = match stage {
            STAGE_SCORING => self.best_category_value(kept_idx),
            STAGE_FINAL_ROLL => self.final_roll_value(kept),
            _ => self.roll_with_keep_value(stage, kept),
        };

        self.cache.insert(stage, kept_idx, value);
        value
    }

    /// Keep choices after rolling `rolled` while holding `kept`.
    ///
    /// Returns the candidate patterns and the base each is added to.
    #[inline]
    pub fn keep_choices(&self, kept: DiceCode, rolled: DiceCode) -> (&'a [KeepPattern], DiceCode) {
        match self.reroll_rule {
            RerollRule::LockKept => (self.tables.keeps(rolled), kept),
            RerollRule::FreeReroll => (self.tables.keeps(kept.add(rolled)), DiceCode::EMPTY),
        }
    }

    /// Best next-stage value over all keep choices for one observed roll.
    pub fn best_keep_value(&mut self, stage: usize, kept: DiceCode, rolled: DiceCode) -> f64 {
        let (choices, base) = self.keep_choices(kept, rolled);
        let mut best = f64::NEG_INFINITY;
        for keep in choices {
            let val = self.stage_value(stage + 1, base.add(keep.code));
            if val > best {
                best = val;
            }
        }
        best
    }

    /// Stages 0 and 1: Σ P(roll) · max over keeps of the next stage.
    fn roll_with_keep_value(&mut self, stage: usize, kept: DiceCode) -> f64 {
        let n_roll = NUM_DICE - kept.dice_count();
        if n_roll == 0 {
            return self.stage_value(stage + 1, kept);
        }

        let tables = self.tables;
        let mut total = 0.0;
        for roll in tables.rolls(n_roll) {
            total += roll.probability * self.best_keep_value(stage, kept, roll.code);
        }
        total
    }

    /// Stage 2: Σ P(roll) · stage-3 value of kept + roll.
    fn final_roll_value(&mut self, kept: DiceCode) -> f64 {
        let n_roll = NUM_DICE - kept.dice_count();
        if n_roll == 0 {
            return self.stage_value(STAGE_SCORING, kept);
        }

        let tables = self.tables;
        let mut total = 0.0;
        for roll in tables.rolls(n_roll) {
            total += roll.probability * self.stage_value(STAGE_SCORING, kept.add(roll.code));
        }
        total
    }

    /// Stage 3: max over unused categories of points + bonus + E(successor).
    fn best_category_value(&self, dice_idx: usize) -> f64 {
        let scores = &self.tables.category_scores[dice_idx];
        let GameState {
            upper_sum,
            used_mask,
        } = self.state;

        let mut best = f64::NEG_INFINITY;
        for cat in 0..CATEGORY_COUNT {
            if is_category_used(used_mask, cat) {
                continue;
            }
            let val = category_choice_value(self.table, upper_sum, used_mask, cat, scores[cat]);
            if val > best {
                best = val;
            }
        }
        best
    }

    pub fn cache(&self) -> &TurnCache {
        &self.cache
    }
}

/// E(S) for one turn-start state, with a fresh memo.
pub fn compute_expected_state_value(
    tables: &PatternTables,
    table: &ExpectedValueTable,
    reroll_rule: RerollRule,
    state: GameState,
) -> f64 {
    TurnSolver::new(tables, table, reroll_rule, state).solve()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(cat: usize) -> usize {
        ALL_USED_MASK ^ (1 << cat)
    }

    #[test]
    fn test_terminal_turn_is_zero() {
        let tables = PatternTables::new();
        let table = ExpectedValueTable::new();
        let state = GameState::new(12, ALL_USED_MASK);
        assert_eq!(
            compute_expected_state_value(&tables, &table, RerollRule::LockKept, state),
            0.0
        );
    }

    #[test]
    fn test_only_choice_remaining() {
        // Keep 5s and 6s after the first roll, 4s and up after the second:
        // 5 × (11/6 + 4/6 × 4.25) = 70/3.
        let tables = PatternTables::new();
        let table = ExpectedValueTable::new();
        for rule in [RerollRule::LockKept, RerollRule::FreeReroll] {
            let state = GameState::new(0, only(CATEGORY_CHOICE));
            let ev = compute_expected_state_value(&tables, &table, rule, state);
            assert!((ev - 70.0 / 3.0).abs() < 1e-9, "{:?}: {}", rule, ev);
        }
    }

    #[test]
    fn test_only_ones_remaining_with_bonus_in_reach() {
        // Each die ends as a one with probability 91/216 when ones are kept.
        let tables = PatternTables::new();
        let table = ExpectedValueTable::new();
        let p_one: f64 = 91.0 / 216.0;
        let expected_ones = 5.0 * p_one;
        let p_any = 1.0 - (1.0 - p_one).powi(5);

        let at_62 = compute_expected_state_value(
            &tables,
            &table,
            RerollRule::LockKept,
            GameState::new(62, only(CATEGORY_ONES)),
        );
        assert!((at_62 - (expected_ones + 35.0 * p_any)).abs() < 1e-9, "{}", at_62);

        let at_63 = compute_expected_state_value(
            &tables,
            &table,
            RerollRule::LockKept,
            GameState::new(63, only(CATEGORY_ONES)),
        );
        assert!((at_63 - expected_ones).abs() < 1e-9, "{}", at_63);
    }

    #[test]
    fn test_category_choice_value_bonus_edge() {
        let table = ExpectedValueTable::new();
        let mask = only(CATEGORY_THREES);
        assert_eq!(category_choice_value(&table, 61, mask, CATEGORY_THREES, 3), 38.0);
        assert_eq!(category_choice_value(&table, 63, mask, CATEGORY_THREES, 3), 3.0);
        assert_eq!(category_choice_value(&table, 50, mask, CATEGORY_THREES, 3), 3.0);
        let lower = only(CATEGORY_CHOICE);
        assert_eq!(category_choice_value(&table, 62, lower, CATEGORY_CHOICE, 30), 30.0);
    }

    #[test]
    fn test_cache_is_scoped_to_turn() {
        let tables = PatternTables::new();
        let table = ExpectedValueTable::new();
        let mut solver = TurnSolver::new(
            &tables,
            &table,
            RerollRule::LockKept,
            GameState::new(0, only(CATEGORY_YACHT)),
        );
        assert!(solver.cache().is_empty());
        let ev = solver.solve();
        assert!(ev > 0.0 && ev < 50.0 * 0.05);
        assert!(solver.cache().len() > 0);
        assert!(solver.cache().len() <= NUM_STAGES * NUM_DICE_MULTISETS);
    }

    #[test]
    fn test_free_reroll_never_worse() {
        let tables = PatternTables::new();
        let table = ExpectedValueTable::new();
        for cat in [CATEGORY_YACHT, CATEGORY_FULL_HOUSE, CATEGORY_BIG_STRAIGHT] {
            let state = GameState::new(0, only(cat));
            let locked = compute_expected_state_value(&tables, &table, RerollRule::LockKept, state);
            let free = compute_expected_state_value(&tables, &table, RerollRule::FreeReroll, state);
            assert!(free >= locked - 1e-12, "cat {}: free {} < locked {}", cat, free, locked);
        }
    }
}
