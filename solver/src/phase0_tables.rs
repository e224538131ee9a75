//! Phase 0: Precompute all static lookup tables.
//!
//! The orchestrator [`PatternTables::new`] runs these steps in dependency order:
//!
//! 1. **Dice multisets**: enumerate the 462 multisets of 0..=5 dice and a
//!    code → dense index lookup
//! 2. **Roll patterns**: for each n in 0..=5, the distinguishable outcomes of
//!    rolling n dice with their probabilities
//! 3. **Keep patterns**: for each distinct outcome, every sub-multiset that can be kept
//! 4. **Category scores**: score of every 5-dice multiset in every category
//!
//! The tables are immutable once built and shared by reference with the solver.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::info;

use crate::constants::*;
use crate::dice_mechanics::{DiceCode, DiceCounts, DICE_CODE_SPACE};
use crate::game_mechanics::calculate_category_score;
use crate::types::{KeepPattern, RollPattern};

/// Marks codes that are not a multiset of at most 5 dice.
const NO_INDEX: u16 = u16::MAX;

/// Immutable enumerator tables consumed by the solver.
pub struct PatternTables {
    /// Dense index → multiset code, for all 462 multisets of 0..=5 dice.
    pub multisets: Vec<DiceCode>,
    /// Code → dense index ([`u16::MAX`] for invalid codes).
    dense_index: Vec<u16>,
    /// roll_patterns[n]: distinguishable outcomes of rolling n dice.
    pub roll_patterns: Vec<Vec<RollPattern>>,
    /// keep_patterns[dense index of outcome]: every keepable sub-multiset.
    keep_patterns: Vec<Vec<KeepPattern>>,
    /// category_scores[dense index]: points per category (5-dice multisets only).
    pub category_scores: Vec<[i32; CATEGORY_COUNT]>,
}

impl Default for PatternTables {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternTables {
    /// Build every table in dependency order.
    pub fn new() -> Self {
        info!("Phase 0: precompute lookup tables");
        let phase0_start = Instant::now();

        macro_rules! timed {
            ($label:expr, $body:expr) => {{
                let t0 = Instant::now();
                let out = $body;
                let dt = t0.elapsed().as_secs_f64() * 1000.0;
                info!("  {:<32} {:>8.3} ms", $label, dt);
                out
            }};
        }

        let (multisets, dense_index) = timed!("Dice multisets (462)", build_dice_multisets());
        let roll_patterns = timed!(
            "Roll patterns",
            (0..=NUM_DICE).map(enumerate_roll_patterns).collect::<Vec<_>>()
        );
        let keep_patterns = timed!(
            "Keep patterns",
            build_keep_table(&roll_patterns, &dense_index, multisets.len())
        );
        let category_scores = timed!("Category scores", precompute_category_scores(&multisets));

        for (n, patterns) in roll_patterns.iter().enumerate() {
            info!("    {} dice: {} roll patterns", n, patterns.len());
        }
        let keep_entries: usize = keep_patterns.iter().map(Vec::len).sum();
        info!("    Keep table: {} total entries", keep_entries);
        info!(
            "  {:<32} {:>8.3} ms",
            "TOTAL Phase 0",
            phase0_start.elapsed().as_secs_f64() * 1000.0
        );

        Self {
            multisets,
            dense_index,
            roll_patterns,
            keep_patterns,
            category_scores,
        }
    }

    /// Dense index of a multiset of at most 5 dice.
    #[inline(always)]
    pub fn index_of(&self, code: DiceCode) -> usize {
        let idx = self.dense_index[code.raw() as usize];
        debug_assert!(idx != NO_INDEX, "code {:?} is not a multiset of <= 5 dice", code);
        idx as usize
    }

    /// Distinguishable outcomes of rolling `num_dice` dice.
    #[inline(always)]
    pub fn rolls(&self, num_dice: usize) -> &[RollPattern] {
        &self.roll_patterns[num_dice]
    }

    /// Every keepable sub-multiset of `outcome`, including empty and full.
    #[inline(always)]
    pub fn keeps(&self, outcome: DiceCode) -> &[KeepPattern] {
        &self.keep_patterns[self.index_of(outcome)]
    }
}

/// Enumerate all multisets of 0..=5 dice as face counts and build the reverse lookup.
pub fn build_dice_multisets() -> (Vec<DiceCode>, Vec<u16>) {
    let mut multisets = Vec::with_capacity(NUM_DICE_MULTISETS);
    let mut dense_index = vec![NO_INDEX; DICE_CODE_SPACE];

    let n = NUM_DICE as u8;
    for f1 in 0..=n {
        for f2 in 0..=(n - f1) {
            for f3 in 0..=(n - f1 - f2) {
                for f4 in 0..=(n - f1 - f2 - f3) {
                    for f5 in 0..=(n - f1 - f2 - f3 - f4) {
                        for f6 in 0..=(n - f1 - f2 - f3 - f4 - f5) {
                            let code = DiceCode::encode(&[f1, f2, f3, f4, f5, f6]);
                            dense_index[code.raw() as usize] = multisets.len() as u16;
                            multisets.push(code);
                        }
                    }
                }
            }
        }
    }

    (multisets, dense_index)
}

/// Distinguishable outcomes of rolling `num_dice` fair dice.
///
/// Walks all 6^n ordered sequences and buckets them by face counts; each
/// bucket's probability is its size / 6^n. Output is sorted by code.
pub fn enumerate_roll_patterns(num_dice: usize) -> Vec<RollPattern> {
    let total_outcomes = NUM_FACES.pow(num_dice as u32);
    let mut buckets: BTreeMap<DiceCode, u32> = BTreeMap::new();

    for outcome in 0..total_outcomes {
        let mut counts = [0u8; NUM_FACES];
        let mut rest = outcome;
        for _ in 0..num_dice {
            counts[rest % NUM_FACES] += 1;
            rest /= NUM_FACES;
        }
        *buckets.entry(DiceCode::encode(&counts)).or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|(code, ways)| RollPattern {
            code,
            counts: code.decode(),
            probability: ways as f64 / total_outcomes as f64,
        })
        .collect()
}

/// Every sub-multiset of `outcome`: the product of {0..=c} over the six faces.
pub fn enumerate_keep_patterns(outcome: &DiceCounts) -> Vec<KeepPattern> {
    let capacity: usize = outcome.iter().map(|&c| c as usize + 1).product();
    let mut patterns = Vec::with_capacity(capacity);

    for k1 in 0..=outcome[0] {
        for k2 in 0..=outcome[1] {
            for k3 in 0..=outcome[2] {
                for k4 in 0..=outcome[3] {
                    for k5 in 0..=outcome[4] {
                        for k6 in 0..=outcome[5] {
                            let counts = [k1, k2, k3, k4, k5, k6];
                            patterns.push(KeepPattern {
                                code: DiceCode::encode(&counts),
                                counts,
                            });
                        }
                    }
                }
            }
        }
    }

    patterns
}

/// Keep patterns for every distinct roll outcome, stored by the outcome's dense index.
fn build_keep_table(
    roll_patterns: &[Vec<RollPattern>],
    dense_index: &[u16],
    num_multisets: usize,
) -> Vec<Vec<KeepPattern>> {
    let mut table: Vec<Vec<KeepPattern>> = vec![Vec::new(); num_multisets];
    let mut seen = vec![false; num_multisets];

    for pattern in roll_patterns.iter().flatten() {
        let idx = dense_index[pattern.code.raw() as usize] as usize;
        if seen[idx] {
            continue;
        }
        seen[idx] = true;
        table[idx] = enumerate_keep_patterns(&pattern.counts);
    }

    table
}

/// Score every 5-dice multiset in every category. Smaller multisets stay zero.
fn precompute_category_scores(multisets: &[DiceCode]) -> Vec<[i32; CATEGORY_COUNT]> {
    multisets
        .iter()
        .map(|code| {
            let mut scores = [0i32; CATEGORY_COUNT];
            if code.dice_count() == NUM_DICE {
                let counts = code.decode();
                for (cat, score) in scores.iter_mut().enumerate() {
                    *score = calculate_category_score(&counts, cat);
                }
            }
            scores
        })
        .collect()
}
