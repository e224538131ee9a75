use memmap2::Mmap;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::dice_mechanics::{DiceCode, DiceCounts};

/// One distinguishable outcome of rolling n dice, with its probability.
#[derive(Clone, Copy, Debug)]
pub struct RollPattern {
    pub code: DiceCode,
    pub counts: DiceCounts,
    pub probability: f64,
}

/// One candidate sub-multiset to keep from an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeepPattern {
    pub code: DiceCode,
    pub counts: DiceCounts,
}

/// Turn-start state S = (upper_sum, used_mask).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub upper_sum: i32,
    pub used_mask: usize,
}

impl GameState {
    pub fn new(upper_sum: i32, used_mask: usize) -> Self {
        Self {
            upper_sum,
            used_mask,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.used_mask == ALL_USED_MASK
    }
}

/// Which dice a keep decision may choose from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RerollRule {
    /// Dice kept after a roll stay kept; each decision picks from the fresh roll only.
    #[default]
    LockKept,
    /// Each decision picks any sub-multiset of kept plus freshly rolled dice.
    FreeReroll,
}

/// Solver settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    pub reroll_rule: RerollRule,
    pub show_progress: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            reroll_rule: RerollRule::LockKept,
            show_progress: false,
        }
    }
}

/// Width of each stored value in a mapped table file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueWidth {
    F32,
    F64,
}

impl ValueWidth {
    pub fn bytes(self) -> usize {
        match self {
            ValueWidth::F32 => 4,
            ValueWidth::F64 => 8,
        }
    }
}

/// State values: either owned (for computation) or memory-mapped (for loading).
pub enum StateValues {
    Owned(Vec<f64>),
    Mmap {
        mmap: Mmap,
        offset: usize,
        width: ValueWidth,
    },
}

/// The [upper_sum][used_mask] expected-value table.
///
/// Each cell holds the expected additional score from that state under optimal
/// play. Terminal cells (all categories used) are 0.
pub struct ExpectedValueTable {
    values: StateValues,
}

impl Default for ExpectedValueTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpectedValueTable {
    /// All-zero owned table. Terminal cells are already final.
    pub fn new() -> Self {
        Self {
            values: StateValues::Owned(vec![0.0; NUM_STATES]),
        }
    }

    pub fn from_values(values: StateValues) -> Self {
        Self { values }
    }

    /// Expected additional score from (upper_sum, used_mask).
    #[inline(always)]
    pub fn get(&self, upper_sum: usize, used_mask: usize) -> f64 {
        debug_assert!(upper_sum < UPPER_SUM_MAX);
        debug_assert!(used_mask < USED_MASK_MAX);
        self.get_flat(table_index(upper_sum, used_mask))
    }

    /// Expected score of a fresh game: cell (0, 0).
    pub fn initial_value(&self) -> f64 {
        self.get(0, 0)
    }

    #[inline(always)]
    fn get_flat(&self, idx: usize) -> f64 {
        match &self.values {
            StateValues::Owned(v) => v[idx],
            StateValues::Mmap {
                mmap,
                offset,
                width,
            } => {
                let start = offset + idx * width.bytes();
                match width {
                    ValueWidth::F32 => {
                        let mut b = [0u8; 4];
                        b.copy_from_slice(&mmap[start..start + 4]);
                        f32::from_le_bytes(b) as f64
                    }
                    ValueWidth::F64 => {
                        let mut b = [0u8; 8];
                        b.copy_from_slice(&mmap[start..start + 8]);
                        f64::from_le_bytes(b)
                    }
                }
            }
        }
    }

    /// All cells in [upper_sum][used_mask] row-major order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..NUM_STATES).map(move |idx| self.get_flat(idx))
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.values, StateValues::Mmap { .. })
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        match &mut self.values {
            StateValues::Owned(v) => v.as_mut_slice(),
            StateValues::Mmap { .. } => panic!("Cannot mutably access mmap'd state values"),
        }
    }
}
