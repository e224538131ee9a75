//! Dice multisets and their packed integer encoding.
//!
//! A multiset is stored as face counts: `counts[0]` is the number of ones,
//! `counts[5]` the number of sixes. [`DiceCode`] packs the six counts into
//! 3-bit fields. Counts and totals never exceed 5, so adding two codes whose
//! multisets hold at most 5 dice together never carries between fields and
//! equals the code of the elementwise sum.

use crate::constants::*;

/// Face counts for faces 1..=6.
pub type DiceCounts = [u8; NUM_FACES];

const FIELD_BITS: u32 = 3;
const FIELD_MASK: u32 = 0b111;

/// Number of distinct code values: 6 fields × 3 bits.
pub const DICE_CODE_SPACE: usize = 1 << (FIELD_BITS as usize * NUM_FACES);

/// Packed, hashable key for a dice multiset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiceCode(u32);

impl DiceCode {
    /// The empty multiset (no dice).
    pub const EMPTY: DiceCode = DiceCode(0);

    #[inline(always)]
    pub fn encode(counts: &DiceCounts) -> Self {
        let mut code = 0u32;
        for (face, &c) in counts.iter().enumerate() {
            code |= (c as u32) << (FIELD_BITS * face as u32);
        }
        DiceCode(code)
    }

    #[inline(always)]
    pub fn decode(self) -> DiceCounts {
        let mut counts = [0u8; NUM_FACES];
        for (face, c) in counts.iter_mut().enumerate() {
            *c = ((self.0 >> (FIELD_BITS * face as u32)) & FIELD_MASK) as u8;
        }
        counts
    }

    /// Number of dice in the multiset.
    #[inline(always)]
    pub fn dice_count(self) -> usize {
        let mut total = 0;
        let mut rest = self.0;
        while rest != 0 {
            total += (rest & FIELD_MASK) as usize;
            rest >>= FIELD_BITS;
        }
        total
    }

    /// Elementwise sum. Callers keep the combined total at or below [`NUM_DICE`].
    #[inline(always)]
    pub fn add(self, other: DiceCode) -> DiceCode {
        debug_assert!(self.dice_count() + other.dice_count() <= NUM_DICE);
        DiceCode(self.0 + other.0)
    }

    #[inline(always)]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Number of dice in a count vector.
#[inline]
pub fn count_dice(counts: &DiceCounts) -> usize {
    counts.iter().map(|&c| c as usize).sum()
}

/// Sum of pips: Σ count × face value.
#[inline]
pub fn total_pips(counts: &DiceCounts) -> i32 {
    counts
        .iter()
        .enumerate()
        .map(|(face, &c)| c as i32 * (face as i32 + 1))
        .sum()
}

/// Elementwise sum of two count vectors.
#[inline]
pub fn add_counts(a: &DiceCounts, b: &DiceCounts) -> DiceCounts {
    let mut sum = *a;
    for (s, &x) in sum.iter_mut().zip(b.iter()) {
        *s += x;
    }
    sum
}

/// True if `sub` keeps no more of any face than `of` holds.
#[inline]
pub fn is_sub_multiset(sub: &DiceCounts, of: &DiceCounts) -> bool {
    sub.iter().zip(of.iter()).all(|(&s, &o)| s <= o)
}

/// Convert face values (1..=6) to counts. Values outside 1..=6 are ignored.
pub fn dice_to_counts(dice: &[u8]) -> DiceCounts {
    let mut counts = [0u8; NUM_FACES];
    for &d in dice {
        if (1..=NUM_FACES as u8).contains(&d) {
            counts[(d - 1) as usize] += 1;
        }
    }
    counts
}

/// Multinomial coefficient n! / (c1! · ... · c6!) for n = Σ ci ≤ 5.
pub fn multinomial(counts: &DiceCounts) -> u32 {
    const FACTORIAL: [u32; NUM_DICE + 1] = [1, 1, 2, 6, 24, 120];
    let n = count_dice(counts);
    let denominator: u32 = counts.iter().map(|&c| FACTORIAL[c as usize]).product();
    FACTORIAL[n] / denominator
}
