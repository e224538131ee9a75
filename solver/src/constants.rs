//! Game constants and state-indexing functions.
//!
//! - [`CATEGORY_COUNT`] = 12 (Yacht)
//! - [`NUM_DICE_SETS`] = 252 distinct 5-dice multisets
//! - [`NUM_DICE_MULTISETS`] = 462 distinct multisets of 0..=5 dice
//! - `table_index(m, C)` = m * 2^12 + C

/// Number of scoring categories in Yacht (Ones through Yacht).
pub const CATEGORY_COUNT: usize = 12;

/// Number of dice in play.
pub const NUM_DICE: usize = 5;

/// Number of faces per die.
pub const NUM_FACES: usize = 6;

/// Number of distinct 5-dice multisets from {1..6}: C(10,5) = 252.
pub const NUM_DICE_SETS: usize = 252;

/// Number of distinct multisets of 0..=5 dice from {1..6}: 1+6+21+56+126+252 = 462.
pub const NUM_DICE_MULTISETS: usize = 462;

/// Upper-sum dimension of the expected-value table (valid values 0..=63).
pub const UPPER_SUM_MAX: usize = 64;

/// Used-mask dimension of the expected-value table: 2^12.
pub const USED_MASK_MAX: usize = 1 << CATEGORY_COUNT;

/// Mask with every category used: the terminal state.
pub const ALL_USED_MASK: usize = USED_MASK_MAX - 1;

/// Total number of cells in the expected-value table.
pub const NUM_STATES: usize = UPPER_SUM_MAX * USED_MASK_MAX;

/// Upper-section total that pays the bonus. Also the cap on tracked upper sums.
pub const UPPER_BONUS_THRESHOLD: i32 = 63;

/// Flat bonus awarded once, when the upper sum first reaches the threshold.
pub const UPPER_BONUS: f64 = 35.0;

/// Table file magic number: "YCHT" read as a little-endian u32.
pub const TABLE_FILE_MAGIC: u32 = 0x5448_4359;

/// Table file format version.
pub const TABLE_FILE_VERSION: u32 = 1;

/// Category indices, used as bit positions in the used-categories mask.
pub const CATEGORY_ONES: usize = 0;
pub const CATEGORY_TWOS: usize = 1;
pub const CATEGORY_THREES: usize = 2;
pub const CATEGORY_FOURS: usize = 3;
pub const CATEGORY_FIVES: usize = 4;
pub const CATEGORY_SIXES: usize = 5;
pub const CATEGORY_FULL_HOUSE: usize = 6;
pub const CATEGORY_FOUR_OF_A_KIND: usize = 7;
pub const CATEGORY_LITTLE_STRAIGHT: usize = 8;
pub const CATEGORY_BIG_STRAIGHT: usize = 9;
pub const CATEGORY_CHOICE: usize = 10;
pub const CATEGORY_YACHT: usize = 11;

/// Human-readable category names.
pub const CATEGORY_NAMES: [&str; CATEGORY_COUNT] = [
    "Ones",
    "Twos",
    "Threes",
    "Fours",
    "Fives",
    "Sixes",
    "Full House",
    "Four of a Kind",
    "Little Straight",
    "Big Straight",
    "Choice",
    "Yacht",
];

/// Map state (upper_sum, used_mask) to its flat index in row-major `[upper_sum][used_mask]` order.
#[inline(always)]
pub fn table_index(upper_sum: usize, used_mask: usize) -> usize {
    upper_sum * USED_MASK_MAX + used_mask
}

/// Test whether category `cat` has been used (bit `cat` is set).
#[inline(always)]
pub fn is_category_used(used_mask: usize, cat: usize) -> bool {
    (used_mask & (1 << cat)) != 0
}

/// Ones through Sixes count toward the bonus threshold.
#[inline(always)]
pub fn is_upper_category(cat: usize) -> bool {
    cat < NUM_FACES
}
