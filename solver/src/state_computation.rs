//! Phase 1: Backward induction. Computes E(S) for every (upper_sum, used_mask).
//!
//! Masks are processed in strictly decreasing integer order. Scoring a category
//! sets one more bit, which always yields a larger mask, so every successor row
//! is final before the current mask is evaluated. The terminal mask (all bits
//! set) stays at 0.
//!
//! Within one mask the 64 upper sums are independent and run in parallel with
//! rayon. Results are collected and then scattered into the table, so workers
//! only ever read finished rows.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::constants::*;
use crate::phase0_tables::PatternTables;
use crate::types::{ExpectedValueTable, GameState, SolverConfig};
use crate::widget_solver::compute_expected_state_value;

/// Compute the complete expected-value table.
pub fn compute_all_state_values(
    tables: &PatternTables,
    config: &SolverConfig,
) -> ExpectedValueTable {
    compute_state_values_from(tables, config, 0)
}

/// Compute rows for every mask in `lowest_mask..ALL_USED_MASK`, leaving lower masks at 0.
///
/// The rows computed are exact: their successors all lie in the same range.
pub fn compute_state_values_from(
    tables: &PatternTables,
    config: &SolverConfig,
    lowest_mask: usize,
) -> ExpectedValueTable {
    let mut table = ExpectedValueTable::new();
    let num_masks = ALL_USED_MASK.saturating_sub(lowest_mask);

    info!(
        "Phase 1: backward induction over {} masks x {} upper sums ({:?})",
        num_masks, UPPER_SUM_MAX, config.reroll_rule
    );

    let progress = if config.show_progress {
        let pb = ProgressBar::new(num_masks as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} masks ({eta})",
        ) {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let start = Instant::now();

    for used_mask in (lowest_mask..ALL_USED_MASK).rev() {
        let row: Vec<f64> = (0..UPPER_SUM_MAX)
            .into_par_iter()
            .map(|up| {
                let state = GameState::new(up as i32, used_mask);
                compute_expected_state_value(tables, &table, config.reroll_rule, state)
            })
            .collect();

        let values = table.as_mut_slice();
        for (up, ev) in row.into_iter().enumerate() {
            values[table_index(up, used_mask)] = ev;
        }

        progress.inc(1);
        if used_mask % 512 == 0 {
            debug!(
                "mask {:#05x} done, E(0, mask) = {:.6}",
                used_mask,
                table.get(0, used_mask)
            );
        }
    }

    progress.finish_and_clear();

    let elapsed = start.elapsed().as_secs_f64();
    info!(
        "Computed {} states in {:.2} s ({:.0} states/s)",
        num_masks * UPPER_SUM_MAX,
        elapsed,
        (num_masks * UPPER_SUM_MAX) as f64 / elapsed.max(1e-9)
    );
    if lowest_mask == 0 {
        info!("Initial expected value: {:.6}", table.initial_value());
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    // Masks 0xFF0..=0xFFF leave only Ones..Fours open.
    const UPPER_ONLY_MASK: usize = 0xFF0;

    #[test]
    fn test_partial_solve_terminal_and_untouched_rows() {
        let tables = PatternTables::new();
        let table = compute_state_values_from(&tables, &SolverConfig::default(), UPPER_ONLY_MASK);
        for up in 0..UPPER_SUM_MAX {
            assert_eq!(table.get(up, ALL_USED_MASK), 0.0);
            assert_eq!(table.get(up, UPPER_ONLY_MASK - 1), 0.0);
            assert!(table.get(up, UPPER_ONLY_MASK) > 0.0);
        }
    }

    #[test]
    fn test_partial_solve_monotone_in_upper_sum() {
        let tables = PatternTables::new();
        let table = compute_state_values_from(&tables, &SolverConfig::default(), UPPER_ONLY_MASK);
        let top = UPPER_BONUS_THRESHOLD as usize;
        for mask in UPPER_ONLY_MASK..ALL_USED_MASK {
            for up in 1..top {
                assert!(
                    table.get(up, mask) >= table.get(up - 1, mask) - 1e-9,
                    "mask {:#x}: E({}) = {} < E({}) = {}",
                    mask,
                    up,
                    table.get(up, mask),
                    up - 1,
                    table.get(up - 1, mask)
                );
            }
            // At 63 the bonus is already banked, so the cell drops by at most 35.
            assert!(table.get(top, mask) < table.get(top - 1, mask));
            assert!(table.get(top, mask) + UPPER_BONUS >= table.get(top - 1, mask) - 1e-9);
        }
    }

    #[test]
    fn test_row_matches_direct_turn_evaluation() {
        let tables = PatternTables::new();
        let config = SolverConfig::default();
        let table = compute_state_values_from(&tables, &config, UPPER_ONLY_MASK);
        let mask = UPPER_ONLY_MASK | 0b0101;
        for up in [0, 30, 62, 63] {
            let direct = compute_expected_state_value(
                &tables,
                &table,
                config.reroll_rule,
                GameState::new(up, mask),
            );
            assert_eq!(direct, table.get(up as usize, mask));
        }
    }
}
