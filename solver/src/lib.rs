//! # Yacht: Optimal Expected-Value Table
//!
//! Computes, by **backward induction**, the expected final score of optimal
//! play for every state of five-dice Yacht (12 categories, three rolls per
//! turn, 35-point bonus at 63 upper-section points).
//!
//! | Phase | Rust module | Description |
//! |-------|-------------|-------------|
//! | 0 | [`phase0_tables`] | Roll patterns per dice count, keep patterns per outcome, category scores |
//! | 1 | [`state_computation`] | Masks in decreasing order, 64 upper sums per mask, via [`widget_solver`] |
//! | - | [`storage`] | Save/load the finished table |
//! | - | [`api_computations`] | Read-only decision queries over a finished table |
//!
//! ## State representation
//!
//! A game state S = (m, C) where:
//! - `m` ∈ [0, 63]: upper-section sum, capped at the bonus threshold
//! - `C`: 12-bit mask of used categories (Ones = bit 0 .. Yacht = bit 11)
//!
//! Flat index: `table_index(m, C) = m * 4096 + C`, 262,144 cells.
//!
//! Each turn is solved forward from the empty kept multiset through three
//! rolls and a category choice, memoized per turn by (stage, kept dice).

#![allow(clippy::needless_range_loop)]

pub mod api_computations;
pub mod constants;
pub mod dice_mechanics;
pub mod env_config;
pub mod game_mechanics;
pub mod phase0_tables;
pub mod state_computation;
pub mod storage;
pub mod types;
pub mod widget_solver;
