//! Centralized balance and tuning constants for the catch engine.
//!
//! Depth odds and the shape of the in-game day are fixed here so that
//! balance changes go through code review rather than static data edits.

use crate::clock::Phase;
use crate::depth::DepthTier;

// Day layout ---------------------------------------------------------------
pub const HOURS_PER_DAY: u8 = 24;
pub const HOURS_PER_PHASE: u8 = 6;
pub const PHASE_ORDER: [Phase; 4] = [Phase::Dawn, Phase::Day, Phase::Dusk, Phase::Night];

// Depth odds ---------------------------------------------------------------
pub const DEPTH_WEIGHTS: [(DepthTier, f64); 5] = [
    (DepthTier::Shoals, 80.0),
    (DepthTier::Shelf, 50.0),
    (DepthTier::Dropoff, 20.0),
    (DepthTier::Canyon, 5.0),
    (DepthTier::Abyss, 0.1),
];

// Pool and casts -----------------------------------------------------------
pub const DEFAULT_SAMPLE_SIZE: usize = 900;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 25_000;
pub const MAX_CAST_SLOTS: usize = 3;
pub const EMPTY_SLOT: i32 = -1;
pub(crate) const NEUTRAL_MULTIPLIER: f64 = 1.0;
pub(crate) const JUNK_RARITY: &str = "junk";
