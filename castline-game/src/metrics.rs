//! Weight and length rolls for a caught fish.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::FishDefinition;
use crate::numbers::round_hundredths;

/// Rolled size of a catch. Junk has neither weight nor length.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RolledMetrics {
    pub weight: Option<f64>,
    pub length: Option<f64>,
}

fn roll_range<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    // Spans that overflow f64 cannot be sampled uniformly.
    if high <= low || !(high - low).is_finite() {
        return low;
    }
    // Rounding reaches `high`; the raw roll stays half-open.
    round_hundredths(rng.gen_range(low..high)).clamp(low, high)
}

/// Roll weight and length uniformly within the species' ranges, rounded to
/// two decimals.
pub fn roll_metrics<R: Rng + ?Sized>(fish: &FishDefinition, rng: &mut R) -> RolledMetrics {
    if fish.is_junk() {
        return RolledMetrics::default();
    }
    let weight = roll_range(fish.min_weight, fish.max_weight, rng);
    let length = roll_range(fish.min_length, fish.max_length, rng);
    RolledMetrics {
        weight: Some(weight),
        length: Some(length),
    }
}
