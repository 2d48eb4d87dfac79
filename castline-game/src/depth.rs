//! Depth tiers and the fixed depth roll made at cast time.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::DEPTH_WEIGHTS;
use crate::sampler::pick_weighted;

/// Water depth a cast lands in, shallowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthTier {
    Shoals,
    Shelf,
    Dropoff,
    Canyon,
    Abyss,
}

impl DepthTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shoals => "shoals",
            Self::Shelf => "shelf",
            Self::Dropoff => "dropoff",
            Self::Canyon => "canyon",
            Self::Abyss => "abyss",
        }
    }

    /// Base weight of the tier in the depth table.
    #[must_use]
    pub fn weight(self) -> f64 {
        DEPTH_WEIGHTS
            .iter()
            .find(|(tier, _)| *tier == self)
            .map_or(0.0, |(_, weight)| *weight)
    }
}

impl fmt::Display for DepthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roll a depth tier from the fixed depth table.
pub fn pick_depth<R: Rng + ?Sized>(rng: &mut R) -> DepthTier {
    pick_weighted(DEPTH_WEIGHTS, rng).map_or(DepthTier::Shoals, |selection| selection.key)
}
