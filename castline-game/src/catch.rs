//! Casts waiting for the next tick and the catches they resolve into.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::bonus::Bonus;
use crate::clock::Phase;
use crate::constants::MAX_CAST_SLOTS;
use crate::data::{EventId, FishDefinition, Rarity};
use crate::depth::DepthTier;
use crate::metrics::RolledMetrics;

/// Card indices played in one cast, `-1` marking an empty slot.
pub type CastSlots = SmallVec<[i32; MAX_CAST_SLOTS]>;

/// Identifier of a player as known to the external player store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated cast queued for the next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCast {
    pub player_id: PlayerId,
    pub cast: CastSlots,
    pub depth: DepthTier,
    pub bonuses: Vec<Bonus>,
    pub timestamp: DateTime<Utc>,
}

/// A resolved catch. Kept in the unclaimed list until the player claims it
/// and in the history forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchRecord {
    pub player_id: PlayerId,
    pub cast: CastSlots,
    pub depth: DepthTier,
    pub fish_type: String,
    pub fish_stats: FishDefinition,
    pub event: Option<EventId>,
    pub phase: Phase,
    pub hour: u8,
    pub timestamp: DateTime<Utc>,
    pub weight: Option<f64>,
    pub length: Option<f64>,
}

impl CatchRecord {
    #[must_use]
    pub fn is_junk(&self) -> bool {
        self.fish_stats.is_junk()
    }

    #[must_use]
    pub const fn metrics(&self) -> RolledMetrics {
        RolledMetrics {
            weight: self.weight,
            length: self.length,
        }
    }

    /// Short form handed to the player notifier.
    #[must_use]
    pub fn summary(&self) -> CatchSummary {
        CatchSummary {
            fish_type: self.fish_type.clone(),
            rarity: self.fish_stats.rarity.clone(),
            depth: self.depth,
            weight: self.weight,
            length: self.length,
        }
    }
}

/// What a player is told about a fresh catch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchSummary {
    pub fish_type: String,
    pub rarity: Rarity,
    pub depth: DepthTier,
    pub weight: Option<f64>,
    pub length: Option<f64>,
}

impl fmt::Display for CatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) from the {}", self.fish_type, self.rarity, self.depth)?;
        if let (Some(weight), Some(length)) = (self.weight, self.length) {
            write!(f, ", {weight:.2} kg, {length:.2} cm")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn record(rarity: &str) -> CatchRecord {
        let fish = FishDefinition::new("pike", rarity, 4.0);
        CatchRecord {
            player_id: PlayerId::from("ana"),
            cast: smallvec![3, -1, 7],
            depth: DepthTier::Shelf,
            fish_type: fish.key.clone(),
            fish_stats: fish,
            event: None,
            phase: Phase::Dusk,
            hour: 14,
            timestamp: Utc::now(),
            weight: (rarity != "junk").then_some(3.25),
            length: (rarity != "junk").then_some(61.5),
        }
    }

    #[test]
    fn summary_mentions_size_only_for_fish() {
        assert_eq!(
            record("rare").summary().to_string(),
            "pike (rare) from the shelf, 3.25 kg, 61.50 cm"
        );
        assert_eq!(record("junk").summary().to_string(), "pike (junk) from the shelf");
        assert!(record("junk").is_junk());
    }

    #[test]
    fn record_serializes_with_camel_case_and_null_metrics() {
        let json = serde_json::to_value(record("junk")).unwrap();
        assert_eq!(json["playerId"], "ana");
        assert_eq!(json["fishType"], "pike");
        assert_eq!(json["cast"], serde_json::json!([3, -1, 7]));
        assert!(json["weight"].is_null());
        assert_eq!(json["phase"], "dusk");
    }

    #[test]
    fn stored_record_reads_back_with_its_species_key() {
        let original = record("rare");
        let line = serde_json::to_string(&original).unwrap();
        let restored: CatchRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(restored.fish_stats.key, "pike");
        assert_eq!(restored, original);
    }
}
