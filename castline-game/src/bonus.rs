//! Card-derived cast modifiers.
//!
//! A cast references cards by index; each referenced card expands into a
//! flat list of typed bonuses that the draw engine and the event arbiter
//! consume. Bonuses are rebuilt for every cast and never persisted.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{EMPTY_SLOT, MAX_CAST_SLOTS, NEUTRAL_MULTIPLIER};
use crate::data::{CardCatalog, CardDefinition, EventId, Rarity};
use crate::depth::DepthTier;

/// A single gameplay modifier granted by a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Bonus {
    /// Overrides the rolled depth of the cast.
    ForceDepth { depth: DepthTier },
    /// Multiplies the rate of every species.
    GlobalFishWeight { multiplier: f64 },
    /// Multiplies the rate of one species.
    FishWeight { fish_type: String, multiplier: f64 },
    /// Multiplies the rate of every species of one rarity.
    RarityWeight { rarity: Rarity, multiplier: f64 },
    /// Votes for the event that starts next tick.
    EventVote { event: EventId, votes: u32 },
    /// Flat rate added to every non-junk species.
    BaseFishRate { amount: f64 },
}

/// Treats a zero weight as "not set", the same way the card sheets do.
fn weight_is_set(weight: Option<f64>) -> Option<f64> {
    weight.filter(|value| *value != 0.0)
}

fn push_card_bonuses(card: &CardDefinition, bonuses: &mut Vec<Bonus>) {
    if let Some(depth) = card.depth_force {
        bonuses.push(Bonus::ForceDepth { depth });
    }

    if let Some(multiplier) = weight_is_set(card.fish_weight)
        && (multiplier - NEUTRAL_MULTIPLIER).abs() > f64::EPSILON
    {
        bonuses.push(Bonus::GlobalFishWeight { multiplier });
    }

    let attract_weight = weight_is_set(card.attract_weight);
    if let Some(multiplier) = attract_weight {
        bonuses.extend(card.attract_type.iter().map(|fish_type| Bonus::FishWeight {
            fish_type: fish_type.clone(),
            multiplier,
        }));
    }

    if let Some(multiplier) = attract_weight.filter(|weight| *weight > NEUTRAL_MULTIPLIER) {
        bonuses.extend(card.attract_rarity.iter().map(|rarity| Bonus::RarityWeight {
            rarity: rarity.clone(),
            multiplier,
        }));
    }

    bonuses.extend(card.force_event.iter().map(|event| Bonus::EventVote {
        event: event.clone(),
        votes: 1,
    }));
}

/// Expand cards into bonuses, card by card, in a fixed per-card order:
/// forced depth, global weight, per-type weights, per-rarity weights,
/// event votes.
#[must_use]
pub fn bonuses_from_cards<'a>(cards: impl IntoIterator<Item = &'a CardDefinition>) -> Vec<Bonus> {
    let mut bonuses = Vec::new();
    for card in cards {
        push_card_bonuses(card, &mut bonuses);
    }
    bonuses
}

/// Resolve the bonuses of a cast given as card indices.
///
/// Unknown indices and empty slots are skipped. A card referenced twice only
/// contributes its standard bonuses once, while flat base-rate bonuses are
/// taken per referenced slot and appended last.
#[must_use]
pub fn resolve_cast(catalog: &CardCatalog, cast: &[i32]) -> Vec<Bonus> {
    let mut names: SmallVec<[&str; MAX_CAST_SLOTS]> = SmallVec::new();
    for &index in cast {
        if index == EMPTY_SLOT {
            continue;
        }
        match catalog.name_for_index(index) {
            Some(name) if !names.contains(&name) => names.push(name),
            Some(_) => {}
            None => log::debug!("cast references unknown card index {index}"),
        }
    }

    let mut bonuses = bonuses_from_cards(names.iter().filter_map(|name| catalog.get(name)));

    for &index in cast {
        if let Some(amount) = catalog
            .card_at(index)
            .and_then(|card| card.base_fish_catch_rate)
        {
            bonuses.push(Bonus::BaseFishRate { amount });
        }
    }

    bonuses
}

/// First forced depth among the bonuses, if any.
#[must_use]
pub fn forced_depth(bonuses: &[Bonus]) -> Option<DepthTier> {
    bonuses.iter().find_map(|bonus| match bonus {
        Bonus::ForceDepth { depth } => Some(*depth),
        _ => None,
    })
}

/// Keep the rolled depth unless a card forces another one.
#[must_use]
pub fn apply_depth_bonuses(rolled: DepthTier, bonuses: &[Bonus]) -> DepthTier {
    forced_depth(bonuses).unwrap_or(rolled)
}

/// Event votes carried by the bonuses.
pub fn event_votes(bonuses: &[Bonus]) -> impl Iterator<Item = (&EventId, u32)> {
    bonuses.iter().filter_map(|bonus| match bonus {
        Bonus::EventVote { event, votes } => Some((event, *votes)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lure_catalog() -> CardCatalog {
        let mut golden = CardDefinition::new("golden spoon", 0);
        golden.depth_force = Some(DepthTier::Canyon);
        golden.fish_weight = Some(1.5);
        golden.attract_type = vec!["salmon".into(), "trout".into()];
        golden.attract_rarity = vec![Rarity::from("rare")];
        golden.attract_weight = Some(2.0);
        golden.force_event = vec![EventId::from("blood")];

        let mut weak = CardDefinition::new("weak jig", 1);
        weak.attract_rarity = vec![Rarity::from("legendary")];
        weak.attract_weight = Some(1.0);
        weak.fish_weight = Some(1.0);

        let mut bait = CardDefinition::new("worm tin", 2);
        bait.base_fish_catch_rate = Some(0.5);

        CardCatalog::from_cards([golden, weak, bait])
    }

    #[test]
    fn card_bonuses_follow_fixed_order() {
        let bonuses = resolve_cast(&lure_catalog(), &[0]);
        assert_eq!(
            bonuses,
            vec![
                Bonus::ForceDepth { depth: DepthTier::Canyon },
                Bonus::GlobalFishWeight { multiplier: 1.5 },
                Bonus::FishWeight { fish_type: "salmon".into(), multiplier: 2.0 },
                Bonus::FishWeight { fish_type: "trout".into(), multiplier: 2.0 },
                Bonus::RarityWeight { rarity: Rarity::from("rare"), multiplier: 2.0 },
                Bonus::EventVote { event: EventId::from("blood"), votes: 1 },
            ]
        );
    }

    #[test]
    fn neutral_weights_emit_nothing_but_type_weights() {
        let bonuses = resolve_cast(&lure_catalog(), &[1]);
        assert!(bonuses.is_empty(), "unexpected bonuses {bonuses:?}");
    }

    #[test]
    fn duplicates_and_unknown_indices_are_skipped() {
        let catalog = lure_catalog();
        let once = resolve_cast(&catalog, &[0]);
        let twice = resolve_cast(&catalog, &[0, 0, 42, EMPTY_SLOT]);
        assert_eq!(once, twice);
        assert!(resolve_cast(&catalog, &[EMPTY_SLOT, EMPTY_SLOT, EMPTY_SLOT]).is_empty());
    }

    #[test]
    fn base_rate_bonuses_are_taken_per_slot_and_appended_last() {
        let bonuses = resolve_cast(&lure_catalog(), &[2, 0, 2]);
        let tail: Vec<_> = bonuses.iter().rev().take(2).collect();
        assert!(tail.iter().all(|bonus| matches!(bonus, Bonus::BaseFishRate { amount } if (*amount - 0.5).abs() < f64::EPSILON)));
        assert_eq!(bonuses.len(), 8);
        assert!(matches!(bonuses[0], Bonus::ForceDepth { .. }));
    }

    #[test]
    fn forced_depth_overrides_roll() {
        let bonuses = resolve_cast(&lure_catalog(), &[0]);
        assert_eq!(apply_depth_bonuses(DepthTier::Shoals, &bonuses), DepthTier::Canyon);
        assert_eq!(apply_depth_bonuses(DepthTier::Shelf, &[]), DepthTier::Shelf);
    }

    #[test]
    fn event_votes_are_extracted() {
        let bonuses = resolve_cast(&lure_catalog(), &[0, 2]);
        let votes: Vec<_> = event_votes(&bonuses).collect();
        assert_eq!(votes, vec![(&EventId::from("blood"), 1)]);
    }

    #[test]
    fn bonus_serializes_with_type_tag() {
        let bonus = Bonus::FishWeight { fish_type: "salmon".into(), multiplier: 5.0 };
        let json = serde_json::to_value(&bonus).unwrap();
        assert_eq!(json["type"], "fishWeight");
        assert_eq!(json["fishType"], "salmon");
    }
}
