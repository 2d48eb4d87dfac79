//! Personal draw: re-weight the shared pool with one cast's bonuses and pick
//! a single catch.
use rand::Rng;

use crate::bonus::Bonus;
use crate::constants::NEUTRAL_MULTIPLIER;
use crate::data::FishDefinition;
use crate::metrics::{RolledMetrics, roll_metrics};
use crate::numbers::count_to_f64;
use crate::pool::CatchPool;
use crate::sampler::pick_weighted;

/// Personalized weight of one species in the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalWeight<'a> {
    pub fish: &'a FishDefinition,
    pub weight: f64,
}

/// Species and size chosen for a cast.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchDraw<'a> {
    pub fish: &'a FishDefinition,
    pub metrics: RolledMetrics,
}

/// Result of a personal draw. `NoCatch` means the personalized pool had no
/// positive weight and the cast is dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome<'a> {
    Caught(CatchDraw<'a>),
    NoCatch,
}

impl<'a> DrawOutcome<'a> {
    #[must_use]
    pub const fn is_catch(&self) -> bool {
        matches!(self, Self::Caught(_))
    }

    #[must_use]
    pub fn into_catch(self) -> Option<CatchDraw<'a>> {
        match self {
            Self::Caught(draw) => Some(draw),
            Self::NoCatch => None,
        }
    }
}

#[derive(Debug, Default)]
struct Modifiers<'b> {
    global: f64,
    by_type: Vec<(&'b str, f64)>,
    by_rarity: Vec<(&'b str, f64)>,
    base_rate: Option<f64>,
}

impl<'b> Modifiers<'b> {
    fn collect(bonuses: &'b [Bonus]) -> Self {
        let mut modifiers = Self {
            global: NEUTRAL_MULTIPLIER,
            ..Self::default()
        };
        for bonus in bonuses {
            match bonus {
                Bonus::GlobalFishWeight { multiplier } => modifiers.global *= multiplier,
                Bonus::FishWeight {
                    fish_type,
                    multiplier,
                } => modifiers.by_type.push((fish_type.as_str(), *multiplier)),
                Bonus::RarityWeight { rarity, multiplier } => {
                    modifiers.by_rarity.push((rarity.as_str(), *multiplier));
                }
                Bonus::BaseFishRate { amount } => {
                    if modifiers.base_rate.is_none() {
                        modifiers.base_rate = Some(*amount);
                    }
                }
                Bonus::ForceDepth { .. } | Bonus::EventVote { .. } => {}
            }
        }
        modifiers
    }

    fn product(targets: &[(&str, f64)], key: &str) -> f64 {
        targets
            .iter()
            .filter(|(target, _)| *target == key)
            .map(|(_, multiplier)| multiplier)
            .product()
    }

    /// Rate of a single pool instance of `fish`.
    fn instance_rate(&self, fish: &FishDefinition) -> f64 {
        let mut rate = NEUTRAL_MULTIPLIER * self.global;
        rate *= Self::product(&self.by_type, &fish.key);
        rate *= Self::product(&self.by_rarity, fish.rarity.as_str());
        if let Some(amount) = self.base_rate
            && !fish.is_junk()
        {
            rate += amount;
        }
        rate
    }
}

/// Apply a cast's bonuses to the pool: global multipliers, then per-species
/// multipliers, then per-rarity multipliers, then the first flat base-rate
/// bonus added to every non-junk instance.
#[must_use]
pub fn personal_weights<'a>(pool: &CatchPool<'a>, bonuses: &[Bonus]) -> Vec<PersonalWeight<'a>> {
    let modifiers = Modifiers::collect(bonuses);
    pool.entries()
        .iter()
        .map(|entry| PersonalWeight {
            fish: entry.fish,
            weight: count_to_f64(entry.count) * modifiers.instance_rate(entry.fish),
        })
        .collect()
}

/// Pick one species from the personalized pool and roll its size.
pub fn draw<'a, D, M>(
    pool: &CatchPool<'a>,
    bonuses: &[Bonus],
    draw_rng: &mut D,
    metrics_rng: &mut M,
) -> DrawOutcome<'a>
where
    D: Rng + ?Sized,
    M: Rng + ?Sized,
{
    let weights = personal_weights(pool, bonuses);
    let Some(selection) = pick_weighted(
        weights.into_iter().map(|entry| (entry.fish, entry.weight)),
        draw_rng,
    ) else {
        return DrawOutcome::NoCatch;
    };
    let fish = selection.key;
    DrawOutcome::Caught(CatchDraw {
        fish,
        metrics: roll_metrics(fish, metrics_rng),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Phase;
    use crate::data::Rarity;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn salmon() -> FishDefinition {
        let mut fish = FishDefinition::new("salmon", "common", 10.0);
        fish.min_weight = 2.0;
        fish.max_weight = 6.0;
        fish.min_length = 40.0;
        fish.max_length = 80.0;
        fish
    }

    fn boot() -> FishDefinition {
        FishDefinition::new("boot", "junk", 5.0)
    }

    fn weight_of(weights: &[PersonalWeight<'_>], species: &str) -> f64 {
        weights
            .iter()
            .find(|entry| entry.fish.key == species)
            .map_or(0.0, |entry| entry.weight)
    }

    #[test]
    fn bonuses_compose_multiply_then_add() {
        let salmon = salmon();
        let boot = boot();
        let pool = CatchPool::from_counts(Phase::Day, None, [(&salmon, 4), (&boot, 2)]);
        let bonuses = vec![
            Bonus::GlobalFishWeight { multiplier: 2.0 },
            Bonus::FishWeight { fish_type: "salmon".into(), multiplier: 3.0 },
            Bonus::RarityWeight { rarity: Rarity::from("common"), multiplier: 1.5 },
            Bonus::FishWeight { fish_type: "salmon".into(), multiplier: 2.0 },
            Bonus::BaseFishRate { amount: 0.5 },
            Bonus::BaseFishRate { amount: 100.0 },
        ];
        let weights = personal_weights(&pool, &bonuses);
        // 4 * (2 * 3 * 2 * 1.5 + 0.5)
        assert!((weight_of(&weights, "salmon") - 74.0).abs() < 1e-9);
        // junk only takes the global multiplier
        assert!((weight_of(&weights, "boot") - 4.0).abs() < 1e-9);
    }

    #[test]
    fn fish_weight_bonus_shifts_draw_frequency() {
        let salmon = salmon();
        let boot = boot();
        let pool = CatchPool::from_counts(Phase::Day, None, [(&salmon, 10), (&boot, 5)]);
        let lure = [Bonus::FishWeight { fish_type: "salmon".into(), multiplier: 5.0 }];
        let mut draw_rng = ChaCha20Rng::seed_from_u64(21);
        let mut metrics_rng = ChaCha20Rng::seed_from_u64(22);
        let trials = 20_000;

        let mut share = |bonuses: &[Bonus]| {
            let hits = (0..trials)
                .filter(|_| {
                    draw(&pool, bonuses, &mut draw_rng, &mut metrics_rng)
                        .into_catch()
                        .is_some_and(|caught| caught.fish.key == "salmon")
                })
                .count();
            hits as f64 / f64::from(trials)
        };

        let plain = share(&[]);
        let lured = share(&lure);
        assert!((plain - 10.0 / 15.0).abs() < 0.015, "plain share {plain}");
        assert!((lured - 50.0 / 55.0).abs() < 0.01, "lured share {lured}");
    }

    #[test]
    fn overflowing_lure_still_favours_its_species() {
        let salmon = salmon();
        let boot = boot();
        let pool = CatchPool::from_counts(Phase::Day, None, [(&salmon, 10), (&boot, 5)]);
        let lure = [Bonus::FishWeight { fish_type: "salmon".into(), multiplier: 1e308 }];
        let weights = personal_weights(&pool, &lure);
        assert!(weight_of(&weights, "salmon").is_infinite());

        let mut draw_rng = ChaCha20Rng::seed_from_u64(23);
        let mut metrics_rng = ChaCha20Rng::seed_from_u64(24);
        for _ in 0..200 {
            let caught = draw(&pool, &lure, &mut draw_rng, &mut metrics_rng)
                .into_catch()
                .unwrap();
            assert_eq!(caught.fish.key, "salmon");
        }
    }

    #[test]
    fn junk_catch_has_no_metrics() {
        let boot = boot();
        let pool = CatchPool::from_counts(Phase::Day, None, [(&boot, 3)]);
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let mut metrics_rng = ChaCha20Rng::seed_from_u64(5);
        let caught = draw(&pool, &[], &mut rng, &mut metrics_rng)
            .into_catch()
            .unwrap();
        assert_eq!(caught.fish.key, "boot");
        assert_eq!(caught.metrics, RolledMetrics::default());
    }

    #[test]
    fn zero_weight_pool_is_no_catch() {
        let salmon = salmon();
        let pool = CatchPool::from_counts(Phase::Day, None, [(&salmon, 9)]);
        let nullify = [Bonus::GlobalFishWeight { multiplier: 0.0 }];
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let mut metrics_rng = ChaCha20Rng::seed_from_u64(7);
        assert_eq!(draw(&pool, &nullify, &mut rng, &mut metrics_rng), DrawOutcome::NoCatch);

        let empty = CatchPool::empty(Phase::Day, None);
        assert!(!draw(&empty, &[], &mut rng, &mut metrics_rng).is_catch());
    }
}
