//! Independent-cast simulation: every cast gets a random phase and three
//! random cards, votes on its own event and draws from its own pool.
use castline_game::constants::{DEPTH_WEIGHTS, EMPTY_SLOT, MAX_CAST_SLOTS, PHASE_ORDER};
use castline_game::{
    CardCatalog, DrawOutcome, FishCatalog, RngBundle, apply_depth_bonuses, build_pool,
    choose_next_event, draw, pick_depth, resolve_cast,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::seeds::SeedInfo;
use super::{Distribution, RunKind, RunReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationOptions {
    pub casts: u64,
    pub sample_size: usize,
}

/// Draw a full hand of random card indices; empty slots when there are no
/// cards at all.
fn random_cast<R: Rng + ?Sized>(indices: &[i32], rng: &mut R) -> Vec<i32> {
    (0..MAX_CAST_SLOTS)
        .map(|_| indices.choose(rng).copied().unwrap_or(EMPTY_SLOT))
        .collect()
}

#[must_use]
pub fn run_simulation(
    fish: &FishCatalog,
    cards: &CardCatalog,
    seed: &SeedInfo,
    options: SimulationOptions,
) -> RunReport {
    let started_at = Utc::now();
    let mut streams = RngBundle::from_user_seed(seed.seed);
    let mut hands = ChaCha20Rng::seed_from_u64(seed.seed);
    let indices = cards.indices();

    let mut phases = Distribution::new("phase").with_keys(PHASE_ORDER.map(|p| p.as_str()));
    let mut depths = Distribution::new("depth").with_keys(DEPTH_WEIGHTS.map(|(d, _)| d.as_str()));
    let mut events = Distribution::new("event");
    let mut species = Distribution::new("fish").with_keys(fish.iter().map(|f| f.key.clone()));
    let mut catches = 0_u64;
    let mut dropped = 0_u64;
    let mut junk = 0_u64;

    for _ in 0..options.casts {
        let phase = PHASE_ORDER[hands.gen_range(0..PHASE_ORDER.len())];
        phases.record(phase.as_str());

        let cast = random_cast(&indices, &mut hands);
        let bonuses = resolve_cast(cards, &cast);

        let depth = apply_depth_bonuses(pick_depth(streams.depth()), &bonuses);
        depths.record(depth.as_str());

        let event = choose_next_event([bonuses.as_slice()], streams.event());
        if let Some(event) = &event {
            events.record(event.as_str());
        }

        let pool = build_pool(
            fish,
            phase,
            event.as_ref(),
            options.sample_size,
            streams.pool(),
        );
        let (draw_rng, metrics_rng) = streams.draw_streams();
        match draw(&pool, &bonuses, draw_rng, metrics_rng) {
            DrawOutcome::Caught(caught) => {
                catches += 1;
                if caught.fish.is_junk() {
                    junk += 1;
                }
                species.record(&caught.fish.key);
            }
            DrawOutcome::NoCatch => dropped += 1,
        }
    }

    log::debug!(
        "simulated {} casts for seed {} using {} random draws",
        options.casts,
        seed.seed,
        streams.total_draws()
    );

    RunReport {
        kind: RunKind::Simulate,
        seed: seed.seed,
        seed_token: seed.token.clone(),
        started_at,
        casts: options.casts,
        catches,
        dropped,
        junk,
        live: None,
        distributions: vec![phases, depths, events, species],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use castline_game::default_catalog;

    fn options(casts: u64) -> SimulationOptions {
        SimulationOptions {
            casts,
            sample_size: 300,
        }
    }

    #[test]
    fn every_cast_is_counted_once() {
        let (fish, cards) = default_catalog().unwrap();
        let report = run_simulation(&fish, &cards, &SeedInfo::from_numeric(7), options(400));
        assert_eq!(report.casts, 400);
        assert_eq!(report.catches + report.dropped, 400);
        assert_eq!(report.distribution("phase").unwrap().total, 400);
        assert_eq!(report.distribution("depth").unwrap().total, 400);
        assert_eq!(report.distribution("fish").unwrap().total, report.catches);
        assert!(report.junk <= report.catches);
        assert!(report.distribution("event").unwrap().total <= 400);
    }

    #[test]
    fn same_seed_same_distributions() {
        let (fish, cards) = default_catalog().unwrap();
        let seed = SeedInfo::from_numeric(99);
        let first = run_simulation(&fish, &cards, &seed, options(200));
        let second = run_simulation(&fish, &cards, &seed, options(200));
        assert_eq!(first.distributions, second.distributions);
    }

    #[test]
    fn shallow_water_dominates_the_depth_roll() {
        let (fish, cards) = default_catalog().unwrap();
        let report = run_simulation(&fish, &cards, &SeedInfo::from_numeric(3), options(2_000));
        let depths = report.distribution("depth").unwrap();
        assert!(depths.count("shoals") > depths.count("shelf"));
        assert!(depths.count("shelf") > depths.count("canyon"));
    }

    #[test]
    fn no_cards_means_no_votes() {
        let (fish, _) = default_catalog().unwrap();
        let report = run_simulation(
            &fish,
            &CardCatalog::default(),
            &SeedInfo::from_numeric(1),
            options(50),
        );
        assert_eq!(report.distribution("event").unwrap().total, 0);
        assert_eq!(report.catches, 50);
    }
}
