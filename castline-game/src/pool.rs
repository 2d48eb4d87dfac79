//! Shared catch pool materialized once per tick.
//!
//! The eligible population is sampled `sample_size` times with replacement.
//! The resulting multiset is stored aggregated: one entry per species with
//! the number of instances drawn for it. Every instance carries unit weight,
//! so a species' share of the pool is its base rate share of the population.
use rand::Rng;

use crate::clock::Phase;
use crate::data::{EventId, FishCatalog, FishDefinition};
use crate::eligibility::is_active;
use crate::numbers::share;
use crate::sampler::WeightedTable;

/// Instances of one species in the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolEntry<'a> {
    pub fish: &'a FishDefinition,
    pub count: usize,
}

impl PoolEntry<'_> {
    #[must_use]
    pub fn species(&self) -> &str {
        &self.fish.key
    }
}

/// Pool shared by every cast resolved in one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchPool<'a> {
    entries: Vec<PoolEntry<'a>>,
    size: usize,
    phase: Phase,
    event: Option<EventId>,
}

impl<'a> CatchPool<'a> {
    /// Pool with no instances; every draw from it yields no catch.
    #[must_use]
    pub const fn empty(phase: Phase, event: Option<EventId>) -> Self {
        Self {
            entries: Vec::new(),
            size: 0,
            phase,
            event,
        }
    }

    /// Build a pool from explicit per-species counts. Zero counts are dropped.
    #[must_use]
    pub fn from_counts(
        phase: Phase,
        event: Option<EventId>,
        counts: impl IntoIterator<Item = (&'a FishDefinition, usize)>,
    ) -> Self {
        let entries: Vec<PoolEntry<'a>> = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(fish, count)| PoolEntry { fish, count })
            .collect();
        let size = entries.iter().map(|entry| entry.count).sum();
        Self {
            entries,
            size,
            phase,
            event,
        }
    }

    /// Number of fish instances in the pool.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[must_use]
    pub fn entries(&self) -> &[PoolEntry<'a>] {
        &self.entries
    }

    /// Instances of `species` in the pool.
    #[must_use]
    pub fn count(&self, species: &str) -> usize {
        self.entries
            .iter()
            .find(|entry| entry.species() == species)
            .map_or(0, |entry| entry.count)
    }

    /// Fraction of the pool taken by `species`.
    #[must_use]
    pub fn share_of(&self, species: &str) -> f64 {
        share(self.count(species), self.size)
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn event(&self) -> Option<&EventId> {
        self.event.as_ref()
    }
}

/// Effective population rate of a species under `event`.
#[must_use]
pub fn effective_rate(fish: &FishDefinition, event: Option<&EventId>) -> f64 {
    fish.base_catch_rate * fish.event_multiplier(event)
}

/// Sample the shared pool for `phase` and `event`.
///
/// Species that are not active are excluded before sampling. An empty
/// population yields an empty pool, which is logged.
pub fn build_pool<'a, R: Rng + ?Sized>(
    catalog: &'a FishCatalog,
    phase: Phase,
    event: Option<&EventId>,
    sample_size: usize,
    rng: &mut R,
) -> CatchPool<'a> {
    let eligible: Vec<&'a FishDefinition> = catalog
        .iter()
        .filter(|fish| is_active(fish, phase, event))
        .collect();
    let population = WeightedTable::new(
        eligible
            .iter()
            .enumerate()
            .map(|(slot, fish)| (slot, effective_rate(fish, event))),
    );

    if population.is_empty() {
        log::warn!(
            "no fish can bite during {phase} (event: {}); pool is empty",
            event.map_or("none", EventId::as_str)
        );
        return CatchPool::empty(phase, event.cloned());
    }

    let mut counts = vec![0_usize; eligible.len()];
    for _ in 0..sample_size {
        if let Some(pick) = population.pick(rng) {
            counts[*pick.key] += 1;
        }
    }

    let pool = CatchPool::from_counts(phase, event.cloned(), eligible.into_iter().zip(counts));
    log::debug!(
        "built pool of {} instances over {} species for {phase}",
        pool.len(),
        pool.entries().len()
    );
    pool
}
