//! Live loop harness: a roster of simulated anglers casting into a real
//! `GameLoop` on a timer, claiming their catches between ticks.
use anyhow::{Context, Result};
use castline_game::constants::{DEPTH_WEIGHTS, MAX_CAST_SLOTS, PHASE_ORDER};
use castline_game::numbers::count_to_u64;
use castline_game::runtime::drive;
use castline_game::{
    CatalogSource, CatchRecord, CatchSummary, GameLoop, LoopConfig, PlayerHooks, PlayerId,
    TickReport,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeMap;
use thiserror::Error;

use super::files::{JsonFileSource, JsonLinesLedger};
use super::seeds::SeedInfo;
use super::{Distribution, LiveCounters, RunKind, RunReport};

pub const DECK_SIZE: usize = 20;
pub const HAND_SIZE: usize = 3;

/// Domain tag mixed into the roster seed so hands differ from engine streams.
const ROSTER_SALT: u64 = 0x0A11_6E12;

type LiveLoop = GameLoop<JsonFileSource, JsonLinesLedger, Roster>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("player {0} is not on the roster")]
    UnknownPlayer(PlayerId),
}

#[derive(Debug, Clone, Default)]
pub struct Angler {
    pub deck: Vec<i32>,
    pub hand: Vec<i32>,
    pub casts: u64,
    pub last_catch: Option<CatchSummary>,
}

/// Simulated player store: decks, hands and catch notifications.
#[derive(Debug)]
pub struct Roster {
    anglers: BTreeMap<PlayerId, Angler>,
    card_indices: Vec<i32>,
    rng: ChaCha20Rng,
    pub deck_resets: u64,
    pub notifications: u64,
}

fn random_deck<R: Rng + ?Sized>(indices: &[i32], size: usize, rng: &mut R) -> Vec<i32> {
    (0..size)
        .filter_map(|_| indices.choose(rng).copied())
        .collect()
}

fn refill_hand(angler: &mut Angler) {
    while angler.hand.len() < HAND_SIZE {
        let Some(card) = angler.deck.pop() else {
            break;
        };
        angler.hand.push(card);
    }
}

impl Roster {
    #[must_use]
    pub fn new(players: usize, card_indices: Vec<i32>, seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed ^ ROSTER_SALT);
        let anglers = (1..=players)
            .map(|n| {
                let mut angler = Angler {
                    deck: random_deck(&card_indices, DECK_SIZE, &mut rng),
                    ..Angler::default()
                };
                refill_hand(&mut angler);
                (PlayerId::new(format!("angler-{n:02}")), angler)
            })
            .collect();
        Self {
            anglers,
            card_indices,
            rng,
            deck_resets: 0,
            notifications: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.anglers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anglers.is_empty()
    }

    #[must_use]
    pub fn angler(&self, player: &PlayerId) -> Option<&Angler> {
        self.anglers.get(player)
    }

    /// One cast per angler holding cards: between one and three cards from
    /// the hand, paired with the hand they were taken from.
    pub fn plan_casts(&mut self) -> Vec<(PlayerId, Vec<i32>, Vec<i32>)> {
        let mut plans = Vec::new();
        for (player, angler) in &self.anglers {
            if angler.hand.is_empty() {
                continue;
            }
            let count = self.rng.gen_range(1..=angler.hand.len().min(MAX_CAST_SLOTS));
            let cast: Vec<i32> = angler
                .hand
                .choose_multiple(&mut self.rng, count)
                .copied()
                .collect();
            plans.push((player.clone(), cast, angler.hand.clone()));
        }
        plans
    }

    /// Take the played cards out of the angler's hand.
    pub fn mark_played(&mut self, player: &PlayerId, cast: &[i32]) {
        let Some(angler) = self.anglers.get_mut(player) else {
            return;
        };
        for index in cast {
            if let Some(position) = angler.hand.iter().position(|held| held == index) {
                angler.hand.remove(position);
            }
        }
        angler.casts += 1;
    }
}

impl PlayerHooks for Roster {
    type Error = RosterError;

    fn notify_catch(&mut self, player: &PlayerId, summary: &CatchSummary) -> Result<(), Self::Error> {
        let angler = self
            .anglers
            .get_mut(player)
            .ok_or_else(|| RosterError::UnknownPlayer(player.clone()))?;
        angler.last_catch = Some(summary.clone());
        self.notifications += 1;
        Ok(())
    }

    fn reset_all_decks(&mut self) -> Result<(), Self::Error> {
        for angler in self.anglers.values_mut() {
            angler.deck = random_deck(&self.card_indices, DECK_SIZE, &mut self.rng);
            angler.hand.clear();
            refill_hand(angler);
        }
        self.deck_resets += 1;
        Ok(())
    }

    fn on_claim(&mut self, player: &PlayerId, _record: &CatchRecord) -> Result<(), Self::Error> {
        let angler = self
            .anglers
            .get_mut(player)
            .ok_or_else(|| RosterError::UnknownPlayer(player.clone()))?;
        angler.last_catch = None;
        refill_hand(angler);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveOptions {
    pub ticks: u64,
    pub players: usize,
    pub sample_size: usize,
    pub interval_ms: u64,
}

#[derive(Debug, Default)]
struct CastCounters {
    submitted: u64,
    refused: u64,
    claims: u64,
}

fn claim_everything(game: &mut LiveLoop, counters: &mut CastCounters) {
    for record in game.desk().unclaimed() {
        if game.claim_catch(&record.player_id).is_ok() {
            counters.claims += 1;
        }
    }
}

fn cast_everyone(game: &mut LiveLoop, counters: &mut CastCounters) {
    let plans = game.hooks_mut().plan_casts();
    for (player, cast, hand) in plans {
        match game.submit_cast(&player, &cast, &hand) {
            Ok(_) => {
                game.hooks_mut().mark_played(&player, &cast);
                counters.submitted += 1;
            }
            Err(err) => {
                log::warn!("cast refused: {err}");
                counters.refused += 1;
            }
        }
    }
}

fn distributions(reports: &[TickReport]) -> Vec<Distribution> {
    let mut phases = Distribution::new("phase").with_keys(PHASE_ORDER.map(|p| p.as_str()));
    let mut depths = Distribution::new("depth").with_keys(DEPTH_WEIGHTS.map(|(d, _)| d.as_str()));
    let mut events = Distribution::new("event");
    let mut species = Distribution::new("fish");
    for report in reports {
        events.record(report.event.as_ref().map_or("none", |event| event.as_str()));
        for record in &report.catches {
            phases.record(record.phase.as_str());
            depths.record(record.depth.as_str());
            species.record(&record.fish_type);
        }
    }
    vec![phases, depths, events, species]
}

/// Run the live loop for `options.ticks` ticks with one roster per seed.
///
/// # Errors
///
/// Returns an error if the options are out of bounds or the catalogs cannot
/// be read before the first tick.
pub async fn run_live(
    source: JsonFileSource,
    ledger: JsonLinesLedger,
    seed: &SeedInfo,
    options: LiveOptions,
) -> Result<RunReport> {
    let started_at = Utc::now();
    let config = LoopConfig {
        sample_size: options.sample_size,
        tick_interval_ms: options.interval_ms,
        ..LoopConfig::default_config().with_seed(seed.seed)
    };
    config.validate().context("invalid loop settings")?;

    let cards = source
        .load_card_catalog()
        .context("reading card catalog for the roster")?;
    let roster = Roster::new(options.players, cards.indices(), seed.seed);
    let mut game: LiveLoop = GameLoop::new(config, source, ledger, roster);
    let (species, card_count) = game.preflight()?;
    log::info!(
        "live loop: {} anglers, {species} species, {card_count} cards, seed {}",
        options.players,
        seed.seed
    );

    let mut counters = CastCounters::default();
    let reports = drive(&mut game, options.ticks, |game: &mut LiveLoop| {
        claim_everything(game, &mut counters);
        cast_everyone(game, &mut counters);
    })
    .await;
    claim_everything(&mut game, &mut counters);

    let catches: u64 = reports.iter().map(|r| count_to_u64(r.catches.len())).sum();
    let dropped: u64 = reports.iter().map(|r| count_to_u64(r.dropped.len())).sum();
    let junk = count_to_u64(
        reports
            .iter()
            .flat_map(|r| &r.catches)
            .filter(|record| record.is_junk())
            .count(),
    );

    Ok(RunReport {
        kind: RunKind::Loop,
        seed: seed.seed,
        seed_token: seed.token.clone(),
        started_at,
        casts: counters.submitted,
        catches,
        dropped,
        junk,
        live: Some(LiveCounters {
            ticks: game.ticks(),
            players: game.hooks().len(),
            refused: counters.refused,
            claims: counters.claims,
            deck_resets: game.hooks().deck_resets,
            day_wraps: count_to_u64(reports.iter().filter(|r| r.wrapped).count()),
            final_hour: game.hour(),
            final_event: game.current_event().map(|event| event.as_str().to_string()),
        }),
        distributions: distributions(&reports),
    })
}
