//! The per-tick orchestrator.
//!
//! One tick, in order: snapshot the phase and the event already in effect,
//! drain the cast queue, tally votes for the next event, build the shared
//! pool, resolve every drained cast, promote the voted event, advance the
//! clock. Collaborator failures are logged and never stop a tick.
use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::catch::{CatchRecord, PendingCast, PlayerId};
use crate::clock::{GameClock, Phase};
use crate::constants::{DEFAULT_SAMPLE_SIZE, DEFAULT_TICK_INTERVAL_MS, HOURS_PER_DAY};
use crate::data::{CardCatalog, EventId, FishCatalog};
use crate::desk::{CastDesk, CastError, ClaimError};
use crate::draw::{DrawOutcome, draw};
use crate::event::choose_next_event;
use crate::pool::build_pool;
use crate::rng::RngBundle;
use crate::{CatalogSource, CatchLedger, PlayerHooks};

/// Tunables of the game loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Fish instances materialized into the shared pool each tick.
    pub sample_size: usize,
    /// Hour the clock starts at.
    pub start_hour: u8,
    /// Wall-clock spacing of ticks for timer-driven runners.
    pub tick_interval_ms: u64,
    /// User seed for every random stream; fresh entropy when absent.
    pub seed: Option<u64>,
}

/// Errors raised when loop configuration is out of bounds.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoopConfigError {
    #[error("JSON parse error: {0}")]
    Parse(String),
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("start_hour must be below {max} (got {0})", max = HOURS_PER_DAY)]
    StartHour(u8),
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            start_hour: 0,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            seed: None,
        }
    }
}

impl LoopConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns `LoopConfigError` when the JSON is malformed or a field is out
    /// of bounds.
    pub fn from_json(json_str: &str) -> Result<Self, LoopConfigError> {
        let config: Self =
            serde_json::from_str(json_str).map_err(|e| LoopConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `LoopConfigError` when any field violates its bounds.
    pub fn validate(&self) -> Result<(), LoopConfigError> {
        if self.sample_size == 0 {
            return Err(LoopConfigError::MinViolation {
                field: "sample_size",
                min: 1,
                value: 0,
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(LoopConfigError::MinViolation {
                field: "tick_interval_ms",
                min: 1,
                value: 0,
            });
        }
        if self.start_hour >= HOURS_PER_DAY {
            return Err(LoopConfigError::StartHour(self.start_hour));
        }
        Ok(())
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Clock and event state owned by the loop, suitable for persisting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameClockState {
    pub current_hour: u8,
    pub current_phase_index: usize,
    /// Event in effect for the upcoming tick.
    pub last_event: Option<EventId>,
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub tick: u64,
    /// Hour and phase the casts were resolved under.
    pub hour: u8,
    pub phase: Phase,
    pub event: Option<EventId>,
    /// Event voted in during this tick; in effect from the next one.
    pub next_event: Option<EventId>,
    pub pool_size: usize,
    pub catches: Vec<CatchRecord>,
    pub dropped: Vec<PlayerId>,
    pub phase_changed: bool,
    pub wrapped: bool,
}

/// Owns the clock, the event state and the random streams, and drives one
/// tick at a time.
pub struct GameLoop<S, L, H>
where
    S: CatalogSource,
    L: CatchLedger,
    H: PlayerHooks,
{
    config: LoopConfig,
    clock: GameClock,
    last_event: Option<EventId>,
    rng: RngBundle,
    desk: CastDesk,
    source: S,
    ledger: L,
    hooks: H,
    fish: Option<Arc<FishCatalog>>,
    fish_fingerprint: Option<u64>,
    cards: Option<Arc<CardCatalog>>,
    ticks: u64,
}

impl<S, L, H> GameLoop<S, L, H>
where
    S: CatalogSource,
    L: CatchLedger,
    H: PlayerHooks,
{
    #[must_use]
    pub fn new(config: LoopConfig, source: S, ledger: L, hooks: H) -> Self {
        let rng = config
            .seed
            .map_or_else(RngBundle::from_entropy, RngBundle::from_user_seed);
        Self {
            clock: GameClock::new(config.start_hour),
            config,
            last_event: None,
            rng,
            desk: CastDesk::new(),
            source,
            ledger,
            hooks,
            fish: None,
            fish_fingerprint: None,
            cards: None,
            ticks: 0,
        }
    }

    /// Continue from a persisted clock state.
    #[must_use]
    pub fn resume(mut self, state: &GameClockState) -> Self {
        self.clock = GameClock::new(state.current_hour);
        self.last_event.clone_from(&state.last_event);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Handle onto the cast queue for submitters running elsewhere.
    #[must_use]
    pub fn desk(&self) -> CastDesk {
        self.desk.clone()
    }

    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.clock.hour()
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.clock.phase()
    }

    /// Event that the next tick resolves under.
    #[must_use]
    pub const fn current_event(&self) -> Option<&EventId> {
        self.last_event.as_ref()
    }

    #[must_use]
    pub fn clock_state(&self) -> GameClockState {
        GameClockState {
            current_hour: self.clock.hour(),
            current_phase_index: self.clock.phase().index(),
            last_event: self.last_event.clone(),
        }
    }

    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    #[must_use]
    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Queue a cast, resolving its bonuses against freshly read card data
    /// and rolling its depth from the loop's depth stream.
    ///
    /// # Errors
    ///
    /// Returns [`CastError`] when the desk refuses the cast.
    pub fn submit_cast(
        &mut self,
        player_id: &PlayerId,
        cast: &[i32],
        hand: &[i32],
    ) -> Result<PendingCast, CastError> {
        let cards = self.refresh_card_catalog();
        self.desk
            .submit_cast(player_id, cast, hand, &cards, self.rng.depth())
    }

    /// Hand the player their oldest unclaimed catch and let the ledger and
    /// the player store know.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::NoneUnclaimed`] when nothing is waiting.
    pub fn claim_catch(&mut self, player_id: &PlayerId) -> Result<CatchRecord, ClaimError> {
        let record = self.desk.claim_catch(player_id)?;
        if let Err(err) = self.ledger.record_claim(&record) {
            log::error!("failed to record claim for {player_id}: {err}");
        }
        if let Err(err) = self.hooks.on_claim(player_id, &record) {
            log::error!("failed to reset player {player_id} after claim: {err}");
        }
        Ok(record)
    }

    /// Read both catalogs once so misconfigured sources surface before the
    /// first tick. Returns the species and card counts.
    ///
    /// # Errors
    ///
    /// Returns the source error with context when either catalog fails to load.
    pub fn preflight(&mut self) -> anyhow::Result<(usize, usize)> {
        let fish = self
            .source
            .load_fish_catalog()
            .context("reading fish catalog")?;
        let cards = self
            .source
            .load_card_catalog()
            .context("reading card catalog")?;
        let counts = (fish.len(), cards.len());
        self.fish_fingerprint = Some(fish.fingerprint());
        self.fish = Some(Arc::new(fish));
        self.cards = Some(Arc::new(cards));
        Ok(counts)
    }

    fn refresh_card_catalog(&mut self) -> Arc<CardCatalog> {
        match self.source.load_card_catalog() {
            Ok(cards) => {
                let cards = Arc::new(cards);
                self.cards = Some(Arc::clone(&cards));
                cards
            }
            Err(err) => {
                log::error!("failed to read card catalog: {err}");
                self.cards.clone().unwrap_or_default()
            }
        }
    }

    fn refresh_fish_catalog(&mut self) -> Arc<FishCatalog> {
        match self.source.load_fish_catalog() {
            Ok(catalog) => {
                let fingerprint = catalog.fingerprint();
                match self.fish_fingerprint {
                    Some(previous) if previous != fingerprint => {
                        log::info!(
                            "fish catalog changed ({previous:016x} -> {fingerprint:016x}), {} species",
                            catalog.len()
                        );
                    }
                    None => log::info!("loaded fish catalog with {} species", catalog.len()),
                    Some(_) => {}
                }
                self.fish_fingerprint = Some(fingerprint);
                let catalog = Arc::new(catalog);
                self.fish = Some(Arc::clone(&catalog));
                catalog
            }
            Err(err) => match &self.fish {
                Some(last_good) => {
                    log::error!("failed to read fish catalog, reusing the last one: {err}");
                    Arc::clone(last_good)
                }
                None => {
                    log::error!("failed to read fish catalog and none is cached: {err}");
                    Arc::default()
                }
            },
        }
    }

    fn store_catch(&mut self, record: &CatchRecord) {
        if let Err(err) = self.ledger.append_unclaimed(record) {
            log::error!("failed to persist unclaimed catch for {}: {err}", record.player_id);
        }
        if let Err(err) = self.ledger.append_history(record) {
            log::error!("failed to persist history for {}: {err}", record.player_id);
        }
        self.desk.publish([record.clone()]);
        if let Err(err) = self.hooks.notify_catch(&record.player_id, &record.summary()) {
            log::error!("failed to notify {} of their catch: {err}", record.player_id);
        }
    }

    /// Run one tick.
    pub fn tick(&mut self) -> TickReport {
        let hour = self.clock.hour();
        let phase = self.clock.phase();
        let event = self.last_event.clone();
        let catalog = self.refresh_fish_catalog();

        let casts = self.desk.drain();

        let next_event = choose_next_event(
            casts.iter().map(|cast| cast.bonuses.as_slice()),
            self.rng.event(),
        );

        let pool = build_pool(
            &catalog,
            phase,
            event.as_ref(),
            self.config.sample_size,
            self.rng.pool(),
        );

        let mut catches = Vec::with_capacity(casts.len());
        let mut dropped = Vec::new();
        for cast in casts {
            let (draw_rng, metrics_rng) = self.rng.draw_streams();
            let caught = match draw(&pool, &cast.bonuses, draw_rng, metrics_rng) {
                DrawOutcome::Caught(caught) => caught,
                DrawOutcome::NoCatch => {
                    log::warn!(
                        "cast by {} found nothing to catch during {phase}; dropped",
                        cast.player_id
                    );
                    dropped.push(cast.player_id);
                    continue;
                }
            };
            let record = CatchRecord {
                player_id: cast.player_id,
                cast: cast.cast,
                depth: cast.depth,
                fish_type: caught.fish.key.clone(),
                fish_stats: caught.fish.clone(),
                event: event.clone(),
                phase,
                hour,
                timestamp: Utc::now(),
                weight: caught.metrics.weight,
                length: caught.metrics.length,
            };
            log::debug!("{} caught {}", record.player_id, record.summary());
            self.store_catch(&record);
            catches.push(record);
        }

        if next_event != event {
            log::info!(
                "event changes from {} to {}",
                event.as_ref().map_or("none", EventId::as_str),
                next_event.as_ref().map_or("none", EventId::as_str)
            );
        }
        self.last_event.clone_from(&next_event);

        let advanced = self.clock.tick();
        if advanced.phase_changed {
            log::info!("phase is now {} at hour {}", advanced.phase, advanced.hour);
        }
        if advanced.wrapped {
            log::info!("a new day begins; resetting every deck");
            if let Err(err) = self.hooks.reset_all_decks() {
                log::error!("failed to reset decks: {err}");
            }
        }

        self.ticks = self.ticks.saturating_add(1);
        TickReport {
            tick: self.ticks,
            hour,
            phase,
            event,
            next_event,
            pool_size: pool.len(),
            catches,
            dropped,
            phase_changed: advanced.phase_changed,
            wrapped: advanced.wrapped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_and_validation() {
        let config = LoopConfig::default_config();
        assert_eq!(config.sample_size, 900);
        assert_eq!(config.tick_interval_ms, 25_000);
        assert!(config.validate().is_ok());

        let parsed = LoopConfig::from_json(r#"{"sample_size": 50, "seed": 9}"#).unwrap();
        assert_eq!(parsed.sample_size, 50);
        assert_eq!(parsed.seed, Some(9));
        assert_eq!(parsed.start_hour, 0);

        assert!(matches!(
            LoopConfig::from_json(r#"{"sample_size": 0}"#),
            Err(LoopConfigError::MinViolation { field: "sample_size", .. })
        ));
        assert_eq!(
            LoopConfig::from_json(r#"{"start_hour": 24}"#),
            Err(LoopConfigError::StartHour(24))
        );
        assert!(matches!(
            LoopConfig::from_json("{"),
            Err(LoopConfigError::Parse(_))
        ));
    }
}
