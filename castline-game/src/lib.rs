//! Castline Game Engine
//!
//! Weighted catch resolution for the Castline fishing game: card bonuses,
//! depth rolls, event voting, the shared catch pool, personal draws and the
//! tick loop that ties them together. Storage, player state and static data
//! live behind the collaborator traits below.

pub mod bonus;
pub mod catch;
pub mod clock;
pub mod constants;
pub mod data;
pub mod depth;
pub mod desk;
pub mod draw;
pub mod eligibility;
pub mod event;
pub mod game_loop;
pub mod metrics;
pub mod numbers;
pub mod pool;
pub mod rng;
#[cfg(feature = "async")]
pub mod runtime;
pub mod sampler;

// Re-export commonly used types
pub use bonus::{Bonus, apply_depth_bonuses, bonuses_from_cards, forced_depth, resolve_cast};
pub use catch::{CastSlots, CatchRecord, CatchSummary, PendingCast, PlayerId};
pub use clock::{ClockTick, GameClock, Phase};
pub use data::{
    CardCatalog, CardDefinition, CatalogError, EventId, EventVariation, FishCatalog,
    FishDefinition, Rarity,
};
pub use depth::{DepthTier, pick_depth};
pub use desk::{CastDesk, CastError, ClaimError};
pub use draw::{CatchDraw, DrawOutcome, PersonalWeight, draw, personal_weights};
pub use eligibility::is_active;
pub use event::{VoteTally, choose_next_event};
pub use game_loop::{GameClockState, GameLoop, LoopConfig, LoopConfigError, TickReport};
pub use metrics::{RolledMetrics, roll_metrics};
pub use pool::{CatchPool, PoolEntry, build_pool, effective_rate};
pub use rng::{CountingRng, RngBundle};
pub use sampler::{Selection, WeightedTable, pick_weighted};

/// Source of the static fish and card data.
/// Read again on every tick and every cast so balance edits apply live.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every fish definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the fish data cannot be read or parsed.
    fn load_fish_catalog(&self) -> Result<FishCatalog, Self::Error>;

    /// Load every card definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the card data cannot be read or parsed.
    fn load_card_catalog(&self) -> Result<CardCatalog, Self::Error>;
}

/// Append-only sinks for resolved catches.
pub trait CatchLedger {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Record a catch in the permanent history.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn append_history(&mut self, record: &CatchRecord) -> Result<(), Self::Error>;

    /// Record a catch as waiting to be claimed.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn append_unclaimed(&mut self, record: &CatchRecord) -> Result<(), Self::Error>;

    /// Note that a catch has been claimed.
    ///
    /// # Errors
    ///
    /// Returns an error if the claim cannot be written.
    fn record_claim(&mut self, _record: &CatchRecord) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Player-state side effects triggered by the loop.
pub trait PlayerHooks {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Tell a player a catch is ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the player store cannot be updated.
    fn notify_catch(&mut self, player: &PlayerId, summary: &CatchSummary)
    -> Result<(), Self::Error>;

    /// Refill every player's deck at the start of a new day.
    ///
    /// # Errors
    ///
    /// Returns an error if the player store cannot be updated.
    fn reset_all_decks(&mut self) -> Result<(), Self::Error>;

    /// Reset a player after they claim a catch.
    ///
    /// # Errors
    ///
    /// Returns an error if the player store cannot be updated.
    fn on_claim(&mut self, player: &PlayerId, record: &CatchRecord) -> Result<(), Self::Error>;
}

/// Catalogs bundled with the crate.
///
/// # Errors
///
/// Returns [`CatalogError`] if an embedded asset fails to parse.
pub fn default_catalog() -> Result<(FishCatalog, CardCatalog), CatalogError> {
    Ok((FishCatalog::embedded()?, CardCatalog::embedded()?))
}
