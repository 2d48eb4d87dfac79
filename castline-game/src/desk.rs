//! Cast intake and catch claiming, shared between request handlers and the
//! game loop.
//!
//! Casts wait in a queue until the loop drains it. The drain swaps the queue
//! for an empty one under the lock, so a cast submitted while a tick is
//! resolving lands in the next tick.
use chrono::Utc;
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::bonus::{forced_depth, resolve_cast};
use crate::catch::{CastSlots, CatchRecord, PendingCast, PlayerId};
use crate::constants::{EMPTY_SLOT, MAX_CAST_SLOTS};
use crate::data::CardCatalog;
use crate::depth::pick_depth;

/// Reasons a cast is refused at submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("a cast needs 1 to {max} slots of -1 or a card index, got {slots:?}", max = MAX_CAST_SLOTS)]
    InvalidShape { slots: Vec<i32> },
    #[error("player {0} already has a cast waiting")]
    DuplicatePending(PlayerId),
    #[error("player {0} must claim their last catch before casting again")]
    UnclaimedOutstanding(PlayerId),
    #[error("card {index} is not in the hand of player {player}")]
    HandMismatch { player: PlayerId, index: i32 },
}

/// Reasons a claim is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("player {0} has no unclaimed catch")]
    NoneUnclaimed(PlayerId),
}

#[derive(Debug, Default)]
struct DeskState {
    pending: Vec<PendingCast>,
    unclaimed: Vec<CatchRecord>,
}

/// Cloneable handle onto the pending-cast queue and unclaimed catches.
#[derive(Debug, Clone, Default)]
pub struct CastDesk {
    state: Arc<Mutex<DeskState>>,
}

fn check_shape(cast: &[i32]) -> Result<CastSlots, CastError> {
    let valid_len = (1..=MAX_CAST_SLOTS).contains(&cast.len());
    let valid_slots = cast.iter().all(|&index| index == EMPTY_SLOT || index >= 0);
    if valid_len && valid_slots {
        Ok(CastSlots::from_slice(cast))
    } else {
        Err(CastError::InvalidShape {
            slots: cast.to_vec(),
        })
    }
}

/// Every played card must come from the hand, counting repeats.
fn check_hand(player: &PlayerId, cast: &[i32], hand: &[i32]) -> Result<(), CastError> {
    let mut remaining = hand.to_vec();
    for &index in cast.iter().filter(|&&index| index != EMPTY_SLOT) {
        match remaining.iter().position(|&held| held == index) {
            Some(position) => {
                remaining.swap_remove(position);
            }
            None => {
                return Err(CastError::HandMismatch {
                    player: player.clone(),
                    index,
                });
            }
        }
    }
    Ok(())
}

impl CastDesk {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DeskState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate a cast and queue it for the next tick.
    ///
    /// Bonuses are resolved against `cards` now; the depth is the first
    /// forced depth among them, otherwise a roll from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`CastError`] when the cast is malformed, the player already
    /// has a pending cast or an unclaimed catch, or a played card is not in
    /// `hand`. A refused cast is never queued.
    pub fn submit_cast<R: Rng + ?Sized>(
        &self,
        player_id: &PlayerId,
        cast: &[i32],
        hand: &[i32],
        cards: &CardCatalog,
        rng: &mut R,
    ) -> Result<PendingCast, CastError> {
        let slots = check_shape(cast)?;
        let mut state = self.lock();
        if state.pending.iter().any(|queued| &queued.player_id == player_id) {
            return Err(CastError::DuplicatePending(player_id.clone()));
        }
        if state
            .unclaimed
            .iter()
            .any(|record| &record.player_id == player_id)
        {
            return Err(CastError::UnclaimedOutstanding(player_id.clone()));
        }
        check_hand(player_id, &slots, hand)?;

        let bonuses = resolve_cast(cards, &slots);
        let depth = forced_depth(&bonuses).unwrap_or_else(|| pick_depth(rng));
        let pending = PendingCast {
            player_id: player_id.clone(),
            cast: slots,
            depth,
            bonuses,
            timestamp: Utc::now(),
        };
        log::debug!("queued cast {:?} for {player_id} at {depth}", pending.cast);
        state.pending.push(pending.clone());
        Ok(pending)
    }

    /// Take every queued cast, leaving the queue empty.
    #[must_use]
    pub fn drain(&self) -> Vec<PendingCast> {
        std::mem::take(&mut self.lock().pending)
    }

    /// Make resolved catches claimable.
    pub fn publish(&self, records: impl IntoIterator<Item = CatchRecord>) {
        self.lock().unclaimed.extend(records);
    }

    /// Remove and return the player's oldest unclaimed catch.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimError::NoneUnclaimed`] when nothing is waiting.
    pub fn claim_catch(&self, player_id: &PlayerId) -> Result<CatchRecord, ClaimError> {
        let mut state = self.lock();
        let position = state
            .unclaimed
            .iter()
            .position(|record| &record.player_id == player_id)
            .ok_or_else(|| ClaimError::NoneUnclaimed(player_id.clone()))?;
        Ok(state.unclaimed.remove(position))
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    #[must_use]
    pub fn has_pending(&self, player_id: &PlayerId) -> bool {
        self.lock()
            .pending
            .iter()
            .any(|queued| &queued.player_id == player_id)
    }

    /// Copy of every unclaimed catch, oldest first.
    #[must_use]
    pub fn unclaimed(&self) -> Vec<CatchRecord> {
        self.lock().unclaimed.clone()
    }
}
