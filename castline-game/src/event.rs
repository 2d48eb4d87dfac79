//! Event voting: casts vote with their cards, the most voted event starts on
//! the following tick.
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

use crate::bonus::{Bonus, event_votes};
use crate::data::EventId;

/// Vote totals per event for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoteTally {
    votes: BTreeMap<EventId, u32>,
}

impl VoteTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every event vote found in `bonuses`.
    pub fn record(&mut self, bonuses: &[Bonus]) {
        for (event, votes) in event_votes(bonuses) {
            let entry = self.votes.entry(event.clone()).or_insert(0);
            *entry = entry.saturating_add(votes);
        }
    }

    #[must_use]
    pub fn votes_for(&self, event: &EventId) -> u32 {
        self.votes.get(event).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Events tied at the highest vote count, in identifier order.
    #[must_use]
    pub fn leaders(&self) -> Vec<&EventId> {
        let Some(max) = self.votes.values().copied().max() else {
            return Vec::new();
        };
        self.votes
            .iter()
            .filter(|(_, count)| **count == max)
            .map(|(event, _)| event)
            .collect()
    }

    /// Pick the winning event, breaking ties uniformly at random.
    pub fn winner<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<EventId> {
        self.leaders().choose(rng).map(|event| (*event).clone())
    }
}

/// Choose the event that takes effect next tick from the casts' bonuses.
///
/// Returns `None` when no cast voted.
pub fn choose_next_event<'a, I, R>(cast_bonuses: I, rng: &mut R) -> Option<EventId>
where
    I: IntoIterator<Item = &'a [Bonus]>,
    R: Rng + ?Sized,
{
    let mut tally = VoteTally::new();
    for bonuses in cast_bonuses {
        tally.record(bonuses);
    }
    tally.winner(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn votes(event: &str, count: u32) -> Vec<Bonus> {
        (0..count)
            .map(|_| Bonus::EventVote {
                event: EventId::from(event),
                votes: 1,
            })
            .collect()
    }

    #[test]
    fn no_votes_means_no_event() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let casts: Vec<Vec<Bonus>> = vec![vec![Bonus::BaseFishRate { amount: 1.0 }], Vec::new()];
        assert_eq!(choose_next_event(casts.iter().map(Vec::as_slice), &mut rng), None);
    }

    #[test]
    fn clear_winner_is_chosen() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let casts = [votes("toxic", 2), votes("frozen", 1), votes("toxic", 1)];
        let winner = choose_next_event(casts.iter().map(Vec::as_slice), &mut rng);
        assert_eq!(winner, Some(EventId::from("toxic")));
    }

    #[test]
    fn ties_split_evenly_and_never_pick_trailing_events() {
        let casts = [votes("blood", 3), votes("toxic", 3), votes("frozen", 1)];
        let mut rng = ChaCha20Rng::seed_from_u64(2024);
        let trials = 10_000;
        let mut blood = 0;
        for _ in 0..trials {
            match choose_next_event(casts.iter().map(Vec::as_slice), &mut rng) {
                Some(event) if event.as_str() == "blood" => blood += 1,
                Some(event) => assert_eq!(event.as_str(), "toxic"),
                None => panic!("votes were cast"),
            }
        }
        let share = f64::from(blood) / f64::from(trials);
        assert!((share - 0.5).abs() < 0.03, "blood share {share}");
    }

    #[test]
    fn tally_counts_multi_vote_bonuses() {
        let mut tally = VoteTally::new();
        tally.record(&[Bonus::EventVote {
            event: EventId::from("storm"),
            votes: 4,
        }]);
        tally.record(&votes("storm", 1));
        assert_eq!(tally.votes_for(&EventId::from("storm")), 5);
        assert_eq!(tally.leaders(), vec![&EventId::from("storm")]);
    }
}
