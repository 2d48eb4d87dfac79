//! Whether a species can bite under the current phase and event.
use crate::clock::Phase;
use crate::data::{EventId, FishDefinition};

/// A species is active when it feeds during `phase`. Species restricted to
/// particular events are only active while one of those events is running.
#[must_use]
pub fn is_active(fish: &FishDefinition, phase: Phase, event: Option<&EventId>) -> bool {
    if !fish.feed_hours.contains(&phase) {
        return false;
    }
    if fish.only_active_events.is_empty() {
        return true;
    }
    event.is_some_and(|event| fish.only_active_events.contains(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dawn_feeder() -> FishDefinition {
        let mut fish = FishDefinition::new("bream", "common", 3.0);
        fish.feed_hours = vec![Phase::Dawn];
        fish
    }

    #[test]
    fn feed_hours_gate_activity_regardless_of_event() {
        let fish = dawn_feeder();
        let blood = EventId::from("blood");
        for event in [None, Some(&blood)] {
            assert!(is_active(&fish, Phase::Dawn, event));
            assert!(!is_active(&fish, Phase::Day, event));
            assert!(!is_active(&fish, Phase::Dusk, event));
            assert!(!is_active(&fish, Phase::Night, event));
        }
    }

    #[test]
    fn event_only_species_hide_outside_their_events() {
        let mut fish = FishDefinition::new("vampire squid", "mythic", 1.0);
        fish.feed_hours = vec![Phase::Night, Phase::Dawn];
        fish.only_active_events = vec![EventId::from("blood")];

        assert!(!is_active(&fish, Phase::Night, None));
        assert!(!is_active(&fish, Phase::Night, Some(&EventId::from("toxic"))));
        assert!(is_active(&fish, Phase::Night, Some(&EventId::from("blood"))));
        assert!(!is_active(&fish, Phase::Day, Some(&EventId::from("blood"))));
    }
}
