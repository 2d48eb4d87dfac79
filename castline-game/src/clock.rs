//! In-game clock: a wrapping hour counter split into four phases.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{HOURS_PER_DAY, HOURS_PER_PHASE, PHASE_ORDER};

/// One of the four six-hour segments of the in-game day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Dawn,
    Day,
    Dusk,
    Night,
}

impl Phase {
    /// Phase covering `hour`; hours outside 0-23 wrap.
    #[must_use]
    pub const fn for_hour(hour: u8) -> Self {
        let slot = (hour % HOURS_PER_DAY) / HOURS_PER_PHASE;
        PHASE_ORDER[slot as usize]
    }

    /// Position of the phase within the day (0-3).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Dawn => 0,
            Self::Day => 1,
            Self::Dusk => 2,
            Self::Night => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dawn => "dawn",
            Self::Day => "day",
            Self::Dusk => "dusk",
            Self::Night => "night",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of advancing the clock by one hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTick {
    pub hour: u8,
    pub phase: Phase,
    pub phase_changed: bool,
    /// True when the hour rolled over to 0, i.e. a new in-game day began.
    pub wrapped: bool,
}

/// Discrete hour counter advanced once per loop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameClock {
    hour: u8,
}

impl GameClock {
    #[must_use]
    pub const fn new(start_hour: u8) -> Self {
        Self {
            hour: start_hour % HOURS_PER_DAY,
        }
    }

    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        Phase::for_hour(self.hour)
    }

    pub fn tick(&mut self) -> ClockTick {
        let before = self.phase();
        self.hour = (self.hour + 1) % HOURS_PER_DAY;
        let phase = self.phase();
        ClockTick {
            hour: self.hour,
            phase,
            phase_changed: phase != before,
            wrapped: self.hour == 0,
        }
    }
}
