pub mod files;
pub mod live;
pub mod reports;
pub mod seeds;
pub mod simulation;

use castline_game::numbers::tally_to_f64;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub use files::{JsonFileSource, JsonLinesLedger};
pub use live::{LiveOptions, run_live};
pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use simulation::{SimulationOptions, run_simulation};

/// Occurrence counts for one dimension of a run (phase, depth, event, fish).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Distribution {
    pub label: String,
    pub counts: BTreeMap<String, u64>,
    pub total: u64,
}

impl Distribution {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Start every listed key at zero so absent outcomes still show up.
    #[must_use]
    pub fn with_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        for key in keys {
            self.counts.entry(key.into()).or_insert(0);
        }
        self
    }

    pub fn record(&mut self, key: &str) {
        *self.counts.entry(key.to_string()).or_insert(0) += 1;
        self.total += 1;
    }

    #[must_use]
    pub fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Percentage of the total that `key` accounts for.
    #[must_use]
    pub fn percent(&self, key: &str) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        tally_to_f64(self.count(key)) / tally_to_f64(self.total) * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Simulate,
    Loop,
}

impl RunKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simulate => "simulate",
            Self::Loop => "loop",
        }
    }
}

/// Outcome of one seeded run of either harness.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub kind: RunKind,
    pub seed: u64,
    pub seed_token: String,
    pub started_at: DateTime<Utc>,
    pub casts: u64,
    pub catches: u64,
    pub dropped: u64,
    pub junk: u64,
    /// Loop-only counters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<LiveCounters>,
    pub distributions: Vec<Distribution>,
}

impl RunReport {
    #[must_use]
    pub fn distribution(&self, label: &str) -> Option<&Distribution> {
        self.distributions.iter().find(|d| d.label == label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveCounters {
    pub ticks: u64,
    pub players: usize,
    pub refused: u64,
    pub claims: u64,
    pub deck_resets: u64,
    pub day_wraps: u64,
    pub final_hour: u8,
    pub final_event: Option<String>,
}
