//! Static fish and card catalogs.
//!
//! Both catalogs are plain JSON documents (`{"fish": {...}}` and
//! `{"cards": {...}}`) keyed by species or card name. They are re-read by the
//! collaborators whenever the engine asks, so balance can be edited while the
//! loop keeps running.
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use twox_hash::XxHash64;

use crate::clock::Phase;
use crate::constants::JUNK_RARITY;
use crate::depth::DepthTier;

/// Errors raised while parsing or validating a catalog document.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("fish `{species}` has invalid {field}: {detail}")]
    InvalidFish {
        species: String,
        field: &'static str,
        detail: String,
    },
    #[error("card `{name}` has invalid {field}: {detail}")]
    InvalidCard {
        name: String,
        field: &'static str,
        detail: String,
    },
}

/// Identifier of a global event such as `blood` or `frozen`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rarity tier of a species. The set is open; only `junk` carries rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rarity(pub String);

impl Rarity {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn junk() -> Self {
        Self::new(JUNK_RARITY)
    }

    #[must_use]
    pub fn is_junk(&self) -> bool {
        self.0 == JUNK_RARITY
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Rarity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catch-rate multiplier applied while a given event is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventVariation {
    pub event: EventId,
    pub multiplier: f64,
}

/// Static definition of a catchable species (or junk item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FishDefinition {
    /// Species key. Catalogs fill it from the map key; stored catch records
    /// carry it inline.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub base_catch_rate: f64,
    #[serde(default)]
    pub depths: Vec<DepthTier>,
    #[serde(default)]
    pub feed_hours: Vec<Phase>,
    #[serde(default)]
    pub only_active_events: Vec<EventId>,
    #[serde(default)]
    pub event_variations: Vec<EventVariation>,
    #[serde(default)]
    pub min_weight: f64,
    #[serde(default)]
    pub max_weight: f64,
    #[serde(default)]
    pub min_length: f64,
    #[serde(default)]
    pub max_length: f64,
    /// Opaque artwork handle, only meaningful to minting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl FishDefinition {
    /// Minimal definition used by tests and tooling; ranges default to zero.
    #[must_use]
    pub fn new(key: impl Into<String>, rarity: impl Into<Rarity>, base_catch_rate: f64) -> Self {
        Self {
            key: key.into(),
            rarity: rarity.into(),
            base_catch_rate,
            depths: Vec::new(),
            feed_hours: Vec::new(),
            only_active_events: Vec::new(),
            event_variations: Vec::new(),
            min_weight: 0.0,
            max_weight: 0.0,
            min_length: 0.0,
            max_length: 0.0,
            image: None,
        }
    }

    #[must_use]
    pub fn is_junk(&self) -> bool {
        self.rarity.is_junk()
    }

    /// Multiplier listed for `event`, or 1.0 when no event is active or the
    /// species has no variation for it.
    #[must_use]
    pub fn event_multiplier(&self, event: Option<&EventId>) -> f64 {
        event
            .and_then(|event| {
                self.event_variations
                    .iter()
                    .find(|variation| &variation.event == event)
            })
            .map_or(1.0, |variation| variation.multiplier)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |field: &'static str, detail: String| CatalogError::InvalidFish {
            species: self.key.clone(),
            field,
            detail,
        };
        if !self.base_catch_rate.is_finite() || self.base_catch_rate < 0.0 {
            return Err(invalid(
                "base-catch-rate",
                format!("{} is not a non-negative number", self.base_catch_rate),
            ));
        }
        if let Some(variation) = self
            .event_variations
            .iter()
            .find(|variation| !variation.multiplier.is_finite() || variation.multiplier < 0.0)
        {
            return Err(invalid(
                "event-variations",
                format!("multiplier {} for {}", variation.multiplier, variation.event),
            ));
        }
        if self.is_junk() {
            return Ok(());
        }
        for (field, min, max) in [
            ("weight range", self.min_weight, self.max_weight),
            ("length range", self.min_length, self.max_length),
        ] {
            if !min.is_finite() || !max.is_finite() || min > max || !(max - min).is_finite() {
                return Err(invalid(field, format!("[{min}, {max}]")));
            }
        }
        Ok(())
    }
}

/// Every species known to the game, keyed by species.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FishCatalog {
    pub fish: BTreeMap<String, FishDefinition>,
}

impl FishCatalog {
    /// Parse and validate a `{"fish": {...}}` document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a definition is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let mut catalog: Self = serde_json::from_str(json)?;
        for (key, definition) in &mut catalog.fish {
            definition.key.clone_from(key);
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Build a catalog from definitions, keyed by their `key`.
    #[must_use]
    pub fn from_definitions(definitions: impl IntoIterator<Item = FishDefinition>) -> Self {
        let fish = definitions
            .into_iter()
            .map(|definition| (definition.key.clone(), definition))
            .collect();
        Self { fish }
    }

    /// Catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset fails validation.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(include_str!("../assets/fish.json"))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        self.fish.values().try_for_each(FishDefinition::validate)?;
        for definition in self.fish.values().filter(|f| f.feed_hours.is_empty()) {
            log::warn!("fish `{}` has no feed hours and can never bite", definition.key);
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, species: &str) -> Option<&FishDefinition> {
        self.fish.get(species)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FishDefinition> {
        self.fish.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fish.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fish.is_empty()
    }

    /// Stable hash of the catalog contents, used to spot hot edits.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let canonical = serde_json::to_vec(&self.fish).unwrap_or_default();
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&canonical);
        hasher.finish()
    }
}

/// Static definition of a playable card and the modifiers it grants.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CardDefinition {
    /// Card name; filled from the catalog map key.
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub index: Option<i32>,
    #[serde(default)]
    pub depth_force: Option<DepthTier>,
    #[serde(default)]
    pub fish_weight: Option<f64>,
    #[serde(default)]
    pub attract_type: Vec<String>,
    #[serde(default)]
    pub attract_rarity: Vec<Rarity>,
    #[serde(default)]
    pub attract_weight: Option<f64>,
    #[serde(default)]
    pub force_event: Vec<EventId>,
    #[serde(default)]
    pub base_fish_catch_rate: Option<f64>,
}

impl CardDefinition {
    #[must_use]
    pub fn new(name: impl Into<String>, index: i32) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |field: &'static str, detail: String| CatalogError::InvalidCard {
            name: self.name.clone(),
            field,
            detail,
        };
        if let Some(index) = self.index
            && index < 0
        {
            return Err(invalid("index", format!("{index} is negative")));
        }
        for (field, value) in [
            ("fish-weight", self.fish_weight),
            ("attract-weight", self.attract_weight),
        ] {
            if let Some(value) = value
                && (!value.is_finite() || value < 0.0)
            {
                return Err(invalid(field, format!("{value} is not a non-negative number")));
            }
        }
        if let Some(rate) = self.base_fish_catch_rate
            && !rate.is_finite()
        {
            return Err(invalid("base-fish-catch-rate", format!("{rate} is not finite")));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct CardDocument {
    #[serde(default)]
    cards: BTreeMap<String, CardDefinition>,
}

/// Every card known to the game with a precomputed index lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardCatalog {
    cards: BTreeMap<String, CardDefinition>,
    by_index: HashMap<i32, String>,
}

impl CardCatalog {
    /// Parse and validate a `{"cards": {...}}` document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a card is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CardDocument = serde_json::from_str(json)?;
        let cards = document
            .cards
            .into_iter()
            .map(|(name, mut card)| {
                card.name.clone_from(&name);
                card
            })
            .collect::<Vec<_>>();
        cards.iter().try_for_each(CardDefinition::validate)?;
        Ok(Self::from_cards(cards))
    }

    /// Build a catalog from card definitions, keyed by their `name`.
    ///
    /// When two cards claim the same index the first by name keeps it.
    #[must_use]
    pub fn from_cards(cards: impl IntoIterator<Item = CardDefinition>) -> Self {
        let cards: BTreeMap<String, CardDefinition> = cards
            .into_iter()
            .map(|card| (card.name.clone(), card))
            .collect();
        let mut by_index = HashMap::new();
        for (name, card) in &cards {
            let Some(index) = card.index else {
                continue;
            };
            if let Some(existing) = by_index.get(&index) {
                log::warn!("card index {index} claimed by `{existing}` and `{name}`; keeping `{existing}`");
                continue;
            }
            by_index.insert(index, name.clone());
        }
        Self { cards, by_index }
    }

    /// Catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset fails validation.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(include_str!("../assets/cards.json"))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CardDefinition> {
        self.cards.get(name)
    }

    /// Name of the card registered under `index`.
    #[must_use]
    pub fn name_for_index(&self, index: i32) -> Option<&str> {
        self.by_index.get(&index).map(String::as_str)
    }

    /// Card registered under `index`.
    #[must_use]
    pub fn card_at(&self, index: i32) -> Option<&CardDefinition> {
        self.name_for_index(index).and_then(|name| self.cards.get(name))
    }

    /// Every registered card index in ascending order.
    #[must_use]
    pub fn indices(&self) -> Vec<i32> {
        let mut indices: Vec<i32> = self.by_index.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
