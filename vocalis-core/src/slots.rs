//! Slot values and entity resolution.
//!
//! A slot carries what the user actually said (`value`) and, for custom slot
//! types, what the interaction model mapped it to (`resolutions`). Handlers
//! almost always want the mapped value, so [`Slot::resolve`] prefers it and
//! falls back to the raw utterance.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, hash_map};

/// Status code of a resolution authority that found a canonical value.
pub const ER_SUCCESS_MATCH: &str = "ER_SUCCESS_MATCH";

/// Slots of an intent, keyed by slot name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slots(HashMap<String, Slot>);

impl Slots {
    /// An empty slot map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a slot, keyed by its name.
    #[must_use]
    pub fn with(mut self, slot: Slot) -> Self {
        self.insert(slot);
        self
    }

    /// Add or replace a slot, keyed by its name.
    pub fn insert(&mut self, slot: Slot) -> Option<Slot> {
        self.0.insert(slot.name.clone(), slot)
    }

    /// Look up a slot by name.
    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.0.get(name)
    }

    /// Resolved value of the named slot, or `""` when there is no such slot.
    pub fn resolve(&self, name: &str) -> &str {
        self.0.get(name).map(Slot::resolve).unwrap_or_default()
    }

    /// A copy where every slot carries only its resolved value.
    ///
    /// Resolution data is dropped; the raw utterance is replaced by the
    /// canonical value when one exists.
    pub fn resolved(&self) -> Slots {
        self.0
            .values()
            .map(|slot| Slot::new(slot.name.clone(), slot.resolve()))
            .collect()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the slots in no particular order.
    pub fn iter(&self) -> hash_map::Values<'_, String, Slot> {
        self.0.values()
    }
}

impl FromIterator<Slot> for Slots {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        let mut slots = Slots::new();
        for slot in iter {
            slots.insert(slot);
        }
        slots
    }
}

impl<'a> IntoIterator for &'a Slots {
    type Item = &'a Slot;
    type IntoIter = hash_map::Values<'a, String, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One slot of an intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot name as defined in the interaction model.
    pub name: String,
    /// What the user said, empty when the slot was not filled.
    #[serde(default)]
    pub value: String,
    /// Entity resolution results.
    #[serde(default, skip_serializing_if = "Resolutions::is_empty")]
    pub resolutions: Resolutions,
}

impl Slot {
    /// A slot with a raw value and no resolution data.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            resolutions: Resolutions::default(),
        }
    }

    /// A slot whose raw value was matched to `canonical` by a single authority.
    pub fn resolved(
        name: impl Into<String>,
        value: impl Into<String>,
        canonical: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            resolutions: Resolutions {
                resolutions_per_authority: vec![ResolutionAuthority {
                    authority: String::new(),
                    status: ResolutionStatus {
                        code: ER_SUCCESS_MATCH.to_string(),
                    },
                    values: vec![ResolutionValues {
                        value: ResolutionValue {
                            name: canonical.into(),
                            id: String::new(),
                        },
                    }],
                }],
            },
        }
    }

    /// The canonical value if the first authority matched, otherwise the raw
    /// value.
    ///
    /// Later authorities are never consulted.
    pub fn resolve(&self) -> &str {
        match self.resolutions.resolutions_per_authority.first() {
            Some(authority) if authority.status.code == ER_SUCCESS_MATCH => authority
                .values
                .first()
                .map(|v| v.value.name.as_str())
                .filter(|name| !name.is_empty())
                .unwrap_or(self.value.as_str()),
            _ => self.value.as_str(),
        }
    }
}

/// Entity resolution results for one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolutions {
    /// One entry per vocabulary source.
    #[serde(default)]
    pub resolutions_per_authority: Vec<ResolutionAuthority>,
}

impl Resolutions {
    /// Whether no authority reported anything.
    pub fn is_empty(&self) -> bool {
        self.resolutions_per_authority.is_empty()
    }
}

/// Result from one resolution authority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionAuthority {
    /// Authority identifier.
    #[serde(default)]
    pub authority: String,
    /// Match status.
    #[serde(default)]
    pub status: ResolutionStatus,
    /// Candidate values, best first.
    #[serde(default)]
    pub values: Vec<ResolutionValues>,
}

/// Match status of an authority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStatus {
    /// `ER_SUCCESS_MATCH`, `ER_SUCCESS_NO_MATCH`, ...
    #[serde(default)]
    pub code: String,
}

/// Wrapper around a candidate value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionValues {
    /// The candidate.
    pub value: ResolutionValue,
}

/// A canonical value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionValue {
    /// Canonical name.
    #[serde(default)]
    pub name: String,
    /// Canonical id.
    #[serde(default)]
    pub id: String,
}
