//! Decks and the card-to-deck assignment index.
//!
//! A card record belongs to at most one deck. The index built here is what the
//! `deckName` derived field and the "hide cards in decks" option read.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::card::CardRecord;

/// Label used for cards that are not assigned to any deck.
pub const NOT_IN_A_DECK: &str = "Not in a Deck";

/// Snapshot of a card as stored inside a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckCard {
    pub count: u32,
    pub name: String,
    #[serde(default, alias = "type_line")]
    pub type_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commander {
    pub record_id: String,
    pub name: String,
}

/// A named grouping of card records with an optional commander.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub commander: Option<Commander>,
    /// Keyed by card record id.
    #[serde(default)]
    pub cards: BTreeMap<String, DeckCard>,
}

impl Deck {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            commander: None,
            cards: BTreeMap::new(),
        }
    }

    pub fn with_commander(mut self, record: &CardRecord) -> Self {
        self.commander = Some(Commander {
            record_id: record.record_id.clone(),
            name: record.name.clone(),
        });
        self
    }

    /// Add one copy of a record, snapshotting its name and type line.
    pub fn add_card(&mut self, record: &CardRecord) {
        self.cards
            .entry(record.record_id.clone())
            .and_modify(|card| card.count += 1)
            .or_insert_with(|| DeckCard {
                count: 1,
                name: record.name.clone(),
                type_line: record.type_line.clone(),
            });
    }

    /// Every record id the deck references, commander last.
    pub fn record_ids(&self) -> impl Iterator<Item = &str> {
        self.cards
            .keys()
            .map(String::as_str)
            .chain(self.commander.as_ref().map(|c| c.record_id.as_str()))
    }

    /// Number of cards in the deck, counting the commander once.
    pub fn card_count(&self) -> u32 {
        let cards: u32 = self.cards.values().map(|card| card.count).sum();
        cards + u32::from(self.commander.is_some())
    }
}

/// A deck a card record is assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckAssignment {
    pub deck_id: String,
    pub deck_name: String,
}

/// Lookup of the decks a card record is assigned to.
pub trait DeckLookup {
    /// Assignments for a record, in deck insertion order.
    fn assignments(&self, record_id: &str) -> &[DeckAssignment];

    /// Name of the first deck the record is assigned to.
    fn deck_name(&self, record_id: &str) -> Option<&str> {
        self.assignments(record_id)
            .first()
            .map(|a| a.deck_name.as_str())
    }

    fn is_assigned(&self, record_id: &str) -> bool {
        !self.assignments(record_id).is_empty()
    }
}

/// A lookup with no decks at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecks;

impl DeckLookup for NoDecks {
    fn assignments(&self, _record_id: &str) -> &[DeckAssignment] {
        &[]
    }
}

/// Record id → deck assignments, rebuilt whenever the deck list changes.
#[derive(Debug, Clone, Default)]
pub struct DeckAssignments {
    by_record: HashMap<String, Vec<DeckAssignment>>,
}

impl DeckAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index decks in the given order. A record listed twice in one deck
    /// (as a card and as commander) is assigned once.
    pub fn from_decks<'a>(decks: impl IntoIterator<Item = &'a Deck>) -> Self {
        let mut by_record: HashMap<String, Vec<DeckAssignment>> = HashMap::new();

        for deck in decks {
            for record_id in deck.record_ids() {
                let assignments = by_record.entry(record_id.to_string()).or_default();
                if assignments.iter().any(|a| a.deck_id == deck.id) {
                    continue;
                }
                assignments.push(DeckAssignment {
                    deck_id: deck.id.clone(),
                    deck_name: deck.name.clone(),
                });
            }
        }

        let index = Self { by_record };
        for (record_id, decks) in index.multiply_assigned() {
            tracing::warn!(
                record_id,
                decks = decks.len(),
                "card record assigned to more than one deck"
            );
        }
        index
    }

    /// Records that break the single-assignment rule, with all their decks.
    pub fn multiply_assigned(&self) -> impl Iterator<Item = (&str, &[DeckAssignment])> {
        self.by_record
            .iter()
            .filter(|(_, decks)| decks.len() > 1)
            .map(|(id, decks)| (id.as_str(), decks.as_slice()))
    }
}

impl DeckLookup for DeckAssignments {
    fn assignments(&self, record_id: &str) -> &[DeckAssignment] {
        self.by_record
            .get(record_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
