//! Collection - in-memory owned-card lifecycle and collection totals.

use thiserror::Error;
use uuid::Uuid;

use super::CardRecord;
use crate::deck::Deck;

/// Error type for collection edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("no card record with id {0}")]
    UnknownRecord(String),
    #[error("card record {record_id} has {available} copies, cannot move {requested}")]
    InsufficientCopies {
        record_id: String,
        available: u32,
        requested: u32,
    },
}

/// Totals shown above a collection listing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollectionSummary {
    /// Number of card records.
    pub unique: usize,
    /// Sum of `count` across records.
    pub copies: u64,
    /// Sum of `count × price`; unpriced cards count as zero.
    pub total_value: f64,
}

impl CollectionSummary {
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a CardRecord>) -> Self {
        cards
            .into_iter()
            .filter(|card| !card.is_deleted())
            .fold(Self::default(), |mut acc, card| {
                acc.unique += 1;
                acc.copies += u64::from(card.count);
                acc.total_value += card.total_value();
                acc
            })
    }
}

/// The user's owned cards, in insertion order.
///
/// Records are keyed by `record_id`; the same printing in two finishes is two
/// records, the same printing and finish added twice is one record with a
/// larger count.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    records: Vec<CardRecord>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from already-persisted records.
    ///
    /// Records with a zero count are dropped and blank record ids get a fresh one.
    pub fn from_records(records: impl IntoIterator<Item = CardRecord>) -> Self {
        let records = records
            .into_iter()
            .filter(|card| !card.is_deleted())
            .map(|mut card| {
                if card.record_id.is_empty() {
                    card.record_id = new_record_id();
                }
                card
            })
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[CardRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, record_id: &str) -> Option<&CardRecord> {
        self.records.iter().find(|card| card.record_id == record_id)
    }

    /// Add copies of a card.
    ///
    /// Merges into an existing record with the same printing and finish;
    /// otherwise inserts a new record. A zero count adds one copy.
    pub fn add(&mut self, mut card: CardRecord) -> &CardRecord {
        let added = card.count.max(1);

        if let Some(idx) = self
            .records
            .iter()
            .position(|existing| existing.id == card.id && existing.finish == card.finish)
        {
            let existing = &mut self.records[idx];
            existing.count = existing.count.saturating_add(added);
            tracing::debug!(
                record_id = %existing.record_id,
                count = existing.count,
                "merged card into existing record"
            );
            return &self.records[idx];
        }

        card.count = added;
        if card.record_id.is_empty() {
            card.record_id = new_record_id();
        }
        tracing::debug!(record_id = %card.record_id, name = %card.name, "added card record");
        self.records.push(card);
        let last = self.records.len() - 1;
        &self.records[last]
    }

    /// Set the copy count of a record. A zero count deletes it.
    ///
    /// Returns the updated record, or `None` when it was deleted.
    pub fn set_count(
        &mut self,
        record_id: &str,
        count: u32,
    ) -> Result<Option<&CardRecord>, CollectionError> {
        let idx = self.position(record_id)?;
        if count == 0 {
            self.records.remove(idx);
            tracing::debug!(record_id, "removed card record");
            return Ok(None);
        }
        self.records[idx].count = count;
        Ok(Some(&self.records[idx]))
    }

    /// Remove a record regardless of its count.
    pub fn remove(&mut self, record_id: &str) -> Option<CardRecord> {
        let idx = self.position(record_id).ok()?;
        Some(self.records.remove(idx))
    }

    /// Split one copy off a record into a new single-copy record.
    ///
    /// The source is decremented and deleted once it reaches zero. The new
    /// record is appended to the collection and returned.
    pub fn split_unit(&mut self, record_id: &str) -> Result<CardRecord, CollectionError> {
        self.split_units(record_id, 1)
    }

    /// Split `copies` copies off a record into a new record holding them.
    ///
    /// Fails unless `1 <= copies <= count`; splitting every copy leaves the
    /// source deleted.
    pub fn split_units(
        &mut self,
        record_id: &str,
        copies: u32,
    ) -> Result<CardRecord, CollectionError> {
        let idx = self.position(record_id)?;
        let source = &mut self.records[idx];
        if copies == 0 || copies > source.count {
            return Err(CollectionError::InsufficientCopies {
                record_id: record_id.to_string(),
                available: source.count,
                requested: copies,
            });
        }

        source.count -= copies;
        let mut split = source.clone();
        split.count = copies;
        split.record_id = new_record_id();

        if self.records[idx].is_deleted() {
            self.records.remove(idx);
        }
        tracing::debug!(
            source = record_id,
            record_id = %split.record_id,
            copies,
            "split card record"
        );
        self.records.push(split.clone());
        Ok(split)
    }

    /// Move one copy of a record into a deck.
    ///
    /// The moved copy becomes its own record so it is referenced by exactly
    /// one deck.
    pub fn move_unit_to_deck(
        &mut self,
        record_id: &str,
        deck: &mut Deck,
    ) -> Result<CardRecord, CollectionError> {
        let unit = self.split_unit(record_id)?;
        deck.add_card(&unit);
        tracing::debug!(
            source = record_id,
            record_id = %unit.record_id,
            deck_id = %deck.id,
            "moved card into deck"
        );
        Ok(unit)
    }

    pub fn summary(&self) -> CollectionSummary {
        CollectionSummary::from_cards(&self.records)
    }

    fn position(&self, record_id: &str) -> Result<usize, CollectionError> {
        self.records
            .iter()
            .position(|card| card.record_id == record_id)
            .ok_or_else(|| CollectionError::UnknownRecord(record_id.to_string()))
    }
}

fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()
}
