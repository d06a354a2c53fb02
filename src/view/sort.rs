//! Sort comparator compiler.

use std::cmp::Ordering;

use crate::card::CardRecord;
use crate::deck::DeckLookup;

use super::field::{Field, FieldValue};
use super::rules::{SortDirection, SortRule};

/// Value a card sorts by under one rule.
///
/// Ordered `Missing < Number < Text` so mixed values still form a total
/// preorder; numbers use `total_cmp`, text compares lower-cased.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Missing,
    Number(f64),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Missing => 0,
            SortKey::Number(_) => 1,
            SortKey::Text(_) => 2,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledSort {
    field: Field,
    direction: SortDirection,
}

impl CompiledSort {
    fn key(&self, card: &CardRecord, decks: &dyn DeckLookup) -> SortKey {
        match self.field.resolve(card, decks) {
            // Unpriced cards sort as free.
            FieldValue::Missing if self.field == Field::Price => SortKey::Number(0.0),
            FieldValue::Missing => SortKey::Missing,
            FieldValue::Number(n) => SortKey::Number(n),
            FieldValue::Text(s) => SortKey::Text(s.to_lowercase()),
        }
    }
}

/// A compiled priority list of [`SortRule`]s.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    rules: Vec<CompiledSort>,
}

impl Comparator {
    pub fn compile(rules: &[SortRule]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|rule| CompiledSort {
                    field: Field::parse(&rule.field),
                    direction: rule.direction,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule that tells the cards apart decides. No rules: `Equal`.
    pub fn compare(&self, a: &CardRecord, b: &CardRecord, decks: &dyn DeckLookup) -> Ordering {
        for rule in &self.rules {
            let ordering = rule.key(a, decks).compare(&rule.key(b, decks));
            let ordering = match rule.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort; cards that compare equal keep their order.
    pub fn sort(&self, cards: &mut [CardRecord], decks: &dyn DeckLookup) {
        if self.is_empty() {
            return;
        }
        cards.sort_by(|a, b| self.compare(a, b, decks));
    }
}
