//! View engine: filter, then group and sort, a card list under a rule set.

use crate::card::{CardRecord, CollectionSummary};
use crate::config::LibraryConfig;
use crate::deck::DeckLookup;

use super::filter::FilterSet;
use super::group::{partition, GroupTree};
use super::rules::{FilterRule, RuleSet, SortRule};
use super::sort::Comparator;

/// Materializes card lists for display.
///
/// Pure over its inputs: it never mutates the cards it is given and never
/// fails. Cards with a zero count are skipped.
#[derive(Clone, Copy)]
pub struct ViewEngine<'d> {
    decks: &'d dyn DeckLookup,
    max_group_depth: usize,
}

impl<'d> ViewEngine<'d> {
    pub fn new(decks: &'d dyn DeckLookup) -> Self {
        Self {
            decks,
            max_group_depth: LibraryConfig::default().max_group_depth,
        }
    }

    pub fn with_config(decks: &'d dyn DeckLookup, config: &LibraryConfig) -> Self {
        Self {
            decks,
            max_group_depth: config.max_group_depth,
        }
    }

    /// Cards that satisfy every filter, in input order.
    pub fn filter(&self, cards: &[CardRecord], filters: &[FilterRule]) -> Vec<CardRecord> {
        let filters = FilterSet::compile(filters);
        cards
            .iter()
            .filter(|card| filters.matches(card, self.decks))
            .cloned()
            .collect()
    }

    /// Stable sort by a priority list of rules.
    pub fn sort(&self, cards: &mut [CardRecord], sorts: &[SortRule]) {
        Comparator::compile(sorts).sort(cards, self.decks);
    }

    /// Apply a full rule set.
    ///
    /// Without group keys the result is one globally sorted `Leaf` that a
    /// caller can paginate. With group keys the cards are partitioned first and
    /// each leaf group is sorted on its own; sorting never moves a card between
    /// groups.
    pub fn materialize(&self, cards: &[CardRecord], rules: &RuleSet) -> GroupTree {
        let filters = FilterSet::compile(&rules.filters);
        let search = rules.search_text().map(str::to_lowercase);

        let selected: Vec<CardRecord> = cards
            .iter()
            .filter(|card| !card.is_deleted())
            .filter(|card| !(rules.hide_in_decks && self.decks.is_assigned(&card.record_id)))
            .filter(|card| search.as_deref().map_or(true, |text| matches_search(card, text)))
            .filter(|card| filters.matches(card, self.decks))
            .cloned()
            .collect();

        let keys: Vec<&str> = rules.group_keys().collect();
        if keys.len() > self.max_group_depth {
            tracing::debug!(
                requested = keys.len(),
                max = self.max_group_depth,
                "group keys beyond max depth ignored"
            );
        }
        let keys = &keys[..keys.len().min(self.max_group_depth)];

        let comparator = Comparator::compile(&rules.sorts);
        let mut tree = partition(selected, keys, self.decks);
        for leaf in tree.leaves_mut() {
            comparator.sort(leaf, self.decks);
        }
        tree
    }

    /// Totals for the cards a rule set selects.
    pub fn summarize(&self, cards: &[CardRecord], rules: &RuleSet) -> CollectionSummary {
        let tree = self.materialize(cards, rules);
        CollectionSummary::from_cards(tree.flatten())
    }
}

fn matches_search(card: &CardRecord, text: &str) -> bool {
    card.name.to_lowercase().contains(text) || card.type_line.to_lowercase().contains(text)
}
