//! Group-by partitioner and group aggregates.

use std::collections::BTreeMap;

use crate::card::CardRecord;
use crate::deck::DeckLookup;

use super::field::{Field, FieldValue};

/// Bucket for cards whose grouping field has no value.
pub const OTHER_GROUP: &str = "Other";

/// Output of grouping: nested groups whose leaves are card lists.
///
/// An ungrouped result is a single `Leaf`. Branch keys iterate in
/// lexicographic order.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupTree {
    Leaf(Vec<CardRecord>),
    Branch(BTreeMap<String, GroupTree>),
}

/// Size of a (sub)tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupCounts {
    /// Number of card records.
    pub unique_count: usize,
    /// Sum of `count` across those records.
    pub copy_count: u64,
}

impl std::ops::Add for GroupCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            unique_count: self.unique_count + rhs.unique_count,
            copy_count: self.copy_count + rhs.copy_count,
        }
    }
}

impl GroupTree {
    pub fn counts(&self) -> GroupCounts {
        match self {
            GroupTree::Leaf(cards) => GroupCounts {
                unique_count: cards.len(),
                copy_count: cards.iter().map(|c| u64::from(c.count)).sum(),
            },
            GroupTree::Branch(groups) => groups
                .values()
                .map(GroupTree::counts)
                .fold(GroupCounts::default(), |acc, c| acc + c),
        }
    }

    /// Child group by key. `None` for leaves.
    pub fn get(&self, key: &str) -> Option<&GroupTree> {
        match self {
            GroupTree::Leaf(_) => None,
            GroupTree::Branch(groups) => groups.get(key),
        }
    }

    /// Cards of a leaf. `None` for branches.
    pub fn as_leaf(&self) -> Option<&[CardRecord]> {
        match self {
            GroupTree::Leaf(cards) => Some(cards),
            GroupTree::Branch(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, GroupTree::Leaf(_))
    }

    /// Group keys at this level, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let groups = match self {
            GroupTree::Leaf(_) => None,
            GroupTree::Branch(groups) => Some(groups),
        };
        groups.into_iter().flat_map(|g| g.keys().map(String::as_str))
    }

    /// All cards, leaf after leaf in key order.
    pub fn flatten(&self) -> Vec<&CardRecord> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    pub fn into_cards(self) -> Vec<CardRecord> {
        match self {
            GroupTree::Leaf(cards) => cards,
            GroupTree::Branch(groups) => groups
                .into_values()
                .flat_map(GroupTree::into_cards)
                .collect(),
        }
    }

    /// Mutable access to every leaf list.
    pub(crate) fn leaves_mut(&mut self) -> Vec<&mut Vec<CardRecord>> {
        let mut leaves = Vec::new();
        self.collect_leaves_mut(&mut leaves);
        leaves
    }

    fn collect_into<'t>(&'t self, out: &mut Vec<&'t CardRecord>) {
        match self {
            GroupTree::Leaf(cards) => out.extend(cards.iter()),
            GroupTree::Branch(groups) => {
                for group in groups.values() {
                    group.collect_into(out);
                }
            }
        }
    }

    fn collect_leaves_mut<'t>(&'t mut self, out: &mut Vec<&'t mut Vec<CardRecord>>) {
        match self {
            GroupTree::Leaf(cards) => out.push(cards),
            GroupTree::Branch(groups) => {
                for group in groups.values_mut() {
                    group.collect_leaves_mut(out);
                }
            }
        }
    }
}

/// Partition cards by `keys[0]`, then each partition by `keys[1]`, and so on.
///
/// No keys returns the cards unchanged as a single leaf. Within a group,
/// cards keep their input order.
pub fn partition<K: AsRef<str>>(
    cards: Vec<CardRecord>,
    keys: &[K],
    decks: &dyn DeckLookup,
) -> GroupTree {
    let Some((first, rest)) = keys.split_first() else {
        return GroupTree::Leaf(cards);
    };

    let field = Field::parse(first.as_ref());
    let mut buckets: BTreeMap<String, Vec<CardRecord>> = BTreeMap::new();
    for card in cards {
        let key = group_key(&field, &card, decks);
        buckets.entry(key).or_default().push(card);
    }

    GroupTree::Branch(
        buckets
            .into_iter()
            .map(|(key, cards)| (key, partition(cards, rest, decks)))
            .collect(),
    )
}

fn group_key(field: &Field, card: &CardRecord, decks: &dyn DeckLookup) -> String {
    match field.resolve(card, decks) {
        FieldValue::Missing => OTHER_GROUP.to_string(),
        value => value.as_text().into_owned(),
    }
}
