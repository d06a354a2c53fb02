//! Views over a card collection.
//!
//! A [`RuleSet`] describes a view declaratively: filters (ANDed), a sort
//! priority list and up to two group-by keys. The [`ViewEngine`] compiles the
//! rules and materializes a [`GroupTree`]:
//!
//! ```ignore
//! use mtg_library::{NoDecks, RuleSet, SortRule, FilterRule, ViewEngine};
//!
//! let rules = RuleSet::empty()
//!     .filter(FilterRule::new("typeLineMainType", "equals", "creature"))
//!     .sort(SortRule::desc("price"))
//!     .group("rarity");
//!
//! let tree = ViewEngine::new(&NoDecks).materialize(&cards, &rules);
//! for rarity in tree.keys() {
//!     let counts = tree.get(rarity).map(|g| g.counts());
//! }
//! ```

mod engine;
mod field;
mod filter;
mod group;
mod rules;
mod sort;

pub use engine::ViewEngine;
pub use field::{Field, FieldValue, COLORLESS};
pub use filter::{FilterSet, Predicate};
pub use group::{partition, GroupCounts, GroupTree, OTHER_GROUP};
pub use rules::{FilterOperator, FilterRule, RuleSet, SortDirection, SortRule};
pub use sort::Comparator;
