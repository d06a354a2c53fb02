//! Collection views for Magic: The Gathering libraries.
//!
//! Owned cards are filtered, sorted and grouped by a declarative [`RuleSet`];
//! named rule sets are kept as [`SavedView`]s per signed-in user.

// Lets `#[derive(Document)]` expand to `::mtg_library::Document` inside this crate.
extern crate self as mtg_library;

pub mod card;
pub mod config;
pub mod deck;
pub mod persistence;
pub mod saved;
pub mod view;

pub use card::{CardRecord, Collection, CollectionError, CollectionSummary, Color, Finish};
pub use config::LibraryConfig;
pub use deck::{Deck, DeckAssignment, DeckAssignments, DeckLookup, NoDecks};
pub use mtg_library_macros::Document;
pub use persistence::{
    Document, DocumentStore, InMemoryDocumentStore, PersistenceError, SettingsPatch,
    UserSettings, Versioned, ViewPersistence,
};
pub use saved::{
    ActiveViewChange, GridSize, SavedView, SavedViewStore, SessionState, UiPreferences,
    ViewMode, ViewStoreError,
};
pub use view::{
    FilterOperator, FilterRule, GroupCounts, GroupTree, RuleSet, SortDirection, SortRule,
    ViewEngine,
};
