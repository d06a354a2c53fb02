//! Saved views: named, persisted rule sets with display preferences, and the
//! store that manages them for a signed-in user.

mod session;
mod store;

use serde::{Deserialize, Serialize};

use crate::view::{FilterRule, RuleSet, SortRule};
use crate::Document;

pub use session::{ActiveViewChange, SessionState};
pub use store::{SavedViewStore, ViewStoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ViewMode {
    #[default]
    Grid,
    Table,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::Table => "table",
        }
    }
}

// Unrecognised modes fall back to the grid.
impl From<String> for ViewMode {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "table" => ViewMode::Table,
            _ => ViewMode::Grid,
        }
    }
}

impl From<ViewMode> for String {
    fn from(mode: ViewMode) -> Self {
        mode.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GridSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl GridSize {
    pub fn as_str(self) -> &'static str {
        match self {
            GridSize::Sm => "sm",
            GridSize::Md => "md",
            GridSize::Lg => "lg",
        }
    }
}

impl From<String> for GridSize {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sm" => GridSize::Sm,
            "lg" => GridSize::Lg,
            _ => GridSize::Md,
        }
    }
}

impl From<GridSize> for String {
    fn from(size: GridSize) -> Self {
        size.as_str().to_string()
    }
}

/// Display preferences applied when a view becomes active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiPreferences {
    #[serde(alias = "grid_size")]
    pub grid_size: GridSize,
    #[serde(alias = "view_mode")]
    pub view_mode: ViewMode,
    #[serde(alias = "hide_in_decks")]
    pub hide_in_decks: bool,
}

/// A named, persisted rule set.
///
/// At most one of an owner's views has `is_default` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Document)]
#[document(collection = "views")]
#[serde(rename_all = "camelCase")]
pub struct SavedView {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub filters: Vec<FilterRule>,
    #[serde(default)]
    pub sorts: Vec<SortRule>,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub hide_in_decks: bool,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub grid_size: GridSize,
    #[serde(default)]
    pub is_default: bool,
}

impl SavedView {
    /// An empty view. Pass an empty id to have one assigned on create.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            filters: Vec::new(),
            sorts: Vec::new(),
            group_by: Vec::new(),
            hide_in_decks: false,
            view_mode: ViewMode::default(),
            grid_size: GridSize::default(),
            is_default: false,
        }
    }

    /// Take filters, sorts, grouping and the deck option from a rule set.
    /// Quick-search text is not saved.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.filters = rules.filters;
        self.sorts = rules.sorts;
        self.group_by = rules.group_by;
        self.hide_in_decks = rules.hide_in_decks;
        self
    }

    pub fn with_preferences(mut self, preferences: UiPreferences) -> Self {
        self.grid_size = preferences.grid_size;
        self.view_mode = preferences.view_mode;
        self.hide_in_decks = preferences.hide_in_decks;
        self
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn rule_set(&self) -> RuleSet {
        RuleSet {
            filters: self.filters.clone(),
            sorts: self.sorts.clone(),
            group_by: self.group_by.clone(),
            hide_in_decks: self.hide_in_decks,
            search: None,
        }
    }

    pub fn preferences(&self) -> UiPreferences {
        UiPreferences {
            grid_size: self.grid_size,
            view_mode: self.view_mode,
            hide_in_decks: self.hide_in_decks,
        }
    }
}
