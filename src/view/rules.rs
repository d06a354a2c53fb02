//! Declarative rule types: filters, sorts, group keys and the rule set that
//! bundles them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison applied by a [`FilterRule`].
///
/// Parsed case-insensitively. Anything unrecognised is kept as `Unknown` and
/// matches every card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Contains,
    Equals,
    Gt,
    Lt,
    Unknown(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::Equals => "equals",
            FilterOperator::Gt => "gt",
            FilterOperator::Lt => "lt",
            FilterOperator::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for FilterOperator {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "contains" => FilterOperator::Contains,
            "equals" => FilterOperator::Equals,
            "gt" => FilterOperator::Gt,
            "lt" => FilterOperator::Lt,
            _ => FilterOperator::Unknown(raw.to_string()),
        }
    }
}

impl From<String> for FilterOperator {
    fn from(raw: String) -> Self {
        FilterOperator::from(raw.as_str())
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `field operator value`, e.g. `typeLineMainType equals creature`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    #[serde(alias = "column")]
    pub field: String,
    #[serde(alias = "op")]
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: String,
}

impl FilterRule {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<FilterOperator>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

// Anything other than "asc" sorts descending, matching how saved views have
// always been interpreted.
impl From<String> for SortDirection {
    fn from(raw: String) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

impl From<SortDirection> for String {
    fn from(direction: SortDirection) -> Self {
        direction.as_str().to_string()
    }
}

/// One sort key. A list of these is a priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRule {
    #[serde(alias = "column")]
    pub field: String,
    #[serde(default, alias = "dir")]
    pub direction: SortDirection,
}

impl SortRule {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Everything the view engine needs to materialize a card list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    #[serde(default)]
    pub filters: Vec<FilterRule>,
    #[serde(default)]
    pub sorts: Vec<SortRule>,
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub hide_in_decks: bool,
    /// Free-text search over name and type line. Never persisted.
    #[serde(skip)]
    pub search: Option<String>,
}

impl RuleSet {
    /// No filters, no sorts, no grouping.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.sorts.is_empty()
            && self.group_keys().next().is_none()
            && !self.hide_in_decks
            && self.search_text().is_none()
    }

    pub fn filter(mut self, rule: FilterRule) -> Self {
        self.filters.push(rule);
        self
    }

    pub fn sort(mut self, rule: SortRule) -> Self {
        self.sorts.push(rule);
        self
    }

    pub fn group(mut self, key: impl Into<String>) -> Self {
        self.group_by.push(key.into());
        self
    }

    pub fn hide_in_decks(mut self, hide: bool) -> Self {
        self.hide_in_decks = hide;
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Group keys with blank entries dropped.
    pub fn group_keys(&self) -> impl Iterator<Item = &str> {
        self.group_by
            .iter()
            .map(|key| key.trim())
            .filter(|key| !key.is_empty())
    }

    pub(crate) fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}
