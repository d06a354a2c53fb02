//! Card records - the owned-card unit every view operates over.

mod collection;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub use collection::{Collection, CollectionError, CollectionSummary};

/// A color of mana in a card's color identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    W,
    U,
    B,
    R,
    G,
}

impl Color {
    pub fn symbol(self) -> char {
        match self {
            Color::W => 'W',
            Color::U => 'U',
            Color::B => 'B',
            Color::R => 'R',
            Color::G => 'G',
        }
    }
}

/// Physical finish of an owned card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finish {
    #[default]
    Nonfoil,
    Foil,
    Etched,
}

impl Finish {
    pub fn as_str(self) -> &'static str {
        match self {
            Finish::Nonfoil => "nonfoil",
            Finish::Foil => "foil",
            Finish::Etched => "etched",
        }
    }
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One owned stack of a specific printing and finish.
///
/// `count == 0` marks the record as logically deleted: views never return it
/// and [`Collection`] drops it. Attributes without a dedicated field (set code,
/// condition, notes, ...) live in `extra` and stay addressable by name from
/// filter, sort and group rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: String,
    #[serde(default)]
    pub record_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "type_line")]
    pub type_line: String,
    #[serde(default, alias = "color_identity")]
    pub color_identity: Vec<Color>,
    #[serde(default, alias = "cmc")]
    pub mana_value: f64,
    #[serde(default)]
    pub rarity: String,
    #[serde(default)]
    pub finish: Finish,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price_usd: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_count() -> u32 {
    1
}

/// Prices arrive either as numbers or as the decimal strings card APIs return.
fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<RawPrice>::deserialize(deserializer)? {
        Some(RawPrice::Number(n)) => Some(n),
        Some(RawPrice::Text(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        None => None,
    })
}

impl CardRecord {
    /// A single nonfoil copy with no other attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            record_id: String::new(),
            name: name.into(),
            type_line: String::new(),
            color_identity: Vec::new(),
            mana_value: 0.0,
            rarity: String::new(),
            finish: Finish::default(),
            count: 1,
            price_usd: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = record_id.into();
        self
    }

    pub fn with_type_line(mut self, type_line: impl Into<String>) -> Self {
        self.type_line = type_line.into();
        self
    }

    pub fn with_colors(mut self, colors: impl IntoIterator<Item = Color>) -> Self {
        self.color_identity = colors.into_iter().collect();
        self
    }

    pub fn with_mana_value(mut self, mana_value: f64) -> Self {
        self.mana_value = mana_value;
        self
    }

    pub fn with_rarity(mut self, rarity: impl Into<String>) -> Self {
        self.rarity = rarity.into();
        self
    }

    pub fn with_finish(mut self, finish: Finish) -> Self {
        self.finish = finish;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_price(mut self, price_usd: f64) -> Self {
        self.price_usd = Some(price_usd);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.count == 0
    }

    /// `count × price`, with unpriced cards worth nothing.
    pub fn total_value(&self) -> f64 {
        self.price_usd.unwrap_or(0.0) * f64::from(self.count)
    }
}
