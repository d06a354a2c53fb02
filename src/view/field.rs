//! Derived field resolver shared by the filter, sort and group components.
//!
//! Rules name fields as strings. [`Field::parse`] maps a name to either a
//! dedicated card attribute, a derived value computed from the card, or a raw
//! attribute looked up in `CardRecord::extra`.

use std::borrow::Cow;

use serde_json::Value;

use crate::card::CardRecord;
use crate::deck::{DeckLookup, NOT_IN_A_DECK};

/// Label for a card with an empty color identity.
pub const COLORLESS: &str = "Colorless";

/// A field a rule can address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Id,
    RecordId,
    Name,
    TypeLine,
    /// Type line before the first spaced em-dash: `"Creature — Elf"` → `"Creature"`.
    TypeLineMainType,
    /// Colors joined without separator, `"Colorless"` when empty.
    ColorIdentityString,
    ManaValue,
    Rarity,
    Finish,
    Count,
    Price,
    /// First assigned deck's name, `"Not in a Deck"` when unassigned.
    DeckName,
    Raw(String),
}

impl Field {
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "id" => Field::Id,
            "recordId" | "record_id" => Field::RecordId,
            "name" => Field::Name,
            "typeLine" | "type_line" => Field::TypeLine,
            "typeLineMainType" => Field::TypeLineMainType,
            "colorIdentityString" | "colorIdentity" | "color_identity" => {
                Field::ColorIdentityString
            }
            "manaValue" | "cmc" => Field::ManaValue,
            "rarity" => Field::Rarity,
            "finish" => Field::Finish,
            "count" => Field::Count,
            "price" | "priceUsd" => Field::Price,
            "deckName" | "deck" => Field::DeckName,
            other => Field::Raw(other.to_string()),
        }
    }

    pub fn resolve<'c>(&self, card: &'c CardRecord, decks: &'c dyn DeckLookup) -> FieldValue<'c> {
        match self {
            Field::Id => FieldValue::text(&card.id),
            Field::RecordId => FieldValue::text(&card.record_id),
            Field::Name => FieldValue::present(&card.name),
            Field::TypeLine => FieldValue::present(&card.type_line),
            Field::TypeLineMainType => FieldValue::present(main_type(&card.type_line)),
            Field::ColorIdentityString => {
                if card.color_identity.is_empty() {
                    FieldValue::text(COLORLESS)
                } else {
                    FieldValue::Text(Cow::Owned(
                        card.color_identity.iter().map(|c| c.symbol()).collect(),
                    ))
                }
            }
            Field::ManaValue => FieldValue::Number(card.mana_value),
            Field::Rarity => FieldValue::present(&card.rarity),
            Field::Finish => FieldValue::text(card.finish.as_str()),
            Field::Count => FieldValue::Number(f64::from(card.count)),
            Field::Price => card
                .price_usd
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::Missing),
            Field::DeckName => {
                FieldValue::text(decks.deck_name(&card.record_id).unwrap_or(NOT_IN_A_DECK))
            }
            Field::Raw(key) => card
                .extra
                .get(key)
                .map(FieldValue::from_json)
                .unwrap_or(FieldValue::Missing),
        }
    }
}

/// A resolved field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'c> {
    Text(Cow<'c, str>),
    Number(f64),
    Missing,
}

impl<'c> FieldValue<'c> {
    fn text(s: &'c str) -> Self {
        FieldValue::Text(Cow::Borrowed(s))
    }

    /// Blank text counts as absent; documents often omit these attributes.
    fn present(s: &'c str) -> Self {
        if s.trim().is_empty() {
            FieldValue::Missing
        } else {
            FieldValue::text(s)
        }
    }

    fn from_json(value: &'c Value) -> Self {
        match value {
            Value::Null => FieldValue::Missing,
            Value::String(s) => FieldValue::text(s),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Missing),
            Value::Bool(b) => FieldValue::text(if *b { "true" } else { "false" }),
            other => FieldValue::Text(Cow::Owned(other.to_string())),
        }
    }

    /// String form used by string comparisons. Missing becomes `""`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s.as_ref()),
            FieldValue::Number(n) => Cow::Owned(format_number(*n)),
            FieldValue::Missing => Cow::Borrowed(""),
        }
    }

    /// Numeric form used by numeric comparisons.
    ///
    /// Missing and blank text are `0`; text that does not parse is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n).filter(|n| !n.is_nan()),
            FieldValue::Text(s) => parse_number(s),
            FieldValue::Missing => Some(0.0),
        }
    }
}

/// Parse a rule or field value as a number. Blank is `0`.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    s.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Integral values print without a fractional part: `2.0` → `"2"`.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn main_type(type_line: &str) -> &str {
    type_line
        .split_once(" — ")
        .map(|(main, _)| main)
        .unwrap_or(type_line)
        .trim()
}
