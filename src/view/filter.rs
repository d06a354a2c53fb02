//! Filter predicate compiler.

use crate::card::CardRecord;
use crate::deck::DeckLookup;

use super::field::{parse_number, Field};
use super::rules::{FilterOperator, FilterRule};

#[derive(Debug, Clone)]
enum Test {
    Contains(String),
    Equals(String),
    Gt(Option<f64>),
    Lt(Option<f64>),
    Pass,
}

/// A compiled [`FilterRule`].
///
/// Never fails: string tests treat a missing value as `""`, numeric tests
/// treat it as `0`, and a value that does not parse as a number fails the
/// test. Unknown operators pass every card.
#[derive(Debug, Clone)]
pub struct Predicate {
    field: Field,
    test: Test,
}

impl Predicate {
    pub fn compile(rule: &FilterRule) -> Self {
        let test = match &rule.operator {
            FilterOperator::Contains => Test::Contains(rule.value.to_lowercase()),
            FilterOperator::Equals => Test::Equals(rule.value.to_lowercase()),
            FilterOperator::Gt => Test::Gt(parse_number(&rule.value)),
            FilterOperator::Lt => Test::Lt(parse_number(&rule.value)),
            FilterOperator::Unknown(op) => {
                tracing::debug!(field = %rule.field, operator = %op, "unknown filter operator, rule ignored");
                Test::Pass
            }
        };
        Self {
            field: Field::parse(&rule.field),
            test,
        }
    }

    pub fn matches(&self, card: &CardRecord, decks: &dyn DeckLookup) -> bool {
        if let Test::Pass = self.test {
            return true;
        }

        let value = self.field.resolve(card, decks);
        match &self.test {
            Test::Contains(needle) => value.as_text().to_lowercase().contains(needle.as_str()),
            Test::Equals(expected) => value.as_text().to_lowercase() == *expected,
            Test::Gt(bound) => match (value.as_number(), bound) {
                (Some(n), Some(bound)) => n > *bound,
                _ => false,
            },
            Test::Lt(bound) => match (value.as_number(), bound) {
                (Some(n), Some(bound)) => n < *bound,
                _ => false,
            },
            Test::Pass => true,
        }
    }
}

/// A conjunction of compiled filters.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    pub fn compile(rules: &[FilterRule]) -> Self {
        Self {
            predicates: rules.iter().map(Predicate::compile).collect(),
        }
    }

    pub fn matches(&self, card: &CardRecord, decks: &dyn DeckLookup) -> bool {
        self.predicates.iter().all(|p| p.matches(card, decks))
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
