//! Typed query DSL request bodies
//!
//! Only the clauses this client emits are modelled; serialization matches the
//! backend's externally-tagged query DSL shapes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::SortOrder;

/// Body of a scrolled search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchBody {
    pub query: QueryClause,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortClause>,
    pub size: usize,
}

/// One query clause, externally tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryClause {
    Bool(Box<BoolClause>),
    Range(HashMap<String, RangeClause>),
    Match(HashMap<String, String>),
    MatchPhrase(HashMap<String, String>),
    MatchAll(MatchAllClause),
}

impl QueryClause {
    pub fn range(field: &str, clause: RangeClause) -> Self {
        let mut map = HashMap::new();
        map.insert(field.to_string(), clause);
        Self::Range(map)
    }

    pub fn match_field(field: &str, value: impl Into<String>) -> Self {
        let mut map = HashMap::new();
        map.insert(field.to_string(), value.into());
        Self::Match(map)
    }

    pub fn match_phrase(field: &str, value: impl Into<String>) -> Self {
        let mut map = HashMap::new();
        map.insert(field.to_string(), value.into());
        Self::MatchPhrase(map)
    }

    pub fn match_all() -> Self {
        Self::MatchAll(MatchAllClause {})
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoolClause {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<QueryClause>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<QueryClause>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<QueryClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchAllClause {}

/// Range bounds on a field. Unset bounds are omitted from the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeClause {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<i64>,
}

impl RangeClause {
    /// `[start, end]`, both bounds included.
    pub fn inclusive(start: i64, end: i64) -> Self {
        Self {
            gte: Some(start),
            lte: Some(end),
            ..Default::default()
        }
    }

    /// `[start, end)`.
    pub fn half_open(start: i64, end: i64) -> Self {
        Self {
            gte: Some(start),
            lt: Some(end),
            ..Default::default()
        }
    }
}

/// One sort directive: `{ "<field>": { "order": "asc" } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortClause(pub HashMap<String, SortDirective>);

impl SortClause {
    pub fn on(field: &str, order: SortOrder) -> Self {
        let mut map = HashMap::new();
        map.insert(field.to_string(), SortDirective::from(order));
        Self(map)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortDirective {
    pub order: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl From<SortOrder> for SortDirective {
    fn from(order: SortOrder) -> Self {
        let order = match order {
            SortOrder::Asc => SortDirection::Asc,
            SortOrder::Desc => SortDirection::Desc,
        };
        Self { order }
    }
}
