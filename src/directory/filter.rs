// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::lenient;
use crate::store::{non_empty_str, Fields};

/// Fields searched by the free-text clause
const SEARCH_FIELDS: [&str; 10] = [
    "full_name",
    "name",
    "displayName",
    "primary_position",
    "position",
    "nationality",
    "current_club",
    "club_name",
    "country",
    "city",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Independent,
    Dependent,
}

impl AccountKind {
    /// Independent players are the ones with a `player` account of their own
    fn matches(self, fields: &Fields) -> bool {
        let independent = non_empty_str(fields, "accountType") == Some("player");
        match self {
            AccountKind::Independent => independent,
            AccountKind::Dependent => !independent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeBracket {
    Under16,
    Under18,
    Under21,
    Senior,
}

impl AgeBracket {
    pub fn contains(self, age: u32) -> bool {
        match self {
            AgeBracket::Under16 => age < 16,
            AgeBracket::Under18 => (16..18).contains(&age),
            AgeBracket::Under21 => (18..21).contains(&age),
            AgeBracket::Senior => age >= 21,
        }
    }
}

/// Directory filter. Every clause is optional; an absent clause matches all
/// players and so does the literal `all` or any unrecognised bracket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryFilter {
    pub search: Option<String>,
    pub position: Option<String>,
    pub nationality: Option<String>,
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub account_type: Option<AccountKind>,
    #[serde(default, deserialize_with = "lenient")]
    pub age: Option<AgeBracket>,
    #[serde(default, deserialize_with = "lenient")]
    pub dependency: Option<AccountKind>,
    pub status: Option<String>,
    pub skill_level: Option<String>,
    pub objective: Option<String>,
}

fn clause(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

fn field_equals(fields: &Fields, key: &str, expected: &str) -> bool {
    fields.get(key).and_then(Value::as_str) == Some(expected)
}

/// Whether a player's objectives include `objective`. Lists match by
/// element, maps by a key set to true, text by substring.
fn has_objective(fields: &Fields, objective: &str) -> bool {
    match fields.get("objectives") {
        Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(objective)),
        Some(Value::Object(map)) => map.get(objective).and_then(Value::as_bool) == Some(true),
        Some(Value::String(text)) => text.contains(objective),
        _ => false,
    }
}

impl DirectoryFilter {
    /// Whether a merged player document passes every clause. `age` is the
    /// player's display age, if known.
    pub fn matches(&self, fields: &Fields, age: Option<u32>) -> bool {
        if let Some(search) = clause(&self.search) {
            let needle = search.to_lowercase();
            let haystack = SEARCH_FIELDS
                .iter()
                .filter_map(|key| non_empty_str(fields, key))
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }

        if let Some(position) = clause(&self.position) {
            if !field_equals(fields, "primary_position", position)
                && !field_equals(fields, "position", position)
            {
                return false;
            }
        }

        if let Some(nationality) = clause(&self.nationality) {
            if !field_equals(fields, "nationality", nationality) {
                return false;
            }
        }

        if let Some(country) = clause(&self.country) {
            if !field_equals(fields, "country", country) {
                return false;
            }
        }

        if let Some(kind) = self.account_type {
            if !kind.matches(fields) {
                return false;
            }
        }

        if let Some(bracket) = self.age {
            // players without a known, positive age never match a bracket
            match age {
                Some(age) if age > 0 && bracket.contains(age) => {}
                _ => return false,
            }
        }

        if let Some(kind) = self.dependency {
            if !kind.matches(fields) {
                return false;
            }
        }

        if let Some(status) = clause(&self.status) {
            if !field_equals(fields, "status", status) {
                return false;
            }
        }

        if let Some(level) = clause(&self.skill_level) {
            if !field_equals(fields, "skill_level", level) {
                return false;
            }
        }

        if let Some(objective) = clause(&self.objective) {
            if !has_objective(fields, objective) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = DirectoryFilter {
            position: Some("all".into()),
            ..Default::default()
        };
        assert!(filter.matches(&Fields::new(), None));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let player = fields(json!({ "full_name": "Karim Benali", "city": "وهران" }));
        let filter = |q: &str| DirectoryFilter {
            search: Some(q.into()),
            ..Default::default()
        };

        assert!(filter("karim").matches(&player, None));
        assert!(filter("وهران").matches(&player, None));
        assert!(!filter("zidane").matches(&player, None));
    }

    #[test]
    fn position_checks_legacy_field() {
        let filter = DirectoryFilter {
            position: Some("وسط".into()),
            ..Default::default()
        };
        assert!(filter.matches(&fields(json!({ "position": "وسط" })), None));
        assert!(!filter.matches(&fields(json!({ "primary_position": "مهاجم صريح" })), None));
    }

    #[test]
    fn age_brackets_are_half_open() {
        let filter = |bracket| DirectoryFilter {
            age: Some(bracket),
            ..Default::default()
        };
        let doc = Fields::new();

        assert!(filter(AgeBracket::Under16).matches(&doc, Some(15)));
        assert!(!filter(AgeBracket::Under16).matches(&doc, Some(16)));
        assert!(filter(AgeBracket::Under18).matches(&doc, Some(16)));
        assert!(filter(AgeBracket::Under21).matches(&doc, Some(18)));
        assert!(!filter(AgeBracket::Under21).matches(&doc, Some(21)));
        assert!(filter(AgeBracket::Senior).matches(&doc, Some(21)));
        assert!(!filter(AgeBracket::Senior).matches(&doc, None));
        assert!(!filter(AgeBracket::Under16).matches(&doc, Some(0)));
    }

    #[test]
    fn account_type_splits_independent_players() {
        let independent = fields(json!({ "accountType": "player" }));
        let dependent = fields(json!({ "club_id": "c1" }));
        let filter = DirectoryFilter {
            account_type: Some(AccountKind::Dependent),
            ..Default::default()
        };

        assert!(filter.matches(&dependent, None));
        assert!(!filter.matches(&independent, None));
    }

    #[test]
    fn objectives_match_lists_and_maps() {
        let filter = DirectoryFilter {
            objective: Some("professional".into()),
            ..Default::default()
        };
        assert!(filter.matches(&fields(json!({ "objectives": ["professional"] })), None));
        assert!(filter.matches(&fields(json!({ "objectives": { "professional": true } })), None));
        assert!(!filter.matches(&fields(json!({ "objectives": { "professional": false } })), None));
        assert!(!filter.matches(&Fields::new(), None));
    }
}
