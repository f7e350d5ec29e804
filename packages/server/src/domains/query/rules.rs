// Intent rule table
//
// Rules are evaluated top to bottom against the lower-cased query. Order is
// the tie-break: a query matching several predicates goes to the earliest.

use std::cmp::Reverse;

use super::answer::QueryType;

pub type Predicate = fn(&str) -> bool;

/// A keyword predicate and the intent it selects
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub query_type: QueryType,
    pub predicate: Predicate,
}

impl IntentRule {
    /// `query` must already be lower-cased
    pub fn matches(&self, query: &str) -> bool {
        (self.predicate)(query)
    }
}

/// Classification policy, highest priority first. System overview is the
/// fallback and has no entry.
pub static RULE_TABLE: [IntentRule; 6] = [
    IntentRule {
        query_type: QueryType::MaintenanceHistory,
        predicate: names_maintenance_target,
    },
    IntentRule {
        query_type: QueryType::FilteredMaintenance,
        predicate: asks_heating_complaints_2023,
    },
    IntentRule {
        query_type: QueryType::ExpiringLeases,
        predicate: asks_expiring_leases,
    },
    IntentRule {
        query_type: QueryType::FinancialSummary,
        predicate: asks_maintenance_cost,
    },
    IntentRule {
        query_type: QueryType::LeaseTypeInfo,
        predicate: asks_triple_net,
    },
    IntentRule {
        query_type: QueryType::RecurringIssues,
        predicate: asks_recurring_issues,
    },
];

/// Rules whose predicate holds, in table order
pub fn matching_rules(query: &str) -> impl Iterator<Item = &'static IntentRule> + '_ {
    RULE_TABLE.iter().filter(move |rule| rule.matches(query))
}

/// Lower-case once; every predicate works on the result.
pub fn normalize_query(text: &str) -> String {
    text.to_lowercase()
}

fn names_maintenance_target(query: &str) -> bool {
    MaintenanceTarget::resolve(query).is_some()
}

fn asks_heating_complaints_2023(query: &str) -> bool {
    query.contains("heating") && query.contains("2023")
}

fn asks_expiring_leases(query: &str) -> bool {
    query.contains("lease") && (query.contains("expir") || query.contains("end"))
}

fn asks_maintenance_cost(query: &str) -> bool {
    query.contains("maintenance") && query.contains("cost")
}

fn asks_triple_net(query: &str) -> bool {
    query.contains("triple net") || query.contains("nnn")
}

fn asks_recurring_issues(query: &str) -> bool {
    query.contains("recurring") || query.contains("multiple")
}

// =============================================================================
// Maintenance history targets
// =============================================================================

/// Maintenance categories recognised in a query. Each keyword is also the
/// stored category value.
pub const CATEGORY_KEYWORDS: [&str; 6] = [
    "roof",
    "plumbing",
    "heating",
    "electrical",
    "painting",
    "gardening",
];

/// Words in a query that identify a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyAlias {
    pub property_id: &'static str,
    pub tokens: &'static [&'static str],
}

pub const PROPERTY_ALIASES: [PropertyAlias; 6] = [
    PropertyAlias {
        property_id: "12_elm_street",
        tokens: &["elm", "12"],
    },
    PropertyAlias {
        property_id: "45_oak_avenue",
        tokens: &["oak", "45"],
    },
    PropertyAlias {
        property_id: "78_pine_road",
        tokens: &["pine", "78"],
    },
    PropertyAlias {
        property_id: "mumbai_galaxy",
        tokens: &["mumbai", "galaxy"],
    },
    PropertyAlias {
        property_id: "bangalore_tech",
        tokens: &["bangalore", "koramangala"],
    },
    PropertyAlias {
        property_id: "delhi_villa",
        tokens: &["delhi", "villa"],
    },
];

impl PropertyAlias {
    /// How strongly the query names this property. Numbers only count as
    /// whole words, so "villa 12" does not point at 12 Elm Street as firmly
    /// as it points at the villa.
    pub fn strength(&self, query: &str) -> AliasStrength {
        let mut strength = AliasStrength::default();
        for token in self.tokens {
            if token.chars().all(|c| c.is_ascii_digit()) {
                if contains_word(query, token) {
                    strength.numbers += 1;
                }
            } else if query.contains(token) {
                strength.names += 1;
            }
        }
        strength
    }
}

/// Named tokens outrank numbers; compared field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct AliasStrength {
    pub names: usize,
    pub numbers: usize,
}

fn contains_word(query: &str, word: &str) -> bool {
    query
        .split(|c: char| !c.is_alphanumeric())
        .any(|candidate| candidate == word)
}

/// The (property, category) pair a maintenance history question is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceTarget {
    pub property_id: &'static str,
    pub category: &'static str,
}

impl MaintenanceTarget {
    /// First category keyword and the most strongly named property. Aliases
    /// of equal strength go to the earliest in the table.
    pub fn resolve(query: &str) -> Option<Self> {
        let category = CATEGORY_KEYWORDS
            .iter()
            .copied()
            .find(|keyword| query.contains(keyword))?;
        let alias = PROPERTY_ALIASES
            .iter()
            .map(|alias| (alias, alias.strength(query)))
            .filter(|(_, strength)| *strength > AliasStrength::default())
            .min_by_key(|(_, strength)| Reverse(*strength))
            .map(|(alias, _)| alias)?;
        Some(Self {
            property_id: alias.property_id,
            category,
        })
    }
}
