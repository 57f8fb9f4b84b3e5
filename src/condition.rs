// 🧩 Conditions - rule predicates as data
// A tagged tree of field tests, so rules can be serialized, audited and
// tested in isolation instead of hiding inside closures

use crate::row::{Field, M52Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Ignore the row entirely (always true)
    Wildcard,

    /// Field equals value exactly
    Equals { field: Field, value: String },

    /// Field starts with value (case-sensitive)
    PrefixMatch { field: Field, value: String },

    /// Field equals one of the values
    MemberOf { field: Field, values: Vec<String> },

    Not { condition: Box<Condition> },

    /// True when every operand is true; empty is true
    And { conditions: Vec<Condition> },

    /// True when any operand is true; empty is false
    Or { conditions: Vec<Condition> },
}

impl Condition {
    /// Evaluate against a row. Pure: no state, no mutation.
    ///
    /// Leaf tests on an absent field (a row without chapter) are false;
    /// `Not` then turns that into true.
    pub fn matches(&self, row: &M52Row) -> bool {
        match self {
            Condition::Wildcard => true,
            Condition::Equals { field, value } => row.field(*field) == Some(value.as_str()),
            Condition::PrefixMatch { field, value } => row
                .field(*field)
                .map_or(false, |actual| actual.starts_with(value.as_str())),
            Condition::MemberOf { field, values } => row
                .field(*field)
                .map_or(false, |actual| values.iter().any(|v| v == actual)),
            Condition::Not { condition } => !condition.matches(row),
            Condition::And { conditions } => conditions.iter().all(|c| c.matches(row)),
            Condition::Or { conditions } => conditions.iter().any(|c| c.matches(row)),
        }
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        match self {
            Condition::Not { condition } => 1 + condition.size(),
            Condition::And { conditions } | Condition::Or { conditions } => {
                1 + conditions.iter().map(Condition::size).sum::<usize>()
            }
            _ => 1,
        }
    }

    // ========================================================================
    // BUILDERS
    // ========================================================================

    pub fn equals(field: Field, value: impl Into<String>) -> Self {
        Condition::Equals {
            field,
            value: value.into(),
        }
    }

    pub fn prefix(field: Field, value: impl Into<String>) -> Self {
        Condition::PrefixMatch {
            field,
            value: value.into(),
        }
    }

    pub fn member_of(field: Field, values: &[&str]) -> Self {
        Condition::MemberOf {
            field,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn not(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::And { conditions }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Or { conditions }
    }

    pub fn article(value: &str) -> Self {
        Condition::equals(Field::Article, value)
    }

    pub fn article_prefix(value: &str) -> Self {
        Condition::prefix(Field::Article, value)
    }

    /// Article starts with any of the prefixes
    pub fn article_prefixes(values: &[&str]) -> Self {
        Condition::any(values.iter().map(|v| Condition::article_prefix(v)).collect())
    }

    pub fn articles(values: &[&str]) -> Self {
        Condition::member_of(Field::Article, values)
    }

    pub fn chapter(value: &str) -> Self {
        Condition::equals(Field::Chapter, value)
    }

    pub fn functional_code(value: &str) -> Self {
        Condition::equals(Field::FunctionalCode, value)
    }

    pub fn functions(values: &[&str]) -> Self {
        Condition::member_of(Field::Function, values)
    }
}

// ============================================================================
// TESTS
// ============================================================================
