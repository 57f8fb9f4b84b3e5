// 🏷️ Aggregation Rules - Rules as Data
// Each aggregated category is an id plus a declarative condition over M52 rows

use crate::condition::Condition;
use crate::error::{AggregationError, Result};
use crate::m52_rules;
use crate::row::M52Row;
use crate::rule_id::{Block, RuleId};
use anyhow::Context as AnyhowContext;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Stable category id, e.g. "RF-1-1"
    pub id: RuleId,

    /// Category name as shown to readers of the budget
    pub label: String,

    /// Which rows belong to the category
    pub condition: Condition,
}

impl RuleDefinition {
    /// Build a definition, parsing the id
    pub fn new(id: &str, label: impl Into<String>, condition: Condition) -> Result<Self> {
        Ok(RuleDefinition {
            id: id.parse()?,
            label: label.into(),
            condition,
        })
    }

    pub fn matches(&self, row: &M52Row) -> bool {
        self.condition.matches(row)
    }

    pub fn block(&self) -> Block {
        self.id.block()
    }
}

// ============================================================================
// RULE TABLE
// ============================================================================

static STANDARD_TABLE: OnceCell<RuleTable> = OnceCell::new();

/// Validated, read-only set of rule definitions, ordered by id
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<RuleDefinition>,
    index: HashMap<RuleId, usize>,
}

impl RuleTable {
    /// Build a table; duplicate ids are a fatal configuration error
    pub fn from_rules(mut rules: Vec<RuleDefinition>) -> Result<Self> {
        rules.sort_by_key(|rule| rule.id);

        let mut index = HashMap::with_capacity(rules.len());
        for (position, rule) in rules.iter().enumerate() {
            if index.insert(rule.id, position).is_some() {
                return Err(AggregationError::DuplicateRuleId(rule.id.to_string()));
            }
        }

        Ok(RuleTable { rules, index })
    }

    /// Parse a JSON array of definitions
    pub fn from_json_str(json: &str) -> Result<Self> {
        let rules: Vec<RuleDefinition> = serde_json::from_str(json)?;
        RuleTable::from_rules(rules)
    }

    /// Load rules from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read rules file: {:?}", path.as_ref()))?;

        let table = RuleTable::from_json_str(&content).context("Failed to load rules JSON")?;
        tracing::info!(
            rules = table.len(),
            fingerprint = %table.fingerprint(),
            "rule table loaded from {:?}",
            path.as_ref()
        );
        Ok(table)
    }

    /// The fixed M52 table, built once per process
    pub fn standard() -> Result<&'static RuleTable> {
        STANDARD_TABLE.get_or_try_init(|| {
            let table = RuleTable::from_rules(m52_rules::definitions()?)?;
            tracing::info!(
                rules = table.len(),
                version = m52_rules::RULE_TABLE_VERSION,
                "standard M52 rule table initialized"
            );
            Ok(table)
        })
    }

    /// Look up a rule by its textual id
    pub fn get(&self, id: &str) -> Result<&RuleDefinition> {
        id.parse::<RuleId>()
            .ok()
            .and_then(|parsed| self.get_id(parsed))
            .ok_or_else(|| AggregationError::UnknownRuleReference(id.to_string()))
    }

    pub fn get_id(&self, id: RuleId) -> Option<&RuleDefinition> {
        self.index.get(&id).map(|&position| &self.rules[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.rules.iter().map(|rule| rule.id)
    }

    pub fn in_block(&self, block: Block) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter().filter(move |rule| rule.block() == block)
    }

    /// Ids of every rule the row satisfies
    pub fn classify(&self, row: &M52Row) -> Vec<RuleId> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(row))
            .map(|rule| rule.id)
            .collect()
    }

    /// Get number of rules loaded
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// SHA-256 over the serialized definitions; changes whenever the vocabulary
    /// or any condition changes
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for rule in &self.rules {
            // serializing plain data into memory cannot fail
            if let Ok(bytes) = serde_json::to_vec(rule) {
                hasher.update(&bytes);
            }
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rules)?)
    }
}

// ============================================================================
// TESTS
// ============================================================================
