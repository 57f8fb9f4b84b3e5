// ⚙️ Aggregation Engine - every rule against every row
// Rules are independent and pure, so a row may land in zero, one or several
// categories. Exclusivity inside a block is checked by data_quality, not here.

use crate::error::{AggregationError, Result};
use crate::instruction::Instruction;
use crate::row::M52Row;
use crate::rule_id::{Block, RuleId};
use crate::rules::RuleTable;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

// ============================================================================
// AGGREGATED ROW
// ============================================================================

/// One category of one aggregation run: the rows its rule matched and their sum
#[derive(Debug, Clone)]
pub struct AggregatedRow<'a> {
    id: RuleId,
    label: &'a str,
    rows: Vec<&'a M52Row>,
    amount: Decimal,
}

impl<'a> AggregatedRow<'a> {
    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn label(&self) -> &'a str {
        self.label
    }

    pub fn block(&self) -> Block {
        self.id.block()
    }

    pub fn rows(&self) -> &[&'a M52Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Sum of matched amounts; zero when nothing matched
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, row: &M52Row) -> bool {
        self.rows.iter().any(|matched| *matched == row)
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Output of one run: one aggregated row per rule id, plus uncategorized rows
#[derive(Debug, Clone)]
pub struct Aggregation<'a> {
    rules: &'a RuleTable,
    categories: BTreeMap<RuleId, AggregatedRow<'a>>,
    instruction_size: usize,
    uncategorized: Vec<&'a M52Row>,
}

impl<'a> Aggregation<'a> {
    /// Category by textual id; unknown ids are an error, never an empty default
    pub fn get(&self, id: &str) -> Result<&AggregatedRow<'a>> {
        id.parse::<RuleId>()
            .ok()
            .and_then(|parsed| self.categories.get(&parsed))
            .ok_or_else(|| AggregationError::UnknownRuleReference(id.to_string()))
    }

    pub fn get_id(&self, id: RuleId) -> Option<&AggregatedRow<'a>> {
        self.categories.get(&id)
    }

    /// Categories ordered by id
    pub fn iter(&self) -> impl Iterator<Item = &AggregatedRow<'a>> {
        self.categories.values()
    }

    pub fn in_block(&self, block: Block) -> impl Iterator<Item = &AggregatedRow<'a>> {
        self.categories.values().filter(move |row| row.block() == block)
    }

    /// Σ of the category sums of one block
    pub fn block_amount(&self, block: Block) -> Decimal {
        self.in_block(block).map(AggregatedRow::amount).sum()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn rule_table(&self) -> &'a RuleTable {
        self.rules
    }

    /// Rows in the instruction that was aggregated
    pub fn instruction_size(&self) -> usize {
        self.instruction_size
    }

    /// Rows no rule matched
    pub fn uncategorized(&self) -> &[&'a M52Row] {
        &self.uncategorized
    }

    pub fn categorized_count(&self) -> usize {
        self.instruction_size - self.uncategorized.len()
    }
}

// ============================================================================
// ENGINE
// ============================================================================

impl RuleTable {
    /// Evaluate every rule against every row. O(rules × rows), no ordering
    /// dependency between rules.
    pub fn aggregate<'a>(&'a self, instruction: &'a Instruction) -> Aggregation<'a> {
        let rows: Vec<&M52Row> = instruction.rows().collect();
        let mut categorized = vec![false; rows.len()];
        let mut categories = BTreeMap::new();

        for rule in self.iter() {
            let mut matched = Vec::new();
            let mut amount = Decimal::ZERO;

            for (position, row) in rows.iter().enumerate() {
                if rule.matches(row) {
                    categorized[position] = true;
                    amount += row.amount();
                    matched.push(*row);
                }
            }

            categories.insert(
                rule.id,
                AggregatedRow {
                    id: rule.id,
                    label: &rule.label,
                    rows: matched,
                    amount,
                },
            );
        }

        let uncategorized: Vec<&M52Row> = rows
            .iter()
            .zip(&categorized)
            .filter(|(_, hit)| !**hit)
            .map(|(row, _)| *row)
            .collect();

        if !uncategorized.is_empty() {
            let amount: Decimal = uncategorized.iter().map(|row| row.amount()).sum();
            tracing::warn!(
                uncategorized = uncategorized.len(),
                rows = rows.len(),
                %amount,
                "rows matched no aggregation rule"
            );
        }
        tracing::debug!(rules = self.len(), rows = rows.len(), "aggregation complete");

        Aggregation {
            rules: self,
            categories,
            instruction_size: rows.len(),
            uncategorized,
        }
    }
}

/// Aggregate with the standard M52 rule table
pub fn aggregate(instruction: &Instruction) -> Result<Aggregation<'_>> {
    Ok(RuleTable::standard()?.aggregate(instruction))
}

// ============================================================================
// TESTS
// ============================================================================
