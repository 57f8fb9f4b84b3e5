// ✅ Data Quality - coverage and exclusivity checks over an aggregation
// Categories of one block are meant to be disjoint and exhaustive; nothing
// enforces that at runtime, so this module measures it.

use crate::aggregation::Aggregation;
use crate::row::{AccountingKind, M52Row, RawM52Row};
use crate::rule_id::{Block, RuleId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // A block total is wrong (row counted twice)
    Warning,  // Real operation left out of every category
    Info,     // Order operation, never aggregated
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub row: RawM52Row,
    pub issue: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_ids: Vec<RuleId>,
}

/// A row claimed by more than one category of the same block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap<'a> {
    pub row: &'a M52Row,
    pub block: Block,
    pub rule_ids: Vec<RuleId>,
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityReport {
    pub total_rows: usize,
    pub categorized_rows: usize,
    pub uncategorized_rows: usize,
    pub uncategorized_amount: Decimal,
    pub overlapping_rows: usize,
    pub issues: Vec<QualityIssue>,
}

impl DataQualityReport {
    pub fn from_aggregation(aggregation: &Aggregation<'_>) -> Self {
        let mut issues = Vec::new();

        for row in aggregation.uncategorized() {
            let (severity, issue) = match row.accounting_kind() {
                AccountingKind::Real => (Severity::Warning, "row matches no aggregation rule"),
                _ => (Severity::Info, "order operation, outside aggregated categories"),
            };
            issues.push(QualityIssue {
                severity,
                row: RawM52Row::from(*row),
                issue: issue.to_string(),
                rule_ids: Vec::new(),
            });
        }

        let overlaps = find_overlaps(aggregation);
        for overlap in &overlaps {
            issues.push(QualityIssue {
                severity: Severity::Critical,
                row: RawM52Row::from(overlap.row),
                issue: format!("row counted by {} categories of {}", overlap.rule_ids.len(), overlap.block),
                rule_ids: overlap.rule_ids.clone(),
            });
        }

        if !overlaps.is_empty() {
            tracing::warn!(overlaps = overlaps.len(), "rows double counted inside a block");
        }

        DataQualityReport {
            total_rows: aggregation.instruction_size(),
            categorized_rows: aggregation.categorized_count(),
            uncategorized_rows: aggregation.uncategorized().len(),
            uncategorized_amount: aggregation.uncategorized().iter().map(|row| row.amount()).sum(),
            overlapping_rows: overlaps.len(),
            issues,
        }
    }

    /// Share of rows that landed in at least one category (1.0 when empty)
    pub fn coverage(&self) -> f64 {
        if self.total_rows == 0 {
            1.0
        } else {
            self.categorized_rows as f64 / self.total_rows as f64
        }
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows: {:.1}% categorized, {} uncategorized ({}), {} double counted",
            self.total_rows,
            self.coverage() * 100.0,
            self.uncategorized_rows,
            self.uncategorized_amount,
            self.overlapping_rows
        )
    }
}

/// Rows matched by several rules of one block, ordered by block then row
pub fn find_overlaps<'a>(aggregation: &Aggregation<'a>) -> Vec<Overlap<'a>> {
    let mut overlaps = Vec::new();

    for block in Block::ALL {
        let mut memberships: HashMap<&'a M52Row, Vec<RuleId>> = HashMap::new();
        for category in aggregation.in_block(block) {
            for row in category.rows() {
                memberships.entry(*row).or_default().push(category.id());
            }
        }

        let mut block_overlaps: Vec<Overlap<'a>> = memberships
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(row, rule_ids)| Overlap { row, block, rule_ids })
            .collect();
        block_overlaps.sort_by(|a, b| a.row.cmp(b.row));
        overlaps.extend(block_overlaps);
    }

    overlaps
}

// ============================================================================
// TESTS
// ============================================================================
