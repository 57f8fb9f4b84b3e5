// 📤 Aggregation report - the output contract for visualization and reporting

use crate::aggregation::Aggregation;
use crate::data_quality::DataQualityReport;
use crate::m52_rules::RULE_TABLE_VERSION;
use crate::rule_id::RuleId;
use crate::totals::{category_summaries, BudgetTotals, CategorySummary};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitySummary {
    pub total_rows: usize,
    pub categorized_rows: usize,
    pub uncategorized_rows: usize,
    pub uncategorized_amount: Decimal,
    pub overlapping_rows: usize,
}

impl From<&DataQualityReport> for QualitySummary {
    fn from(report: &DataQualityReport) -> Self {
        QualitySummary {
            total_rows: report.total_rows,
            categorized_rows: report.categorized_rows,
            uncategorized_rows: report.uncategorized_rows,
            uncategorized_amount: report.uncategorized_amount,
            overlapping_rows: report.overlapping_rows,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    pub rule_table_version: String,
    /// Lets consumers detect a changed vocabulary
    pub rule_table_fingerprint: String,
    pub generated_at: DateTime<Utc>,
    pub categories: BTreeMap<RuleId, CategorySummary>,
    pub totals: BudgetTotals,
    pub quality: QualitySummary,
}

impl AggregationReport {
    pub fn from_aggregation(aggregation: &Aggregation<'_>) -> Self {
        let quality = DataQualityReport::from_aggregation(aggregation);

        AggregationReport {
            rule_table_version: RULE_TABLE_VERSION.to_string(),
            rule_table_fingerprint: aggregation.rule_table().fingerprint(),
            generated_at: Utc::now(),
            categories: category_summaries(aggregation),
            totals: BudgetTotals::from_aggregation(aggregation),
            quality: QualitySummary::from(&quality),
        }
    }

    pub fn category(&self, id: RuleId) -> Option<&CategorySummary> {
        self.categories.get(&id)
    }
}
