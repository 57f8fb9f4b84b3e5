// M52 Aggregation - Core Library
// Classifies M52 ledger rows into aggregated budget categories.
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod row;
pub mod instruction;
pub mod condition;
pub mod rule_id;
pub mod rules;
pub mod m52_rules;
pub mod aggregation;
pub mod totals;
pub mod data_quality;
pub mod report;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use error::{AggregationError, Result};
pub use row::{AccountingKind, BudgetSection, Field, M52Row, OperationKind, RawM52Row, MAX_ABS_AMOUNT};
pub use instruction::Instruction;
pub use condition::Condition;
pub use rule_id::{Block, RuleId};
pub use rules::{RuleDefinition, RuleTable};
pub use m52_rules::{DECLARED_RULE_COUNT, RULE_TABLE_VERSION};
pub use aggregation::{aggregate, AggregatedRow, Aggregation};
pub use totals::{Brick, BudgetTotals, CategorySummary};
pub use data_quality::{DataQualityReport, Overlap, QualityIssue, Severity};
pub use report::AggregationReport;

use std::sync::Once;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "m52_aggregation={level},m52_aggregate={level},m52_server={level}"
            ))
        });

        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    });
}
