use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use m52_aggregation::{
    init_tracing, AggregationReport, DataQualityReport, Instruction, RuleTable, RULE_TABLE_VERSION,
};

/// Aggregate M52 ledger rows into budget categories
#[derive(Debug, Parser)]
#[command(name = "m52-aggregate", version, about)]
struct Cli {
    /// Log level when RUST_LOG is not set
    #[arg(long, env = "M52_LOG", default_value = "info", global = true)]
    log_level: String,

    /// Alternate rule table (JSON); the standard M52 table otherwise
    #[arg(long, env = "M52_RULES", global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the aggregation report of an instruction
    Aggregate {
        /// JSON array of M52 rows
        file: PathBuf,

        #[arg(long)]
        pretty: bool,
    },

    /// List the rule table
    Rules {
        /// Print full definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the rows one category matched
    Explain {
        file: PathBuf,
        rule_id: String,
    },

    /// Coverage and double-counting checks; fails on critical issues
    Quality {
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let custom_table;
    let table: &RuleTable = match &cli.rules {
        Some(path) => {
            custom_table = RuleTable::from_file(path)?;
            &custom_table
        }
        None => RuleTable::standard().context("Standard rule table is invalid")?,
    };

    match cli.command {
        Command::Aggregate { file, pretty } => run_aggregate(table, &file, pretty),
        Command::Rules { json } => run_rules(table, json),
        Command::Explain { file, rule_id } => run_explain(table, &file, &rule_id),
        Command::Quality { file } => run_quality(table, &file),
    }
}

fn run_aggregate(table: &RuleTable, file: &Path, pretty: bool) -> Result<()> {
    let instruction = Instruction::from_file(file)?;
    let aggregation = table.aggregate(&instruction);
    let report = AggregationReport::from_aggregation(&aggregation);

    let output = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);
    Ok(())
}

fn run_rules(table: &RuleTable, json: bool) -> Result<()> {
    if json {
        println!("{}", table.to_json_pretty()?);
        return Ok(());
    }

    println!("📋 Rule table v{} ({} rules)", RULE_TABLE_VERSION, table.len());
    println!("   fingerprint {}", table.fingerprint());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for rule in table.iter() {
        println!("{:<8} {}", rule.id.to_string(), rule.label);
    }
    Ok(())
}

fn run_explain(table: &RuleTable, file: &Path, rule_id: &str) -> Result<()> {
    let instruction = Instruction::from_file(file)?;
    let aggregation = table.aggregate(&instruction);
    let category = aggregation.get(rule_id)?;

    println!("{} - {}", category.id(), category.label());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for row in category.rows() {
        println!("  {}", row);
    }
    println!("✓ {} rows, total {}", category.row_count(), category.amount());
    Ok(())
}

fn run_quality(table: &RuleTable, file: &Path) -> Result<()> {
    let instruction = Instruction::from_file(file)?;
    let aggregation = table.aggregate(&instruction);
    let report = DataQualityReport::from_aggregation(&aggregation);

    println!("{}", report.summary());
    for issue in &report.issues {
        let ids: Vec<String> = issue.rule_ids.iter().map(|id| id.to_string()).collect();
        println!(
            "  [{:?}] {} {} {} {}: {} {}",
            issue.severity,
            issue.row.operation_kind,
            issue.row.budget_section,
            issue.row.functional_code,
            issue.row.article,
            issue.issue,
            ids.join(", ")
        );
    }

    if report.has_critical_issues() {
        bail!("{} rows are double counted", report.overlapping_rows);
    }
    Ok(())
}
