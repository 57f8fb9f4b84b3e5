// 💶 Budget totals - the figures presentation layers actually consume
// Pure function of an aggregation; recomputed every time, never stored

use crate::aggregation::{AggregatedRow, Aggregation};
use crate::rule_id::{Block, RuleId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// BRICKS (sub-block breakdown)
// ============================================================================

/// Sub-block a category rolls up into. Every rule id maps to exactly one
/// brick of its own block, so a block total is always the sum of its bricks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Brick {
    // RF
    DotationEtat,
    FiscaliteDirecte,
    FiscaliteIndirecte,
    RecettesDiverses,
    // DF
    Solidarite,
    Interventions,
    DepensesStructure,
    // RI
    RiPropre,
    Emprunt,
    // DI
    RemboursementEmprunt,
    Routes,
    Colleges,
    Amenagement,
    Subventions,
}

impl Brick {
    pub const ALL: [Brick; 14] = [
        Brick::DotationEtat,
        Brick::FiscaliteDirecte,
        Brick::FiscaliteIndirecte,
        Brick::RecettesDiverses,
        Brick::Solidarite,
        Brick::Interventions,
        Brick::DepensesStructure,
        Brick::RiPropre,
        Brick::Emprunt,
        Brick::RemboursementEmprunt,
        Brick::Routes,
        Brick::Colleges,
        Brick::Amenagement,
        Brick::Subventions,
    ];

    /// Brick of a category, from its block and group (rank only splits DI-1)
    pub fn of(id: RuleId) -> Brick {
        match (id.block(), id.group(), id.rank()) {
            (Block::OperatingReceipts, 1, _) => Brick::FiscaliteDirecte,
            (Block::OperatingReceipts, 2, _) => Brick::FiscaliteIndirecte,
            (Block::OperatingReceipts, 3, _) => Brick::DotationEtat,
            (Block::OperatingReceipts, _, _) => Brick::RecettesDiverses,

            (Block::OperatingExpenses, 1, _) => Brick::Solidarite,
            (Block::OperatingExpenses, 3, _) => Brick::Interventions,
            (Block::OperatingExpenses, _, _) => Brick::DepensesStructure,

            (Block::InvestmentReceipts, BORROWING_GROUP, _) => Brick::Emprunt,
            (Block::InvestmentReceipts, _, _) => Brick::RiPropre,

            (Block::InvestmentExpenses, 1, 1) => Brick::Routes,
            (Block::InvestmentExpenses, 1, 2) => Brick::Colleges,
            (Block::InvestmentExpenses, 2, _) => Brick::Subventions,
            (Block::InvestmentExpenses, 3, _) => Brick::RemboursementEmprunt,
            (Block::InvestmentExpenses, _, _) => Brick::Amenagement,
        }
    }

    pub fn block(&self) -> Block {
        match self {
            Brick::DotationEtat
            | Brick::FiscaliteDirecte
            | Brick::FiscaliteIndirecte
            | Brick::RecettesDiverses => Block::OperatingReceipts,
            Brick::Solidarite | Brick::Interventions | Brick::DepensesStructure => {
                Block::OperatingExpenses
            }
            Brick::RiPropre | Brick::Emprunt => Block::InvestmentReceipts,
            Brick::RemboursementEmprunt
            | Brick::Routes
            | Brick::Colleges
            | Brick::Amenagement
            | Brick::Subventions => Block::InvestmentExpenses,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Brick::DotationEtat => "Dotations de l'État",
            Brick::FiscaliteDirecte => "Fiscalité directe",
            Brick::FiscaliteIndirecte => "Fiscalité indirecte",
            Brick::RecettesDiverses => "Recettes diverses",
            Brick::Solidarite => "Solidarité",
            Brick::Interventions => "Interventions",
            Brick::DepensesStructure => "Dépenses de structure",
            Brick::RiPropre => "Recettes d'investissement propres",
            Brick::Emprunt => "Emprunt",
            Brick::RemboursementEmprunt => "Remboursement d'emprunt et opérations financières",
            Brick::Routes => "Routes",
            Brick::Colleges => "Collèges",
            Brick::Amenagement => "Aménagement et autres travaux",
            Brick::Subventions => "Subventions d'équipement",
        }
    }
}

/// Investment-receipt group holding borrowing ("RI-2-*"); every other RI
/// group is an own investment receipt
pub const BORROWING_GROUP: u16 = 2;

pub fn is_borrowing(id: RuleId) -> bool {
    Brick::of(id) == Brick::Emprunt
}

/// Amount per brick; all fourteen bricks are present, zero when empty
pub fn brick_amounts(aggregation: &Aggregation<'_>) -> BTreeMap<Brick, Decimal> {
    let mut bricks: BTreeMap<Brick, Decimal> =
        Brick::ALL.into_iter().map(|brick| (brick, Decimal::ZERO)).collect();

    for row in aggregation.iter() {
        *bricks.entry(Brick::of(row.id())).or_insert(Decimal::ZERO) += row.amount();
    }
    bricks
}

/// Per-category figures exposed downstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub label: String,
    pub matched_amount: Decimal,
    pub matched_row_count: usize,
}

impl From<&AggregatedRow<'_>> for CategorySummary {
    fn from(row: &AggregatedRow<'_>) -> Self {
        CategorySummary {
            label: row.label().to_string(),
            matched_amount: row.amount(),
            matched_row_count: row.row_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetTotals {
    /// Σ RF
    pub operating_receipts: Decimal,
    /// Σ DF
    pub operating_expenses: Decimal,
    /// Épargne: RF − DF
    pub savings: Decimal,
    /// Σ RI outside the borrowing group
    pub own_investment_receipts: Decimal,
    /// Σ RI borrowing group
    pub borrowing: Decimal,
    /// savings + own investment receipts + borrowing
    pub investment_receipts: Decimal,
    /// Σ DI
    pub investment_expenses: Decimal,
    /// investment receipts − investment expenses
    pub balance: Decimal,
    /// Sub-block breakdown; each block's categories sum to its bricks
    pub bricks: BTreeMap<Brick, Decimal>,
}

impl BudgetTotals {
    pub fn from_aggregation(aggregation: &Aggregation<'_>) -> Self {
        let bricks = brick_amounts(aggregation);
        let brick = |key: Brick| bricks.get(&key).copied().unwrap_or_default();
        let sum_of = |block: Block| -> Decimal {
            Brick::ALL
                .into_iter()
                .filter(|b| b.block() == block)
                .map(&brick)
                .sum()
        };

        let operating_receipts = sum_of(Block::OperatingReceipts);
        let operating_expenses = sum_of(Block::OperatingExpenses);
        let savings = operating_receipts - operating_expenses;

        let own_investment_receipts = brick(Brick::RiPropre);
        let borrowing = brick(Brick::Emprunt);
        let investment_receipts = savings + own_investment_receipts + borrowing;
        let investment_expenses = sum_of(Block::InvestmentExpenses);

        BudgetTotals {
            operating_receipts,
            operating_expenses,
            savings,
            own_investment_receipts,
            borrowing,
            investment_receipts,
            investment_expenses,
            balance: investment_receipts - investment_expenses,
            bricks,
        }
    }

    pub fn brick(&self, brick: Brick) -> Decimal {
        self.bricks.get(&brick).copied().unwrap_or_default()
    }

    /// Headline total of a block. For investment receipts this includes savings.
    pub fn block_total(&self, block: Block) -> Decimal {
        match block {
            Block::OperatingReceipts => self.operating_receipts,
            Block::OperatingExpenses => self.operating_expenses,
            Block::InvestmentReceipts => self.investment_receipts,
            Block::InvestmentExpenses => self.investment_expenses,
        }
    }
}

/// Category summaries keyed by id
pub fn category_summaries(aggregation: &Aggregation<'_>) -> BTreeMap<RuleId, CategorySummary> {
    aggregation
        .iter()
        .map(|row| (row.id(), CategorySummary::from(row)))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
