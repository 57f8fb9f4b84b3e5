// Rule corpus for the standard M52 table

use m52_aggregation::{
    aggregate, data_quality::find_overlaps, AccountingKind, AggregationError, Block, Brick,
    BudgetSection, BudgetTotals, Instruction, M52Row, OperationKind, RuleTable, DECLARED_RULE_COUNT,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

fn m52_row(
    kind: OperationKind,
    section: BudgetSection,
    functional_code: &str,
    article: &str,
    chapter: Option<&str>,
    amount: Decimal,
) -> M52Row {
    let row = M52Row::new(kind, section, AccountingKind::Real, functional_code, article, amount).unwrap();
    match chapter {
        Some(chapter) => row.with_chapter(chapter).unwrap(),
        None => row,
    }
}

fn rf(functional_code: &str, article: &str, chapter: Option<&str>, amount: Decimal) -> M52Row {
    m52_row(OperationKind::Receipt, BudgetSection::Operating, functional_code, article, chapter, amount)
}

fn df(functional_code: &str, article: &str, chapter: Option<&str>, amount: Decimal) -> M52Row {
    m52_row(OperationKind::Expense, BudgetSection::Operating, functional_code, article, chapter, amount)
}

fn ri(functional_code: &str, article: &str, chapter: Option<&str>, amount: Decimal) -> M52Row {
    m52_row(OperationKind::Receipt, BudgetSection::Investment, functional_code, article, chapter, amount)
}

fn di(functional_code: &str, article: &str, chapter: Option<&str>, amount: Decimal) -> M52Row {
    m52_row(OperationKind::Expense, BudgetSection::Investment, functional_code, article, chapter, amount)
}

/// Ids of the categories holding `row` after aggregating it alone
fn categories_of(row: M52Row) -> Vec<String> {
    let instruction = Instruction::from_rows(vec![row]);
    let aggregation = aggregate(&instruction).unwrap();
    let ids = aggregation
        .iter()
        .filter(|category| !category.is_empty())
        .map(|category| category.id().to_string())
        .collect();
    ids
}

/// One row per category plus a few edge rows, as a budget extract would have
fn sample_budget() -> Vec<M52Row> {
    vec![
        rf("RXXX", "A73111", None, dec!(37)),
        rf("R0202", "A7875", Some("C78"), dec!(40)),
        rf("R221", "A7788", Some("C77"), dec!(41)),
        rf("RXXX", "A7513", Some("CXX"), dec!(42)),
        rf("R01", "A73112", None, dec!(120.5)),
        rf("R01", "A7352", None, dec!(80)),
        rf("R01", "A7321", None, dec!(64)),
        rf("R01", "A7411", None, dec!(300)),
        rf("R01", "A747811", None, dec!(25)),
        rf("R01", "A7588", None, dec!(3)),
        rf("R01", "A6419", Some("C013"), dec!(2)),
        df("R4", "A65711", None, dec!(38)),
        df("R5", "A65722", None, dec!(38)),
        df("R8", "A65733", None, dec!(38)),
        df("R311", "A6574", Some("C65"), dec!(39)),
        df("R561", "A65171", None, dec!(200)),
        df("R0202", "A64111", None, dec!(150)),
        df("R0202", "A6218", None, dec!(5)),
        df("R0202", "A6247", None, dec!(7)),
        df("R01", "A66111", None, dec!(11)),
        df("R01", "A739", None, dec!(4)),
        ri("R01", "A10222", None, dec!(30)),
        ri("R01", "A1641", None, dec!(90)),
        ri("R01", "A2111", Some("C024"), dec!(6)),
        di("R621", "A23151", None, dec!(70)),
        di("R221", "A231312", None, dec!(45)),
        di("R311", "A2031", None, dec!(8)),
        di("R01", "A204141", None, dec!(12)),
        di("R01", "A1641", None, dec!(60)),
    ]
}

// ============================================================================
// RF - Recettes de fonctionnement
// ============================================================================

#[test]
fn rf_1_1_contains_article_a73111() {
    let row = rf("RXXX", "A73111", None, dec!(37));
    let instruction = Instruction::from_rows(vec![row.clone()]);
    let aggregation = aggregate(&instruction).unwrap();

    let category = aggregation.get("RF-1-1").unwrap();
    assert_eq!(category.rows(), &[&row]);
    assert_eq!(category.amount(), dec!(37));
}

#[test]
fn rf_1_1_contains_c78_r0202_a7875() {
    let row = rf("R0202", "A7875", Some("C78"), dec!(40));
    let instruction = Instruction::from_rows(vec![row.clone()]);
    let aggregation = aggregate(&instruction).unwrap();

    assert!(aggregation.get("RF-1-1").unwrap().contains(&row));
}

#[test]
fn rf_1_1_excludes_c77_r221_a7788() {
    let instruction = Instruction::from_rows(vec![rf("R221", "A7788", Some("C77"), dec!(41))]);
    let aggregation = aggregate(&instruction).unwrap();

    assert_eq!(aggregation.get("RF-1-1").unwrap().row_count(), 0);
    assert_eq!(aggregation.get("RF-9-4").unwrap().row_count(), 1);
}

#[test]
fn rf_9_2_excludes_c78_r0202_a7875() {
    let instruction = Instruction::from_rows(vec![rf("R0202", "A7875", Some("C78"), dec!(40))]);
    let aggregation = aggregate(&instruction).unwrap();

    assert_eq!(aggregation.get("RF-9-2").unwrap().row_count(), 0);
}

#[test]
fn rf_9_2_keeps_other_provision_reversals() {
    let instruction = Instruction::from_rows(vec![
        rf("R0202", "A7875", None, dec!(1)),
        rf("R01", "A7815", Some("C78"), dec!(2)),
    ]);
    let aggregation = aggregate(&instruction).unwrap();

    assert_eq!(aggregation.get("RF-9-2").unwrap().amount(), dec!(3));
}

#[test]
fn rf_9_7_excludes_article_a7513() {
    let instruction = Instruction::from_rows(vec![rf("RXXX", "A7513", Some("CXX"), dec!(42))]);
    let aggregation = aggregate(&instruction).unwrap();

    assert_eq!(aggregation.get("RF-9-7").unwrap().row_count(), 0);
    assert_eq!(aggregation.get("RF-4-4").unwrap().row_count(), 1);
}

#[test]
fn order_operations_are_never_categorized() {
    let row = M52Row::new(
        OperationKind::Receipt,
        BudgetSection::Operating,
        AccountingKind::OrderBetweenSections,
        "RXXX",
        "A73111",
        dec!(37),
    )
    .unwrap();
    let instruction = Instruction::from_rows(vec![row]);
    let aggregation = aggregate(&instruction).unwrap();

    assert!(aggregation.iter().all(|category| category.is_empty()));
    assert_eq!(aggregation.uncategorized().len(), 1);
}

// ============================================================================
// DF - Dépenses de fonctionnement
// ============================================================================

#[test]
fn df_3_7_excludes_a657_of_functions_4_5_and_8() {
    let instruction = Instruction::from_rows(vec![
        df("R4", "A65711", None, dec!(38)),
        df("R5", "A65722", None, dec!(38)),
        df("R8", "A65733", None, dec!(38)),
    ]);
    let aggregation = aggregate(&instruction).unwrap();

    assert_eq!(aggregation.get("DF-3-7").unwrap().row_count(), 0);
    assert_eq!(aggregation.get("DF-3-5").unwrap().row_count(), 2);
    assert_eq!(aggregation.get("DF-3-6").unwrap().row_count(), 1);
}

#[test]
fn df_3_7_contains_c65_r311_a6574() {
    let row = df("R311", "A6574", Some("C65"), dec!(39));
    let instruction = Instruction::from_rows(vec![row.clone()]);
    let aggregation = aggregate(&instruction).unwrap();

    let category = aggregation.get("DF-3-7").unwrap();
    assert_eq!(category.rows(), &[&row]);
}

// ============================================================================
// RI - Recettes d'investissement
// ============================================================================

#[test]
fn ri_2_1_holds_borrowing_not_own_receipts() {
    assert_eq!(categories_of(ri("R01", "A1641", None, dec!(90))), vec!["RI-2-1"]);
}

#[test]
fn ri_2_1_excludes_revolving_credit() {
    let categories = categories_of(ri("R01", "A16449", None, dec!(5)));
    assert_eq!(categories, vec!["RI-2-1"]);
    assert!(categories_of(ri("R01", "A1661", None, dec!(5))).is_empty());
}

#[test]
fn ri_1_3_holds_investment_grants() {
    assert_eq!(categories_of(ri("R221", "A1311", None, dec!(12))), vec!["RI-1-3"]);
}

#[test]
fn ri_1_4_holds_asset_sales_whatever_the_article() {
    assert_eq!(categories_of(ri("R01", "A2111", Some("C024"), dec!(6))), vec!["RI-1-4"]);
    assert_eq!(categories_of(ri("R01", "A1641", Some("C024"), dec!(6))), vec!["RI-1-4"]);
    assert_eq!(categories_of(ri("R01", "A2111", None, dec!(6))), vec!["RI-1-6"]);
}

// ============================================================================
// DI - Dépenses d'investissement
// ============================================================================

#[test]
fn di_1_2_holds_college_works_not_roads() {
    assert_eq!(categories_of(di("R221", "A231312", None, dec!(45))), vec!["DI-1-2"]);
}

#[test]
fn di_1_1_holds_road_works_not_colleges() {
    assert_eq!(categories_of(di("R621", "A23151", None, dec!(70))), vec!["DI-1-1"]);
    assert_eq!(categories_of(di("R68", "A2151", None, dec!(70))), vec!["DI-1-1"]);
}

#[test]
fn di_1_3_holds_other_works() {
    assert_eq!(categories_of(di("R311", "A2313", None, dec!(8))), vec!["DI-1-3"]);
    assert_eq!(categories_of(di("R28", "A2313", None, dec!(8))), vec!["DI-1-3"]);
}

#[test]
fn di_3_1_holds_debt_repayment() {
    assert_eq!(categories_of(di("R01", "A1641", None, dec!(60))), vec!["DI-3-1"]);
}

// ============================================================================
// TABLE-WIDE PROPERTIES
// ============================================================================

#[test]
fn rule_table_has_declared_size_and_unique_ids() {
    let table = RuleTable::standard().unwrap();
    let ids: HashSet<_> = table.ids().collect();

    assert_eq!(table.len(), DECLARED_RULE_COUNT);
    assert_eq!(ids.len(), DECLARED_RULE_COUNT);
}

#[test]
fn unknown_rule_reference_is_an_error() {
    let instruction = Instruction::default();
    let aggregation = aggregate(&instruction).unwrap();

    assert!(matches!(
        aggregation.get("RF-42-1"),
        Err(AggregationError::UnknownRuleReference(_))
    ));
    assert!(matches!(
        RuleTable::standard().unwrap().get("DF-3-99"),
        Err(AggregationError::UnknownRuleReference(_))
    ));
}

#[test]
fn zero_padded_rule_ids_do_not_resolve() {
    let table = RuleTable::standard().unwrap();
    assert!(table.get("RF-1-1").is_ok());

    for padded in ["RF-01-001", "RF-01-1", "RF-1-01"] {
        assert!(matches!(
            table.get(padded),
            Err(AggregationError::UnknownRuleReference(_))
        ));
    }
}

#[test]
fn empty_instruction_maps_every_rule_to_zero() {
    let instruction = Instruction::default();
    let aggregation = aggregate(&instruction).unwrap();

    assert_eq!(aggregation.len(), DECLARED_RULE_COUNT);
    for category in aggregation.iter() {
        assert_eq!(category.row_count(), 0);
        assert_eq!(category.amount(), Decimal::ZERO);
    }
}

#[test]
fn category_sum_equals_sum_of_matching_rows() {
    let instruction = Instruction::from_rows(sample_budget());
    let table = RuleTable::standard().unwrap();
    let aggregation = table.aggregate(&instruction);

    for rule in table.iter() {
        let expected: Decimal = instruction
            .rows()
            .filter(|row| rule.matches(row))
            .map(|row| row.amount())
            .sum();
        assert_eq!(aggregation.get_id(rule.id).unwrap().amount(), expected, "{}", rule.id);
    }
}

#[test]
fn sample_budget_is_fully_categorized_without_double_counting() {
    let instruction = Instruction::from_rows(sample_budget());
    let aggregation = aggregate(&instruction).unwrap();

    assert!(aggregation.uncategorized().is_empty(), "{:?}", aggregation.uncategorized());
    assert!(find_overlaps(&aggregation).is_empty(), "{:?}", find_overlaps(&aggregation));
}

#[test]
fn sample_budget_totals() {
    let instruction = Instruction::from_rows(sample_budget());
    let aggregation = aggregate(&instruction).unwrap();
    let totals = BudgetTotals::from_aggregation(&aggregation);

    assert_eq!(totals.operating_receipts, dec!(754.5));
    assert_eq!(totals.operating_expenses, dec!(530));
    assert_eq!(totals.savings, dec!(224.5));
    assert_eq!(totals.own_investment_receipts, dec!(36));
    assert_eq!(totals.borrowing, dec!(90));
    assert_eq!(totals.investment_receipts, dec!(350.5));
    assert_eq!(totals.investment_expenses, dec!(195));
    assert_eq!(totals.balance, dec!(155.5));

    let block_sum: Decimal = [Block::OperatingReceipts, Block::OperatingExpenses]
        .into_iter()
        .map(|block| totals.block_total(block))
        .sum();
    assert_eq!(block_sum, dec!(1284.5));
}

#[test]
fn matching_is_deterministic_and_leaves_rows_untouched() {
    let rows = sample_budget();
    let snapshot = rows.clone();
    let table = RuleTable::standard().unwrap();

    for row in &rows {
        let first = table.classify(row);
        assert_eq!(table.classify(row), first);
    }
    assert_eq!(rows, snapshot);
}

#[test]
fn sample_budget_bricks() {
    let instruction = Instruction::from_rows(sample_budget());
    let aggregation = aggregate(&instruction).unwrap();
    let totals = BudgetTotals::from_aggregation(&aggregation);

    assert_eq!(totals.brick(Brick::FiscaliteDirecte), dec!(197.5));
    assert_eq!(totals.brick(Brick::FiscaliteIndirecte), dec!(144));
    assert_eq!(totals.brick(Brick::DotationEtat), dec!(300));
    assert_eq!(totals.brick(Brick::RecettesDiverses), dec!(113));

    assert_eq!(totals.brick(Brick::Solidarite), dec!(200));
    assert_eq!(totals.brick(Brick::Interventions), dec!(160));
    assert_eq!(totals.brick(Brick::DepensesStructure), dec!(170));

    assert_eq!(totals.brick(Brick::RiPropre), dec!(36));
    assert_eq!(totals.brick(Brick::Emprunt), dec!(90));

    assert_eq!(totals.brick(Brick::Routes), dec!(70));
    assert_eq!(totals.brick(Brick::Colleges), dec!(45));
    assert_eq!(totals.brick(Brick::Amenagement), dec!(8));
    assert_eq!(totals.brick(Brick::Subventions), dec!(12));
    assert_eq!(totals.brick(Brick::RemboursementEmprunt), dec!(60));
}

#[test]
fn every_block_total_is_the_sum_of_its_bricks() {
    let instruction = Instruction::from_rows(sample_budget());
    let aggregation = aggregate(&instruction).unwrap();
    let totals = BudgetTotals::from_aggregation(&aggregation);

    let bricks_of = |block: Block| -> Decimal {
        Brick::ALL
            .into_iter()
            .filter(|brick| brick.block() == block)
            .map(|brick| totals.brick(brick))
            .sum()
    };

    assert_eq!(bricks_of(Block::OperatingReceipts), totals.operating_receipts);
    assert_eq!(bricks_of(Block::OperatingExpenses), totals.operating_expenses);
    assert_eq!(bricks_of(Block::InvestmentExpenses), totals.investment_expenses);
    assert_eq!(
        totals.savings + bricks_of(Block::InvestmentReceipts),
        totals.investment_receipts
    );
    for block in Block::ALL {
        assert_eq!(bricks_of(block), aggregation.block_amount(block), "{block}");
    }
}

#[test]
fn large_amounts_sum_without_overflow() {
    let max = m52_aggregation::MAX_ABS_AMOUNT;
    let instruction = Instruction::from_rows(vec![
        rf("RXXX", "A73111", None, max),
        rf("R01", "A73111", None, max),
    ]);
    let aggregation = aggregate(&instruction).unwrap();
    let totals = BudgetTotals::from_aggregation(&aggregation);

    assert_eq!(aggregation.get("RF-1-1").unwrap().amount(), max * dec!(2));
    assert_eq!(totals.operating_receipts, max * dec!(2));
    assert!(M52Row::new(
        OperationKind::Receipt,
        BudgetSection::Operating,
        AccountingKind::Real,
        "RXXX",
        "A73111",
        Decimal::MAX,
    )
    .is_err());
}
