// 📋 Standard M52 rule table - the fixed category vocabulary
// Changing an id, or what a condition selects, is a schema change: bump
// RULE_TABLE_VERSION so downstream consumers notice.

use crate::condition::Condition;
use crate::error::Result;
use crate::row::Field;
use crate::rule_id::Block;
use crate::rules::RuleDefinition;

pub const RULE_TABLE_VERSION: &str = "1.0.0";

/// Number of categories the standard table declares
pub const DECLARED_RULE_COUNT: usize = 68;

/// Real operations of the block's operation kind and section. Order
/// operations are accounting transfers and never belong to a category.
pub fn block_scope(block: Block) -> Condition {
    let (operation_kind, budget_section) = match block {
        Block::OperatingReceipts => ("R", "F"),
        Block::OperatingExpenses => ("D", "F"),
        Block::InvestmentReceipts => ("R", "I"),
        Block::InvestmentExpenses => ("D", "I"),
    };

    Condition::all(vec![
        Condition::equals(Field::OperationKind, operation_kind),
        Condition::equals(Field::BudgetSection, budget_section),
        Condition::equals(Field::AccountingKind, "OR"),
    ])
}

fn rule(id: &str, label: &str, condition: Condition) -> Result<RuleDefinition> {
    let RuleDefinition { id, label, condition } = RuleDefinition::new(id, label, condition)?;
    let scoped = Condition::all(vec![block_scope(id.block()), condition]);
    Ok(RuleDefinition {
        id,
        label,
        condition: scoped,
    })
}

fn prefix(value: &str) -> Condition {
    Condition::article_prefix(value)
}

fn prefixes(values: &[&str]) -> Condition {
    Condition::article_prefixes(values)
}

fn not(condition: Condition) -> Condition {
    Condition::not(condition)
}

fn all(conditions: Vec<Condition>) -> Condition {
    Condition::all(conditions)
}

fn any(conditions: Vec<Condition>) -> Condition {
    Condition::any(conditions)
}

/// Provision reversal booked on property tax under general administration
fn property_tax_provision_reversal() -> Condition {
    all(vec![
        Condition::chapter("C78"),
        Condition::functional_code("R0202"),
        Condition::article("A7875"),
    ])
}

/// Asset sales are budgeted on chapter 024 whatever their article
fn outside_asset_sales() -> Condition {
    not(Condition::chapter("C024"))
}

fn works_and_equipment() -> Condition {
    prefixes(&["A21", "A23"])
}

fn colleges() -> Condition {
    Condition::prefix(Field::FunctionalCode, "R221")
}

pub fn definitions() -> Result<Vec<RuleDefinition>> {
    let mut rules = Vec::with_capacity(DECLARED_RULE_COUNT);
    rules.extend(operating_receipts()?);
    rules.extend(operating_expenses()?);
    rules.extend(investment_receipts()?);
    rules.extend(investment_expenses()?);
    Ok(rules)
}

// ============================================================================
// RF - RECETTES DE FONCTIONNEMENT
// ============================================================================

fn operating_receipts() -> Result<Vec<RuleDefinition>> {
    vec![
        // Fiscalité directe
        rule(
            "RF-1-1",
            "Taxe foncière sur les propriétés bâties",
            any(vec![Condition::article("A73111"), property_tax_provision_reversal()]),
        ),
        rule("RF-1-2", "Cotisation sur la valeur ajoutée des entreprises", Condition::article("A73112")),
        rule("RF-1-3", "Imposition forfaitaire sur les entreprises de réseau", Condition::article("A73114")),
        rule(
            "RF-1-4",
            "Autres impôts directs",
            all(vec![
                prefix("A731"),
                not(Condition::articles(&["A73111", "A73112", "A73114"])),
            ]),
        ),
        rule("RF-1-5", "Reversements de fiscalité", prefix("A7323")),
        // Fiscalité indirecte
        rule("RF-2-1", "Taxe intérieure de consommation sur les produits énergétiques", prefix("A7352")),
        rule("RF-2-2", "Taxe spéciale sur les conventions d'assurance", prefix("A7342")),
        rule(
            "RF-2-3",
            "Droits de mutation à titre onéreux",
            Condition::articles(&["A7321", "A7322", "A7482"]),
        ),
        rule("RF-2-4", "Taxe sur la consommation finale d'électricité", prefix("A7351")),
        rule("RF-2-5", "Taxe d'aménagement", prefix("A7327")),
        rule(
            "RF-2-6",
            "Autres impôts et taxes",
            all(vec![
                prefix("A73"),
                not(any(vec![
                    prefixes(&["A731", "A7323", "A7351", "A7352", "A7342", "A7327"]),
                    Condition::articles(&["A7321", "A7322"]),
                ])),
            ]),
        ),
        // Dotations de l'État
        rule("RF-3-1", "Dotation globale de fonctionnement", prefix("A7411")),
        rule("RF-3-2", "Dotation générale de décentralisation", prefix("A7461")),
        rule("RF-3-3", "Compensations fiscales", prefix("A7483")),
        rule(
            "RF-3-4",
            "Autres dotations et participations",
            all(vec![
                prefix("A74"),
                not(any(vec![
                    prefixes(&["A7411", "A7461", "A7483", "A7478"]),
                    Condition::article("A7482"),
                ])),
            ]),
        ),
        // Recettes sociales
        rule("RF-4-1", "Concours CNSA - Allocation personnalisée d'autonomie", prefix("A747811")),
        rule("RF-4-2", "Concours CNSA - Prestation de compensation du handicap", prefix("A747812")),
        rule("RF-4-3", "Fonds de mobilisation départementale pour l'insertion", prefix("A74783")),
        rule("RF-4-4", "Recouvrements d'aide sociale", prefix("A751")),
        rule(
            "RF-4-5",
            "Autres recettes sociales",
            all(vec![
                prefix("A7478"),
                not(prefixes(&["A747811", "A747812", "A74783"])),
            ]),
        ),
        // Produits des services
        rule("RF-5-1", "Produits des services et du domaine", prefix("A70")),
        rule("RF-5-2", "Atténuations de charges", prefix("A6")),
        // Autres recettes
        rule("RF-9-1", "Produits financiers", prefix("A76")),
        rule(
            "RF-9-2",
            "Reprises sur provisions",
            all(vec![prefix("A78"), not(property_tax_provision_reversal())]),
        ),
        rule("RF-9-3", "Revenus des immeubles", prefix("A752")),
        rule("RF-9-4", "Produits exceptionnels", prefix("A77")),
        rule("RF-9-5", "Transferts de charges", prefix("A79")),
        rule("RF-9-6", "Redevances des fermiers et concessionnaires", prefix("A757")),
        rule(
            "RF-9-7",
            "Autres produits de gestion courante",
            all(vec![prefix("A75"), not(prefixes(&["A751", "A752", "A757"]))]),
        ),
    ]
    .into_iter()
    .collect()
}

// ============================================================================
// DF - DÉPENSES DE FONCTIONNEMENT
// ============================================================================

fn operating_expenses() -> Result<Vec<RuleDefinition>> {
    vec![
        // Allocations individuelles de solidarité
        rule("DF-1-1", "Revenu de solidarité active", prefix("A6517")),
        rule("DF-1-2", "Prestation de compensation du handicap", prefix("A651121")),
        rule("DF-1-3", "Allocation personnalisée d'autonomie", prefix("A65114")),
        rule("DF-1-4", "Frais d'hébergement", prefix("A652")),
        rule(
            "DF-1-5",
            "Autres aides sociales",
            all(vec![prefix("A651"), not(prefixes(&["A6517", "A651121", "A65114"]))]),
        ),
        // Personnel
        rule("DF-2-1", "Rémunérations du personnel", prefix("A641")),
        rule("DF-2-2", "Charges sociales", prefixes(&["A645", "A647"])),
        rule(
            "DF-2-3",
            "Autres charges de personnel",
            any(vec![
                prefix("A6218"),
                all(vec![prefix("A64"), not(prefixes(&["A641", "A645", "A647"]))]),
            ]),
        ),
        // Contributions et subventions
        rule("DF-3-1", "Service départemental d'incendie et de secours", prefix("A6553")),
        rule("DF-3-2", "Dotations de fonctionnement des collèges", prefix("A65511")),
        rule("DF-3-3", "Transports", prefix("A624")),
        rule("DF-3-4", "Participations aux syndicats mixtes", prefix("A6561")),
        rule(
            "DF-3-5",
            "Subventions aux organismes sociaux et médico-sociaux",
            all(vec![prefix("A657"), Condition::functions(&["4", "5"])]),
        ),
        rule(
            "DF-3-6",
            "Subventions aux transports",
            all(vec![prefix("A657"), Condition::functions(&["8"])]),
        ),
        rule(
            "DF-3-7",
            "Autres subventions",
            all(vec![prefix("A657"), not(Condition::functions(&["4", "5", "8"]))]),
        ),
        rule(
            "DF-3-8",
            "Autres contributions obligatoires",
            all(vec![prefix("A655"), not(prefixes(&["A6553", "A65511"]))]),
        ),
        // Fonctionnement courant
        rule("DF-4-1", "Achats et fournitures", prefix("A60")),
        rule(
            "DF-4-2",
            "Services extérieurs",
            any(vec![
                prefix("A61"),
                all(vec![prefix("A62"), not(prefixes(&["A6218", "A624"]))]),
            ]),
        ),
        rule("DF-4-3", "Impôts et taxes", prefix("A63")),
        rule(
            "DF-4-4",
            "Autres charges de gestion courante",
            all(vec![
                prefix("A65"),
                not(prefixes(&["A651", "A652", "A655", "A6561", "A657"])),
            ]),
        ),
        // Charges financières et exceptionnelles
        rule("DF-5-1", "Intérêts de la dette", prefix("A6611")),
        rule(
            "DF-5-2",
            "Autres charges financières",
            all(vec![prefix("A66"), not(prefix("A6611"))]),
        ),
        rule("DF-5-3", "Charges exceptionnelles", prefix("A67")),
        rule("DF-5-4", "Dotations aux provisions", prefix("A68")),
        rule("DF-5-5", "Atténuations de produits", prefix("A7")),
    ]
    .into_iter()
    .collect()
}

// ============================================================================
// RI - RECETTES D'INVESTISSEMENT
// ============================================================================

fn investment_receipts() -> Result<Vec<RuleDefinition>> {
    vec![
        // Recettes propres
        rule(
            "RI-1-1",
            "Fonds de compensation de la TVA",
            all(vec![prefix("A10222"), outside_asset_sales()]),
        ),
        rule(
            "RI-1-2",
            "Autres dotations et fonds",
            all(vec![prefix("A10"), not(prefix("A10222")), outside_asset_sales()]),
        ),
        rule(
            "RI-1-3",
            "Subventions d'investissement reçues",
            all(vec![prefix("A13"), outside_asset_sales()]),
        ),
        rule("RI-1-4", "Produits des cessions", Condition::chapter("C024")),
        rule(
            "RI-1-5",
            "Remboursements de prêts et avances",
            all(vec![prefix("A27"), outside_asset_sales()]),
        ),
        rule(
            "RI-1-6",
            "Autres recettes d'investissement",
            all(vec![prefixes(&["A2", "A45"]), not(prefix("A27")), outside_asset_sales()]),
        ),
        // Emprunt
        rule(
            "RI-2-1",
            "Emprunts",
            all(vec![prefix("A16"), not(prefix("A166")), outside_asset_sales()]),
        ),
    ]
    .into_iter()
    .collect()
}

// ============================================================================
// DI - DÉPENSES D'INVESTISSEMENT
// ============================================================================

fn investment_expenses() -> Result<Vec<RuleDefinition>> {
    vec![
        // Investissements directs
        rule(
            "DI-1-1",
            "Réseaux routiers",
            all(vec![works_and_equipment(), Condition::functions(&["6"])]),
        ),
        rule("DI-1-2", "Collèges", all(vec![works_and_equipment(), colleges()])),
        rule(
            "DI-1-3",
            "Autres travaux et équipements",
            any(vec![
                all(vec![prefix("A20"), not(prefix("A204"))]),
                all(vec![
                    works_and_equipment(),
                    not(Condition::functions(&["6"])),
                    not(colleges()),
                ]),
            ]),
        ),
        // Subventions d'équipement
        rule("DI-2-1", "Subventions d'équipement aux communes et EPCI", prefix("A2041")),
        rule(
            "DI-2-2",
            "Autres subventions d'équipement",
            all(vec![prefix("A204"), not(prefix("A2041"))]),
        ),
        // Dette et opérations financières
        rule(
            "DI-3-1",
            "Remboursement du capital de la dette",
            all(vec![prefix("A16"), not(prefix("A166"))]),
        ),
        rule(
            "DI-3-2",
            "Autres dépenses financières",
            any(vec![prefixes(&["A26", "A27"]), all(vec![prefix("A1"), not(prefix("A16"))])]),
        ),
    ]
    .into_iter()
    .collect()
}

// ============================================================================
// TESTS
// ============================================================================
