// 🧾 Row Record - one M52 ledger line as an immutable value
// Validation happens here, at the boundary; the engine only sees valid rows

use crate::error::{AggregationError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENUMERATED FIELDS
// ============================================================================

/// "Dépense/Recette"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationKind {
    Expense,
    Receipt,
}

impl OperationKind {
    pub fn code(&self) -> &'static str {
        match self {
            OperationKind::Expense => "D",
            OperationKind::Receipt => "R",
        }
    }
}

impl FromStr for OperationKind {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "D" => Ok(OperationKind::Expense),
            "R" => Ok(OperationKind::Receipt),
            other => Err(AggregationError::malformed("Dépense/Recette", other)),
        }
    }
}

/// "Investissement/Fonctionnement"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BudgetSection {
    Investment,
    Operating,
}

impl BudgetSection {
    pub fn code(&self) -> &'static str {
        match self {
            BudgetSection::Investment => "I",
            BudgetSection::Operating => "F",
        }
    }
}

impl FromStr for BudgetSection {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "I" => Ok(BudgetSection::Investment),
            "F" => Ok(BudgetSection::Operating),
            other => Err(AggregationError::malformed("Investissement/Fonctionnement", other)),
        }
    }
}

/// "Réel/Ordre id/Ordre diff"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountingKind {
    /// Real operation (cash actually moves)
    Real,
    /// Order operation inside one section
    OrderWithinSection,
    /// Order operation between the two sections
    OrderBetweenSections,
}

impl AccountingKind {
    pub fn code(&self) -> &'static str {
        match self {
            AccountingKind::Real => "OR",
            AccountingKind::OrderWithinSection => "OI",
            AccountingKind::OrderBetweenSections => "OD",
        }
    }
}

impl FromStr for AccountingKind {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OR" => Ok(AccountingKind::Real),
            "OI" => Ok(AccountingKind::OrderWithinSection),
            "OD" => Ok(AccountingKind::OrderBetweenSections),
            other => Err(AggregationError::malformed("Réel/Ordre id/Ordre diff", other)),
        }
    }
}

// ============================================================================
// ADDRESSABLE FIELDS
// ============================================================================

/// Row attributes a rule condition can look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    OperationKind,
    BudgetSection,
    AccountingKind,
    FunctionalCode,
    /// First character after the `R` of the functional code
    Function,
    Article,
    Chapter,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::OperationKind => "operation_kind",
            Field::BudgetSection => "budget_section",
            Field::AccountingKind => "accounting_kind",
            Field::FunctionalCode => "functional_code",
            Field::Function => "function",
            Field::Article => "article",
            Field::Chapter => "chapter",
        };
        f.write_str(name)
    }
}

// ============================================================================
// ROW RECORD
// ============================================================================

/// Largest accepted |Montant| (10^15). Any realistic number of rows sums
/// far below `Decimal::MAX`, so category and block additions cannot overflow.
pub const MAX_ABS_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// One M52 line. Immutable once built; equality and hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct M52Row {
    operation_kind: OperationKind,
    budget_section: BudgetSection,
    accounting_kind: AccountingKind,
    functional_code: String,
    article: String,
    chapter: Option<String>,
    amount: Decimal,
}

impl M52Row {
    /// Build a row without chapter, validating code formats
    pub fn new(
        operation_kind: OperationKind,
        budget_section: BudgetSection,
        accounting_kind: AccountingKind,
        functional_code: impl Into<String>,
        article: impl Into<String>,
        amount: Decimal,
    ) -> Result<Self> {
        Ok(M52Row {
            operation_kind,
            budget_section,
            accounting_kind,
            functional_code: validate_code("Rubrique fonctionnelle", functional_code.into(), 'R')?,
            article: validate_code("Article", article.into(), 'A')?,
            chapter: None,
            amount: validate_amount(amount)?,
        })
    }

    /// Builder: same row with a chapter code
    pub fn with_chapter(self, chapter: impl Into<String>) -> Result<Self> {
        Ok(M52Row {
            chapter: Some(validate_code("Chapitre", chapter.into(), 'C')?),
            ..self
        })
    }

    pub fn operation_kind(&self) -> OperationKind {
        self.operation_kind
    }

    pub fn budget_section(&self) -> BudgetSection {
        self.budget_section
    }

    pub fn accounting_kind(&self) -> AccountingKind {
        self.accounting_kind
    }

    pub fn functional_code(&self) -> &str {
        &self.functional_code
    }

    /// `R311` → `3`, `RXXX` → `X`
    pub fn function(&self) -> &str {
        // codes are validated ASCII with at least one char after the prefix
        self.functional_code.get(1..2).unwrap_or("")
    }

    pub fn article(&self) -> &str {
        &self.article
    }

    pub fn chapter(&self) -> Option<&str> {
        self.chapter.as_deref()
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Value of a field as seen by rule conditions; `None` only for a missing chapter
    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::OperationKind => Some(self.operation_kind.code()),
            Field::BudgetSection => Some(self.budget_section.code()),
            Field::AccountingKind => Some(self.accounting_kind.code()),
            Field::FunctionalCode => Some(&self.functional_code),
            Field::Function => Some(self.function()),
            Field::Article => Some(&self.article),
            Field::Chapter => self.chapter.as_deref(),
        }
    }
}

impl fmt::Display for M52Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {} {} {} {} {}",
            self.operation_kind.code(),
            self.budget_section.code(),
            self.accounting_kind.code(),
            self.chapter.as_deref().unwrap_or("C-"),
            self.functional_code,
            self.article,
            self.amount
        )
    }
}

/// Codes are a prefix letter followed by at least one ASCII alphanumeric
fn validate_code(field: &'static str, value: String, prefix: char) -> Result<String> {
    let mut chars = value.chars();
    let valid = chars.next() == Some(prefix)
        && !chars.as_str().is_empty()
        && chars.all(|c| c.is_ascii_alphanumeric());

    if valid {
        Ok(value)
    } else {
        Err(AggregationError::malformed(field, value))
    }
}

fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount.abs() > MAX_ABS_AMOUNT {
        return Err(AggregationError::malformed("Montant", amount.to_string()));
    }
    Ok(amount)
}

// ============================================================================
// RAW ROW (column names of an M52 extract)
// ============================================================================

/// Row as delivered by the extract decoder, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawM52Row {
    #[serde(rename = "Dépense/Recette")]
    pub operation_kind: String,

    #[serde(rename = "Investissement/Fonctionnement")]
    pub budget_section: String,

    #[serde(rename = "Réel/Ordre id/Ordre diff")]
    pub accounting_kind: String,

    #[serde(rename = "Rubrique fonctionnelle")]
    pub functional_code: String,

    #[serde(rename = "Article")]
    pub article: String,

    #[serde(rename = "Chapitre", default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,

    #[serde(rename = "Montant")]
    pub amount: Decimal,
}

impl TryFrom<RawM52Row> for M52Row {
    type Error = AggregationError;

    fn try_from(raw: RawM52Row) -> Result<Self> {
        let row = M52Row::new(
            raw.operation_kind.parse()?,
            raw.budget_section.parse()?,
            raw.accounting_kind.parse()?,
            raw.functional_code,
            raw.article,
            raw.amount,
        )?;

        match raw.chapter {
            Some(chapter) => row.with_chapter(chapter),
            None => Ok(row),
        }
    }
}

impl From<&M52Row> for RawM52Row {
    fn from(row: &M52Row) -> Self {
        RawM52Row {
            operation_kind: row.operation_kind.code().to_string(),
            budget_section: row.budget_section.code().to_string(),
            accounting_kind: row.accounting_kind.code().to_string(),
            functional_code: row.functional_code.clone(),
            article: row.article.clone(),
            chapter: row.chapter.clone(),
            amount: row.amount,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
