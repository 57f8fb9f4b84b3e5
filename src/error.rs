// ⚠️ Errors - one typed error for the whole library
// Boundary failures (malformed rows) and configuration failures (rule table)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregationError {
    /// A row field holds a value outside its declared vocabulary or format
    #[error("malformed row: field `{field}` has unexpected value {value:?}")]
    MalformedRow { field: &'static str, value: String },

    /// Lookup of a rule id the rule table does not define
    #[error("unknown rule reference: {0}")]
    UnknownRuleReference(String),

    /// Rule id not following `<BLOCK>-<group>-<rank>`
    #[error("invalid rule id {0:?}: expected <BLOCK>-<group>-<rank>")]
    InvalidRuleId(String),

    /// Two definitions share an id
    #[error("duplicate rule id in rule table: {0}")]
    DuplicateRuleId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AggregationError {
    pub(crate) fn malformed(field: &'static str, value: impl Into<String>) -> Self {
        AggregationError::MalformedRow {
            field,
            value: value.into(),
        }
    }

    /// True for errors caused by configuration (rule table) rather than input
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AggregationError::InvalidRuleId(_) | AggregationError::DuplicateRuleId(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AggregationError>;
