// 📚 Instruction - one budget document as an immutable set of rows

use crate::error::Result;
use crate::row::{M52Row, RawM52Row};
use anyhow::Context as _;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Unordered, duplicate-free collection of rows. Never mutated after
/// construction; build a new one for any change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instruction {
    rows: BTreeSet<M52Row>,
}

impl Instruction {
    /// Duplicates collapse
    pub fn from_rows<I: IntoIterator<Item = M52Row>>(rows: I) -> Self {
        Instruction {
            rows: rows.into_iter().collect(),
        }
    }

    /// Decode a JSON array of extract rows, rejecting the first malformed one
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let raw_rows: Vec<RawM52Row> = serde_json::from_reader(reader)?;
        let rows = raw_rows
            .into_iter()
            .map(M52Row::try_from)
            .collect::<Result<Vec<_>>>()?;

        let instruction = Instruction::from_rows(rows);
        tracing::debug!(rows = instruction.len(), "instruction decoded");
        Ok(instruction)
    }

    /// Load from a JSON file on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = fs::File::open(path.as_ref())
            .with_context(|| format!("Failed to open instruction file: {:?}", path.as_ref()))?;

        Instruction::from_json_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to decode instruction file: {:?}", path.as_ref()))
    }

    pub fn rows(&self) -> impl Iterator<Item = &M52Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, row: &M52Row) -> bool {
        self.rows.contains(row)
    }

    pub fn total_amount(&self) -> Decimal {
        self.rows.iter().map(M52Row::amount).sum()
    }
}

impl FromIterator<M52Row> for Instruction {
    fn from_iter<I: IntoIterator<Item = M52Row>>(iter: I) -> Self {
        Instruction::from_rows(iter)
    }
}

// ============================================================================
// TESTS
// ============================================================================
