// 🔖 Rule identifiers - `<BLOCK>-<group>-<rank>`, e.g. "RF-1-1", "DF-3-7"
// Downstream consumers index by these ids, so they are part of the schema

use crate::error::{AggregationError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The four top-level budget blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Block {
    /// RF - Recettes de fonctionnement
    OperatingReceipts,
    /// DF - Dépenses de fonctionnement
    OperatingExpenses,
    /// RI - Recettes d'investissement
    InvestmentReceipts,
    /// DI - Dépenses d'investissement
    InvestmentExpenses,
}

impl Block {
    pub const ALL: [Block; 4] = [
        Block::OperatingReceipts,
        Block::OperatingExpenses,
        Block::InvestmentReceipts,
        Block::InvestmentExpenses,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Block::OperatingReceipts => "RF",
            Block::OperatingExpenses => "DF",
            Block::InvestmentReceipts => "RI",
            Block::InvestmentExpenses => "DI",
        }
    }

    pub fn from_code(code: &str) -> Option<Block> {
        Block::ALL.into_iter().find(|block| block.code() == code)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parsed rule id. Orders by block, then group, then rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId {
    block: Block,
    group: u16,
    rank: u16,
}

impl RuleId {
    pub fn new(block: Block, group: u16, rank: u16) -> Self {
        RuleId { block, group, rank }
    }

    pub fn block(&self) -> Block {
        self.block
    }

    pub fn group(&self) -> u16 {
        self.group
    }

    pub fn rank(&self) -> u16 {
        self.rank
    }
}

impl FromStr for RuleId {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AggregationError::InvalidRuleId(s.to_string());
        let mut parts = s.split('-');

        let block = parts.next().and_then(Block::from_code).ok_or_else(invalid)?;
        let group = parse_index(parts.next()).ok_or_else(invalid)?;
        let rank = parse_index(parts.next()).ok_or_else(invalid)?;

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(RuleId::new(block, group, rank))
    }
}

/// Positive integer in canonical form: ASCII digits, no leading zero
fn parse_index(part: Option<&str>) -> Option<u16> {
    let part = part?;
    if part.is_empty() || part.starts_with('0') || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.block, self.group, self.rank)
    }
}

impl Serialize for RuleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: RuleId = "DF-3-7".parse().unwrap();
        assert_eq!(id.block(), Block::OperatingExpenses);
        assert_eq!(id.group(), 3);
        assert_eq!(id.rank(), 7);
        assert_eq!(id.to_string(), "DF-3-7");
    }

    #[test]
    fn test_rejects_bad_ids() {
        for bad in [
            "", "RF", "RF-1", "XX-1-1", "RF-1-1-1", "RF-a-1", "RF-0-1", "RF-1-+2", "rf-1-1",
            "RF-01-1", "RF-1-01", "RF-01-001",
        ] {
            assert!(bad.parse::<RuleId>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_display_round_trips_canonical_ids() {
        for id in ["RF-1-1", "DF-3-7", "RF-10-1", "DI-3-20"] {
            assert_eq!(id.parse::<RuleId>().unwrap().to_string(), id);
        }
    }

    #[test]
    fn test_ordering_is_numeric() {
        let a: RuleId = "RF-9-7".parse().unwrap();
        let b: RuleId = "RF-10-1".parse().unwrap();
        let c: RuleId = "DF-1-1".parse().unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_serializes_as_string() {
        let id: RuleId = "RI-2-1".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"RI-2-1\"");
        let back: RuleId = serde_json::from_str("\"RI-2-1\"").unwrap();
        assert_eq!(back, id);
    }
}
