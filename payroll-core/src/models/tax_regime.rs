use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegimeCode {
    New,
    Old,
}

impl RegimeCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Old => "old",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "old" => Some(Self::Old),
            _ => None,
        }
    }
}

/// A tax regime row: the regime identity plus the scalar parameters that,
/// together with its slab table, form a complete tax configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRegime {
    pub id: i32,
    pub code: RegimeCode,
    pub name: String,
    pub standard_deduction: Decimal,
    pub cess_percent: Decimal,
    pub rebate_limit: Decimal,
}
