use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSlab {
    pub regime_id: i32,

    /// Inclusive lower bound of the bracket.
    pub lower_bound: Decimal,

    /// Upper bound of the bracket; `None` marks the final unbounded bracket.
    pub upper_bound: Option<Decimal>,

    /// Marginal rate as a fraction (0.05 = 5%), applied only to income
    /// inside this bracket.
    pub rate: Decimal,
}
