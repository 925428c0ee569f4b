use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    pub id: i64,
    pub employee_id: i64,
    pub amount: Decimal,
    pub reason: Option<String>,
    pub assigned_by: Option<String>,

    /// When the bonus was assigned. Determines the payout month; bonuses
    /// without a timestamp never land in a specific month but still count
    /// toward annual totals.
    pub assigned_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// For creating new bonuses (no id or creation timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBonus {
    pub employee_id: i64,
    pub amount: Decimal,
    pub reason: Option<String>,
    pub assigned_by: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
}
