use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub department: Option<String>,

    /// Annual gross salary. `None` means no salary has been assigned yet;
    /// projections treat it as zero.
    pub annual_salary: Option<Decimal>,

    pub date_of_joining: Option<NaiveDate>,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new employees (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub full_name: String,
    pub email: String,
    pub department: Option<String>,
    pub annual_salary: Option<Decimal>,
    pub date_of_joining: Option<NaiveDate>,
    pub is_active: bool,
}
