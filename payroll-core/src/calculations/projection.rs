//! Monthly take-home projections with bonus payout timing.
//!
//! Bonuses assigned during month M are paid out with the month M+1 payroll.
//! The projection therefore runs the tax pipeline twice: once excluding the
//! current month's bonuses (the steady-state take-home) and once including
//! every bonus (the payout month). The whole incremental tax on the bonus is
//! withheld in that single payout month rather than spread across the year.
//!
//! The reference instant is always an explicit parameter; nothing here reads
//! the system clock, so projections are reproducible in tests and scripts.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use rust_decimal_macros::dec;
//! use payroll_core::calculations::{PayrollProjector, TaxConfig};
//! use payroll_core::models::{Bonus, Employee};
//!
//! let config = TaxConfig::default_new_regime();
//! let projector = PayrollProjector::new(&config);
//!
//! let now = Utc.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).unwrap();
//! let employee = Employee {
//!     id: 1,
//!     full_name: "Asha Verma".to_string(),
//!     email: "asha@example.com".to_string(),
//!     department: None,
//!     annual_salary: Some(dec!(800000.00)),
//!     date_of_joining: None,
//!     is_active: true,
//!     created_at: now,
//!     updated_at: now,
//! };
//!
//! let projection = projector.project(&employee, &[], now).unwrap();
//!
//! assert_eq!(projection.current_in_hand_monthly, dec!(64066.67));
//! assert_eq!(projection.projected_next_month_in_hand, dec!(64066.67));
//! ```

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{non_negative, round_half_up};
use crate::calculations::tax::{TaxBreakdown, TaxCalculator, TaxConfig, TaxConfigError};
use crate::models::{Bonus, Employee};

/// Result of one payroll projection for one employee.
///
/// Recomputed fresh on every call from the current salary and bonus list;
/// nothing here is cached or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollProjection {
    /// Annual base salary; zero when the employee has none assigned.
    pub base_yearly: Decimal,

    /// Annual base salary divided by twelve.
    pub base_monthly: Decimal,

    /// Bonuses assigned during the calendar month containing the reference
    /// instant. These pay out next month.
    pub bonuses_this_month: Vec<Bonus>,

    /// Sum of [`Self::bonuses_this_month`] amounts.
    pub bonus_total_this_month: Decimal,

    /// Sum of every bonus amount, dated or not.
    pub total_bonuses_all: Decimal,

    /// All-bonus total minus this month's total, floored at zero.
    pub total_bonuses_excl_this_month: Decimal,

    /// Tax pipeline over salary plus bonuses excluding this month's.
    pub tax_without: TaxBreakdown,

    /// Tax pipeline over salary plus every bonus.
    pub tax_with: TaxBreakdown,

    /// Steady-state monthly take-home, floored at zero.
    pub current_in_hand_monthly: Decimal,

    /// Additional annual tax attributable solely to this month's bonuses.
    pub incremental_annual_tax: Decimal,

    /// Next month's take-home: the steady-state figure plus the bonus
    /// payout, minus the full incremental tax withheld as one lump sum.
    pub projected_next_month_in_hand: Decimal,
}

/// Derives [`PayrollProjection`] values from an employee's salary and bonus
/// records at a given reference instant.
#[derive(Debug, Clone)]
pub struct PayrollProjector<'a> {
    config: &'a TaxConfig,
}

impl<'a> PayrollProjector<'a> {
    /// Creates a projector over the given tax configuration.
    pub fn new(config: &'a TaxConfig) -> Self {
        Self { config }
    }

    /// Computes the full projection.
    ///
    /// `now` decides which bonuses belong to the current calendar month.
    /// Bonuses without an `assigned_at` timestamp are excluded from the
    /// month bucket but still counted in the annual totals.
    ///
    /// # Errors
    ///
    /// Returns [`TaxConfigError`] if the tax configuration is invalid.
    pub fn project(
        &self,
        employee: &Employee,
        bonuses: &[Bonus],
        now: DateTime<Utc>,
    ) -> Result<PayrollProjection, TaxConfigError> {
        let base_yearly = employee.annual_salary.unwrap_or(Decimal::ZERO);
        let base_monthly = round_half_up(base_yearly / Decimal::from(12));

        let bonuses_this_month: Vec<Bonus> = bonuses
            .iter()
            .filter(|bonus| match bonus.assigned_at {
                Some(assigned_at) => assigned_in_month(assigned_at, now),
                None => {
                    debug!(
                        bonus_id = bonus.id,
                        "bonus has no assignment date; counted in annual totals only"
                    );
                    false
                }
            })
            .cloned()
            .collect();

        let bonus_total_this_month: Decimal =
            bonuses_this_month.iter().map(|bonus| bonus.amount).sum();
        let total_bonuses_all: Decimal = bonuses.iter().map(|bonus| bonus.amount).sum();
        let total_bonuses_excl_this_month =
            non_negative(total_bonuses_all - bonus_total_this_month);

        let calculator = TaxCalculator::new(self.config);
        let tax_without = calculator.calculate(base_yearly + total_bonuses_excl_this_month)?;
        let tax_with = calculator.calculate(base_yearly + total_bonuses_all)?;

        let current_in_hand_monthly = non_negative(tax_without.monthly_net);
        let incremental_annual_tax = non_negative(tax_with.total_tax - tax_without.total_tax);
        let projected_next_month_in_hand = non_negative(round_half_up(
            current_in_hand_monthly + bonus_total_this_month - incremental_annual_tax,
        ));

        Ok(PayrollProjection {
            base_yearly,
            base_monthly,
            bonuses_this_month,
            bonus_total_this_month,
            total_bonuses_all,
            total_bonuses_excl_this_month,
            tax_without,
            tax_with,
            current_in_hand_monthly,
            incremental_annual_tax,
            projected_next_month_in_hand,
        })
    }
}

/// True when `assigned_at` falls inside the calendar month containing `now`:
/// from the first instant of the 1st through the last instant of the last
/// day, both inclusive.
fn assigned_in_month(
    assigned_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    assigned_at.year() == now.year() && assigned_at.month() == now.month()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn mid_march() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    fn employee_earning(annual_salary: Option<Decimal>) -> Employee {
        let created = Utc.with_ymd_and_hms(2024, 1, 6, 9, 0, 0).unwrap();
        Employee {
            id: 42,
            full_name: "Asha Verma".to_string(),
            email: "asha.verma@example.com".to_string(),
            department: Some("Engineering".to_string()),
            annual_salary,
            date_of_joining: None,
            is_active: true,
            created_at: created,
            updated_at: created,
        }
    }

    fn bonus_assigned(
        id: i64,
        amount: Decimal,
        assigned_at: Option<DateTime<Utc>>,
    ) -> Bonus {
        Bonus {
            id,
            employee_id: 42,
            amount,
            reason: None,
            assigned_by: Some("hr@example.com".to_string()),
            assigned_at,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap(),
        }
    }

    // =========================================================================
    // assigned_in_month tests
    // =========================================================================

    #[test]
    fn assigned_in_month_includes_first_instant() {
        let first = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();

        assert!(assigned_in_month(first, mid_march()));
    }

    #[test]
    fn assigned_in_month_includes_last_instant() {
        let last = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap();

        assert!(assigned_in_month(last, mid_march()));
    }

    #[test]
    fn assigned_in_month_excludes_previous_month_end() {
        let feb_end = Utc.with_ymd_and_hms(2025, 2, 28, 23, 59, 59).unwrap();

        assert!(!assigned_in_month(feb_end, mid_march()));
    }

    #[test]
    fn assigned_in_month_excludes_same_month_other_year() {
        let march_2024 = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

        assert!(!assigned_in_month(march_2024, mid_march()));
    }

    // =========================================================================
    // project tests
    // =========================================================================

    #[test]
    fn project_without_bonuses_matches_plain_tax_run() {
        let config = TaxConfig::default_new_regime();
        let projector = PayrollProjector::new(&config);
        let employee = employee_earning(Some(dec!(800000.00)));

        let result = projector.project(&employee, &[], mid_march()).unwrap();

        assert_eq!(result.base_yearly, dec!(800000.00));
        assert_eq!(result.base_monthly, dec!(66666.67));
        assert!(result.bonuses_this_month.is_empty());
        assert_eq!(result.bonus_total_this_month, Decimal::ZERO);
        assert_eq!(result.incremental_annual_tax, Decimal::ZERO);
        assert_eq!(result.current_in_hand_monthly, dec!(64066.67));
        assert_eq!(result.projected_next_month_in_hand, dec!(64066.67));
        assert_eq!(result.tax_without, result.tax_with);
    }

    #[test]
    fn project_partitions_bonuses_by_month() {
        let config = TaxConfig::default_new_regime();
        let projector = PayrollProjector::new(&config);
        let employee = employee_earning(Some(dec!(800000.00)));

        let in_month = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let out_of_month = Utc.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap();
        let bonuses = vec![
            bonus_assigned(1, dec!(50000.00), Some(in_month)),
            bonus_assigned(2, dec!(20000.00), Some(out_of_month)),
        ];

        let result = projector.project(&employee, &bonuses, mid_march()).unwrap();

        assert_eq!(result.bonuses_this_month.len(), 1);
        assert_eq!(result.bonuses_this_month[0].id, 1);
        assert_eq!(result.bonus_total_this_month, dec!(50000.00));
        assert_eq!(result.total_bonuses_all, dec!(70000.00));
        assert_eq!(result.total_bonuses_excl_this_month, dec!(20000.00));
    }

    #[test]
    fn project_counts_undated_bonus_in_annual_totals_only() {
        let config = TaxConfig::default_new_regime();
        let projector = PayrollProjector::new(&config);
        let employee = employee_earning(Some(dec!(800000.00)));

        let bonuses = vec![bonus_assigned(7, dec!(30000.00), None)];

        let result = projector.project(&employee, &bonuses, mid_march()).unwrap();

        assert!(result.bonuses_this_month.is_empty());
        assert_eq!(result.bonus_total_this_month, Decimal::ZERO);
        assert_eq!(result.total_bonuses_all, dec!(30000.00));
        assert_eq!(result.total_bonuses_excl_this_month, dec!(30000.00));
        // The undated bonus still raises the steady-state tax base.
        assert_eq!(result.tax_without.annual_gross, dec!(830000.00));
    }

    #[test]
    fn project_withholds_incremental_tax_in_payout_month() {
        let config = TaxConfig::default_new_regime();
        let projector = PayrollProjector::new(&config);
        let employee = employee_earning(Some(dec!(800000.00)));

        let in_month = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let bonuses = vec![bonus_assigned(1, dec!(50000.00), Some(in_month))];

        let result = projector.project(&employee, &bonuses, mid_march()).unwrap();

        // Without the bonus: 800000 gross, 31200 total tax, 64066.67 net.
        assert_eq!(result.current_in_hand_monthly, dec!(64066.67));
        // With the bonus: 850000 gross, taxable 775000, slab tax 65000,
        // after rebate 40000, cess 1600, total 41600.
        assert_eq!(result.tax_with.total_tax, dec!(41600.00));
        assert_eq!(result.incremental_annual_tax, dec!(10400.00));
        // Next month: 64066.67 + 50000 - 10400, the whole incremental tax
        // withheld at once.
        assert_eq!(result.projected_next_month_in_hand, dec!(103666.67));
    }

    #[test]
    fn project_treats_missing_salary_as_zero() {
        let config = TaxConfig::default_new_regime();
        let projector = PayrollProjector::new(&config);
        let employee = employee_earning(None);

        let result = projector.project(&employee, &[], mid_march()).unwrap();

        assert_eq!(result.base_yearly, Decimal::ZERO);
        assert_eq!(result.base_monthly, Decimal::ZERO);
        assert_eq!(result.current_in_hand_monthly, Decimal::ZERO);
        assert_eq!(result.projected_next_month_in_hand, Decimal::ZERO);
    }

    #[test]
    fn project_bonus_only_income_stays_non_negative() {
        let config = TaxConfig::default_new_regime();
        let projector = PayrollProjector::new(&config);
        let employee = employee_earning(None);

        let in_month = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let bonuses = vec![bonus_assigned(1, dec!(2000000.00), Some(in_month))];

        let result = projector.project(&employee, &bonuses, mid_march()).unwrap();

        // Steady state has no income at all; the payout month carries the
        // bonus minus its full tax.
        assert_eq!(result.current_in_hand_monthly, Decimal::ZERO);
        assert!(result.incremental_annual_tax > Decimal::ZERO);
        assert!(result.projected_next_month_in_hand >= Decimal::ZERO);
        assert!(result.projected_next_month_in_hand < dec!(2000000.00));
    }

    #[test]
    fn project_is_idempotent_for_identical_inputs() {
        let config = TaxConfig::default_new_regime();
        let projector = PayrollProjector::new(&config);
        let employee = employee_earning(Some(dec!(1234567.00)));

        let in_month = Utc.with_ymd_and_hms(2025, 3, 28, 18, 30, 0).unwrap();
        let bonuses = vec![
            bonus_assigned(1, dec!(50000.00), Some(in_month)),
            bonus_assigned(2, dec!(15000.00), None),
        ];

        let first = projector.project(&employee, &bonuses, mid_march()).unwrap();
        let second = projector.project(&employee, &bonuses, mid_march()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn project_fails_on_invalid_config() {
        let mut config = TaxConfig::default_new_regime();
        config.slabs.clear();
        let projector = PayrollProjector::new(&config);
        let employee = employee_earning(Some(dec!(800000.00)));

        let result = projector.project(&employee, &[], mid_march());

        assert_eq!(result, Err(TaxConfigError::NoSlabs));
    }
}
