use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use payroll_core::PayrollRepository;
use payroll_core::calculations::common::round_half_up;
use payroll_core::calculations::{PayrollProjection, PayrollProjector, TaxConfig};
use payroll_core::db::RepositoryRegistry;
use payroll_core::models::Employee;
use payroll_db_sqlite::SqliteRepositoryFactory;

/// Builds the registry of every backend this binary ships with.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Everything needed to render one employee's projection.
pub struct ProjectionReport {
    pub employee: Employee,
    pub regime_name: String,
    pub projection: PayrollProjection,
}

/// Loads the employee, their bonuses, and the requested regime's tax
/// configuration, then runs the projection at the given reference instant.
pub async fn project_for_employee(
    repo: &dyn PayrollRepository,
    employee_id: i64,
    regime_code: &str,
    now: DateTime<Utc>,
) -> Result<ProjectionReport> {
    let employee = repo
        .get_employee(employee_id)
        .await
        .with_context(|| format!("employee {} not found", employee_id))?;

    let bonuses = repo
        .list_bonuses_for_employee(employee_id)
        .await
        .context("failed to load bonuses")?;

    let regime = repo
        .get_tax_regime_by_code(regime_code)
        .await
        .with_context(|| format!("tax regime '{}' not found", regime_code))?;

    let slabs = repo
        .get_tax_slabs(regime.id)
        .await
        .context("failed to load tax slabs")?;

    let regime_name = regime.name.clone();
    let config = TaxConfig::from_regime(&regime, slabs);
    let projection = PayrollProjector::new(&config).project(&employee, &bonuses, now)?;

    Ok(ProjectionReport {
        employee,
        regime_name,
        projection,
    })
}

/// Formats a monetary amount with exactly two decimal places.
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_half_up(value))
}

impl fmt::Display for ProjectionReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let p = &self.projection;

        writeln!(
            f,
            "Payroll projection for {} (employee {}) under {}",
            self.employee.full_name, self.employee.id, self.regime_name
        )?;
        writeln!(
            f,
            "  Base salary:          {} / yr  ({} / mo)",
            format_money(p.base_yearly),
            format_money(p.base_monthly)
        )?;
        writeln!(
            f,
            "  Bonuses this month:   {}  ({} record(s), paid out next month)",
            format_money(p.bonus_total_this_month),
            p.bonuses_this_month.len()
        )?;
        writeln!(
            f,
            "  Other bonuses:        {}",
            format_money(p.total_bonuses_excl_this_month)
        )?;
        writeln!(f, "  Tax summary (including all bonuses):")?;
        writeln!(
            f,
            "    Taxable income:     {}",
            format_money(p.tax_with.taxable_income)
        )?;
        writeln!(
            f,
            "    Slab tax:           {}  (rebate {})",
            format_money(p.tax_with.tax_before_rebate),
            format_money(p.tax_with.rebate)
        )?;
        writeln!(
            f,
            "    Cess:               {}",
            format_money(p.tax_with.cess)
        )?;
        writeln!(
            f,
            "    Total annual tax:   {}",
            format_money(p.tax_with.total_tax)
        )?;
        writeln!(
            f,
            "  Current in-hand:      {} / mo",
            format_money(p.current_in_hand_monthly)
        )?;
        writeln!(
            f,
            "  Bonus tax impact:     {}  (withheld next month)",
            format_money(p.incremental_annual_tax)
        )?;
        write!(
            f,
            "  Projected next month: {}",
            format_money(p.projected_next_month_in_hand)
        )
    }
}
