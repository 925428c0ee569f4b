use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, sqlite::SqlitePool};
use tracing::debug;

use payroll_core::{
    Bonus, Employee, NewBonus, NewEmployee, PayrollRepository, RegimeCode, RepositoryError,
    TaxRegime, TaxSlab,
};

use crate::decimal::{decimal_to_f64, get_decimal, get_optional_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            debug!("executing seed file {}", path.display());
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err<E: std::fmt::Display>(e: E) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_regime(row: &sqlx::sqlite::SqliteRow) -> Result<TaxRegime, RepositoryError> {
    let code_str: String = row.try_get("regime_code").map_err(db_err)?;
    let code = RegimeCode::parse(&code_str)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid regime code: {}", code_str)))?;

    Ok(TaxRegime {
        id: row.try_get("id").map_err(db_err)?,
        code,
        name: row.try_get("regime_name").map_err(db_err)?,
        standard_deduction: get_decimal(row, "standard_deduction")?,
        cess_percent: get_decimal(row, "cess_percent")?,
        rebate_limit: get_decimal(row, "rebate_limit")?,
    })
}

fn row_to_slab(row: &sqlx::sqlite::SqliteRow) -> Result<TaxSlab, RepositoryError> {
    Ok(TaxSlab {
        regime_id: row.try_get("regime_id").map_err(db_err)?,
        lower_bound: get_decimal(row, "lower_bound")?,
        upper_bound: get_optional_decimal(row, "upper_bound")?,
        rate: get_decimal(row, "rate")?,
    })
}

fn row_to_employee(row: &sqlx::sqlite::SqliteRow) -> Result<Employee, RepositoryError> {
    Ok(Employee {
        id: row.try_get("id").map_err(db_err)?,
        full_name: row.try_get("full_name").map_err(db_err)?,
        email: row.try_get("email").map_err(db_err)?,
        department: row.try_get("department").map_err(db_err)?,
        annual_salary: get_optional_decimal(row, "annual_salary")?,
        date_of_joining: row
            .try_get::<Option<NaiveDate>, _>("date_of_joining")
            .map_err(db_err)?,
        is_active: row.try_get("is_active").map_err(db_err)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(db_err)?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(db_err)?,
    })
}

fn row_to_bonus(row: &sqlx::sqlite::SqliteRow) -> Result<Bonus, RepositoryError> {
    Ok(Bonus {
        id: row.try_get("id").map_err(db_err)?,
        employee_id: row.try_get("employee_id").map_err(db_err)?,
        amount: get_decimal(row, "amount")?,
        reason: row.try_get("reason").map_err(db_err)?,
        assigned_by: row.try_get("assigned_by").map_err(db_err)?,
        assigned_at: row
            .try_get::<Option<DateTime<Utc>>, _>("assigned_at")
            .map_err(db_err)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(db_err)?,
    })
}

#[async_trait]
impl PayrollRepository for SqliteRepository {
    async fn get_tax_regime(
        &self,
        id: i32,
    ) -> Result<TaxRegime, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, regime_code, regime_name, standard_deduction, cess_percent, rebate_limit
             FROM tax_regimes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_regime(&row)
    }

    async fn get_tax_regime_by_code(
        &self,
        code: &str,
    ) -> Result<TaxRegime, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, regime_code, regime_name, standard_deduction, cess_percent, rebate_limit
             FROM tax_regimes WHERE regime_code = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_regime(&row)
    }

    async fn list_tax_regimes(&self) -> Result<Vec<TaxRegime>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, regime_code, regime_name, standard_deduction, cess_percent, rebate_limit
             FROM tax_regimes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_regime).collect()
    }

    async fn get_tax_slabs(
        &self,
        regime_id: i32,
    ) -> Result<Vec<TaxSlab>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT regime_id, lower_bound, upper_bound, rate
             FROM tax_slabs
             WHERE regime_id = ?
             ORDER BY lower_bound",
        )
        .bind(regime_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_slab).collect()
    }

    async fn insert_tax_slab(
        &self,
        slab: &TaxSlab,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO tax_slabs (regime_id, lower_bound, upper_bound, rate)
             VALUES (?, ?, ?, ?)",
        )
        .bind(slab.regime_id)
        .bind(decimal_to_f64(slab.lower_bound))
        .bind(slab.upper_bound.map(decimal_to_f64))
        .bind(decimal_to_f64(slab.rate))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn delete_tax_slabs(
        &self,
        regime_id: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM tax_slabs WHERE regime_id = ?")
            .bind(regime_id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn create_employee(
        &self,
        employee: NewEmployee,
    ) -> Result<Employee, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO employees (
                full_name, email, department, annual_salary, date_of_joining,
                is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&employee.full_name)
        .bind(&employee.email)
        .bind(&employee.department)
        .bind(employee.annual_salary.map(decimal_to_f64))
        .bind(employee.date_of_joining)
        .bind(employee.is_active)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.get_employee(result.last_insert_rowid()).await
    }

    async fn get_employee(
        &self,
        id: i64,
    ) -> Result<Employee, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, full_name, email, department, annual_salary, date_of_joining,
                    is_active, created_at, updated_at
             FROM employees WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_employee(&row)
    }

    async fn list_employees(
        &self,
        active_only: bool,
    ) -> Result<Vec<Employee>, RepositoryError> {
        const BASE_QUERY: &str =
            "SELECT id, full_name, email, department, annual_salary, date_of_joining,
                    is_active, created_at, updated_at
             FROM employees";

        let rows = if active_only {
            sqlx::query(&format!("{} WHERE is_active = 1 ORDER BY id", BASE_QUERY))
                .fetch_all(&self.pool)
                .await
        } else {
            sqlx::query(&format!("{} ORDER BY id", BASE_QUERY))
                .fetch_all(&self.pool)
                .await
        }
        .map_err(db_err)?;

        rows.iter().map(row_to_employee).collect()
    }

    async fn create_bonus(
        &self,
        bonus: NewBonus,
    ) -> Result<Bonus, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO bonuses (employee_id, amount, reason, assigned_by, assigned_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(bonus.employee_id)
        .bind(decimal_to_f64(bonus.amount))
        .bind(&bonus.reason)
        .bind(&bonus.assigned_by)
        .bind(bonus.assigned_at)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.get_bonus(result.last_insert_rowid()).await
    }

    async fn get_bonus(
        &self,
        id: i64,
    ) -> Result<Bonus, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, employee_id, amount, reason, assigned_by, assigned_at, created_at
             FROM bonuses WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_bonus(&row)
    }

    async fn delete_bonus(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bonuses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_bonuses_for_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Bonus>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, employee_id, amount, reason, assigned_by, assigned_at, created_at
             FROM bonuses
             WHERE employee_id = ?
             ORDER BY assigned_at DESC, id DESC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_bonus).collect()
    }
}
