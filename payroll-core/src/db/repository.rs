use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Bonus, Employee, NewBonus, NewEmployee, TaxRegime, TaxSlab};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait PayrollRepository: Send + Sync {
    // Tax regimes
    async fn get_tax_regime(&self, id: i32) -> Result<TaxRegime, RepositoryError>;
    async fn get_tax_regime_by_code(&self, code: &str) -> Result<TaxRegime, RepositoryError>;
    async fn list_tax_regimes(&self) -> Result<Vec<TaxRegime>, RepositoryError>;

    // Tax slabs
    async fn get_tax_slabs(&self, regime_id: i32) -> Result<Vec<TaxSlab>, RepositoryError>;
    async fn insert_tax_slab(&self, slab: &TaxSlab) -> Result<(), RepositoryError>;
    async fn delete_tax_slabs(&self, regime_id: i32) -> Result<(), RepositoryError>;

    // Employees
    async fn create_employee(&self, employee: NewEmployee) -> Result<Employee, RepositoryError>;
    async fn get_employee(&self, id: i64) -> Result<Employee, RepositoryError>;
    async fn list_employees(&self, active_only: bool) -> Result<Vec<Employee>, RepositoryError>;

    // Bonuses
    async fn create_bonus(&self, bonus: NewBonus) -> Result<Bonus, RepositoryError>;
    async fn get_bonus(&self, id: i64) -> Result<Bonus, RepositoryError>;
    async fn delete_bonus(&self, id: i64) -> Result<(), RepositoryError>;
    async fn list_bonuses_for_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<Bonus>, RepositoryError>;
}
