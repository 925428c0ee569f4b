//! Payroll calculation modules.
//!
//! This module provides the pure computation pipeline behind the payroll
//! screens: the progressive slab tax calculation and the monthly take-home
//! projection built on top of it.

pub mod common;
pub mod projection;
pub mod tax;

pub use projection::{PayrollProjection, PayrollProjector};
pub use tax::{TaxBreakdown, TaxCalculator, TaxConfig, TaxConfigError};
