//! Progressive slab income-tax calculations.
//!
//! This module implements the annual tax pipeline shared by every payroll
//! projection: a flat standard deduction, a marginal walk over the regime's
//! slab table, a capped rebate, and a cess surcharge on the remaining
//! liability. Monthly figures are the annual figures divided by twelve.
//!
//! # Pipeline
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Taxable income = annual gross - standard deduction (floor 0) |
//! | 2    | Slab tax: each marginal rate applies only inside its bracket |
//! | 3    | Rebate = smaller of the rebate limit and the slab tax |
//! | 4    | Tax after rebate = slab tax - rebate (floor 0) |
//! | 5    | Cess = tax after rebate x cess percent / 100 |
//! | 6    | Total tax = tax after rebate + cess |
//! | 7    | Monthly gross / tax / net = annual figures / 12 |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::calculations::{TaxCalculator, TaxConfig};
//!
//! let config = TaxConfig::default_new_regime();
//! let calculator = TaxCalculator::new(&config);
//!
//! let breakdown = calculator.calculate(dec!(800000.00)).unwrap();
//!
//! assert_eq!(breakdown.taxable_income, dec!(725000.00));
//! assert_eq!(breakdown.tax_before_rebate, dec!(55000.00));
//! assert_eq!(breakdown.rebate, dec!(25000.00));
//! assert_eq!(breakdown.total_tax, dec!(31200.00));
//! assert_eq!(breakdown.monthly_net, dec!(64066.67));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{TaxRegime, TaxSlab};

/// Errors raised when a tax configuration cannot be used for calculation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxConfigError {
    /// The slab table is empty.
    #[error("no tax slabs provided")]
    NoSlabs,

    /// The first slab does not start at zero income.
    #[error("first tax slab must start at zero, got {0}")]
    FirstSlabNotZero(Decimal),

    /// A slab does not continue exactly where the previous one ended.
    #[error("tax slab starting at {0} does not continue from previous bound {1}")]
    NonContiguousSlab(Decimal, Decimal),

    /// A bounded slab whose upper bound does not exceed its lower bound.
    #[error("tax slab upper bound {0} must exceed its lower bound {1}")]
    EmptySlab(Decimal, Decimal),

    /// An unbounded slab appears anywhere but the final position.
    #[error("only the final tax slab may be unbounded")]
    UnboundedSlabNotLast,

    /// The final slab has an upper bound, leaving high incomes uncovered.
    #[error("final tax slab must be unbounded")]
    BoundedFinalSlab,

    /// A slab rate outside the [0, 1] fraction range.
    #[error("slab rate must be between 0 and 1, got {0}")]
    InvalidRate(Decimal),

    /// A scalar parameter that must not be negative.
    #[error("{0} must be non-negative, got {1}")]
    NegativeParameter(&'static str, Decimal),
}

/// A complete tax configuration: the scalar parameters of a regime plus its
/// ordered slab table.
///
/// Configurations are data, not code: different regimes or fiscal years are
/// expressed as different `TaxConfig` values over the same algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Flat deduction subtracted from annual gross before the slab walk.
    pub standard_deduction: Decimal,

    /// Percentage surcharge applied to post-rebate tax (4 means 4%).
    pub cess_percent: Decimal,

    /// Statutory cap on the rebate; the rebate is also capped by the actual
    /// pre-rebate liability.
    pub rebate_limit: Decimal,

    /// Marginal brackets in ascending order; the final slab is unbounded.
    pub slabs: Vec<TaxSlab>,
}

impl TaxConfig {
    /// Builds a configuration from a persisted regime row and its slab table.
    pub fn from_regime(
        regime: &TaxRegime,
        slabs: Vec<TaxSlab>,
    ) -> Self {
        Self {
            standard_deduction: regime.standard_deduction,
            cess_percent: regime.cess_percent,
            rebate_limit: regime.rebate_limit,
            slabs,
        }
    }

    /// The built-in new-regime schedule, matching the seeded reference data.
    ///
    /// Normally configurations are loaded from the database; this constant
    /// schedule exists for tests and offline use.
    pub fn default_new_regime() -> Self {
        let slab = |lower: i64, upper: Option<i64>, rate: Decimal| TaxSlab {
            regime_id: 1,
            lower_bound: Decimal::from(lower),
            upper_bound: upper.map(Decimal::from),
            rate,
        };

        Self {
            standard_deduction: Decimal::from(75000),
            cess_percent: Decimal::from(4),
            rebate_limit: Decimal::from(25000),
            slabs: vec![
                slab(0, Some(300000), Decimal::ZERO),
                slab(300000, Some(500000), Decimal::new(5, 2)),
                slab(500000, Some(1000000), Decimal::new(20, 2)),
                slab(1000000, None, Decimal::new(30, 2)),
            ],
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TaxConfigError`] if:
    /// - the slab table is empty,
    /// - the slabs do not tile `[0, infinity)` contiguously in ascending
    ///   order with exactly the final slab unbounded,
    /// - any rate is outside `[0, 1]`,
    /// - `standard_deduction`, `cess_percent`, or `rebate_limit` is negative.
    pub fn validate(&self) -> Result<(), TaxConfigError> {
        if self.slabs.is_empty() {
            return Err(TaxConfigError::NoSlabs);
        }
        if self.standard_deduction < Decimal::ZERO {
            return Err(TaxConfigError::NegativeParameter(
                "standard deduction",
                self.standard_deduction,
            ));
        }
        if self.cess_percent < Decimal::ZERO {
            return Err(TaxConfigError::NegativeParameter(
                "cess percent",
                self.cess_percent,
            ));
        }
        if self.rebate_limit < Decimal::ZERO {
            return Err(TaxConfigError::NegativeParameter(
                "rebate limit",
                self.rebate_limit,
            ));
        }

        let mut expected_lower = Decimal::ZERO;
        let last = self.slabs.len() - 1;

        for (i, slab) in self.slabs.iter().enumerate() {
            if i == 0 && slab.lower_bound != Decimal::ZERO {
                return Err(TaxConfigError::FirstSlabNotZero(slab.lower_bound));
            }
            if slab.lower_bound != expected_lower {
                return Err(TaxConfigError::NonContiguousSlab(
                    slab.lower_bound,
                    expected_lower,
                ));
            }
            if slab.rate < Decimal::ZERO || slab.rate > Decimal::ONE {
                return Err(TaxConfigError::InvalidRate(slab.rate));
            }
            match slab.upper_bound {
                Some(_) if i == last => {
                    return Err(TaxConfigError::BoundedFinalSlab);
                }
                Some(upper) => {
                    if upper <= slab.lower_bound {
                        return Err(TaxConfigError::EmptySlab(upper, slab.lower_bound));
                    }
                    expected_lower = upper;
                }
                None if i == last => {}
                None => return Err(TaxConfigError::UnboundedSlabNotLast),
            }
        }

        Ok(())
    }
}

/// Full breakdown of one annual tax computation, including the derived
/// monthly figures. A pure function of the annual gross and the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Annual gross income the computation started from.
    pub annual_gross: Decimal,

    /// Standard deduction applied (from the config).
    pub standard_deduction: Decimal,

    /// Annual gross minus standard deduction, floored at zero.
    pub taxable_income: Decimal,

    /// Tax accumulated by the marginal slab walk, before the rebate.
    pub tax_before_rebate: Decimal,

    /// Rebate actually granted: the smaller of the statutory limit and the
    /// pre-rebate liability.
    pub rebate: Decimal,

    /// Liability after the rebate, floored at zero.
    pub tax_after_rebate: Decimal,

    /// Cess surcharge on the post-rebate liability.
    pub cess: Decimal,

    /// Post-rebate liability plus cess.
    pub total_tax: Decimal,

    /// Annual gross divided by twelve.
    pub monthly_gross: Decimal,

    /// Total tax divided by twelve.
    pub monthly_tax: Decimal,

    /// Monthly gross minus monthly tax. Not floored: a negative value means
    /// tax exceeds gross for the month.
    pub monthly_net: Decimal,
}

/// Calculator for the progressive slab tax pipeline.
///
/// Borrows a [`TaxConfig`] and computes a [`TaxBreakdown`] per call. The
/// calculation is deterministic and side-effect free: identical input always
/// produces an identical breakdown.
#[derive(Debug, Clone)]
pub struct TaxCalculator<'a> {
    config: &'a TaxConfig,
}

impl<'a> TaxCalculator<'a> {
    /// Creates a calculator over the given configuration.
    pub fn new(config: &'a TaxConfig) -> Self {
        Self { config }
    }

    /// Runs the complete annual tax pipeline for one gross income.
    ///
    /// Callers are expected to coerce missing salaries to zero before
    /// calling; the pipeline itself never fails on numeric input.
    ///
    /// # Errors
    ///
    /// Returns [`TaxConfigError`] if the configuration is invalid.
    pub fn calculate(
        &self,
        annual_gross: Decimal,
    ) -> Result<TaxBreakdown, TaxConfigError> {
        self.config.validate()?;

        let taxable_income = self.taxable_income(annual_gross);
        let tax_before_rebate = self.slab_tax(taxable_income);
        let rebate = self.rebate(tax_before_rebate);
        let tax_after_rebate = non_negative(round_half_up(tax_before_rebate - rebate));
        let cess = self.cess(tax_after_rebate);
        let total_tax = round_half_up(tax_after_rebate + cess);

        let months = Decimal::from(12);
        let monthly_gross = round_half_up(annual_gross / months);
        let monthly_tax = round_half_up(total_tax / months);
        let monthly_net = monthly_gross - monthly_tax;

        Ok(TaxBreakdown {
            annual_gross,
            standard_deduction: self.config.standard_deduction,
            taxable_income,
            tax_before_rebate,
            rebate,
            tax_after_rebate,
            cess,
            total_tax,
            monthly_gross,
            monthly_tax,
            monthly_net,
        })
    }

    /// Applies the standard deduction, flooring taxable income at zero.
    fn taxable_income(
        &self,
        annual_gross: Decimal,
    ) -> Decimal {
        non_negative(round_half_up(annual_gross - self.config.standard_deduction))
    }

    /// Walks the ordered slabs, taxing only the portion of income that falls
    /// inside each bracket, and stops once nothing remains.
    fn slab_tax(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        let mut remaining = taxable_income;
        let mut tax = Decimal::ZERO;

        for slab in &self.config.slabs {
            if remaining <= Decimal::ZERO {
                break;
            }
            let taxed_here = match slab.upper_bound {
                Some(upper) => remaining.min(upper - slab.lower_bound),
                None => remaining,
            };
            tax += taxed_here * slab.rate;
            remaining -= taxed_here;
        }

        round_half_up(tax)
    }

    /// The rebate never exceeds the statutory cap or the actual liability.
    fn rebate(
        &self,
        tax_before_rebate: Decimal,
    ) -> Decimal {
        self.config.rebate_limit.min(tax_before_rebate)
    }

    /// Cess surcharge on the post-rebate liability.
    fn cess(
        &self,
        tax_after_rebate: Decimal,
    ) -> Decimal {
        round_half_up(tax_after_rebate * self.config.cess_percent / Decimal::ONE_HUNDRED)
    }
}
