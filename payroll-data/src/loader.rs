use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use payroll_core::{PayrollRepository, RegimeCode, RepositoryError, TaxSlab};

/// Errors that can occur when loading tax slab data.
#[derive(Debug, Error)]
pub enum TaxSlabLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown regime code: {0}")]
    UnknownRegime(String),

    #[error("Regime '{0}' not found in database (have you run the seeds?)")]
    RegimeNotFound(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for TaxSlabLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxSlabLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the tax slabs CSV file.
///
/// Columns:
/// - `regime`: the regime code (`new` or `old`)
/// - `lower_bound`: inclusive lower income bound of the slab
/// - `upper_bound`: upper income bound (empty for the final unbounded slab)
/// - `rate`: the marginal rate as a fraction (e.g. 0.05 for 5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxSlabRecord {
    pub regime: String,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for tax slab data from CSV files.
///
/// The loader reads CSV data and writes it through the `PayrollRepository`
/// trait, so it works with any database backend. Slabs for a regime are
/// replaced wholesale: loading deletes the regime's existing slab table
/// before inserting the new rows, making re-loads idempotent.
pub struct TaxSlabLoader;

impl TaxSlabLoader {
    /// Parse tax slab records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxSlabRecord>, TaxSlabLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxSlabRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Load tax slab records into the database.
    ///
    /// For each regime code appearing in the records, this method will:
    /// 1. Check the code is a known regime code
    /// 2. Look up the regime row in the database
    /// 3. Delete any existing slabs for that regime
    /// 4. Insert all new slabs, ordered by lower bound
    ///
    /// Returns the number of slabs inserted.
    pub async fn load<R: PayrollRepository>(
        repo: &R,
        records: &[TaxSlabRecord],
    ) -> Result<usize, TaxSlabLoaderError> {
        let mut inserted = 0;

        // Group records by regime to delete and re-insert per regime
        let mut groups: std::collections::HashMap<String, Vec<&TaxSlabRecord>> =
            std::collections::HashMap::new();

        for record in records {
            groups
                .entry(record.regime.clone())
                .or_default()
                .push(record);
        }

        for (regime_code, mut group_records) in groups {
            if RegimeCode::parse(&regime_code).is_none() {
                return Err(TaxSlabLoaderError::UnknownRegime(regime_code));
            }

            let regime = repo
                .get_tax_regime_by_code(&regime_code)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound => {
                        TaxSlabLoaderError::RegimeNotFound(regime_code.clone())
                    }
                    other => TaxSlabLoaderError::Repository(other),
                })?;

            repo.delete_tax_slabs(regime.id).await?;

            group_records.sort_by_key(|record| record.lower_bound);

            for record in group_records {
                let slab = TaxSlab {
                    regime_id: regime.id,
                    lower_bound: record.lower_bound,
                    upper_bound: record.upper_bound,
                    rate: record.rate,
                };

                repo.insert_tax_slab(&slab).await?;
                inserted += 1;
            }
        }

        Ok(inserted)
    }
}
