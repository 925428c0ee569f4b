//! Integration tests for tax slab loading using the SQLite backend.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;

use payroll_core::PayrollRepository;
use payroll_data::{TaxSlabLoader, TaxSlabLoaderError};
use payroll_db_sqlite::SqliteRepository;

const TEST_CSV: &str = include_str!("../test-data/tax_slabs.csv");

/// Sets up a test database with migrations run but NO seed data.
/// This simulates a user running --migrate without --seeds.
async fn setup_test_db_without_seeds() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");

    repo
}

async fn setup_test_db() -> SqliteRepository {
    let repo = setup_test_db_without_seeds().await;

    // Insert tax regimes (required before slabs can reference them)
    sqlx::query(
        "INSERT INTO tax_regimes
            (id, regime_code, regime_name, standard_deduction, cess_percent, rebate_limit)
         VALUES
            (1, 'new', 'New Regime', 75000, 4, 25000),
            (2, 'old', 'Old Regime', 50000, 4, 25000)",
    )
    .execute(repo.pool())
    .await
    .expect("Failed to insert tax regimes");

    repo
}

#[tokio::test]
async fn test_load_all_slabs() {
    let repo = setup_test_db().await;

    let records = TaxSlabLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    let inserted = TaxSlabLoader::load(&repo, &records)
        .await
        .expect("Failed to load slabs");

    assert_eq!(inserted, 8);
}

#[tokio::test]
async fn test_load_and_retrieve_new_regime_slabs() {
    let repo = setup_test_db().await;

    let records = TaxSlabLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    TaxSlabLoader::load(&repo, &records)
        .await
        .expect("Failed to load slabs");

    let slabs = repo
        .get_tax_slabs(1)
        .await
        .expect("Failed to get new-regime slabs");

    assert_eq!(slabs.len(), 4);

    assert_eq!(slabs[0].lower_bound, dec!(0));
    assert_eq!(slabs[0].upper_bound, Some(dec!(300000)));
    assert_eq!(slabs[0].rate, dec!(0));

    assert_eq!(slabs[1].lower_bound, dec!(300000));
    assert_eq!(slabs[1].upper_bound, Some(dec!(500000)));
    assert_eq!(slabs[1].rate, dec!(0.05));

    assert_eq!(slabs[3].lower_bound, dec!(1000000));
    assert_eq!(slabs[3].upper_bound, None);
    assert_eq!(slabs[3].rate, dec!(0.30));
}

#[tokio::test]
async fn test_load_and_retrieve_old_regime_slabs() {
    let repo = setup_test_db().await;

    let records = TaxSlabLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    TaxSlabLoader::load(&repo, &records)
        .await
        .expect("Failed to load slabs");

    let slabs = repo
        .get_tax_slabs(2)
        .await
        .expect("Failed to get old-regime slabs");

    assert_eq!(slabs.len(), 4);

    // The old regime's zero-rate bracket ends earlier.
    assert_eq!(slabs[0].upper_bound, Some(dec!(250000)));
    assert_eq!(slabs[1].lower_bound, dec!(250000));
}

#[tokio::test]
async fn test_reload_is_idempotent() {
    let repo = setup_test_db().await;

    let records = TaxSlabLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    TaxSlabLoader::load(&repo, &records)
        .await
        .expect("Failed to load slabs");
    TaxSlabLoader::load(&repo, &records)
        .await
        .expect("Failed to re-load slabs");

    let new_slabs = repo.get_tax_slabs(1).await.expect("Failed to get slabs");
    let old_slabs = repo.get_tax_slabs(2).await.expect("Failed to get slabs");

    assert_eq!(new_slabs.len(), 4);
    assert_eq!(old_slabs.len(), 4);
}

#[tokio::test]
async fn test_load_unknown_regime_code() {
    let repo = setup_test_db().await;

    let csv = "regime,lower_bound,upper_bound,rate\nflat,0,,0.10";
    let records = TaxSlabLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

    let result = TaxSlabLoader::load(&repo, &records).await;

    match result {
        Err(TaxSlabLoaderError::UnknownRegime(code)) => assert_eq!(code, "flat"),
        other => panic!("expected UnknownRegime, got {other:?}"),
    }
}

#[tokio::test]
async fn test_load_without_seeded_regimes() {
    let repo = setup_test_db_without_seeds().await;

    let records = TaxSlabLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

    let result = TaxSlabLoader::load(&repo, &records).await;

    match result {
        Err(TaxSlabLoaderError::RegimeNotFound(code)) => {
            assert!(code == "new" || code == "old", "unexpected code: {code}");
        }
        other => panic!("expected RegimeNotFound, got {other:?}"),
    }
}
