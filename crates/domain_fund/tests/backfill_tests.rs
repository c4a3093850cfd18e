//! Backfill pipeline tests against the in-memory store

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use core_kernel::{format_date, SchemeCode};

use domain_fund::backfill::{BackfillConfig, BackfillPipeline};
use domain_fund::fund::FundMeta;
use domain_fund::nav::NavPoint;
use domain_fund::ports::mock::MockNavStore;

fn meta(code: i64) -> FundMeta {
    FundMeta::new(SchemeCode::new(code), "Test Scheme")
        .with_fund_house("Test Mutual Fund")
        .with_classification("Open Ended Schemes", "Equity Scheme - Large Cap Fund")
}

fn series(days: u64) -> Vec<NavPoint> {
    let last = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    (0..days)
        .map(|i| NavPoint::new(format_date(last - chrono::Days::new(i)), format!("{}.5", 100 + i)))
        .collect()
}

#[tokio::test]
async fn test_gate_bounds_concurrent_batches() {
    let store = Arc::new(MockNavStore::new().with_write_delay(Duration::from_millis(20)));
    let config = BackfillConfig::default().batch_size(10).concurrency_limit(3);
    let pipeline = BackfillPipeline::new(store.clone(), config);

    let report = pipeline.persist(meta(1), series(200)).await;

    assert_eq!(report.batches, 20);
    assert_eq!(store.batch_calls(), 20);
    assert!(store.max_in_flight() <= 3, "saw {} in flight", store.max_in_flight());
    assert!(store.max_in_flight() >= 2, "batches never overlapped");
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_full_series_written() {
    let store = Arc::new(MockNavStore::new());
    let pipeline = BackfillPipeline::new(store.clone(), BackfillConfig::default().batch_size(7));

    let report = pipeline.persist(meta(2), series(50)).await;

    assert_eq!(report.records_written, 50);
    assert_eq!(store.record_count(SchemeCode::new(2)).await, 50);
    assert!(report.marked_complete);
    assert!(store.is_complete(SchemeCode::new(2)).await);
}

#[tokio::test]
async fn test_failed_batch_leaves_siblings_intact() {
    let store = Arc::new(MockNavStore::new());
    store.fail_batch_containing(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    let pipeline = BackfillPipeline::new(store.clone(), BackfillConfig::default().batch_size(10));

    let report = pipeline.persist(meta(3), series(30)).await;

    assert_eq!(report.batches, 3);
    assert_eq!(report.failed_batches, 1);
    assert_eq!(report.records_written, 20);
    assert_eq!(store.record_count(SchemeCode::new(3)).await, 20);
    assert!(!report.is_complete());
    assert!(!report.marked_complete);
    assert!(!store.is_complete(SchemeCode::new(3)).await);
}

#[tokio::test]
async fn test_retry_after_failed_batch_completes_fund() {
    let store = Arc::new(MockNavStore::new());
    let lost = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    store.fail_batch_containing(lost);
    let pipeline = BackfillPipeline::new(store.clone(), BackfillConfig::default().batch_size(10));

    pipeline.persist(meta(8), series(30)).await;
    store.fail_batch_containing(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
    let retry = pipeline.persist(meta(8), series(30)).await;

    assert_eq!(retry.records_written, 10);
    assert!(retry.is_complete());
    assert!(store.is_complete(SchemeCode::new(8)).await);
    assert!(store.stored_dates(SchemeCode::new(8)).await.contains(&lost));
}

#[tokio::test]
async fn test_fund_insert_failure_aborts() {
    let store = Arc::new(MockNavStore::new());
    store.fail_fund_insert(true);
    let pipeline = BackfillPipeline::new(store.clone(), BackfillConfig::default());

    let report = pipeline.persist(meta(4), series(10)).await;

    assert!(report.fund.is_none());
    assert!(!report.marked_complete);
    assert_eq!(store.batch_calls(), 0);
    assert_eq!(store.record_count(SchemeCode::new(4)).await, 0);
}

#[tokio::test]
async fn test_malformed_entries_skipped() {
    let store = Arc::new(MockNavStore::new());
    let pipeline = BackfillPipeline::new(store.clone(), BackfillConfig::default());
    let mut points = series(5);
    points.push(NavPoint::new("not-a-date", "1.0"));
    points.push(NavPoint::new("01-01-2020", "N.A."));

    let report = pipeline.persist(meta(5), points).await;

    assert_eq!(report.skipped_entries, 2);
    assert_eq!(report.records_written, 5);
}

#[tokio::test]
async fn test_repeated_backfill_is_idempotent() {
    let store = Arc::new(MockNavStore::new());
    let pipeline = BackfillPipeline::new(store.clone(), BackfillConfig::default().batch_size(4));

    let first = pipeline.persist(meta(6), series(12)).await;
    let second = pipeline.persist(meta(6), series(12)).await;

    assert_eq!(first.fund, second.fund);
    assert_eq!(second.records_written, 0);
    assert_eq!(store.record_count(SchemeCode::new(6)).await, 12);
}

#[tokio::test]
async fn test_spawned_handle_reports() {
    let store = Arc::new(MockNavStore::new());
    let pipeline = BackfillPipeline::new(store.clone(), BackfillConfig::default());

    let handle = pipeline.spawn(meta(7), series(3));
    assert_eq!(handle.scheme_code(), SchemeCode::new(7));

    let report = handle.wait().await;
    assert_eq!(report.records_written, 3);
}
