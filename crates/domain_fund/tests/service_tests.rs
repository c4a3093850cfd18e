//! Orchestrator tests: hit, miss, degraded and failure paths

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};

use core_kernel::{format_date, SchemeCode};

use domain_fund::backfill::BackfillConfig;
use domain_fund::fund::FundMeta;
use domain_fund::nav::NavPoint;
use domain_fund::ports::mock::{MockNavStore, MockUpstream};
use domain_fund::ports::UpstreamHistory;
use domain_fund::service::{LookupSource, NavService};
use domain_fund::FundError;

const AXIS: i64 = 120503;

fn axis_meta() -> FundMeta {
    FundMeta::new(SchemeCode::new(AXIS), "Axis ELSS Tax Saver Fund - Direct Plan - Growth")
        .with_fund_house("Axis Mutual Fund")
        .with_classification("Open Ended Schemes", "Equity Scheme - ELSS")
}

/// Upstream-shaped history: newest first, values with five decimals
fn axis_history() -> Vec<NavPoint> {
    let last = NaiveDate::from_ymd_opt(2021, 3, 31).unwrap();
    (0..600u64)
        .map(|i| NavPoint::new(format_date(last - chrono::Days::new(i)), format!("{}.12345", 40 + i % 30)))
        .collect()
}

async fn service(store: Arc<MockNavStore>, upstream: Arc<MockUpstream>) -> NavService {
    NavService::new(store, upstream, BackfillConfig::default().batch_size(50))
}

#[tokio::test]
async fn test_miss_fetches_once_and_backfills_full_history() {
    let store = Arc::new(MockNavStore::new());
    let upstream = Arc::new(MockUpstream::new().with_history(axis_meta(), axis_history()).await);
    let service = service(store.clone(), upstream.clone()).await;

    let lookup = service
        .lookup("120503", Some("01-01-2020"), Some("31-12-2020"))
        .await
        .unwrap();

    assert_eq!(lookup.source, LookupSource::Upstream);
    assert_eq!(upstream.fetch_calls(), 1);
    assert_eq!(lookup.response.period.as_deref(), Some("01-01-2020 to 31-12-2020"));
    assert_eq!(lookup.response.data.len(), 366);
    assert_eq!(lookup.response.data[0].date, "31-12-2020");

    let report = lookup.backfill.expect("miss starts a backfill").wait().await;
    assert_eq!(report.records_written, 600);
    assert_eq!(store.record_count(SchemeCode::new(AXIS)).await, 600);
}

#[tokio::test]
async fn test_hit_skips_upstream() {
    let store = Arc::new(MockNavStore::new().with_fund(axis_meta(), &axis_history()).await);
    let upstream = Arc::new(MockUpstream::new());
    let service = service(store.clone(), upstream.clone()).await;

    let lookup = service.lookup("120503", None, None).await.unwrap();

    assert_eq!(lookup.source, LookupSource::Store);
    assert!(lookup.backfill.is_none());
    assert_eq!(upstream.fetch_calls(), 0);
    assert!(lookup.response.period.is_none());
    assert_eq!(lookup.response.meta, axis_meta());
    assert_eq!(lookup.response.data.len(), 600);
    assert_eq!(lookup.response.data[0], NavPoint::new("31-03-2021", "40.1235"));
}

#[tokio::test]
async fn test_hit_after_backfill() {
    let store = Arc::new(MockNavStore::new());
    let upstream = Arc::new(MockUpstream::new().with_history(axis_meta(), axis_history()).await);
    let service = service(store.clone(), upstream.clone()).await;

    let first = service.lookup("120503", None, None).await.unwrap();
    first.backfill.unwrap().wait().await;

    let second = service
        .lookup("120503", Some("01-01-2020"), Some("31-12-2020"))
        .await
        .unwrap();

    assert_eq!(second.source, LookupSource::Store);
    assert_eq!(upstream.fetch_calls(), 1);
    assert_eq!(second.response.data.len(), 366);
    assert_eq!(second.response.data.last().unwrap().date, "01-01-2020");
}

#[tokio::test]
async fn test_lookup_during_running_backfill_goes_upstream() {
    let store = Arc::new(MockNavStore::new().with_write_delay(Duration::from_millis(100)));
    let upstream = Arc::new(MockUpstream::new().with_history(axis_meta(), axis_history()).await);
    let service = service(store.clone(), upstream.clone()).await;

    let first = service.lookup("120503", None, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.fund_inserts(), 1);

    let second = service.lookup("120503", None, None).await.unwrap();

    assert_eq!(second.source, LookupSource::Upstream);
    assert_eq!(second.response.data.len(), 600);
    assert_eq!(upstream.fetch_calls(), 2);

    first.backfill.unwrap().wait().await;
    second.backfill.unwrap().wait().await;

    let third = service.lookup("120503", None, None).await.unwrap();
    assert_eq!(third.source, LookupSource::Store);
    assert_eq!(third.response.data.len(), 600);
}

#[tokio::test]
async fn test_partial_backfill_is_retried_on_next_lookup() {
    let store = Arc::new(MockNavStore::new());
    store.fail_batch_containing(NaiveDate::from_ymd_opt(2021, 3, 31).unwrap());
    let upstream = Arc::new(MockUpstream::new().with_history(axis_meta(), axis_history()).await);
    let service = service(store.clone(), upstream.clone()).await;

    let first = service.lookup("120503", None, None).await.unwrap();
    let report = first.backfill.unwrap().wait().await;
    assert_eq!(report.failed_batches, 1);
    assert_eq!(store.record_count(SchemeCode::new(AXIS)).await, 550);

    store.fail_batch_containing(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
    let second = service.lookup("120503", None, None).await.unwrap();
    assert_eq!(second.source, LookupSource::Upstream);
    assert_eq!(second.response.data.len(), 600);
    assert!(second.backfill.unwrap().wait().await.is_complete());

    let third = service.lookup("120503", None, None).await.unwrap();
    assert_eq!(third.source, LookupSource::Store);
    assert_eq!(third.response.data.len(), 600);
    assert_eq!(upstream.fetch_calls(), 2);
}

#[tokio::test]
async fn test_store_read_failure_after_hit() {
    let store = Arc::new(MockNavStore::new().with_fund(axis_meta(), &axis_history()).await);
    store.fail_reads(true);
    let upstream = Arc::new(MockUpstream::new().with_history(axis_meta(), axis_history()).await);
    let service = service(store.clone(), upstream.clone()).await;

    let result = service.lookup("120503", None, None).await;

    match result {
        Err(e @ FundError::StoreRead(_)) => {
            assert!(e.is_transient());
            assert!(e.to_string().starts_with("something went wrong while fetching data from the store"));
        }
        other => panic!("expected StoreRead, got {:?}", other.map(|l| l.source)),
    }
    assert_eq!(store.read_calls(), 1);
    assert_eq!(upstream.fetch_calls(), 0);
    assert_eq!(store.fund_inserts(), 0);
}

#[tokio::test]
async fn test_unavailable_store_degrades_to_upstream() {
    let store = Arc::new(MockNavStore::new());
    store.set_available(false);
    let upstream = Arc::new(MockUpstream::new().with_history(axis_meta(), axis_history()).await);
    let service = service(store.clone(), upstream.clone()).await;

    let lookup = service.lookup("120503", None, None).await.unwrap();

    assert_eq!(lookup.source, LookupSource::UpstreamDegraded);
    assert_eq!(lookup.response.data, axis_history());

    let report = lookup.backfill.unwrap().wait().await;
    assert!(report.fund.is_none());
}

#[tokio::test]
async fn test_unknown_identifier() {
    let store = Arc::new(MockNavStore::new());
    let upstream = Arc::new(MockUpstream::new());
    let service = service(store.clone(), upstream.clone()).await;

    let result = service.lookup("999999999", None, None).await;

    assert!(matches!(result, Err(FundError::InvalidIdentifier(code)) if code == SchemeCode::new(999999999)));
    assert_eq!(store.fund_inserts(), 0);
}

#[tokio::test]
async fn test_empty_meta_is_unknown_identifier() {
    let store = Arc::new(MockNavStore::new());
    let upstream = Arc::new(
        MockUpstream::new()
            .with_payload(SchemeCode::new(5), UpstreamHistory::default())
            .await,
    );
    let service = service(store.clone(), upstream.clone()).await;

    assert!(matches!(
        service.lookup("5", None, None).await,
        Err(FundError::InvalidIdentifier(_))
    ));
    assert_eq!(upstream.fetch_calls(), 1);
    assert_eq!(store.fund_inserts(), 0);
}

#[tokio::test]
async fn test_upstream_failure() {
    let store = Arc::new(MockNavStore::new());
    let upstream = Arc::new(MockUpstream::new());
    upstream.fail_with("connection reset");
    let service = service(store.clone(), upstream.clone()).await;

    let result = service.lookup("120503", None, None).await;

    assert!(matches!(result, Err(FundError::Upstream(_))));
}

#[tokio::test]
async fn test_invalid_request_touches_nothing() {
    let store = Arc::new(MockNavStore::new());
    let upstream = Arc::new(MockUpstream::new());
    let service = service(store.clone(), upstream.clone()).await;

    let tomorrow = format_date(Utc::now().date_naive() + chrono::Days::new(1));
    for (code, start, end) in [
        ("", None, None),
        ("abc", None, None),
        ("120503", Some("01-01-2020"), None),
        ("120503", Some("01-01-2020"), Some(tomorrow.as_str())),
        ("120503", Some("31-12-2030"), Some("31-12-2030")),
    ] {
        let result = service.lookup(code, start, end).await;
        assert!(matches!(result, Err(FundError::InvalidRequest(_))), "{:?}", (code, start, end));
    }

    assert_eq!(store.probe_calls(), 0);
    assert_eq!(upstream.fetch_calls(), 0);
}
