//! HTTP surface tests against in-memory ports

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use domain_fund::ports::mock::{MockNavStore, MockUpstream};
use domain_fund::validation::{MSG_BOTH_DATES, MSG_ID_NOT_INTEGER, MSG_ID_REQUIRED};
use domain_fund::NavService;
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState};
use test_utils::{assert_nav_scale, FundFixtures, SeriesFixtures};

struct Harness {
    server: TestServer,
    state: AppState,
    store: Arc<MockNavStore>,
    upstream: Arc<MockUpstream>,
}

impl Harness {
    async fn new() -> Self {
        let store = Arc::new(MockNavStore::new());
        let upstream = Arc::new(
            MockUpstream::new()
                .with_history(FundFixtures::axis_meta(), SeriesFixtures::axis_history())
                .await,
        );
        let config = ApiConfig {
            batch_size: 100,
            ..ApiConfig::default()
        };
        let service = NavService::new(store.clone(), upstream.clone(), config.backfill_config());
        let state = AppState::new(service, config);
        let server = TestServer::new(create_router(state.clone())).unwrap();

        Self {
            server,
            state,
            store,
            upstream,
        }
    }

    async fn drain_backfills(&self) {
        self.state.backfills.close();
        self.state.backfills.wait().await;
    }
}

#[tokio::test]
async fn test_miss_returns_window_and_backfills() {
    let h = Harness::new().await;

    let response = h
        .server
        .get("/")
        .add_query_param("mutualFundID", "120503")
        .add_query_param("start", "01-01-2020")
        .add_query_param("end", "31-12-2020")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["meta"]["scheme_code"], 120503);
    assert_eq!(body["meta"]["fund_house"], "Axis Mutual Fund");
    assert_eq!(body["period"], "01-01-2020 to 31-12-2020");
    assert_eq!(body["data"].as_array().unwrap().len(), 366);
    assert_eq!(body["data"][0]["date"], "31-12-2020");
    assert_eq!(body["data"][365]["date"], "01-01-2020");

    h.drain_backfills().await;
    assert_eq!(h.store.record_count(FundFixtures::axis_code()).await, 800);
}

#[tokio::test]
async fn test_second_request_is_served_from_store() {
    let h = Harness::new().await;

    h.server
        .get("/api/v1/nav")
        .add_query_param("mutualFundID", "120503")
        .await
        .assert_status_ok();
    h.drain_backfills().await;

    let response = h
        .server
        .get("/api/v1/nav")
        .add_query_param("mutualFundID", "120503")
        .await;

    response.assert_status_ok();
    assert_eq!(h.upstream.fetch_calls(), 1);

    let body: domain_fund::NavResponse = response.json();
    assert!(body.period.is_none());
    assert_eq!(body.data.len(), 800);
    assert_nav_scale(&body.data, 4);
}

#[tokio::test]
async fn test_period_absent_without_window() {
    let h = Harness::new().await;

    let response = h.server.get("/").add_query_param("mutualFundID", "120503").await;

    let body: Value = response.json();
    assert!(body.get("period").is_none());
    assert_eq!(body["data"].as_array().unwrap().len(), 800);
}

#[tokio::test]
async fn test_empty_dates_mean_no_window() {
    let h = Harness::new().await;

    let response = h.server.get("/?mutualFundID=120503&start=&end=").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.get("period").is_none());
}

#[tokio::test]
async fn test_validation_errors_render_as_bad_request() {
    let h = Harness::new().await;

    let cases = [
        ("/", MSG_ID_REQUIRED),
        ("/?mutualFundID=", MSG_ID_REQUIRED),
        ("/?mutualFundID=abc", MSG_ID_NOT_INTEGER),
        ("/?mutualFundID=120503&start=01-01-2020", MSG_BOTH_DATES),
        ("/?mutualFundID=120503&start=2020-01-01&end=31-12-2020", "invalid start date format. use dd-mm-yyyy"),
        ("/?mutualFundID=120503&start=1-1-2020&end=31-12-2020", "invalid start date format. use dd-mm-yyyy"),
        ("/?mutualFundID=120503&start=31-12-2020&end=01-01-2020", "start date cannot be after end date"),
        ("/?mutualFundID=120503&start=01-01-2020&end=01-01-2999", "end date cannot be in the future"),
    ];

    for (uri, message) in cases {
        let response = h.server.get(uri).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": message }));
    }

    assert_eq!(h.store.probe_calls(), 0);
    assert_eq!(h.upstream.fetch_calls(), 0);
}

#[tokio::test]
async fn test_unknown_identifier() {
    let h = Harness::new().await;

    let response = h.server.get("/").add_query_param("mutualFundID", "999999999").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "invalid mutual fund ID 999999999" }));
    assert_eq!(h.store.fund_inserts(), 0);
}

#[tokio::test]
async fn test_upstream_failure_is_flattened() {
    let h = Harness::new().await;
    h.upstream.fail_with("connection reset");

    let response = h.server.get("/").add_query_param("mutualFundID", "120503").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("something went wrong while fetching data from upstream"));
    assert_eq!(body.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_store_read_failure_is_flattened() {
    let h = Harness::new().await;
    h.server
        .get("/")
        .add_query_param("mutualFundID", "120503")
        .await
        .assert_status_ok();
    h.drain_backfills().await;
    h.store.fail_reads(true);

    let response = h.server.get("/").add_query_param("mutualFundID", "120503").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("something went wrong while fetching data from the store"));
    assert_eq!(body.as_object().unwrap().len(), 1);
    assert_eq!(h.upstream.fetch_calls(), 1);
}

#[tokio::test]
async fn test_unreachable_store_degrades_to_upstream() {
    let h = Harness::new().await;
    h.store.set_available(false);

    let response = h.server.get("/").add_query_param("mutualFundID", "120503").await;

    response.assert_status_ok();
    assert_eq!(h.upstream.fetch_calls(), 1);
    h.drain_backfills().await;
}

#[tokio::test]
async fn test_request_id_is_set_and_propagated() {
    let h = Harness::new().await;

    let request_id = HeaderName::from_static("x-request-id");

    let generated = h.server.get("/health").await;
    assert!(!generated.header(request_id.clone()).is_empty());

    let echoed = h
        .server
        .get("/health")
        .add_header(request_id.clone(), HeaderValue::from_static("req-42"))
        .await;
    assert_eq!(echoed.header(request_id), "req-42");
}

#[tokio::test]
async fn test_health_and_readiness() {
    let h = Harness::new().await;

    let health = h.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "healthy");

    let ready = h.server.get("/health/ready").await;
    ready.assert_status_ok();
    assert_eq!(ready.json::<Value>()["store"], "healthy");

    h.store.set_available(false);
    h.server
        .get("/health/ready")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}
