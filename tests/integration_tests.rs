//! Integration tests using a mock HTTP server
//!
//! Exercises the full flow: credentials → templated request → transport →
//! format resolution → cached source → pagination → cardinality estimate.

use restsource::{
    template, CachedSource, CardinalityEstimator, Credentials, Method, PageCollector,
    PaginateConfig, PostAllowList, RequestSpec, Result, TemplateContext, Transport,
    TransportConfig,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quiet_transport() -> Transport {
    Transport::with_config(TransportConfig::builder().no_rate_limit().build())
}

// ============================================================================
// Cached Source End-to-End
// ============================================================================

#[tokio::test]
async fn test_source_fetches_once_and_serves_identical_sequence() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Person": "Alice", "Roles": "DK"},
            {"Person": "Bob", "Roles": "US inc."}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let spec = RequestSpec::builder(format!("{}/api/export", mock_server.uri())).build();
    let source = CachedSource::new(quiet_transport(), spec);

    let first = source.get().await;
    let second = source.get().await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 2);
    assert_eq!(first[0]["Person"], "Alice");
}

#[tokio::test]
async fn test_source_resolves_csv_export() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/export.csv"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Person,Jan 2025,Roles\nAlice,172.5,DK\nBob,345,US inc."),
        )
        .mount(&mock_server)
        .await;

    let spec = RequestSpec::builder(format!("{}/api/export.csv", mock_server.uri())).build();
    let source = CachedSource::new(quiet_transport(), spec);

    let records = source.get().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["Person"], "Alice");
    assert_eq!(records[0]["Jan 2025"], "172.5");
    assert_eq!(records[1]["Roles"], "US inc.");
}

#[tokio::test]
async fn test_source_fail_soft_keeps_pipeline_alive() {
    let transport = Transport::with_config(
        TransportConfig::builder()
            .connect_timeout(Duration::from_millis(500))
            .timeout(Duration::from_secs(1))
            .no_rate_limit()
            .build(),
    );
    let spec = RequestSpec::builder("http://127.0.0.1:1/down").build();
    let source = CachedSource::new(transport, spec);

    // No error escapes; downstream sees an empty stream
    let records = source.get().await;
    assert!(records.is_empty());

    // ...and the planner still gets an estimate (the fallback)
    let estimate = CardinalityEstimator::new().estimate(&source).await;
    assert_eq!(estimate, CardinalityEstimator::FALLBACK_ESTIMATE);
}

// ============================================================================
// Credentialed, Templated, Paginated Flow
// ============================================================================

#[tokio::test]
async fn test_paginated_search_with_credentials_and_templates() {
    let mock_server = MockServer::start().await;
    let search_path = "/crm/v3/objects/deals/search";

    Mock::given(method("POST"))
        .and(path(search_path))
        .and(header("authorization", "Bearer pat-123"))
        .and(body_partial_json(json!({"after": ""})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "results": [
                {"id": "1", "properties": {"fte_s_": "1.5"}},
                {"id": "2", "properties": {"fte_s_": "0.5"}}
            ],
            "paging": {"next": {"after": "2"}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(search_path))
        .and(header("authorization", "Bearer pat-123"))
        .and(body_partial_json(json!({"after": "2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "results": [
                {"id": "3", "properties": {"fte_s_": "2.0"}}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let creds = Credentials::new().with("hubspot_token", "pat-123");
    let url = format!("{}{}", mock_server.uri(), search_path);
    let validator = PostAllowList::new([url.clone()]);

    let header_template = "accept: application/json; authorization: Bearer {{ creds.hubspot_token }}";
    let payload_template = r#"{"properties": ["fte_s_"], "after": "{{ cursor }}"}"#;

    let build_spec = {
        let url = url.clone();
        let creds = creds.clone();
        let validator = validator.clone();
        move |cursor: &str| -> Result<RequestSpec> {
            let mut ctx = TemplateContext::with_creds(creds.to_context());
            ctx.set_cursor(cursor);
            RequestSpec::builder(&url)
                .method(Method::POST)
                .headers_str(&template::render(header_template, &ctx)?)
                .payload(template::render(payload_template, &ctx)?)
                .build_validated(&validator)
        }
    };

    let config = PaginateConfig::new("paging.next.after")
        .with_record_path("results[*].properties")
        .with_max_pages(10);
    let collector = PageCollector::new(quiet_transport(), config);

    let records = collector
        .collect(build_spec("").unwrap(), build_spec)
        .await
        .unwrap();

    assert_eq!(
        records,
        vec![
            json!({"fte_s_": "1.5"}),
            json!({"fte_s_": "0.5"}),
            json!({"fte_s_": "2.0"})
        ]
    );
}

#[tokio::test]
async fn test_post_policy_blocks_wrong_target_before_any_fetch() {
    let validator = PostAllowList::new(["https://api.hubapi.com/crm/v3/objects/deals/search"]);

    let result = RequestSpec::builder("https://api.hubapi.com/other/endpoint")
        .method(Method::POST)
        .payload("{}")
        .build_validated(&validator);

    assert!(matches!(
        result,
        Err(restsource::Error::PolicyViolation { .. })
    ));
}

// ============================================================================
// Estimation over a Collected Source
// ============================================================================

#[tokio::test]
async fn test_estimate_feeds_planner_after_fetch() {
    let mock_server = MockServer::start().await;

    let records: Vec<_> = (0..100).map(|i| json!({"id": i})).collect();
    Mock::given(method("GET"))
        .and(path("/api/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .expect(1)
        .mount(&mock_server)
        .await;

    let spec = RequestSpec::builder(format!("{}/api/all", mock_server.uri())).build();
    let source = CachedSource::new(quiet_transport(), spec);
    let estimator = CardinalityEstimator::new();

    // The estimate and the records come from the same single fetch
    let estimate = estimator.estimate(&source).await;
    let records = source.get().await;

    assert_eq!(records.len(), 100);
    assert_eq!(estimate.lower_bound, 95);
    assert_eq!(estimate.upper_bound, 105);

    let bytes = estimator.bytes_per_record(&source).await.unwrap();
    assert!(bytes > 0.0);
}

// ============================================================================
// Latency Capture for the External Logger
// ============================================================================

#[tokio::test]
async fn test_fetch_latency_lands_in_perf_log() {
    use restsource::perf::{PerfLog, PerfRecord};

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/timed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(20))
                .set_body_json(json!([{"id": 1}])),
        )
        .mount(&mock_server)
        .await;

    let spec = RequestSpec::builder(format!("{}/api/timed", mock_server.uri())).build();
    let url = spec.url().to_string();
    let source = CachedSource::new(quiet_transport(), spec);
    source.get().await;

    let latency = source.latency().expect("successful fetch captures latency");
    assert!(latency >= Duration::from_millis(20));

    let dir = tempfile::tempdir().unwrap();
    let log = PerfLog::new(dir.path().join("api-latency.json"));
    log.append(&PerfRecord::latency("API Latency", latency, url))
        .unwrap();

    let entries = log.read_all().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].step, "API Latency");
    assert!(entries[0].latency_seconds.unwrap() >= 0.02);
}
