//! Tests for the page collector

use super::*;
use crate::template::{self, TemplateContext};
use crate::transport::TransportConfig;
use crate::types::Method;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quiet_transport() -> Transport {
    Transport::with_config(TransportConfig::builder().no_rate_limit().build())
}

#[test]
fn test_paginate_config_defaults_unbounded() {
    let config = PaginateConfig::new("paging.next.after");
    assert!(config.record_path.is_none());
    assert!(config.max_pages.is_none());
    assert!(config.max_elapsed.is_none());
}

#[tokio::test]
async fn test_collect_follows_cursor_until_exhaustion() {
    let mock_server = MockServer::start().await;

    // Page 1 carries a cursor, page 2 does not
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({"after": ""})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "1", "properties": {"name": "a"}},
                {"id": "2", "properties": {"name": "b"}}
            ],
            "paging": {"next": {"after": "X"}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({"after": "X"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "3", "properties": {"name": "c"}}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/search", mock_server.uri());
    let page_spec = |after: &str| {
        RequestSpec::builder(&url)
            .method(Method::POST)
            .header("content-type", "application/json")
            .payload(format!(r#"{{"limit": 2, "after": "{after}"}}"#))
            .build()
    };

    let config = PaginateConfig::new("paging.next.after").with_record_path("results[*].properties");
    let collector = PageCollector::new(quiet_transport(), config);

    let records = collector
        .collect(page_spec(""), |cursor| Ok(page_spec(cursor)))
        .await
        .unwrap();

    // Both pages' qualifying records, in arrival order
    assert_eq!(
        records,
        vec![json!({"name": "a"}), json!({"name": "b"}), json!({"name": "c"})]
    );
}

#[tokio::test]
async fn test_collect_single_page_without_cursor() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = PaginateConfig::new("paging.next.after").with_record_path("results");
    let collector = PageCollector::new(quiet_transport(), config);

    let spec = RequestSpec::builder(format!("{}/items", mock_server.uri())).build();
    let records = collector
        .collect(spec, |_| panic!("no second page expected"))
        .await
        .unwrap();

    assert_eq!(records, vec![json!({"id": 1})]);
}

#[tokio::test]
async fn test_collect_empty_cursor_terminates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1}],
            "paging": {"next": {"after": ""}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = PaginateConfig::new("paging.next.after").with_record_path("results");
    let collector = PageCollector::new(quiet_transport(), config);

    let spec = RequestSpec::builder(format!("{}/items", mock_server.uri())).build();
    let records = collector
        .collect(spec, |_| panic!("empty cursor must terminate"))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_collect_whole_pages_without_record_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1}, {"id": 2}
        ])))
        .mount(&mock_server)
        .await;

    let collector = PageCollector::new(quiet_transport(), PaginateConfig::new("next"));
    let spec = RequestSpec::builder(format!("{}/flat", mock_server.uri())).build();

    let records = collector.collect(spec, |_| unreachable!()).await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_collect_failed_page_degrades_and_terminates() {
    // Unreachable host: the page degrades to empty (fail soft), and an
    // empty page has no cursor, so pagination ends with zero records.
    let transport = Transport::with_config(
        TransportConfig::builder()
            .connect_timeout(Duration::from_millis(500))
            .timeout(Duration::from_secs(1))
            .no_rate_limit()
            .build(),
    );
    let collector = PageCollector::new(transport, PaginateConfig::new("paging.next.after"));

    let spec = RequestSpec::builder("http://127.0.0.1:1/gone").build();
    let records = collector.collect(spec, |_| unreachable!()).await.unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_collect_page_ceiling_is_anomaly() {
    let mock_server = MockServer::start().await;

    // Every page returns a fresh cursor: a runaway chain
    Mock::given(method("GET"))
        .and(path("/endless"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1}],
            "paging": {"next": {"after": "again"}}
        })))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = PaginateConfig::new("paging.next.after")
        .with_record_path("results")
        .with_max_pages(3);
    let collector = PageCollector::new(quiet_transport(), config);

    let url = format!("{}/endless", mock_server.uri());
    let err = collector
        .collect(RequestSpec::builder(&url).build(), |_| {
            Ok(RequestSpec::builder(&url).build())
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::PageLimitExceeded { max_pages: 3 }));
}

#[tokio::test]
async fn test_collect_time_ceiling_is_anomaly() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slowly-endless"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(50))
                .set_body_json(json!({
                    "paging": {"next": {"after": "more"}}
                })),
        )
        .mount(&mock_server)
        .await;

    let config = PaginateConfig::new("paging.next.after").with_max_elapsed(Duration::from_millis(25));
    let collector = PageCollector::new(quiet_transport(), config);

    let url = format!("{}/slowly-endless", mock_server.uri());
    let err = collector
        .collect(RequestSpec::builder(&url).build(), |_| {
            Ok(RequestSpec::builder(&url).build())
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TimeLimitExceeded { .. }));
}

#[tokio::test]
async fn test_collect_next_spec_builder_error_propagates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paging": {"next": {"after": "tok"}}
        })))
        .mount(&mock_server)
        .await;

    let collector = PageCollector::new(quiet_transport(), PaginateConfig::new("paging.next.after"));
    let spec = RequestSpec::builder(format!("{}/one", mock_server.uri())).build();

    let err = collector
        .collect(spec, |_| Err(Error::template("bad payload template")))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Template { .. }));
}

#[tokio::test]
async fn test_collect_with_payload_template() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tpl"))
        .and(body_partial_json(json!({"after": "T1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 2}]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/tpl"))
        .and(body_partial_json(json!({"after": "start"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1}],
            "paging": {"next": {"after": "T1"}}
        })))
        .mount(&mock_server)
        .await;

    let url = format!("{}/tpl", mock_server.uri());
    let payload_template = r#"{"filters": [], "after": "{{ cursor }}"}"#;

    let build_spec = |cursor: &str| -> Result<RequestSpec> {
        let mut ctx = TemplateContext::new();
        ctx.set_cursor(cursor);
        Ok(RequestSpec::builder(&url)
            .method(Method::POST)
            .payload(template::render(payload_template, &ctx)?)
            .build())
    };

    let config = PaginateConfig::new("paging.next.after").with_record_path("results");
    let collector = PageCollector::new(quiet_transport(), config);

    let records = collector
        .collect(build_spec("start").unwrap(), build_spec)
        .await
        .unwrap();

    assert_eq!(records, vec![json!({"id": 1}), json!({"id": 2})]);
}
