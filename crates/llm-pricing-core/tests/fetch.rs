use std::time::{Duration, SystemTime};

use llm_pricing_core::cache::{FsCache, MemoryCache, SnapshotCache, SNAPSHOT_TTL};
use llm_pricing_core::config::{FetchConfig, PRICING_SNAPSHOT, ROUTING_SNAPSHOT};
use llm_pricing_core::fetch::Fetcher;
use llm_pricing_core::source::{KeyCatalog, PricingSource};
use llm_pricing_core::Error;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> FetchConfig {
    FetchConfig {
        pricing_url: format!("{}/prices.json", server.uri()),
        routing_url: format!("{}/api/v1/models", server.uri()),
        timeout: Duration::from_secs(5),
        ..FetchConfig::default()
    }
}

fn backdate(path: &std::path::Path, by: Duration) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - by).unwrap();
}

async fn mount_catalogs(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/prices.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gpt-4o": {"input_cost_per_token": 2.5e-6, "output_cost_per_token": 1e-5}
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "openai/gpt-4o"}]
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetches_both_catalogs_and_writes_snapshots() {
    let server = MockServer::start().await;
    mount_catalogs(&server, 1).await;

    let fetcher = Fetcher::new(MemoryCache::new(), config(&server)).unwrap();
    let catalogs = fetcher.fetch_catalogs().await.expect("fetch should succeed");

    assert_eq!(catalogs.pricing.len(), 1);
    assert_eq!(catalogs.routing.len(), 1);
    assert!(fetcher.cache().contains(PRICING_SNAPSHOT));
    assert!(fetcher.cache().contains(ROUTING_SNAPSHOT));
}

#[tokio::test]
async fn fresh_snapshots_skip_the_network() {
    let server = MockServer::start().await;
    mount_catalogs(&server, 0).await;

    let cache = MemoryCache::new()
        .with_entry(PRICING_SNAPSHOT, r#"{"a": {}, "b": {}}"#)
        .with_entry(ROUTING_SNAPSHOT, r#"{"data": []}"#);
    let fetcher = Fetcher::new(cache, config(&server)).unwrap();
    let catalogs = fetcher.fetch_catalogs().await.unwrap();

    assert_eq!(catalogs.pricing.len(), 2);
    assert!(catalogs.routing.is_empty());
}

#[tokio::test]
async fn snapshot_age_decides_reuse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"fresh": {}}"#))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = FsCache::new(dir.path(), SNAPSHOT_TTL);
    let url = format!("{}/prices.json", server.uri());

    cache.put("recent.json", br#"{"cached": {}}"#).unwrap();
    backdate(&cache.path("recent.json"), Duration::from_secs(59 * 60));
    cache.put("old.json", br#"{"cached": {}}"#).unwrap();
    backdate(&cache.path("old.json"), Duration::from_secs(61 * 60));

    let fetcher = Fetcher::new(cache, config(&server)).unwrap();

    let recent = fetcher.fetch(&url, "recent.json", PricingSource::from_slice).await.unwrap();
    assert_eq!(recent.ids().collect::<Vec<_>>(), ["cached"]);

    let old = fetcher.fetch(&url, "old.json", PricingSource::from_slice).await.unwrap();
    assert_eq!(old.ids().collect::<Vec<_>>(), ["fresh"]);
    let on_disk = std::fs::read_to_string(fetcher.cache().path("old.json")).unwrap();
    assert_eq!(on_disk, r#"{"fresh": {}}"#);
}

#[tokio::test]
async fn unreadable_snapshot_is_refetched() {
    let server = MockServer::start().await;
    mount_catalogs(&server, 1).await;

    let cache = MemoryCache::new()
        .with_entry(PRICING_SNAPSHOT, "not json")
        .with_entry(ROUTING_SNAPSHOT, r#"{"unexpected": true}"#);
    let fetcher = Fetcher::new(cache, config(&server)).unwrap();
    let catalogs = fetcher.fetch_catalogs().await.unwrap();
    assert_eq!(catalogs.pricing.len(), 1);
}

#[tokio::test]
async fn error_status_is_fatal_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let cfg = config(&server);
    let fetcher = Fetcher::new(MemoryCache::new(), cfg.clone()).unwrap();
    let err = fetcher.fetch_catalogs().await.unwrap_err();

    match err {
        Error::Fetch { status, url } => {
            assert_eq!(status, 503);
            assert_eq!(url, cfg.pricing_url);
        }
        other => panic!("expected Fetch error, got {other:?}"),
    }
    assert!(!fetcher.cache().contains(PRICING_SNAPSHOT));
}

#[tokio::test]
async fn malformed_body_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let cfg = config(&server);
    let fetcher = Fetcher::new(MemoryCache::new(), cfg.clone()).unwrap();
    let result = fetcher
        .fetch(&cfg.pricing_url, PRICING_SNAPSHOT, PricingSource::from_slice)
        .await;
    assert!(matches!(result, Err(Error::Json(_))));
    assert!(!fetcher.cache().contains(PRICING_SNAPSHOT));
}
