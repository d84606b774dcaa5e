//! Remote version manifests served over HTTP.

use std::time::Duration;

use simplestreams_builder::catalog::{FetchError, ManifestFetcher, SkipReason};
use simplestreams_builder::{FetchSettings, ProductAggregator, TreeConfig};
use ssb_streams::{Document, ProductManifest, ProductVersion, ProductVersionItem};

fn manifest_json(name: &str) -> String {
    let mut manifest = ProductManifest::new(name);
    manifest.support_eol = Some("1700000000".to_string());
    let mut version = ProductVersion::new();
    version.insert_item(
        "lxd.tar.xz",
        ProductVersionItem::new("lxd.tar.xz", "alpine/20230101_10:00/lxd.tar.xz", 42),
    );
    manifest.versions.insert("20230101_10:00".to_string(), version);
    manifest.to_json().unwrap()
}

fn settings(apikey: Option<&str>) -> FetchSettings {
    FetchSettings {
        timeout: Some(Duration::from_secs(5)),
        apikey: apikey.map(str::to_string),
        ..Default::default()
    }
}

fn tree(server_url: &str) -> TreeConfig {
    TreeConfig::parse_yaml(&format!(
        r#"
products:
  - name: alpine
    arch: amd64
    os: Alpine
    release: "3.18"
    prefix_path: {url}/images/
  - name: debian
    arch: amd64
    os: Debian
    release: bookworm
    prefix_path: {url}/images
"#,
        url = server_url
    ))
    .unwrap()
}

#[test]
fn test_fetch_manifest() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/images/alpine/ssb.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(manifest_json("alpine"))
        .create();

    let fetcher = ManifestFetcher::new(&settings(None)).unwrap();
    let manifest = fetcher
        .fetch(&format!("{}/images/alpine/ssb.json", server.url()))
        .unwrap();

    mock.assert();
    assert_eq!(manifest.name, "alpine");
    assert_eq!(manifest.support_eol_epoch(), Some(1_700_000_000));
    assert_eq!(manifest.versions["20230101_10:00"].items["lxd.tar.xz"].size, 42);
}

#[test]
fn test_zero_timeout_still_fetches() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/alpine/ssb.json")
        .with_status(200)
        .with_body(manifest_json("alpine"))
        .create();

    let settings = FetchSettings::from_lookup(None, |key| {
        (key == "SSBUILDER_HTTP_TIMEOUT").then(|| "0".to_string())
    });
    assert_eq!(settings.timeout, None);

    let manifest = ManifestFetcher::new(&settings)
        .unwrap()
        .fetch(&format!("{}/alpine/ssb.json", server.url()))
        .unwrap();
    mock.assert();
    assert_eq!(manifest.name, "alpine");
}

#[test]
fn test_fetch_sends_credential() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/alpine/ssb.json")
        .match_header("authorization", "token s3cret")
        .with_status(200)
        .with_body(manifest_json("alpine"))
        .create();

    let fetcher = ManifestFetcher::new(&settings(Some("s3cret"))).unwrap();
    fetcher
        .fetch(&format!("{}/alpine/ssb.json", server.url()))
        .unwrap();
    mock.assert();
}

#[test]
fn test_fetch_bearer_scheme() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/alpine/ssb.json")
        .match_header("authorization", "Bearer s3cret")
        .with_status(200)
        .with_body(manifest_json("alpine"))
        .create();

    let mut settings = settings(Some("s3cret"));
    settings.auth_scheme = "Bearer".to_string();
    ManifestFetcher::new(&settings)
        .unwrap()
        .fetch(&format!("{}/alpine/ssb.json", server.url()))
        .unwrap();
    mock.assert();
}

#[test]
fn test_fetch_non_200() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/alpine/ssb.json")
        .with_status(404)
        .create();

    let err = ManifestFetcher::new(&settings(None))
        .unwrap()
        .fetch(&format!("{}/alpine/ssb.json", server.url()))
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 404));
}

#[test]
fn test_fetch_malformed_body() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/alpine/ssb.json")
        .with_status(200)
        .with_body("<html>not a manifest</html>")
        .create();

    let err = ManifestFetcher::new(&settings(None))
        .unwrap()
        .fetch(&format!("{}/alpine/ssb.json", server.url()))
        .unwrap_err();
    assert!(matches!(err, FetchError::Parse { .. }));
}

#[test]
fn test_aggregate_remote_products() {
    let mut server = mockito::Server::new();
    let _alpine = server
        .mock("GET", "/images/alpine/ssb.json")
        .with_status(200)
        .with_body(manifest_json("alpine"))
        .create();
    let _debian = server
        .mock("GET", "/images/debian/ssb.json")
        .with_status(500)
        .create();

    let config = tree(&server.url());
    // Remote products need no source directory
    let aggregation = ProductAggregator::new(&config, None, &settings(None))
        .unwrap()
        .aggregate();

    assert_eq!(aggregation.products.product_names(), vec!["alpine"]);
    let alpine = aggregation.products.get("alpine").unwrap();
    assert_eq!(alpine.support_eol.as_deref(), Some("1700000000"));

    assert_eq!(aggregation.skipped.len(), 1);
    let (name, reason) = &aggregation.skipped[0];
    assert_eq!(name, "debian");
    assert!(matches!(
        reason,
        SkipReason::Fetch(FetchError::Status { .. })
    ));
}
