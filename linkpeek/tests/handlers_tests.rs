use linkpeek::handlers::*;
use linkpeek_core::report::ReportFormat;
use linkpeek_core::{Link, Profile};
use serde_json::{Value, json};
use std::time::Duration;
use tempfile::NamedTempFile;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn profile_page(page_props: Value) -> String {
    format!(
        r#"<html><body><script id="__NEXT_DATA__" type="application/json">{}</script></body></html>"#,
        json!({"props": {"pageProps": page_props}})
    )
}

fn options_for(server: &MockServer, target: &str, output: &NamedTempFile) -> LookupOptions {
    let mut options = LookupOptions::new(target);
    options.base_url = Some(server.uri());
    options.quiet = true;
    options.output = Some(output.path().display().to_string());
    options
}

// ============================================================================
// Target classification
// ============================================================================

#[test]
fn test_classify_username() {
    assert_eq!(
        classify_target("alice", "linktr.ee"),
        Target::Username("alice".to_string())
    );
    assert_eq!(
        classify_target("  alice \n", "linktr.ee"),
        Target::Username("alice".to_string())
    );
}

#[test]
fn test_classify_username_starting_with_http() {
    assert_eq!(
        classify_target("httpster", "linktr.ee"),
        Target::Username("httpster".to_string())
    );
    assert_eq!(
        classify_target("https_cats", "linktr.ee"),
        Target::Username("https_cats".to_string())
    );
}

#[test]
fn test_classify_url() {
    let target = classify_target("https://linktr.ee/alice", "linktr.ee");
    assert_eq!(target.url(), Some("https://linktr.ee/alice"));
    assert_eq!(target.username(), None);

    assert_eq!(
        classify_target("linktr.ee/alice", "linktr.ee"),
        Target::Url("https://linktr.ee/alice".to_string())
    );
    assert_eq!(
        classify_target("http://127.0.0.1:8080/bob", "linktr.ee"),
        Target::Url("http://127.0.0.1:8080/bob".to_string())
    );
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_scraper_config_from_options() {
    let mut options = LookupOptions::new("alice");
    options.timeout = Some(Duration::from_secs(3));
    options.proxy = Some("socks5://127.0.0.1:9050".to_string());
    options.base_url = Some("http://mirror.test/".to_string());

    let config = options.scraper_config();
    assert_eq!(config.base_url, "http://mirror.test");
    assert_eq!(config.fetch.request_timeout, Duration::from_secs(3));
    assert_eq!(config.fetch.proxy.as_deref(), Some("socks5://127.0.0.1:9050"));
    assert_eq!(config.host().as_deref(), Some("mirror.test"));
}

#[test]
fn test_default_scraper_config() {
    let config = LookupOptions::new("alice").scraper_config();
    assert_eq!(config.base_url, "https://linktr.ee");
    assert!(config.fetch.proxy.is_none());
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn test_write_output() -> Result<(), Box<dyn std::error::Error>> {
    let temp_file = NamedTempFile::new()?;
    let path = temp_file.path().display().to_string();

    let saved = write_output("username: alice\n", &path)?;
    assert_eq!(saved, temp_file.path());
    assert_eq!(std::fs::read_to_string(temp_file.path())?, "username: alice\n");

    Ok(())
}

#[test]
fn test_write_output_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope").join("out.txt");
    let err = write_output("x", &path.display().to_string()).unwrap_err();
    assert!(err.to_string().contains("Failed to write report"));
}

#[test]
fn test_render_profile_contains_values() {
    let mut profile = Profile::new("alice", "https://linktr.ee/alice");
    profile.account_id = 1;
    profile.links = vec![Link::new("https://a.example"), Link::new("https://hidden.example")];

    let rendered = render_profile(&profile);
    assert!(rendered.contains("alice"));
    assert!(rendered.contains("Unknown"));
    assert!(rendered.contains("Links (2)"));
    let a = rendered.find("https://a.example").unwrap();
    let hidden = rendered.find("https://hidden.example").unwrap();
    assert!(a < hidden);
}

// ============================================================================
// Full lookups
// ============================================================================

#[tokio::test]
async fn test_lookup_writes_json_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_string(profile_page(json!({
            "account": {"id": 1, "username": "alice", "isActive": true},
            "links": [{"id": 10, "url": "https://a.example"}]
        }))))
        .mount(&server)
        .await;

    let output = NamedTempFile::new().unwrap();
    let mut options = options_for(&server, "alice", &output);
    options.format = ReportFormat::Json;

    handle_lookup(&options).await.unwrap();

    let report: Value =
        serde_json::from_str(&std::fs::read_to_string(output.path()).unwrap()).unwrap();
    assert_eq!(report["username"], json!("alice"));
    assert_eq!(report["tier"], json!("Unknown"));
    assert_eq!(report["links"], json!([{"url": "https://a.example"}]));
}

#[tokio::test]
async fn test_lookup_writes_plain_text_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bob"))
        .respond_with(ResponseTemplate::new(200).set_body_string(profile_page(json!({
            "account": {"id": 2, "username": "bob"}
        }))))
        .mount(&server)
        .await;

    let output = NamedTempFile::new().unwrap();
    handle_lookup(&options_for(&server, "bob", &output))
        .await
        .unwrap();

    let report = std::fs::read_to_string(output.path()).unwrap();
    assert!(report.starts_with("username:     bob\n"));
    assert!(!report.contains('\u{1b}'));
}

#[tokio::test]
async fn test_lookup_raw_dump() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/carol"))
        .respond_with(ResponseTemplate::new(200).set_body_string(profile_page(json!({
            "account": {"username": "carol"},
            "extra": [1, 2, 3]
        }))))
        .mount(&server)
        .await;

    let output = NamedTempFile::new().unwrap();
    let mut options = options_for(&server, "carol", &output);
    options.raw = true;
    handle_lookup(&options).await.unwrap();

    let raw: Value =
        serde_json::from_str(&std::fs::read_to_string(output.path()).unwrap()).unwrap();
    assert_eq!(raw["extra"], json!([1, 2, 3]));
}

#[tokio::test]
async fn test_lookup_fails_without_account() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_string(profile_page(json!({}))))
        .mount(&server)
        .await;

    let output = NamedTempFile::new().unwrap();
    let err = handle_lookup(&options_for(&server, "ghost", &output))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid account structure"));
    assert!(std::fs::read_to_string(output.path()).unwrap().is_empty());
}
