//! Session construction and request headers.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use reqwest::{Method, StatusCode};
use sheets_binding::{Credentials, SheetsConfig, SheetsError, SheetsService};
use sheets_feed::{FeedError, ServiceAccount};

use crate::*;

const TEST_KEY: &str = include_str!("../../../sheets-feed/testdata/test_rsa_key.pem");

fn service_account_config() -> SheetsConfig {
    let json = serde_json::json!({
        "type": "service_account",
        "private_key_id": "key-1",
        "private_key": TEST_KEY,
        "client_email": "robot@sheets-test.iam.gserviceaccount.com",
        "token_uri": "https://oauth.test/token",
    });
    let account = ServiceAccount::from_json(&json.to_string()).unwrap();
    let mut config = SheetsConfig::new(Credentials::ServiceAccount(account));
    config.base_url = BASE.to_string();
    config
}

#[tokio::test]
async fn test_requests_carry_token_and_version() {
    let fake = FakeService::new();
    fake.ok(Method::GET, &spreadsheets_path(), feed_xml(&[]));
    let service = service(&fake).await;

    service.spreadsheets().await.unwrap();
    let seen = fake.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].authorization.as_deref(),
        Some(format!("Bearer {TOKEN}").as_str())
    );
    assert_eq!(seen[0].gdata_version.as_deref(), Some("3.0"));
}

#[tokio::test]
async fn test_connect_with_service_account() {
    let fake = FakeService::new();
    fake.ok(
        Method::POST,
        "/token",
        r#"{"access_token":"ya29.fresh","expires_in":3599,"token_type":"Bearer"}"#,
    );
    fake.ok(Method::GET, &spreadsheets_path(), feed_xml(&[]));

    let service = SheetsService::connect_with(fake.clone(), service_account_config())
        .await
        .unwrap();
    service.spreadsheets().await.unwrap();

    let seen = fake.requests();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].path, "/token");
    let form = seen[0].body.clone().unwrap_or_default();
    assert!(form.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"));
    assert!(form.contains("assertion="));
    assert_eq!(seen[1].authorization.as_deref(), Some("Bearer ya29.fresh"));
}

#[tokio::test]
async fn test_connect_propagates_token_failure() {
    let fake = FakeService::new();
    fake.route(
        Method::POST,
        "/token",
        StatusCode::BAD_REQUEST,
        r#"{"error":"invalid_grant"}"#,
    );

    let err = SheetsService::connect_with(fake.clone(), service_account_config())
        .await
        .unwrap_err();
    match err {
        SheetsError::Feed(FeedError::Auth(msg)) => assert!(msg.contains("invalid_grant")),
        other => panic!("expected auth failure, got {other:?}"),
    }
    assert_eq!(fake.requests().len(), 1);
}

#[tokio::test]
async fn test_connect_rejects_invalid_config() {
    let fake = FakeService::new();
    let mut config = config();
    config.batch_size = 0;

    let err = SheetsService::connect_with(fake.clone(), config)
        .await
        .unwrap_err();
    assert!(matches!(err, SheetsError::Config(_)));
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn test_connect_from_settings() {
    let fake = FakeService::new();
    fake.ok(
        Method::GET,
        &format!("{}/key1", spreadsheets_path()),
        spreadsheet_xml("key1", "Budget"),
    );

    let mut settings = HashMap::new();
    settings.insert("access-token".to_string(), "from-settings".to_string());
    settings.insert("base-url".to_string(), format!("{BASE}/"));
    let config = SheetsConfig::from_map(&settings).unwrap();
    let service = SheetsService::connect_with(fake.clone(), config)
        .await
        .unwrap();

    let doc = service.spreadsheet_by_key("key1").await.unwrap();
    assert_eq!(doc.title, "Budget");
    assert_eq!(
        fake.requests()[0].authorization.as_deref(),
        Some("Bearer from-settings")
    );
}
