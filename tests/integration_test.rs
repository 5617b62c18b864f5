//! Integration tests for bqconnect
//!
//! 実際の認証情報リポジトリを使ったクライアント設定の解決テスト。
//! ネットワークに接続するテストは含まない。

use async_trait::async_trait;
use base64::prelude::*;
use bqconnect::adapter::auth::GcpCredentialRepository;
use bqconnect::adapter::config::Config;
use bqconnect::application::dto::connection_options::ConnectionOptions;
use bqconnect::application::use_cases::build_client::BuildClientUseCase;
use bqconnect::domain::entities::client_settings::ClientSettings;
use bqconnect::domain::entities::credentials::{CredentialSource, SCOPES};
use bqconnect::domain::error::{ClientError, CredentialError};
use bqconnect::domain::repositories::warehouse_connector::WarehouseConnector;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Get the path to test fixtures
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn key_path() -> PathBuf {
    fixtures_path().join("service_account.json")
}

/// 接続せずに設定を返す
struct SettingsConnector;

#[async_trait]
impl WarehouseConnector for SettingsConnector {
    type Handle = ClientSettings;

    async fn connect(&self, settings: ClientSettings) -> Result<ClientSettings, ClientError> {
        Ok(settings)
    }
}

fn use_case() -> BuildClientUseCase<GcpCredentialRepository, SettingsConnector> {
    BuildClientUseCase::new(
        Arc::new(GcpCredentialRepository::new()),
        Arc::new(SettingsConnector),
    )
}

#[test]
fn test_fixture_file_valid_key() {
    let content = fs::read_to_string(key_path()).expect("Failed to read service_account.json");
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();

    assert_eq!(json["type"], "service_account");
    assert!(json.get("client_email").is_some());
}

#[tokio::test]
async fn test_key_file_default_project() {
    let options = ConnectionOptions::new().with_credentials_path(key_path());

    let settings = use_case().execute(&options).await.unwrap();

    assert_eq!(settings.project_id.as_deref(), Some("fixture-project"));
    assert_eq!(settings.credentials.source(), &CredentialSource::File(key_path()));
    assert_eq!(settings.credentials.scopes(), &SCOPES);
    assert_eq!(
        settings.credentials.client_email(),
        Some("loader@fixture-project.iam.gserviceaccount.com")
    );
}

#[tokio::test]
async fn test_key_file_with_explicit_project_and_impersonation() {
    let options = ConnectionOptions::new()
        .with_credentials_path(key_path())
        .with_project_id("billing-project")
        .with_email("analyst@example.com")
        .with_allowed_impersonation_domain("example.com");

    let settings = use_case().execute(&options).await.unwrap();

    assert_eq!(settings.project_id.as_deref(), Some("billing-project"));
    assert_eq!(settings.credentials.subject(), Some("analyst@example.com"));
}

#[tokio::test]
async fn test_base64_matches_inline_key() {
    let content = fs::read_to_string(key_path()).unwrap();
    let info: serde_json::Value = serde_json::from_str(&content).unwrap();

    let from_info = use_case()
        .resolve(&ConnectionOptions::new().with_credentials_info(info))
        .await
        .unwrap();
    let from_base64 = use_case()
        .resolve(
            &ConnectionOptions::new()
                .with_credentials_base64(format!("  {}\n", BASE64_STANDARD.encode(&content))),
        )
        .await
        .unwrap();

    assert_eq!(from_info, from_base64);
    assert_eq!(from_base64.credentials.source(), &CredentialSource::Info);
}

#[tokio::test]
async fn test_missing_key_file() {
    let options = ConnectionOptions::new().with_credentials_path(fixtures_path().join("missing.json"));

    let result = use_case().execute(&options).await;

    assert!(matches!(
        result,
        Err(ClientError::Credential(CredentialError::Io { .. }))
    ));
}

#[tokio::test]
async fn test_config_file_to_settings() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    fs::write(
        &config_path,
        serde_json::json!({
            "credentials_path": key_path(),
            "location": "asia-northeast1",
            "default_query_job_config": { "maximum_bytes_billed": 1000000000 }
        })
        .to_string(),
    )
    .unwrap();

    let options = Config::load(config_path.to_str().unwrap())
        .unwrap()
        .into_options();
    let settings = use_case().resolve(&options).await.unwrap();

    assert_eq!(settings.project_id.as_deref(), Some("fixture-project"));
    assert_eq!(settings.location.as_deref(), Some("asia-northeast1"));
    assert_eq!(
        settings.default_query_config,
        Some(serde_json::json!({ "maximum_bytes_billed": 1000000000 }))
    );
}
