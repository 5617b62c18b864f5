//! BigQuery Client Construction
//!
//! 解決済みの設定からBigQueryクライアントを作成する

use async_trait::async_trait;
use google_cloud_bigquery::client::google_cloud_auth::credentials::CredentialsFile;
use google_cloud_bigquery::client::google_cloud_auth::project::Config;
use google_cloud_bigquery::client::google_cloud_auth::token::DefaultTokenSourceProvider;
use google_cloud_bigquery::client::{Client, ClientConfig};
use log::debug;

use crate::domain::entities::client_settings::ClientSettings;
use crate::domain::entities::credential_key::CredentialKey;
use crate::domain::error::ClientError;
use crate::domain::repositories::warehouse_connector::WarehouseConnector;

/// BigQuery Storage API（gRPC）のトークンオーディエンス
const STORAGE_AUDIENCE: &str = "https://bigquerystorage.googleapis.com/";

/// BigQueryクライアントと、その作成に使った設定
pub struct BigQueryClientHandle {
    client: Client,
    settings: ClientSettings,
}

impl BigQueryClientHandle {
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn project_id(&self) -> Option<&str> {
        self.settings.project_id.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.settings.location.as_deref()
    }

    pub fn user_agent(&self) -> &str {
        &self.settings.user_agent
    }

    pub fn into_parts(self) -> (Client, ClientSettings) {
        (self.client, self.settings)
    }
}

impl std::fmt::Debug for BigQueryClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigQueryClientHandle")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// `google-cloud-bigquery` を使う接続
#[derive(Debug, Clone, Default)]
pub struct BigQueryConnector;

impl BigQueryConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WarehouseConnector for BigQueryConnector {
    type Handle = BigQueryClientHandle;

    async fn connect(&self, settings: ClientSettings) -> Result<BigQueryClientHandle, ClientError> {
        let scopes: Vec<&str> = settings
            .credentials
            .scopes()
            .iter()
            .map(String::as_str)
            .collect();
        let subject = settings.credentials.subject();

        let http_config = auth_config(&scopes, subject, None);
        let grpc_config = auth_config(&scopes, subject, Some(STORAGE_AUDIENCE));

        let (http_provider, grpc_provider) = match settings.credentials.key() {
            Some(key) => {
                debug!("Creating token sources from {}", settings.credentials.source());
                let http = DefaultTokenSourceProvider::new_with_credentials(
                    http_config,
                    credentials_file(key)?,
                )
                .await
                .map_err(|e| ClientError::Connect(e.to_string()))?;
                let grpc = DefaultTokenSourceProvider::new_with_credentials(
                    grpc_config,
                    credentials_file(key)?,
                )
                .await
                .map_err(|e| ClientError::Connect(e.to_string()))?;
                (http, grpc)
            }
            None => {
                debug!("Creating token sources from the metadata server");
                let http = DefaultTokenSourceProvider::new(http_config)
                    .await
                    .map_err(|e| ClientError::Connect(e.to_string()))?;
                let grpc = DefaultTokenSourceProvider::new(grpc_config)
                    .await
                    .map_err(|e| ClientError::Connect(e.to_string()))?;
                (http, grpc)
            }
        };

        let config = ClientConfig::new(Box::new(http_provider), Box::new(grpc_provider));
        let client = Client::new(config)
            .await
            .map_err(|e| ClientError::Connect(e.to_string()))?;

        Ok(BigQueryClientHandle { client, settings })
    }
}

fn auth_config<'a>(
    scopes: &'a [&'a str],
    subject: Option<&'a str>,
    audience: Option<&'a str>,
) -> Config<'a> {
    let mut config = Config::default().with_scopes(scopes);
    if let Some(subject) = subject {
        config = config.with_sub(subject);
    }
    if let Some(audience) = audience {
        config = config.with_audience(audience);
    }
    config
}

/// キーを認証ライブラリの形式に変換する
fn credentials_file(key: &CredentialKey) -> Result<Box<CredentialsFile>, ClientError> {
    let value = key.to_value()?;
    let file: CredentialsFile = serde_json::from_value(value)
        .map_err(|e| ClientError::Credential(e.into()))?;
    Ok(Box::new(file))
}
