//! GCP Authentication
//!
//! Google Cloud Platform認証情報の読み込みと自動検出

use async_trait::async_trait;
use google_cloud_bigquery::client::google_cloud_auth::credentials::CredentialsFile;
use google_cloud_bigquery::client::google_cloud_auth::project::{self, Project};
use log::debug;
use std::path::Path;

use crate::domain::entities::credential_key::CredentialKey;
use crate::domain::error::CredentialError;
use crate::domain::repositories::credential_repository::{AmbientCredentials, CredentialRepository};

/// Expands tilde in path and returns the full path
pub fn expand_key_path(key_path: &str) -> String {
    shellexpand::tilde(key_path).to_string()
}

/// GCP認証情報リポジトリ
///
/// 自動検出は `GOOGLE_APPLICATION_CREDENTIALS_JSON`、`GOOGLE_APPLICATION_CREDENTIALS`、
/// gcloudの既定ファイル、GCEメタデータサーバーの順に行う。
#[derive(Debug, Clone, Default)]
pub struct GcpCredentialRepository;

impl GcpCredentialRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialRepository for GcpCredentialRepository {
    async fn load_file(&self, path: &Path) -> Result<CredentialKey, CredentialError> {
        debug!("Reading credentials file: {}", path.display());

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CredentialError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        CredentialKey::from_json_str(&content)
    }

    async fn discover_default(&self) -> Result<AmbientCredentials, CredentialError> {
        let project = project::project()
            .await
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;

        match project {
            Project::FromFile(file) => {
                let key = key_from_credentials_file(&file);
                if !key.is_service_account() && !key.is_authorized_user() {
                    return Err(CredentialError::UnsupportedType(key.key_type));
                }
                let project_id = key
                    .project_id
                    .clone()
                    .or_else(|| key.quota_project_id.clone());
                debug!("Discovered {} credentials", key.key_type);
                Ok(AmbientCredentials {
                    key: Some(key),
                    project_id,
                })
            }
            Project::FromMetadataServer(info) => {
                debug!("Discovered metadata server credentials");
                Ok(AmbientCredentials {
                    key: None,
                    project_id: info.project_id,
                })
            }
        }
    }
}

fn key_from_credentials_file(file: &CredentialsFile) -> CredentialKey {
    CredentialKey {
        key_type: file.tp.clone(),
        project_id: file.project_id.clone(),
        private_key_id: file.private_key_id.clone(),
        private_key: file.private_key.clone(),
        client_email: file.client_email.clone(),
        client_id: file.client_id.clone(),
        auth_uri: file.auth_uri.clone(),
        token_uri: file.token_uri.clone(),
        client_secret: file.client_secret.clone(),
        refresh_token: file.refresh_token.clone(),
        quota_project_id: file.quota_project_id.clone(),
        extra: Default::default(),
    }
}
