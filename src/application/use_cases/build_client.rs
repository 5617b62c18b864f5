//! # Build Client Use Case
//!
//! 認証情報を解決してクライアントを作成するユースケース
//!
//! 認証情報の優先順位：
//!
//! 1. キーファイルのパス
//! 2. JSONオブジェクト（base64指定時はデコード結果で置き換え）
//! 3. 実行環境からの自動検出

use log::{debug, info};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::application::dto::connection_options::ConnectionOptions;
use crate::domain::entities::client_settings::{user_agent, ClientSettings, LIBRARY_VERSION};
use crate::domain::entities::credential_key::CredentialKey;
use crate::domain::entities::credentials::{CredentialSource, Credentials, SCOPES};
use crate::domain::error::ClientError;
use crate::domain::repositories::credential_repository::CredentialRepository;
use crate::domain::repositories::warehouse_connector::WarehouseConnector;
use crate::domain::services::credential_resolution::{
    decode_credentials_base64, resolve_project_id,
};
use crate::domain::services::impersonation_policy::ImpersonationPolicy;

/// クライアント作成ユースケース
///
/// 状態を持たないため、同じインスタンスを複数のタスクから同時に呼び出せる。
pub struct BuildClientUseCase<R: CredentialRepository, C: WarehouseConnector> {
    credential_repository: Arc<R>,
    connector: Arc<C>,
    library_version: String,
}

impl<R: CredentialRepository, C: WarehouseConnector> BuildClientUseCase<R, C> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `credential_repository` - 認証情報リポジトリ
    /// * `connector` - クライアントハンドルを作成する接続
    pub fn new(credential_repository: Arc<R>, connector: Arc<C>) -> Self {
        Self {
            credential_repository,
            connector,
            library_version: LIBRARY_VERSION.to_string(),
        }
    }

    /// ユーザーエージェントに埋め込むバージョンを変更
    pub fn with_library_version(mut self, version: impl Into<String>) -> Self {
        self.library_version = version.into();
        self
    }

    /// 認証情報を解決し、クライアントハンドルを作成します。
    ///
    /// # Errors
    ///
    /// 認証情報の解決、またはクライアントの作成に失敗した場合。エラーはそのまま返し、リトライしない。
    pub async fn execute(&self, options: &ConnectionOptions) -> Result<C::Handle, ClientError> {
        let settings = self.resolve(options).await?;

        info!(
            "Creating BigQuery client (project: {}, credentials: {})",
            settings.project_id.as_deref().unwrap_or("<none>"),
            settings.credentials.source()
        );

        self.connector.connect(settings).await
    }

    /// 接続せずに設定を解決します。
    ///
    /// # Errors
    ///
    /// - base64・JSONのデコードに失敗した場合は `Base64` / `Payload` / `PayloadNotObject`
    ///   （認証情報の読み込みより前に判定される）
    /// - キーファイル・キーの読み込みに失敗した場合は `Credential`
    /// - 実行環境から認証情報を検出できない場合は `Authentication`
    /// - なりすまし対象が許可ドメイン外の場合は `Validation`
    pub async fn resolve(&self, options: &ConnectionOptions) -> Result<ClientSettings, ClientError> {
        let credentials_info = match options.credentials_base64() {
            Some(encoded) => Some(decode_credentials_base64(encoded)?),
            None => options.credentials_info().cloned(),
        };

        let credentials = self
            .load_credentials(options.credentials_path(), credentials_info)
            .await?;

        let project_id = resolve_project_id(options.project_id(), credentials.project_id());

        let credentials = match options.email() {
            Some(email) => {
                let policy =
                    ImpersonationPolicy::new(options.allowed_impersonation_domain.clone());
                if policy.is_enabled() {
                    policy.validate(email, options.username())?;
                } else {
                    debug!("No impersonation domain configured, skipping validation");
                }
                debug!("Impersonated email: {}", email);
                credentials.with_subject(email)?
            }
            None => credentials,
        };

        Ok(ClientSettings {
            credentials,
            project_id,
            location: options.location().map(str::to_string),
            default_query_config: options.default_query_config.clone(),
            user_agent: user_agent(&self.library_version),
        })
    }

    async fn load_credentials(
        &self,
        path: Option<&Path>,
        info: Option<Value>,
    ) -> Result<Credentials, ClientError> {
        if let Some(path) = path {
            let key = self.credential_repository.load_file(path).await?;
            let source = CredentialSource::File(path.to_path_buf());
            return Ok(Credentials::service_account(source, key)?.with_scopes(SCOPES));
        }

        if let Some(info) = info {
            let key = CredentialKey::from_value(info)?;
            return Ok(Credentials::service_account(CredentialSource::Info, key)?.with_scopes(SCOPES));
        }

        let ambient = self
            .credential_repository
            .discover_default()
            .await
            .map_err(ClientError::Authentication)?;

        Ok(Credentials::ambient(ambient.key, ambient.project_id).with_scopes(SCOPES))
    }
}
