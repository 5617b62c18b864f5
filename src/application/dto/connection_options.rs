//! # Connection Options DTO
//!
//! クライアント作成の入力となる設定のData Transfer Object

use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// 接続設定
///
/// 認証情報の指定方法（ファイルパス・JSONオブジェクト・base64）はどれか一つを想定する。
/// どれも指定されない場合は実行環境から認証情報を検出する。
/// 空文字列・空のJSONオブジェクトは未指定として扱う。
#[derive(Clone, Default, PartialEq)]
pub struct ConnectionOptions {
    /// サービスアカウントキー（JSONオブジェクト）
    pub credentials_info: Option<Value>,
    /// base64エンコードされたサービスアカウントキー（`credentials_info` より優先）
    pub credentials_base64: Option<String>,
    /// サービスアカウントキーファイルのパス（最優先）
    pub credentials_path: Option<PathBuf>,
    /// デフォルトのクエリジョブ設定
    pub default_query_config: Option<Value>,
    /// BigQueryロケーション（例: "US", "asia-northeast1"）
    pub location: Option<String>,
    /// GCPプロジェクトID
    pub project_id: Option<String>,
    /// なりすまし対象のメールアドレス
    pub email: Option<String>,
    /// ユーザー名（なりすまし検証にのみ使用）
    pub username: Option<String>,
    /// なりすまし対象として許可するドメイン（設定時のみ検証を行う）
    pub allowed_impersonation_domain: Option<String>,
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // キー本体は出力しない
        f.debug_struct("ConnectionOptions")
            .field("credentials_info", &self.credentials_info.is_some())
            .field("credentials_base64", &self.credentials_base64.is_some())
            .field("credentials_path", &self.credentials_path)
            .field("default_query_config", &self.default_query_config)
            .field("location", &self.location)
            .field("project_id", &self.project_id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("allowed_impersonation_domain", &self.allowed_impersonation_domain)
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl ConnectionOptions {
    /// 空の接続設定を作成します。
    ///
    /// # 例
    ///
    /// ```
    /// use bqconnect::application::dto::connection_options::ConnectionOptions;
    ///
    /// let options = ConnectionOptions::new()
    ///     .with_project_id("analytics-prod")
    ///     .with_location("asia-northeast1")
    ///     .with_credentials_path("/etc/keys/loader.json");
    ///
    /// assert_eq!(options.project_id(), Some("analytics-prod"));
    /// assert_eq!(options.location(), Some("asia-northeast1"));
    /// assert!(options.email().is_none());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials_info(mut self, value: Value) -> Self {
        self.credentials_info = Some(value);
        self
    }

    pub fn with_credentials_base64(mut self, value: impl Into<String>) -> Self {
        self.credentials_base64 = Some(value.into());
        self
    }

    pub fn with_credentials_path(mut self, value: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(value.into());
        self
    }

    pub fn with_default_query_config(mut self, value: Value) -> Self {
        self.default_query_config = Some(value);
        self
    }

    pub fn with_location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    pub fn with_project_id(mut self, value: impl Into<String>) -> Self {
        self.project_id = Some(value.into());
        self
    }

    pub fn with_email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn with_username(mut self, value: impl Into<String>) -> Self {
        self.username = Some(value.into());
        self
    }

    pub fn with_allowed_impersonation_domain(mut self, value: impl Into<String>) -> Self {
        self.allowed_impersonation_domain = Some(value.into());
        self
    }

    /// 空でない `credentials_info`
    pub fn credentials_info(&self) -> Option<&Value> {
        self.credentials_info.as_ref().filter(|v| match v {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        })
    }

    pub fn credentials_base64(&self) -> Option<&str> {
        non_empty(&self.credentials_base64)
    }

    pub fn credentials_path(&self) -> Option<&Path> {
        self.credentials_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    pub fn location(&self) -> Option<&str> {
        non_empty(&self.location)
    }

    pub fn project_id(&self) -> Option<&str> {
        non_empty(&self.project_id)
    }

    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }

    pub fn username(&self) -> Option<&str> {
        non_empty(&self.username)
    }

    /// `overrides` で指定された項目を上書きした設定を返す
    pub fn merge(self, overrides: ConnectionOptions) -> Self {
        Self {
            credentials_info: overrides.credentials_info.or(self.credentials_info),
            credentials_base64: overrides.credentials_base64.or(self.credentials_base64),
            credentials_path: overrides.credentials_path.or(self.credentials_path),
            default_query_config: overrides.default_query_config.or(self.default_query_config),
            location: overrides.location.or(self.location),
            project_id: overrides.project_id.or(self.project_id),
            email: overrides.email.or(self.email),
            username: overrides.username.or(self.username),
            allowed_impersonation_domain: overrides
                .allowed_impersonation_domain
                .or(self.allowed_impersonation_domain),
        }
    }
}
