//! # Credentials Entity
//!
//! スコープ・デフォルトプロジェクト・なりすまし対象を持つ認証ハンドル

use std::fmt;
use std::path::PathBuf;

use super::credential_key::CredentialKey;
use crate::domain::error::CredentialError;

pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// クライアントが要求する固定スコープ
pub const SCOPES: [&str; 2] = [BIGQUERY_SCOPE, CLOUD_PLATFORM_SCOPE];

/// 認証情報の取得元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// キーファイルのパス
    File(PathBuf),
    /// JSONオブジェクト（base64からデコードされたものを含む）
    Info,
    /// 実行環境からの自動検出
    Ambient,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Info => write!(f, "inline credentials"),
            Self::Ambient => write!(f, "application default credentials"),
        }
    }
}

/// 認証ハンドル
///
/// `key` が `None` の場合はメタデータサーバー（GCE等）から取得する認証情報を表す。
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    source: CredentialSource,
    key: Option<CredentialKey>,
    scopes: Vec<String>,
    project_id: Option<String>,
    subject: Option<String>,
}

impl Credentials {
    /// サービスアカウントキーから認証ハンドルを作成します。
    ///
    /// デフォルトプロジェクトはキーに埋め込まれた `project_id` になります。
    ///
    /// # Errors
    ///
    /// キーがサービスアカウントの要件を満たさない場合
    pub fn service_account(
        source: CredentialSource,
        key: CredentialKey,
    ) -> Result<Self, CredentialError> {
        key.require_service_account()?;
        let project_id = key.project_id.clone();
        Ok(Self {
            source,
            key: Some(key),
            scopes: Vec::new(),
            project_id,
            subject: None,
        })
    }

    /// 自動検出された認証情報から認証ハンドルを作成
    pub fn ambient(key: Option<CredentialKey>, project_id: Option<String>) -> Self {
        Self {
            source: CredentialSource::Ambient,
            key,
            scopes: Vec::new(),
            project_id,
            subject: None,
        }
    }

    /// スコープを置き換えた認証ハンドルを返す
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// `subject` になりすます認証ハンドルを返します。
    ///
    /// ドメイン全体の委任（JWT の `sub` クレーム）を使うため、サービスアカウントキーのみ対応します。
    pub fn with_subject(mut self, subject: &str) -> Result<Self, CredentialError> {
        match &self.key {
            Some(key) if key.is_service_account() => {
                self.subject = Some(subject.to_string());
                Ok(self)
            }
            _ => Err(CredentialError::ImpersonationUnsupported(self.kind())),
        }
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    pub fn key(&self) -> Option<&CredentialKey> {
        self.key.as_ref()
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// 認証情報から導出されたデフォルトプロジェクト
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// サービスアカウントのメールアドレス
    pub fn client_email(&self) -> Option<&str> {
        self.key.as_ref().and_then(|k| k.client_email.as_deref())
    }

    /// 認証情報の種類（ログ・エラーメッセージ用）
    pub fn kind(&self) -> &'static str {
        match &self.key {
            None => "metadata server",
            Some(key) if key.is_service_account() => "service account",
            Some(key) if key.is_authorized_user() => "authorized user",
            Some(_) => "unsupported",
        }
    }
}
