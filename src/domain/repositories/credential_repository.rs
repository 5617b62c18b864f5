//! # Credential Repository Trait
//!
//! 認証情報の読み込みと自動検出を抽象化

use async_trait::async_trait;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::credential_key::CredentialKey;
use crate::domain::error::CredentialError;

/// 実行環境から検出された認証情報
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientCredentials {
    /// キーファイル由来の場合のキー（メタデータサーバー由来なら `None`）
    pub key: Option<CredentialKey>,
    /// 環境が提供するデフォルトプロジェクト
    pub project_id: Option<String>,
}

/// 認証情報リポジトリ
///
/// キーファイルの読み込みと、アプリケーションデフォルト認証情報の検出を担当する
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// キーファイルを読み込む
    ///
    /// # Errors
    ///
    /// ファイルが存在しない・読めない・JSONとして不正な場合
    async fn load_file(&self, path: &Path) -> Result<CredentialKey, CredentialError>;

    /// 実行環境から認証情報を検出する
    ///
    /// # Errors
    ///
    /// どの検出方法でも認証情報が見つからない場合
    async fn discover_default(&self) -> Result<AmbientCredentials, CredentialError>;
}
