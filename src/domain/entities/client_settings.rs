//! # ClientSettings Entity
//!
//! クライアント構築に必要な解決済みの設定

use serde_json::Value;

use super::credentials::Credentials;

pub const USER_AGENT_TEMPLATE: &str = "bqconnect/{version}";

/// このライブラリのバージョン
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// ユーザーエージェント文字列を作成
pub fn user_agent(version: &str) -> String {
    USER_AGENT_TEMPLATE.replace("{version}", version)
}

/// 解決済みのクライアント設定
///
/// 認証情報の解決が完了し、接続前の状態
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub credentials: Credentials,
    /// 明示指定、または認証情報から導出したプロジェクトID
    pub project_id: Option<String>,
    /// BigQueryロケーション（例: "US", "asia-northeast1"）
    pub location: Option<String>,
    /// デフォルトのクエリジョブ設定（そのまま受け渡す）
    pub default_query_config: Option<Value>,
    pub user_agent: String,
}
