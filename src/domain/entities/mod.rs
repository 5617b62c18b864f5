//! # Domain Entities
//!
//! 認証情報とクライアント設定を表すエンティティ
//!
//! ## エンティティ
//!
//! - **CredentialKey**: キーJSONのドメイン表現
//! - **Credentials**: スコープ・プロジェクト・なりすまし対象を持つ認証ハンドル
//! - **ClientSettings**: 接続前の解決済み設定

pub mod client_settings;
pub mod credential_key;
pub mod credentials;
