//! # Domain Services
//!
//! エンティティに属さないビジネスルール
//!
//! - **credential_resolution**: base64認証情報のデコードとプロジェクトIDの解決
//! - **impersonation_policy**: なりすまし前の入力検証
//! - **pattern_substitution**: SQL方言向けの正規表現置換ヘルパー

pub mod credential_resolution;
pub mod impersonation_policy;
pub mod pattern_substitution;
