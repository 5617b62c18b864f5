//! # Domain Errors
//!
//! クライアント構築で発生するエラーの分類
//!
//! - **ClientError**: クライアント構築全体のエラー
//! - **CredentialError**: 認証情報の読み込み・変換エラー
//! - **ValidationError**: なりすまし対象の入力検証エラー
//! - **PatternError**: 置換ヘルパーの正規表現エラー

use std::path::PathBuf;

/// 認証情報の読み込みエラー
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to read credentials file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credentials are not a valid key document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("service account credentials are missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unsupported credentials type `{0}`")]
    UnsupportedType(String),

    #[error("{0} credentials cannot impersonate a subject")]
    ImpersonationUnsupported(&'static str),

    #[error("no default credentials found: {0}")]
    Unavailable(String),
}

/// なりすまし対象（メールアドレス・ユーザー名）の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("impersonation email `{email}` is outside the allowed domain `{domain}`")]
    EmailDomain { email: String, domain: String },

    #[error("username `{0}` may only contain letters, digits, `_` and `-`")]
    Username(String),
}

/// クライアント構築エラー
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to decode base64 credentials: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded credentials are not valid JSON: {0}")]
    Payload(#[source] serde_json::Error),

    #[error("decoded credentials must be a JSON object")]
    PayloadNotObject,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("authentication failed: {0}")]
    Authentication(#[source] CredentialError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to create BigQuery client: {0}")]
    Connect(String),
}

/// 置換ヘルパーの正規表現エラー（作成時、または置換実行時）
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid pattern `{pattern}`: {source}")]
    Compile {
        pattern: String,
        #[source]
        source: fancy_regex::Error,
    },

    #[error("invalid replacement template `{template}`: {source}")]
    Template {
        template: String,
        #[source]
        source: fancy_regex::Error,
    },

    #[error("matching `{pattern}` failed: {source}")]
    Match {
        pattern: String,
        #[source]
        source: fancy_regex::Error,
    },
}
