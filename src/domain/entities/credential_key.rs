//! # CredentialKey Entity
//!
//! 認証情報キー（サービスアカウントキーJSON等）のドメイン表現

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::domain::error::CredentialError;

pub const SERVICE_ACCOUNT_TYPE: &str = "service_account";
pub const AUTHORIZED_USER_TYPE: &str = "authorized_user";

/// 認証情報キー
///
/// `gcloud` や IAM が発行するキーJSONの内容。未知のフィールドは `extra` にそのまま保持し、
/// 認証ライブラリへ渡す際に元の形で復元できるようにする。
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialKey {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,

    // authorized_user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_project_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Possible sensitive info in debug messages
impl fmt::Debug for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .finish_non_exhaustive()
    }
}

impl CredentialKey {
    /// JSON文字列からキーを読み込む
    pub fn from_json_str(json: &str) -> Result<Self, CredentialError> {
        Ok(serde_json::from_str(json)?)
    }

    /// JSONオブジェクトからキーを読み込む
    pub fn from_value(value: Value) -> Result<Self, CredentialError> {
        Ok(serde_json::from_value(value)?)
    }

    /// キーをJSONオブジェクトに戻す
    pub fn to_value(&self) -> Result<Value, CredentialError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn is_service_account(&self) -> bool {
        self.key_type == SERVICE_ACCOUNT_TYPE
    }

    pub fn is_authorized_user(&self) -> bool {
        self.key_type == AUTHORIZED_USER_TYPE
    }

    /// サービスアカウントキーとして必要なフィールドが揃っているか検証します。
    ///
    /// # Errors
    ///
    /// - `type` が `service_account` 以外の場合は `UnsupportedType`
    /// - `client_email`, `private_key`, `token_uri` のいずれかが空の場合は `MissingField`
    pub fn require_service_account(&self) -> Result<(), CredentialError> {
        if !self.is_service_account() {
            return Err(CredentialError::UnsupportedType(self.key_type.clone()));
        }

        let required = [
            ("client_email", &self.client_email),
            ("private_key", &self.private_key),
            ("token_uri", &self.token_uri),
        ];
        for (name, value) in required {
            if value.as_deref().map_or(true, str::is_empty) {
                return Err(CredentialError::MissingField(name));
            }
        }

        Ok(())
    }
}
