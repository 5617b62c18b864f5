//! # Credential Resolution Service
//!
//! base64認証情報のデコードとプロジェクトIDの解決

use base64::prelude::*;
use serde_json::Value;

use crate::domain::error::ClientError;

/// base64エンコードされた認証情報をJSONオブジェクトにデコードします。
///
/// 空白・改行は無視します（`base64` コマンドの折り返し出力もそのまま受け付ける）。
///
/// # Errors
///
/// - base64として不正な場合は `ClientError::Base64`
/// - デコード結果がJSONでない場合は `ClientError::Payload`
/// - JSONオブジェクトでない場合は `ClientError::PayloadNotObject`
pub fn decode_credentials_base64(encoded: &str) -> Result<Value, ClientError> {
    let compact: String = encoded.split_ascii_whitespace().collect();
    let decoded = BASE64_STANDARD.decode(compact)?;
    let value: Value = serde_json::from_slice(&decoded).map_err(ClientError::Payload)?;

    if !value.is_object() {
        return Err(ClientError::PayloadNotObject);
    }

    Ok(value)
}

/// 有効なプロジェクトIDを決定する
///
/// 明示指定 > 認証情報のデフォルト > なし
pub fn resolve_project_id(explicit: Option<&str>, default: Option<&str>) -> Option<String> {
    explicit.or(default).map(str::to_string)
}
