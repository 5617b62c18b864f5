//! Connection URL
//!
//! `bigquery://[user@]project[/dataset]?key=value` 形式の接続URLを解析する
//!
//! 値はフォームエンコードとしてデコードされるため、base64の `+` は `%2B` と書く必要がある。

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use url::Url;

use crate::adapter::auth::gcp_auth::expand_key_path;
use crate::application::dto::connection_options::ConnectionOptions;

pub const SCHEME: &str = "bigquery";

const PRIORITIES: [&str; 2] = ["INTERACTIVE", "BATCH"];
const CREATE_DISPOSITIONS: [&str; 2] = ["CREATE_IF_NEEDED", "CREATE_NEVER"];
const WRITE_DISPOSITIONS: [&str; 3] = ["WRITE_APPEND", "WRITE_TRUNCATE", "WRITE_EMPTY"];

/// 接続URLの解析エラー
#[derive(Debug, thiserror::Error)]
pub enum ConnectionUrlError {
    #[error("invalid connection URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported scheme `{0}`, expected `bigquery`")]
    Scheme(String),

    #[error("invalid dataset path `{0}`")]
    Dataset(String),

    #[error("unrecognized URL parameter `{0}`")]
    UnknownKey(String),

    #[error("URL parameter `{0}` was given more than once")]
    DuplicateKey(String),

    #[error("invalid value `{value}` for URL parameter `{key}`")]
    InvalidValue { key: String, value: String },
}

/// 解析済みの接続URL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionUrl {
    pub options: ConnectionOptions,
    /// デフォルトデータセット（パス部分）
    pub dataset: Option<String>,
}

/// 接続URLを解析します。
///
/// # 例
///
/// ```
/// use bqconnect::adapter::connection_url::parse_connection_url;
///
/// let parsed = parse_connection_url(
///     "bigquery://analytics-prod/events?location=asia-northeast1&use_query_cache=false",
/// )
/// .unwrap();
///
/// assert_eq!(parsed.options.project_id(), Some("analytics-prod"));
/// assert_eq!(parsed.options.location(), Some("asia-northeast1"));
/// assert_eq!(parsed.dataset.as_deref(), Some("events"));
/// ```
pub fn parse_connection_url(input: &str) -> Result<ConnectionUrl, ConnectionUrlError> {
    let url = Url::parse(input)?;
    if url.scheme() != SCHEME {
        return Err(ConnectionUrlError::Scheme(url.scheme().to_string()));
    }

    let mut options = ConnectionOptions::new();
    options.project_id = url
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string);
    if !url.username().is_empty() {
        options.username = Some(url.username().to_string());
    }

    let dataset = parse_dataset(url.path())?;

    let mut seen = HashSet::new();
    let mut job_config = Map::new();
    for (key, value) in url.query_pairs() {
        if !seen.insert(key.to_string()) {
            return Err(ConnectionUrlError::DuplicateKey(key.to_string()));
        }

        match &*key {
            "location" => options.location = Some(value.to_string()),
            "credentials_path" => {
                options.credentials_path = Some(PathBuf::from(expand_key_path(&value)));
            }
            "credentials_base64" => options.credentials_base64 = Some(value.to_string()),
            "email" => options.email = Some(value.to_string()),
            "priority" => {
                job_config.insert(key.to_string(), choice(&key, &value, &PRIORITIES)?);
            }
            "create_disposition" => {
                job_config.insert(key.to_string(), choice(&key, &value, &CREATE_DISPOSITIONS)?);
            }
            "write_disposition" => {
                job_config.insert(key.to_string(), choice(&key, &value, &WRITE_DISPOSITIONS)?);
            }
            "maximum_bytes_billed" => {
                let bytes: u64 = value.parse().map_err(|_| invalid(&key, &value))?;
                job_config.insert(key.to_string(), Value::from(bytes));
            }
            "use_query_cache" | "use_legacy_sql" | "dry_run" => {
                job_config.insert(key.to_string(), Value::Bool(boolean(&key, &value)?));
            }
            _ => return Err(ConnectionUrlError::UnknownKey(key.to_string())),
        }
    }

    if !job_config.is_empty() {
        options.default_query_config = Some(Value::Object(job_config));
    }

    Ok(ConnectionUrl { options, dataset })
}

fn parse_dataset(path: &str) -> Result<Option<String>, ConnectionUrlError> {
    let dataset = path.trim_start_matches('/');
    if dataset.is_empty() {
        return Ok(None);
    }
    if dataset.contains('/') {
        return Err(ConnectionUrlError::Dataset(path.to_string()));
    }
    Ok(Some(dataset.to_string()))
}

fn invalid(key: &str, value: &str) -> ConnectionUrlError {
    ConnectionUrlError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn boolean(key: &str, value: &str) -> Result<bool, ConnectionUrlError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn choice(key: &str, value: &str, allowed: &[&str]) -> Result<Value, ConnectionUrlError> {
    let upper = value.to_ascii_uppercase();
    if allowed.contains(&upper.as_str()) {
        Ok(Value::String(upper))
    } else {
        Err(invalid(key, value))
    }
}
