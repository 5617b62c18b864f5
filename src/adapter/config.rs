//! Configuration File
//!
//! JSON設定ファイルの読み込み

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use crate::adapter::auth::gcp_auth::expand_key_path;
use crate::application::dto::connection_options::ConnectionOptions;

/// 設定ファイルの内容
///
/// すべての項目は省略可能。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub project_id: Option<String>,
    pub location: Option<String>,

    // Authentication
    pub credentials_path: Option<String>,
    pub credentials_base64: Option<String>,
    pub credentials_info: Option<Value>,

    pub default_query_job_config: Option<Value>,

    // Impersonation
    pub email: Option<String>,
    pub username: Option<String>,
    pub allowed_impersonation_domain: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        Ok(config)
    }

    /// 接続設定に変換（`credentials_path` のチルダは展開する）
    pub fn into_options(self) -> ConnectionOptions {
        ConnectionOptions {
            credentials_info: self.credentials_info,
            credentials_base64: self.credentials_base64,
            credentials_path: self
                .credentials_path
                .map(|p| PathBuf::from(expand_key_path(&p))),
            default_query_config: self.default_query_job_config,
            location: self.location,
            project_id: self.project_id,
            email: self.email,
            username: self.username,
            allowed_impersonation_domain: self.allowed_impersonation_domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    fn write_config(value: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(&json!({
            "project_id": "analytics-prod",
            "location": "asia-northeast1",
            "credentials_path": "/etc/keys/loader.json",
            "default_query_job_config": { "use_query_cache": false },
            "email": "analyst@example.com",
            "username": "analyst",
            "allowed_impersonation_domain": "example.com"
        }));

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        let options = config.into_options();

        assert_eq!(options.project_id(), Some("analytics-prod"));
        assert_eq!(options.location(), Some("asia-northeast1"));
        assert_eq!(
            options.credentials_path(),
            Some(Path::new("/etc/keys/loader.json"))
        );
        assert_eq!(
            options.default_query_config,
            Some(json!({ "use_query_cache": false }))
        );
        assert_eq!(options.email(), Some("analyst@example.com"));
        assert_eq!(options.username(), Some("analyst"));
        assert_eq!(
            options.allowed_impersonation_domain.as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_load_empty_config() {
        let file = write_config(&json!({}));

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.into_options(), ConnectionOptions::default());
    }

    #[test]
    fn test_credentials_path_tilde_expansion() {
        let config = Config {
            credentials_path: Some("~/keys/loader.json".to_string()),
            ..Default::default()
        };

        let options = config.into_options();
        let path = options.credentials_path().unwrap().to_string_lossy().to_string();

        assert!(!path.starts_with('~'));
        assert!(path.ends_with("keys/loader.json"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/bqconnect/config.json");

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let result = Config::load(file.path().to_str().unwrap());

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to parse config file"));
    }
}
