//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::Parser;
use std::path::PathBuf;

use crate::adapter::auth::gcp_auth::expand_key_path;
use crate::application::dto::connection_options::ConnectionOptions;

/// 認証情報を解決してBigQueryクライアントを作成するCLI
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "bqconnect")]
#[command(about = "Resolve credentials and create an authenticated BigQuery client", long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Connection URL (bigquery://[user@]project[/dataset]?key=value)
    #[arg(long, conflicts_with = "config")]
    pub url: Option<String>,

    /// GCP project ID
    #[arg(short, long)]
    pub project: Option<String>,

    /// BigQuery location (e.g. US, asia-northeast1)
    #[arg(short, long)]
    pub location: Option<String>,

    /// Service account key file
    #[arg(long)]
    pub credentials_path: Option<PathBuf>,

    /// Email of the user to impersonate
    #[arg(long, value_name = "EMAIL")]
    pub impersonate: Option<String>,

    /// Username checked against the impersonation policy
    #[arg(long)]
    pub username: Option<String>,

    /// Dry run mode - resolve settings without creating the client
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// フラグで明示された項目のみを持つ接続設定（`credentials_path` のチルダは展開する）
    pub fn overrides(&self) -> ConnectionOptions {
        ConnectionOptions {
            project_id: self.project.clone(),
            location: self.location.clone(),
            credentials_path: self
                .credentials_path
                .as_deref()
                .map(|p| PathBuf::from(expand_key_path(&p.to_string_lossy()))),
            email: self.impersonate.clone(),
            username: self.username.clone(),
            ..Default::default()
        }
    }
}
