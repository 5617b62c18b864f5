//! Adapter Layer
//!
//! 外部システム（BigQuery, GCP認証, ファイルシステム）との統合

pub mod auth;
pub mod bigquery;
pub mod config;
pub mod connection_url;
