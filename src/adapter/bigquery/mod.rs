//! BigQuery Adapter Modules
//!
//! BigQuery統合のためのアダプターモジュール

pub mod client;

pub use client::{BigQueryClientHandle, BigQueryConnector};
