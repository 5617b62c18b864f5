//! bqconnect - BigQuery Client Builder
//!
//! 認証情報を解決して BigQuery クライアントを作成する

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use anyhow::Result;
use clap::Parser;

use bqconnect::driver::{Args, ConnectWorkflow};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    // Create workflow with injected dependencies
    let workflow = ConnectWorkflow::new();

    workflow.execute(args).await?;

    Ok(())
}
