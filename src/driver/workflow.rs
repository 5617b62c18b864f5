//! Workflow Orchestration
//!
//! ワークフローのオーケストレーション

use anyhow::{Context, Result};
use log::info;

use std::sync::Arc;

use crate::adapter::auth::GcpCredentialRepository;
use crate::adapter::bigquery::BigQueryConnector;
use crate::adapter::config::Config;
use crate::adapter::connection_url::parse_connection_url;
use crate::application::dto::connection_options::ConnectionOptions;
use crate::application::use_cases::build_client::BuildClientUseCase;
use crate::domain::entities::client_settings::ClientSettings;

use super::cli::Args;

/// 引数から接続設定を組み立てる
///
/// 接続URL、設定ファイル、空の設定の順に基本設定を選び、フラグで上書きする。
pub fn load_options(args: &Args) -> Result<(ConnectionOptions, Option<String>)> {
    let (base, dataset) = if let Some(url) = &args.url {
        let parsed = parse_connection_url(url).context("Failed to parse connection URL")?;
        (parsed.options, parsed.dataset)
    } else if let Some(path) = &args.config {
        (Config::load(path)?.into_options(), None)
    } else {
        (ConnectionOptions::default(), None)
    };

    Ok((base.merge(args.overrides()), dataset))
}

/// BigQuery Connect Workflow
pub struct ConnectWorkflow {
    build_client_use_case: BuildClientUseCase<GcpCredentialRepository, BigQueryConnector>,
}

impl Default for ConnectWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectWorkflow {
    /// Create a new workflow instance with dependency injection
    pub fn new() -> Self {
        let credential_repo = Arc::new(GcpCredentialRepository::new());
        let connector = Arc::new(BigQueryConnector::new());

        Self {
            build_client_use_case: BuildClientUseCase::new(credential_repo, connector),
        }
    }

    /// Execute the connect workflow
    pub async fn execute(&self, args: Args) -> Result<ClientSettings> {
        info!("Starting bqconnect...");
        info!("Dry run: {}", args.dry_run);

        let (options, dataset) = load_options(&args)?;

        let settings = if args.dry_run {
            let settings = self
                .build_client_use_case
                .resolve(&options)
                .await
                .context("Failed to resolve client settings")?;
            println!("✓ Dry-run mode (not creating the client)");
            settings
        } else {
            let handle = self
                .build_client_use_case
                .execute(&options)
                .await
                .context("Failed to create BigQuery client")?;
            println!("✓ Created BigQuery client");
            let (_, settings) = handle.into_parts();
            settings
        };

        print_summary(&settings, dataset.as_deref());

        Ok(settings)
    }
}

fn print_summary(settings: &ClientSettings, dataset: Option<&str>) {
    println!("✓ Using configuration:");
    println!(
        "  Project: {}",
        settings.project_id.as_deref().unwrap_or("(none)")
    );
    if let Some(dataset) = dataset {
        println!("  Dataset: {}", dataset);
    }
    println!(
        "  Location: {}",
        settings.location.as_deref().unwrap_or("(default)")
    );
    println!(
        "  Credentials: {} ({})",
        settings.credentials.source(),
        settings.credentials.kind()
    );
    if let Some(subject) = settings.credentials.subject() {
        println!("  Impersonating: {}", subject);
    }
    println!("  User agent: {}", settings.user_agent);
}
