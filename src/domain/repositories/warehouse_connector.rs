//! # Warehouse Connector Trait
//!
//! 解決済み設定からクライアントハンドルを作成する処理を抽象化

use async_trait::async_trait;

use crate::domain::entities::client_settings::ClientSettings;
use crate::domain::error::ClientError;

/// ウェアハウス接続
#[async_trait]
pub trait WarehouseConnector: Send + Sync {
    /// 作成されるクライアントハンドル
    type Handle: Send;

    /// 設定からクライアントハンドルを作成する
    async fn connect(&self, settings: ClientSettings) -> Result<Self::Handle, ClientError>;
}
