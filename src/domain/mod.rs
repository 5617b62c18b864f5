//! # Domain Layer
//!
//! このモジュールは認証情報の解決とクライアント設定に関するルールを定義します。
//!
//! ## 特徴
//!
//! - ネットワークやファイルシステムに直接触れない
//! - 認証ライブラリやBigQueryクライアントの型に依存しない
//! - 純粋なビジネスロジック
//!
//! ## 構成要素
//!
//! - **entities**: 認証情報・クライアント設定のエンティティ
//! - **error**: エラー分類
//! - **repositories**: Repository trait（インターフェース定義のみ）
//! - **services**: Domain Service（ビジネスルール）

pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
