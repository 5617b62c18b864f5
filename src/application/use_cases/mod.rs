//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **BuildClientUseCase**: 認証情報を解決してクライアントを作成

pub mod build_client;
