//! 型定義モジュール
//!
//! アプリケーション全体で使用される共通的な型定義を管理します。
//! - エラー型: ストア・公開クライアント・設定のエラー分類
//! - 設定型: 環境変数から構築されるアプリケーション設定

pub mod config;
pub mod error;

// 便利な再エクスポート
pub use config::{AppConfig, ConfigError, ConfigResult};
pub use error::{PublishError, PublishResult, StoreError, StoreResult};
