//! markpub — Markdown記事の下書き管理・Medium公開・ファイルエクスポート
//!
//! 構成:
//! - `domain::article`: 記事エンティティとローカルストア（SQLite）へのCRUD
//! - `publisher`: Medium APIクライアントと差し替え可能なHTTPトランスポート
//! - `export`: HTML / Markdown / プレーンテキストへのエクスポート
//! - `app`: axumハンドラとアプリケーションコンテキスト

pub mod app;
pub mod domain;
pub mod export;
pub mod infra;
pub mod publisher;
pub mod types;
