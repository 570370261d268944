use anyhow::{Context, Result};
use markpub::app::{router, AppContext};
use markpub::infra::db;
use markpub::types::AppConfig;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // 環境変数を読み込み（.envファイルがあれば使用）
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    let config = AppConfig::from_env().context("設定の読み込みに失敗しました")?;

    // データベースファイルとエクスポート先のディレクトリを確保
    std::fs::create_dir_all("data").context("dataディレクトリの作成に失敗しました")?;
    std::fs::create_dir_all(&config.export_dir)
        .context("エクスポートディレクトリの作成に失敗しました")?;

    let pool = db::setup_database(&config.database_url)
        .await
        .context("データベースのセットアップに失敗しました")?;
    tracing::info!(database_url = %config.database_url, "データベース初期化完了");

    if !config.has_token() {
        tracing::warn!("MEDIUM_TOKENが未設定のため、公開系エンドポイントは無効です");
    }

    let bind_addr = config.bind_addr.clone();
    let ctx = Arc::new(AppContext::new(config, pool));
    let app = router(ctx);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("アドレスのバインドに失敗しました: {}", bind_addr))?;
    tracing::info!(%bind_addr, "サーバを起動");

    axum::serve(listener, app)
        .await
        .context("サーバの実行に失敗しました")?;

    Ok(())
}
