use crate::types::{StoreError, StoreResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// データベース接続プールを作成
/// データベースファイルが存在しない場合は新規作成する
pub async fn create_pool(database_url: &str) -> StoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StoreError::database("接続URLの解析", e))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .map_err(|e| StoreError::database("データベース接続", e))
}

/// データベースの初期化（マイグレーション実行）
pub async fn initialize_database(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::database("データベースマイグレーション実行", e.into()))
}

/// プールの作成とデータベース初期化を一括で行う便利関数
pub async fn setup_database(database_url: &str) -> StoreResult<SqlitePool> {
    let pool = create_pool(database_url).await?;
    initialize_database(&pool).await?;
    Ok(pool)
}
