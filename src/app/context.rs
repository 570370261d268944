use crate::publisher::MediumClient;
use crate::types::{AppConfig, PublishError, PublishResult};
use sqlx::SqlitePool;

/// アプリケーションコンテキスト
///
/// プロセス起動時に一度だけ構築し、Arc経由で全ハンドラに共有する。
/// グローバルなミュータブル状態は持たず、リクエスト間で共有されるのは
/// 接続プールと読み取り専用の設定のみ。
pub struct AppContext {
    pub config: AppConfig,
    pub pool: SqlitePool,
}

impl AppContext {
    pub fn new(config: AppConfig, pool: SqlitePool) -> Self {
        Self { config, pool }
    }

    /// 設定されたトークンとトランスポートで公開クライアントを構築する
    /// リクエストごとに構築し、呼び出し間で状態を共有しない
    pub fn medium_client(&self) -> PublishResult<MediumClient> {
        let token = self
            .config
            .medium_token
            .as_deref()
            .ok_or_else(|| PublishError::auth("Medium APIトークンが設定されていません"))?;

        MediumClient::new(
            token,
            self.config.api_base_url.as_str(),
            self.config.transport.build(),
        )
    }
}
