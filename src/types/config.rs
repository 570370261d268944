use crate::publisher::transport::TransportKind;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// 設定関連のエラー型
/// 環境変数、設定値の検証など設定に関するエラーを定義
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 環境変数が見つからない
    #[error("環境変数が見つかりません: {name}")]
    MissingEnvironmentVariable { name: String },

    /// 設定値が不正
    #[error("設定値が不正です: {reason}")]
    InvalidValue { reason: String },
}

impl ConfigError {
    /// 環境変数不足エラーを作成
    pub fn missing_env_var<N: Into<String>>(name: N) -> Self {
        Self::MissingEnvironmentVariable { name: name.into() }
    }

    /// 不正な設定値エラーを作成
    pub fn invalid_value<R: Into<String>>(reason: R) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }
}

/// 設定エラーのResult型エイリアス
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// MediumのAPIベースURL（本番）
pub const DEFAULT_API_BASE_URL: &str = "https://api.medium.com/v1";

/// アプリケーション設定
/// プロセス起動時に一度だけ環境変数から構築し、AppContext経由で各ハンドラに渡す
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Medium APIトークン（未設定の場合は公開系エンドポイントが無効になる）
    pub medium_token: Option<String>,
    /// SQLiteデータベースの接続URL
    pub database_url: String,
    /// Medium APIのベースURL（テスト時に差し替え可能）
    pub api_base_url: String,
    /// 使用するHTTPトランスポートの種別
    pub transport: TransportKind,
    /// エクスポートファイルの出力先ディレクトリ
    pub export_dir: PathBuf,
    /// HTTPサーバのバインドアドレス
    pub bind_addr: String,
}

impl AppConfig {
    /// 環境変数からアプリケーション設定を構築する
    /// .envファイルは呼び出し側（main）でdotenvyにより読み込み済みであること
    pub fn from_env() -> ConfigResult<Self> {
        let medium_token = env::var("MEDIUM_TOKEN").ok().filter(|t| !t.is_empty());

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/articles.db".to_string());

        let api_base_url =
            env::var("MEDIUM_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let transport = match env::var("MEDIUM_TRANSPORT") {
            Ok(value) => value.parse().map_err(|_| {
                ConfigError::invalid_value(format!(
                    "MEDIUM_TRANSPORTは reqwest / curl のいずれかを指定してください: {}",
                    value
                ))
            })?,
            Err(_) => TransportKind::Reqwest,
        };

        let export_dir = env::var("EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("exports"));

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        Ok(Self {
            medium_token,
            database_url,
            api_base_url,
            transport,
            export_dir,
            bind_addr,
        })
    }

    /// 公開系エンドポイントが利用可能かどうか（トークンが設定されているか）
    pub fn has_token(&self) -> bool {
        self.medium_token.is_some()
    }
}
