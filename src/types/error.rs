use thiserror::Error;

/// 記事ストアのエラー型
/// ローカルの記事テーブルに対する操作で発生するエラーを定義
#[derive(Error, Debug)]
pub enum StoreError {
    /// 指定されたIDの記事が存在しない
    #[error("記事が見つかりません: id={id}")]
    NotFound { id: i64 },

    /// データベース関連のエラー
    #[error("データベースエラー: {operation} - {source}")]
    Database {
        operation: String,
        #[source]
        source: sqlx::Error,
    },

    /// JSONシリアライゼーション/デシリアライゼーションエラー
    #[error("JSON処理エラー: {context} - {source}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// データベース上のステータス値が不正
    #[error("不正な公開ステータス値です: {value}")]
    InvalidStatus { value: String },
}

impl StoreError {
    /// NotFoundエラーを作成
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// データベースエラーを作成
    pub fn database<O: Into<String>>(operation: O, source: sqlx::Error) -> Self {
        Self::Database {
            operation: operation.into(),
            source,
        }
    }

    /// JSON処理エラーを作成
    pub fn serialization<C: Into<String>>(context: C, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// 不正ステータスエラーを作成
    pub fn invalid_status<V: Into<String>>(value: V) -> Self {
        Self::InvalidStatus {
            value: value.into(),
        }
    }
}

/// ストアエラーのResult型エイリアス
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// 公開クライアントのエラー型
/// リモートAPIとのやり取りで発生するエラーを分類して定義
#[derive(Error, Debug)]
pub enum PublishError {
    /// 入力値の検証エラー（タイトル欠落など、リモート呼び出し前に検出）
    #[error("入力値が不正です: {message}")]
    Validation { message: String },

    /// 認証エラー（トークン未設定・無効）
    #[error("認証エラー: {message}")]
    Auth { message: String },

    /// 通信エラー（ネットワーク障害・タイムアウト）
    #[error("通信エラー: {message}")]
    Transport { message: String },

    /// プロトコルエラー（JSONとして解析できない・期待フィールド欠落）
    #[error("レスポンス解析エラー: {message}")]
    Protocol { message: String },

    /// リモートAPIがアプリケーションレベルのエラーを返した
    #[error("リモートAPIエラー (status={status}): {message}")]
    RemoteRejected { status: u16, message: String },
}

impl PublishError {
    /// 検証エラーを作成
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// 認証エラーを作成
    pub fn auth<M: Into<String>>(message: M) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// 通信エラーを作成
    pub fn transport<M: Into<String>>(message: M) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// タイムアウトによる通信エラーを作成
    pub fn timeout() -> Self {
        Self::Transport {
            message: "timeout".to_string(),
        }
    }

    /// プロトコルエラーを作成
    pub fn protocol<M: Into<String>>(message: M) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// リモート拒否エラーを作成
    pub fn remote_rejected<M: Into<String>>(status: u16, message: M) -> Self {
        Self::RemoteRejected {
            status,
            message: message.into(),
        }
    }
}

/// 公開クライアントエラーのResult型エイリアス
pub type PublishResult<T> = std::result::Result<T, PublishError>;
