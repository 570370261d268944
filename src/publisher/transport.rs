use crate::types::{PublishError, PublishResult};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::process::Command;

/// リモートAPI呼び出しのタイムアウト（秒）
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTPメソッド（このクライアントで使用するもののみ）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// トランスポートに渡すリクエスト
/// 呼び出しごとに完結し、トランスポート側に状態を持たせない
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Bearerトークン
    pub token: String,
    /// JSONボディ（GETの場合はNone）
    pub body: Option<serde_json::Value>,
}

/// トランスポートからの生レスポンス
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// HTTPトランスポートの抽象化トレイト
///
/// このトレイトは、インプロセスのHTTPクライアント・サブプロセス経由の
/// curl実行・テスト用モックを統一的に扱うためのインターフェースです。
/// エラーの意味付け（認証・プロトコル等）は行わず、通信の成否のみを報告します。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// リクエストを実行し、ステータスコードとボディを返す
    async fn execute(&self, request: &ApiRequest) -> PublishResult<ApiResponse>;
}

// Arc越しの共有を可能にする（テストでモックへの参照を保持するため）
#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn execute(&self, request: &ApiRequest) -> PublishResult<ApiResponse> {
        (**self).execute(request).await
    }
}

/// 使用するトランスポートの種別（設定で選択する）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// インプロセスのreqwestクライアント（デフォルト）
    #[default]
    Reqwest,
    /// サブプロセスでcurlを起動する（ボット対策のあるエンドポイント向け）
    Curl,
}

impl TransportKind {
    /// 種別に対応するトランスポート実装を構築する
    pub fn build(&self) -> Box<dyn HttpTransport> {
        match self {
            Self::Reqwest => Box::new(ReqwestTransport::new()),
            Self::Curl => Box::new(CurlTransport::new()),
        }
    }
}

impl FromStr for TransportKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reqwest" => Ok(Self::Reqwest),
            "curl" => Ok(Self::Curl),
            _ => Err(()),
        }
    }
}

/// `reqwest` を使用した本番用のHTTPトランスポート実装
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// 新しいトランスポートを作成
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> PublishResult<ApiResponse> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        let mut builder = builder
            .bearer_auth(&request.token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS));

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                PublishError::timeout()
            } else {
                PublishError::transport(format!("HTTPリクエストの送信に失敗: {}", e))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PublishError::transport(format!("レスポンスボディの取得に失敗: {}", e)))?;

        Ok(ApiResponse { status, body })
    }
}

/// サブプロセスでcurlを起動するトランスポート実装
///
/// 対象APIのエッジネットワークが一般的なHTTPクライアントライブラリからの
/// リクエストを拒否する場合のフォールバック。curlの標準出力をボディとして
/// 取り込み、末尾に `-w` で付加したステータスコード行を解析する。
pub struct CurlTransport {
    /// 起動するコマンド名（テストで差し替え可能）
    command: String,
}

impl CurlTransport {
    /// 新しいcurlトランスポートを作成
    pub fn new() -> Self {
        Self {
            command: "curl".to_string(),
        }
    }

    /// コマンド名を指定して作成（テスト用）
    pub fn with_command<C: Into<String>>(command: C) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// リクエストからcurlの引数リストを構築する
    fn build_args(request: &ApiRequest) -> PublishResult<Vec<String>> {
        let mut args = vec![
            "-s".to_string(),
            "-H".to_string(),
            format!("Authorization: Bearer {}", request.token),
            "-H".to_string(),
            "Content-Type: application/json".to_string(),
            "-X".to_string(),
            request.method.as_str().to_string(),
            "--max-time".to_string(),
            REQUEST_TIMEOUT_SECS.to_string(),
            // ボディの後に改行区切りでステータスコードを出力させる
            "-w".to_string(),
            "\n%{http_code}".to_string(),
        ];

        if let Some(body) = &request.body {
            let payload = serde_json::to_string(body).map_err(|e| {
                PublishError::protocol(format!("リクエストボディのシリアライズに失敗: {}", e))
            })?;
            args.push("-d".to_string());
            args.push(payload);
        }

        args.push(request.url.clone());
        Ok(args)
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for CurlTransport {
    async fn execute(&self, request: &ApiRequest) -> PublishResult<ApiResponse> {
        let args = Self::build_args(request)?;

        let output = tokio::time::timeout(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            Command::new(&self.command).args(&args).output(),
        )
        .await
        .map_err(|_| PublishError::timeout())?
        .map_err(|e| PublishError::transport(format!("curlの起動に失敗: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PublishError::transport(format!(
                "curlリクエストが失敗しました: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        // 最終行がステータスコード、それ以前がレスポンスボディ
        let (body, status_line) = stdout.rsplit_once('\n').ok_or_else(|| {
            PublishError::transport(format!("curlの出力を解析できません: {}", stdout))
        })?;
        let status: u16 = status_line.trim().parse().map_err(|_| {
            PublishError::transport(format!(
                "curlの出力からステータスコードを取得できません: {}",
                status_line
            ))
        })?;

        Ok(ApiResponse {
            status,
            body: body.to_string(),
        })
    }
}

/// テスト用のモックトランスポート
///
/// 実際のHTTP通信を行わず、事前に積んだレスポンス（またはエラー）を
/// 呼び出し順に返します。呼び出し回数と受け取ったリクエストを記録するため、
/// 「リモート呼び出しが発生しなかったこと」の検証にも使えます。
pub struct MockTransport {
    responses: Mutex<VecDeque<PublishResult<ApiResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
    calls: AtomicUsize,
}

impl MockTransport {
    /// 応答が空のモックトランスポートを作成
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// 成功レスポンスをキューに追加
    pub fn push_success(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse {
                status,
                body: body.to_string(),
            }));
    }

    /// エラーをキューに追加
    pub fn push_error(&self, error: PublishError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// これまでの呼び出し回数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 受け取ったリクエストのコピー
    pub fn recorded_requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: &ApiRequest) -> PublishResult<ApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(PublishError::transport(
                    "モック応答が設定されていません".to_string(),
                ))
            })
    }
}
