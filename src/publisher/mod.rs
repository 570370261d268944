//! 公開クライアント
//!
//! Medium APIを薄くラップするクライアントと、その下で使う
//! 差し替え可能なHTTPトランスポート（reqwest / curlサブプロセス）を提供します。

pub mod client;
pub mod transport;

pub use client::MediumClient;
pub use transport::{
    ApiRequest, ApiResponse, CurlTransport, HttpMethod, HttpTransport, MockTransport,
    ReqwestTransport, TransportKind, REQUEST_TIMEOUT_SECS,
};
