//! アプリケーション層
//!
//! HTTPハンドラと、起動時に一度だけ構築されるアプリケーションコンテキストを
//! 提供します。各ハンドラは独立・ステートレスで、ストアと公開クライアントへの
//! 直接の委譲のみを行います。

pub mod context;
pub mod error;
pub mod routes;

pub use context::AppContext;
pub use error::ApiError;
pub use routes::router;
