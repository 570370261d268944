//! Medium API モックサーバー経由の公開クライアント統合テスト
//!
//! httpmockを使用してMedium APIをモックし、外部通信を完全に遮断した
//! 環境でReqwestTransport + MediumClientの実際のHTTP経路を検証します。

use httpmock::prelude::*;
use markpub::domain::article::PublishStatus;
use markpub::publisher::{MediumClient, ReqwestTransport};
use markpub::types::PublishError;
use serde_json::json;

/// Medium APIのモックサーバー
struct MediumMockServer {
    server: MockServer,
}

impl MediumMockServer {
    fn start() -> Self {
        Self {
            server: MockServer::start(),
        }
    }

    /// モックサーバーをベースURLとしたクライアントを作成
    fn client(&self, token: &str) -> MediumClient {
        MediumClient::new(
            token,
            self.server.url(""),
            Box::new(ReqwestTransport::new()),
        )
        .expect("クライアント作成に失敗")
    }

    /// /meの成功レスポンスをモック
    fn mock_me_success(&self, user_id: &str) {
        self.server.mock(|when, then| {
            when.method(GET)
                .path("/me")
                .header("authorization", "Bearer test-token");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "data": {
                        "id": user_id,
                        "username": "taro",
                        "url": "https://medium.com/@taro"
                    }
                }));
        });
    }

    /// /meのトークン拒否をモック
    fn mock_me_rejected(&self) {
        self.server.mock(|when, then| {
            when.method(GET).path("/me");
            then.status(401)
                .header("content-type", "application/json")
                .json_body(json!({
                    "errors": [{"message": "Token was invalid.", "code": 6003}]
                }));
        });
    }

    /// 投稿作成の成功をモック
    fn mock_post_success(&self, user_id: &str, post_id: &str, url: &str) {
        self.server.mock(|when, then| {
            when.method(POST)
                .path(format!("/users/{}/posts", user_id))
                .header("authorization", "Bearer test-token")
                .header("content-type", "application/json");
            then.status(201)
                .header("content-type", "application/json")
                .json_body(json!({
                    "data": {
                        "id": post_id,
                        "url": url,
                        "publishStatus": "public"
                    }
                }));
        });
    }

    /// 投稿作成のアプリケーションエラーをモック
    fn mock_post_rejected(&self, user_id: &str, message: &str) {
        self.server.mock(|when, then| {
            when.method(POST).path(format!("/users/{}/posts", user_id));
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({
                    "errors": [{"message": message, "code": 2004}]
                }));
        });
    }
}

#[tokio::test]
async fn test_get_user_id_via_http() {
    let mock_server = MediumMockServer::start();
    mock_server.mock_me_success("user123");

    let client = mock_server.client("test-token");
    let user_id = client.get_user_id().await.unwrap();

    assert_eq!(user_id, "user123");
    println!("✅ HTTP経由のユーザーID取得テスト成功");
}

#[tokio::test]
async fn test_rejected_token_is_auth_error_via_http() {
    let mock_server = MediumMockServer::start();
    mock_server.mock_me_rejected();

    let client = mock_server.client("test-token");
    let result = client.get_user_id().await;

    assert!(matches!(result, Err(PublishError::Auth { .. })));
}

#[tokio::test]
async fn test_publish_article_via_http() {
    let mock_server = MediumMockServer::start();
    mock_server.mock_me_success("user123");
    mock_server.mock_post_success("user123", "abc", "http://x");

    let client = mock_server.client("test-token");
    let tags = vec!["rust".to_string()];
    let response = client
        .publish_article("テスト記事", "# 本文", Some(&tags), PublishStatus::Public)
        .await
        .unwrap();

    assert_eq!(response["data"]["id"], "abc");
    assert_eq!(response["data"]["url"], "http://x");
    println!("✅ HTTP経由の記事公開テスト成功");
}

#[tokio::test]
async fn test_publish_remote_rejection_via_http() {
    let mock_server = MediumMockServer::start();
    mock_server.mock_me_success("user123");
    mock_server.mock_post_rejected("user123", "Content is too long.");

    let client = mock_server.client("test-token");
    let result = client
        .publish_article("テスト記事", "本文", None, PublishStatus::Public)
        .await;

    match result {
        Err(PublishError::RemoteRejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Content is too long.");
        }
        other => panic!("RemoteRejectedが期待されるが: {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_non_json_body_is_protocol_error_via_http() {
    let mock_server = MediumMockServer::start();
    mock_server.server.mock(|when, then| {
        when.method(GET).path("/me");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html>Attention Required! | Cloudflare</html>");
    });

    let client = mock_server.client("test-token");
    let result = client.get_user_id().await;

    assert!(matches!(result, Err(PublishError::Protocol { .. })));
}
