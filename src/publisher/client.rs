use super::transport::{ApiRequest, HttpMethod, HttpTransport};
use crate::domain::article::PublishStatus;
use crate::types::{PublishError, PublishResult};
use serde_json::{json, Value};

/// Medium APIの薄いクライアント
///
/// 呼び出しごとに独立しており、呼び出し間で状態を共有しない。
/// ユーザーIDのキャッシュも行わず、公開のたびに取得し直す。
pub struct MediumClient {
    token: String,
    base_url: String,
    transport: Box<dyn HttpTransport>,
}

impl MediumClient {
    /// クライアントを作成する。トークンが空の場合は認証エラーを返す。
    pub fn new<T: Into<String>, B: Into<String>>(
        token: T,
        base_url: B,
        transport: Box<dyn HttpTransport>,
    ) -> PublishResult<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(PublishError::auth(
                "Medium APIトークンが設定されていません",
            ));
        }
        Ok(Self {
            token,
            base_url: base_url.into(),
            transport,
        })
    }

    /// 認証付きリクエストを実行し、JSONとして解析したレスポンスを返す
    ///
    /// エラーの翻訳はここで一元化する:
    /// - 401/403 → Auth
    /// - JSONとして解析不能 → Protocol
    /// - その他の非2xx → RemoteRejected（エラーボディのメッセージを抽出）
    async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<Value>,
    ) -> PublishResult<Value> {
        let request = ApiRequest {
            method,
            url: format!("{}{}", self.base_url, endpoint),
            token: self.token.clone(),
            body,
        };

        let response = self.transport.execute(&request).await?;

        // 認証拒否はボディがJSONでない場合もあるため先に判定する
        if response.status == 401 || response.status == 403 {
            return Err(PublishError::auth(format!(
                "トークンが拒否されました (status={}): {}",
                response.status,
                response.body.trim()
            )));
        }

        let value: Value = serde_json::from_str(&response.body).map_err(|_| {
            PublishError::protocol(format!("不正なJSONレスポンス: {}", response.body.trim()))
        })?;

        if !(200..300).contains(&response.status) {
            return Err(PublishError::remote_rejected(
                response.status,
                extract_error_message(&value),
            ));
        }

        Ok(value)
    }

    /// 認証中ユーザーのIDを取得する
    /// レスポンスボディの `data.id` フィールドを抽出する
    pub async fn get_user_id(&self) -> PublishResult<String> {
        let response = self.request(HttpMethod::Get, "/me", None).await?;

        response["data"]["id"]
            .as_str()
            .map(|id| id.to_string())
            .ok_or_else(|| {
                PublishError::protocol(format!(
                    "レスポンスにdata.idフィールドがありません: {}",
                    response
                ))
            })
    }

    /// 記事をMediumに公開する
    ///
    /// タイトル・本文の検証に失敗した場合、リモート呼び出しは一切行わない。
    /// 成功時はレスポンス（期待形: `{"data": {"id": ..., "url": ...}}`）を
    /// そのまま返す。
    pub async fn publish_article(
        &self,
        title: &str,
        content: &str,
        tags: Option<&[String]>,
        publish_status: PublishStatus,
    ) -> PublishResult<Value> {
        if title.is_empty() || content.is_empty() {
            return Err(PublishError::validation(
                "タイトルと本文は必須です",
            ));
        }

        let user_id = self.get_user_id().await?;

        let mut payload = json!({
            "title": title,
            "contentFormat": "markdown",
            "content": content,
            "publishStatus": publish_status.as_str(),
        });
        if let Some(tags) = tags {
            if !tags.is_empty() {
                payload["tags"] = json!(tags);
            }
        }

        self.request(
            HttpMethod::Post,
            &format!("/users/{}/posts", user_id),
            Some(payload),
        )
        .await
    }

    /// 認証中ユーザーのパブリケーション一覧を取得する
    pub async fn get_user_publications(&self) -> PublishResult<Value> {
        let user_id = self.get_user_id().await?;
        self.request(
            HttpMethod::Get,
            &format!("/users/{}/publications", user_id),
            None,
        )
        .await
    }
}

/// エラーボディからメッセージを抽出する
/// Medium APIは `{"errors": [{"message": ..., "code": ...}]}` 形式を返す
fn extract_error_message(value: &Value) -> String {
    value["errors"][0]["message"]
        .as_str()
        .map(|m| m.to_string())
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::transport::MockTransport;
    use std::sync::Arc;

    /// モックへの参照を保持したままクライアントを構築する
    fn client_with_mock() -> (MediumClient, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::new());
        let client = MediumClient::new(
            "test-token",
            "https://api.example.com/v1",
            Box::new(mock.clone()),
        )
        .expect("クライアント作成に失敗");
        (client, mock)
    }

    #[test]
    fn test_empty_token_is_auth_error() {
        let result = MediumClient::new("", "https://api.example.com/v1", Box::new(MockTransport::new()));
        assert!(matches!(result, Err(PublishError::Auth { .. })));
    }

    #[tokio::test]
    async fn test_get_user_id_success() {
        let (client, mock) = client_with_mock();
        mock.push_success(200, r#"{"data":{"id":"user123","username":"taro"}}"#);

        let user_id = client.get_user_id().await.unwrap();
        assert_eq!(user_id, "user123");

        // /meエンドポイントへのGETが1回だけ発行される
        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://api.example.com/v1/me");
        assert_eq!(requests[0].token, "test-token");
    }

    #[tokio::test]
    async fn test_get_user_id_missing_field_is_protocol_error() {
        let (client, mock) = client_with_mock();
        mock.push_success(200, r#"{"data":{"username":"taro"}}"#);

        let result = client.get_user_id().await;
        assert!(matches!(result, Err(PublishError::Protocol { .. })));
    }

    #[tokio::test]
    async fn test_get_user_id_invalid_json_is_protocol_error() {
        let (client, mock) = client_with_mock();
        mock.push_success(200, "<html>Attention Required! | Cloudflare</html>");

        let result = client.get_user_id().await;
        assert!(matches!(result, Err(PublishError::Protocol { .. })));
    }

    #[tokio::test]
    async fn test_get_user_id_rejected_token_is_auth_error() {
        let (client, mock) = client_with_mock();
        mock.push_success(
            401,
            r#"{"errors":[{"message":"Token was invalid.","code":6003}]}"#,
        );

        let result = client.get_user_id().await;
        assert!(matches!(result, Err(PublishError::Auth { .. })));
    }

    #[tokio::test]
    async fn test_publish_empty_title_fails_without_remote_call() {
        let (client, mock) = client_with_mock();

        let result = client
            .publish_article("", "x", None, PublishStatus::Draft)
            .await;
        assert!(matches!(result, Err(PublishError::Validation { .. })));
        assert_eq!(mock.call_count(), 0, "リモート呼び出しは発生しないべき");
    }

    #[tokio::test]
    async fn test_publish_empty_content_fails_without_remote_call() {
        let (client, mock) = client_with_mock();

        let result = client
            .publish_article("タイトル", "", None, PublishStatus::Draft)
            .await;
        assert!(matches!(result, Err(PublishError::Validation { .. })));
        assert_eq!(mock.call_count(), 0, "リモート呼び出しは発生しないべき");
    }

    #[tokio::test]
    async fn test_publish_success_returns_payload() {
        let (client, mock) = client_with_mock();
        mock.push_success(200, r#"{"data":{"id":"user123"}}"#);
        mock.push_success(
            201,
            r#"{"data":{"id":"abc","url":"http://x","publishStatus":"public"}}"#,
        );

        let tags = vec!["rust".to_string(), "web".to_string()];
        let response = client
            .publish_article("記事タイトル", "本文", Some(&tags), PublishStatus::Public)
            .await
            .unwrap();

        assert_eq!(response["data"]["id"], "abc");
        assert_eq!(response["data"]["url"], "http://x");

        // getUserId → postの2段階で呼び出される
        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].url,
            "https://api.example.com/v1/users/user123/posts"
        );
        let payload = requests[1].body.as_ref().unwrap();
        assert_eq!(payload["title"], "記事タイトル");
        assert_eq!(payload["contentFormat"], "markdown");
        assert_eq!(payload["publishStatus"], "public");
        assert_eq!(payload["tags"], serde_json::json!(["rust", "web"]));
    }

    #[tokio::test]
    async fn test_publish_omits_tags_when_absent() {
        let (client, mock) = client_with_mock();
        mock.push_success(200, r#"{"data":{"id":"user123"}}"#);
        mock.push_success(201, r#"{"data":{"id":"abc","url":"http://x"}}"#);

        client
            .publish_article("記事", "本文", None, PublishStatus::Draft)
            .await
            .unwrap();

        let payload = mock.recorded_requests()[1].body.clone().unwrap();
        assert!(payload.get("tags").is_none(), "tagsは省略されるべき");
        assert_eq!(payload["publishStatus"], "draft");
    }

    #[tokio::test]
    async fn test_publish_remote_rejection() {
        let (client, mock) = client_with_mock();
        mock.push_success(200, r#"{"data":{"id":"user123"}}"#);
        mock.push_success(
            400,
            r#"{"errors":[{"message":"Content is too long.","code":2004}]}"#,
        );

        let result = client
            .publish_article("記事", "本文", None, PublishStatus::Public)
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
    async fn test_publish_timeout_surfaces_as_transport_error() {
        let (client, mock) = client_with_mock();
        mock.push_error(PublishError::timeout());

        let result = client
            .publish_article("記事", "本文", None, PublishStatus::Public)
            .await;
        match result {
            Err(PublishError::Transport { message }) => assert_eq!(message, "timeout"),
            other => panic!("Transportエラーが期待されるが: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_get_user_publications() {
        let (client, mock) = client_with_mock();
        mock.push_success(200, r#"{"data":{"id":"user123"}}"#);
        mock.push_success(200, r#"{"data":[{"id":"pub1","name":"My Publication"}]}"#);

        let response = client.get_user_publications().await.unwrap();
        assert_eq!(response["data"][0]["id"], "pub1");
        assert_eq!(
            mock.recorded_requests()[1].url,
            "https://api.example.com/v1/users/user123/publications"
        );
    }
}
