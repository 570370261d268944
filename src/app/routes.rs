use super::context::AppContext;
use super::error::ApiError;
use crate::domain::article::{
    delete_article, get_article, insert_article, list_articles, parse_tags, update_article,
    ArticleInput, PublishStatus, RemoteMetadata, StoredArticle,
};
use crate::export::{self, ExportFormat};
use crate::types::PublishError;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// アプリケーションのルーターを構築する
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/upload", post(upload_file))
        .route("/save-draft", post(save_draft))
        .route("/history", get(history))
        .route("/article/:id", get(article_by_id))
        .route("/history/:id", delete(delete_from_history))
        .route("/publish", post(publish))
        .route("/export", post(export_download))
        .route("/api-status", get(api_status))
        .with_state(ctx)
}

/// 記事フォームの共通フィールド
/// article_idは空文字列の場合「新規作成」を意味する
#[derive(Debug, Deserialize)]
struct ArticleForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    tags: String,
    #[serde(default = "default_publish_status")]
    publish_status: String,
    #[serde(default)]
    article_id: String,
}

fn default_publish_status() -> String {
    "draft".to_string()
}

/// 空文字列はNone、それ以外は整数IDとして解析する
fn parse_article_id(raw: &str) -> Result<Option<i64>, ApiError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| ApiError::bad_request(format!("article_idが不正です: {}", raw)))
}

/// POST /upload — Markdownファイルのアップロード
/// .md以外のファイルは400で拒否し、本文をUTF-8テキストとして返す
async fn upload_file(mut multipart: Multipart) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("マルチパートの解析に失敗: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.ends_with(".md") {
            return Err(ApiError::bad_request(
                "Markdownファイル(.md)のみアップロードできます",
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("ファイルの読み取りに失敗: {}", e)))?;
        let content = String::from_utf8(bytes.to_vec())
            .map_err(|_| ApiError::bad_request("UTF-8として読み取れないファイルです"))?;

        return Ok(Json(json!({ "content": content, "filename": filename })));
    }

    Err(ApiError::bad_request("fileフィールドがありません"))
}

/// POST /save-draft — 下書きの保存または更新
async fn save_draft(
    State(ctx): State<Arc<AppContext>>,
    Form(form): Form<ArticleForm>,
) -> Result<Json<Value>, ApiError> {
    let status = PublishStatus::parse_form_value(&form.publish_status)?;
    let input = ArticleInput {
        title: form.title,
        content: form.content,
        tags: parse_tags(&form.tags),
        status,
        remote: None,
    };

    let (stored, message) = match parse_article_id(&form.article_id)? {
        Some(id) => (
            update_article(id, &input, &ctx.pool).await?,
            "下書きを更新しました",
        ),
        None => (
            insert_article(&input, &ctx.pool).await?,
            "下書きを保存しました",
        ),
    };

    tracing::info!(article_id = stored.id, "下書きを保存");
    Ok(Json(json!({
        "success": true,
        "message": message,
        "article_id": stored.id,
        "article": stored.article,
    })))
}

/// GET /history — 全記事を新しい順で返す
async fn history(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, ApiError> {
    let articles: Vec<StoredArticle> = list_articles(&ctx.pool).await?;
    Ok(Json(json!({ "articles": articles })))
}

/// GET /article/{id} — 記事を1件取得する
async fn article_by_id(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let stored = get_article(id, &ctx.pool).await?;
    Ok(Json(json!({ "article": stored })))
}

/// DELETE /history/{id} — 記事を履歴から削除する
async fn delete_from_history(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    delete_article(id, &ctx.pool).await?;
    tracing::info!(article_id = id, "記事を削除");
    Ok(Json(json!({
        "success": true,
        "message": "記事を履歴から削除しました",
    })))
}

/// POST /publish — 記事をMediumへ公開し、結果をローカルに反映する
///
/// リモート公開が成功した場合のみ記事レコードを書き換える。
/// 失敗時（タイムアウト含む）はローカルの記事に一切影響しない。
async fn publish(
    State(ctx): State<Arc<AppContext>>,
    Form(form): Form<ArticleForm>,
) -> Result<Json<Value>, ApiError> {
    if !ctx.config.has_token() {
        return Err(ApiError::bad_request(
            "Medium APIトークンが設定されていません",
        ));
    }

    let status = PublishStatus::parse_form_value(&form.publish_status)?;
    let article_id = parse_article_id(&form.article_id)?;
    let tags = parse_tags(&form.tags);

    let client = ctx.medium_client()?;
    let response = client
        .publish_article(
            &form.title,
            &form.content,
            if tags.is_empty() { None } else { Some(&tags) },
            status,
        )
        .await?;

    let remote_id = response["data"]["id"].as_str().ok_or_else(|| {
        ApiError::from(PublishError::protocol(
            "公開レスポンスにdata.idフィールドがありません",
        ))
    })?;
    let remote_url = response["data"]["url"].as_str().ok_or_else(|| {
        ApiError::from(PublishError::protocol(
            "公開レスポンスにdata.urlフィールドがありません",
        ))
    })?;

    // 公開成功後の上書き。ローカルのステータスはpublicになる
    let input = ArticleInput {
        title: form.title,
        content: form.content,
        tags,
        status: PublishStatus::Public,
        remote: Some(RemoteMetadata {
            remote_id: remote_id.to_string(),
            remote_url: remote_url.to_string(),
            published_at: Utc::now(),
        }),
    };
    let stored = match article_id {
        Some(id) => update_article(id, &input, &ctx.pool).await?,
        None => insert_article(&input, &ctx.pool).await?,
    };

    tracing::info!(article_id = stored.id, remote_url, "記事を公開");
    Ok(Json(json!({ "success": true, "response": response })))
}

/// エクスポートフォーム
#[derive(Debug, Deserialize)]
struct ExportForm {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default = "default_export_format")]
    export_format: String,
}

fn default_export_format() -> String {
    "html".to_string()
}

/// POST /export — 記事をファイルとして書き出し、ダウンロードとして返す
async fn export_download(
    State(ctx): State<Arc<AppContext>>,
    Form(form): Form<ExportForm>,
) -> Result<Response, ApiError> {
    let format = ExportFormat::parse_form_value(&form.export_format)?;
    let exported =
        export::export_article(&form.title, &form.content, format, &ctx.config.export_dir)?;

    let bytes = tokio::fs::read(&exported.path)
        .await
        .map_err(|e| ApiError::internal(format!("エクスポートファイルの読み取りに失敗: {}", e)))?;

    tracing::info!(path = %exported.path.display(), "記事をエクスポート");
    let headers = [
        (header::CONTENT_TYPE, exported.media_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", exported.download_name),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// GET /api-status — Medium APIへの疎通確認
async fn api_status(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    if !ctx.config.has_token() {
        return Json(json!({
            "status": "no_token",
            "message": "APIトークンが設定されていません",
        }));
    }

    let probe = async {
        let client = ctx.medium_client()?;
        client.get_user_id().await
    };
    match probe.await {
        Ok(user_id) => Json(json!({
            "status": "working",
            "message": format!("API稼働中 (User ID: {})", user_id),
        })),
        Err(e) => Json(json!({
            "status": "error",
            "message": e.to_string(),
        })),
    }
}
