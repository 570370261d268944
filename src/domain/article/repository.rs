use super::model::{word_count, Article, ArticleInput, PublishStatus, StoredArticle};
use crate::types::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

// articlesテーブルの行表現（tagsはJSON文字列のまま保持する）
#[derive(Debug, Clone, FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    content: String,
    tags: String,
    publish_status: String,
    word_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    remote_id: Option<String>,
    remote_url: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

impl TryFrom<ArticleRow> for StoredArticle {
    type Error = StoreError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let tags: Vec<String> = serde_json::from_str(&row.tags)
            .map_err(|e| StoreError::serialization("tagsカラムの解析", e))?;
        let publish_status: PublishStatus = row.publish_status.parse()?;

        Ok(StoredArticle {
            id: row.id,
            article: Article {
                title: row.title,
                content: row.content,
                tags,
                publish_status,
                word_count: row.word_count as usize,
                created_at: row.created_at,
                updated_at: row.updated_at,
                remote_id: row.remote_id,
                remote_url: row.remote_url,
                published_at: row.published_at,
            },
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, title, content, tags, publish_status, word_count, \
     created_at, updated_at, remote_id, remote_url, published_at FROM articles";

/// 記事をテーブルに新規挿入する。
/// IDはストアが採番し、created_at/updated_atは現在時刻で初期化される。
/// word_countは常にcontentから再計算する。
pub async fn insert_article(input: &ArticleInput, pool: &SqlitePool) -> StoreResult<StoredArticle> {
    let now = Utc::now();
    let tags_json = serde_json::to_string(&input.tags)
        .map_err(|e| StoreError::serialization("tagsのJSONシリアライズ", e))?;
    let words = word_count(&input.content) as i64;

    let result = sqlx::query(
        r#"
        INSERT INTO articles
            (title, content, tags, publish_status, word_count,
             created_at, updated_at, remote_id, remote_url, published_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(&tags_json)
    .bind(input.status.as_str())
    .bind(words)
    .bind(now)
    .bind(now)
    .bind(input.remote.as_ref().map(|r| r.remote_id.as_str()))
    .bind(input.remote.as_ref().map(|r| r.remote_url.as_str()))
    .bind(input.remote.as_ref().map(|r| r.published_at))
    .execute(pool)
    .await
    .map_err(|e| StoreError::database("記事の挿入", e))?;

    let id = result.last_insert_rowid();
    get_article(id, pool).await
}

/// 既存記事を上書き更新する。
/// id/created_at以外の全フィールドを置き換え、updated_atを現在時刻に更新する。
/// 入力にリモートメタデータが無い場合、既存のリモートメタデータは消去される。
pub async fn update_article(
    id: i64,
    input: &ArticleInput,
    pool: &SqlitePool,
) -> StoreResult<StoredArticle> {
    let now = Utc::now();
    let tags_json = serde_json::to_string(&input.tags)
        .map_err(|e| StoreError::serialization("tagsのJSONシリアライズ", e))?;
    let words = word_count(&input.content) as i64;

    let result = sqlx::query(
        r#"
        UPDATE articles SET
            title = ?, content = ?, tags = ?, publish_status = ?, word_count = ?,
            updated_at = ?, remote_id = ?, remote_url = ?, published_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(&tags_json)
    .bind(input.status.as_str())
    .bind(words)
    .bind(now)
    .bind(input.remote.as_ref().map(|r| r.remote_id.as_str()))
    .bind(input.remote.as_ref().map(|r| r.remote_url.as_str()))
    .bind(input.remote.as_ref().map(|r| r.published_at))
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| StoreError::database("記事の更新", e))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found(id));
    }

    get_article(id, pool).await
}

/// 指定IDの記事を取得する。存在しない場合はNotFoundを返す。
pub async fn get_article(id: i64, pool: &SqlitePool) -> StoreResult<StoredArticle> {
    let query = format!("{} WHERE id = ?", SELECT_COLUMNS);
    let row: Option<ArticleRow> = sqlx::query_as(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::database("記事の取得", e))?;

    match row {
        Some(row) => row.try_into(),
        None => Err(StoreError::not_found(id)),
    }
}

/// 全記事をID付きで取得し、更新日時の新しい順に並べて返す。
pub async fn list_articles(pool: &SqlitePool) -> StoreResult<Vec<StoredArticle>> {
    let rows: Vec<ArticleRow> = sqlx::query_as(SELECT_COLUMNS)
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::database("記事一覧の取得", e))?;

    let mut articles = rows
        .into_iter()
        .map(StoredArticle::try_from)
        .collect::<StoreResult<Vec<_>>>()?;

    // ストレージ順を保ったまま新しい順にソート（同時刻は安定）
    articles.sort_by(|a, b| b.recency_key().cmp(&a.recency_key()));
    Ok(articles)
}

/// 指定IDの記事を完全に削除する。存在しない場合はNotFoundを返す。
/// ソフトデリートは行わない。
pub async fn delete_article(id: i64, pool: &SqlitePool) -> StoreResult<()> {
    let result = sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| StoreError::database("記事の削除", e))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found(id));
    }
    Ok(())
}
