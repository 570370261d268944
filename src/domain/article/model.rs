use crate::types::{PublishError, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// 記事の公開ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    /// 下書き（未公開）
    #[default]
    Draft,
    /// 限定公開
    Unlisted,
    /// 公開済み
    Public,
}

impl PublishStatus {
    /// データベース・APIペイロード用の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Unlisted => "unlisted",
            Self::Public => "public",
        }
    }

    /// フォーム入力の文字列からステータスを解析する
    /// 不正な値はValidationエラーとして呼び出し元に返す
    pub fn parse_form_value(value: &str) -> Result<Self, PublishError> {
        value.parse().map_err(|_| {
            PublishError::validation(format!(
                "publish_statusは draft / unlisted / public のいずれかを指定してください: {}",
                value
            ))
        })
    }
}

impl FromStr for PublishStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "unlisted" => Ok(Self::Unlisted),
            "public" => Ok(Self::Public),
            other => Err(StoreError::invalid_status(other)),
        }
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// リモート公開成功時にのみ付与されるメタデータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMetadata {
    /// リモートAPI側で割り当てられた記事ID
    pub remote_id: String,
    /// 公開された記事のURL
    pub remote_url: String,
    /// 公開日時
    pub published_at: DateTime<Utc>,
}

// ストアへの書き込み入力（IDとタイムスタンプはストア側で付与する）
#[derive(Debug, Clone, Default)]
pub struct ArticleInput {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub status: PublishStatus,
    /// 公開操作の場合のみ設定。保存時はNoneでリモートメタデータを消去する
    pub remote: Option<RemoteMetadata>,
}

// 記事エンティティ（ストアに永続化される完全な表現）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub publish_status: PublishStatus,
    /// contentから導出される単語数。独立に保持せず、書き込みの度に再計算する
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

// ストア割り当てIDを付与した記事（list/getの戻り値）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: i64,
    #[serde(flatten)]
    pub article: Article,
}

impl Article {
    /// 公開済み（リモートメタデータが付与済み）かどうかを判定
    pub fn is_published(&self) -> bool {
        self.remote_id.is_some()
    }

    /// 一覧表示の並び順を決めるキー（新しい順）
    /// updated_atは公開を含む全ての変更で更新されるため、常にこれが最新を表す
    pub fn recency_key(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl StoredArticle {
    /// 一覧ソート用の比較キー
    pub fn recency_key(&self) -> DateTime<Utc> {
        self.article.recency_key()
    }
}

/// contentの単語数を計算する（空白区切りのトークン数）
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// カンマ区切りのタグ文字列をタグのリストに変換する
/// 前後の空白を除去し、空要素は捨てる。重複排除は行わない
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(|tag| tag.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ドメインロジック・振る舞い系テスト
    mod domain {
        use super::*;

        #[test]
        fn test_word_count() {
            assert_eq!(word_count("hello world"), 2);
            assert_eq!(word_count(""), 0);
            assert_eq!(word_count("   "), 0);
            assert_eq!(word_count("# 見出し\n\n本文 テキスト"), 4);

            println!("✅ 単語数計算テスト成功");
        }

        #[test]
        fn test_parse_tags() {
            assert_eq!(parse_tags("rust, web , api"), vec!["rust", "web", "api"]);
            assert_eq!(parse_tags(""), Vec::<String>::new());
            assert_eq!(parse_tags(" , ,"), Vec::<String>::new());
            // 重複排除は行わない
            assert_eq!(parse_tags("rust,rust"), vec!["rust", "rust"]);

            println!("✅ タグ解析テスト成功");
        }

        #[test]
        fn test_publish_status_parse() {
            assert_eq!("draft".parse::<PublishStatus>().unwrap(), PublishStatus::Draft);
            assert_eq!(
                "unlisted".parse::<PublishStatus>().unwrap(),
                PublishStatus::Unlisted
            );
            assert_eq!(
                "public".parse::<PublishStatus>().unwrap(),
                PublishStatus::Public
            );

            let result = "invalid".parse::<PublishStatus>();
            assert!(result.is_err(), "不正なステータスでエラーにならなかった");

            // フォーム入力の解析はValidationエラーとして返る
            let result = PublishStatus::parse_form_value("invalid");
            assert!(matches!(result, Err(PublishError::Validation { .. })));

            println!("✅ 公開ステータス解析テスト成功");
        }

        #[test]
        fn test_publish_status_roundtrip() {
            for status in [
                PublishStatus::Draft,
                PublishStatus::Unlisted,
                PublishStatus::Public,
            ] {
                let parsed: PublishStatus = status.as_str().parse().unwrap();
                assert_eq!(parsed, status);
            }
        }

        #[test]
        fn test_is_published() {
            let now = Utc::now();
            let draft = Article {
                title: "下書き記事".to_string(),
                content: "本文".to_string(),
                tags: vec![],
                publish_status: PublishStatus::Draft,
                word_count: 1,
                created_at: now,
                updated_at: now,
                remote_id: None,
                remote_url: None,
                published_at: None,
            };
            assert!(!draft.is_published());

            let published = Article {
                publish_status: PublishStatus::Public,
                remote_id: Some("abc".to_string()),
                remote_url: Some("http://x".to_string()),
                published_at: Some(now),
                ..draft.clone()
            };
            assert!(published.is_published());

            println!("✅ 公開状態判定テスト成功");
        }
    }
}
