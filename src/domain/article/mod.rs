//! 記事ドメイン
//!
//! 記事エンティティの定義とローカルストア（articlesテーブル）への
//! CRUD操作を提供します。

pub mod model;
pub mod repository;

pub use model::{
    parse_tags, word_count, Article, ArticleInput, PublishStatus, RemoteMetadata, StoredArticle,
};
pub use repository::{
    delete_article, get_article, insert_article, list_articles, update_article,
};
