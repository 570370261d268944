//! 記事エクスポート
//!
//! 記事をHTML / Markdown / プレーンテキストのファイルとして
//! エクスポートディレクトリに書き出します。リモート公開とは独立した機能です。

use crate::types::PublishError;
use anyhow::{Context, Result};
use chrono::Utc;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex_lite::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// エクスポート形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Markdown,
    Txt,
}

impl ExportFormat {
    /// ファイル拡張子
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "md",
            Self::Txt => "txt",
        }
    }

    /// ダウンロードレスポンスのContent-Type
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Markdown => "text/markdown",
            Self::Txt => "text/plain",
        }
    }

    /// フォーム入力の文字列から形式を解析する
    pub fn parse_form_value(value: &str) -> Result<Self, PublishError> {
        value.parse().map_err(|_| {
            PublishError::validation(format!("サポートされていないエクスポート形式です: {}", value))
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(Self::Html),
            "markdown" => Ok(Self::Markdown),
            "txt" => Ok(Self::Txt),
            _ => Err(()),
        }
    }
}

/// エクスポートされたファイルの情報（ダウンロードレスポンス用）
#[derive(Debug, Clone)]
pub struct ExportedFile {
    /// 書き出されたファイルのパス
    pub path: PathBuf,
    /// ダウンロード時のファイル名（タイムスタンプなし）
    pub download_name: String,
    /// Content-Type
    pub media_type: &'static str,
}

/// 記事を指定形式でエクスポートディレクトリに書き出す
///
/// ファイル名は `{サニタイズ済みタイトル}_{YYYYmmdd_HHMMSS}.{拡張子}`。
pub fn export_article(
    title: &str,
    content: &str,
    format: ExportFormat,
    export_dir: &Path,
) -> Result<ExportedFile> {
    fs::create_dir_all(export_dir).with_context(|| {
        format!(
            "エクスポートディレクトリの作成に失敗: {}",
            export_dir.display()
        )
    })?;

    let safe_title = sanitize_title(title);
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("{}_{}.{}", safe_title, timestamp, format.extension());
    let path = export_dir.join(&filename);

    let body = match format {
        ExportFormat::Html => render_html_document(title, content),
        ExportFormat::Markdown => format!("# {}\n\n{}", title, content),
        ExportFormat::Txt => format!("{}\n\n{}", title, strip_markdown(content)),
    };

    fs::write(&path, body)
        .with_context(|| format!("エクスポートファイルの書き込みに失敗: {}", path.display()))?;

    Ok(ExportedFile {
        path,
        download_name: format!("{}.{}", safe_title, format.extension()),
        media_type: format.media_type(),
    })
}

/// タイトルをファイル名として安全な形に変換する
/// 英数字・空白・ハイフン・アンダースコアのみ残し、空白はアンダースコアに置換
fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect();
    kept.trim_end().replace(' ', "_")
}

/// MarkdownをHTMLに変換し、スタンドアロンのHTML文書として包む
fn render_html_document(title: &str, content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(content, options);
    let mut html_content = String::new();
    html::push_html(&mut html_content, parser);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; max-width: 800px; margin: 0 auto; padding: 20px; }}
        h1, h2, h3 {{ color: #333; }}
        code {{ background: #f4f4f4; padding: 2px 4px; border-radius: 3px; font-family: monospace; }}
        pre {{ background: #f4f4f4; padding: 15px; border-radius: 6px; overflow-x: auto; margin: 15px 0; }}
        blockquote {{ border-left: 4px solid #00ab6c; margin: 0; padding-left: 20px; color: #666; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    {html_content}
</body>
</html>
"#
    )
}

static RE_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"#+\s*").unwrap());
static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static RE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.*?)`").unwrap());
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.*?)\]\(.*?\)").unwrap());

/// Markdown記法を順に取り除いてプレーンテキストへ変換する
/// 見出し・太字・斜体・コード・リンクのみを対象とする簡易変換
fn strip_markdown(content: &str) -> String {
    let text = RE_HEADER.replace_all(content, "");
    let text = RE_BOLD.replace_all(&text, "$1");
    let text = RE_ITALIC.replace_all(&text, "$1");
    let text = RE_CODE.replace_all(&text, "$1");
    let text = RE_LINK.replace_all(&text, "$1");
    text.into_owned()
}
