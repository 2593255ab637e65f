//! オブジェクトストレージURLの分解
//!
//! `https://<host>/file/<container>/<url-encoded-path>` 形式のURLから
//! 元のファイル名を取り出す。パスは `+` を空白として扱う。

use crate::error::{Error, Result};
use url::Url;

/// 既定のホスト識別子
pub const DEFAULT_HOST_MARKER: &str = "backblazeb2.com";

/// 既定のコンテナ（バケット）名
pub const DEFAULT_CONTAINER: &str = "cafe1583";

/// プロバイダURLの規約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStoreUrl {
    host_marker: Option<String>,
    container: String,
    /// `/file/<container>/`
    path_marker: String,
}

impl ObjectStoreUrl {
    /// コンテナ名を指定して作成（ホスト識別子なし）
    pub fn new(container: &str) -> Result<Self> {
        let container = container.trim().trim_matches('/');
        if container.is_empty() || container.contains('/') {
            return Err(Error::Parse(format!("不正なコンテナ名: {:?}", container)));
        }

        Ok(Self {
            host_marker: None,
            container: container.to_string(),
            path_marker: format!("/file/{}/", container),
        })
    }

    /// ホスト識別子を設定する（空文字は「指定なし」）
    pub fn with_host_marker(mut self, marker: Option<&str>) -> Self {
        self.host_marker = marker
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn host_marker(&self) -> Option<&str> {
        self.host_marker.as_deref()
    }

    /// 値がこのプロバイダのリモートURLか判定
    ///
    /// ホスト識別子が設定されていれば、値にそれを含むもの（スキームの有無は問わない）。
    /// 設定がなければ http(s) URL すべて。空文字は常に false。
    pub fn is_provider_url(&self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }

        match &self.host_marker {
            Some(marker) => value.to_lowercase().contains(&marker.to_lowercase()),
            None => Url::parse(value)
                .map(|url| url.scheme() == "http" || url.scheme() == "https")
                .unwrap_or(false),
        }
    }

    /// URLから元のファイル名を取り出す
    ///
    /// `/file/<container>/` 以降をパーセントデコードし、`+` を空白に戻す。
    /// 規約に合わない入力や、不正な `%` エスケープを含む入力は None。
    pub fn decompose(&self, url: &str) -> Option<String> {
        let start = url.find(&self.path_marker)? + self.path_marker.len();
        let encoded = &url[start..];
        if encoded.is_empty() || !has_valid_escapes(encoded) {
            return None;
        }

        let decoded = urlencoding::decode(encoded).ok()?;
        let file_name = decoded.replace('+', " ");
        if file_name.trim().is_empty() {
            return None;
        }
        Some(file_name)
    }
}

/// `%` の後に16進数2桁が続いているか
fn has_valid_escapes(encoded: &str) -> bool {
    let bytes = encoded.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'%'
            || (bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

impl Default for ObjectStoreUrl {
    fn default() -> Self {
        Self {
            host_marker: Some(DEFAULT_HOST_MARKER.to_string()),
            container: DEFAULT_CONTAINER.to_string(),
            path_marker: format!("/file/{}/", DEFAULT_CONTAINER),
        }
    }
}
