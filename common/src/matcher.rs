//! 画像ファイルの照合
//!
//! 対象ファイル名に対し、フォルダ一覧から段階的に候補を探す。
//!
//! ## 照合順序（最初に見つかったものを採用）
//! 1. 完全一致（大文字小文字無視。一覧側のパーセントデコード後も比較）
//! 2. 正規化キー一致
//! 3. 正規化キーの部分一致（どちらかがもう一方を含む）
//!
//! 同じ段に複数の候補がある場合は一覧の順序で先のものを採用する。

use crate::normalizer::normalize;
use crate::types::MatchTier;

/// 一覧の1ファイル（正規化キー付き）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub file_name: String,
    pub key: String,
}

/// 画像フォルダのスナップショット
///
/// 実行開始時に一度だけ作成し、実行中は更新しない。
/// 並び順はファイルシステムが返した順のまま保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetListing {
    entries: Vec<AssetEntry>,
}

impl AssetListing {
    pub fn new<I, S>(file_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = file_names
            .into_iter()
            .map(|name| {
                let file_name = name.into();
                let key = normalize(&file_name);
                AssetEntry { file_name, key }
            })
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 照合結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMatch {
    pub file_name: String,
    pub tier: MatchTier,
}

/// 対象ファイル名に最も近い画像ファイルを探す
///
/// # Arguments
/// * `target` - URLから取り出したファイル名
/// * `listing` - 画像フォルダのスナップショット
///
/// # Returns
/// 見つかったファイル名とティア。どの段でも見つからなければ None
pub fn find_asset(target: &str, listing: &AssetListing) -> Option<AssetMatch> {
    let target_lower = target.to_lowercase();
    let target_key = normalize(target);

    // 1. 完全一致
    let exact = listing.iter().find(|entry| {
        entry.file_name.to_lowercase() == target_lower
            || urlencoding::decode(&entry.file_name)
                .map(|decoded| decoded.to_lowercase() == target_lower)
                .unwrap_or(false)
    });
    if let Some(entry) = exact {
        return Some(found(entry, MatchTier::Exact));
    }

    // 空キーは何にでも一致してしまうので正規化・部分一致の対象外
    if target_key.is_empty() {
        return None;
    }

    // 2. 正規化キー一致
    if let Some(entry) = listing.iter().find(|entry| entry.key == target_key) {
        return Some(found(entry, MatchTier::Normalized));
    }

    // 3. 部分一致
    let partial = listing.iter().find(|entry| {
        !entry.key.is_empty()
            && (entry.key.contains(&target_key) || target_key.contains(&entry.key))
    });
    if let Some(entry) = partial {
        tracing::warn!(
            target_name = target,
            matched = entry.file_name.as_str(),
            "部分一致で照合しました"
        );
        return Some(found(entry, MatchTier::Partial));
    }

    None
}

fn found(entry: &AssetEntry, tier: MatchTier) -> AssetMatch {
    AssetMatch {
        file_name: entry.file_name.clone(),
        tier,
    }
}
