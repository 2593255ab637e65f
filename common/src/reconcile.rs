//! カタログ行と画像フォルダの照合（リコンサイル）
//!
//! ## 行ごとの処理
//! 1. 画像参照が空、またはプロバイダURLでない → スキップ（レポート対象外）
//! 2. URLからファイル名を取り出す → 失敗なら未照合（URL解析不可）
//! 3. フォルダ一覧と照合 → 見つからなければ未照合（未検出）
//! 4. 見つかれば画像参照をWebパスに書き換え
//!
//! 書き換え済みの行はローカルパスなので、再実行してもスキップされる。

use crate::matcher::{find_asset, AssetListing};
use crate::provider::ObjectStoreUrl;
use crate::types::{
    CatalogRow, MatchResult, MatchedEntry, ReconciliationReport, UnmatchedEntry, UnmatchedReason,
};
use crate::web_path::WebPathBuilder;

/// 照合の設定
#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    pub provider: ObjectStoreUrl,
    pub paths: WebPathBuilder,
}

/// 1行分の進捗通知
#[derive(Debug)]
pub struct RowProgress<'a> {
    pub row: &'a CatalogRow,
    /// 書き換え前の画像参照
    pub original_ref: &'a str,
    /// URLから取り出したファイル名
    pub search_name: Option<&'a str>,
    pub result: &'a MatchResult,
}

/// 照合の出力（更新後の行とレポート）
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub rows: Vec<CatalogRow>,
    pub report: ReconciliationReport,
}

impl Reconciliation {
    /// 書き換えが発生したか
    pub fn changed(&self) -> bool {
        self.report.matched > 0
    }
}

/// 1行を判定する（行は変更しない）
pub fn resolve_row(
    row: &CatalogRow,
    listing: &AssetListing,
    settings: &ReconcileSettings,
) -> (MatchResult, Option<String>) {
    let image_ref = row.image_ref.trim();
    if image_ref.is_empty() || !settings.provider.is_provider_url(image_ref) {
        return (MatchResult::NotApplicable, None);
    }

    let file_name = match settings.provider.decompose(image_ref) {
        Some(name) => name,
        None => return (MatchResult::Unmatched(UnmatchedReason::Unparsable), None),
    };

    let result = match find_asset(&file_name, listing) {
        Some(found) => MatchResult::Matched {
            path: settings.paths.to_web_path(&found.file_name),
            tier: found.tier,
        },
        None => MatchResult::Unmatched(UnmatchedReason::NotFound),
    };

    (result, Some(file_name))
}

/// 全行を照合する
pub fn reconcile(
    rows: Vec<CatalogRow>,
    listing: &AssetListing,
    settings: &ReconcileSettings,
) -> Reconciliation {
    reconcile_with(rows, listing, settings, |_| {})
}

/// 全行を照合する（行ごとに進捗を通知）
///
/// # Arguments
/// * `rows` - カタログ行（行番号順に処理される）
/// * `listing` - 画像フォルダのスナップショット
/// * `settings` - プロバイダURLとWebパスの設定
/// * `on_row` - 各行の判定後に呼ばれるクロージャ
pub fn reconcile_with<F>(
    mut rows: Vec<CatalogRow>,
    listing: &AssetListing,
    settings: &ReconcileSettings,
    mut on_row: F,
) -> Reconciliation
where
    F: FnMut(&RowProgress<'_>),
{
    let mut report = ReconciliationReport::default();

    for row in rows.iter_mut() {
        let (result, search_name) = resolve_row(row, listing, settings);
        let original_ref = row.image_ref.clone();

        match &result {
            MatchResult::NotApplicable => {
                report.skipped += 1;
            }
            MatchResult::Matched { path, tier } => {
                report.matched += 1;
                report.matched_entries.push(MatchedEntry {
                    row: row.row,
                    product_name: row.product_name.clone(),
                    file_name: search_name.clone().unwrap_or_default(),
                    web_path: path.clone(),
                    tier: *tier,
                });
                row.image_ref = path.clone();
            }
            MatchResult::Unmatched(reason) => {
                report.unmatched += 1;
                report.unmatched_entries.push(UnmatchedEntry {
                    row: row.row,
                    product_name: row.product_name.clone(),
                    search_name: search_name.clone(),
                    reason: *reason,
                });
            }
        }

        tracing::debug!(row = row.row, result = ?result, "行を照合しました");

        on_row(&RowProgress {
            row: &*row,
            original_ref: &original_ref,
            search_name: search_name.as_deref(),
            result: &result,
        });
    }

    Reconciliation { rows, report }
}
