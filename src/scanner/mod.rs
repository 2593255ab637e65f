use crate::error::{CatalogSyncError, Result};
use catalog_sync_common::AssetListing;
use std::path::Path;
use walkdir::WalkDir;

/// 画像フォルダ直下のファイル名一覧
///
/// 並び順はディレクトリ列挙の順のまま（ソートしない）。照合の同順位判定に使う。
pub fn list_files(folder: &Path) -> Result<Vec<String>> {
    if !folder.is_dir() {
        return Err(CatalogSyncError::DirectoryUnavailable(folder.display().to_string()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)  // 直下のみ（再帰しない）
    {
        let entry = match entry {
            Ok(entry) => entry,
            // フォルダ自体が読めない
            Err(e) if e.depth() == 0 || e.path() == Some(folder) => {
                return Err(CatalogSyncError::DirectoryUnavailable(format!(
                    "{}: {}",
                    folder.display(),
                    e
                )));
            }
            Err(e) => {
                tracing::debug!(error = %e, "読み込めないエントリをスキップ");
                continue;
            }
        };
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        files.push(entry.file_name().to_string_lossy().to_string());
    }

    Ok(files)
}

/// 画像フォルダのスナップショットを作成
pub fn scan_assets(folder: &Path) -> Result<AssetListing> {
    let files = list_files(folder)?;
    Ok(AssetListing::new(files))
}
