//! カタログのバックアップ
//!
//! 書き換え前にカタログを `<backup_dir>/<名前> - <時刻>.<拡張子>` へ複製する。

use crate::error::{CatalogSyncError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};

/// バックアップファイル名用の時刻文字列（`:` と `.` を `-` に置換）
pub fn backup_stamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// バックアップ先のパス
pub fn backup_path(source: &Path, backup_dir: &Path, now: DateTime<Utc>) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "catalog".into());
    let extension = source
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "xlsx".into());

    backup_dir.join(format!("{} - {}.{}", stem, backup_stamp(now), extension))
}

/// カタログを複製する
pub fn create_backup(source: &Path, backup_dir: &Path) -> Result<PathBuf> {
    create_backup_at(source, backup_dir, Utc::now())
}

pub fn create_backup_at(source: &Path, backup_dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    if !source.is_file() {
        return Err(CatalogSyncError::SourceUnavailable(source.display().to_string()));
    }

    std::fs::create_dir_all(backup_dir)
        .map_err(|e| CatalogSyncError::Backup(format!("{}: {}", backup_dir.display(), e)))?;

    let target = backup_path(source, backup_dir, now);
    std::fs::copy(source, &target)
        .map_err(|e| CatalogSyncError::Backup(format!("{}: {}", target.display(), e)))?;

    Ok(target)
}
