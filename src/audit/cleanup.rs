//! 画像フォルダに残った非対応形式の元ファイル（TIFF/RAWなど）の整理
//!
//! 削除するのは同じフォルダに変換済みの `<名前>.jpg` があるものだけ。

use super::{classify_extension, FormatClass};
use crate::error::Result;
use crate::scanner;
use std::path::{Path, PathBuf};

/// 非対応形式の元ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: u64,
    /// 変換済みのJPEGが隣にある
    pub converted: bool,
}

/// 整理結果
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    pub files: Vec<RawFile>,
    /// 実際に削除したファイル名
    pub removed: Vec<String>,
}

impl CleanupReport {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }

    /// 削除してよいファイル（変換済みのもの）
    pub fn removable(&self) -> impl Iterator<Item = &RawFile> {
        self.files.iter().filter(|f| f.converted)
    }
}

/// 画像フォルダ直下の非対応形式ファイルを列挙する
pub fn find_raw_files(folder: &Path) -> Result<Vec<RawFile>> {
    let mut files = Vec::new();

    for file_name in scanner::list_files(folder)? {
        let path = folder.join(&file_name);
        let class = path
            .extension()
            .map(|e| classify_extension(&e.to_string_lossy()))
            .unwrap_or(FormatClass::Other);
        if class != FormatClass::Unsupported {
            continue;
        }

        let bytes = std::fs::metadata(&path)?.len();
        let converted = path.with_extension("jpg").is_file();
        files.push(RawFile {
            file_name,
            path,
            bytes,
            converted,
        });
    }

    Ok(files)
}

/// 変換済みの元ファイルを削除し、削除したファイル名を返す
///
/// 1件の失敗で中断せず、警告を出して次に進む。
pub fn remove_converted<'a>(files: impl IntoIterator<Item = &'a RawFile>) -> Vec<String> {
    let mut removed = Vec::new();

    for file in files {
        if !file.converted {
            continue;
        }
        match std::fs::remove_file(&file.path) {
            Ok(()) => removed.push(file.file_name.clone()),
            Err(e) => {
                tracing::warn!(path = %file.path.display(), error = %e, "元ファイルを削除できません");
            }
        }
    }

    removed
}

/// バイト数をMB表記にする
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}
