//! 画像形式の監査
//!
//! ローカルパスを持つ行を調べ、ブラウザで表示できる形式かを分類する。
//! 非対応形式は `convert` でJPEGに変換でき、変換済みの元ファイルは `cleanup` で整理できる。

pub mod cleanup;
pub mod convert;

use catalog_sync_common::{CatalogRow, WebPathBuilder};
use std::path::{Path, PathBuf};

/// ブラウザ対応の形式
pub const SUPPORTED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// ブラウザ非対応の形式（変換対象）
pub const UNSUPPORTED_FORMATS: &[&str] = &["tiff", "tif", "arw", "raw", "bmp", "psd"];

/// 形式の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatClass {
    Supported,
    Unsupported,
    Other,
}

/// 拡張子を分類する（大文字小文字無視）
pub fn classify_extension(ext: &str) -> FormatClass {
    let ext = ext.trim_start_matches('.').to_lowercase();
    if SUPPORTED_FORMATS.contains(&ext.as_str()) {
        FormatClass::Supported
    } else if UNSUPPORTED_FORMATS.contains(&ext.as_str()) {
        FormatClass::Unsupported
    } else {
        FormatClass::Other
    }
}

/// 監査対象の1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub row: u32,
    pub product_name: String,
    /// カタログ上のパス（`/` 区切り）
    pub web_path: String,
    /// ディスク上のパス
    pub file_path: PathBuf,
}

/// 監査結果
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    pub supported: Vec<AuditEntry>,
    pub unsupported: Vec<AuditEntry>,
    pub missing: Vec<AuditEntry>,
    pub other: Vec<AuditEntry>,
}

impl AuditReport {
    pub fn total(&self) -> usize {
        self.supported.len() + self.unsupported.len() + self.missing.len() + self.other.len()
    }
}

/// Webパスをプロジェクトルート基準のディスク上のパスに変換
pub fn resolve_web_path(project_root: &Path, web_path: &str) -> PathBuf {
    web_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(project_root.to_path_buf(), |path, segment| path.join(segment))
}

/// ローカルパスを持つ行を分類する
///
/// # Arguments
/// * `rows` - カタログ行
/// * `project_root` - Webパスの基準ディレクトリ
/// * `paths` - Webパスの設定（先頭セグメントでローカル参照を判定）
pub fn audit_rows(rows: &[CatalogRow], project_root: &Path, paths: &WebPathBuilder) -> AuditReport {
    let local_marker = paths.root_segment();
    let mut report = AuditReport::default();

    for row in rows {
        let web_path = row.image_ref.trim();
        if web_path.is_empty() || !web_path.starts_with(&local_marker) {
            continue;
        }

        let file_path = resolve_web_path(project_root, web_path);
        let entry = AuditEntry {
            row: row.row,
            product_name: row.product_name.clone(),
            web_path: web_path.to_string(),
            file_path,
        };

        if !entry.file_path.is_file() {
            report.missing.push(entry);
            continue;
        }

        let class = entry
            .file_path
            .extension()
            .map(|e| classify_extension(&e.to_string_lossy()))
            .unwrap_or(FormatClass::Other);

        match class {
            FormatClass::Supported => report.supported.push(entry),
            FormatClass::Unsupported => report.unsupported.push(entry),
            FormatClass::Other => report.other.push(entry),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn row(index: u32, image_ref: &str) -> CatalogRow {
        CatalogRow {
            row: index,
            product_name: format!("Producto {}", index),
            image_ref: image_ref.to_string(),
        }
    }

    #[test]
    fn test_classify_extension() {
        assert_eq!(classify_extension("JPG"), FormatClass::Supported);
        assert_eq!(classify_extension(".webp"), FormatClass::Supported);
        assert_eq!(classify_extension("TIF"), FormatClass::Unsupported);
        assert_eq!(classify_extension("ARW"), FormatClass::Unsupported);
        assert_eq!(classify_extension("heic"), FormatClass::Other);
    }

    #[test]
    fn test_resolve_web_path() {
        let path = resolve_web_path(Path::new("/site"), "images/productos/1583 menu/Latte.jpg");
        assert_eq!(path, Path::new("/site").join("images").join("productos").join("1583 menu").join("Latte.jpg"));
    }

    #[test]
    fn test_audit_rows_classifies() {
        let dir = tempdir().unwrap();
        let images = dir.path().join("images").join("productos").join("1583 menu");
        fs::create_dir_all(&images).unwrap();
        File::create(images.join("Latte.jpg")).unwrap();
        File::create(images.join("Mocha.TIFF")).unwrap();
        File::create(images.join("Torta.heic")).unwrap();

        let rows = vec![
            row(2, "images/productos/1583 menu/Latte.jpg"),
            row(3, "images/productos/1583 menu/Mocha.TIFF"),
            row(4, "images/productos/1583 menu/Torta.heic"),
            row(5, "images/productos/1583 menu/Nada.jpg"),
            row(6, "https://host/file/cafe1583/Latte.jpg"),
            row(7, ""),
        ];
        let report = audit_rows(&rows, dir.path(), &WebPathBuilder::new("images/productos/1583 menu"));

        assert_eq!(report.supported.len(), 1);
        assert_eq!(report.unsupported.len(), 1);
        assert_eq!(report.unsupported[0].row, 3);
        assert_eq!(report.other.len(), 1);
        assert_eq!(report.missing.len(), 1);
        assert_eq!(report.missing[0].web_path, "images/productos/1583 menu/Nada.jpg");
        assert_eq!(report.total(), 4);
    }
}
