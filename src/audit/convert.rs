//! 非対応形式のJPEG変換
//!
//! 変換後のファイルは元ファイルと同じフォルダに `<名前>.jpg` として作る。
//! 元ファイルは削除しない。

use super::{AuditEntry, AuditReport};
use crate::error::{CatalogSyncError, Result};
use catalog_sync_common::CatalogRow;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// 変換時のJPEG品質
pub const JPEG_QUALITY: u8 = 90;

/// 1行分の変換結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionStatus {
    /// 変換した（元サイズ, 変換後サイズ）
    Converted { original_bytes: u64, new_bytes: u64 },
    /// 変換先のJPEGが既にあった
    Existed,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub row: u32,
    pub product_name: String,
    pub old_path: String,
    pub new_path: String,
    pub status: ConversionStatus,
}

impl ConversionOutcome {
    /// カタログを書き換える対象か
    pub fn repoints_row(&self) -> bool {
        !matches!(self.status, ConversionStatus::Failed(_))
    }
}

/// Webパスの拡張子を `.jpg` に置き換える
pub fn jpeg_web_path(web_path: &str) -> String {
    let (dir, file_name) = match web_path.rfind('/') {
        Some(idx) => web_path.split_at(idx + 1),
        None => ("", web_path),
    };
    let stem = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };
    format!("{}{}.jpg", dir, stem)
}

/// 画像をJPEGに変換する
pub fn convert_to_jpeg(input: &Path, output: &Path, quality: u8) -> Result<()> {
    let image = ImageReader::open(input)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| CatalogSyncError::ImageConversion(format!("{}: {}", input.display(), e)))?;

    let file = File::create(output)?;
    let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
    let written = image.to_rgb8().write_with_encoder(encoder);

    if let Err(e) = written {
        std::fs::remove_file(output).ok();
        return Err(CatalogSyncError::ImageConversion(format!("{}: {}", output.display(), e)));
    }

    Ok(())
}

fn convert_entry(entry: &AuditEntry) -> ConversionOutcome {
    let new_path = jpeg_web_path(&entry.web_path);
    let target = entry.file_path.with_extension("jpg");

    let status = if target.exists() {
        ConversionStatus::Existed
    } else {
        match convert_to_jpeg(&entry.file_path, &target, JPEG_QUALITY) {
            Ok(()) => ConversionStatus::Converted {
                original_bytes: file_size(&entry.file_path),
                new_bytes: file_size(&target),
            },
            Err(e) => ConversionStatus::Failed(e.to_string()),
        }
    };

    ConversionOutcome {
        row: entry.row,
        product_name: entry.product_name.clone(),
        old_path: entry.web_path.clone(),
        new_path,
        status,
    }
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// 非対応形式の行を変換し、成功した行の画像参照を書き換える
///
/// 変換失敗は行ごとに記録し、処理は続ける。
pub fn convert_unsupported<F>(
    rows: &mut [CatalogRow],
    report: &AuditReport,
    mut on_item: F,
) -> Vec<ConversionOutcome>
where
    F: FnMut(&ConversionOutcome),
{
    let mut outcomes = Vec::new();

    for entry in &report.unsupported {
        let outcome = convert_entry(entry);

        if outcome.repoints_row() {
            if let Some(row) = rows.iter_mut().find(|r| r.row == entry.row) {
                row.image_ref = outcome.new_path.clone();
            }
        } else {
            tracing::warn!(row = entry.row, path = %entry.file_path.display(), "変換に失敗しました");
        }

        on_item(&outcome);
        outcomes.push(outcome);
    }

    outcomes
}
