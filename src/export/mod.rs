//! メニューデータのJSON出力

use crate::error::Result;
use catalog_sync_common::MenuDocument;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// メニュードキュメントを整形済みJSONで保存（親フォルダは必要なら作成）
pub fn write_menu_json(document: &MenuDocument, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(output)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, document)?;
    Ok(())
}
