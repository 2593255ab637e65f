//! Excelカタログ
//!
//! 読み込みは calamine、書き戻しは rust_xlsxwriter。
//! 書き戻しはブック全体の値と数式を作り直し、変更された画像セルだけを差し替える。
//! 数式セルは数式のまま、キャッシュ値を結果として残す。
//! 一時ファイルに保存してから置き換えるので、途中で失敗しても元ファイルは残る。

use super::TabularStore;
use crate::error::{CatalogSyncError, Result};
use calamine::{open_workbook, CellType, Data, Range, Reader, Xlsx};
use catalog_sync_common::columns::{IMAGE_COLUMNS, NAME_COLUMNS};
use catalog_sync_common::{CatalogRecord, CatalogRow, CellValue};
use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet, XlsxError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Excelファイル上のカタログ（先頭シートを使用）
#[derive(Debug, Clone)]
pub struct XlsxCatalog {
    path: PathBuf,
}

/// 読み込んだシート
struct Sheet {
    name: String,
    range: Range<Data>,
    /// 数式（絶対位置 → 先頭の `=` なしの式）
    formulas: HashMap<(u32, u32), String>,
}

impl Sheet {
    /// 使用範囲の左上（0始まりの絶対位置）
    fn origin(&self) -> (u32, u32) {
        self.range.start().unwrap_or((0, 0))
    }

    /// ヘッダー名 → 列（使用範囲内の相対位置）。同名は先の列を採用
    fn header_columns(&self) -> HashMap<String, usize> {
        let mut columns = HashMap::new();
        if let Some(header) = self.range.rows().next() {
            for (col, cell) in header.iter().enumerate() {
                let name = cell_value(cell).text();
                if !name.is_empty() {
                    columns.entry(name).or_insert(col);
                }
            }
        }
        columns
    }

    /// シート上の行番号（1始まり）
    fn row_number(&self, relative_row: usize) -> u32 {
        self.origin().0 + relative_row as u32 + 1
    }

    /// ヘッダー以降の空でない行をレコードに変換
    fn records(&self) -> Vec<CatalogRecord> {
        let headers = self.header_columns();

        self.range
            .rows()
            .enumerate()
            .skip(1)
            .filter(|(_, cells)| cells.iter().any(|c| !cell_value(c).is_blank()))
            .map(|(r, cells)| {
                let cells = headers
                    .iter()
                    .map(|(name, &col)| {
                        let value = cells.get(col).map(cell_value).unwrap_or_default();
                        (name.clone(), value)
                    })
                    .collect();
                CatalogRecord {
                    row: self.row_number(r),
                    cells,
                }
            })
            .collect()
    }
}

impl XlsxCatalog {
    /// カタログを開く（存在しなければ SourceUnavailable）
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CatalogSyncError::SourceUnavailable(path.display().to_string()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 全列をヘッダー名で引けるレコードとして読み込む
    pub fn load_records(&self) -> Result<Vec<CatalogRecord>> {
        let sheets = self.read_sheets()?;
        Ok(sheets.first().map(Sheet::records).unwrap_or_default())
    }

    fn read_sheets(&self) -> Result<Vec<Sheet>> {
        if !self.path.is_file() {
            return Err(CatalogSyncError::SourceUnavailable(self.path.display().to_string()));
        }

        let mut workbook = open_workbook::<Xlsx<_>, _>(&self.path)
            .map_err(|e| CatalogSyncError::SheetRead(format!("{}: {}", self.path.display(), e)))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| CatalogSyncError::SheetRead(format!("{}: {}", name, e)))?;
            let formula_range = workbook
                .worksheet_formula(&name)
                .map_err(|e| CatalogSyncError::SheetRead(format!("{}: {}", name, e)))?;
            let formulas = absolute_cells(&formula_range)
                .filter(|(_, formula)| !formula.trim().is_empty())
                .map(|(position, formula)| (position, formula.clone()))
                .collect();
            sheets.push(Sheet { name, range, formulas });
        }
        Ok(sheets)
    }

    /// 先頭シートで書き換えるセル（絶対位置 → 新しい値）を求める
    fn image_overrides(sheet: &Sheet, rows: &[CatalogRow]) -> HashMap<(u32, u32), String> {
        let headers = sheet.header_columns();
        let image_cols: Vec<usize> = IMAGE_COLUMNS
            .iter()
            .filter_map(|name| headers.get(*name).copied())
            .collect();
        let wanted: HashMap<u32, &str> = rows
            .iter()
            .map(|r| (r.row, r.image_ref.as_str()))
            .collect();

        let (origin_row, origin_col) = sheet.origin();
        let mut overrides = HashMap::new();

        for (r, cells) in sheet.range.rows().enumerate().skip(1) {
            let new_value = match wanted.get(&sheet.row_number(r)) {
                Some(v) => *v,
                None => continue,
            };

            let text_at = |col: usize| cells.get(col).map(cell_value).unwrap_or_default().text();

            // 読み込み時と同じ列（最初に値のある画像列）に書き戻す
            let source_col = image_cols
                .iter()
                .copied()
                .find(|&c| !text_at(c).is_empty())
                .or_else(|| image_cols.first().copied());

            if let Some(col) = source_col {
                if text_at(col) != new_value.trim() {
                    let position = (origin_row + r as u32, origin_col + col as u32);
                    overrides.insert(position, new_value.to_string());
                }
            }
        }

        overrides
    }

    fn write_workbook(
        sheets: &[Sheet],
        overrides: &HashMap<(u32, u32), String>,
        output: &Path,
    ) -> std::result::Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

        for (index, sheet) in sheets.iter().enumerate() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            let replaced = |position: &(u32, u32)| index == 0 && overrides.contains_key(position);

            for (position, value) in absolute_cells(&sheet.range) {
                if replaced(&position) || sheet.formulas.contains_key(&position) {
                    continue;
                }
                write_cell(worksheet, position, value, &date_format)?;
            }

            for (&position, formula) in &sheet.formulas {
                if replaced(&position) {
                    continue;
                }
                let cached = sheet.range.get_value(position).map(cached_result).unwrap_or_default();
                let formula = Formula::new(formula.as_str()).set_result(cached);
                worksheet.write_formula(position.0, position.1 as u16, formula)?;
            }

            if index == 0 {
                for (&(row, col), value) in overrides {
                    worksheet.write_string(row, col as u16, value)?;
                }
            }
        }

        workbook.save(output)
    }
}

impl TabularStore for XlsxCatalog {
    fn load(&self) -> Result<Vec<CatalogRow>> {
        let sheets = self.read_sheets()?;
        let sheet = match sheets.first() {
            Some(sheet) if !sheet.range.is_empty() => sheet,
            _ => return Ok(Vec::new()),
        };

        let headers = sheet.header_columns();
        if !IMAGE_COLUMNS.iter().any(|c| headers.contains_key(*c)) {
            return Err(CatalogSyncError::MissingColumn(IMAGE_COLUMNS.join(" / ")));
        }

        let rows = sheet
            .records()
            .into_iter()
            .map(|record| CatalogRow {
                row: record.row,
                product_name: record.first_text(NAME_COLUMNS),
                image_ref: record.first_text(IMAGE_COLUMNS),
            })
            .collect();
        Ok(rows)
    }

    fn save(&self, rows: &[CatalogRow]) -> Result<()> {
        let sheets = self.read_sheets()?;
        let overrides = match sheets.first() {
            Some(sheet) => Self::image_overrides(sheet, rows),
            None => HashMap::new(),
        };

        if overrides.is_empty() {
            tracing::debug!(path = %self.path.display(), "変更なし、書き戻しをスキップ");
            return Ok(());
        }

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let written = Self::write_workbook(&sheets, &overrides, &temp_path)
            .map_err(|e| CatalogSyncError::SheetWrite(e.to_string()))
            .and_then(|()| std::fs::rename(&temp_path, &self.path).map_err(CatalogSyncError::from));

        if let Err(e) = written {
            if temp_path.is_file() {
                if let Err(cleanup) = std::fs::remove_file(&temp_path) {
                    tracing::warn!(path = %temp_path.display(), error = %cleanup, "一時ファイルを削除できません");
                }
            }
            return Err(e);
        }

        tracing::info!(path = %self.path.display(), cells = overrides.len(), "カタログを書き戻しました");
        Ok(())
    }
}

/// 使用範囲内の値を絶対位置付きで列挙
fn absolute_cells<T: CellType>(range: &Range<T>) -> impl Iterator<Item = ((u32, u32), &T)> {
    let (origin_row, origin_col) = range.start().unwrap_or((0, 0));
    range
        .used_cells()
        .map(move |(r, c, value)| ((origin_row + r as u32, origin_col + c as u32), value))
}

/// 数式セルのキャッシュ値（結果として書き戻す文字列）
fn cached_result(value: &Data) -> String {
    match value {
        Data::Error(e) => e.to_string(),
        Data::String(s) => s.clone(),
        other => cell_value(other).text(),
    }
}

/// calamineのセル値を共通型に変換
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    (row, col): (u32, u32),
    value: &Data,
    date_format: &Format,
) -> std::result::Result<(), XlsxError> {
    let col = col as u16;
    match value {
        Data::Int(i) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        Data::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Data::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Data::DateTime(dt) => {
            worksheet.write_number_with_format(row, col, dt.as_f64(), date_format)?;
        }
        // 数式を持たないエラー値は同じエラーを返す定数式にする
        Data::Error(e) => {
            let error = e.to_string();
            let formula = Formula::new(format!("={}", error)).set_result(error);
            worksheet.write_formula(row, col, formula)?;
        }
        Data::Empty => {}
    }
    Ok(())
}
