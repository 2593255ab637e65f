//! 共通型定義
//!
//! カタログ行・照合結果・照合レポート

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// カタログの1商品行
///
/// `row` はシート上の行番号（1始まり、ヘッダー行を含む）で、
/// 読み込みから書き戻しまで変わらない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRow {
    pub row: u32,

    #[serde(default)]
    pub product_name: String,     // 商品名

    #[serde(default)]
    pub image_ref: String,        // 画像参照（URL / ローカルパス / 空）
}

/// セル値（メニュー生成用）
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// 表示用テキスト（前後空白除去済み）
    pub fn text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => if *b { "TRUE".into() } else { "FALSE".into() },
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text().is_empty()
    }
}

/// ヘッダー名で引けるカタログレコード（全列）
#[derive(Debug, Clone, Default)]
pub struct CatalogRecord {
    pub row: u32,
    pub cells: HashMap<String, CellValue>,
}

impl CatalogRecord {
    /// 候補列のうち最初に値のあるセル
    pub fn first_cell(&self, columns: &[&str]) -> Option<&CellValue> {
        columns
            .iter()
            .filter_map(|c| self.cells.get(*c))
            .find(|v| !v.is_blank())
    }

    /// 候補列のうち最初に値のあるセルのテキスト（なければ空文字）
    pub fn first_text(&self, columns: &[&str]) -> String {
        self.first_cell(columns).map(CellValue::text).unwrap_or_default()
    }
}

/// 照合ティア
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchTier {
    /// 大文字小文字無視の完全一致（パーセントデコード後を含む）
    Exact,
    /// 正規化キーの一致
    Normalized,
    /// 正規化キーの部分一致（誤マッチの可能性あり）
    Partial,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::Exact => write!(f, "exact"),
            MatchTier::Normalized => write!(f, "normalized"),
            MatchTier::Partial => write!(f, "partial"),
        }
    }
}

/// 未照合の理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnmatchedReason {
    /// URLからファイル名を取り出せなかった
    Unparsable,
    /// 画像フォルダに該当ファイルがない
    NotFound,
}

impl std::fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnmatchedReason::Unparsable => write!(f, "URL解析不可"),
            UnmatchedReason::NotFound => write!(f, "未検出"),
        }
    }
}

/// 1行分の照合結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// 画像参照なし、またはプロバイダURLではない
    NotApplicable,
    /// 照合成功（書き換え後のWebパス）
    Matched { path: String, tier: MatchTier },
    Unmatched(UnmatchedReason),
}

/// 照合できた行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedEntry {
    pub row: u32,
    pub product_name: String,
    pub file_name: String,
    pub web_path: String,
    pub tier: MatchTier,
}

/// 照合できなかった行（手動確認用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedEntry {
    pub row: u32,
    pub product_name: String,
    /// URLから取り出したファイル名（解析不可の場合はNone）
    pub search_name: Option<String>,
    pub reason: UnmatchedReason,
}

/// 照合レポート
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub matched: usize,
    pub unmatched: usize,
    pub skipped: usize,
    pub matched_entries: Vec<MatchedEntry>,
    pub unmatched_entries: Vec<UnmatchedEntry>,
}

impl ReconciliationReport {
    /// 部分一致で照合された行（要目視確認）
    pub fn partial_matches(&self) -> impl Iterator<Item = &MatchedEntry> {
        self.matched_entries
            .iter()
            .filter(|e| e.tier == MatchTier::Partial)
    }

    pub fn has_unmatched(&self) -> bool {
        !self.unmatched_entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_text() {
        assert_eq!(CellValue::Text("  Café  ".into()).text(), "Café");
        assert_eq!(CellValue::Number(12000.0).text(), "12000");
        assert_eq!(CellValue::Number(1.5).text(), "1.5");
        assert_eq!(CellValue::Empty.text(), "");
        assert!(CellValue::Text("   ".into()).is_blank());
    }

    #[test]
    fn test_first_text_uses_first_non_blank_column() {
        let mut record = CatalogRecord { row: 2, ..Default::default() };
        record.cells.insert("Imagen".into(), CellValue::Text(" ".into()));
        record.cells.insert("Imagen URL".into(), CellValue::Text("https://x/y.jpg".into()));

        let text = record.first_text(&["Imagen", "Imagenes", "Imagen URL"]);
        assert_eq!(text, "https://x/y.jpg");
        assert_eq!(record.first_text(&["Producto"]), "");
    }

    #[test]
    fn test_partial_matches_filter() {
        let entry = |tier| MatchedEntry {
            row: 2,
            product_name: "Latte".into(),
            file_name: "latte.jpg".into(),
            web_path: "images/latte.jpg".into(),
            tier,
        };
        let report = ReconciliationReport {
            matched: 2,
            matched_entries: vec![entry(MatchTier::Exact), entry(MatchTier::Partial)],
            ..Default::default()
        };
        assert_eq!(report.partial_matches().count(), 1);
        assert!(!report.has_unmatched());
    }
}
