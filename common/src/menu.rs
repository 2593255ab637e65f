//! メニューデータ生成
//!
//! カタログの全行をカテゴリごとにまとめ、Webサイト用のドキュメントにする。
//! カテゴリは最初に出現した順に並ぶ。

use crate::columns::{
    ADDITIONS_COLUMNS, CATEGORY_COLUMNS, DESCRIPTION_COLUMNS, IMAGE_COLUMNS, NAME_COLUMNS,
    PRICE_COLUMNS,
};
use crate::types::{CatalogRecord, CellValue};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

const DEFAULT_CATEGORY: &str = "Sin categoría";
const DEFAULT_NAME: &str = "Producto sin nombre";
const DEFAULT_SLUG: &str = "producto";

/// メニュードキュメント
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDocument {
    pub generated_at: String,
    pub source: String,
    pub categories: Vec<MenuCategory>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuCategory {
    pub name: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub additions: String,
    pub price: Option<f64>,
    pub image: String,
}

/// メニュードキュメントを組み立てる
///
/// # Arguments
/// * `records` - カタログの全行
/// * `source` - 元ファイルの表示用パス
/// * `generated_at` - 生成時刻（ISO 8601）
pub fn build_menu(records: &[CatalogRecord], source: &str, generated_at: &str) -> MenuDocument {
    let mut slugs = SlugRegistry::default();
    let mut categories: Vec<MenuCategory> = Vec::new();

    for record in records {
        let category = text_or(record, CATEGORY_COLUMNS, DEFAULT_CATEGORY);
        let name = text_or(record, NAME_COLUMNS, DEFAULT_NAME);

        let item = MenuItem {
            id: slugs.unique(&slugify(&format!("{}-{}", category, name))),
            name,
            description: record.first_text(DESCRIPTION_COLUMNS),
            additions: record.first_text(ADDITIONS_COLUMNS),
            price: record.first_cell(PRICE_COLUMNS).and_then(parse_price),
            image: record.first_text(IMAGE_COLUMNS),
        };

        match categories.iter_mut().find(|c| c.name == category) {
            Some(existing) => existing.items.push(item),
            None => categories.push(MenuCategory {
                name: category,
                items: vec![item],
            }),
        }
    }

    MenuDocument {
        generated_at: generated_at.to_string(),
        source: source.to_string(),
        categories,
    }
}

fn text_or(record: &CatalogRecord, columns: &[&str], default: &str) -> String {
    let text = record.first_text(columns);
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

/// 重複したスラッグに `-2`, `-3`, ... を付ける
#[derive(Debug, Default)]
struct SlugRegistry {
    counts: HashMap<String, usize>,
}

impl SlugRegistry {
    fn unique(&mut self, base: &str) -> String {
        let base = if base.is_empty() { DEFAULT_SLUG } else { base };
        let count = self.counts.entry(base.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base.to_string()
        } else {
            format!("{}-{}", base, count)
        }
    }
}

/// テキストをURL用スラッグに変換
///
/// ラテン文字のアクセントを外し、`[a-z0-9]` 以外の連続を `-` にする。
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase).map(fold_accent) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if is_combining_mark(c) {
            continue;
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// 価格セルを数値に変換
///
/// 数値セルはそのまま。文字列は `[0-9.,-]` 以外を除き、最初の `,` を `.` にして
/// 先頭から読める範囲を数値として解釈する。
pub fn parse_price(value: &CellValue) -> Option<f64> {
    lazy_static::lazy_static! {
        static ref NUMBER_PREFIX_RE: Regex = Regex::new(r"^-?(\d+\.?\d*|\.\d+)").unwrap();
    }

    match value {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
                .collect();
            let cleaned = cleaned.replacen(',', ".", 1);
            NUMBER_PREFIX_RE
                .find(&cleaned)
                .and_then(|m| m.as_str().parse::<f64>().ok())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: u32, cells: &[(&str, CellValue)]) -> CatalogRecord {
        CatalogRecord {
            row,
            cells: cells
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Bebidas Calientes-Café con Leche"), "bebidas-calientes-cafe-con-leche");
        assert_eq!(slugify("  ¡Piña Colada!  "), "pina-colada");
        assert_eq!(slugify("Cafe\u{0301} Nin\u{0303}o"), "cafe-nino");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(&CellValue::Number(8500.0)), Some(8500.0));
        assert_eq!(parse_price(&text("$ 8500")), Some(8500.0));
        assert_eq!(parse_price(&text("12,5")), Some(12.5));
        assert_eq!(parse_price(&text("12.000")), Some(12.0));
        assert_eq!(parse_price(&text("gratis")), None);
        assert_eq!(parse_price(&CellValue::Empty), None);
    }

    #[test]
    fn test_build_menu_groups_by_category_in_first_seen_order() {
        let records = vec![
            record(2, &[("Categoria", text("Bebidas")), ("Producto", text("Latte")), ("Precio", CellValue::Number(9000.0))]),
            record(3, &[("Categoria", text("Postres")), ("Producto", text("Torta"))]),
            record(4, &[("Categoria", text("Bebidas")), ("Producto", text("Mocha")), ("Imagen", text("images/m.jpg"))]),
        ];
        let doc = build_menu(&records, "Menu Web.xlsx", "2026-01-01T00:00:00Z");

        assert_eq!(doc.categories.len(), 2);
        assert_eq!(doc.categories[0].name, "Bebidas");
        assert_eq!(doc.categories[0].items.len(), 2);
        assert_eq!(doc.categories[0].items[0].id, "bebidas-latte");
        assert_eq!(doc.categories[0].items[0].price, Some(9000.0));
        assert_eq!(doc.categories[0].items[1].image, "images/m.jpg");
        assert_eq!(doc.categories[1].items[0].price, None);
    }

    #[test]
    fn test_build_menu_defaults_and_duplicate_ids() {
        let records = vec![
            record(2, &[]),
            record(3, &[]),
            record(4, &[("Producto", text("***")), ("Categoría", text("!!!"))]),
        ];
        let doc = build_menu(&records, "x.xlsx", "t");

        let items = &doc.categories[0].items;
        assert_eq!(doc.categories[0].name, "Sin categoría");
        assert_eq!(items[0].name, "Producto sin nombre");
        assert_eq!(items[0].id, "sin-categoria-producto-sin-nombre");
        assert_eq!(items[1].id, "sin-categoria-producto-sin-nombre-2");
        assert_eq!(doc.categories[1].items[0].id, "producto");
    }

    #[test]
    fn test_menu_serializes_camel_case() {
        let doc = build_menu(&[], "Menu Web.xlsx", "2026-01-01T00:00:00Z");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["generatedAt"], "2026-01-01T00:00:00Z");
        assert_eq!(json["source"], "Menu Web.xlsx");
        assert!(json["categories"].as_array().unwrap().is_empty());
    }
}
