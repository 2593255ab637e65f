//! ファイル名の正規化
//!
//! 拡張子・大文字小文字・空白・記号の違いを吸収した比較キーを作る。
//! アクセント付き文字は音訳せず、`[a-z0-9]` 以外として除去する。

use regex::Regex;

/// 既知の画像拡張子
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "arw", "gif", "webp"];

/// ファイル名を比較キーに変換する
///
/// 1. 小文字化
/// 2. 末尾の既知画像拡張子（`.jpg` など）を除去
/// 3. `[a-z0-9]` 以外（空白・記号・アクセント付き文字）を除去
///
/// 出力は `[a-z0-9]*` のみなので、2回適用しても結果は変わらない。
pub fn normalize(file_name: &str) -> String {
    lazy_static::lazy_static! {
        static ref EXTENSION_RE: Regex =
            Regex::new(&format!(r"\.({})\s*$", IMAGE_EXTENSIONS.join("|"))).unwrap();
    }

    let lower = file_name.to_lowercase();
    let stem = EXTENSION_RE.replace(&lower, "");

    stem.chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("Espresso Doble.jpg"), "espressodoble");
        assert_eq!(normalize("espresso-doble-v2.JPG"), "espressodoblev2");
    }

    #[test]
    fn test_normalize_equivalence_class() {
        let variants = [
            "Espresso Doble.jpg",
            "ESPRESSO DOBLE.PNG",
            "espresso_doble.webp",
            "Espresso  Doble .jpeg",
            "Espresso-Doble",
        ];
        for v in variants {
            assert_eq!(normalize(v), "espressodoble", "variant: {}", v);
        }
    }

    #[test]
    fn test_normalize_removes_accents_without_transliteration() {
        assert_eq!(normalize("Café Latte.jpg"), "caflatte");
        assert_eq!(normalize("Piña Colada.png"), "piacolada");
    }

    #[test]
    fn test_normalize_only_trailing_extension() {
        assert_eq!(normalize("jpg lover.png"), "jpglover");
        assert_eq!(normalize("foto.jpg.png"), "fotojpg");
        // 未知の拡張子は残る
        assert_eq!(normalize("menu.pdf"), "menupdf");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = ["", "  ", "Espresso Doble.jpg", "Ñandú.TIFF", "a.b.c", "123 ABC.webp", "jpg"];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_normalize_empty_results() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(".jpg"), "");
        assert_eq!(normalize("ñ.png"), "");
    }
}
