//! カタログの列名（ヘッダー）候補
//!
//! 同じ意味の列が複数の表記で現れるため、先頭から順に探す。

/// 画像参照列
pub const IMAGE_COLUMNS: &[&str] = &["Imagen", "Imagenes", "Imagen URL", "Imagenes URL"];

/// 商品名列
pub const NAME_COLUMNS: &[&str] = &["Producto", "Nombre"];

/// カテゴリ列
pub const CATEGORY_COLUMNS: &[&str] = &["Categoría", "Categoria"];

/// 説明列
pub const DESCRIPTION_COLUMNS: &[&str] = &["Descripcion", "Descripción", "Description"];

/// 追加トッピング列
pub const ADDITIONS_COLUMNS: &[&str] = &["Adiciones", "Extras"];

/// 価格列
pub const PRICE_COLUMNS: &[&str] = &["Precio"];
