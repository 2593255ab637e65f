//! カタログ（表形式データ）の読み書き

pub mod xlsx;

pub use xlsx::XlsxCatalog;

use crate::error::Result;
use catalog_sync_common::CatalogRow;

/// カタログの保存先
///
/// `load` はヘッダー基準の行番号を保ったまま行を返し、
/// `save` は変更されたセルだけを同じ保存先に書き戻す。
pub trait TabularStore {
    fn load(&self) -> Result<Vec<CatalogRow>>;

    fn save(&self, rows: &[CatalogRow]) -> Result<()>;
}
