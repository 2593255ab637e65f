//! Catalog Sync Common Library
//!
//! カタログ行と画像フォルダを照合する純粋ロジック（I/Oなし）

pub mod types;
pub mod columns;
pub mod error;
pub mod provider;
pub mod normalizer;
pub mod matcher;
pub mod web_path;
pub mod reconcile;
pub mod menu;

pub use types::{
    CatalogRecord, CatalogRow, CellValue, MatchResult, MatchTier, MatchedEntry,
    ReconciliationReport, UnmatchedEntry, UnmatchedReason,
};
pub use error::{Error, Result};
pub use provider::ObjectStoreUrl;
pub use normalizer::normalize;
pub use matcher::{find_asset, AssetListing, AssetMatch};
pub use web_path::WebPathBuilder;
pub use reconcile::{reconcile, reconcile_with, ReconcileSettings, Reconciliation, RowProgress};
pub use menu::{build_menu, MenuDocument};
