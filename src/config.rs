use crate::error::{CatalogSyncError, Result};
use catalog_sync_common::{ObjectStoreUrl, ReconcileSettings, WebPathBuilder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// カタログExcel
    pub catalog_path: PathBuf,
    /// 画像フォルダ
    pub images_dir: PathBuf,
    /// Excelバックアップ先
    pub backup_dir: PathBuf,
    /// 書き換え後のWebパスのプレフィックス
    pub web_prefix: String,
    /// プロバイダURLのホスト識別子（空なら任意のhttp(s) URL）
    pub provider_host: Option<String>,
    /// プロバイダのコンテナ（バケット）名
    pub container: String,
    /// メニューJSONの出力先
    pub menu_output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("Cargue productos").join("Menu Web.xlsx"),
            images_dir: PathBuf::from("images").join("productos").join("1583 menu"),
            backup_dir: PathBuf::from("Cargue productos").join("backup"),
            web_prefix: "images/productos/1583 menu".into(),
            provider_host: Some(catalog_sync_common::provider::DEFAULT_HOST_MARKER.into()),
            container: catalog_sync_common::provider::DEFAULT_CONTAINER.into(),
            menu_output: PathBuf::from("data").join("menu-data.json"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CatalogSyncError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("catalog-sync").join("config.json"))
    }

    /// 照合設定を組み立てる
    pub fn reconcile_settings(&self) -> Result<ReconcileSettings> {
        let provider = ObjectStoreUrl::new(&self.container)?
            .with_host_marker(self.provider_host.as_deref());

        Ok(ReconcileSettings {
            provider,
            paths: self.web_paths(),
        })
    }

    pub fn web_paths(&self) -> WebPathBuilder {
        WebPathBuilder::new(&self.web_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let config = Config::default();
        let settings = config.reconcile_settings().unwrap();
        assert_eq!(settings.provider.container(), "cafe1583");
        assert_eq!(settings.provider.host_marker(), Some("backblazeb2.com"));
        assert_eq!(settings.paths.prefix(), "images/productos/1583 menu");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"container": "otro", "provider_host": null}"#).unwrap();
        assert_eq!(config.container, "otro");
        assert_eq!(config.provider_host, None);
        assert_eq!(config.web_prefix, "images/productos/1583 menu");
    }

    #[test]
    fn test_invalid_container_is_error() {
        let config = Config {
            container: String::new(),
            ..Default::default()
        };
        assert!(config.reconcile_settings().is_err());
    }
}
