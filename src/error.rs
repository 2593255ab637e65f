use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogSyncError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("カタログファイルが見つかりません: {0}")]
    SourceUnavailable(String),

    #[error("画像フォルダが見つかりません: {0}")]
    DirectoryUnavailable(String),

    #[error("Excel読み込みエラー: {0}")]
    SheetRead(String),

    #[error("Excel書き込みエラー: {0}")]
    SheetWrite(String),

    #[error("必要な列がありません: {0}")]
    MissingColumn(String),

    #[error("バックアップ作成エラー: {0}")]
    Backup(String),

    #[error("画像変換エラー: {0}")]
    ImageConversion(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] catalog_sync_common::Error),
}

pub type Result<T> = std::result::Result<T, CatalogSyncError>;
