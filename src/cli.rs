use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(about = "メニューカタログと商品画像フォルダの照合・メニューデータ生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// リモート画像URLを画像フォルダ内のローカルパスに書き換える
    Reconcile {
        /// カタログExcel（省略時は設定値）
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 画像フォルダ（省略時は設定値）
        #[arg(short, long)]
        images: Option<PathBuf>,

        /// 書き換え後のWebパスのプレフィックス
        #[arg(long)]
        prefix: Option<String>,

        /// ドライラン（Excelを書き換えずに結果だけ表示）
        #[arg(long)]
        dry_run: bool,

        /// バックアップを作成しない
        #[arg(long)]
        no_backup: bool,
    },

    /// カタログが参照する画像の形式を確認（非対応形式はJPEGに変換可能）
    Audit {
        /// カタログExcel（省略時は設定値）
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Webパスの基準フォルダ（デフォルト: カレント）
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// 非対応形式をJPEGに変換してカタログを更新
        #[arg(long)]
        convert: bool,

        /// バックアップを作成しない
        #[arg(long)]
        no_backup: bool,
    },

    /// 変換済みの元画像（TIFF/RAWなど）を一覧・削除
    Cleanup {
        /// 画像フォルダ（省略時は設定値）
        #[arg(short, long)]
        images: Option<PathBuf>,

        /// JPEG変換済みの元ファイルを削除する
        #[arg(long)]
        delete: bool,
    },

    /// カタログからメニューJSONを生成
    Build {
        /// カタログExcel（省略時は設定値）
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 出力JSONファイル（省略時は設定値）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを作成
        #[arg(long)]
        init: bool,
    },
}
