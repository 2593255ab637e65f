//! コマンドごとの一連の処理
//!
//! カタログの有無は最初に確認し、見つからなければ何も書き換えずに終了する。

use crate::audit::cleanup::{find_raw_files, format_megabytes, remove_converted, CleanupReport};
use crate::audit::convert::{convert_unsupported, ConversionOutcome, ConversionStatus};
use crate::audit::{audit_rows, AuditReport};
use crate::backup;
use crate::catalog::{TabularStore, XlsxCatalog};
use crate::config::Config;
use crate::error::{CatalogSyncError, Result};
use crate::export::write_menu_json;
use crate::scanner;
use catalog_sync_common::{
    build_menu, reconcile_with, AssetListing, MatchResult, MatchTier, MenuDocument,
    ReconcileSettings, Reconciliation, ReconciliationReport, RowProgress,
};
use chrono::{SecondsFormat, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

const RULE_WIDTH: usize = 60;

/// 照合の実行オプション
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Excelを書き換えない
    pub dry_run: bool,
    /// 書き換え前にバックアップを作成する
    pub backup: bool,
}

/// 画像フォルダのスナップショットを取る
///
/// フォルダがなければ一度だけ警告し、空の一覧で続行する（全行が未検出になる）。
pub fn snapshot_assets(images_dir: &Path) -> Result<AssetListing> {
    match scanner::scan_assets(images_dir) {
        Ok(listing) => Ok(listing),
        Err(CatalogSyncError::DirectoryUnavailable(path)) => {
            tracing::warn!(path = %path, "画像フォルダが見つかりません。全行を未検出として扱います");
            println!("⚠ 画像フォルダが見つかりません: {}", path);
            Ok(AssetListing::default())
        }
        Err(e) => Err(e),
    }
}

/// カタログを読み込み、全行を照合する（書き戻しはしない）
pub fn reconcile_catalog<S: TabularStore>(
    store: &S,
    listing: &AssetListing,
    settings: &ReconcileSettings,
) -> Result<Reconciliation> {
    let rows = store.load()?;
    println!("📊 {}件の商品を処理中...\n", rows.len());

    Ok(reconcile_with(rows, listing, settings, print_row_progress))
}

/// reconcile コマンド
pub fn run_reconcile(config: &Config, options: &ReconcileOptions) -> Result<ReconciliationReport> {
    println!("📦 catalog-sync - 画像照合\n");

    let catalog = XlsxCatalog::open(&config.catalog_path)?;
    let settings = config.reconcile_settings()?;

    println!("[1/3] 画像フォルダをスキャン中...");
    let listing = snapshot_assets(&config.images_dir)?;
    println!("✔ {}ファイルを検出\n", listing.len());

    println!("[2/3] カタログを照合中...");
    let outcome = reconcile_catalog(&catalog, &listing, &settings)?;

    println!("[3/3] 結果を保存中...");
    if !outcome.changed() {
        println!("✔ 変更なし");
    } else if options.dry_run {
        println!("✔ ドライラン: {}行は書き換えていません", outcome.report.matched);
    } else {
        if options.backup {
            let path = backup::create_backup(catalog.path(), &config.backup_dir)?;
            println!("✓ バックアップ作成: {}", path.display());
        }
        catalog.save(&outcome.rows)?;
        println!("✔ カタログを更新: {}", catalog.path().display());
    }

    print_reconcile_summary(&outcome.report, &config.images_dir);
    Ok(outcome.report)
}

fn print_row_progress(progress: &RowProgress<'_>) {
    let row = progress.row;
    let name = display_name(&row.product_name);

    match progress.result {
        MatchResult::NotApplicable => {}
        MatchResult::Matched { path, tier } => {
            let mark = if *tier == MatchTier::Partial { "≈" } else { "✓" };
            println!("{} [{}] {}", mark, row.row, name);
            println!("  {}...", truncate_chars(progress.original_ref, RULE_WIDTH));
            if *tier == MatchTier::Partial {
                println!(
                    "  → 部分一致: \"{}\"",
                    progress.search_name.unwrap_or_default()
                );
            }
            println!("  → {}\n", path);
        }
        MatchResult::Unmatched(reason) => {
            println!("⚠ [{}] {}: {}", row.row, reason, name);
            match progress.search_name {
                Some(search) => println!("  検索: \"{}\"\n", search),
                None => println!("  URL: {}\n", progress.original_ref),
            }
        }
    }
}

fn print_reconcile_summary(report: &ReconciliationReport, images_dir: &Path) {
    let partial: Vec<_> = report.partial_matches().collect();

    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("📊 結果:");
    println!("✓ 更新: {}（うち部分一致: {}）", report.matched, partial.len());
    println!("⚠ 未照合: {}", report.unmatched);
    println!("- 対象外: {}", report.skipped);
    println!("{}", "=".repeat(RULE_WIDTH));

    if !partial.is_empty() {
        println!("\n≈ 部分一致（要確認）:");
        for entry in partial {
            println!(
                "  行 {}: {} → {}",
                entry.row,
                display_name(&entry.product_name),
                entry.web_path
            );
        }
    }

    if report.has_unmatched() {
        println!("\n⚠ 照合できなかった行:");
        for entry in &report.unmatched_entries {
            println!(
                "  行 {}: {} → 検索: \"{}\" ({})",
                entry.row,
                display_name(&entry.product_name),
                entry.search_name.as_deref().unwrap_or("-"),
                entry.reason
            );
        }
        println!("\n💡 次のフォルダにファイルがあるか確認してください:");
        println!("   {}", images_dir.display());
    }
}

/// audit コマンド
pub fn run_audit(config: &Config, root: &Path, convert: bool, backup: bool) -> Result<AuditReport> {
    println!("🔍 catalog-sync - 画像形式チェック\n");

    let catalog = XlsxCatalog::open(&config.catalog_path)?;
    let mut rows = catalog.load()?;
    let report = audit_rows(&rows, root, &config.web_paths());

    println!("{}", "=".repeat(RULE_WIDTH));
    println!("📊 検出結果:");
    println!("✅ 対応形式: {}", report.supported.len());
    println!("⚠️  非対応形式: {}", report.unsupported.len());
    println!("❓ その他の形式: {}", report.other.len());
    println!("❌ ファイルなし: {}", report.missing.len());
    println!("{}", "=".repeat(RULE_WIDTH));

    if report.unsupported.is_empty() {
        println!("\n✅ すべての画像が対応形式です");
    } else if convert {
        let outcomes = convert_with_progress(&mut rows, &report);

        if outcomes.iter().any(ConversionOutcome::repoints_row) {
            if backup {
                let path = backup::create_backup(catalog.path(), &config.backup_dir)?;
                println!("✓ バックアップ作成: {}", path.display());
            }
            catalog.save(&rows)?;
            println!("✅ カタログを新しいパスで更新しました");
        }

        print_conversion_summary(&outcomes);
    } else {
        println!("\n💡 --convert を付けるとJPEGに変換してカタログを更新します");
    }

    if !report.missing.is_empty() {
        println!("\n⚠️  ファイルが見つからない行:");
        for entry in &report.missing {
            println!("  行 {}: {} → {}", entry.row, display_name(&entry.product_name), entry.web_path);
        }
    }

    Ok(report)
}

fn convert_with_progress(
    rows: &mut [catalog_sync_common::CatalogRow],
    report: &AuditReport,
) -> Vec<ConversionOutcome> {
    println!("\n🔄 {}件を変換中...\n", report.unsupported.len());

    let bar = ProgressBar::new(report.unsupported.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let outcomes = convert_unsupported(rows, report, |outcome| {
        let line = match &outcome.status {
            ConversionStatus::Converted { original_bytes, new_bytes } => format!(
                "✅ [{}] {} → {} ({:.2} KB → {:.2} KB)",
                outcome.row,
                outcome.old_path,
                outcome.new_path,
                *original_bytes as f64 / 1024.0,
                *new_bytes as f64 / 1024.0
            ),
            ConversionStatus::Existed => format!("📋 [{}] 既存: {}", outcome.row, outcome.new_path),
            ConversionStatus::Failed(e) => format!("❌ [{}] 変換失敗: {}", outcome.row, e),
        };
        bar.println(line);
        bar.inc(1);
    });

    bar.finish_and_clear();
    outcomes
}

fn print_conversion_summary(outcomes: &[ConversionOutcome]) {
    let converted = outcomes
        .iter()
        .filter(|o| matches!(o.status, ConversionStatus::Converted { .. }))
        .count();
    let existed = outcomes
        .iter()
        .filter(|o| o.status == ConversionStatus::Existed)
        .count();

    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("📊 変換結果:");
    println!("✅ 変換: {}", converted);
    println!("📋 既存: {}", existed);
    println!("❌ 失敗: {}", outcomes.len() - converted - existed);
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("\n💡 元のファイルはフォルダに残っています。不要なら手動で削除してください");
}

/// cleanup コマンド
///
/// 画像フォルダ直下の非対応形式ファイルとサイズを表示する。
/// `delete` のときだけ、変換済みのものを削除する。
pub fn run_cleanup(config: &Config, delete: bool) -> Result<CleanupReport> {
    println!("🧹 catalog-sync - 元画像の整理\n");

    let files = find_raw_files(&config.images_dir)?;
    let mut report = CleanupReport {
        files,
        removed: Vec::new(),
    };

    if report.files.is_empty() {
        println!("✅ 整理対象のファイルはありません");
        return Ok(report);
    }

    println!("📊 非対応形式のファイル: {}件\n", report.files.len());
    for file in &report.files {
        let mark = if file.converted { "✓" } else { "⚠" };
        println!("  {} {} ({})", mark, file.file_name, format_megabytes(file.bytes));
    }
    println!("\n💾 合計: {}", format_megabytes(report.total_bytes()));

    let pending = report.files.iter().filter(|f| !f.converted).count();
    if pending > 0 {
        println!("⚠ {}件はJPEGが見つからないため残します（audit --convert で変換できます）", pending);
    }

    if delete {
        report.removed = remove_converted(&report.files);
        println!("\n🗑 {}件を削除しました", report.removed.len());
    } else if report.removable().next().is_some() {
        println!("\n💡 --delete を付けると変換済み（✓）のファイルを削除します");
    }

    Ok(report)
}

/// build コマンド
pub fn run_build(config: &Config) -> Result<MenuDocument> {
    let catalog = XlsxCatalog::open(&config.catalog_path)?;
    let records = catalog.load_records()?;

    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let source = config.catalog_path.to_string_lossy().replace('\\', "/");
    let document = build_menu(&records, &source, &generated_at);

    write_menu_json(&document, &config.menu_output)?;
    println!("✔ メニューデータを生成: {}", config.menu_output.display());
    Ok(document)
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(名前なし)"
    } else {
        name
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
