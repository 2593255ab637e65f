//! 画像形式チェックの統合テスト

use catalog_sync::catalog::{TabularStore, XlsxCatalog};
use catalog_sync::config::Config;
use catalog_sync::pipeline;
use image::{ImageFormat, Rgb, RgbImage};
use rust_xlsxwriter::Workbook;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_audit_convert_updates_catalog() {
    let dir = tempdir().expect("Failed to create temp dir");
    let images = dir.path().join("images").join("menu");
    fs::create_dir_all(&images).unwrap();
    RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]))
        .save_with_format(images.join("Mocha.tiff"), ImageFormat::Tiff)
        .unwrap();
    fs::write(images.join("Latte.jpg"), b"jpeg").unwrap();

    let catalog_path = dir.path().join("Menu Web.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Producto").unwrap();
    sheet.write_string(0, 1, "Imagen").unwrap();
    sheet.write_string(1, 0, "Mocha").unwrap();
    sheet.write_string(1, 1, "images/menu/Mocha.tiff").unwrap();
    sheet.write_string(2, 0, "Latte").unwrap();
    sheet.write_string(2, 1, "images/menu/Latte.jpg").unwrap();
    sheet.write_string(3, 0, "Torta").unwrap();
    sheet.write_string(3, 1, "images/menu/Torta.png").unwrap();
    workbook.save(&catalog_path).unwrap();

    let config = Config {
        catalog_path: catalog_path.clone(),
        images_dir: images.clone(),
        backup_dir: dir.path().join("backup"),
        web_prefix: "images/menu".into(),
        ..Default::default()
    };

    let report = pipeline::run_audit(&config, dir.path(), true, true).unwrap();

    assert_eq!(report.supported.len(), 1);
    assert_eq!(report.unsupported.len(), 1);
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].row, 4);

    assert!(images.join("Mocha.jpg").exists());
    // 元ファイルは残す
    assert!(images.join("Mocha.tiff").exists());

    let rows = XlsxCatalog::open(&catalog_path).unwrap().load().unwrap();
    assert_eq!(rows[0].image_ref, "images/menu/Mocha.jpg");
    assert_eq!(rows[1].image_ref, "images/menu/Latte.jpg");
    assert!(dir.path().join("backup").exists());
}

#[test]
fn test_audit_without_convert_is_read_only() {
    let dir = tempdir().expect("Failed to create temp dir");
    let images = dir.path().join("images");
    fs::create_dir_all(&images).unwrap();
    fs::write(images.join("Mocha.bmp"), b"bmp").unwrap();

    let catalog_path = dir.path().join("Menu Web.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Producto").unwrap();
    sheet.write_string(0, 1, "Imagen").unwrap();
    sheet.write_string(1, 0, "Mocha").unwrap();
    sheet.write_string(1, 1, "images/Mocha.bmp").unwrap();
    workbook.save(&catalog_path).unwrap();
    let before = fs::read(&catalog_path).unwrap();

    let config = Config {
        catalog_path: catalog_path.clone(),
        web_prefix: "images".into(),
        ..Default::default()
    };
    let report = pipeline::run_audit(&config, dir.path(), false, true).unwrap();

    assert_eq!(report.unsupported.len(), 1);
    assert_eq!(fs::read(&catalog_path).unwrap(), before);
    assert!(!images.join("Mocha.jpg").exists());
}

#[test]
fn test_cleanup_after_convert() {
    let dir = tempdir().expect("Failed to create temp dir");
    let images = dir.path().join("images");
    fs::create_dir_all(&images).unwrap();
    RgbImage::from_pixel(4, 4, Rgb([200, 100, 50]))
        .save_with_format(images.join("Mocha.tiff"), ImageFormat::Tiff)
        .unwrap();
    fs::write(images.join("Latte.arw"), vec![0u8; 512]).unwrap();

    let catalog_path = dir.path().join("Menu Web.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Producto").unwrap();
    sheet.write_string(0, 1, "Imagen").unwrap();
    sheet.write_string(1, 0, "Mocha").unwrap();
    sheet.write_string(1, 1, "images/Mocha.tiff").unwrap();
    workbook.save(&catalog_path).unwrap();

    let config = Config {
        catalog_path,
        images_dir: images.clone(),
        backup_dir: dir.path().join("backup"),
        web_prefix: "images".into(),
        ..Default::default()
    };
    pipeline::run_audit(&config, dir.path(), true, false).unwrap();

    // フラグなしでは一覧表示のみ
    let report = pipeline::run_cleanup(&config, false).unwrap();
    assert_eq!(report.files.len(), 2);
    assert!(report.total_bytes() >= 512);
    assert!(report.removed.is_empty());
    assert!(images.join("Mocha.tiff").exists());

    let report = pipeline::run_cleanup(&config, true).unwrap();
    assert_eq!(report.removed, vec!["Mocha.tiff".to_string()]);
    assert!(!images.join("Mocha.tiff").exists());
    assert!(images.join("Mocha.jpg").exists());
    // 未変換のRAWは残す
    assert!(images.join("Latte.arw").exists());
}

#[test]
fn test_cleanup_missing_folder_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config {
        images_dir: dir.path().join("no-existe"),
        ..Default::default()
    };

    let result = pipeline::run_cleanup(&config, true);
    assert!(matches!(
        result,
        Err(catalog_sync::error::CatalogSyncError::DirectoryUnavailable(_))
    ));
}
