use catalog_sync::{cli, config, error, pipeline};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use pipeline::ReconcileOptions;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

/// ログ出力の初期化（RUST_LOG が優先）
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        "catalog_sync=debug,catalog_sync_common=debug"
    } else {
        "catalog_sync=info,catalog_sync_common=info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    match cli.command {
        Commands::Reconcile { catalog, images, prefix, dry_run, no_backup } => {
            if let Some(path) = catalog {
                config.catalog_path = path;
            }
            if let Some(dir) = images {
                config.images_dir = dir;
            }
            if let Some(prefix) = prefix {
                config.web_prefix = prefix;
            }

            let options = ReconcileOptions {
                dry_run,
                backup: !no_backup,
            };
            pipeline::run_reconcile(&config, &options)?;

            println!("\n✅ 完了");
        }

        Commands::Audit { catalog, root, convert, no_backup } => {
            if let Some(path) = catalog {
                config.catalog_path = path;
            }
            pipeline::run_audit(&config, &root, convert, !no_backup)?;
        }

        Commands::Cleanup { images, delete } => {
            if let Some(dir) = images {
                config.images_dir = dir;
            }
            pipeline::run_cleanup(&config, delete)?;
        }

        Commands::Build { catalog, output } => {
            if let Some(path) = catalog {
                config.catalog_path = path;
            }
            if let Some(path) = output {
                config.menu_output = path;
            }
            pipeline::run_build(&config)?;
        }

        Commands::Config { show, init } => {
            if init {
                let path = config.save()?;
                println!("✔ 設定ファイルを作成しました: {}", path.display());
            }

            if show || !init {
                println!("設定:");
                println!("  カタログ: {}", config.catalog_path.display());
                println!("  画像フォルダ: {}", config.images_dir.display());
                println!("  バックアップ先: {}", config.backup_dir.display());
                println!("  Webプレフィックス: {}", config.web_prefix);
                println!("  ホスト識別子: {}", config.provider_host.as_deref().unwrap_or("(指定なし)"));
                println!("  コンテナ: {}", config.container);
                println!("  メニュー出力: {}", config.menu_output.display());
            }
        }
    }

    Ok(())
}
