use clap::Parser;
use zip_distance::core::ConfigProvider;
use zip_distance::utils::{logger, validation::Validate};
use zip_distance::{DistancePipeline, EtlEngine, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-distances")]
#[command(about = "Postal code distances driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "zip-distance.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Validate the configuration and inputs without computing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }
    tracing::info!("🚀 Loaded configuration from {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No distances will be computed");
        perform_dry_run(&config).await?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    let storage = LocalStorage::new(".");
    let pipeline = DistancePipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(report) => {
            tracing::info!(
                "✅ Wrote {} distances to {}",
                report.summary.rows_emitted,
                report.output_location
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Configuration Summary:");
    tracing::info!("  Source: {}", config.source_path());
    tracing::info!("  Destination: {}", config.destination_path());
    match config.reference_path() {
        Some(path) => tracing::info!("  Reference: {}", path),
        None => tracing::info!("  Reference: download from {}", config.reference_url()),
    }
    tracing::info!("  Output: {}", config.output_path().unwrap_or("<stdout>"));
    tracing::info!(
        "  Unit: {:?}, Format: {:?}",
        config.unit(),
        config.output_format()
    );
    tracing::info!(
        "  Unknown codes: {:?}, Non-convergence: {:?}",
        config.unknown_code_policy(),
        config.convergence_policy()
    );
}

async fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    let mut paths = vec![config.source_path(), config.destination_path()];
    paths.extend(config.reference_path());

    let mut missing = Vec::new();
    for path in paths {
        match tokio::fs::metadata(path).await {
            Ok(meta) => tracing::info!("  ✅ {} ({} bytes)", path, meta.len()),
            Err(e) => {
                tracing::warn!("  ❌ {}: {}", path, e);
                missing.push(path.to_string());
            }
        }
    }

    if !missing.is_empty() {
        anyhow::bail!("missing input files: {}", missing.join(", "));
    }

    tracing::info!("✅ Dry run complete");
    Ok(())
}
