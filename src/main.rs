use clap::Parser;
use slam_daily_update::core::paper_table::render_row;
use slam_daily_update::core::ConfigProvider;
use slam_daily_update::utils::{logger, validation::Validate};
use slam_daily_update::{
    CliConfig, LocalStorage, PaperPipeline, Result, TomlConfig, UpdateEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting slam-daily-update");

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if config.token().is_none() {
        tracing::warn!("No GITHUB_TOKEN set, unauthenticated requests are heavily rate limited");
    }
    if cli.verbose {
        display_config_summary(&config, cli.dry_run);
    }

    match execute(config, cli.dry_run).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!(
                "❌ Update failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

async fn execute(config: TomlConfig, dry_run: bool) -> Result<()> {
    let monitor_enabled = config.monitoring_enabled();
    let storage = LocalStorage::new(config.output.workdir.clone());
    let pipeline = PaperPipeline::new(storage, config)?;
    let engine = UpdateEngine::new_with_monitoring(pipeline, monitor_enabled);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - no files will be written");
        let batch = engine.run_dry().await?;
        println!("Would add {} papers:", batch.rows.len());
        for row in &batch.rows {
            println!("{}", render_row(row));
        }
        return Ok(());
    }

    let summary = engine.run().await?;
    tracing::info!("✅ Update completed: {}", summary);
    println!("✅ {}", summary);
    Ok(())
}

fn display_config_summary(config: &TomlConfig, dry_run: bool) {
    println!("📋 Configuration Summary:");
    println!("  API: {}", config.api_base());
    println!("  Keywords: {}", config.keywords().join(", "));
    println!("  Venues: {}", config.venues().join(", "));
    println!("  Workdir: {}", config.output.workdir);
    println!("  README: {}", config.readme_path());
    println!("  Ledger: {}", config.processed_file());
    println!("  Max repos per run: {}", config.max_repos_per_run());
    println!("  Skip processed: {}", config.skip_processed());
    if config.only_recently_updated() {
        println!("  Only updated within {} days", config.recent_days());
    }
    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}
