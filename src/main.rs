use clap::Parser;
use idle_sweeper::adapters::aws::{build_engine, AwsClients, SnsNotifier};
use idle_sweeper::adapters::LogNotifier;
use idle_sweeper::core::{ConfigProvider, NotificationSink};
use idle_sweeper::utils::error::{ErrorSeverity, SweepError};
use idle_sweeper::utils::{logger, validation::Validate};
use idle_sweeper::{CliConfig, RunOutcome, SweepPolicy, TomlConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting idle-sweeper CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 指定 --config 時改用 TOML 配置，--dry-run 仍然生效
    let outcome = match &cli.config {
        Some(path) => {
            tracing::info!("📄 Loading configuration from {}", path);
            match TomlConfig::from_file(path) {
                Ok(mut file_config) => {
                    file_config.dry_run |= cli.dry_run;
                    sweep(&file_config).await
                }
                Err(e) => Err(e),
            }
        }
        None => sweep(&cli).await,
    };

    if let Err(e) = outcome {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Sweep failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn sweep<C>(config: &C) -> Result<(), SweepError>
where
    C: ConfigProvider + Validate,
{
    // 驗證配置
    config.validate()?;

    if config.dry_run() {
        tracing::info!("🧪 Dry run: no resource will be stopped");
    }

    let clients = AwsClients::load(config.endpoint_url().map(str::to_string)).await;
    let notifier: Box<dyn NotificationSink> = match config.topic_arn() {
        Some(arn) => Box::new(SnsNotifier::new(&clients, arn)),
        None => Box::new(LogNotifier),
    };

    let engine = build_engine(
        &clients,
        SweepPolicy::from_config(config),
        config.dry_run(),
        notifier,
    );
    let summary = engine.run().await?;

    tracing::info!(
        "✅ Sweep completed: {} item(s) across {} region(s)",
        summary.items_processed,
        summary.regions_swept
    );
    if summary.lookups_failed > 0 {
        tracing::warn!("⚠️ {} lookup(s) failed and were skipped", summary.lookups_failed);
    }

    match summary.outcome {
        RunOutcome::ReportSent => println!("✅ Report sent ({} item(s))", summary.items_processed),
        RunOutcome::NoActionTaken => println!("✅ No active resources found to stop"),
        RunOutcome::DeliveryFailed => {
            eprintln!("⚠️ Sweep finished but the report could not be delivered")
        }
    }

    Ok(())
}
