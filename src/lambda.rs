#[cfg(feature = "lambda")]
use idle_sweeper::adapters::aws::{build_engine, AwsClients, SnsNotifier};
#[cfg(feature = "lambda")]
use idle_sweeper::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use idle_sweeper::{LambdaConfig, RunSummary, SweepPolicy};
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde::Deserialize;

/// Scheduled events carry no payload; these fields allow ad-hoc overrides.
#[cfg(feature = "lambda")]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Request {
    pub dry_run: Option<bool>,
    pub regions: Option<Vec<String>>,
}

#[cfg(feature = "lambda")]
async fn function_handler(
    clients: &AwsClients,
    event: LambdaEvent<Request>,
) -> Result<RunSummary, Error> {
    tracing::info!("Starting idle-sweeper Lambda function");

    let mut config = LambdaConfig::from_env()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    // 事件中的覆寫值優先於環境變數
    if let Some(dry_run) = event.payload.dry_run {
        config.dry_run = dry_run;
    }
    if let Some(regions) = event.payload.regions {
        config.regions = regions;
    }

    config
        .validate()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    let notifier = SnsNotifier::new(clients, config.topic_arn.clone());
    let engine = build_engine(
        clients,
        SweepPolicy::from_config(&config),
        config.dry_run,
        notifier,
    );

    let summary = engine
        .run()
        .await
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    tracing::info!(
        "Lambda sweep completed: {} item(s), outcome {:?}",
        summary.items_processed,
        summary.outcome
    );
    Ok(summary)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // AWS 配置在冷啟動時載入一次，之後的調用共用
    let endpoint_url = std::env::var("AWS_ENDPOINT_URL").ok();
    let clients = AwsClients::load(endpoint_url).await;
    let shared = &clients;

    run(service_fn(move |event: LambdaEvent<Request>| async move {
        function_handler(shared, event).await
    }))
    .await
}
