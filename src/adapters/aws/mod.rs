//! AWS implementations of the collaborator ports.
//!
//! Every service client is built per region from one shared [`SdkConfig`],
//! optionally pointed at a custom endpoint (e.g. a local emulator).

mod actuator;
mod inventory;
mod metrics;
mod notifier;

pub use actuator::AwsActuator;
pub use inventory::AwsInventory;
pub use metrics::CloudWatchMetrics;
pub use notifier::SnsNotifier;

use crate::adapters::MaybeDryRun;
use crate::core::engine::SweepEngine;
use crate::core::policy::SweepPolicy;
use crate::domain::ports::NotificationSink;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata};

const FALLBACK_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub struct AwsClients {
    sdk_config: SdkConfig,
    endpoint_url: Option<String>,
}

impl AwsClients {
    pub async fn load(endpoint_url: Option<String>) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(sdk_config, endpoint_url)
    }

    pub fn new(sdk_config: SdkConfig, endpoint_url: Option<String>) -> Self {
        Self {
            sdk_config,
            endpoint_url,
        }
    }

    /// Region from the environment/profile, used for account-wide calls.
    pub fn home_region(&self) -> String {
        self.sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| FALLBACK_REGION.to_string())
    }

    pub fn ec2(&self, region: &str) -> aws_sdk_ec2::Client {
        let mut builder = aws_sdk_ec2::config::Builder::from(&self.sdk_config)
            .region(aws_sdk_ec2::config::Region::new(region.to_string()));
        if let Some(url) = &self.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        aws_sdk_ec2::Client::from_conf(builder.build())
    }

    pub fn ecs(&self, region: &str) -> aws_sdk_ecs::Client {
        let mut builder = aws_sdk_ecs::config::Builder::from(&self.sdk_config)
            .region(aws_sdk_ecs::config::Region::new(region.to_string()));
        if let Some(url) = &self.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        aws_sdk_ecs::Client::from_conf(builder.build())
    }

    pub fn rds(&self, region: &str) -> aws_sdk_rds::Client {
        let mut builder = aws_sdk_rds::config::Builder::from(&self.sdk_config)
            .region(aws_sdk_rds::config::Region::new(region.to_string()));
        if let Some(url) = &self.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        aws_sdk_rds::Client::from_conf(builder.build())
    }

    pub fn cloudwatch(&self, region: &str) -> aws_sdk_cloudwatch::Client {
        let mut builder = aws_sdk_cloudwatch::config::Builder::from(&self.sdk_config)
            .region(aws_sdk_cloudwatch::config::Region::new(region.to_string()));
        if let Some(url) = &self.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        aws_sdk_cloudwatch::Client::from_conf(builder.build())
    }

    pub fn sns(&self, region: &str) -> aws_sdk_sns::Client {
        let mut builder = aws_sdk_sns::config::Builder::from(&self.sdk_config)
            .region(aws_sdk_sns::config::Region::new(region.to_string()));
        if let Some(url) = &self.endpoint_url {
            builder = builder.endpoint_url(url);
        }
        aws_sdk_sns::Client::from_conf(builder.build())
    }
}

pub type AwsSweepEngine<N> =
    SweepEngine<AwsInventory, CloudWatchMetrics, MaybeDryRun<AwsActuator>, N>;

/// Wire every port to AWS except the notification sink, which the caller
/// picks (SNS for Lambda, SNS or stdout for the CLI).
pub fn build_engine<N: NotificationSink>(
    clients: &AwsClients,
    policy: SweepPolicy,
    dry_run: bool,
    notifier: N,
) -> AwsSweepEngine<N> {
    SweepEngine::new(
        AwsInventory::new(clients.clone()),
        CloudWatchMetrics::new(clients.clone()),
        MaybeDryRun::new(AwsActuator::new(clients.clone()), dry_run),
        notifier,
        policy,
    )
}

/// Service message when AWS returned one (e.g. "Cannot stop instance in
/// state stopped"), otherwise the full error chain.
pub(crate) fn sdk_message<E>(err: &E) -> String
where
    E: ProvideErrorMetadata + std::error::Error,
{
    match err.message() {
        Some(message) => message.to_string(),
        None => DisplayErrorContext(err).to_string(),
    }
}
