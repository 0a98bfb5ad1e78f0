use super::{sdk_message, AwsClients};
use crate::domain::model::{ResourceSnapshot, Sample};
use crate::domain::ports::{LookbackWindow, MetricQuery, MetricsProvider};
use crate::utils::error::{Result, SweepError};
use async_trait::async_trait;
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudwatch::types::{Dimension, Statistic};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct CloudWatchMetrics {
    clients: AwsClients,
}

impl CloudWatchMetrics {
    pub fn new(clients: AwsClients) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl MetricsProvider for CloudWatchMetrics {
    async fn get_utilization(
        &self,
        resource: &ResourceSnapshot,
        query: &MetricQuery,
        window: &LookbackWindow,
    ) -> Result<Vec<Sample>> {
        let output = self
            .clients
            .cloudwatch(&resource.region)
            .get_metric_statistics()
            .namespace(query.namespace)
            .metric_name(query.metric_name)
            .dimensions(
                Dimension::builder()
                    .name(query.dimension)
                    .value(&resource.id)
                    .build(),
            )
            .start_time(AwsDateTime::from_secs(window.start.timestamp()))
            .end_time(AwsDateTime::from_secs(window.end.timestamp()))
            .period(query.period_seconds)
            .statistics(Statistic::Maximum)
            .send()
            .await
            .map_err(|e| SweepError::collaborator("cloudwatch", sdk_message(&e)))?;

        let mut samples: Vec<Sample> = output
            .datapoints()
            .iter()
            .filter_map(|dp| {
                let ts = dp.timestamp()?;
                let at = DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos())?;
                Some(Sample::new(at, dp.maximum()?))
            })
            .collect();
        // CloudWatch 不保證資料點順序
        samples.sort_by_key(|s| s.timestamp);

        tracing::debug!(
            "{} {} for {}: {} datapoint(s)",
            query.namespace,
            query.metric_name,
            resource.id,
            samples.len()
        );
        Ok(samples)
    }
}
