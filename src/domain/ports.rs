use crate::domain::model::{ResourceKind, ResourceSnapshot, Sample};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

pub trait ConfigProvider: Send + Sync {
    fn exclude_tag_key(&self) -> &str;
    fn exclude_tag_value(&self) -> &str;
    fn cpu_threshold(&self) -> f64;
    fn lookback_days(&self) -> u32;
    fn enabled_kinds(&self) -> &[ResourceKind];
    fn require_metric_check(&self) -> bool;
    /// Empty means every region the account has enabled.
    fn regions(&self) -> &[String];
    fn concurrent_regions(&self) -> usize;
    fn topic_arn(&self) -> Option<&str>;
    /// Custom AWS endpoint, e.g. a local emulator.
    fn endpoint_url(&self) -> Option<&str>;
    fn dry_run(&self) -> bool;
}

/// CloudWatch-style metric selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    pub namespace: &'static str,
    pub metric_name: &'static str,
    pub dimension: &'static str,
    pub period_seconds: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl LookbackWindow {
    pub fn ending_at(end: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: end - Duration::days(i64::from(days)),
            end,
        }
    }
}

#[async_trait]
pub trait InventoryProvider: Send + Sync {
    async fn list_regions(&self) -> Result<Vec<String>>;
    /// Snapshots come back without tags and utilization samples.
    async fn list_resources(&self, kind: ResourceKind, region: &str)
        -> Result<Vec<ResourceSnapshot>>;
    async fn get_tags(&self, resource: &ResourceSnapshot) -> Result<HashMap<String, String>>;
}

#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// May return an empty series.
    async fn get_utilization(
        &self,
        resource: &ResourceSnapshot,
        query: &MetricQuery,
        window: &LookbackWindow,
    ) -> Result<Vec<Sample>>;
}

#[async_trait]
pub trait Actuator: Send + Sync {
    async fn stop(&self, resource: &ResourceSnapshot) -> Result<()>;
    async fn scale_to_zero(&self, resource: &ResourceSnapshot) -> Result<()>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, subject: &str, body: &str) -> Result<()>;
}

#[async_trait]
impl<T: NotificationSink + ?Sized> NotificationSink for Box<T> {
    async fn publish(&self, subject: &str, body: &str) -> Result<()> {
        (**self).publish(subject, body).await
    }
}

// 共享實例 (例如測試中同時檢查呼叫紀錄)

#[async_trait]
impl<T: InventoryProvider + ?Sized> InventoryProvider for Arc<T> {
    async fn list_regions(&self) -> Result<Vec<String>> {
        (**self).list_regions().await
    }

    async fn list_resources(
        &self,
        kind: ResourceKind,
        region: &str,
    ) -> Result<Vec<ResourceSnapshot>> {
        (**self).list_resources(kind, region).await
    }

    async fn get_tags(&self, resource: &ResourceSnapshot) -> Result<HashMap<String, String>> {
        (**self).get_tags(resource).await
    }
}

#[async_trait]
impl<T: MetricsProvider + ?Sized> MetricsProvider for Arc<T> {
    async fn get_utilization(
        &self,
        resource: &ResourceSnapshot,
        query: &MetricQuery,
        window: &LookbackWindow,
    ) -> Result<Vec<Sample>> {
        (**self).get_utilization(resource, query, window).await
    }
}

#[async_trait]
impl<T: Actuator + ?Sized> Actuator for Arc<T> {
    async fn stop(&self, resource: &ResourceSnapshot) -> Result<()> {
        (**self).stop(resource).await
    }

    async fn scale_to_zero(&self, resource: &ResourceSnapshot) -> Result<()> {
        (**self).scale_to_zero(resource).await
    }
}

#[async_trait]
impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    async fn publish(&self, subject: &str, body: &str) -> Result<()> {
        (**self).publish(subject, body).await
    }
}
