#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use idle_sweeper::core::{
    Actuator, InventoryProvider, LookbackWindow, MetricQuery, MetricsProvider, NotificationSink,
    ResourceKind, ResourceSnapshot, Sample,
};
use idle_sweeper::utils::error::{Result, SweepError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 11, 6, 0, 0).unwrap()
}

/// One sample per day, newest first, all inside a ten-day lookback.
pub fn daily(values: &[f64]) -> Vec<Sample> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Sample::new(now() - Duration::days(i as i64 + 1), *v))
        .collect()
}

#[derive(Default)]
pub struct FakeInventory {
    regions: Vec<String>,
    regions_fail: bool,
    resources: HashMap<(ResourceKind, String), Vec<ResourceSnapshot>>,
    failing_listings: HashSet<(ResourceKind, String)>,
    failing_tags: HashSet<String>,
}

impl FakeInventory {
    pub fn with_regions(regions: &[&str]) -> Self {
        Self {
            regions: regions.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            regions_fail: true,
            ..Default::default()
        }
    }

    /// Tags set on the snapshot are what `get_tags` will return for it.
    pub fn add(mut self, snapshot: ResourceSnapshot) -> Self {
        self.resources
            .entry((snapshot.kind, snapshot.region.clone()))
            .or_default()
            .push(snapshot);
        self
    }

    pub fn fail_listing(mut self, kind: ResourceKind, region: &str) -> Self {
        self.failing_listings.insert((kind, region.to_string()));
        self
    }

    pub fn fail_tags(mut self, arn: &str) -> Self {
        self.failing_tags.insert(arn.to_string());
        self
    }
}

#[async_trait]
impl InventoryProvider for FakeInventory {
    async fn list_regions(&self) -> Result<Vec<String>> {
        if self.regions_fail {
            return Err(SweepError::collaborator("ec2", "DescribeRegions timed out"));
        }
        Ok(self.regions.clone())
    }

    async fn list_resources(
        &self,
        kind: ResourceKind,
        region: &str,
    ) -> Result<Vec<ResourceSnapshot>> {
        if self.failing_listings.contains(&(kind, region.to_string())) {
            return Err(SweepError::collaborator(kind.name(), "AccessDenied"));
        }
        Ok(self
            .resources
            .get(&(kind, region.to_string()))
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|mut s| {
                s.tags.clear();
                s
            })
            .collect())
    }

    async fn get_tags(&self, resource: &ResourceSnapshot) -> Result<HashMap<String, String>> {
        if self.failing_tags.contains(&resource.arn) {
            return Err(SweepError::collaborator("tagging", "Throttling"));
        }
        Ok(self
            .resources
            .get(&(resource.kind, resource.region.clone()))
            .and_then(|list| list.iter().find(|s| s.arn == resource.arn))
            .map(|s| s.tags.clone())
            .unwrap_or_default())
    }
}

/// Serves samples by resource id and remembers what was asked.
#[derive(Default)]
pub struct FakeMetrics {
    series: HashMap<String, Vec<Sample>>,
    failing: HashSet<String>,
    pub queries: Mutex<Vec<(String, String)>>,
}

impl FakeMetrics {
    pub fn series(mut self, id: &str, samples: Vec<Sample>) -> Self {
        self.series.insert(id.to_string(), samples);
        self
    }

    pub fn fail_for(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn queried(&self) -> Vec<(String, String)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricsProvider for FakeMetrics {
    async fn get_utilization(
        &self,
        resource: &ResourceSnapshot,
        query: &MetricQuery,
        _window: &LookbackWindow,
    ) -> Result<Vec<Sample>> {
        self.queries
            .lock()
            .unwrap()
            .push((resource.id.clone(), query.metric_name.to_string()));
        if self.failing.contains(&resource.id) {
            return Err(SweepError::collaborator("cloudwatch", "Throttling"));
        }
        Ok(self.series.get(&resource.id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct RecordingActuator {
    failing: HashMap<String, String>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl RecordingActuator {
    pub fn fail_for(mut self, id: &str, message: &str) -> Self {
        self.failing.insert(id.to_string(), message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, action: &str, resource: &ResourceSnapshot) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((action.to_string(), resource.id.clone()));
        match self.failing.get(&resource.id) {
            Some(message) => Err(SweepError::actuation(action, &resource.id, message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Actuator for RecordingActuator {
    async fn stop(&self, resource: &ResourceSnapshot) -> Result<()> {
        self.record("stop", resource)
    }

    async fn scale_to_zero(&self, resource: &ResourceSnapshot) -> Result<()> {
        self.record("scale_to_zero", resource)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    fail: bool,
    pub published: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }

    pub fn body(&self) -> String {
        self.published()
            .pop()
            .map(|(_, body)| body)
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn publish(&self, subject: &str, body: &str) -> Result<()> {
        self.published
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        if self.fail {
            return Err(SweepError::NotificationFailed {
                message: "AuthorizationError".to_string(),
            });
        }
        Ok(())
    }
}
