//! Per-kind sweep policy and the run-wide settings derived from configuration.
//!
//! The kinds deliberately do not share one idleness rule: ECS services are
//! scaled to zero whenever they are not excluded, EC2 is gated on peak CPU and
//! RDS on connection activity.

use crate::domain::model::{Action, ResourceKind};
use crate::domain::ports::{ConfigProvider, MetricQuery};

pub const DEFAULT_EXCLUDE_TAG_KEY: &str = "stop";
pub const DEFAULT_EXCLUDE_TAG_VALUE: &str = "exclude";
pub const DEFAULT_CPU_THRESHOLD: f64 = 5.0;
pub const DEFAULT_LOOKBACK_DAYS: u32 = 10;
pub const DEFAULT_CONCURRENT_REGIONS: usize = 4;

const DAILY: i32 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlenessRule {
    /// No utilization gate.
    AlwaysIdle,
    /// Idle iff no samples or the peak is strictly below the CPU threshold.
    MaxBelowThreshold,
    /// Idle iff no samples or every period's maximum is zero.
    ZeroActivity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindPolicy {
    pub ready_status: &'static str,
    pub transitioning_status: &'static str,
    pub idleness: IdlenessRule,
    pub metric: Option<MetricQuery>,
    pub action: Action,
    pub structural_checks: bool,
}

pub fn kind_policy(kind: ResourceKind) -> KindPolicy {
    match kind {
        ResourceKind::EcsService => KindPolicy {
            ready_status: "ACTIVE",
            transitioning_status: "DRAINING",
            idleness: IdlenessRule::AlwaysIdle,
            metric: None,
            action: Action::ScaleToZero,
            structural_checks: false,
        },
        ResourceKind::Ec2Instance => KindPolicy {
            ready_status: "running",
            transitioning_status: "stopping",
            idleness: IdlenessRule::MaxBelowThreshold,
            metric: Some(MetricQuery {
                namespace: "AWS/EC2",
                metric_name: "CPUUtilization",
                dimension: "InstanceId",
                period_seconds: DAILY,
            }),
            action: Action::Stop,
            structural_checks: false,
        },
        ResourceKind::RdsCluster => KindPolicy {
            ready_status: "available",
            transitioning_status: "stopping",
            idleness: IdlenessRule::ZeroActivity,
            metric: Some(MetricQuery {
                namespace: "AWS/RDS",
                metric_name: "DatabaseConnections",
                dimension: "DBClusterIdentifier",
                period_seconds: DAILY,
            }),
            action: Action::Stop,
            structural_checks: true,
        },
        ResourceKind::RdsInstance => KindPolicy {
            ready_status: "available",
            transitioning_status: "stopping",
            idleness: IdlenessRule::ZeroActivity,
            metric: Some(MetricQuery {
                namespace: "AWS/RDS",
                metric_name: "DatabaseConnections",
                dimension: "DBInstanceIdentifier",
                period_seconds: DAILY,
            }),
            action: Action::Stop,
            structural_checks: true,
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPolicy {
    pub exclude_tag_key: String,
    pub exclude_tag_value: String,
    pub cpu_threshold: f64,
    pub lookback_days: u32,
    pub enabled_kinds: Vec<ResourceKind>,
    /// When false, RDS idleness is decided by status alone.
    pub require_metric_check: bool,
    pub regions: Vec<String>,
    pub concurrent_regions: usize,
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self {
            exclude_tag_key: DEFAULT_EXCLUDE_TAG_KEY.to_string(),
            exclude_tag_value: DEFAULT_EXCLUDE_TAG_VALUE.to_string(),
            cpu_threshold: DEFAULT_CPU_THRESHOLD,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            enabled_kinds: ResourceKind::ALL.to_vec(),
            require_metric_check: true,
            regions: Vec::new(),
            concurrent_regions: DEFAULT_CONCURRENT_REGIONS,
        }
    }
}

impl SweepPolicy {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            exclude_tag_key: config.exclude_tag_key().to_string(),
            exclude_tag_value: config.exclude_tag_value().to_string(),
            cpu_threshold: config.cpu_threshold(),
            lookback_days: config.lookback_days(),
            enabled_kinds: config.enabled_kinds().to_vec(),
            require_metric_check: config.require_metric_check(),
            regions: config.regions().to_vec(),
            concurrent_regions: config.concurrent_regions().max(1),
        }
    }

    /// Enabled kinds in evaluation order, regardless of configured order.
    pub fn kinds(&self) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|kind| self.enabled_kinds.contains(kind))
            .collect()
    }

    /// The idleness rule in force for `kind` under this configuration.
    pub fn idleness_rule(&self, kind: ResourceKind) -> IdlenessRule {
        let rule = kind_policy(kind).idleness;
        if kind.is_rds() && !self.require_metric_check {
            IdlenessRule::AlwaysIdle
        } else {
            rule
        }
    }

    /// Metric to fetch for `kind`, if its idleness rule needs one.
    pub fn metric_for(&self, kind: ResourceKind) -> Option<MetricQuery> {
        match self.idleness_rule(kind) {
            IdlenessRule::AlwaysIdle => None,
            _ => kind_policy(kind).metric,
        }
    }
}
