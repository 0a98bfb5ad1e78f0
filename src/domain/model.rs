use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::utils::error::SweepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    #[serde(rename = "ecs")]
    EcsService,
    #[serde(rename = "ec2")]
    Ec2Instance,
    RdsCluster,
    RdsInstance,
}

impl ResourceKind {
    /// Evaluation order within a region.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::EcsService,
        ResourceKind::Ec2Instance,
        ResourceKind::RdsCluster,
        ResourceKind::RdsInstance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::EcsService => "ecs",
            Self::Ec2Instance => "ec2",
            Self::RdsCluster => "rds-cluster",
            Self::RdsInstance => "rds-instance",
        }
    }

    /// Label used in report lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EcsService => "ECS",
            Self::Ec2Instance => "EC2",
            Self::RdsCluster => "RDS Cluster",
            Self::RdsInstance => "RDS",
        }
    }

    pub fn is_rds(&self) -> bool {
        matches!(self, Self::RdsCluster | Self::RdsInstance)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SweepError::InvalidConfigValueError {
                field: "kinds".to_string(),
                value: s.to_string(),
                reason: "Expected one of: ecs, ec2, rds-cluster, rds-instance".to_string(),
            })
    }
}

/// One metric datapoint; for daily periods `value` is that period's maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub is_clustered: bool,
    pub is_multi_az: bool,
    pub engine: String,
    pub has_read_replicas: bool,
    pub is_replica_source: bool,
    pub is_member_of_cluster: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub kind: ResourceKind,
    pub id: String,
    /// Provider-level name used for tag lookups. Equal to `id` for EC2.
    pub arn: String,
    pub region: String,
    /// Owning container, e.g. the ECS cluster ARN of a service.
    pub parent: Option<String>,
    pub tags: HashMap<String, String>,
    pub status: String,
    pub desired_count: Option<i32>,
    pub utilization_samples: Vec<Sample>,
    pub topology: Option<Topology>,
}

impl ResourceSnapshot {
    pub fn new(
        kind: ResourceKind,
        id: impl Into<String>,
        region: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            kind,
            arn: id.clone(),
            id,
            region: region.into(),
            parent: None,
            tags: HashMap::new(),
            status: status.into(),
            desired_count: None,
            utilization_samples: Vec::new(),
            topology: None,
        }
    }

    pub fn with_arn(mut self, arn: impl Into<String>) -> Self {
        self.arn = arn.into();
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_desired_count(mut self, count: i32) -> Self {
        self.desired_count = Some(count);
        self
    }

    pub fn with_samples(mut self, samples: Vec<Sample>) -> Self {
        self.utilization_samples = samples;
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = Some(topology);
        self
    }

    /// RDS instance owned by a cluster; evaluated through the cluster only.
    pub fn is_cluster_member(&self) -> bool {
        self.kind == ResourceKind::RdsInstance
            && self
                .topology
                .as_ref()
                .is_some_and(|t| t.is_member_of_cluster)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Stop,
    ScaleToZero,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::ScaleToZero => write!(f, "scale to zero"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum Disposition {
    Excluded,
    AlreadyTransitioning,
    StructurallyBlocked { reason: String },
    ActionTaken { action: Action, detail: Option<String> },
    ActionFailed { action: Action, error: String },
    NotIdle,
    /// Nothing to do this run, e.g. status `maintenance` or `creating`.
    NotActionable { reason: String },
}

impl Disposition {
    /// Whether this disposition belongs in the report body.
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, Self::NotIdle | Self::NotActionable { .. })
    }
}
