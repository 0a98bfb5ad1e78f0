use crate::domain::model::{ResourceKind, Topology};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    ClusterTopology,
    MirroredSqlServer,
    ReadReplica,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::ClusterTopology => "cluster topology does not support a stop operation",
            Self::MirroredSqlServer => "mirrored Multi-AZ SQL Server cannot be stopped",
            Self::ReadReplica => "active read-replica relationship",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stoppability {
    Stoppable,
    Blocked(BlockReason),
    AlreadyTransitioning,
    NotActionable,
}

/// Full RDS check: lifecycle status first, then topology.
pub fn check_stoppability(
    kind: ResourceKind,
    topology: Option<&Topology>,
    status: &str,
) -> Stoppability {
    match check_status(status) {
        Stoppability::Stoppable => check_topology(kind, topology),
        other => other,
    }
}

pub fn check_status(status: &str) -> Stoppability {
    match status {
        "stopping" => Stoppability::AlreadyTransitioning,
        "available" => Stoppability::Stoppable,
        _ => Stoppability::NotActionable,
    }
}

/// Structural blockers; first match wins. An RDS cluster is clustered by
/// kind, whatever its topology says; otherwise missing topology means none
/// known.
pub fn check_topology(kind: ResourceKind, topology: Option<&Topology>) -> Stoppability {
    if kind == ResourceKind::RdsCluster {
        return Stoppability::Blocked(BlockReason::ClusterTopology);
    }
    let Some(topology) = topology else {
        return Stoppability::Stoppable;
    };

    if topology.is_clustered {
        Stoppability::Blocked(BlockReason::ClusterTopology)
    } else if is_sql_server(&topology.engine) && topology.is_multi_az {
        Stoppability::Blocked(BlockReason::MirroredSqlServer)
    } else if topology.has_read_replicas || topology.is_replica_source {
        Stoppability::Blocked(BlockReason::ReadReplica)
    } else {
        Stoppability::Stoppable
    }
}

// sqlserver-ee, sqlserver-se, sqlserver-ex, sqlserver-web
fn is_sql_server(engine: &str) -> bool {
    engine.starts_with("sqlserver")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standalone(engine: &str) -> Topology {
        Topology {
            engine: engine.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_precedes_topology() {
        let clustered = Topology {
            is_clustered: true,
            ..Default::default()
        };
        assert_eq!(
            check_stoppability(ResourceKind::RdsInstance, Some(&clustered), "stopping"),
            Stoppability::AlreadyTransitioning
        );
        assert_eq!(
            check_stoppability(ResourceKind::RdsInstance, Some(&clustered), "maintenance"),
            Stoppability::NotActionable
        );
        assert_eq!(
            check_stoppability(ResourceKind::RdsInstance, Some(&clustered), "available"),
            Stoppability::Blocked(BlockReason::ClusterTopology)
        );
    }

    #[test]
    fn test_cluster_wins_over_replicas() {
        let topology = Topology {
            is_clustered: true,
            has_read_replicas: true,
            ..Default::default()
        };
        assert_eq!(
            check_topology(ResourceKind::RdsInstance, Some(&topology)),
            Stoppability::Blocked(BlockReason::ClusterTopology)
        );
    }

    #[test]
    fn test_sql_server_multi_az_is_blocked() {
        let mut topology = standalone("sqlserver-se");
        topology.is_multi_az = true;
        assert_eq!(
            check_topology(ResourceKind::RdsInstance, Some(&topology)),
            Stoppability::Blocked(BlockReason::MirroredSqlServer)
        );

        // Multi-AZ on other engines can be stopped.
        let mut postgres = standalone("postgres");
        postgres.is_multi_az = true;
        assert_eq!(check_topology(ResourceKind::RdsInstance, Some(&postgres)), Stoppability::Stoppable);
    }

    #[test]
    fn test_replica_relationships_block() {
        let mut source = standalone("mysql");
        source.has_read_replicas = true;
        assert_eq!(
            check_topology(ResourceKind::RdsInstance, Some(&source)),
            Stoppability::Blocked(BlockReason::ReadReplica)
        );

        let mut replica = standalone("mysql");
        replica.is_replica_source = true;
        assert_eq!(
            check_topology(ResourceKind::RdsInstance, Some(&replica)),
            Stoppability::Blocked(BlockReason::ReadReplica)
        );
    }

    #[test]
    fn test_cluster_kind_is_blocked_without_topology() {
        assert_eq!(
            check_topology(ResourceKind::RdsCluster, None),
            Stoppability::Blocked(BlockReason::ClusterTopology)
        );
        assert_eq!(
            check_stoppability(ResourceKind::RdsCluster, Some(&standalone("aurora-mysql")), "available"),
            Stoppability::Blocked(BlockReason::ClusterTopology)
        );
        assert_eq!(check_topology(ResourceKind::RdsInstance, None), Stoppability::Stoppable);
    }

    #[test]
    fn test_reason_text() {
        assert_eq!(
            BlockReason::ReadReplica.to_string(),
            "active read-replica relationship"
        );
    }
}
