use crate::core::constraints::{self, Stoppability};
use crate::core::exclusion::ExclusionPolicy;
use crate::core::idleness;
use crate::core::policy::{kind_policy, IdlenessRule, KindPolicy, SweepPolicy};
use crate::domain::model::{Action, Disposition, ResourceSnapshot};
use crate::domain::ports::Actuator;
use crate::utils::error::SweepError;

/// Outcome of the pure decision step, before any actuation.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Final(Disposition),
    Act {
        action: Action,
        detail: Option<String>,
    },
}

/// Checks that need only tags and status: exclusion, cluster ownership and
/// lifecycle state. `None` means the resource still needs an idleness verdict.
pub fn pre_screen(policy: &SweepPolicy, snapshot: &ResourceSnapshot) -> Option<Disposition> {
    let exclusion = ExclusionPolicy::new(&policy.exclude_tag_key, &policy.exclude_tag_value);
    if exclusion.is_excluded(&snapshot.tags) {
        return Some(Disposition::Excluded);
    }

    if snapshot.is_cluster_member() {
        return Some(Disposition::NotActionable {
            reason: "managed by its cluster".to_string(),
        });
    }

    let kp = kind_policy(snapshot.kind);
    let status = if snapshot.kind.is_rds() {
        constraints::check_status(&snapshot.status)
    } else {
        lifecycle_status(&kp, &snapshot.status)
    };

    match status {
        Stoppability::AlreadyTransitioning => Some(Disposition::AlreadyTransitioning),
        Stoppability::NotActionable => Some(Disposition::NotActionable {
            reason: format!("status {}", snapshot.status),
        }),
        _ if snapshot.desired_count == Some(0) => Some(Disposition::NotActionable {
            reason: "already scaled to zero".to_string(),
        }),
        _ => None,
    }
}

fn lifecycle_status(kp: &KindPolicy, status: &str) -> Stoppability {
    if status == kp.transitioning_status {
        Stoppability::AlreadyTransitioning
    } else if status == kp.ready_status {
        Stoppability::Stoppable
    } else {
        Stoppability::NotActionable
    }
}

/// Decide what to do with a fully populated snapshot.
pub fn decide(policy: &SweepPolicy, snapshot: &ResourceSnapshot) -> Verdict {
    if let Some(disposition) = pre_screen(policy, snapshot) {
        return Verdict::Final(disposition);
    }

    let rule = policy.idleness_rule(snapshot.kind);
    let samples = &snapshot.utilization_samples;
    if !idleness::is_idle(rule, samples, policy.cpu_threshold) {
        return Verdict::Final(Disposition::NotIdle);
    }

    let kp = kind_policy(snapshot.kind);
    if kp.structural_checks {
        if let Stoppability::Blocked(reason) =
            constraints::check_stoppability(snapshot.kind, snapshot.topology.as_ref(), &snapshot.status)
        {
            return Verdict::Final(Disposition::StructurallyBlocked {
                reason: reason.to_string(),
            });
        }
    }

    let detail = match rule {
        IdlenessRule::MaxBelowThreshold => Some(format!(
            "CPU: {:.1}%",
            idleness::peak(samples).unwrap_or(0.0)
        )),
        _ => None,
    };

    Verdict::Act {
        action: kp.action,
        detail,
    }
}

/// Turns verdicts into dispositions, issuing at most one actuator call per
/// resource.
pub struct DispositionResolver<'a, A: Actuator> {
    policy: &'a SweepPolicy,
    actuator: &'a A,
}

impl<'a, A: Actuator> DispositionResolver<'a, A> {
    pub fn new(policy: &'a SweepPolicy, actuator: &'a A) -> Self {
        Self { policy, actuator }
    }

    pub async fn resolve(&self, snapshot: &ResourceSnapshot) -> Disposition {
        match decide(self.policy, snapshot) {
            Verdict::Final(disposition) => disposition,
            Verdict::Act { action, detail } => self.execute(snapshot, action, detail).await,
        }
    }

    async fn execute(
        &self,
        snapshot: &ResourceSnapshot,
        action: Action,
        detail: Option<String>,
    ) -> Disposition {
        let result = match action {
            Action::Stop => self.actuator.stop(snapshot).await,
            Action::ScaleToZero => self.actuator.scale_to_zero(snapshot).await,
        };

        match result {
            Ok(()) => {
                tracing::info!(
                    "✅ {} {} ({}) -> {}",
                    snapshot.kind.label(),
                    snapshot.id,
                    snapshot.region,
                    action
                );
                Disposition::ActionTaken { action, detail }
            }
            Err(e) => {
                tracing::warn!(
                    "❌ {} {} ({}) {} failed: {}",
                    snapshot.kind.label(),
                    snapshot.id,
                    snapshot.region,
                    action,
                    e
                );
                let error = match e {
                    SweepError::ActuationFailed { message, .. } => message,
                    other => other.to_string(),
                };
                Disposition::ActionFailed { action, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ResourceKind, Sample, Topology};
    use crate::utils::error::Result;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Mutex;

    fn daily(values: &[f64]) -> Vec<Sample> {
        let end = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample::new(end - Duration::days(i as i64), *v))
            .collect()
    }

    fn ec2(status: &str, cpu: &[f64]) -> ResourceSnapshot {
        ResourceSnapshot::new(ResourceKind::Ec2Instance, "i-0abc", "us-east-1", status)
            .with_samples(daily(cpu))
    }

    fn rds(topology: Topology, connections: &[f64]) -> ResourceSnapshot {
        ResourceSnapshot::new(ResourceKind::RdsInstance, "orders-db", "eu-west-1", "available")
            .with_topology(topology)
            .with_samples(daily(connections))
    }

    #[derive(Default)]
    struct ScriptedActuator {
        fail_with: Option<String>,
        calls: Mutex<Vec<(Action, String)>>,
    }

    #[async_trait]
    impl Actuator for ScriptedActuator {
        async fn stop(&self, resource: &ResourceSnapshot) -> Result<()> {
            self.calls.lock().unwrap().push((Action::Stop, resource.id.clone()));
            match &self.fail_with {
                Some(msg) => Err(SweepError::actuation("stop", &resource.id, msg)),
                None => Ok(()),
            }
        }

        async fn scale_to_zero(&self, resource: &ResourceSnapshot) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((Action::ScaleToZero, resource.id.clone()));
            Ok(())
        }
    }

    #[test]
    fn test_exclusion_beats_everything() {
        let policy = SweepPolicy::default();
        let snapshot = ec2("stopping", &[99.0]).with_tag("stop", "exclude");
        assert_eq!(
            decide(&policy, &snapshot),
            Verdict::Final(Disposition::Excluded)
        );

        let clustered = rds(
            Topology {
                is_clustered: true,
                ..Default::default()
            },
            &[],
        )
        .with_tag("stop", "exclude");
        assert_eq!(
            decide(&policy, &clustered),
            Verdict::Final(Disposition::Excluded)
        );
    }

    #[test]
    fn test_stopping_is_already_transitioning() {
        let policy = SweepPolicy::default();
        let snapshot = ec2("stopping", &[0.0]);
        assert_eq!(
            decide(&policy, &snapshot),
            Verdict::Final(Disposition::AlreadyTransitioning)
        );

        let mut db = rds(Topology::default(), &[12.0]);
        db.status = "stopping".to_string();
        assert_eq!(
            decide(&policy, &db),
            Verdict::Final(Disposition::AlreadyTransitioning)
        );
    }

    #[test]
    fn test_ec2_idle_gets_stop_with_cpu_detail() {
        let policy = SweepPolicy::default();
        assert_eq!(
            decide(&policy, &ec2("running", &[1.2, 3.0, 4.9])),
            Verdict::Act {
                action: Action::Stop,
                detail: Some("CPU: 4.9%".to_string()),
            }
        );
        assert_eq!(
            decide(&policy, &ec2("running", &[])),
            Verdict::Act {
                action: Action::Stop,
                detail: Some("CPU: 0.0%".to_string()),
            }
        );
    }

    #[test]
    fn test_ec2_at_threshold_is_not_idle() {
        let policy = SweepPolicy::default();
        assert_eq!(
            decide(&policy, &ec2("running", &[1.0, 5.0, 2.0])),
            Verdict::Final(Disposition::NotIdle)
        );
    }

    #[test]
    fn test_ecs_only_needs_no_exclusion() {
        let policy = SweepPolicy::default();
        let service = ResourceSnapshot::new(ResourceKind::EcsService, "web", "us-east-1", "ACTIVE")
            .with_desired_count(3);
        assert_eq!(
            decide(&policy, &service),
            Verdict::Act {
                action: Action::ScaleToZero,
                detail: None,
            }
        );

        let drained = service.clone().with_desired_count(0);
        assert!(matches!(
            decide(&policy, &drained),
            Verdict::Final(Disposition::NotActionable { .. })
        ));

        let mut draining = service;
        draining.status = "DRAINING".to_string();
        assert_eq!(
            decide(&policy, &draining),
            Verdict::Final(Disposition::AlreadyTransitioning)
        );
    }

    #[test]
    fn test_rds_blocked_only_when_idle() {
        let policy = SweepPolicy::default();
        let replicated = Topology {
            engine: "mysql".to_string(),
            has_read_replicas: true,
            ..Default::default()
        };
        assert_eq!(
            decide(&policy, &rds(replicated.clone(), &[0.0, 0.0])),
            Verdict::Final(Disposition::StructurallyBlocked {
                reason: "active read-replica relationship".to_string()
            })
        );
        assert_eq!(
            decide(&policy, &rds(replicated, &[0.0, 4.0])),
            Verdict::Final(Disposition::NotIdle)
        );
    }

    #[test]
    fn test_status_only_mode_ignores_connections() {
        let policy = SweepPolicy {
            require_metric_check: false,
            ..Default::default()
        };
        let busy = rds(
            Topology {
                engine: "postgres".to_string(),
                ..Default::default()
            },
            &[40.0],
        );
        assert_eq!(
            decide(&policy, &busy),
            Verdict::Act {
                action: Action::Stop,
                detail: None,
            }
        );
    }

    #[test]
    fn test_unknown_status_is_not_actionable() {
        let policy = SweepPolicy::default();
        let mut db = rds(Topology::default(), &[]);
        db.status = "maintenance".to_string();
        assert_eq!(
            decide(&policy, &db),
            Verdict::Final(Disposition::NotActionable {
                reason: "status maintenance".to_string()
            })
        );
    }

    #[test]
    fn test_cluster_member_is_refused() {
        let policy = SweepPolicy::default();
        let member = rds(
            Topology {
                is_member_of_cluster: true,
                ..Default::default()
            },
            &[],
        );
        assert!(matches!(
            decide(&policy, &member),
            Verdict::Final(Disposition::NotActionable { .. })
        ));
    }

    #[test]
    fn test_resolve_calls_actuator_once() {
        let policy = SweepPolicy::default();
        let actuator = ScriptedActuator::default();
        let resolver = DispositionResolver::new(&policy, &actuator);

        let disposition = tokio_test::block_on(resolver.resolve(&ec2("running", &[2.0])));
        assert_eq!(
            disposition,
            Disposition::ActionTaken {
                action: Action::Stop,
                detail: Some("CPU: 2.0%".to_string()),
            }
        );
        assert_eq!(
            *actuator.calls.lock().unwrap(),
            vec![(Action::Stop, "i-0abc".to_string())]
        );
    }

    #[test]
    fn test_resolve_converts_failure() {
        let policy = SweepPolicy::default();
        let actuator = ScriptedActuator {
            fail_with: Some("InvalidDBInstanceState".to_string()),
            ..Default::default()
        };
        let resolver = DispositionResolver::new(&policy, &actuator);

        let disposition = tokio_test::block_on(resolver.resolve(&rds(Topology::default(), &[])));
        assert_eq!(
            disposition,
            Disposition::ActionFailed {
                action: Action::Stop,
                error: "InvalidDBInstanceState".to_string(),
            }
        );
    }

    #[test]
    fn test_blocked_resource_never_reaches_actuator() {
        let policy = SweepPolicy::default();
        let actuator = ScriptedActuator::default();
        let resolver = DispositionResolver::new(&policy, &actuator);
        let cluster = ResourceSnapshot::new(ResourceKind::RdsCluster, "aurora-1", "us-east-1", "available")
            .with_topology(Topology {
                is_clustered: true,
                engine: "aurora-postgresql".to_string(),
                ..Default::default()
            });

        let disposition = tokio_test::block_on(resolver.resolve(&cluster));
        assert!(matches!(disposition, Disposition::StructurallyBlocked { .. }));
        assert!(actuator.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cluster_without_topology_is_still_blocked() {
        let policy = SweepPolicy::default();
        let actuator = ScriptedActuator::default();
        let resolver = DispositionResolver::new(&policy, &actuator);
        let cluster =
            ResourceSnapshot::new(ResourceKind::RdsCluster, "aurora-2", "us-east-1", "available");

        let disposition = tokio_test::block_on(resolver.resolve(&cluster));
        assert_eq!(
            disposition,
            Disposition::StructurallyBlocked {
                reason: "cluster topology does not support a stop operation".to_string(),
            }
        );
        assert!(actuator.calls.lock().unwrap().is_empty());
    }
}
