use super::{sdk_message, AwsClients};
use crate::core::constraints::BlockReason;
use crate::domain::model::{ResourceKind, ResourceSnapshot};
use crate::domain::ports::Actuator;
use crate::utils::error::{Result, SweepError};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct AwsActuator {
    clients: AwsClients,
}

impl AwsActuator {
    pub fn new(clients: AwsClients) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl Actuator for AwsActuator {
    async fn stop(&self, resource: &ResourceSnapshot) -> Result<()> {
        let region = resource.region.as_str();
        let failed = |message: String| SweepError::actuation("stop", &resource.id, message);

        match resource.kind {
            ResourceKind::Ec2Instance => self
                .clients
                .ec2(region)
                .stop_instances()
                .instance_ids(&resource.id)
                .send()
                .await
                .map(|_| ())
                .map_err(|e| failed(sdk_message(&e))),
            ResourceKind::RdsInstance => self
                .clients
                .rds(region)
                .stop_db_instance()
                .db_instance_identifier(&resource.id)
                .send()
                .await
                .map(|_| ())
                .map_err(|e| failed(sdk_message(&e))),
            ResourceKind::RdsCluster => Err(failed(BlockReason::ClusterTopology.to_string())),
            ResourceKind::EcsService => Err(failed(
                "ECS services are scaled to zero, not stopped".to_string(),
            )),
        }
    }

    async fn scale_to_zero(&self, resource: &ResourceSnapshot) -> Result<()> {
        let failed = |message: String| SweepError::actuation("scale", &resource.id, message);

        if resource.kind != ResourceKind::EcsService {
            return Err(failed(format!("{} cannot be scaled", resource.kind.label())));
        }
        let cluster = resource
            .parent
            .as_deref()
            .ok_or_else(|| failed("service has no owning cluster".to_string()))?;

        self.clients
            .ecs(&resource.region)
            .update_service()
            .cluster(cluster)
            .service(&resource.arn)
            .desired_count(0)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| failed(sdk_message(&e)))
    }
}
