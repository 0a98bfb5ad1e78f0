use super::{sdk_message, AwsClients};
use crate::domain::model::{ResourceKind, ResourceSnapshot, Topology};
use crate::domain::ports::InventoryProvider;
use crate::utils::error::{Result, SweepError};
use async_trait::async_trait;
use aws_sdk_ec2::types::{Filter, Instance};
use std::collections::HashMap;

// describe_services accepts at most 10 services per call
const ECS_DESCRIBE_BATCH: usize = 10;

#[derive(Debug, Clone)]
pub struct AwsInventory {
    clients: AwsClients,
}

impl AwsInventory {
    pub fn new(clients: AwsClients) -> Self {
        Self { clients }
    }

    async fn list_ecs_services(&self, region: &str) -> Result<Vec<ResourceSnapshot>> {
        let client = self.clients.ecs(region);
        let unavailable = |e: String| SweepError::collaborator("ecs", e);

        let mut cluster_arns = Vec::new();
        let mut pages = client.list_clusters().into_paginator().send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| unavailable(sdk_message(&e)))?;
            cluster_arns.extend(page.cluster_arns().iter().cloned());
        }

        let mut snapshots = Vec::new();
        for cluster in &cluster_arns {
            let mut service_arns = Vec::new();
            let mut pages = client.list_services().cluster(cluster).into_paginator().send();
            while let Some(page) = pages.next().await {
                let page = page.map_err(|e| unavailable(sdk_message(&e)))?;
                service_arns.extend(page.service_arns().iter().cloned());
            }

            for batch in service_arns.chunks(ECS_DESCRIBE_BATCH) {
                let output = client
                    .describe_services()
                    .cluster(cluster)
                    .set_services(Some(batch.to_vec()))
                    .send()
                    .await
                    .map_err(|e| unavailable(sdk_message(&e)))?;

                for service in output.services() {
                    let Some(arn) = service.service_arn() else {
                        continue;
                    };
                    let name = service
                        .service_name()
                        .or_else(|| arn.rsplit('/').next())
                        .unwrap_or(arn);
                    snapshots.push(
                        ResourceSnapshot::new(
                            ResourceKind::EcsService,
                            name,
                            region,
                            service.status().unwrap_or_default(),
                        )
                        .with_arn(arn)
                        .with_parent(cluster)
                        .with_desired_count(service.desired_count()),
                    );
                }
            }
        }

        Ok(snapshots)
    }

    async fn list_ec2_instances(&self, region: &str) -> Result<Vec<ResourceSnapshot>> {
        let client = self.clients.ec2(region);
        let state_filter = Filter::builder()
            .name("instance-state-name")
            .values("running")
            .values("stopping")
            .build();

        let mut snapshots = Vec::new();
        let mut pages = client
            .describe_instances()
            .filters(state_filter)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| SweepError::collaborator("ec2", sdk_message(&e)))?;
            snapshots.extend(
                page.reservations()
                    .iter()
                    .flat_map(|r| r.instances())
                    .filter_map(|instance| ec2_snapshot(instance, region)),
            );
        }

        Ok(snapshots)
    }

    async fn list_rds_clusters(&self, region: &str) -> Result<Vec<ResourceSnapshot>> {
        let client = self.clients.rds(region);
        let mut snapshots = Vec::new();

        let mut pages = client.describe_db_clusters().into_paginator().send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| SweepError::collaborator("rds", sdk_message(&e)))?;
            for cluster in page.db_clusters() {
                let Some(id) = cluster.db_cluster_identifier() else {
                    continue;
                };
                let topology = Topology {
                    is_clustered: true,
                    is_multi_az: cluster.multi_az().unwrap_or(false),
                    engine: cluster.engine().unwrap_or_default().to_string(),
                    has_read_replicas: !cluster.read_replica_identifiers().is_empty(),
                    is_replica_source: cluster.replication_source_identifier().is_some(),
                    is_member_of_cluster: false,
                };
                snapshots.push(
                    ResourceSnapshot::new(
                        ResourceKind::RdsCluster,
                        id,
                        region,
                        cluster.status().unwrap_or_default(),
                    )
                    .with_arn(cluster.db_cluster_arn().unwrap_or(id))
                    .with_topology(topology),
                );
            }
        }

        Ok(snapshots)
    }

    async fn list_rds_instances(&self, region: &str) -> Result<Vec<ResourceSnapshot>> {
        let client = self.clients.rds(region);
        let mut snapshots = Vec::new();

        let mut pages = client.describe_db_instances().into_paginator().send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| SweepError::collaborator("rds", sdk_message(&e)))?;
            for db in page.db_instances() {
                let Some(id) = db.db_instance_identifier() else {
                    continue;
                };
                let topology = Topology {
                    is_clustered: false,
                    is_multi_az: db.multi_az().unwrap_or(false),
                    engine: db.engine().unwrap_or_default().to_string(),
                    has_read_replicas: !db.read_replica_db_instance_identifiers().is_empty()
                        || !db.read_replica_db_cluster_identifiers().is_empty(),
                    is_replica_source: db.read_replica_source_db_instance_identifier().is_some(),
                    is_member_of_cluster: db.db_cluster_identifier().is_some(),
                };
                snapshots.push(
                    ResourceSnapshot::new(
                        ResourceKind::RdsInstance,
                        id,
                        region,
                        db.db_instance_status().unwrap_or_default(),
                    )
                    .with_arn(db.db_instance_arn().unwrap_or(id))
                    .with_topology(topology),
                );
            }
        }

        Ok(snapshots)
    }
}

#[async_trait]
impl InventoryProvider for AwsInventory {
    async fn list_regions(&self) -> Result<Vec<String>> {
        let client = self.clients.ec2(&self.clients.home_region());
        let output = client
            .describe_regions()
            .send()
            .await
            .map_err(|e| SweepError::collaborator("ec2", sdk_message(&e)))?;

        Ok(output
            .regions()
            .iter()
            .filter_map(|r| r.region_name().map(str::to_string))
            .collect())
    }

    async fn list_resources(
        &self,
        kind: ResourceKind,
        region: &str,
    ) -> Result<Vec<ResourceSnapshot>> {
        match kind {
            ResourceKind::EcsService => self.list_ecs_services(region).await,
            ResourceKind::Ec2Instance => self.list_ec2_instances(region).await,
            ResourceKind::RdsCluster => self.list_rds_clusters(region).await,
            ResourceKind::RdsInstance => self.list_rds_instances(region).await,
        }
    }

    async fn get_tags(&self, resource: &ResourceSnapshot) -> Result<HashMap<String, String>> {
        let region = resource.region.as_str();
        match resource.kind {
            ResourceKind::EcsService => {
                let output = self
                    .clients
                    .ecs(region)
                    .list_tags_for_resource()
                    .resource_arn(&resource.arn)
                    .send()
                    .await
                    .map_err(|e| SweepError::collaborator("ecs", sdk_message(&e)))?;
                Ok(output
                    .tags()
                    .iter()
                    .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
                    .collect())
            }
            // describe_instances 已帶回標籤
            ResourceKind::Ec2Instance => Ok(resource.tags.clone()),
            ResourceKind::RdsCluster | ResourceKind::RdsInstance => {
                let output = self
                    .clients
                    .rds(region)
                    .list_tags_for_resource()
                    .resource_name(&resource.arn)
                    .send()
                    .await
                    .map_err(|e| SweepError::collaborator("rds", sdk_message(&e)))?;
                Ok(output
                    .tag_list()
                    .iter()
                    .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
                    .collect())
            }
        }
    }
}

/// Snapshot with tags, which `describe_instances` returns inline.
fn ec2_snapshot(instance: &Instance, region: &str) -> Option<ResourceSnapshot> {
    let id = instance.instance_id()?;
    let status = instance
        .state()
        .and_then(|s| s.name())
        .map(|name| name.as_str())
        .unwrap_or_default();

    let mut snapshot = ResourceSnapshot::new(ResourceKind::Ec2Instance, id, region, status);
    snapshot.tags = instance
        .tags()
        .iter()
        .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
        .collect();
    Some(snapshot)
}
