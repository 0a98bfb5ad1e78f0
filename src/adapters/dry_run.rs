use crate::domain::model::ResourceSnapshot;
use crate::domain::ports::Actuator;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Logs the action it would take and reports success without touching the
/// resource.
#[derive(Debug, Clone, Default)]
pub struct DryRunActuator;

#[async_trait]
impl Actuator for DryRunActuator {
    async fn stop(&self, resource: &ResourceSnapshot) -> Result<()> {
        tracing::info!(
            "🔍 [dry-run] would stop {} {} ({})",
            resource.kind.label(),
            resource.id,
            resource.region
        );
        Ok(())
    }

    async fn scale_to_zero(&self, resource: &ResourceSnapshot) -> Result<()> {
        tracing::info!(
            "🔍 [dry-run] would scale {} {} ({}) to zero",
            resource.kind.label(),
            resource.id,
            resource.region
        );
        Ok(())
    }
}

/// Either the real actuator or [`DryRunActuator`], chosen at start-up.
pub enum MaybeDryRun<A> {
    Live(A),
    DryRun(DryRunActuator),
}

impl<A> MaybeDryRun<A> {
    pub fn new(actuator: A, dry_run: bool) -> Self {
        if dry_run {
            Self::DryRun(DryRunActuator)
        } else {
            Self::Live(actuator)
        }
    }
}

#[async_trait]
impl<A: Actuator> Actuator for MaybeDryRun<A> {
    async fn stop(&self, resource: &ResourceSnapshot) -> Result<()> {
        match self {
            Self::Live(actuator) => actuator.stop(resource).await,
            Self::DryRun(actuator) => actuator.stop(resource).await,
        }
    }

    async fn scale_to_zero(&self, resource: &ResourceSnapshot) -> Result<()> {
        match self {
            Self::Live(actuator) => actuator.scale_to_zero(resource).await,
            Self::DryRun(actuator) => actuator.scale_to_zero(resource).await,
        }
    }
}
