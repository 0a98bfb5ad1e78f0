use crate::core::policy::SweepPolicy;
use crate::core::report::{ReportAggregator, ReportLine};
use crate::core::resolver::{self, DispositionResolver};
use crate::domain::model::ResourceSnapshot;
use crate::domain::ports::{
    Actuator, InventoryProvider, LookbackWindow, MetricsProvider, NotificationSink,
};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    ReportSent,
    NoActionTaken,
    DeliveryFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub status: &'static str,
    pub items_processed: usize,
    pub outcome: RunOutcome,
    pub regions_swept: usize,
    /// Regions/kinds or single resources skipped because a lookup failed.
    pub lookups_failed: usize,
}

struct RegionSweep {
    region: String,
    report: ReportAggregator,
    lookups_failed: usize,
}

pub struct SweepEngine<I, M, A, N> {
    inventory: I,
    metrics: M,
    actuator: A,
    notifier: N,
    policy: SweepPolicy,
}

impl<I, M, A, N> SweepEngine<I, M, A, N>
where
    I: InventoryProvider,
    M: MetricsProvider,
    A: Actuator,
    N: NotificationSink,
{
    pub fn new(inventory: I, metrics: M, actuator: A, notifier: N, policy: SweepPolicy) -> Self {
        Self {
            inventory,
            metrics,
            actuator,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> &SweepPolicy {
        &self.policy
    }

    pub async fn run(&self) -> Result<RunSummary> {
        self.run_at(Utc::now()).await
    }

    /// One full sweep with the lookback window ending at `now`. Fails only
    /// when the region list itself cannot be fetched.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        tracing::info!("🚀 Starting idle resource sweep");

        let regions = self.target_regions().await?;
        let window = LookbackWindow::ending_at(now, self.policy.lookback_days);
        tracing::info!(
            "Sweeping {} region(s), lookback {} day(s), kinds: {:?}",
            regions.len(),
            self.policy.lookback_days,
            self.policy.kinds()
        );

        // 各區域並行處理，結果依區域名稱合併
        let sweeps: Vec<RegionSweep> = stream::iter(regions.iter())
            .map(|region| self.sweep_region(region, window))
            .buffer_unordered(self.policy.concurrent_regions.max(1))
            .collect()
            .await;

        let lookups_failed = sweeps.iter().map(|s| s.lookups_failed).sum();
        let report = ReportAggregator::merge_by_region(
            sweeps.into_iter().map(|s| (s.region, s.report)).collect(),
        );
        let items_processed = report.len();

        let outcome = match report.build(now.date_naive()) {
            None => {
                tracing::info!("Done: no active resources found to stop");
                RunOutcome::NoActionTaken
            }
            Some(report) => match self.notifier.publish(&report.subject, &report.body).await {
                Ok(()) => {
                    tracing::info!("📨 Report sent ({} item(s))", report.item_count);
                    RunOutcome::ReportSent
                }
                Err(e) => {
                    tracing::error!("❌ Report delivery failed: {}", e);
                    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
                    RunOutcome::DeliveryFailed
                }
            },
        };

        Ok(RunSummary {
            status: "success",
            items_processed,
            outcome,
            regions_swept: regions.len(),
            lookups_failed,
        })
    }

    async fn target_regions(&self) -> Result<Vec<String>> {
        let mut regions = self.inventory.list_regions().await.map_err(|e| {
            tracing::error!("❌ Cannot enumerate regions: {}", e);
            e
        })?;

        if !self.policy.regions.is_empty() {
            for wanted in &self.policy.regions {
                if !regions.contains(wanted) {
                    tracing::warn!("Configured region {} is not enabled for this account", wanted);
                }
            }
            regions.retain(|r| self.policy.regions.contains(r));
        }

        regions.sort();
        regions.dedup();
        Ok(regions)
    }

    async fn sweep_region(&self, region: &str, window: LookbackWindow) -> RegionSweep {
        tracing::info!("--- Processing Region: {} ---", region);

        let resolver = DispositionResolver::new(&self.policy, &self.actuator);
        let mut report = ReportAggregator::new();
        let mut lookups_failed = 0;

        for kind in self.policy.kinds() {
            let resources = match self.inventory.list_resources(kind, region).await {
                Ok(resources) => resources,
                Err(e) => {
                    tracing::warn!("{} listing failed in {}: {}", kind.label(), region, e);
                    lookups_failed += 1;
                    continue;
                }
            };
            tracing::debug!("{} {} resource(s) in {}", resources.len(), kind, region);

            for snapshot in resources {
                if snapshot.is_cluster_member() {
                    tracing::debug!("Skipping {}: evaluated with its cluster", snapshot.id);
                    continue;
                }

                let id = snapshot.id.clone();
                match self.evaluate(snapshot, &resolver, &window).await {
                    Ok(line) => {
                        tracing::debug!("{} {} -> {:?}", kind, line.id, line.disposition);
                        report.record(line);
                    }
                    Err(e) => {
                        tracing::warn!("Skipping {} {} in {}: {}", kind.label(), id, region, e);
                        lookups_failed += 1;
                    }
                }
            }
        }

        RegionSweep {
            region: region.to_string(),
            report,
            lookups_failed,
        }
    }

    /// Fill in tags and, when the policy needs them, utilization samples,
    /// then resolve. Metrics are only fetched for resources that pass the
    /// tag and status checks.
    async fn evaluate(
        &self,
        mut snapshot: ResourceSnapshot,
        resolver: &DispositionResolver<'_, A>,
        window: &LookbackWindow,
    ) -> Result<ReportLine> {
        snapshot.tags = self.inventory.get_tags(&snapshot).await?;

        if let Some(disposition) = resolver::pre_screen(&self.policy, &snapshot) {
            return Ok(ReportLine::new(&snapshot, disposition));
        }

        if let Some(query) = self.policy.metric_for(snapshot.kind) {
            snapshot.utilization_samples = self
                .metrics
                .get_utilization(&snapshot, &query, window)
                .await?;
        }

        let disposition = resolver.resolve(&snapshot).await;
        Ok(ReportLine::new(&snapshot, disposition))
    }
}
