use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use geoinsight_core::{LeadHunter, LeadRecord, TargetConfig};
use geoinsight_db::LeadRepository;
use tracing::{error, info};

const LEAD_SOURCE: &str = "scheduled_grid_search";

/// Recurring grid search that stores every candidate it finds.
pub struct ProspectingJob {
    hunter: Arc<dyn LeadHunter>,
    leads: Arc<dyn LeadRepository>,
    target: TargetConfig,
    interval: Duration,
}

impl ProspectingJob {
    pub fn new(
        hunter: Arc<dyn LeadHunter>,
        leads: Arc<dyn LeadRepository>,
        target: TargetConfig,
        interval: Duration,
    ) -> Self {
        Self { hunter, leads, target, interval }
    }

    /// Runs one search and upserts its candidates. Returns the number stored.
    pub async fn run_once(&self) -> anyhow::Result<usize> {
        let candidates = self
            .hunter
            .grid_search(&self.target)
            .await
            .with_context(|| format!("grid search for `{}`", self.target.keyword))?;

        let mut stored = 0;
        for candidate in candidates {
            let record =
                LeadRecord::from_candidate(candidate, Some(self.target.keyword.clone()), LEAD_SOURCE);
            let name = record.name.clone();
            self.leads.upsert(record).await.with_context(|| format!("storing lead `{name}`"))?;
            stored += 1;
        }

        info!(
            event_name = "scheduler.cycle.completed",
            keyword = %self.target.keyword,
            leads_stored = stored,
            "prospecting cycle completed"
        );
        Ok(stored)
    }

    /// Runs a cycle immediately and then once per interval until `shutdown`
    /// resolves. A failed cycle is logged and the schedule continues.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut cycles = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(event_name = "scheduler.stopped", cycles, "prospecting schedule stopped");
                    return cycles;
                }
                _ = ticker.tick() => {
                    cycles += 1;
                    if let Err(error) = self.run_once().await {
                        error!(
                            event_name = "scheduler.cycle.failed",
                            cycle = cycles,
                            error = %format!("{error:#}"),
                            "prospecting cycle failed"
                        );
                    }
                }
            }
        }
    }
}
