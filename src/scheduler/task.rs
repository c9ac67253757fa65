use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

use super::service::ScoringService;

/// Starts the background task that periodically rebuilds stale ranking tables
#[instrument(skip(scoring_service))]
pub async fn start_scoring_task(scoring_service: Arc<ScoringService>) {
    let period = scoring_service.config().recompute_interval;
    info!(
        recompute_interval_secs = period.as_secs(),
        recompute_timeout_secs = scoring_service.config().recompute_timeout.as_secs(),
        "Starting ranking recomputation background task"
    );

    let mut recompute_interval = interval(period);
    recompute_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        recompute_interval.tick().await;
        run_scoring_pass(&scoring_service).await;
    }
}

/// One scheduler pass; failures are logged and never stop the loop
pub(crate) async fn run_scoring_pass(scoring_service: &ScoringService) -> usize {
    match scoring_service.recompute_all().await {
        Ok(report) => {
            if !report.failed.is_empty() {
                warn!(failed = report.failed.len(), "Some Kups could not be recomputed");
            }
            info!(
                rebuilt = report.rebuilt.len(),
                coalesced = report.coalesced.len(),
                failed = report.failed.len(),
                "Ranking recomputation pass completed"
            );
            report.rebuilt.len()
        }
        Err(e) => {
            error!(error = %e, "Ranking recomputation pass failed");
            0
        }
    }
}
