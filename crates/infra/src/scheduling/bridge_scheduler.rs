//! Cron-driven batch scheduler.
//!
//! Registers the three recurring sweeps against one `JobScheduler`: the
//! five-minute inventory push, the two-hour catalog reconciliation, and the
//! daily maintenance run (order retries, orphan cleanup, log retention).
//! Lifecycle is explicit: join handles are tracked, cancellation goes through
//! a token, and every asynchronous operation is wrapped in a timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use storebridge_core::SyncJobs;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the bridge scheduler.
#[derive(Debug, Clone)]
pub struct BridgeSchedulerConfig {
    /// Cron expression for the inventory push sweep.
    pub inventory_cron: String,
    /// Cron expression for the full catalog reconciliation.
    pub catalog_cron: String,
    /// Cron expression for the daily maintenance run.
    pub daily_cron: String,
    /// Timeout applied to a single job execution.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for BridgeSchedulerConfig {
    fn default() -> Self {
        Self {
            inventory_cron: "0 */5 * * * *".into(),  // every 5 minutes
            catalog_cron: "0 0 */2 * * *".into(),    // every 2 hours
            daily_cron: "0 0 0 * * *".into(),        // midnight
            job_timeout: Duration::from_secs(600),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Batch sweep scheduler with explicit lifecycle management.
pub struct BridgeScheduler {
    scheduler: Option<JobScheduler>,
    config: BridgeSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    jobs: Arc<SyncJobs>,
}

impl BridgeScheduler {
    /// Create a scheduler with the default cron schedule.
    pub fn new(jobs: Arc<SyncJobs>) -> Self {
        Self::with_config(BridgeSchedulerConfig::default(), jobs)
    }

    /// Create a scheduler with a custom configuration.
    pub fn with_config(config: BridgeSchedulerConfig, jobs: Arc<SyncJobs>) -> Self {
        Self {
            scheduler: None,
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            jobs,
        }
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        let start_result = tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?;
        start_result.map_err(|source| SchedulerError::StartFailed(source.to_string()))?;

        self.scheduler = Some(scheduler_instance);

        let cancel = self.cancellation.clone();
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel).await;
        });

        self.monitor_handle = Some(handle);
        info!(scheduler = "bridge", event = "start", "batch scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let mut scheduler = match self.scheduler.take() {
            Some(scheduler) => scheduler,
            None => return Err(SchedulerError::NotRunning),
        };

        let stop_timeout = self.config.stop_timeout;
        let stop_result =
            tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?;
        stop_result.map_err(|source| SchedulerError::StopFailed(source.to_string()))?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|source| SchedulerError::TaskJoinFailed(source.to_string()))?;
        }

        info!(scheduler = "bridge", event = "stop", "batch scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|source| SchedulerError::CreationFailed(source.to_string()))?;

        let inventory_jobs = self.jobs.clone();
        let inventory = cron_job(
            &self.config.inventory_cron,
            "inventory_push",
            self.config.job_timeout,
            move || {
                let jobs = inventory_jobs.clone();
                async move {
                    let report = jobs.push_inventory().await?;
                    debug!(
                        job = "inventory_push",
                        attempted = report.attempted,
                        succeeded = report.succeeded,
                        failed = report.failed,
                        skipped = report.skipped,
                        "inventory push sweep finished"
                    );
                    Ok(())
                }
            },
        )?;

        let catalog_jobs = self.jobs.clone();
        let catalog = cron_job(
            &self.config.catalog_cron,
            "catalog_sync",
            self.config.job_timeout,
            move || {
                let jobs = catalog_jobs.clone();
                async move {
                    let report = jobs.full_catalog_sync().await?;
                    info!(
                        job = "catalog_sync",
                        pulled = report.pull.succeeded,
                        pushed = report.push.succeeded,
                        failed = report.pull.failed + report.push.failed,
                        "catalog reconciliation finished"
                    );
                    Ok(())
                }
            },
        )?;

        let daily_jobs = self.jobs.clone();
        let daily = cron_job(
            &self.config.daily_cron,
            "daily_maintenance",
            self.config.job_timeout,
            move || {
                let jobs = daily_jobs.clone();
                async move {
                    let retries = jobs.retry_pending_orders().await?;
                    let orphans = jobs.cleanup_orphaned_mappings().await?;
                    let purged = jobs.cleanup_order_logs().await?;
                    info!(
                        job = "daily_maintenance",
                        orders_retried = retries.succeeded,
                        orders_failed = retries.failed,
                        orphans_removed = orphans.succeeded,
                        logs_purged = purged,
                        "daily maintenance finished"
                    );
                    Ok(())
                }
            },
        )?;

        for job in [inventory, catalog, daily] {
            scheduler
                .add(job)
                .await
                .map_err(|source| SchedulerError::JobRegistrationFailed(source.to_string()))?;
        }

        debug!(
            inventory = %self.config.inventory_cron,
            catalog = %self.config.catalog_cron,
            daily = %self.config.daily_cron,
            "registered batch sweeps"
        );
        Ok(scheduler)
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!(scheduler = "bridge", event = "monitor_cancelled", "scheduler monitor cancelled");
    }
}

/// Build a cron job that wraps one sweep in the job timeout and logs its
/// outcome.
fn cron_job<F, Fut>(
    cron_expr: &str,
    name: &'static str,
    job_timeout: Duration,
    run: F,
) -> SchedulerResult<Job>
where
    F: Fn() -> Fut + Send + Sync + Clone + 'static,
    Fut: std::future::Future<Output = storebridge_domain::Result<()>> + Send + 'static,
{
    Job::new_async(cron_expr, move |_id, _lock| {
        let run = run.clone();
        Box::pin(async move {
            let started = Instant::now();
            match tokio::time::timeout(job_timeout, run()).await {
                Ok(Ok(())) => {
                    debug!(job = name, elapsed_ms = started.elapsed().as_millis(), "job complete");
                }
                Ok(Err(err)) => {
                    error!(job = name, error = %err, "job failed");
                }
                Err(_) => {
                    warn!(job = name, timeout_secs = job_timeout.as_secs(), "job timed out");
                }
            }
        })
    })
    .map_err(|source| SchedulerError::JobRegistrationFailed(source.to_string()))
}

impl Drop for BridgeScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!(
                scheduler = "bridge",
                event = "drop_cancel",
                "scheduler dropped while running; cancelling tasks"
            );
            self.cancellation.cancel();
        }
    }
}
