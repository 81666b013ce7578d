// Scheduler Module - cron-driven ledger backups and limiter upkeep

use crate::rate_limit::CallerRateLimiter;
use referral_ledger::{backup, ReferralLedger};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl From<tokio_cron_scheduler::JobSchedulerError> for SchedulerError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        SchedulerError::Scheduler(err.to_string())
    }
}

/// One snapshot export of the ledger
#[derive(Debug, Clone)]
pub struct BackupJob {
    ledger: Arc<ReferralLedger>,
    backup_dir: PathBuf,
}

impl BackupJob {
    pub fn new(ledger: Arc<ReferralLedger>, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            ledger,
            backup_dir: backup_dir.into(),
        }
    }

    /// Export now; failures are logged and returned as `None`
    pub async fn run(&self) -> Option<PathBuf> {
        let job = self.clone();
        let result = tokio::task::spawn_blocking(move || {
            backup::export_snapshot(&job.ledger, &job.backup_dir, &chrono::Local::now())
        })
        .await;

        match result {
            Ok(Ok(path)) => Some(path),
            Ok(Err(e)) => {
                error!(error = %e, "Backup failed");
                None
            }
            Err(e) => {
                error!(error = %e, "Backup task panicked");
                None
            }
        }
    }
}

/// Background jobs for the gateway
pub struct BackupScheduler {
    scheduler: JobScheduler,
}

impl BackupScheduler {
    pub async fn new() -> Result<Self, SchedulerError> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self { scheduler })
    }

    /// Register the jobs and start ticking
    pub async fn start(
        &mut self,
        schedule: &str,
        backup: Option<BackupJob>,
        limiter: CallerRateLimiter,
    ) -> Result<(), SchedulerError> {
        info!("Starting gateway scheduler");

        // Job 1: ledger snapshot (daily at 00:00 by default)
        if let Some(backup) = backup {
            let backup_job = Job::new_async(schedule, move |_uuid, _lock| {
                let backup = backup.clone();
                Box::pin(async move {
                    info!("Scheduled backup triggered");
                    backup.run().await;
                })
            })?;
            self.scheduler.add(backup_job).await?;
            info!(schedule, "Backup job registered");
        }

        // Job 2: forget idle callers every 10 minutes
        let prune_job = Job::new_async("0 */10 * * * *", move |_uuid, _lock| {
            let limiter = limiter.clone();
            Box::pin(async move {
                limiter.prune();
            })
        })?;
        self.scheduler.add(prune_job).await?;

        self.scheduler.start().await?;

        info!("Gateway scheduler started");
        Ok(())
    }

    /// Stop the scheduler
    pub async fn stop(&mut self) -> Result<(), SchedulerError> {
        self.scheduler.shutdown().await?;
        info!("Gateway scheduler stopped");
        Ok(())
    }
}
