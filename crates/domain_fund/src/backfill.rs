//! Backfill pipeline
//!
//! Writes a freshly fetched history into the store after a cache miss.
//! The history is split into contiguous batches and the batches are written
//! concurrently, at most `concurrency_limit` at a time. Each batch is its own
//! transaction, so a failing batch loses only its own rows.
//!
//! Persistence is best-effort: nothing here returns an error. Failures are
//! logged and summarized in a [`BackfillReport`]. The fund is marked complete
//! in the store only after every batch succeeded, so lookups keep going to
//! the upstream source while a backfill runs or after one lost a batch.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

use core_kernel::{FundKey, SchemeCode};

use crate::fund::FundMeta;
use crate::nav::{NavEntry, NavPoint};
use crate::ports::NavStore;

/// Default number of observations per insert statement
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Largest batch a single insert statement can carry
///
/// Each observation binds three parameters and PostgreSQL accepts at most
/// 65535 per statement.
pub const MAX_BATCH_SIZE: usize = u16::MAX as usize / 3;

/// Default number of batches written at once
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 8;

/// Sizing of the backfill fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillConfig {
    pub batch_size: usize,
    pub concurrency_limit: usize,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

impl BackfillConfig {
    /// Sets the batch size (clamped to `1..=MAX_BATCH_SIZE`)
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = clamp_batch_size(size);
        self
    }

    /// Sets the concurrency limit (clamped to at least 1)
    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }
}

fn clamp_batch_size(size: usize) -> usize {
    size.clamp(1, MAX_BATCH_SIZE)
}

/// Summary of one persist run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Key of the fund row, `None` when the fund insert failed
    pub fund: Option<FundKey>,
    pub batches: usize,
    pub failed_batches: usize,
    pub records_written: u64,
    /// Entries dropped because their date or value did not parse
    pub skipped_entries: usize,
    /// Whether the store recorded the fund as complete
    pub marked_complete: bool,
}

impl BackfillReport {
    /// True when every batch succeeded and the fund was marked complete
    pub fn is_complete(&self) -> bool {
        self.fund.is_some() && self.failed_batches == 0 && self.marked_complete
    }
}

/// Splits `items` into contiguous batches of at most `batch_size`
///
/// Every item lands in exactly one batch and order is kept. `batch_size` is
/// clamped to `1..=MAX_BATCH_SIZE`.
pub fn partition<T: Clone>(items: &[T], batch_size: usize) -> Vec<Vec<T>> {
    items
        .chunks(clamp_batch_size(batch_size))
        .map(<[T]>::to_vec)
        .collect()
}

/// Persists fetched histories through a [`NavStore`]
#[derive(Clone)]
pub struct BackfillPipeline {
    store: Arc<dyn NavStore>,
    config: BackfillConfig,
}

impl BackfillPipeline {
    pub fn new(store: Arc<dyn NavStore>, config: BackfillConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> BackfillConfig {
        self.config
    }

    /// Persists a fund and its full history, returning once every batch ended
    pub async fn persist(&self, meta: FundMeta, series: Vec<NavPoint>) -> BackfillReport {
        let scheme_code = meta.scheme_code;
        let mut report = BackfillReport::default();

        let fund_id = match self.store.insert_fund(&meta).await {
            Ok(id) => id,
            Err(e) => {
                error!(%scheme_code, error = %e, "Fund insert failed, backfill aborted");
                return report;
            }
        };
        report.fund = Some(fund_id);

        let mut entries = Vec::with_capacity(series.len());
        for point in &series {
            match NavEntry::try_from(point) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(%scheme_code, error = %e, "Skipping malformed NAV entry");
                    report.skipped_entries += 1;
                }
            }
        }

        let batches = partition(&entries, self.config.batch_size);
        report.batches = batches.len();
        info!(
            %scheme_code,
            fund_id = %fund_id,
            records = entries.len(),
            batches = report.batches,
            "Backfill started"
        );

        let gate = Arc::new(Semaphore::new(self.config.concurrency_limit.max(1)));
        let mut workers = JoinSet::new();

        for (index, batch) in batches.into_iter().enumerate() {
            let permit = match Arc::clone(&gate).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let store = Arc::clone(&self.store);
            workers.spawn(async move {
                let _permit = permit;
                (index, store.insert_nav_batch(fund_id, &batch).await)
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((_, Ok(written))) => report.records_written += written,
                Ok((batch, Err(e))) => {
                    error!(%scheme_code, batch, error = %e, "NAV batch insert failed");
                    report.failed_batches += 1;
                }
                Err(e) => {
                    error!(%scheme_code, error = %e, "NAV batch worker panicked");
                    report.failed_batches += 1;
                }
            }
        }

        if report.failed_batches == 0 {
            match self.store.mark_complete(fund_id).await {
                Ok(()) => report.marked_complete = true,
                Err(e) => error!(%scheme_code, error = %e, "Could not mark backfill complete"),
            }
        } else {
            warn!(
                %scheme_code,
                failed = report.failed_batches,
                "Backfill incomplete, fund stays uncached"
            );
        }

        info!(
            %scheme_code,
            batches = report.batches,
            failed = report.failed_batches,
            written = report.records_written,
            "Backfill finished"
        );
        report
    }

    /// Starts [`persist`](Self::persist) on its own task
    pub fn spawn(&self, meta: FundMeta, series: Vec<NavPoint>) -> BackfillHandle {
        let scheme_code = meta.scheme_code;
        let pipeline = self.clone();
        let task = tokio::spawn(async move { pipeline.persist(meta, series).await });
        BackfillHandle { scheme_code, task }
    }
}

/// Completion handle for a spawned backfill
///
/// The host decides when to wait: a one-shot process waits before exiting,
/// a server hands it to its task tracker.
#[derive(Debug)]
pub struct BackfillHandle {
    scheme_code: SchemeCode,
    task: JoinHandle<BackfillReport>,
}

impl BackfillHandle {
    pub fn scheme_code(&self) -> SchemeCode {
        self.scheme_code
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the backfill to end
    pub async fn wait(self) -> BackfillReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => {
                error!(scheme_code = %self.scheme_code, error = %e, "Backfill task failed");
                BackfillReport::default()
            }
        }
    }
}
