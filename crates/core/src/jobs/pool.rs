//! The job pool: keyed, single-use continuations with expiry.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use dashmap::{mapref::entry::Entry, DashMap};
use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, warn};

use super::{Job, JobContext, JobError, JobKey};
use crate::fault::{panic_error, render_fault};
use crate::settings::TerminalSettings;

/// Written when a key does not resolve to a live job.
pub const EXPIRED_MESSAGE: &str = "The job has expired or the key is invalid.";

struct PoolEntry {
    job: Box<dyn Job>,
    created_at: Instant,
}

/// Pending jobs keyed by [`JobKey`].
///
/// Taking a job is a single `DashMap::remove`, so of any number of concurrent
/// runs with the same key exactly one obtains the job.
pub struct JobPool {
    entries: DashMap<JobKey, PoolEntry>,
    ttl: Option<Duration>,
    max_entries: Option<usize>,
}

impl std::fmt::Debug for JobPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobPool")
            .field("len", &self.entries.len())
            .field("ttl", &self.ttl)
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

impl Default for JobPool {
    fn default() -> Self {
        Self::new()
    }
}

impl JobPool {
    /// A pool without expiry or size limit.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            ttl: None,
            max_entries: None,
        }
    }

    pub fn from_settings(settings: &TerminalSettings) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: settings.job_ttl(),
            max_entries: settings.max_jobs(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max).filter(|max| *max > 0);
        self
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &JobKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Stores `job` under a fresh key. An existing key is never overwritten.
    pub fn push(&self, job: Box<dyn Job>) -> JobKey {
        if let Some(max) = self.max_entries {
            while self.entries.len() >= max {
                if !self.evict_oldest() {
                    break;
                }
            }
        }

        let entry = PoolEntry {
            job,
            created_at: Instant::now(),
        };
        loop {
            match self.entries.entry(JobKey::generate()) {
                Entry::Vacant(slot) => {
                    let key = slot.key().clone();
                    slot.insert(entry);
                    debug!(target: "webterm", key = %key, "job queued");
                    return key;
                }
                Entry::Occupied(_) => continue,
            }
        }
    }

    /// Removes and returns the job stored under `key`.
    pub fn take(&self, key: &JobKey) -> Result<Box<dyn Job>, JobError> {
        let (_, entry) = self
            .entries
            .remove(key)
            .ok_or_else(|| JobError::NotFound(key.clone()))?;

        if self.is_expired(&entry, Instant::now()) {
            debug!(target: "webterm", key = %key, "discarded expired job");
            return Err(JobError::NotFound(key.clone()));
        }
        Ok(entry.job)
    }

    /// Takes the job under `key` and runs it against `ctx`.
    ///
    /// Failures are written to the context's response; the returned result
    /// only reports what happened.
    pub async fn run(&self, key: &JobKey, ctx: &mut JobContext) -> Result<(), JobError> {
        let job = match self.take(key) {
            Ok(job) => job,
            Err(err) => {
                debug!(target: "webterm", key = %key, "job not found");
                ctx.write_error(EXPIRED_MESSAGE);
                return Err(err);
            }
        };

        let display_exceptions = ctx.services().settings().display_exceptions;
        let outcome = AssertUnwindSafe(job.execute(ctx)).catch_unwind().await;
        let error = match outcome {
            Ok(Ok(())) => {
                debug!(target: "webterm", key = %key, "job completed");
                return Ok(());
            }
            Ok(Err(err)) => err,
            Err(payload) => panic_error(payload),
        };

        error!(target: "webterm", key = %key, error = %format!("{error:#}"), "job failed");
        render_fault(ctx.response_mut(), &error, display_exceptions);
        Err(JobError::Fault {
            key: key.clone(),
            source: error,
        })
    }

    /// Drops every entry older than the TTL. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }
        let now = Instant::now();
        let mut purged = 0usize;
        self.entries.retain(|_, entry| {
            let expired = self.is_expired(entry, now);
            if expired {
                purged += 1;
            }
            !expired
        });
        if purged > 0 {
            debug!(
                target: "webterm",
                purged,
                remaining = self.entries.len(),
                "purged expired jobs"
            );
        }
        purged
    }

    /// Sweeps expired jobs every `interval` until the returned task is shut
    /// down or the pool is dropped.
    pub fn spawn_purge_task(self: &Arc<Self>, interval: Duration) -> PurgeTask {
        let pool = Arc::downgrade(self);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = sleep(interval) => {
                        match pool.upgrade() {
                            Some(pool) => {
                                pool.purge_expired();
                            }
                            None => break,
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        PurgeTask {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    fn is_expired(&self, entry: &PoolEntry, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(entry.created_at) >= ttl)
    }

    fn evict_oldest(&self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().created_at)
            .map(|entry| (entry.key().clone(), entry.value().created_at));

        match oldest {
            Some((key, created_at)) => {
                // A concurrent take may have removed it already.
                if self
                    .entries
                    .remove_if(&key, |_, entry| entry.created_at == created_at)
                    .is_some()
                {
                    warn!(target: "webterm", key = %key, "job pool full, evicted oldest job");
                }
                true
            }
            None => false,
        }
    }
}

/// Handle of the background sweep started by [`JobPool::spawn_purge_task`].
#[derive(Debug)]
pub struct PurgeTask {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PurgeTask {
    /// Stops the sweep and waits for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                log_join_error(err);
            }
        }
    }
}

impl Drop for PurgeTask {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

fn log_join_error(error: tokio::task::JoinError) {
    if error.is_cancelled() {
        warn!(target: "webterm", "job purge task cancelled before completion");
    } else {
        error!(target: "webterm", error = %error, "job purge task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::HostContext;
    use crate::services::Services;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl Job for Counting {
        async fn execute(self: Box<Self>, ctx: &mut JobContext) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            ctx.write_success("ran");
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Job for Failing {
        async fn execute(self: Box<Self>, _ctx: &mut JobContext) -> anyhow::Result<()> {
            anyhow::bail!("report generation failed")
        }
    }

    struct Panicking;

    #[async_trait]
    impl Job for Panicking {
        async fn execute(self: Box<Self>, _ctx: &mut JobContext) -> anyhow::Result<()> {
            panic!("job exploded")
        }
    }

    fn services() -> Arc<Services> {
        Services::builder().build().unwrap()
    }

    fn job_ctx(services: &Arc<Services>) -> JobContext {
        JobContext::new(HostContext::anonymous(), "", Arc::clone(services))
    }

    #[tokio::test]
    async fn push_then_run_succeeds_exactly_once() {
        let services = services();
        let pool = JobPool::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let key = pool.push(Box::new(Counting(Arc::clone(&runs))));

        let mut ctx = job_ctx(&services);
        pool.run(&key, &mut ctx).await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        let mut ctx = job_ctx(&services);
        let err = pool.run(&key, &mut ctx).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        let envelope = ctx.into_response().finish();
        assert_eq!(envelope.messages[0].text, EXPIRED_MESSAGE);
    }

    #[tokio::test]
    async fn unknown_key_is_not_found() {
        let services = services();
        let pool = JobPool::new();
        let mut ctx = job_ctx(&services);
        let err = pool.run(&JobKey::from("missing"), &mut ctx).await.unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)));
    }

    #[tokio::test]
    async fn failing_job_is_rendered_once_and_consumed() {
        let services = services();
        let pool = JobPool::new();
        let key = pool.push(Box::new(Failing));

        let mut ctx = job_ctx(&services);
        let err = pool.run(&key, &mut ctx).await.unwrap_err();
        assert!(matches!(err, JobError::Fault { .. }));
        assert!(pool.is_empty());

        let envelope = ctx.into_response().finish();
        assert_eq!(envelope.count(crate::response::MessageKind::Error), 1);
    }

    #[tokio::test]
    async fn panicking_job_is_a_fault() {
        let services = services();
        let pool = JobPool::new();
        let key = pool.push(Box::new(Panicking));

        let mut ctx = job_ctx(&services);
        let err = pool.run(&key, &mut ctx).await.unwrap_err();
        match err {
            JobError::Fault { source, .. } => assert!(source.to_string().contains("job exploded")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_not_found() {
        let services = services();
        let pool = JobPool::new().with_ttl(Duration::from_secs(60));
        let runs = Arc::new(AtomicUsize::new(0));
        let key = pool.push(Box::new(Counting(Arc::clone(&runs))));

        tokio::time::advance(Duration::from_secs(61)).await;

        let mut ctx = job_ctx(&services);
        assert!(pool.run(&key, &mut ctx).await.unwrap_err().is_not_found());
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(pool.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn purge_drops_only_expired_entries() {
        let pool = JobPool::new().with_ttl(Duration::from_secs(60));
        let runs = Arc::new(AtomicUsize::new(0));
        let old = pool.push(Box::new(Counting(Arc::clone(&runs))));
        tokio::time::advance(Duration::from_secs(45)).await;
        let fresh = pool.push(Box::new(Counting(Arc::clone(&runs))));
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(pool.purge_expired(), 1);
        assert!(!pool.contains(&old));
        assert!(pool.contains(&fresh));
    }

    #[test]
    fn purge_without_ttl_keeps_everything() {
        let pool = JobPool::new();
        pool.push(Box::new(Failing));
        assert_eq!(pool.purge_expired(), 0);
        assert_eq!(pool.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn max_entries_evicts_oldest() {
        let pool = JobPool::new().with_max_entries(2);
        let first = pool.push(Box::new(Failing));
        tokio::time::advance(Duration::from_millis(10)).await;
        let second = pool.push(Box::new(Failing));
        tokio::time::advance(Duration::from_millis(10)).await;
        let third = pool.push(Box::new(Failing));

        assert_eq!(pool.len(), 2);
        assert!(!pool.contains(&first));
        assert!(pool.contains(&second));
        assert!(pool.contains(&third));
    }

    #[tokio::test(start_paused = true)]
    async fn purge_task_sweeps_and_shuts_down() {
        let pool = Arc::new(JobPool::new().with_ttl(Duration::from_secs(5)));
        pool.push(Box::new(Failing));
        let task = pool.spawn_purge_task(Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(pool.is_empty());

        task.shutdown().await;
    }
}
