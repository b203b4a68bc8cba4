//! Bounded pool for blocking report jobs.
//!
//! At most `workers` jobs run at once on tokio's blocking threads and at most
//! `queue` more wait for a slot. Anything beyond that is rejected.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Server busy, report queue is full")]
    Saturated,
    #[error("Worker pool closed")]
    Closed,
    #[error("Report job failed: {0}")]
    Join(String),
}

pub struct WorkerPool {
    slots: Arc<Semaphore>,
    pending: Arc<AtomicUsize>,
    capacity: usize,
}

/// Releases the pending count once the job ends. It travels with the job, so
/// a caller that stops waiting does not free the slot early.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WorkerPool {
    pub fn new(workers: usize, queue: usize) -> Self {
        let workers = workers.max(1);
        Self {
            slots: Arc::new(Semaphore::new(workers)),
            pending: Arc::new(AtomicUsize::new(0)),
            capacity: workers + queue,
        }
    }

    /// Jobs running or waiting.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn execute<F, T>(&self, job: F) -> Result<T, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.pending.fetch_add(1, Ordering::SeqCst) >= self.capacity {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            log::warn!("Job rejected, {} jobs pending", self.capacity);
            return Err(PoolError::Saturated);
        }
        let pending = PendingGuard(self.pending.clone());

        let permit = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _pending = pending;
            job()
        })
        .await
        .map_err(|e| PoolError::Join(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_runs_job() {
        let pool = WorkerPool::new(2, 0);
        assert_eq!(pool.execute(|| 40 + 2).await.unwrap(), 42);
        assert_eq!(pool.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rejects_when_saturated() {
        let pool = Arc::new(WorkerPool::new(1, 1));
        let (release, blocked) = mpsc::channel::<()>();
        let blocked = Arc::new(parking_lot::Mutex::new(blocked));

        let mut running = Vec::new();
        for _ in 0..2 {
            let pool = pool.clone();
            let blocked = blocked.clone();
            running.push(tokio::spawn(async move {
                pool.execute(move || {
                    let _ = blocked.lock().recv_timeout(Duration::from_secs(5));
                })
                .await
            }));
        }

        while pool.pending() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let rejected = pool.execute(|| ()).await;
        assert!(matches!(rejected, Err(PoolError::Saturated)));

        release.send(()).unwrap();
        release.send(()).unwrap();
        for job in running {
            job.await.unwrap().unwrap();
        }
        assert_eq!(pool.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancelled_caller_keeps_slot_until_job_ends() {
        let pool = Arc::new(WorkerPool::new(1, 0));
        let (release, blocked) = mpsc::channel::<()>();

        let caller = {
            let pool = pool.clone();
            tokio::spawn(async move {
                pool.execute(move || {
                    let _ = blocked.recv_timeout(Duration::from_secs(5));
                })
                .await
            })
        };
        while pool.pending() < 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        caller.abort();
        let _ = caller.await;
        assert_eq!(pool.pending(), 1);
        assert!(matches!(pool.execute(|| ()).await, Err(PoolError::Saturated)));

        release.send(()).unwrap();
        while pool.pending() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(pool.execute(|| 7).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_panicking_job_is_join_error() {
        let pool = WorkerPool::new(1, 0);
        let result = pool.execute(|| panic!("boom")).await;
        assert!(matches!(result, Err(PoolError::Join(_))));
        assert_eq!(pool.pending(), 0);
    }
}
