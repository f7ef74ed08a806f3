// ABOUTME: Bounded worker pool shared by benchmarking tasks for sub-work.
// ABOUTME: Shutdown rejects new submissions and drains in-flight work.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

use crate::error::PoolError;

struct PoolInner {
    permits: Arc<Semaphore>,
    workers: u32,
    closed: AtomicBool,
    running: AtomicUsize,
}

/// A claimed slot. Releases the permit and the running count on drop,
/// including when the task panics.
struct Slot {
    _permit: OwnedSemaphorePermit,
    inner: Arc<PoolInner>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.inner.running.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A bounded pool of concurrently running sub-tasks.
///
/// At most `workers` submitted tasks run at once; further submissions wait
/// for a free slot. Cloning the pool shares it.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    /// Create a pool running at most `workers` tasks concurrently.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is zero.
    pub fn new(workers: u32) -> Self {
        assert!(workers > 0, "workers must be positive");

        Self {
            inner: Arc::new(PoolInner {
                permits: Arc::new(Semaphore::new(workers as usize)),
                workers,
                closed: AtomicBool::new(false),
                running: AtomicUsize::new(0),
            }),
        }
    }

    /// Maximum number of concurrently running tasks.
    pub fn workers(&self) -> u32 {
        self.inner.workers
    }

    /// Number of submitted tasks currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Returns true once [`WorkerPool::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Submit an async task, waiting for a free slot.
    pub async fn submit<F, T>(&self, task: F) -> Result<JoinHandle<T>, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let slot = self.acquire().await?;
        Ok(tokio::spawn(async move {
            let output = task.await;
            drop(slot);
            output
        }))
    }

    /// Submit a CPU-bound closure, waiting for a free slot.
    pub async fn submit_blocking<F, T>(&self, task: F) -> Result<JoinHandle<T>, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let slot = self.acquire().await?;
        Ok(tokio::task::spawn_blocking(move || {
            let output = task();
            drop(slot);
            output
        }))
    }

    async fn acquire(&self) -> Result<Slot, PoolError> {
        if self.is_shut_down() {
            return Err(PoolError::ShutDown);
        }
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::ShutDown)?;
        self.inner.running.fetch_add(1, Ordering::SeqCst);
        Ok(Slot {
            _permit: permit,
            inner: Arc::clone(&self.inner),
        })
    }

    /// Stop accepting work and wait for every in-flight task to finish.
    ///
    /// Calling it again is a no-op.
    pub async fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        // Holding every permit means nothing submitted is still running.
        if let Ok(all) = self.inner.permits.acquire_many(self.inner.workers).await {
            all.forget();
        }
        self.inner.permits.close();
    }
}
