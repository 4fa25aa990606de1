//! # Blocking Creation Pool
//!
//! Bounded offload for factories that declare a blocking create path.
//!
//! Jobs run on tokio's blocking thread pool and never occupy an async worker
//! thread. A fair semaphore caps how many run at once; waiters are admitted
//! in FIFO order. A job keeps its permit until it finishes, even if the
//! awaiting caller is dropped.

use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::WorkerPoolConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Blocking creation pool is closed")]
    Closed,

    #[error("Blocking job panicked: {0}")]
    Panicked(String),
}

/// Bounded pool for blocking unit creations
#[derive(Debug)]
pub struct BlockingCreationPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl BlockingCreationPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn from_config(config: &WorkerPoolConfig) -> Self {
        Self::new(config.max_blocking_creations)
    }

    /// Run `job` off the async workers once a slot is free
    pub async fn run<T, F>(&self, job: F) -> Result<T, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        handle.await.map_err(|e| {
            if e.is_panic() {
                let message = panic_message(e.into_panic());
                warn!(message = %message, "Blocking creation panicked");
                PoolError::Panicked(message)
            } else {
                // runtime is shutting down
                debug!("Blocking creation cancelled");
                PoolError::Closed
            }
        })
    }

    /// Stop admitting jobs; running jobs finish normally
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
