//! Single-writer executor for addon collection mutations
//!
//! All writes to the shared addon collection performed by the ingestion worker
//! run on one owning execution context and are awaited before the worker
//! moves on. [`ChannelExecutor`] is that context: a dedicated thread draining
//! boxed jobs in order. [`InlineExecutor`] runs jobs on the caller for tests
//! and headless use.

use addonkit_common::{Error, Result};
use std::thread;
use tokio::sync::{mpsc, oneshot};

/// Unit of work posted to an executor
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// An execution context that runs posted jobs one at a time, in order
pub trait UiExecutor: Send + Sync {
    /// Queue `job`; fails only if the context has shut down
    fn post(&self, job: Job) -> Result<()>;
}

/// Run `action` on `executor` and wait for its result
pub async fn run_and_wait<R, F>(executor: &dyn UiExecutor, action: F) -> Result<R>
where
    R: Send + 'static,
    F: FnOnce() -> R + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    executor.post(Box::new(move || {
        // Receiver dropped means the waiter went away; nothing to report to
        let _ = tx.send(action());
    }))?;
    rx.await
        .map_err(|_| Error::Internal("Executor dropped job before completion".to_string()))
}

/// Dedicated thread that owns collection mutations
pub struct ChannelExecutor {
    sender: mpsc::UnboundedSender<Job>,
}

impl ChannelExecutor {
    /// Start the executor thread
    pub fn spawn(name: &str) -> Result<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                tracing::debug!("Executor thread started");
                while let Some(job) = receiver.blocking_recv() {
                    job();
                }
                tracing::debug!("Executor thread exiting");
            })?;

        Ok(Self { sender })
    }
}

impl UiExecutor for ChannelExecutor {
    fn post(&self, job: Job) -> Result<()> {
        self.sender
            .send(job)
            .map_err(|_| Error::Internal("Executor thread has stopped".to_string()))
    }
}

/// Runs every job immediately on the posting thread
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl UiExecutor for InlineExecutor {
    fn post(&self, job: Job) -> Result<()> {
        job();
        Ok(())
    }
}
