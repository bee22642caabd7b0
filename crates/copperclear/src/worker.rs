//! Runs clearing jobs on background threads, one run per output name at a time.

use crate::engine::clear_copper;
use crate::error::{ClearError, ClearResult};
use crate::progress::{CancelToken, ProgressSink};
use crate::result::ClearingResult;
use crate::types::ClearingJob;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Starts clearing runs off the caller's thread.
#[derive(Debug, Clone, Default)]
pub struct ClearingWorker {
    running: Arc<Mutex<HashSet<String>>>,
}

/// Removes the output name from the running set when the run ends, however it ends.
struct RunningGuard {
    name: String,
    running: Arc<Mutex<HashSet<String>>>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        running.remove(&self.name);
    }
}

impl ClearingWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self, output_name: &str) -> bool {
        let running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        running.contains(output_name)
    }

    /// Start `job` on a new thread. A second job for the same output name is
    /// rejected while the first one is still running.
    pub fn submit(
        &self,
        job: ClearingJob,
        sink: Arc<dyn ProgressSink>,
    ) -> ClearResult<ClearingHandle> {
        let name = job.output_name.clone();
        {
            let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
            if !running.insert(name.clone()) {
                return Err(ClearError::AlreadyRunning { name });
            }
        }
        let guard = RunningGuard {
            name: name.clone(),
            running: Arc::clone(&self.running),
        };

        let cancel = CancelToken::new();
        let thread_cancel = cancel.clone();
        let handle = thread::Builder::new()
            .name(format!("ncc-{name}"))
            .spawn(move || {
                let _guard = guard;
                debug!(output = %job.output_name, "clearing worker started");
                let outcome = clear_copper(&job, sink.as_ref(), &thread_cancel);
                match &outcome {
                    Ok(result) => {
                        info!(output = %job.output_name, tools = result.tools.len(), "clearing finished")
                    }
                    Err(err) if err.is_cancelled() => {
                        info!(output = %job.output_name, "clearing cancelled")
                    }
                    Err(err) => warn!(output = %job.output_name, error = %err, "clearing failed"),
                }
                outcome
            })?;

        Ok(ClearingHandle {
            name,
            cancel,
            handle,
        })
    }
}

/// A run in progress.
pub struct ClearingHandle {
    name: String,
    cancel: CancelToken,
    handle: JoinHandle<ClearResult<ClearingResult>>,
}

impl ClearingHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the run to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run and return its outcome.
    pub fn join(self) -> ClearResult<ClearingResult> {
        self.handle.join().map_err(|_| ClearError::WorkerPanicked)?
    }
}
