//! Progress reporting and cooperative cancellation handed to a clearing run.

use crate::error::ClearError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A progress notification. Delivery is fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Percent(u8),
    Status(String),
}

/// Receives progress notifications from a run.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Turns `processed / total` into a percentage that only moves forward.
#[derive(Debug, Clone)]
pub struct ProgressCounter {
    total: usize,
    last: Option<u8>,
}

impl ProgressCounter {
    pub fn new(total: usize) -> Self {
        Self { total, last: None }
    }

    /// Report `processed` items done. Returns the percentage if it was emitted.
    pub fn advance(&mut self, processed: usize, sink: &dyn ProgressSink) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        self.advance_ratio(processed as f64 / self.total as f64, sink)
    }

    /// Report a completed fraction in `[0, 1]`.
    pub fn advance_ratio(&mut self, ratio: f64, sink: &dyn ProgressSink) -> Option<u8> {
        let percent = (ratio.clamp(0.0, 1.0) * 100.0).round() as u8;
        if self.last.is_some_and(|last| percent <= last) {
            return None;
        }
        self.last = Some(percent);
        sink.report(ProgressEvent::Percent(percent));
        Some(percent)
    }
}

/// Shared abort flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(ClearError::Cancelled)` once the flag is set.
    pub fn check(&self) -> Result<(), ClearError> {
        if self.is_cancelled() {
            Err(ClearError::Cancelled)
        } else {
            Ok(())
        }
    }
}
