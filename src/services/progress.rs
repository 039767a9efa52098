//! Progress reporting for long-running jobs

use tokio::sync::mpsc::UnboundedSender;

/// Receives completion percentages, 0-100, never decreasing within a job
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

impl<F> ProgressSink for F
where
    F: Fn(u8) + Send + Sync,
{
    fn report(&self, percent: u8) {
        self(percent)
    }
}

/// Forwards to a channel; a closed receiver is ignored
impl ProgressSink for UnboundedSender<u8> {
    fn report(&self, percent: u8) {
        let _ = self.send(percent);
    }
}

/// Sink for callers that do not track progress
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: u8) {}
}

/// `round(processed / total * 100)`; an empty job is complete
pub fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed as f64 / total as f64) * 100.0).round().min(100.0) as u8
}
