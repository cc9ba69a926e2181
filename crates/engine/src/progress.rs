//! Progress reporting collaborator.

/// Receives batch progress as a fraction in `(0, 1]`.
///
/// Called synchronously from the engine after every record, so
/// implementations should return quickly.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, fraction: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Send + Sync,
{
    fn on_progress(&self, fraction: f64) {
        self(fraction)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _fraction: f64) {}
}
