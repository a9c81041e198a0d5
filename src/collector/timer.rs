use std::time::{Duration, Instant};

use super::TimerSink;

/// Measures elapsed time into a child.
///
/// The duration is recorded once, on [`observe_duration`](Self::observe_duration)
/// or on drop, whichever comes first.
#[must_use = "a timer records when it is dropped; bind it to a variable"]
pub struct Timer<S: TimerSink> {
    sink: Option<S>,
    start: Instant,
}

impl<S: TimerSink> Timer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Some(sink),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Record the elapsed seconds and return them.
    pub fn observe_duration(mut self) -> f64 {
        self.record()
    }

    /// Stop without recording, returning the elapsed seconds.
    pub fn stop_and_discard(mut self) -> f64 {
        self.sink = None;
        self.elapsed().as_secs_f64()
    }

    fn record(&mut self) -> f64 {
        let seconds = self.elapsed().as_secs_f64();
        if let Some(sink) = self.sink.take() {
            sink.record_seconds(seconds);
        }
        seconds
    }
}

impl<S: TimerSink> Drop for Timer<S> {
    fn drop(&mut self) {
        if self.sink.is_some() {
            self.record();
        }
    }
}
