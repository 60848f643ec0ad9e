//! Progress reporting for registration and stacking runs.
//!
//! A [`ProgressSink`] forwards `(percent, message)` pairs to an optional
//! callback. Reports may come from worker threads; the sink serializes them
//! and never hands the callback a percentage lower than one it already saw.
//! The callback may report through the sink again from the same thread.

use std::cell::Cell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;

type Callback = dyn Fn(u8, &str) + Send + Sync;

struct Inner {
    callback: Box<Callback>,
    /// Highest percentage delivered so far.
    reported: ReentrantMutex<Cell<u8>>,
}

#[derive(Clone, Default)]
pub struct ProgressSink {
    inner: Option<Arc<Inner>>,
}

impl std::fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSink")
            .field("active", &self.inner.is_some())
            .finish()
    }
}

impl ProgressSink {
    /// Sink that drops every report.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(u8, &str) + Send + Sync + 'static,
    {
        Self {
            inner: Some(Arc::new(Inner {
                callback: Box::new(callback),
                reported: ReentrantMutex::new(Cell::new(0)),
            })),
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    /// Reports `percent` (clamped to 100) with a human-readable message.
    pub fn report(&self, percent: u8, message: &str) {
        let Some(inner) = &self.inner else {
            return;
        };
        let reported = inner.reported.lock();
        let percent = reported.get().max(percent.min(100));
        reported.set(percent);
        (inner.callback)(percent, message);
    }

    /// Reports step `done` of `total` linearly mapped into `[start, end]`.
    pub fn report_step(&self, start: u8, end: u8, done: usize, total: usize, message: &str) {
        if self.inner.is_none() {
            return;
        }
        let fraction = if total == 0 {
            1.0
        } else {
            done.min(total) as f64 / total as f64
        };
        let percent = start as f64 + (end.saturating_sub(start)) as f64 * fraction;
        self.report(percent.round() as u8, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording_sink() -> (ProgressSink, Arc<Mutex<Vec<(u8, String)>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink_log = Arc::clone(&log);
        let sink = ProgressSink::new(move |percent, message| {
            sink_log.lock().push((percent, message.to_string()));
        });
        (sink, log)
    }

    #[test]
    fn test_none_is_noop() {
        let sink = ProgressSink::none();
        assert!(!sink.is_active());
        sink.report(50, "ignored");
        sink.report_step(0, 30, 1, 2, "ignored");
    }

    #[test]
    fn test_reports_are_monotone() {
        let (sink, log) = recording_sink();
        sink.report(10, "a");
        sink.report(40, "b");
        sink.report(20, "c");
        sink.report(250, "d");
        let percents: Vec<u8> = log.lock().iter().map(|(p, _)| *p).collect();
        assert_eq!(percents, vec![10, 40, 40, 100]);
        assert_eq!(log.lock()[2].1, "c");
    }

    #[test]
    fn test_report_step_maps_into_range() {
        let (sink, log) = recording_sink();
        sink.report_step(30, 70, 1, 4, "frame 1");
        sink.report_step(30, 70, 4, 4, "frame 4");
        sink.report_step(70, 75, 0, 0, "nothing to do");
        let percents: Vec<u8> = log.lock().iter().map(|(p, _)| *p).collect();
        assert_eq!(percents, vec![40, 70, 75]);
    }

    #[test]
    fn test_clones_share_high_water_mark() {
        let (sink, log) = recording_sink();
        let clone = sink.clone();
        sink.report(60, "a");
        clone.report(30, "b");
        assert_eq!(log.lock()[1].0, 60);
    }

    #[test]
    fn test_callback_can_report_again() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let slot: Arc<Mutex<Option<ProgressSink>>> = Arc::new(Mutex::new(None));
        let sink_log = Arc::clone(&log);
        let sink_slot = Arc::clone(&slot);
        let sink = ProgressSink::new(move |percent, message| {
            sink_log.lock().push((percent, message.to_string()));
            let nested = sink_slot.lock().clone().filter(|_| percent < 50);
            if let Some(nested) = nested {
                nested.report(percent + 50, "nested");
            }
        });
        *slot.lock() = Some(sink.clone());

        sink.report(10, "outer");
        sink.report(20, "late");
        *slot.lock() = None;

        let log = log.lock();
        let percents: Vec<u8> = log.iter().map(|(p, _)| *p).collect();
        assert_eq!(percents, vec![10, 60, 60]);
        assert_eq!(log[1].1, "nested");
    }

    #[test]
    fn test_reports_from_threads_stay_monotone() {
        let (sink, log) = recording_sink();
        std::thread::scope(|scope| {
            for t in 0..4u8 {
                let sink = sink.clone();
                scope.spawn(move || {
                    for step in 0..25u8 {
                        sink.report(t * 25 + step, "worker");
                    }
                });
            }
        });
        let percents: Vec<u8> = log.lock().iter().map(|(p, _)| *p).collect();
        assert_eq!(percents.len(), 100);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(percents.last(), Some(&99));
    }
}
