use std::sync::Mutex;

/// Snapshot of the counters: (reads, writes, rejections, store errors).
pub type MetricsSnapshot = (usize, usize, usize, usize);

/// Running counters for request outcomes, shared across handlers.
pub struct MetricsRecorder {
    inner: Mutex<Counters>,
}

#[derive(Default)]
struct Counters {
    reads: usize,
    writes: usize,
    rejections: usize,
    store_errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters::default()),
        }
    }

    pub fn record_read(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.reads += 1;
        }
    }

    pub fn record_write(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.writes += 1;
        }
    }

    pub fn record_rejection(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.rejections += 1;
        }
    }

    pub fn record_store_error(&self) {
        if let Ok(mut counters) = self.inner.lock() {
            counters.store_errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(counters) = self.inner.lock() {
            (
                counters.reads,
                counters.writes,
                counters.rejections,
                counters.store_errors,
            )
        } else {
            (0, 0, 0, 0)
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
