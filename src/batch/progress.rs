use std::sync::atomic::{AtomicUsize, Ordering};

type Observer = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Shared "N of M files completed" counter for one batch run.
///
/// The counter is a plain atomic: increments from any number of workers
/// lose no updates, and reads can never tear or exceed `total` as long
/// as one increment happens per completed job. Notification is advisory
/// and never affects batch results.
pub struct ProgressTracker {
    completed: AtomicUsize,
    total: usize,
    observer: Option<Observer>,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
            observer: None,
        }
    }

    /// Attach a callback receiving `(completed, total)` on `notify`.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Record one completed job; returns the new completed count.
    pub fn increment(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn percent_complete(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        100.0 * self.completed() as f32 / self.total as f32
    }

    /// Push the current state to the observer, if one is attached.
    pub fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer(self.completed(), self.total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn counts_to_exactly_n_under_concurrent_increments() {
        let total = 1000;
        let workers = 8;
        let tracker = Arc::new(ProgressTracker::new(total));

        std::thread::scope(|s| {
            for _ in 0..workers {
                let tracker = Arc::clone(&tracker);
                s.spawn(move || {
                    for _ in 0..total / workers {
                        let seen = tracker.increment();
                        assert!(seen <= total);
                    }
                });
            }
        });

        assert_eq!(tracker.completed(), total);
        assert_eq!(tracker.percent_complete(), 100.0);
    }

    #[test]
    fn increments_are_monotone() {
        let tracker = ProgressTracker::new(10);
        let mut previous = 0;
        for _ in 0..10 {
            let now = tracker.increment();
            assert!(now > previous);
            previous = now;
        }
    }

    #[test]
    fn notify_reports_current_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let tracker = ProgressTracker::new(2).with_observer(move |done, total| {
            assert!(done <= total);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        tracker.increment();
        tracker.notify();
        tracker.increment();
        tracker.notify();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.percent_complete(), 100.0);
    }

    #[test]
    fn empty_batch_reads_as_complete() {
        let tracker = ProgressTracker::new(0);
        assert_eq!(tracker.percent_complete(), 100.0);
    }
}
