use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{DeviceOrientationProvider, Orientation};
use crate::util::FrameTime;

/// Samples retained for "at or before `t`" lookups.
const DEFAULT_HISTORY: usize = 32;

struct FeedState {
    history: VecDeque<Orientation>,
    capacity: usize,
}

impl FeedState {
    fn latest(&self) -> Option<&Orientation> {
        self.history.back()
    }

    fn is_fresh(&self, time: FrameTime, max_age: Option<f64>) -> bool {
        match (self.latest(), max_age) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(latest), Some(age)) => time.elapsed_since(latest.timestamp) <= age,
        }
    }
}

struct Shared {
    state: Mutex<FeedState>,
    ready: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Writer side of a sensor feed, held by the sensor thread.
///
/// Cloning yields another writer for the same feed.
#[derive(Clone)]
pub struct SensorFeed {
    shared: Arc<Shared>,
}

/// Reader side of a sensor feed, installed on the orientation node.
pub struct FeedProvider {
    shared: Arc<Shared>,
    max_sample_age: Option<f64>,
}

impl SensorFeed {
    /// New feed with the default history length.
    pub fn new() -> Self {
        Self::with_history(DEFAULT_HISTORY)
    }

    /// New feed keeping the last `capacity` samples (at least one).
    pub fn with_history(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(FeedState {
                    history: VecDeque::with_capacity(capacity),
                    capacity,
                }),
                ready: Condvar::new(),
            }),
        }
    }

    /// Publish a sample and wake a waiting render thread.
    ///
    /// Samples older than the newest one already published are dropped.
    pub fn push(&self, sample: Orientation) {
        if !sample.is_valid() {
            log::warn!("Dropping invalid orientation sample: {sample:?}");
            return;
        }
        {
            let mut state = self.shared.lock();
            if state
                .latest()
                .is_some_and(|latest| latest.timestamp > sample.timestamp)
            {
                log::trace!("Dropping out-of-order sample at {:?}", sample.timestamp);
                return;
            }
            if state.history.len() == state.capacity {
                let _ = state.history.pop_front();
            }
            state.history.push_back(sample);
        }
        self.shared.ready.notify_all();
    }

    /// Reader for this feed.
    pub fn provider(&self) -> FeedProvider {
        FeedProvider {
            shared: Arc::clone(&self.shared),
            max_sample_age: None,
        }
    }
}

impl Default for SensorFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedProvider {
    /// Treat samples older than `max_age` relative to the frame time as
    /// stale, so the coordinator waits for a fresher one.
    #[must_use]
    pub fn with_max_sample_age(mut self, max_age: Duration) -> Self {
        self.max_sample_age = Some(max_age.as_secs_f64());
        self
    }
}

impl DeviceOrientationProvider for FeedProvider {
    fn should_wait(&self, time: FrameTime) -> bool {
        !self.shared.lock().is_fresh(time, self.max_sample_age)
    }

    fn wait(&self, time: FrameTime, timeout: Duration) -> bool {
        let max_age = self.max_sample_age;
        let guard = self.shared.lock();
        let (guard, _) = self
            .shared
            .ready
            .wait_timeout_while(guard, timeout, |state| {
                !state.is_fresh(time, max_age)
            })
            .unwrap_or_else(PoisonError::into_inner);
        guard.is_fresh(time, max_age)
    }

    fn current_orientation(&self, time: FrameTime) -> Option<Orientation> {
        let state = self.shared.lock();
        state
            .history
            .iter()
            .rev()
            .find(|sample| sample.timestamp <= time)
            .or_else(|| state.history.front())
            .copied()
    }
}
