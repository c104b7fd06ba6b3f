//! Fixed-Rate Tick Driver.
//!
//! Schedules a callback at a configured target rate on a dedicated worker
//! thread. Exactly one logical worker; a tick's callback always runs to
//! completion before the next is dispatched. On overrun, `next_frame` is
//! reset to "now" instead of accumulating a backlog of missed frames.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{error, warn};

/// Bound on the rolling window of recorded tick durations.
const DURATION_WINDOW: usize = 240;

/// Information delivered to the per-tick callback.
#[derive(Debug, Clone, Copy)]
pub struct TickInfo {
    pub tick_index: u32,
    pub delta_seconds: f64,
    pub frame_start: Instant,
}

#[derive(Debug, Error)]
pub enum TickDriverError {
    #[error("target_rate must be > 0, got {0}")]
    InvalidRate(f64),
}

type UpdateCallback = Box<dyn Fn(TickInfo) + Send + Sync>;

struct SharedCallback {
    callback: Mutex<Option<UpdateCallback>>,
}

struct StopSignal {
    mutex: Mutex<bool>,
    cv: Condvar,
}

impl StopSignal {
    fn new() -> Self {
        Self {
            mutex: Mutex::new(false),
            cv: Condvar::new(),
        }
    }

    fn request(&self) {
        let mut stop = self.mutex.lock().unwrap();
        *stop = true;
        self.cv.notify_all();
    }

    fn is_set(&self) -> bool {
        *self.mutex.lock().unwrap()
    }

    /// Sleep up to `dur`, waking early if a stop is requested.
    fn wait_for(&self, dur: Duration) {
        if dur.is_zero() {
            return;
        }
        let guard = self.mutex.lock().unwrap();
        let _ = self.cv.wait_timeout_while(guard, dur, |stop| !*stop);
    }
}

struct Metrics {
    target_rate: f64,
    last_durations: Mutex<std::collections::VecDeque<f64>>,
    tick_counter: AtomicU32,
}

impl Metrics {
    fn new(target_rate: f64) -> Self {
        Self {
            target_rate,
            last_durations: Mutex::new(std::collections::VecDeque::with_capacity(DURATION_WINDOW)),
            tick_counter: AtomicU32::new(0),
        }
    }

    fn record(&self, delta_seconds: f64) {
        let mut durations = self.last_durations.lock().unwrap();
        durations.push_back(delta_seconds);
        if durations.len() > DURATION_WINDOW {
            durations.pop_front();
        }
        self.tick_counter.fetch_add(1, Ordering::SeqCst);
    }

    fn current_tick_rate(&self) -> f64 {
        let durations = self.last_durations.lock().unwrap();
        match durations.back() {
            Some(latest) if *latest > 0.0 => 1.0 / latest,
            _ => self.target_rate,
        }
    }

    fn last_durations(&self) -> Vec<f64> {
        self.last_durations.lock().unwrap().iter().copied().collect()
    }

    fn prometheus_snapshot(&self, target_delta: f64) -> String {
        let last_duration = self
            .last_durations
            .lock()
            .unwrap()
            .back()
            .copied()
            .unwrap_or(target_delta);
        format!(
            "# TYPE game_tick_rate gauge\ngame_tick_rate {}\n# TYPE game_tick_duration_seconds gauge\ngame_tick_duration_seconds {}\n",
            self.current_tick_rate(),
            last_duration
        )
    }
}

/// Fixed-rate tick scheduler. One instance drives one game session's
/// clock; the session itself is reached only through the installed
/// callback, never owned directly by the driver.
pub struct TickDriver {
    target_rate: f64,
    target_delta: Duration,
    running: Arc<AtomicBool>,
    stop: Arc<StopSignal>,
    metrics: Arc<Metrics>,
    shared_callback: Arc<SharedCallback>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl TickDriver {
    pub fn new(target_rate: f64) -> Result<Self, TickDriverError> {
        if target_rate <= 0.0 {
            return Err(TickDriverError::InvalidRate(target_rate));
        }
        Ok(Self {
            target_rate,
            target_delta: Duration::from_secs_f64(1.0 / target_rate),
            running: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(StopSignal::new()),
            metrics: Arc::new(Metrics::new(target_rate)),
            shared_callback: Arc::new(SharedCallback {
                callback: Mutex::new(None),
            }),
            thread: Mutex::new(None),
        })
    }

    /// Install (or clear, with `None`) the per-tick callback. Replacing an
    /// existing callback is allowed at any time.
    pub fn set_update_callback<F>(&self, callback: Option<F>)
    where
        F: Fn(TickInfo) + Send + Sync + 'static,
    {
        let mut slot = self.shared_callback.callback.lock().unwrap();
        *slot = callback.map(|f| Box::new(f) as UpdateCallback);
    }

    /// Idempotent: a second call while already running is a no-op.
    pub fn start(&self) {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        {
            let mut stop = self.stop.mutex.lock().unwrap();
            *stop = false;
        }
        self.metrics.tick_counter.store(0, Ordering::SeqCst);
        self.metrics.last_durations.lock().unwrap().clear();

        let stop = self.stop.clone();
        let metrics = self.metrics.clone();
        let shared_callback = self.shared_callback.clone();
        let target_delta = self.target_delta;
        let running = self.running.clone();

        let handle = std::thread::spawn(move || {
            run_loop(stop, metrics, shared_callback, target_delta, running);
        });
        *self.thread.lock().unwrap() = Some(handle);
    }

    pub fn stop(&self) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        self.stop.request();
    }

    /// Blocks until the worker thread has observed the stop signal between
    /// ticks and exited.
    pub fn join(&self) {
        let handle = self.thread.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    pub fn target_delta_secs(&self) -> f64 {
        self.target_delta.as_secs_f64()
    }

    pub fn current_tick_rate(&self) -> f64 {
        self.metrics.current_tick_rate()
    }

    pub fn last_durations(&self) -> Vec<f64> {
        self.metrics.last_durations()
    }

    pub fn prometheus_snapshot(&self) -> String {
        self.metrics.prometheus_snapshot(self.target_delta_secs())
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

fn run_loop(
    stop: Arc<StopSignal>,
    metrics: Arc<Metrics>,
    shared_callback: Arc<SharedCallback>,
    target_delta: Duration,
    running: Arc<AtomicBool>,
) {
    let mut previous = Instant::now();
    let mut next_frame = previous + target_delta;

    loop {
        if stop.is_set() {
            running.store(false, Ordering::SeqCst);
            break;
        }

        let frame_start = Instant::now();
        let elapsed = frame_start.duration_since(previous);
        let delta_seconds = elapsed.as_secs_f64();
        let tick_index = metrics.tick_counter.load(Ordering::SeqCst);

        let info = TickInfo {
            tick_index,
            delta_seconds,
            frame_start,
        };

        {
            let callback = shared_callback.callback.lock().unwrap();
            if let Some(callback) = callback.as_ref() {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(info)));
                if let Err(panic) = result {
                    error!(?panic, "tick callback panicked, driver continues");
                    warn!("a panicking callback does not stop the tick driver");
                }
            }
        }

        previous = frame_start;
        next_frame += target_delta;
        metrics.record(delta_seconds);

        let now = Instant::now();
        if next_frame > now {
            stop.wait_for(next_frame - now);
        } else {
            // This tick overran its budget; do not try to catch up.
            next_frame = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32 as TestCounter;

    #[test]
    fn rejects_nonpositive_rate() {
        assert!(TickDriver::new(0.0).is_err());
        assert!(TickDriver::new(-10.0).is_err());
    }

    #[test]
    fn runs_and_stops_cleanly() {
        let driver = TickDriver::new(500.0).unwrap();
        let count = Arc::new(TestCounter::new(0));
        let count_clone = count.clone();
        driver.set_update_callback(Some(move |_info: TickInfo| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        driver.start();
        std::thread::sleep(Duration::from_millis(50));
        driver.stop();
        driver.join();

        assert!(count.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn start_is_idempotent() {
        let driver = TickDriver::new(200.0).unwrap();
        driver.start();
        driver.start();
        std::thread::sleep(Duration::from_millis(10));
        driver.stop();
        driver.join();
    }

    #[test]
    fn none_callback_discards_ticks_silently() {
        let driver = TickDriver::new(500.0).unwrap();
        driver.start();
        std::thread::sleep(Duration::from_millis(10));
        driver.stop();
        driver.join();
    }
}
