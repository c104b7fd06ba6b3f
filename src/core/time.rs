//! Monotonic session time.
//!
//! The core never reads system wall-clock time for simulation decisions
//! (fire cooldowns, rewind bounds, tick deltas) — only a session-scoped
//! clock that starts at zero when a session is created. Wall-clock time
//! is used only at the edges (match-result completion timestamps), via
//! `chrono`.

use std::time::Instant;

/// Milliseconds since an arbitrary epoch fixed at construction.
pub type SessionTimeMs = u64;

/// A monotonic clock scoped to one game session.
#[derive(Debug, Clone)]
pub struct SessionClock {
    origin: Instant,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds elapsed since this clock was created.
    pub fn now_ms(&self) -> SessionTimeMs {
        self.origin.elapsed().as_millis() as SessionTimeMs
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
