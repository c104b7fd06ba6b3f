//! Combat Anomaly Stats — the per-player counters the anomaly engine
//! scores.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Bound on the reaction-time ring buffer.
pub const REACTION_TIME_CAPACITY: usize = 100;

/// Totals and streak counters plus a bounded ring of recent reaction
/// times, for one player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatStats {
    pub total_shots: u32,
    pub total_hits: u32,
    pub total_headshots: u32,
    reaction_times_ms: VecDeque<f64>,
    pub current_streak: u32,
    pub max_streak: u32,
}

impl CombatStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_shot(&mut self, hit: bool, headshot: bool) {
        self.total_shots += 1;
        if hit {
            self.total_hits += 1;
            if headshot {
                self.total_headshots += 1;
            }
            self.current_streak += 1;
            self.max_streak = self.max_streak.max(self.current_streak);
        } else {
            self.current_streak = 0;
        }
    }

    /// Record one reaction time sample, evicting the oldest on overflow.
    pub fn record_reaction_time_ms(&mut self, reaction_ms: f64) {
        if self.reaction_times_ms.len() >= REACTION_TIME_CAPACITY {
            self.reaction_times_ms.pop_front();
        }
        self.reaction_times_ms.push_back(reaction_ms);
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_shots == 0 {
            0.0
        } else {
            self.total_hits as f64 / self.total_shots as f64
        }
    }

    pub fn headshot_rate(&self) -> f64 {
        if self.total_hits == 0 {
            0.0
        } else {
            self.total_headshots as f64 / self.total_hits as f64
        }
    }

    pub fn avg_reaction_time_ms(&self) -> f64 {
        mean(&self.reaction_times_ms)
    }

    /// Standard deviation of this player's own reaction times — the
    /// "consistency" metric the anomaly engine weighs.
    pub fn reaction_time_stddev_ms(&self) -> f64 {
        stddev(&self.reaction_times_ms)
    }

    pub fn reaction_sample_count(&self) -> usize {
        self.reaction_times_ms.len()
    }
}

fn mean(samples: &VecDeque<f64>) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Sample standard deviation (Bessel's correction, divisor `n - 1`).
fn stddev(samples: &VecDeque<f64>) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let m = mean(samples);
    let variance = samples.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_and_headshot_rate() {
        let mut stats = CombatStats::new();
        stats.record_shot(true, true);
        stats.record_shot(true, false);
        stats.record_shot(false, false);

        assert!((stats.accuracy() - 2.0 / 3.0).abs() < 1e-9);
        assert!((stats.headshot_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn streak_resets_on_miss() {
        let mut stats = CombatStats::new();
        stats.record_shot(true, false);
        stats.record_shot(true, false);
        stats.record_shot(false, false);
        stats.record_shot(true, false);

        assert_eq!(stats.max_streak, 2);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn reaction_time_buffer_is_bounded() {
        let mut stats = CombatStats::new();
        for i in 0..(REACTION_TIME_CAPACITY + 10) {
            stats.record_reaction_time_ms(i as f64);
        }
        assert_eq!(stats.reaction_sample_count(), REACTION_TIME_CAPACITY);
    }
}
