//! Anomaly scoring.
//!
//! Combines four per-metric z-scores into one weighted suspicion score in
//! `[0, 1]`. Every metric is symmetric: both above- and below-average
//! deviation from baseline count toward suspicion, matching the absolute
//! value taken unconditionally downstream in the source this engine was
//! grounded on.

use serde::{Deserialize, Serialize};

use crate::anticheat::stats::CombatStats;

/// Minimum shot count before scoring is attempted; below this, behavior
/// is too noisy to judge and `analyze` returns `0.0`.
pub const MIN_SHOTS_FOR_ANALYSIS: u32 = 10;

/// Default z-score threshold used to normalize each metric into `[0, 1]`.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Population baseline a player's metrics are compared against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GlobalStats {
    pub mean_accuracy: f64,
    pub std_accuracy: f64,
    pub mean_headshot_rate: f64,
    pub std_headshot_rate: f64,
    pub mean_reaction_ms: f64,
    pub std_reaction_ms: f64,
    pub mean_consistency_ms: f64,
    pub std_consistency_ms: f64,
}

impl Default for GlobalStats {
    fn default() -> Self {
        // Representative baseline for a casual FPS population; not load-bearing
        // outside tests — real deployments fit this from telemetry.
        Self {
            mean_accuracy: 0.25,
            std_accuracy: 0.08,
            mean_headshot_rate: 0.2,
            std_headshot_rate: 0.1,
            mean_reaction_ms: 250.0,
            std_reaction_ms: 60.0,
            mean_consistency_ms: 40.0,
            std_consistency_ms: 15.0,
        }
    }
}

/// Guard against division by (near) zero — returns `0.0` rather than
/// `inf`/`NaN`.
fn z_score(x: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev.abs() < 1e-9 {
        return 0.0;
    }
    (x - mean) / std_dev
}

/// Normalize a z-score's magnitude into `[0, 1]` against `threshold`,
/// symmetric in sign: a deviation of `-threshold` scores the same as `+threshold`.
fn clamp_unit(score: f64, threshold: f64) -> f64 {
    (score.abs() / threshold).clamp(0.0, 1.0)
}

pub struct AnomalyEngine {
    pub threshold: f64,
}

impl AnomalyEngine {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_Z_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Weighted suspicion score in `[0, 1]` for one player's stats against
    /// `baseline`. Returns `0.0` outright below [`MIN_SHOTS_FOR_ANALYSIS`]
    /// shots.
    ///
    /// All four metrics score `z = (x - mean) / std` and are normalized by
    /// `|z| / threshold`, so deviation in either direction counts: unusually
    /// high *or* low accuracy/headshot rate, and unusually fast *or* slow/
    /// erratic reaction behavior, all contribute to the combined score.
    pub fn analyze(&self, stats: &CombatStats, baseline: &GlobalStats) -> f64 {
        if stats.total_shots < MIN_SHOTS_FOR_ANALYSIS {
            return 0.0;
        }

        let accuracy_z = z_score(stats.accuracy(), baseline.mean_accuracy, baseline.std_accuracy);
        let headshot_z = z_score(
            stats.headshot_rate(),
            baseline.mean_headshot_rate,
            baseline.std_headshot_rate,
        );
        let reaction_z = z_score(
            stats.avg_reaction_time_ms(),
            baseline.mean_reaction_ms,
            baseline.std_reaction_ms,
        );
        let consistency_z = z_score(
            stats.reaction_time_stddev_ms(),
            baseline.mean_consistency_ms,
            baseline.std_consistency_ms,
        );

        let accuracy_score = clamp_unit(accuracy_z, self.threshold);
        let headshot_score = clamp_unit(headshot_z, self.threshold);
        let reaction_score = clamp_unit(reaction_z, self.threshold);
        let consistency_score = clamp_unit(consistency_z, self.threshold);

        0.3 * accuracy_score + 0.3 * headshot_score + 0.2 * reaction_score + 0.2 * consistency_score
    }
}

impl Default for AnomalyEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_minimum_shots_scores_zero() {
        let engine = AnomalyEngine::new();
        let mut stats = CombatStats::new();
        for _ in 0..5 {
            stats.record_shot(true, true);
        }
        assert_eq!(engine.analyze(&stats, &GlobalStats::default()), 0.0);
    }

    #[test]
    fn extreme_accuracy_is_flagged() {
        let engine = AnomalyEngine::new();
        let mut stats = CombatStats::new();
        for _ in 0..20 {
            stats.record_shot(true, true);
        }
        let score = engine.analyze(&stats, &GlobalStats::default());
        assert!(score > 0.0);
    }

    #[test]
    fn slow_reactions_are_flagged_symmetrically_with_fast_ones() {
        let engine = AnomalyEngine::new();
        let baseline = GlobalStats::default();

        let mut slow = CombatStats::new();
        let mut fast = CombatStats::new();
        for _ in 0..20 {
            slow.record_shot(false, false);
            slow.record_reaction_time_ms(baseline.mean_reaction_ms + 3.0 * baseline.std_reaction_ms);
            fast.record_shot(false, false);
            fast.record_reaction_time_ms(baseline.mean_reaction_ms - 3.0 * baseline.std_reaction_ms);
        }

        let slow_score = engine.analyze(&slow, &baseline);
        let fast_score = engine.analyze(&fast, &baseline);
        assert!(slow_score > 0.0, "far-slower-than-average reactions must be flagged too");
        assert!((slow_score - fast_score).abs() < 1e-9);
    }

    #[test]
    fn zero_std_dev_guards_against_division() {
        let engine = AnomalyEngine::new();
        let mut stats = CombatStats::new();
        for _ in 0..20 {
            stats.record_shot(true, false);
        }
        let baseline = GlobalStats {
            std_accuracy: 0.0,
            ..GlobalStats::default()
        };
        let score = engine.analyze(&stats, &baseline);
        assert!(score.is_finite());
    }
}
