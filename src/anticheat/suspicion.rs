//! Suspicion tracking — accumulates anomaly violations per player into a
//! level consumers can act on. This component never takes authoritative
//! action itself.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Derived suspicion level from the maximum combined anomaly score seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuspicionLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl SuspicionLevel {
    /// Thresholds: 0.3 / 0.5 / 0.7 / 0.9, default per spec.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            SuspicionLevel::Critical
        } else if score >= 0.7 {
            SuspicionLevel::High
        } else if score >= 0.5 {
            SuspicionLevel::Medium
        } else if score >= 0.3 {
            SuspicionLevel::Low
        } else {
            SuspicionLevel::None
        }
    }
}

/// One flagged observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub description: String,
    pub severity: f64,
    pub combined_score: f64,
}

/// A player's accumulated suspicion history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspicionRecord {
    pub player_id: String,
    pub accumulated_severity: f64,
    pub max_combined_score: f64,
    pub violations: Vec<Violation>,
}

impl SuspicionRecord {
    fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            accumulated_severity: 0.0,
            max_combined_score: 0.0,
            violations: Vec::new(),
        }
    }

    pub fn level(&self) -> SuspicionLevel {
        SuspicionLevel::from_score(self.max_combined_score)
    }
}

/// Owns every player's suspicion record under its own lock.
pub struct SuspicionStore {
    records: Mutex<BTreeMap<String, SuspicionRecord>>,
}

impl SuspicionStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
        }
    }

    /// Record one violation for `player_id`, with the combined anomaly
    /// score that produced it.
    pub fn record_violation(&self, player_id: &str, description: &str, severity: f64, combined_score: f64) {
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(player_id.to_string())
            .or_insert_with(|| SuspicionRecord::new(player_id));

        record.accumulated_severity += severity;
        record.max_combined_score = record.max_combined_score.max(combined_score);
        record.violations.push(Violation {
            description: description.to_string(),
            severity,
            combined_score,
        });
    }

    pub fn get(&self, player_id: &str) -> Option<SuspicionRecord> {
        self.records.lock().unwrap().get(player_id).cloned()
    }

    pub fn level(&self, player_id: &str) -> SuspicionLevel {
        self.get(player_id).map(|r| r.level()).unwrap_or(SuspicionLevel::None)
    }
}

impl Default for SuspicionStore {
    fn default() -> Self {
        Self::new()
    }
}
