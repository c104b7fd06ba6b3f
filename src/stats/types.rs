//! Immutable match-result and aggregate-profile records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default ELO rating assigned to a profile on first sight.
pub const DEFAULT_RATING: i32 = 1200;

/// One player's contribution to a single completed match. Immutable once
/// produced by [`crate::stats::collector::MatchStatsCollector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchStats {
    pub player_id: String,
    pub shots_fired: u32,
    pub hits_landed: u32,
    pub kills: u32,
    pub deaths: u32,
    pub damage_dealt: u32,
    pub damage_taken: u32,
}

impl PlayerMatchStats {
    pub fn accuracy(&self) -> f64 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.hits_landed as f64 / self.shots_fired as f64
        }
    }
}

/// The outcome of one match: a winner, a loser, and per-player stats
/// sorted by player id for deterministic downstream processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner_id: String,
    pub loser_id: String,
    pub completed_at: DateTime<Utc>,
    pub player_stats: Vec<PlayerMatchStats>,
}

/// Running sums of per-match stats for one player, plus their current ELO
/// rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateProfile {
    pub player_id: String,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    pub total_shots_fired: u64,
    pub total_hits_landed: u64,
    pub total_kills: u64,
    pub total_deaths: u64,
    pub total_damage_dealt: u64,
    pub total_damage_taken: u64,
}

impl AggregateProfile {
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            rating: DEFAULT_RATING,
            wins: 0,
            losses: 0,
            total_shots_fired: 0,
            total_hits_landed: 0,
            total_kills: 0,
            total_deaths: 0,
            total_damage_dealt: 0,
            total_damage_taken: 0,
        }
    }

    pub(crate) fn accumulate(&mut self, stats: &PlayerMatchStats) {
        self.total_shots_fired += stats.shots_fired as u64;
        self.total_hits_landed += stats.hits_landed as u64;
        self.total_kills += stats.kills as u64;
        self.total_deaths += stats.deaths as u64;
        self.total_damage_dealt += stats.damage_dealt as u64;
        self.total_damage_taken += stats.damage_taken as u64;
    }
}
