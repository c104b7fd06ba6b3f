//! Player Profile Service — aggregate stats and ELO ratings.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::stats::leaderboard::LeaderboardStore;
use crate::stats::types::{AggregateProfile, MatchResult, DEFAULT_RATING};

/// ELO K-factor.
pub const K_FACTOR: f64 = 25.0;

/// Expected score for a player rated `rating` against an opponent rated
/// `opponent_rating`, standard logistic ELO formula.
pub fn expected_score(rating: i32, opponent_rating: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent_rating - rating) as f64 / 400.0))
}

/// Round-half-away-from-zero, matching the documented worked example
/// (1200 vs 1200 after a win resolves to 1213/1188, not banker's
/// rounding's 1212/1187).
fn round_rating(value: f64) -> i32 {
    value.round() as i32
}

struct Metrics {
    matches_recorded: AtomicU64,
    rating_updates: AtomicU64,
}

/// Owns per-player aggregate profiles. A leaderboard may be attached at
/// construction; if absent, `top_profiles` falls back to scanning
/// aggregates directly.
pub struct ProfileService {
    profiles: Mutex<BTreeMap<String, AggregateProfile>>,
    leaderboard: Option<Arc<LeaderboardStore>>,
    metrics: Metrics,
}

impl ProfileService {
    pub fn new() -> Self {
        Self::with_leaderboard(None)
    }

    pub fn with_leaderboard(leaderboard: Option<Arc<LeaderboardStore>>) -> Self {
        Self {
            profiles: Mutex::new(BTreeMap::new()),
            leaderboard,
            metrics: Metrics {
                matches_recorded: AtomicU64::new(0),
                rating_updates: AtomicU64::new(0),
            },
        }
    }

    /// Apply one match's result: accumulate stats, update ELO ratings,
    /// and push into the leaderboard if attached.
    pub fn record_match(&self, result: &MatchResult) {
        let mut profiles = self.profiles.lock().unwrap();

        for stats in &result.player_stats {
            let profile = profiles
                .entry(stats.player_id.clone())
                .or_insert_with(|| AggregateProfile::new(stats.player_id.clone()));
            profile.accumulate(stats);
        }

        let winner_rating = profiles
            .get(&result.winner_id)
            .map(|p| p.rating)
            .unwrap_or(DEFAULT_RATING);
        let loser_rating = profiles
            .get(&result.loser_id)
            .map(|p| p.rating)
            .unwrap_or(DEFAULT_RATING);

        let winner_expected = expected_score(winner_rating, loser_rating);
        let loser_expected = expected_score(loser_rating, winner_rating);

        let new_winner_rating = round_rating(winner_rating as f64 + K_FACTOR * (1.0 - winner_expected));
        let new_loser_rating = round_rating(loser_rating as f64 + K_FACTOR * (0.0 - loser_expected));

        if let Some(winner) = profiles.get_mut(&result.winner_id) {
            winner.wins += 1;
            winner.rating = new_winner_rating;
        }
        if let Some(loser) = profiles.get_mut(&result.loser_id) {
            loser.losses += 1;
            loser.rating = new_loser_rating;
        }

        if let Some(leaderboard) = &self.leaderboard {
            leaderboard.upsert(&result.winner_id, new_winner_rating);
            leaderboard.upsert(&result.loser_id, new_loser_rating);
        }

        self.metrics.matches_recorded.fetch_add(1, Ordering::Relaxed);
        self.metrics.rating_updates.fetch_add(2, Ordering::Relaxed);

        info!(
            winner = %result.winner_id,
            loser = %result.loser_id,
            winner_rating = new_winner_rating,
            loser_rating = new_loser_rating,
            "match recorded"
        );
    }

    pub fn get_profile(&self, id: &str) -> Option<AggregateProfile> {
        self.profiles.lock().unwrap().get(id).cloned()
    }

    /// Top `limit` profiles by rating. Uses the attached leaderboard's
    /// ordering when present; otherwise scans aggregates and sorts by
    /// `(rating desc, id asc)`.
    pub fn top_profiles(&self, limit: usize) -> Vec<AggregateProfile> {
        let profiles = self.profiles.lock().unwrap();

        if let Some(leaderboard) = &self.leaderboard {
            return leaderboard
                .top_n(limit)
                .into_iter()
                .filter_map(|(id, _)| profiles.get(&id).cloned())
                .collect();
        }

        let mut all: Vec<AggregateProfile> = profiles.values().cloned().collect();
        all.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.player_id.cmp(&b.player_id)));
        all.truncate(limit);
        all
    }

    pub fn matches_recorded(&self) -> u64 {
        self.metrics.matches_recorded.load(Ordering::Relaxed)
    }

    pub fn rating_updates(&self) -> u64 {
        self.metrics.rating_updates.load(Ordering::Relaxed)
    }

    /// Prometheus-compatible text snapshot.
    pub fn metrics_snapshot(&self) -> String {
        let profiles_total = self.profiles.lock().unwrap().len();
        let leaderboard_entries = self.leaderboard.as_ref().map(|l| l.len()).unwrap_or(profiles_total);

        format!(
            "# TYPE player_profiles_total gauge\nplayer_profiles_total {}\n\
             # TYPE matches_recorded_total counter\nmatches_recorded_total {}\n\
             # TYPE rating_updates_total counter\nrating_updates_total {}\n\
             # TYPE leaderboard_entries_total gauge\nleaderboard_entries_total {}\n",
            profiles_total,
            self.matches_recorded(),
            self.rating_updates(),
            leaderboard_entries,
        )
    }
}

impl Default for ProfileService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::types::PlayerMatchStats;
    use chrono::Utc;

    fn fresh_result(winner: &str, loser: &str) -> MatchResult {
        MatchResult {
            winner_id: winner.to_string(),
            loser_id: loser.to_string(),
            completed_at: Utc::now(),
            player_stats: vec![
                PlayerMatchStats {
                    player_id: winner.to_string(),
                    shots_fired: 10,
                    hits_landed: 5,
                    kills: 1,
                    deaths: 0,
                    damage_dealt: 100,
                    damage_taken: 0,
                },
                PlayerMatchStats {
                    player_id: loser.to_string(),
                    shots_fired: 8,
                    hits_landed: 2,
                    kills: 0,
                    deaths: 1,
                    damage_dealt: 0,
                    damage_taken: 100,
                },
            ],
        }
    }

    #[test]
    fn elo_update_matches_worked_example() {
        let service = ProfileService::new();
        service.record_match(&fresh_result("attacker", "defender"));

        let attacker = service.get_profile("attacker").unwrap();
        let defender = service.get_profile("defender").unwrap();

        assert_eq!(attacker.rating, 1213);
        assert_eq!(defender.rating, 1188);
        assert!((attacker.rating + defender.rating - 2 * DEFAULT_RATING).abs() <= 1);
        assert!(attacker.rating >= DEFAULT_RATING);
        assert!(defender.rating <= DEFAULT_RATING);
    }

    #[test]
    fn top_profiles_without_leaderboard_sorts_by_rating_desc() {
        let service = ProfileService::new();
        service.record_match(&fresh_result("a", "b"));
        service.record_match(&fresh_result("a", "c"));

        let top = service.top_profiles(10);
        assert_eq!(top[0].player_id, "a");
    }

    #[test]
    fn top_profiles_with_leaderboard_matches_its_order() {
        let leaderboard = Arc::new(LeaderboardStore::new());
        let service = ProfileService::with_leaderboard(Some(leaderboard.clone()));
        service.record_match(&fresh_result("x", "y"));

        let top = service.top_profiles(10);
        assert_eq!(top[0].player_id, "x");
        assert_eq!(leaderboard.score_of("x"), Some(top[0].rating));
    }
}
