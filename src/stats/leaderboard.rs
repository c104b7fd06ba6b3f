//! Rating-descending leaderboard index.
//!
//! Maps id -> score plus a score-descending multiset of ids for O(log n)
//! upsert and top-N. The two structures live behind a single mutex rather
//! than two, since an upsert must touch both atomically (remove from the
//! old bucket, insert into the new) — this is the "own its own mutex, do
//! not acquire two at once" design note applied by merging what would
//! otherwise be two locks guarding one invariant.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

struct LeaderboardState {
    scores: BTreeMap<String, i32>,
    /// score -> ids at that score, ascending id within a bucket.
    ordered: BTreeMap<i32, BTreeSet<String>>,
}

/// In-memory rating leaderboard. Persistence backends are out of scope —
/// this is the ordering contract only.
pub struct LeaderboardStore {
    state: Mutex<LeaderboardState>,
}

impl LeaderboardStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LeaderboardState {
                scores: BTreeMap::new(),
                ordered: BTreeMap::new(),
            }),
        }
    }

    /// Insert or move `id` to `score`, removing it from its previous
    /// bucket first.
    pub fn upsert(&self, id: &str, score: i32) {
        let mut state = self.state.lock().unwrap();
        if let Some(old_score) = state.scores.get(id).copied() {
            if let Some(bucket) = state.ordered.get_mut(&old_score) {
                bucket.remove(id);
                if bucket.is_empty() {
                    state.ordered.remove(&old_score);
                }
            }
        }
        state.scores.insert(id.to_string(), score);
        state.ordered.entry(score).or_default().insert(id.to_string());
    }

    pub fn remove(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(score) = state.scores.remove(id) {
            if let Some(bucket) = state.ordered.get_mut(&score) {
                bucket.remove(id);
                if bucket.is_empty() {
                    state.ordered.remove(&score);
                }
            }
        }
    }

    pub fn score_of(&self, id: &str) -> Option<i32> {
        self.state.lock().unwrap().scores.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest-`limit` (id, score) pairs, score descending, id ascending
    /// within a tie.
    pub fn top_n(&self, limit: usize) -> Vec<(String, i32)> {
        let state = self.state.lock().unwrap();
        state
            .ordered
            .iter()
            .rev()
            .flat_map(|(score, ids)| ids.iter().map(move |id| (id.clone(), *score)))
            .take(limit)
            .collect()
    }
}

impl Default for LeaderboardStore {
    fn default() -> Self {
        Self::new()
    }
}
