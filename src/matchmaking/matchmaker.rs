//! Matchmaker — pairs queued players whose ratings are mutually within an
//! expanding tolerance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::info;

use crate::matchmaking::queue::MatchQueue;
use crate::matchmaking::types::{regions_compatible, resolve_region, Match, MatchRequest};

/// Base rating tolerance at zero wait time.
pub const TOLERANCE_BASE: i32 = 100;
/// Tolerance growth per `STEP_SECONDS` of wait.
pub const TOLERANCE_STEP: i32 = 25;
/// Wait-time granularity for tolerance growth, in seconds.
pub const TOLERANCE_STEP_SECONDS: f64 = 5.0;

/// Wait-time histogram bucket boundaries, in seconds, plus an implicit
/// `+Inf` overflow bucket.
pub const WAIT_HISTOGRAM_BUCKETS: [f64; 6] = [0.0, 5.0, 10.0, 20.0, 40.0, 80.0];

/// Rating tolerance after waiting `wait_seconds`.
pub fn current_tolerance(wait_seconds: f64) -> i32 {
    let wait_seconds = wait_seconds.max(0.0);
    TOLERANCE_BASE + TOLERANCE_STEP * (wait_seconds / TOLERANCE_STEP_SECONDS).floor() as i32
}

#[derive(Default)]
struct WaitHistogram {
    /// Cumulative count per boundary in `WAIT_HISTOGRAM_BUCKETS`, i.e.
    /// `counts[i]` is the number of observations `<= WAIT_HISTOGRAM_BUCKETS[i]`.
    counts: [u64; 6],
    sum: f64,
    total: u64,
}

impl WaitHistogram {
    fn observe(&mut self, wait_seconds: f64) {
        for (i, bound) in WAIT_HISTOGRAM_BUCKETS.iter().enumerate() {
            if wait_seconds <= *bound {
                self.counts[i] += 1;
            }
        }
        self.sum += wait_seconds;
        self.total += 1;
    }

    fn prometheus_snapshot(&self) -> String {
        let mut out = String::from("# TYPE matchmaking_wait_seconds histogram\n");
        for (i, bound) in WAIT_HISTOGRAM_BUCKETS.iter().enumerate() {
            let cumulative = self.counts[i];
            out.push_str(&format!(
                "matchmaking_wait_seconds_bucket{{le=\"{bound}\"}} {cumulative}\n"
            ));
        }
        out.push_str(&format!(
            "matchmaking_wait_seconds_bucket{{le=\"+Inf\"}} {}\n",
            self.total
        ));
        out.push_str(&format!("matchmaking_wait_seconds_sum {}\n", self.sum));
        out.push_str(&format!("matchmaking_wait_seconds_count {}\n", self.total));
        out
    }
}

type MatchCreatedHook = Box<dyn Fn(&Match) + Send + Sync>;

/// Pairs queued players and publishes formed matches to subscribers.
pub struct Matchmaker {
    queue: MatchQueue,
    next_match_id: AtomicU64,
    matches_formed: AtomicU64,
    wait_histogram: Mutex<WaitHistogram>,
    notify_tx: broadcast::Sender<Match>,
    match_created_hook: Option<MatchCreatedHook>,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self::with_hook(None)
    }

    pub fn with_hook(match_created_hook: Option<MatchCreatedHook>) -> Self {
        let (notify_tx, _rx) = broadcast::channel(256);
        Self {
            queue: MatchQueue::new(),
            next_match_id: AtomicU64::new(1),
            matches_formed: AtomicU64::new(0),
            wait_histogram: Mutex::new(WaitHistogram::default()),
            notify_tx,
            match_created_hook,
        }
    }

    pub fn enqueue(&self, request: MatchRequest) -> u64 {
        self.queue.enqueue(request)
    }

    pub fn cancel(&self, player_id: &str) {
        self.queue.cancel(player_id);
    }

    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    /// Subscribe to formed matches. Each subscriber gets its own receiver;
    /// matches published before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<Match> {
        self.notify_tx.subscribe()
    }

    /// One matching pass at time `now` (caller-supplied monotonic clock,
    /// in seconds). Returns every match formed this pass.
    pub fn run_matching(&self, now: f64) -> Vec<Match> {
        let ordered = self.queue.ordered_players();
        let mut used = vec![false; ordered.len()];
        let mut matches = Vec::new();
        let mut matched_ids = Vec::new();

        for i in 0..ordered.len() {
            if used[i] {
                continue;
            }
            let candidate = &ordered[i];
            let wait_a = now - candidate.request.enqueue_time;
            let tolerance_a = current_tolerance(wait_a);

            for j in (i + 1)..ordered.len() {
                if used[j] {
                    continue;
                }
                let other = &ordered[j];

                if other.request.rating > candidate.request.rating + tolerance_a {
                    break;
                }

                let wait_b = now - other.request.enqueue_time;
                let tolerance_b = current_tolerance(wait_b);
                let diff = (candidate.request.rating - other.request.rating).abs();

                if diff <= tolerance_a
                    && diff <= tolerance_b
                    && regions_compatible(&candidate.request.preferred_region, &other.request.preferred_region)
                {
                    used[i] = true;
                    used[j] = true;

                    let match_id = format!("match-{}", self.next_match_id.fetch_add(1, Ordering::Relaxed));
                    let average_rating = (candidate.request.rating + other.request.rating) as f64 / 2.0;
                    let resolved_region =
                        resolve_region(&candidate.request.preferred_region, &other.request.preferred_region);

                    let formed = Match {
                        id: match_id,
                        player_ids: vec![candidate.request.player_id.clone(), other.request.player_id.clone()],
                        average_rating,
                        created_at: now,
                        resolved_region,
                    };

                    {
                        let mut histogram = self.wait_histogram.lock().unwrap();
                        histogram.observe(wait_a);
                        histogram.observe(wait_b);
                    }

                    matched_ids.push(candidate.request.player_id.clone());
                    matched_ids.push(other.request.player_id.clone());

                    info!(match_id = %formed.id, players = ?formed.player_ids, "match formed");
                    let _ = self.notify_tx.send(formed.clone());
                    if let Some(hook) = &self.match_created_hook {
                        hook(&formed);
                    }

                    matches.push(formed);
                    break;
                }
            }
        }

        if !matched_ids.is_empty() {
            self.queue.remove_all(&matched_ids);
        }
        self.matches_formed.fetch_add(matches.len() as u64, Ordering::Relaxed);

        matches
    }

    pub fn matches_formed_total(&self) -> u64 {
        self.matches_formed.load(Ordering::Relaxed)
    }

    /// Prometheus-compatible text snapshot.
    pub fn metrics_snapshot(&self) -> String {
        let mut out = format!(
            "# TYPE matchmaking_queue_size gauge\nmatchmaking_queue_size {}\n\
             # TYPE matchmaking_matches_total counter\nmatchmaking_matches_total {}\n",
            self.queue_size(),
            self.matches_formed_total(),
        );
        out.push_str(&self.wait_histogram.lock().unwrap().prometheus_snapshot());
        out
    }
}

impl Default for Matchmaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: &str, rating: i32, enqueue_time: f64) -> MatchRequest {
        MatchRequest {
            player_id: id.to_string(),
            rating,
            enqueue_time,
            preferred_region: "any".to_string(),
        }
    }

    #[test]
    fn tolerance_grows_in_steps() {
        assert_eq!(current_tolerance(0.0), 100);
        assert_eq!(current_tolerance(4.9), 100);
        assert_eq!(current_tolerance(5.0), 125);
        assert_eq!(current_tolerance(12.0), 150);
    }

    #[test]
    fn pairs_within_expanded_tolerance() {
        let mm = Matchmaker::new();
        mm.enqueue(request("alice", 1200, -12.0));
        mm.enqueue(request("bob", 1340, -12.0));

        let matches = mm.run_matching(0.0);
        assert_eq!(matches.len(), 1);
        let mut ids = matches[0].player_ids.clone();
        ids.sort();
        assert_eq!(ids, vec!["alice".to_string(), "bob".to_string()]);
        assert!(mm.queue_size() == 0);
    }

    #[test]
    fn no_match_below_tolerance_boundary() {
        let mm = Matchmaker::new();
        mm.enqueue(request("x", 1200, 0.0));
        mm.enqueue(request("y", 1350, 0.0));

        let matches = mm.run_matching(0.0);
        assert!(matches.is_empty());
        assert_eq!(mm.queue_size(), 2);
    }

    #[test]
    fn every_player_matches_at_most_once() {
        let mm = Matchmaker::new();
        mm.enqueue(request("a", 1200, 0.0));
        mm.enqueue(request("b", 1210, 0.0));
        mm.enqueue(request("c", 1220, 0.0));

        let matches = mm.run_matching(0.0);
        let mut seen = std::collections::HashSet::new();
        for m in &matches {
            for id in &m.player_ids {
                assert!(seen.insert(id.clone()), "player matched twice");
            }
        }
    }

    #[test]
    fn incompatible_regions_block_a_match() {
        let mm = Matchmaker::new();
        mm.enqueue(MatchRequest {
            player_id: "a".to_string(),
            rating: 1200,
            enqueue_time: 0.0,
            preferred_region: "eu".to_string(),
        });
        mm.enqueue(MatchRequest {
            player_id: "b".to_string(),
            rating: 1210,
            enqueue_time: 0.0,
            preferred_region: "na".to_string(),
        });

        let matches = mm.run_matching(0.0);
        assert!(matches.is_empty());
    }
}
