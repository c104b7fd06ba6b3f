//! Matchmaking data types.

use serde::{Deserialize, Serialize};

/// A region that matches any preference.
pub const ANY_REGION: &str = "any";

/// One player's request to be matched. `enqueue_time` is a caller-supplied
/// monotonic clock reading in seconds — the matchmaker never reads system
/// time itself, so tests can drive `run_matching` with arbitrary `now`
/// values without sleeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub player_id: String,
    pub rating: i32,
    pub enqueue_time: f64,
    pub preferred_region: String,
}

/// A request plus its insertion order, for stable tie-breaking when
/// ratings are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedPlayer {
    pub request: MatchRequest,
    pub order: u64,
}

/// A formed pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub player_ids: Vec<String>,
    pub average_rating: f64,
    pub created_at: f64,
    pub resolved_region: String,
}

/// Whether two region preferences permit a match: equal, or either side
/// is `"any"`.
pub fn regions_compatible(a: &str, b: &str) -> bool {
    a == b || a == ANY_REGION || b == ANY_REGION
}

/// Resolve the region two matched players should play in: if both
/// preferences are equal, that region; else whichever side isn't `"any"`;
/// else (both equal and non-"any" was already handled) the first
/// operand. Documented, stable tiebreak per the spec's own note that any
/// deterministic choice is acceptable.
pub fn resolve_region(a: &str, b: &str) -> String {
    if a == b {
        a.to_string()
    } else if a == ANY_REGION {
        b.to_string()
    } else if b == ANY_REGION {
        a.to_string()
    } else {
        a.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_everything() {
        assert!(regions_compatible("any", "eu"));
        assert!(regions_compatible("eu", "any"));
        assert!(regions_compatible("eu", "eu"));
        assert!(!regions_compatible("eu", "na"));
    }

    #[test]
    fn resolve_prefers_the_concrete_region() {
        assert_eq!(resolve_region("eu", "eu"), "eu");
        assert_eq!(resolve_region("any", "na"), "na");
        assert_eq!(resolve_region("eu", "any"), "eu");
        assert_eq!(resolve_region("eu", "na"), "eu");
    }
}
