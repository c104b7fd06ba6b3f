//! The matchmaker's own queue. Owns its contents exclusively; matches are
//! transferred out through the notification channel, not shared
//! references.

use std::sync::Mutex;

use crate::matchmaking::types::{MatchRequest, QueuedPlayer};

struct QueueState {
    players: Vec<QueuedPlayer>,
    next_order: u64,
}

pub struct MatchQueue {
    state: Mutex<QueueState>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                players: Vec::new(),
                next_order: 0,
            }),
        }
    }

    /// Assign the next monotonic insertion order and enqueue.
    pub fn enqueue(&self, request: MatchRequest) -> u64 {
        let mut state = self.state.lock().unwrap();
        let order = state.next_order;
        state.next_order += 1;
        state.players.push(QueuedPlayer { request, order });
        order
    }

    /// Remove a player if present. No-op if they already left or matched.
    pub fn cancel(&self, player_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.players.retain(|p| p.request.player_id != player_id);
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of currently queued players, ordered by rating ascending,
    /// ties broken by insertion order.
    pub fn ordered_players(&self) -> Vec<QueuedPlayer> {
        let mut players = self.state.lock().unwrap().players.clone();
        players.sort_by(|a, b| {
            a.request
                .rating
                .cmp(&b.request.rating)
                .then_with(|| a.order.cmp(&b.order))
        });
        players
    }

    /// Remove every listed player id from the queue, used after a
    /// matching pass pairs them off.
    pub fn remove_all(&self, player_ids: &[String]) {
        let mut state = self.state.lock().unwrap();
        state.players.retain(|p| !player_ids.contains(&p.request.player_id));
    }
}

impl Default for MatchQueue {
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
    fn orders_by_rating_then_insertion() {
        let q = MatchQueue::new();
        q.enqueue(request("b", 1300, 0.0));
        q.enqueue(request("a", 1300, 0.0));
        q.enqueue(request("c", 1100, 0.0));

        let ordered = q.ordered_players();
        assert_eq!(ordered[0].request.player_id, "c");
        assert_eq!(ordered[1].request.player_id, "b");
        assert_eq!(ordered[2].request.player_id, "a");
    }

    #[test]
    fn cancel_removes_player() {
        let q = MatchQueue::new();
        q.enqueue(request("a", 1200, 0.0));
        q.cancel("a");
        assert!(q.is_empty());
    }
}
