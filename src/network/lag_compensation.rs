//! Lag Compensation — authoritative hit validation rewound to the
//! shooter's observed world.
//!
//! Owns its own history deque, distinct from the [`crate::network::snapshot::SnapshotManager`]'s
//! ring buffer by purpose: one supports broadcast/delta, this one supports
//! rewinding for hit validation. The component never mutates the live
//! session state — every rejection returns a reason string, never an
//! exception.

use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};

use crate::core::vec2::Vec2;
use crate::game::collision::ray_circle_intersect;
use crate::network::snapshot::{PlayerSnapshot, ProjectileSnapshot, WorldSnapshot};

/// Bound on the lag-compensation history deque (~2s at 60 ticks/sec).
pub const HISTORY_SIZE: usize = 128;
/// Maximum allowable rewind, in milliseconds.
pub const MAX_REWIND_MS: u64 = 200;
/// Damage applied by an accepted lag-compensated hit.
pub const DEFAULT_HIT_DAMAGE: u32 = 20;

/// A client's claim that it hit something, to be validated against
/// rewound history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HitRequest<'a> {
    pub shooter_id: &'a str,
    pub client_timestamp_ms: u64,
    pub origin: Vec2,
    pub direction: Vec2,
}

/// Outcome of [`LagCompensation::validate_hit_with_compensation`].
#[derive(Debug, Clone, PartialEq)]
pub enum HitResult {
    Accepted {
        target_id: String,
        hit_point: Vec2,
        damage: u32,
    },
    Rejected {
        reason: String,
    },
}

#[derive(Debug, Default, Clone, Copy)]
struct Metrics {
    hits_validated: u64,
    hits_accepted: u64,
    hits_rejected: u64,
    rewind_ms_sum: u64,
    rewind_ms_count: u64,
}

impl Metrics {
    fn average_rewind_ms(&self) -> f64 {
        if self.rewind_ms_count == 0 {
            0.0
        } else {
            self.rewind_ms_sum as f64 / self.rewind_ms_count as f64
        }
    }
}

/// Authoritative hit validator. Append-only under its own lock; reads
/// during validation see a consistent slice of history.
pub struct LagCompensation {
    history: Mutex<VecDeque<WorldSnapshot>>,
    metrics: RwLock<Metrics>,
}

impl LagCompensation {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(VecDeque::with_capacity(HISTORY_SIZE)),
            metrics: RwLock::new(Metrics::default()),
        }
    }

    /// Append a world state snapshot, evicting the oldest on overflow.
    pub fn save_world_state(&self, state: WorldSnapshot) {
        let mut history = self.history.lock().unwrap();
        if history.len() >= HISTORY_SIZE {
            history.pop_front();
        }
        history.push_back(state);
    }

    /// Interpolated world state at `timestamp_ms`; `None` only when the
    /// history is empty. Clamps to the oldest/newest state outside the
    /// stored range, and uses the same before/after player-roster rule as
    /// [`crate::network::snapshot::SnapshotManager::get_snapshot_at`].
    pub fn get_world_state_at(&self, timestamp_ms: u64) -> Option<WorldSnapshot> {
        let history = self.history.lock().unwrap();
        crate::network::snapshot::interpolate_buffer(&history, timestamp_ms)
    }

    /// Bias a rewind point by half the client's observed round-trip time.
    /// Not wired into `validate_hit_with_compensation` by default — an
    /// auxiliary helper for callers that want RTT-aware rewind rather than
    /// the raw client timestamp.
    pub fn calculate_rewind_time(client_timestamp_ms: u64, client_rtt_ms: u64) -> u64 {
        client_timestamp_ms.saturating_sub(client_rtt_ms / 2)
    }

    /// Validate a shot claim against rewound history.
    ///
    /// Rejection reasons are returned verbatim as specified:
    /// `"Client timestamp in future"`, `"Rewind exceeds maximum"`,
    /// `"No historical state available"`, `"No hit detected"`.
    pub fn validate_hit_with_compensation(
        &self,
        request: HitRequest<'_>,
        server_time_ms: u64,
    ) -> HitResult {
        let mut metrics = self.metrics.write().unwrap();
        metrics.hits_validated += 1;

        if server_time_ms < request.client_timestamp_ms {
            metrics.hits_rejected += 1;
            return HitResult::Rejected {
                reason: "Client timestamp in future".to_string(),
            };
        }

        let rewind_ms = server_time_ms - request.client_timestamp_ms;
        if rewind_ms > MAX_REWIND_MS {
            metrics.hits_rejected += 1;
            return HitResult::Rejected {
                reason: "Rewind exceeds maximum".to_string(),
            };
        }

        let Some(state) = self.get_world_state_at(request.client_timestamp_ms) else {
            metrics.hits_rejected += 1;
            return HitResult::Rejected {
                reason: "No historical state available".to_string(),
            };
        };

        metrics.rewind_ms_sum += rewind_ms;
        metrics.rewind_ms_count += 1;

        let mut best: Option<(f32, &PlayerSnapshot)> = None;
        for player in &state.players {
            if player.id == request.shooter_id || !player.alive {
                continue;
            }
            let center = Vec2::new(player.x, player.y);
            if let Some(t) = ray_circle_intersect(
                request.origin,
                request.direction,
                center,
                crate::game::state::PLAYER_RADIUS,
            ) {
                if best.map_or(true, |(best_t, _)| t < best_t) {
                    best = Some((t, player));
                }
            }
        }

        match best {
            Some((t, player)) => {
                metrics.hits_accepted += 1;
                HitResult::Accepted {
                    target_id: player.id.clone(),
                    hit_point: request.origin + request.direction.scale(t),
                    damage: DEFAULT_HIT_DAMAGE,
                }
            }
            None => {
                metrics.hits_rejected += 1;
                HitResult::Rejected {
                    reason: "No hit detected".to_string(),
                }
            }
        }
    }

    pub fn hits_validated(&self) -> u64 {
        self.metrics.read().unwrap().hits_validated
    }

    pub fn hits_accepted(&self) -> u64 {
        self.metrics.read().unwrap().hits_accepted
    }

    pub fn hits_rejected(&self) -> u64 {
        self.metrics.read().unwrap().hits_rejected
    }

    pub fn average_rewind_ms(&self) -> f64 {
        self.metrics.read().unwrap().average_rewind_ms()
    }
}

impl Default for LagCompensation {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a single-player world state snapshot for tests and lightweight
/// callers that don't route through [`crate::game::session::GameSession`].
pub fn world_state_with_player(
    sequence: u64,
    timestamp_ms: u64,
    id: &str,
    x: f32,
    y: f32,
) -> WorldSnapshot {
    WorldSnapshot {
        sequence,
        timestamp_ms,
        players: vec![PlayerSnapshot {
            id: id.to_string(),
            x,
            y,
            facing_radians: 0.0,
            health: crate::game::state::MAX_HEALTH,
            alive: true,
            last_input_sequence: 0,
        }],
        projectiles: Vec::<ProjectileSnapshot>::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_future_client_timestamp() {
        let comp = LagCompensation::new();
        comp.save_world_state(world_state_with_player(1, 0, "V", 0.0, 0.0));

        let result = comp.validate_hit_with_compensation(
            HitRequest {
                shooter_id: "S",
                client_timestamp_ms: 500,
                origin: Vec2::new(-5.0, 0.0),
                direction: Vec2::new(1.0, 0.0),
            },
            100,
        );

        assert_eq!(
            result,
            HitResult::Rejected {
                reason: "Client timestamp in future".to_string()
            }
        );
    }

    #[test]
    fn rejects_excessive_rewind() {
        let comp = LagCompensation::new();
        comp.save_world_state(world_state_with_player(1, 0, "V", 0.0, 0.0));

        let result = comp.validate_hit_with_compensation(
            HitRequest {
                shooter_id: "S",
                client_timestamp_ms: 0,
                origin: Vec2::new(-5.0, 0.0),
                direction: Vec2::new(1.0, 0.0),
            },
            600,
        );

        assert_eq!(
            result,
            HitResult::Rejected {
                reason: "Rewind exceeds maximum".to_string()
            }
        );
    }

    #[test]
    fn rejects_when_history_empty() {
        let comp = LagCompensation::new();
        let result = comp.validate_hit_with_compensation(
            HitRequest {
                shooter_id: "S",
                client_timestamp_ms: 0,
                origin: Vec2::ZERO,
                direction: Vec2::new(1.0, 0.0),
            },
            10,
        );
        assert_eq!(
            result,
            HitResult::Rejected {
                reason: "No historical state available".to_string()
            }
        );
    }

    #[test]
    fn accepts_interpolated_rewind_hit() {
        let comp = LagCompensation::new();
        for (seq, ms) in [(1u64, 0u64), (2, 100), (3, 200), (4, 300)] {
            let t = ms as f32 / 1000.0;
            comp.save_world_state(world_state_with_player(seq, ms, "V", t, 0.0));
        }

        let result = comp.validate_hit_with_compensation(
            HitRequest {
                shooter_id: "S",
                client_timestamp_ms: 150,
                origin: Vec2::new(-5.0, 0.15),
                direction: Vec2::new(1.0, 0.0),
            },
            300,
        );

        match result {
            HitResult::Accepted { target_id, .. } => assert_eq!(target_id, "V"),
            HitResult::Rejected { reason } => panic!("expected accept, got {reason}"),
        }
    }

    #[test]
    fn never_hits_the_shooter() {
        let comp = LagCompensation::new();
        comp.save_world_state(world_state_with_player(1, 0, "S", 0.0, 0.0));

        let result = comp.validate_hit_with_compensation(
            HitRequest {
                shooter_id: "S",
                client_timestamp_ms: 0,
                origin: Vec2::new(-5.0, 0.0),
                direction: Vec2::new(1.0, 0.0),
            },
            0,
        );

        assert_eq!(
            result,
            HitResult::Rejected {
                reason: "No hit detected".to_string()
            }
        );
    }

    #[test]
    fn rewind_bound_boundary_is_inclusive() {
        let comp = LagCompensation::new();
        comp.save_world_state(world_state_with_player(1, 0, "V", 0.0, 0.0));
        let result = comp.validate_hit_with_compensation(
            HitRequest {
                shooter_id: "S",
                client_timestamp_ms: 0,
                origin: Vec2::new(-5.0, 0.0),
                direction: Vec2::new(1.0, 0.0),
            },
            MAX_REWIND_MS,
        );
        assert!(!matches!(
            result,
            HitResult::Rejected { reason } if reason == "Rewind exceeds maximum"
        ));
    }
}
