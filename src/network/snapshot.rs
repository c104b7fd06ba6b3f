//! Snapshot Manager — broadcast-side state history and delta encoding.
//!
//! Owns a bounded ring buffer of numbered [`WorldSnapshot`]s. All mutation
//! serializes on the manager's own lock; readers never observe a
//! half-built snapshot because `save_snapshot` always inserts a complete,
//! already-constructed value.

use std::collections::VecDeque;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::network::wire::player_bits;

/// Ring buffer capacity — roughly one second of history at 60 ticks/sec.
pub const DEFAULT_SNAPSHOT_CAPACITY: usize = 64;

/// Comparison epsilon for position/angle fields in delta and equality
/// checks. Health and alive are compared exactly.
pub const FIELD_EPSILON: f32 = 1e-3;

/// A player's serializable fields inside a [`WorldSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub facing_radians: f32,
    pub health: u32,
    pub alive: bool,
    /// The highest input sequence the server has applied for this player —
    /// the field the client predictor reconciles against.
    pub last_input_sequence: u32,
}

/// A projectile's serializable fields inside a [`WorldSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub id: u64,
    pub owner_id: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// A versioned, immutable copy of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub players: Vec<PlayerSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
}

/// One player's changed fields relative to a base snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerChange {
    pub id: String,
    pub bitmap: u8,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub facing_radians: Option<f32>,
    pub health: Option<u32>,
    pub alive: Option<bool>,
}

/// A minimal, base-relative encoding of the change from one snapshot to
/// another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub base_sequence: u64,
    pub target_sequence: u64,
    pub changes: Vec<PlayerChange>,
}

struct ManagerState {
    buffer: VecDeque<WorldSnapshot>,
    capacity: usize,
    next_sequence: u64,
}

/// Owns the broadcast snapshot ring buffer and produces deltas between
/// stored snapshots.
pub struct SnapshotManager {
    state: RwLock<ManagerState>,
}

impl SnapshotManager {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SNAPSHOT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: RwLock::new(ManagerState {
                buffer: VecDeque::with_capacity(capacity),
                capacity,
                next_sequence: 1,
            }),
        }
    }

    /// Allocate the next sequence number and stamp a new snapshot from
    /// owned copies of the given players/projectiles. Does not store it —
    /// call [`Self::save_snapshot`] to do that.
    pub fn create_snapshot(
        &self,
        timestamp_ms: u64,
        players: Vec<PlayerSnapshot>,
        projectiles: Vec<ProjectileSnapshot>,
    ) -> WorldSnapshot {
        let mut state = self.state.write().unwrap();
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        WorldSnapshot {
            sequence,
            timestamp_ms,
            players,
            projectiles,
        }
    }

    /// Append to the ring buffer, evicting the oldest snapshot if full.
    pub fn save_snapshot(&self, snapshot: WorldSnapshot) {
        let mut state = self.state.write().unwrap();
        if state.buffer.len() >= state.capacity {
            state.buffer.pop_front();
        }
        state.buffer.push_back(snapshot);
    }

    pub fn get_snapshot(&self, sequence: u64) -> Option<WorldSnapshot> {
        let state = self.state.read().unwrap();
        state.buffer.iter().find(|s| s.sequence == sequence).cloned()
    }

    pub fn get_latest_snapshot(&self) -> Option<WorldSnapshot> {
        let state = self.state.read().unwrap();
        state.buffer.back().cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().unwrap().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interpolated snapshot at `timestamp_ms`, clamped to the oldest or
    /// newest stored snapshot when the request falls outside the stored
    /// range. `None` only when the buffer is empty.
    pub fn get_snapshot_at(&self, timestamp_ms: u64) -> Option<WorldSnapshot> {
        let state = self.state.read().unwrap();
        interpolate_buffer(&state.buffer, timestamp_ms)
    }

    /// Compare `target` against `base` by player id and emit a delta:
    /// players new to `target` carry every field; players present in both
    /// carry only the fields that differ beyond [`FIELD_EPSILON`] (exact
    /// comparison for health/alive). Players present only in `base` are
    /// not represented — a delta only ever grows or changes the world, it
    /// never encodes removal.
    pub fn calculate_delta(&self, base_sequence: u64, target_sequence: u64) -> Option<Delta> {
        let base = self.get_snapshot(base_sequence)?;
        let target = self.get_snapshot(target_sequence)?;
        Some(diff_snapshots(&base, &target))
    }

    /// Reconstruct the target snapshot for every field the delta marks
    /// changed; unmarked fields inherit from `base`.
    pub fn apply_delta(&self, base: &WorldSnapshot, delta: &Delta) -> WorldSnapshot {
        apply_delta_to(base, delta)
    }
}

impl Default for SnapshotManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldSnapshot {
    /// Binary wire encoding for transports that want it, matching the
    /// teacher's `to_bytes`/`from_bytes` convention on its protocol types.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

/// Shared by [`SnapshotManager::get_snapshot_at`] and lag compensation's
/// history lookup: clamp out-of-range requests to the nearest stored
/// snapshot, otherwise linearly interpolate between the bracketing pair.
pub(crate) fn interpolate_buffer(
    buffer: &VecDeque<WorldSnapshot>,
    timestamp_ms: u64,
) -> Option<WorldSnapshot> {
    if buffer.is_empty() {
        return None;
    }
    let first = buffer.front().unwrap();
    let last = buffer.back().unwrap();

    if timestamp_ms <= first.timestamp_ms {
        return Some(first.clone());
    }
    if timestamp_ms >= last.timestamp_ms {
        return Some(last.clone());
    }

    for window in buffer.iter().collect::<Vec<_>>().windows(2) {
        let (before, after) = (window[0], window[1]);
        if before.timestamp_ms <= timestamp_ms && timestamp_ms <= after.timestamp_ms {
            return Some(interpolate_snapshot(before, after, timestamp_ms));
        }
    }

    Some(last.clone())
}

/// Interpolate between `before` and `after` at `timestamp_ms`.
///
/// Players present in `after` but absent from `before` (a mid-rewind
/// join) are passed through unchanged from `after`. Players present only
/// in `before` (a mid-rewind leave) are dropped from the result — this
/// crate selects the "after" state's player roster as authoritative,
/// documented as a deliberate choice in `DESIGN.md` rather than an
/// inherited ambiguity.
fn interpolate_snapshot(before: &WorldSnapshot, after: &WorldSnapshot, timestamp_ms: u64) -> WorldSnapshot {
    let span = after.timestamp_ms.saturating_sub(before.timestamp_ms);
    let t = if span == 0 {
        1.0
    } else {
        (timestamp_ms - before.timestamp_ms) as f32 / span as f32
    };

    let players = after
        .players
        .iter()
        .map(|after_p| match before.players.iter().find(|p| p.id == after_p.id) {
            Some(before_p) => PlayerSnapshot {
                id: after_p.id.clone(),
                x: crate::core::vec2::lerp_f32(before_p.x, after_p.x, t),
                y: crate::core::vec2::lerp_f32(before_p.y, after_p.y, t),
                facing_radians: crate::core::vec2::lerp_f32(before_p.facing_radians, after_p.facing_radians, t),
                health: after_p.health,
                alive: after_p.alive,
                last_input_sequence: after_p.last_input_sequence,
            },
            None => after_p.clone(),
        })
        .collect();

    let projectiles = after
        .projectiles
        .iter()
        .map(|after_p| match before.projectiles.iter().find(|p| p.id == after_p.id) {
            Some(before_p) => ProjectileSnapshot {
                id: after_p.id,
                owner_id: after_p.owner_id.clone(),
                x: crate::core::vec2::lerp_f32(before_p.x, after_p.x, t),
                y: crate::core::vec2::lerp_f32(before_p.y, after_p.y, t),
                vx: after_p.vx,
                vy: after_p.vy,
            },
            None => after_p.clone(),
        })
        .collect();

    WorldSnapshot {
        sequence: after.sequence,
        timestamp_ms,
        players,
        projectiles,
    }
}

fn diff_snapshots(base: &WorldSnapshot, target: &WorldSnapshot) -> Delta {
    let mut changes = Vec::new();

    for player in &target.players {
        match base.players.iter().find(|p| p.id == player.id) {
            None => changes.push(PlayerChange {
                id: player.id.clone(),
                bitmap: player_bits::NEW_PLAYER,
                x: Some(player.x),
                y: Some(player.y),
                facing_radians: Some(player.facing_radians),
                health: Some(player.health),
                alive: Some(player.alive),
            }),
            Some(base_player) => {
                let mut bitmap = 0u8;
                let mut change = PlayerChange {
                    id: player.id.clone(),
                    bitmap: 0,
                    x: None,
                    y: None,
                    facing_radians: None,
                    health: None,
                    alive: None,
                };

                if (base_player.x - player.x).abs() > FIELD_EPSILON {
                    bitmap |= player_bits::X;
                    change.x = Some(player.x);
                }
                if (base_player.y - player.y).abs() > FIELD_EPSILON {
                    bitmap |= player_bits::Y;
                    change.y = Some(player.y);
                }
                if (base_player.facing_radians - player.facing_radians).abs() > FIELD_EPSILON {
                    bitmap |= player_bits::FACING;
                    change.facing_radians = Some(player.facing_radians);
                }
                if base_player.health != player.health {
                    bitmap |= player_bits::HEALTH;
                    change.health = Some(player.health);
                }
                if base_player.alive != player.alive {
                    bitmap |= player_bits::ALIVE;
                    change.alive = Some(player.alive);
                }

                if bitmap != 0 {
                    change.bitmap = bitmap;
                    changes.push(change);
                }
            }
        }
    }

    Delta {
        base_sequence: base.sequence,
        target_sequence: target.sequence,
        changes,
    }
}

fn apply_delta_to(base: &WorldSnapshot, delta: &Delta) -> WorldSnapshot {
    let mut players: Vec<PlayerSnapshot> = base.players.clone();

    for change in &delta.changes {
        if change.bitmap == player_bits::NEW_PLAYER {
            players.retain(|p| p.id != change.id);
            players.push(PlayerSnapshot {
                id: change.id.clone(),
                x: change.x.unwrap_or_default(),
                y: change.y.unwrap_or_default(),
                facing_radians: change.facing_radians.unwrap_or_default(),
                health: change.health.unwrap_or_default(),
                alive: change.alive.unwrap_or_default(),
                last_input_sequence: 0,
            });
            continue;
        }

        if let Some(player) = players.iter_mut().find(|p| p.id == change.id) {
            if change.bitmap & player_bits::X != 0 {
                player.x = change.x.unwrap();
            }
            if change.bitmap & player_bits::Y != 0 {
                player.y = change.y.unwrap();
            }
            if change.bitmap & player_bits::FACING != 0 {
                player.facing_radians = change.facing_radians.unwrap();
            }
            if change.bitmap & player_bits::HEALTH != 0 {
                player.health = change.health.unwrap();
            }
            if change.bitmap & player_bits::ALIVE != 0 {
                player.alive = change.alive.unwrap();
            }
        }
    }

    WorldSnapshot {
        sequence: delta.target_sequence,
        timestamp_ms: base.timestamp_ms,
        players,
        projectiles: base.projectiles.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, x: f32, health: u32, alive: bool) -> PlayerSnapshot {
        PlayerSnapshot {
            id: id.to_string(),
            x,
            y: 20.0,
            facing_radians: 0.0,
            health,
            alive,
            last_input_sequence: 0,
        }
    }

    #[test]
    fn sequence_strictly_increases() {
        let mgr = SnapshotManager::new();
        let first = mgr.create_snapshot(0, vec![], vec![]);
        let second = mgr.create_snapshot(1, vec![], vec![]);
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
    }

    #[test]
    fn buffer_is_bounded() {
        let mgr = SnapshotManager::with_capacity(4);
        for i in 0..10 {
            let s = mgr.create_snapshot(i, vec![], vec![]);
            mgr.save_snapshot(s);
        }
        assert_eq!(mgr.len(), 4);
        assert!(mgr.get_snapshot(1).is_none());
        assert!(mgr.get_latest_snapshot().unwrap().sequence == 10);
    }

    #[test]
    fn delta_round_trip() {
        let mgr = SnapshotManager::new();
        let a = mgr.create_snapshot(0, vec![player("P", 10.0, 100, true)], vec![]);
        mgr.save_snapshot(a.clone());
        let b = mgr.create_snapshot(10, vec![player("P", 15.0, 100, true)], vec![]);
        mgr.save_snapshot(b.clone());

        let delta = mgr.calculate_delta(a.sequence, b.sequence).unwrap();
        assert!(!delta.changes.is_empty());

        let rebuilt = mgr.apply_delta(&a, &delta);
        assert_eq!(rebuilt.players[0].x, 15.0);
        assert_eq!(rebuilt.players[0].y, 20.0);
        assert_eq!(rebuilt.players[0].health, 100);
        assert!(rebuilt.players[0].alive);
    }

    #[test]
    fn interpolation_clamps_out_of_range() {
        let mgr = SnapshotManager::new();
        let a = mgr.create_snapshot(0, vec![player("P", 0.0, 100, true)], vec![]);
        mgr.save_snapshot(a);
        let b = mgr.create_snapshot(100, vec![player("P", 10.0, 100, true)], vec![]);
        mgr.save_snapshot(b);

        let before = mgr.get_snapshot_at(0).unwrap();
        assert_eq!(before.players[0].x, 0.0);

        let after = mgr.get_snapshot_at(1000).unwrap();
        assert_eq!(after.players[0].x, 10.0);

        let mid = mgr.get_snapshot_at(50).unwrap();
        assert!((mid.players[0].x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn new_player_delta_carries_all_fields() {
        let mgr = SnapshotManager::new();
        let a = mgr.create_snapshot(0, vec![], vec![]);
        mgr.save_snapshot(a.clone());
        let b = mgr.create_snapshot(10, vec![player("Q", 1.0, 50, false)], vec![]);
        mgr.save_snapshot(b.clone());

        let delta = mgr.calculate_delta(a.sequence, b.sequence).unwrap();
        assert_eq!(delta.changes.len(), 1);
        assert_eq!(delta.changes[0].bitmap, player_bits::NEW_PLAYER);

        let rebuilt = mgr.apply_delta(&a, &delta);
        assert_eq!(rebuilt.players[0].id, "Q");
        assert_eq!(rebuilt.players[0].health, 50);
        assert!(!rebuilt.players[0].alive);
    }

    #[test]
    fn binary_encoding_round_trips() {
        let mgr = SnapshotManager::new();
        let snapshot = mgr.create_snapshot(42, vec![player("P", 3.0, 100, true)], vec![]);
        let bytes = snapshot.to_bytes().unwrap();
        let decoded = WorldSnapshot::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
