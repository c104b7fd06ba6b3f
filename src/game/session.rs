//! Game Session — authoritative world simulation.
//!
//! Owns every player and projectile for one match. All mutation goes
//! through a single mutex so `apply_input` and `tick` totally order
//! against each other, matching the "single critical section per public
//! operation" design note instead of the teacher's multiple overlapping
//! locks.

use std::collections::{BTreeMap, VecDeque};
use std::f32::consts::TAU;
use std::sync::Mutex;

use thiserror::Error;
use tracing::warn;

use crate::core::vec2::Vec2;
use crate::game::collision::circles_overlap;
use crate::game::events::CombatEvent;
use crate::game::input::InputCommand;
use crate::game::state::{
    PlayerState, Projectile, DEFAULT_DAMAGE, FIRE_COOLDOWN_SECS, MOVE_SPEED, PLAYER_RADIUS,
    PROJECTILE_RADIUS,
};

/// Default bound on the combat log ring buffer.
pub const COMBAT_LOG_CAPACITY: usize = 32;

/// Radius of the deterministic spawn ring new players are placed on.
const SPAWN_RING_RADIUS: f32 = 8.0;
/// Spawn slots spaced evenly around the ring.
const SPAWN_SLOTS: u32 = 8;

/// Errors from session operations. Per the error-handling design, these
/// are informational only — the session never panics on bad input, it
/// drops the mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown player id: {0}")]
    UnknownPlayer(String),
}

/// Deterministic spawn position for the `index`-th player to join.
fn deterministic_spawn(index: u32) -> Vec2 {
    let angle = (index % SPAWN_SLOTS) as f32 * (TAU / SPAWN_SLOTS as f32);
    Vec2::new(SPAWN_RING_RADIUS * angle.cos(), SPAWN_RING_RADIUS * angle.sin())
}

struct SessionState {
    players: BTreeMap<String, PlayerState>,
    projectiles: Vec<Projectile>,
    next_projectile_id: u64,
    spawned_count: u32,
    combat_log: VecDeque<CombatEvent>,
    death_queue: Vec<CombatEvent>,
    session_time_secs: f32,
}

impl SessionState {
    fn new() -> Self {
        Self {
            players: BTreeMap::new(),
            projectiles: Vec::new(),
            next_projectile_id: 0,
            spawned_count: 0,
            combat_log: VecDeque::with_capacity(COMBAT_LOG_CAPACITY),
            death_queue: Vec::new(),
            session_time_secs: 0.0,
        }
    }

    fn push_combat_event(&mut self, event: CombatEvent) {
        if event.tag == crate::game::events::CombatEventTag::Death {
            self.death_queue.push(event.clone());
        }
        if self.combat_log.len() >= COMBAT_LOG_CAPACITY {
            self.combat_log.pop_front();
        }
        self.combat_log.push_back(event);
    }
}

/// The authoritative world for one match.
pub struct GameSession {
    state: Mutex<SessionState>,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::new()),
        }
    }

    /// Create or retain a player at full health. Idempotent: calling this
    /// again for an existing id does not reset their state or position.
    pub fn upsert_player(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        if state.players.contains_key(id) {
            return;
        }
        let spawn = deterministic_spawn(state.spawned_count);
        state.spawned_count += 1;
        state.players.insert(id.to_string(), PlayerState::new(id, spawn));
    }

    /// Remove a player. Combat events already recorded that reference this
    /// id remain valid.
    pub fn remove_player(&self, id: &str) {
        let mut state = self.state.lock().unwrap();
        state.players.remove(id);
    }

    /// Apply one input for `id`. Silently drops the input if the player is
    /// unknown or the sequence is stale — this is an expected, not
    /// exceptional, path per the error-handling design.
    pub fn apply_input(&self, id: &str, input: InputCommand, dt_secs: f32) {
        let mut state = self.state.lock().unwrap();

        let accepted_sequence = match state.players.get(id) {
            Some(p) => input.sequence > p.last_sequence,
            None => {
                warn!(player = id, "apply_input for unknown player, dropped");
                return;
            }
        };
        if !accepted_sequence {
            return;
        }

        state.session_time_secs += dt_secs;
        let now = state.session_time_secs;

        let owner_position;
        let owner_facing;
        let fire_requested;
        let mut spawn_projectile = false;
        {
            let player = state.players.get_mut(id).unwrap();
            player.position = player.position + input.movement().scale(MOVE_SPEED * dt_secs);
            player.facing_radians = input.aim_radians;
            player.last_sequence = input.sequence;

            fire_requested = input.fire && player.alive;
            if fire_requested {
                let cooldown_ok = player
                    .last_fire_secs
                    .map_or(true, |last| now - last >= FIRE_COOLDOWN_SECS);
                if cooldown_ok {
                    player.shots_fired += 1;
                    player.last_fire_secs = Some(now);
                    spawn_projectile = true;
                }
            }
            owner_position = player.position;
            owner_facing = player.facing_radians;
        }

        if spawn_projectile {
            let direction = Vec2::new(owner_facing.cos(), owner_facing.sin());
            if let Some(projectile) =
                Projectile::new(state.next_projectile_id, id, owner_position, direction, now)
            {
                state.next_projectile_id += 1;
                state.projectiles.push(projectile);
            }
        }
    }

    /// Advance the simulation by one tick: move projectiles, resolve
    /// collisions, expire stale projectiles. Returns the combat events
    /// produced this tick, in order.
    pub fn tick(&self, tick_index: u32, dt_secs: f32) -> Vec<CombatEvent> {
        let mut state = self.state.lock().unwrap();
        state.session_time_secs += dt_secs;
        let now = state.session_time_secs;

        for projectile in state.projectiles.iter_mut() {
            projectile.advance(dt_secs);
            if projectile.is_expired(now) {
                projectile.active = false;
            }
        }

        let mut produced = Vec::new();
        let player_ids: Vec<String> = state.players.keys().cloned().collect();

        for idx in 0..state.projectiles.len() {
            if !state.projectiles[idx].active {
                continue;
            }
            let (owner_id, position) = {
                let p = &state.projectiles[idx];
                (p.owner_id.clone(), p.position)
            };

            let mut hit_target: Option<String> = None;
            for pid in &player_ids {
                if *pid == owner_id {
                    continue;
                }
                let Some(target) = state.players.get(pid) else {
                    continue;
                };
                if !target.alive {
                    continue;
                }
                if circles_overlap(position, PROJECTILE_RADIUS, target.position, PLAYER_RADIUS) {
                    hit_target = Some(pid.clone());
                    break;
                }
            }

            if let Some(target_id) = hit_target {
                state.projectiles[idx].active = false;

                let hit_event = CombatEvent::hit(
                    tick_index,
                    &owner_id,
                    &target_id,
                    state.projectiles[idx].id,
                    DEFAULT_DAMAGE,
                );
                let fatal = state
                    .players
                    .get_mut(&target_id)
                    .map(|t| t.apply_damage(DEFAULT_DAMAGE))
                    .unwrap_or(false);

                if let Some(shooter) = state.players.get_mut(&owner_id) {
                    shooter.hits_landed += 1;
                }

                state.push_combat_event(hit_event.clone());
                produced.push(hit_event);

                if fatal {
                    if let Some(target) = state.players.get_mut(&target_id) {
                        target.deaths += 1;
                    }
                    let death_event = CombatEvent::death(tick_index, &owner_id, &target_id);
                    state.push_combat_event(death_event.clone());
                    produced.push(death_event);
                }
            }
        }

        state.projectiles.retain(|p| p.active);
        produced
    }

    /// Immutable copies of all current player states, ordered by id.
    pub fn snapshot(&self) -> Vec<PlayerState> {
        let state = self.state.lock().unwrap();
        state.players.values().cloned().collect()
    }

    /// Drain and return all `Death` events recorded since the last call.
    pub fn consume_death_events(&self) -> Vec<CombatEvent> {
        let mut state = self.state.lock().unwrap();
        std::mem::take(&mut state.death_queue)
    }

    /// Copy of the bounded combat log ring buffer.
    pub fn combat_log_snapshot(&self) -> Vec<CombatEvent> {
        let state = self.state.lock().unwrap();
        state.combat_log.iter().cloned().collect()
    }

    pub fn active_projectile_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.projectiles.iter().filter(|p| p.active).count()
    }

    /// Immutable copies of all currently active projectiles.
    pub fn projectiles_snapshot(&self) -> Vec<Projectile> {
        let state = self.state.lock().unwrap();
        state.projectiles.iter().filter(|p| p.active).cloned().collect()
    }

    /// Current session-time clock, in seconds since this session started.
    pub fn session_time_secs(&self) -> f32 {
        self.state.lock().unwrap().session_time_secs
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
