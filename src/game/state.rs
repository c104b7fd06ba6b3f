//! Player and projectile state.

use serde::{Deserialize, Serialize};

use crate::core::vec2::Vec2;

/// Player collision radius, in meters.
pub const PLAYER_RADIUS: f32 = 0.5;
/// Projectile collision radius, in meters.
pub const PROJECTILE_RADIUS: f32 = 0.2;
/// Player movement speed, in meters/second.
pub const MOVE_SPEED: f32 = 5.0;
/// Projectile travel speed, in meters/second.
pub const PROJECTILE_SPEED: f32 = 30.0;
/// Projectile lifetime, in seconds.
pub const PROJECTILE_LIFETIME_SECS: f32 = 1.5;
/// Minimum interval between accepted fire inputs, in seconds.
pub const FIRE_COOLDOWN_SECS: f32 = 0.1;
/// Damage dealt by a single projectile hit.
pub const DEFAULT_DAMAGE: u32 = 20;
/// Starting and maximum health.
pub const MAX_HEALTH: u32 = 100;

/// A player inside a [`crate::game::session::GameSession`].
///
/// Invariants: `health <= MAX_HEALTH`; `alive == (health > 0)`;
/// `last_sequence` is non-decreasing; all counters are monotonically
/// non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: String,
    pub position: Vec2,
    pub facing_radians: f32,
    pub health: u32,
    pub alive: bool,
    pub last_sequence: u32,
    pub shots_fired: u32,
    pub hits_landed: u32,
    pub deaths: u32,
    /// Session time (seconds) of the last accepted fire input, for
    /// cooldown enforcement. `None` before the player's first shot.
    pub last_fire_secs: Option<f32>,
}

impl PlayerState {
    pub fn new(id: impl Into<String>, spawn: Vec2) -> Self {
        Self {
            id: id.into(),
            position: spawn,
            facing_radians: 0.0,
            health: MAX_HEALTH,
            alive: true,
            last_sequence: 0,
            shots_fired: 0,
            hits_landed: 0,
            deaths: 0,
            last_fire_secs: None,
        }
    }

    /// Accuracy as `hits_landed / shots_fired`, or `0.0` with no shots.
    pub fn accuracy(&self) -> f64 {
        if self.shots_fired == 0 {
            return 0.0;
        }
        self.hits_landed as f64 / self.shots_fired as f64
    }

    /// Apply damage, clamping at zero. Returns `true` if this damage
    /// brought the player from alive to dead.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        if amount == 0 || !self.alive {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.alive = false;
            return true;
        }
        false
    }
}

/// A projectile owned by a firing player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u64,
    pub owner_id: String,
    pub position: Vec2,
    pub direction: Vec2,
    /// Session time (seconds) when this projectile was created.
    pub spawn_time_secs: f32,
    pub active: bool,
}

impl Projectile {
    /// Construct a projectile with a normalized direction. Returns `None`
    /// if `direction`'s magnitude is below the normalization epsilon,
    /// matching the rejection rule for malformed directions.
    pub fn new(
        id: u64,
        owner_id: impl Into<String>,
        position: Vec2,
        direction: Vec2,
        spawn_time_secs: f32,
    ) -> Option<Self> {
        let direction = direction.normalized()?;
        Some(Self {
            id,
            owner_id: owner_id.into(),
            position,
            direction,
            spawn_time_secs,
            active: true,
        })
    }

    pub fn advance(&mut self, dt_secs: f32) {
        if !self.active {
            return;
        }
        self.position = self.position + self.direction.scale(PROJECTILE_SPEED * dt_secs);
    }

    pub fn is_expired(&self, now_secs: f32) -> bool {
        if !self.active {
            return true;
        }
        now_secs - self.spawn_time_secs >= PROJECTILE_LIFETIME_SECS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_clamps_at_zero_and_flips_alive() {
        let mut p = PlayerState::new("a", Vec2::ZERO);
        assert!(!p.apply_damage(90));
        assert_eq!(p.health, 10);
        assert!(p.alive);

        assert!(p.apply_damage(50));
        assert_eq!(p.health, 0);
        assert!(!p.alive);
    }

    #[test]
    fn damage_ignored_once_dead() {
        let mut p = PlayerState::new("a", Vec2::ZERO);
        p.apply_damage(MAX_HEALTH);
        assert!(!p.apply_damage(10));
        assert_eq!(p.health, 0);
    }

    #[test]
    fn projectile_rejects_zero_direction() {
        assert!(Projectile::new(1, "a", Vec2::ZERO, Vec2::ZERO, 0.0).is_none());
    }

    #[test]
    fn projectile_expires_after_lifetime() {
        let mut proj = Projectile::new(1, "a", Vec2::ZERO, Vec2::new(1.0, 0.0), 0.0).unwrap();
        assert!(!proj.is_expired(1.0));
        assert!(proj.is_expired(1.5));
        proj.active = false;
        assert!(proj.is_expired(0.0));
    }
}
