//! Combat events.
//!
//! Mirrors the ordering discipline of the teacher's event log: events sort
//! by tick, then by a declared tag priority, then by shooter id, so two
//! sessions fed identical input streams produce byte-identical event logs.

use serde::{Deserialize, Serialize};

/// Combat event tag. `Death` sorts before `Hit` at equal tick so that a
/// death and a trailing hit from the same tick never interleave
/// ambiguously in the combat log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CombatEventTag {
    Death = 0,
    Hit = 1,
}

/// A single combat occurrence: a projectile hit, or a player's death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub tick: u32,
    pub tag: CombatEventTag,
    pub shooter_id: String,
    pub target_id: String,
    pub projectile_id: Option<u64>,
    pub damage: u32,
}

impl CombatEvent {
    pub fn hit(tick: u32, shooter_id: &str, target_id: &str, projectile_id: u64, damage: u32) -> Self {
        Self {
            tick,
            tag: CombatEventTag::Hit,
            shooter_id: shooter_id.to_string(),
            target_id: target_id.to_string(),
            projectile_id: Some(projectile_id),
            damage,
        }
    }

    pub fn death(tick: u32, shooter_id: &str, target_id: &str) -> Self {
        Self {
            tick,
            tag: CombatEventTag::Death,
            shooter_id: shooter_id.to_string(),
            target_id: target_id.to_string(),
            projectile_id: None,
            damage: 0,
        }
    }
}

impl PartialOrd for CombatEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for CombatEvent {}

impl Ord for CombatEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.tick, self.tag, &self.shooter_id, &self.target_id).cmp(&(
            other.tick,
            other.tag,
            &other.shooter_id,
            &other.target_id,
        ))
    }
}
