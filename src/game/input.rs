//! Player input commands.
//!
//! Wire-transport framing for this payload is out of scope; the core only
//! requires these semantic fields, whatever bytes carry them in.

use serde::{Deserialize, Serialize};

use crate::core::vec2::Vec2;

/// One player's input for a simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputCommand {
    /// Monotonic per-player sequence number. Inputs with `sequence <=
    /// last_sequence` are dropped by `apply_input`.
    pub sequence: u32,
    /// Client-observed timestamp in milliseconds, used by lag compensation.
    pub client_timestamp: u64,
    /// Horizontal movement axis, expected in `[-1, 1]`.
    pub move_x: f32,
    /// Vertical movement axis, expected in `[-1, 1]`.
    pub move_y: f32,
    /// Aim direction in radians.
    pub aim_radians: f32,
    /// Whether the player is attempting to fire this step.
    pub fire: bool,
}

impl InputCommand {
    /// Movement axes as a vector. Not normalized — a diagonal input of
    /// `(1, 1)` is the caller's responsibility to clamp if desired; the
    /// session does not renormalize movement input.
    pub fn movement(&self) -> Vec2 {
        Vec2::new(self.move_x, self.move_y)
    }

    /// Unit facing vector derived from `aim_radians`.
    pub fn aim_direction(&self) -> Vec2 {
        Vec2::new(self.aim_radians.cos(), self.aim_radians.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aim_direction_is_unit_length() {
        let input = InputCommand {
            sequence: 1,
            client_timestamp: 0,
            move_x: 0.0,
            move_y: 0.0,
            aim_radians: 0.73,
            fire: false,
        };
        let d = input.aim_direction();
        assert!((d.length() - 1.0).abs() < 1e-6);
    }
}
