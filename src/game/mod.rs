//! Simulation: players, projectiles, combat, and the fixed-rate driver
//! that advances them.
//!
//! ## Module Structure
//!
//! - `input`: player input commands
//! - `state`: player and projectile state
//! - `collision`: disk-disk and ray-circle tests
//! - `events`: combat events, ordered for replay
//! - `session`: the authoritative game session
//! - `tick_driver`: fixed-rate tick scheduling

pub mod collision;
pub mod events;
pub mod input;
pub mod session;
pub mod state;
pub mod tick_driver;

pub use events::{CombatEvent, CombatEventTag};
pub use input::InputCommand;
pub use session::{GameSession, SessionError};
pub use state::{PlayerState, Projectile};
pub use tick_driver::{TickDriver, TickInfo};
