//! Shared primitives used across the simulation and network layers.
//!
//! Nothing here owns game rules; it is the small set of math, time, and
//! error types every other module builds on.

pub mod error;
pub mod hash;
pub mod time;
pub mod vec2;

pub use error::CoreError;
pub use hash::{StateHash, StateHasher};
pub use time::{SessionClock, SessionTimeMs};
pub use vec2::Vec2;
