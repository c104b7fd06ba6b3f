//! Broadcast snapshots, lag-compensated hit validation, and the session
//! dispatcher that binds transport events to the authoritative
//! [`crate::game::session::GameSession`].
//!
//! - `wire`: opaque packet constants and the delta bitmap, documented but
//!   not attached to any concrete socket transport.
//! - `snapshot`: the broadcast-side state history and delta encoder.
//! - `lag_compensation`: server-side rewind for hit validation, distinct
//!   from the snapshot manager's buffer by purpose even though both use
//!   the same interpolation rule.
//! - `dispatcher`: wires `on_client_connect`/`on_client_input`/`on_tick`
//!   to the session and publishes snapshots to a broadcast sink.

pub mod dispatcher;
pub mod lag_compensation;
pub mod snapshot;
pub mod wire;

pub use dispatcher::{DispatcherHooks, EndpointHandle, SessionDispatcher};
pub use lag_compensation::{HitRequest, HitResult, LagCompensation};
pub use snapshot::{Delta, PlayerSnapshot, ProjectileSnapshot, SnapshotManager, WorldSnapshot};
