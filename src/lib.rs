//! # PvP Core
//!
//! Authoritative simulation and network synchronization core for a
//! real-time competitive PvP game server.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         PVP CORE                                │
//! ├───────────────────────────────────────────────────────────────┤
//! │  core/          - Shared primitives: vectors, state hashing,    │
//! │                   monotonic session time, error types           │
//! │                                                                   │
//! │  game/          - Authoritative simulation                      │
//! │  ├── session.rs - GameSession: players, projectiles, combat      │
//! │  ├── state.rs   - Player/projectile state and constants          │
//! │  ├── collision.rs - Disk-disk and ray-circle tests               │
//! │  ├── events.rs  - Ordered combat events                          │
//! │  ├── input.rs   - Player input commands                         │
//! │  └── tick_driver.rs - Fixed-rate tick scheduling                 │
//! │                                                                   │
//! │  network/       - Broadcast, lag compensation, dispatch          │
//! │  ├── snapshot.rs - World snapshot history and delta encoding     │
//! │  ├── lag_compensation.rs - Rewind-based hit validation            │
//! │  ├── wire.rs    - Packet/bitmap constants (transport-agnostic)   │
//! │  └── dispatcher.rs - Binds transport events to the session       │
//! │                                                                   │
//! │  stats/         - Match results, ELO profiles, leaderboard       │
//! │  matchmaking/   - ELO-tolerant pairing queue                     │
//! │  anticheat/     - Statistical anomaly scoring                   │
//! │  config.rs      - Environment-backed server configuration        │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! `game/` advances purely from caller-supplied ticks and inputs: no
//! wall-clock reads, no unseeded randomness. Two sessions fed the same
//! input stream in the same order produce identical player/projectile
//! state, verifiable with [`core::hash::StateHasher`]. Wall-clock time
//! (`chrono`) appears only at the stats boundary, on completed matches.

pub mod anticheat;
pub mod config;
pub mod core;
pub mod game;
pub mod matchmaking;
pub mod network;
pub mod stats;

pub use config::ServerConfig;
pub use game::session::GameSession;
pub use game::tick_driver::TickDriver;
pub use network::dispatcher::{DispatcherHooks, SessionDispatcher};
pub use network::snapshot::SnapshotManager;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
