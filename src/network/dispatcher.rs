//! Session Dispatcher — binds incoming transport events to the session
//! and outgoing snapshots to a broadcast sink.
//!
//! Hooks are injected once at construction via [`DispatcherHooks`] rather
//! than exposed as post-construction setters, per the design note against
//! mutable callback fields: every hazard of a hook changing mid-tick is
//! designed out instead of guarded against.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{info, warn};

use crate::core::time::SessionClock;
use crate::game::input::InputCommand;
use crate::game::session::GameSession;
use crate::game::state::PROJECTILE_SPEED;
use crate::game::tick_driver::TickInfo;
use crate::network::snapshot::{PlayerSnapshot, ProjectileSnapshot, SnapshotManager, WorldSnapshot};
use crate::stats::collector::MatchStatsCollector;
use crate::stats::types::MatchResult;

/// Opaque connection handle a transport layer uses to identify one
/// socket. The core never interprets this beyond equality/ordering.
pub type EndpointHandle = u64;

type JoinHook = Box<dyn Fn(&str) + Send + Sync>;
type LeaveHook = Box<dyn Fn(&str) + Send + Sync>;
type BroadcastSink = Box<dyn Fn(&WorldSnapshot) + Send + Sync>;
type MatchCompletedHook = Box<dyn Fn(&MatchResult) + Send + Sync>;

/// Capability object injected at construction: every external side effect
/// the dispatcher can cause.
pub struct DispatcherHooks {
    pub on_join: Option<JoinHook>,
    pub on_leave: Option<LeaveHook>,
    pub broadcast: BroadcastSink,
    pub on_match_completed: Option<MatchCompletedHook>,
}

/// Wires transport events to [`GameSession`] and outgoing snapshots to the
/// broadcast sink. Endpoint-to-player mapping lives here, not in the
/// session — reconnects "reclaim" the mapping without touching in-session
/// player state.
pub struct SessionDispatcher {
    session: Arc<GameSession>,
    snapshots: Arc<SnapshotManager>,
    clock: SessionClock,
    endpoints: Mutex<BTreeMap<EndpointHandle, String>>,
    hooks: DispatcherHooks,
}

impl SessionDispatcher {
    pub fn new(session: Arc<GameSession>, snapshots: Arc<SnapshotManager>, hooks: DispatcherHooks) -> Self {
        Self {
            session,
            snapshots,
            clock: SessionClock::new(),
            endpoints: Mutex::new(BTreeMap::new()),
            hooks,
        }
    }

    /// A client connected. Idempotent: reconnecting the same id under a
    /// new endpoint handle reclaims the mapping without resetting
    /// in-session state (`GameSession::upsert_player` is itself
    /// idempotent).
    pub fn on_client_connect(&self, player_id: &str, endpoint: EndpointHandle) {
        self.session.upsert_player(player_id);
        self.endpoints.lock().unwrap().insert(endpoint, player_id.to_string());
        if let Some(hook) = &self.hooks.on_join {
            hook(player_id);
        }
    }

    /// A transport-level disconnect. Resolves the endpoint to a player id,
    /// removes both the mapping and the session's player record.
    pub fn on_client_disconnect(&self, endpoint: EndpointHandle) {
        let player_id = self.endpoints.lock().unwrap().remove(&endpoint);
        let Some(player_id) = player_id else {
            warn!(endpoint, "disconnect for unknown endpoint");
            return;
        };
        self.session.remove_player(&player_id);
        if let Some(hook) = &self.hooks.on_leave {
            hook(&player_id);
        }
    }

    pub fn on_client_input(&self, player_id: &str, input: InputCommand, dt_secs: f32) {
        self.session.apply_input(player_id, input, dt_secs);
    }

    /// Driven by the tick driver: advance the session, build and publish
    /// a broadcast snapshot, and drain death events into the match-stats
    /// pipeline.
    pub fn on_tick(&self, info: TickInfo) {
        let combat_events = self.session.tick(info.tick_index, info.delta_seconds as f32);
        if !combat_events.is_empty() {
            tracing::debug!(tick = info.tick_index, count = combat_events.len(), "combat events");
        }

        let timestamp_ms = self.clock.now_ms();
        let players: Vec<PlayerSnapshot> = self
            .session
            .snapshot()
            .into_iter()
            .map(|p| PlayerSnapshot {
                id: p.id,
                x: p.position.x,
                y: p.position.y,
                facing_radians: p.facing_radians,
                health: p.health,
                alive: p.alive,
                last_input_sequence: p.last_sequence,
            })
            .collect();

        let projectiles: Vec<ProjectileSnapshot> = self
            .session
            .projectiles_snapshot()
            .into_iter()
            .map(|p| ProjectileSnapshot {
                id: p.id,
                owner_id: p.owner_id,
                x: p.position.x,
                y: p.position.y,
                vx: p.direction.x * PROJECTILE_SPEED,
                vy: p.direction.y * PROJECTILE_SPEED,
            })
            .collect();

        let snapshot = self.snapshots.create_snapshot(timestamp_ms, players, projectiles);
        self.snapshots.save_snapshot(snapshot.clone());
        (self.hooks.broadcast)(&snapshot);

        for death in self.session.consume_death_events() {
            let result = MatchStatsCollector::collect(&self.session, &death, Utc::now());
            info!(winner = %result.winner_id, loser = %result.loser_id, "match completed");
            if let Some(hook) = &self.hooks.on_match_completed {
                hook(&result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn input(sequence: u32, move_x: f32, aim: f32, fire: bool) -> InputCommand {
        InputCommand {
            sequence,
            client_timestamp: 0,
            move_x,
            move_y: 0.0,
            aim_radians: aim,
            fire,
        }
    }

    #[test]
    fn connect_reclaims_mapping_without_resetting_state() {
        let session = Arc::new(GameSession::new());
        let snapshots = Arc::new(SnapshotManager::new());
        let dispatcher = SessionDispatcher::new(
            session.clone(),
            snapshots,
            DispatcherHooks {
                on_join: None,
                on_leave: None,
                broadcast: Box::new(|_| {}),
                on_match_completed: None,
            },
        );

        dispatcher.on_client_connect("alice", 1);
        dispatcher.on_client_input("alice", input(1, 1.0, 0.0, false), 1.0);
        let pos_after_move = session.snapshot()[0].position;

        dispatcher.on_client_connect("alice", 2);
        let pos_after_reconnect = session.snapshot()[0].position;

        assert_eq!(pos_after_move, pos_after_reconnect);
    }

    #[test]
    fn disconnect_removes_player_and_notifies_leave_hook() {
        let session = Arc::new(GameSession::new());
        let snapshots = Arc::new(SnapshotManager::new());
        let left = Arc::new(AtomicUsize::new(0));
        let left_clone = left.clone();

        let dispatcher = SessionDispatcher::new(
            session.clone(),
            snapshots,
            DispatcherHooks {
                on_join: None,
                on_leave: Some(Box::new(move |_id| {
                    left_clone.fetch_add(1, Ordering::SeqCst);
                })),
                broadcast: Box::new(|_| {}),
                on_match_completed: None,
            },
        );

        dispatcher.on_client_connect("bob", 5);
        dispatcher.on_client_disconnect(5);

        assert!(session.snapshot().is_empty());
        assert_eq!(left.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tick_publishes_snapshot_with_last_input_sequence() {
        let session = Arc::new(GameSession::new());
        let snapshots = Arc::new(SnapshotManager::new());
        let published = Arc::new(Mutex::new(None));
        let published_clone = published.clone();

        let dispatcher = SessionDispatcher::new(
            session.clone(),
            snapshots,
            DispatcherHooks {
                on_join: None,
                on_leave: None,
                broadcast: Box::new(move |snap| {
                    *published_clone.lock().unwrap() = Some(snap.clone());
                }),
                on_match_completed: None,
            },
        );

        dispatcher.on_client_connect("alice", 1);
        dispatcher.on_client_input("alice", input(7, 0.0, 0.0, false), 0.0);

        dispatcher.on_tick(TickInfo {
            tick_index: 0,
            delta_seconds: 1.0 / 60.0,
            frame_start: std::time::Instant::now(),
        });

        let snap = published.lock().unwrap().clone().unwrap();
        assert_eq!(snap.players[0].last_input_sequence, 7);
    }
}
