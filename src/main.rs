//! PvP Core demo binary.
//!
//! Wires a tick driver, a game session, the session dispatcher, and the
//! matchmaking/stats services together for a short scripted run. This is
//! a demonstration harness, not a production entry point — a real
//! deployment attaches a transport layer to [`pvp_core::network::dispatcher::SessionDispatcher`]
//! instead of driving it directly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pvp_core::config::ServerConfig;
use pvp_core::game::input::InputCommand;
use pvp_core::game::session::GameSession;
use pvp_core::matchmaking::{MatchRequest, Matchmaker};
use pvp_core::network::dispatcher::{DispatcherHooks, SessionDispatcher};
use pvp_core::network::snapshot::SnapshotManager;
use pvp_core::stats::{ProfileService, MatchResult};
use pvp_core::game::tick_driver::TickDriver;
use pvp_core::VERSION;

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    let config = ServerConfig::from_env();
    info!(version = VERSION, ?config, "pvp-core starting");

    demo_match(&config);
    demo_matchmaking();
}

/// Runs a short scripted 1v1 to completion and prints the resulting
/// broadcast snapshots and match stats.
fn demo_match(config: &ServerConfig) {
    info!("=== demo match ===");

    let session = Arc::new(GameSession::new());
    let snapshots = Arc::new(SnapshotManager::new());
    let profiles = Arc::new(ProfileService::new());

    let broadcast_count = Arc::new(AtomicU64::new(0));
    let broadcast_count_clone = broadcast_count.clone();

    let profiles_for_hook = profiles.clone();
    let dispatcher = Arc::new(SessionDispatcher::new(
        session.clone(),
        snapshots.clone(),
        DispatcherHooks {
            on_join: Some(Box::new(|id: &str| info!(player = id, "joined"))),
            on_leave: Some(Box::new(|id: &str| info!(player = id, "left"))),
            broadcast: Box::new(move |_snapshot| {
                broadcast_count_clone.fetch_add(1, Ordering::Relaxed);
            }),
            on_match_completed: Some(Box::new(move |result: &MatchResult| {
                profiles_for_hook.record_match(result);
            })),
        },
    ));

    dispatcher.on_client_connect("alice", 1);
    dispatcher.on_client_connect("bob", 2);

    let driver = Arc::new(TickDriver::new(config.tick_rate).expect("tick_rate must be positive"));
    let driver_dispatcher = dispatcher.clone();
    driver.set_update_callback(Some(move |info| {
        driver_dispatcher.on_tick(info);
    }));

    // Aim bob at alice and fire steadily; the tick driver advances the
    // session in the background on its own thread.
    let aim_input = InputCommand {
        sequence: 1,
        client_timestamp: 0,
        move_x: 0.0,
        move_y: 0.0,
        aim_radians: 0.0,
        fire: true,
    };
    dispatcher.on_client_input("bob", aim_input, 0.0);

    driver.start();
    std::thread::sleep(Duration::from_millis(500));
    driver.stop();
    driver.join();

    info!(
        broadcasts = broadcast_count.load(Ordering::Relaxed),
        ticks = driver.last_durations().len(),
        "demo match finished"
    );

    for profile in profiles.top_profiles(10) {
        info!(player = %profile.player_id, rating = profile.rating, wins = profile.wins, losses = profile.losses, "profile");
    }

    println!("{}", profiles.metrics_snapshot());
}

/// Enqueues a handful of players with spread ratings and runs one
/// matching pass, printing the pairings formed.
fn demo_matchmaking() {
    info!("=== demo matchmaking ===");

    let matched = Arc::new(Mutex::new(Vec::new()));
    let matched_clone = matched.clone();
    let matchmaker = Matchmaker::with_hook(Some(Box::new(move |m| {
        matched_clone.lock().unwrap().push(m.clone());
    })));

    for (id, rating) in [("p1", 1180), ("p2", 1205), ("p3", 1600), ("p4", 1550)] {
        matchmaker.enqueue(MatchRequest {
            player_id: id.to_string(),
            rating,
            enqueue_time: 0.0,
            preferred_region: "any".to_string(),
        });
    }

    matchmaker.run_matching(0.0);

    for m in matched.lock().unwrap().iter() {
        info!(match_id = %m.id, players = ?m.player_ids, region = %m.resolved_region, "match formed");
    }
    println!("{}", matchmaker.metrics_snapshot());
}
