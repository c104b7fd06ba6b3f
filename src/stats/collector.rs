//! Match Stats Collector.
//!
//! Turns a `Death` combat event plus a live session reference into an
//! immutable [`MatchResult`], by combining final session counters with a
//! walk of the combat log restricted to the tick of death.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::game::events::{CombatEvent, CombatEventTag};
use crate::game::session::GameSession;
use crate::stats::types::{MatchResult, PlayerMatchStats};

/// Stateless collector: every call derives a fresh result from the
/// session's current counters and combat log, given one `Death` event.
pub struct MatchStatsCollector;

impl MatchStatsCollector {
    /// Build the result for `death_event`. Winner is the event's shooter,
    /// loser its target.
    pub fn collect(
        session: &GameSession,
        death_event: &CombatEvent,
        completed_at: DateTime<Utc>,
    ) -> MatchResult {
        let players = session.snapshot();
        let combat_log = session.combat_log_snapshot();

        #[derive(Default)]
        struct Accum {
            damage_dealt: u32,
            damage_taken: u32,
            kills: u32,
        }
        let mut accum: BTreeMap<String, Accum> = BTreeMap::new();

        for event in combat_log.iter().filter(|e| e.tick <= death_event.tick) {
            match event.tag {
                CombatEventTag::Hit => {
                    accum.entry(event.shooter_id.clone()).or_default().damage_dealt += event.damage;
                    accum.entry(event.target_id.clone()).or_default().damage_taken += event.damage;
                }
                CombatEventTag::Death => {
                    accum.entry(event.shooter_id.clone()).or_default().kills += 1;
                }
            }
        }

        let mut player_stats: Vec<PlayerMatchStats> = players
            .iter()
            .map(|p| {
                let a = accum.get(&p.id);
                PlayerMatchStats {
                    player_id: p.id.clone(),
                    shots_fired: p.shots_fired,
                    hits_landed: p.hits_landed,
                    deaths: p.deaths,
                    kills: a.map(|a| a.kills).unwrap_or(0),
                    damage_dealt: a.map(|a| a.damage_dealt).unwrap_or(0),
                    damage_taken: a.map(|a| a.damage_taken).unwrap_or(0),
                }
            })
            .collect();
        player_stats.sort_by(|a, b| a.player_id.cmp(&b.player_id));

        MatchResult {
            winner_id: death_event.shooter_id.clone(),
            loser_id: death_event.target_id.clone(),
            completed_at,
            player_stats,
        }
    }
}
