// Structural invariants over snapshot sequences: list bounds, champion
// uniqueness, local-player uniqueness, and the informational-only role of
// bans.

use std::collections::HashSet;

use super::test_helpers::*;
use crate::config::TriggerKind;
use crate::draft::DraftState;
use crate::lcu::events::GameflowPhase;

fn assert_invariants(state: &DraftState) {
    assert!(state.ally_count() <= 5);
    assert!(state.enemy_count() <= 5);

    let mut seen: HashSet<u32> = HashSet::new();
    for pick in state.allies.iter().chain(state.enemies.iter()).flatten() {
        if let Some(champion_id) = pick.champion_id {
            assert!(
                seen.insert(champion_id),
                "champion {} appears twice",
                champion_id
            );
            assert!(
                !state.bans.contains(&champion_id),
                "champion {} is both picked and banned",
                champion_id
            );
        }
    }

    let locals = state
        .allies
        .iter()
        .flatten()
        .filter(|pick| pick.is_local_player)
        .count();
    assert!(locals <= 1, "more than one local player");
}

#[test]
fn invariants_hold_across_a_full_draft_sequence() {
    let config = config_with(|c| {
        c.features.matchup.enabled = true;
        c.features.matchup.trigger = TriggerKind::Pick;
    });
    let mut engine = engine_with(config);
    engine.handle_event(phase(GameflowPhase::ChampSelect));

    let snapshots = [
        SessionBuilder::new(8001, 0)
            .ally(0, 0, "middle")
            .ally(1, 0, "top")
            .enemy(5)
            .enemy(6)
            .enemy_ban(17),
        SessionBuilder::new(8001, 0)
            .ally(0, 0, "middle")
            .ally(1, 0, "top")
            .enemy(5)
            .enemy(6)
            .enemy_ban(17)
            .hovering_pick(0, 103),
        SessionBuilder::new(8001, 0)
            .ally(0, 103, "middle")
            .ally(1, 86, "top")
            .enemy(5)
            .enemy(6)
            .enemy_ban(17)
            .completed_pick(0, 103)
            .completed_pick(1, 86),
        SessionBuilder::new(8001, 0)
            .ally(0, 103, "middle")
            .ally(1, 86, "top")
            .enemy(5)
            .enemy(6)
            .enemy_ban(17)
            .completed_pick(0, 103)
            .completed_pick(1, 86)
            .completed_pick(5, 238)
            .completed_pick(6, 64),
        // A duplicated champion arrives as noise and must be discarded.
        SessionBuilder::new(8001, 0)
            .ally(0, 103, "middle")
            .ally(1, 86, "top")
            .ally(2, 103, "jungle")
            .enemy(5)
            .enemy(6)
            .enemy_ban(17)
            .completed_pick(0, 103)
            .completed_pick(1, 86)
            .completed_pick(5, 238)
            .completed_pick(6, 64)
            .completed_pick(2, 103),
    ];

    for snapshot in snapshots {
        engine.handle_event(snapshot.event());
        assert_invariants(engine.model().state());
    }
    assert_eq!(engine.model().state().session_id, 8001);
    assert!(engine.model().state().bans.contains(&17));
}

#[test]
fn applying_the_same_snapshot_twice_is_idempotent() {
    let config = config_with(|c| {
        c.features.my_counters.enabled = true;
        c.features.my_counters.trigger = TriggerKind::Pick;
    });
    let mut engine = engine_with(config);
    engine.handle_event(phase(GameflowPhase::ChampSelect));

    let build = || {
        SessionBuilder::new(8002, 0)
            .ally(0, 103, "middle")
            .enemy(5)
            .completed_pick(0, 103)
            .completed_pick(5, 238)
    };
    let first = engine.handle_event(build().event());
    let state_after_first = engine.model().state().clone();
    let second = engine.handle_event(build().event());

    assert!(!first.intents.is_empty());
    assert!(second.intents.is_empty());
    assert_eq!(engine.model().state(), &state_after_first);
}

#[test]
fn bans_never_reach_the_trigger_engine() {
    let config = config_with(|c| {
        c.features.matchup.enabled = true;
        c.features.matchup.trigger = TriggerKind::Pick;
        c.features.my_counters.enabled = true;
        c.features.my_counters.trigger = TriggerKind::Pick;
        c.features.enemy_counters.enabled = true;
        c.features.enemy_counters.trigger = TriggerKind::Pick;
        c.features.build_guide.enabled = true;
        c.features.build_guide.trigger = TriggerKind::Pick;
    });
    let mut engine = engine_with(config);
    engine.handle_event(phase(GameflowPhase::ChampSelect));

    let bans_only = SessionBuilder::new(8003, 0)
        .ally(0, 0, "")
        .enemy(5)
        .enemy_ban(157)
        .enemy_ban(238);
    let output = engine.handle_event(bans_only.event());
    assert!(output.intents.is_empty());
    assert_eq!(engine.model().state().bans.len(), 2);
}

#[test]
fn post_game_retains_draft_until_none() {
    let config = config_with(|c| {
        c.features.my_counters.enabled = true;
        c.features.my_counters.trigger = TriggerKind::Pick;
    });
    let mut engine = engine_with(config);
    engine.handle_event(phase(GameflowPhase::ChampSelect));
    engine.handle_event(
        SessionBuilder::new(8004, 0)
            .ally(0, 103, "middle")
            .completed_pick(0, 103)
            .event(),
    );
    engine.handle_event(phase(GameflowPhase::InProgress));
    engine.handle_event(phase(GameflowPhase::PostGame));
    // The grace window keeps the draft queryable after the game ends.
    assert_eq!(engine.model().state().ally_count(), 1);

    let output = engine.handle_event(phase(GameflowPhase::None));
    assert!(output.session_boundary);
    assert_eq!(engine.model().state().ally_count(), 0);
}
