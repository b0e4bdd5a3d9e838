// Reconnect semantics: the resync replay folds through the same transitions,
// so an unchanged client session leaves the draft and fingerprints untouched.

use super::test_helpers::*;
use crate::config::TriggerKind;
use crate::lcu::events::GameflowPhase;

fn mid_draft_snapshot(game_id: i64) -> SessionBuilder {
    SessionBuilder::new(game_id, 0)
        .ally(0, 103, "middle")
        .ally(1, 64, "jungle")
        .enemy(5)
        .completed_pick(0, 103)
        .completed_pick(1, 64)
        .completed_pick(5, 238)
}

#[test]
fn resync_with_unchanged_session_is_silent() {
    let config = config_with(|c| {
        c.features.matchup.enabled = true;
        c.features.matchup.trigger = TriggerKind::Pick;
        c.features.enemy_counters.enabled = true;
        c.features.enemy_counters.trigger = TriggerKind::Pick;
    });
    let mut engine = engine_with(config);

    engine.handle_event(phase(GameflowPhase::ChampSelect));
    let output = engine.handle_event(mid_draft_snapshot(5001).event());
    assert!(!output.intents.is_empty());
    let state_before = engine.model().state().clone();

    // The socket drops; the machine holds position. The resync replays one
    // phase fold and one snapshot fold.
    let output = engine.handle_event(phase(GameflowPhase::ChampSelect));
    assert!(output.intents.is_empty());
    assert!(!output.session_boundary);

    let output = engine.handle_event(mid_draft_snapshot(5001).event());
    assert!(output.intents.is_empty());
    assert!(!output.session_boundary);
    assert_eq!(engine.model().state(), &state_before);
}

#[test]
fn resync_detects_a_session_change_during_the_outage() {
    let config = config_with(|c| {
        c.features.my_counters.enabled = true;
        c.features.my_counters.trigger = TriggerKind::Pick;
    });
    let mut engine = engine_with(config);

    engine.handle_event(phase(GameflowPhase::ChampSelect));
    engine.handle_event(mid_draft_snapshot(5001).event());
    assert_eq!(engine.model().state().session_id, 5001);

    // During the outage the client started a different champ select.
    let replacement = SessionBuilder::new(6002, 0)
        .ally(0, 222, "bottom")
        .completed_pick(0, 222);
    let output = engine.handle_event(replacement.event());
    assert!(output.session_boundary);
    assert_eq!(engine.model().state().session_id, 6002);
    // The new session's pick fires fresh, unhindered by old fingerprints.
    assert_eq!(output.intents.len(), 1);
    assert!(output.intents[0].url.contains("jinx"));
}

#[test]
fn replayed_history_converges_with_uninterrupted_history() {
    let config = config_with(|c| {
        c.features.matchup.enabled = true;
        c.features.matchup.trigger = TriggerKind::Pick;
    });

    // Uninterrupted: phase + A + B.
    let mut uninterrupted = engine_with(config.clone());
    uninterrupted.handle_event(phase(GameflowPhase::ChampSelect));
    let a = || {
        SessionBuilder::new(7001, 0)
            .ally(0, 103, "middle")
            .enemy(5)
            .completed_pick(0, 103)
    };
    let b = || {
        SessionBuilder::new(7001, 0)
            .ally(0, 103, "middle")
            .enemy(5)
            .completed_pick(0, 103)
            .completed_pick(5, 238)
    };
    uninterrupted.handle_event(a().event());
    uninterrupted.handle_event(b().event());

    // Interrupted: phase + A, then a reconnect resync replays phase + A,
    // then B arrives.
    let mut reconnected = engine_with(config);
    reconnected.handle_event(phase(GameflowPhase::ChampSelect));
    reconnected.handle_event(a().event());
    reconnected.handle_event(phase(GameflowPhase::ChampSelect));
    reconnected.handle_event(a().event());
    reconnected.handle_event(b().event());

    assert_eq!(
        uninterrupted.model().state(),
        reconnected.model().state(),
        "reconnect must not change the resulting draft"
    );
}

#[test]
fn snapshots_outside_champ_select_are_dropped() {
    let config = config_with(|c| {
        c.features.my_counters.enabled = true;
        c.features.my_counters.trigger = TriggerKind::Pick;
    });
    let mut engine = engine_with(config);

    // Still idle: a stray snapshot must not build draft state or fire.
    let stray = SessionBuilder::new(9001, 0)
        .ally(0, 103, "middle")
        .completed_pick(0, 103);
    let output = engine.handle_event(stray.event());
    assert!(output.intents.is_empty());
    assert_eq!(engine.model().state().ally_count(), 0);
}
