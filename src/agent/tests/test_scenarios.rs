// The concrete end-to-end scenarios: configured trigger moments against
// realistic snapshot sequences.

use std::sync::Arc;
use std::time::Duration;

use super::test_helpers::*;
use crate::config::TriggerKind;
use crate::dispatch::spawn_dispatch;
use crate::lcu::events::GameflowPhase;
use crate::observer::NullObserver;
use crate::trigger::{Feature, TriggerFingerprint, TriggerIntent};
use tokio_util::sync::CancellationToken;

#[test]
fn ally_hover_opens_counters_exactly_once() {
    let config = config_with(|c| {
        c.features.my_counters.enabled = true;
        c.features.my_counters.trigger = TriggerKind::Hover;
    });
    let mut engine = engine_with(config);

    engine.handle_event(phase(GameflowPhase::ChampSelect));
    let hover = SessionBuilder::new(3001, 0)
        .ally(0, 0, "")
        .hovering_pick(0, 103);
    let output = engine.handle_event(hover.event());
    assert_eq!(output.intents.len(), 1);
    assert_eq!(
        output.intents[0].url,
        "https://lolalytics.com/champion/ahri/counters"
    );

    // The same hover in the same session opens nothing further.
    let repeat = SessionBuilder::new(3001, 0)
        .ally(0, 0, "")
        .hovering_pick(0, 103);
    let output = engine.handle_event(repeat.event());
    assert!(output.intents.is_empty());
}

#[test]
fn matchup_fires_on_ally_pick_completion() {
    let config = config_with(|c| {
        c.features.matchup.enabled = true;
        c.features.matchup.trigger = TriggerKind::Pick;
    });
    let mut engine = engine_with(config);
    engine.handle_event(phase(GameflowPhase::ChampSelect));

    // Enemy Zed completes first; the matchup still lacks the local champion.
    let enemy_first = SessionBuilder::new(3002, 0)
        .ally(0, 0, "middle")
        .enemy(5)
        .completed_pick(5, 238);
    let output = engine.handle_event(enemy_first.event());
    assert!(output.intents.is_empty());

    // Ally Ahri completes in middle; Zed was inferred into middle from his
    // lane aptitude.
    let ally_completes = SessionBuilder::new(3002, 0)
        .ally(0, 103, "middle")
        .enemy(5)
        .completed_pick(5, 238)
        .completed_pick(0, 103);
    let output = engine.handle_event(ally_completes.event());
    let urls: Vec<&str> = output.intents.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["https://lolalytics.com/champion/ahri/matchup/zed/middle"]
    );
}

#[test]
fn enemy_counters_fire_on_enemy_pick() {
    let config = config_with(|c| {
        c.features.enemy_counters.enabled = true;
        c.features.enemy_counters.trigger = TriggerKind::Pick;
    });
    let mut engine = engine_with(config);
    engine.handle_event(phase(GameflowPhase::ChampSelect));

    let allies_locked = SessionBuilder::new(3003, 0)
        .ally(0, 86, "top")
        .ally(1, 64, "jungle")
        .enemy(5)
        .completed_pick(0, 86)
        .completed_pick(1, 64);
    let output = engine.handle_event(allies_locked.event());
    assert!(output.intents.is_empty());

    let yasuo_completes = SessionBuilder::new(3003, 0)
        .ally(0, 86, "top")
        .ally(1, 64, "jungle")
        .enemy(5)
        .completed_pick(0, 86)
        .completed_pick(1, 64)
        .completed_pick(5, 157);
    let output = engine.handle_event(yasuo_completes.event());
    assert_eq!(output.intents.len(), 1);
    assert_eq!(
        output.intents[0].url,
        "https://lolalytics.com/champion/yasuo/counters"
    );

    // An identical follow-up snapshot emits nothing.
    let identical = SessionBuilder::new(3003, 0)
        .ally(0, 86, "top")
        .ally(1, 64, "jungle")
        .enemy(5)
        .completed_pick(0, 86)
        .completed_pick(1, 64)
        .completed_pick(5, 157);
    let output = engine.handle_event(identical.event());
    assert!(output.intents.is_empty());
}

#[test]
fn build_guide_opens_on_lock_in_and_again_in_game() {
    let config = config_with(|c| {
        c.features.build_guide.enabled = true;
        c.features.build_guide.trigger = TriggerKind::LockIn;
        c.features.build_guide.open_in_game = true;
    });
    let mut engine = engine_with(config);
    engine.handle_event(phase(GameflowPhase::ChampSelect));

    let locked = SessionBuilder::new(3004, 0)
        .ally(0, 222, "bottom")
        .completed_pick(0, 222);
    let output = engine.handle_event(locked.event());
    assert_eq!(output.intents.len(), 1);
    assert_eq!(
        output.intents[0].url,
        "https://lolalytics.com/champion/jinx/build/bottom"
    );

    // Entering the game opens the same guide a second time under the in-game
    // epoch.
    let output = engine.handle_event(phase(GameflowPhase::InProgress));
    assert_eq!(output.intents.len(), 1);
    assert_eq!(
        output.intents[0].url,
        "https://lolalytics.com/champion/jinx/build/bottom"
    );
    assert_eq!(output.intents[0].feature, Feature::BuildGuide);
}

#[test]
fn hover_trigger_ignores_pick_only_events() {
    let config = config_with(|c| {
        c.features.my_counters.enabled = true;
        c.features.my_counters.trigger = TriggerKind::LockIn;
    });
    let mut engine = engine_with(config);
    engine.handle_event(phase(GameflowPhase::ChampSelect));

    let hover = SessionBuilder::new(3005, 0)
        .ally(0, 0, "")
        .hovering_pick(0, 103);
    let output = engine.handle_event(hover.event());
    assert!(output.intents.is_empty());
}

#[tokio::test]
async fn dispatcher_receives_the_url_as_given() {
    // The hostile url must reach the dispatch seam byte for byte; the
    // platform launcher then passes it on as a single argv element.
    let hostile = "https://lolanalytics.com/champion/ahri?x=$(whoami)&y=<z>";
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let observer = Arc::new(NullObserver);
    let intent = TriggerIntent {
        feature: Feature::MyCounters,
        url: hostile.to_string(),
        fingerprint: TriggerFingerprint {
            feature: Feature::MyCounters,
            champion_id: 103,
            opponent_id: None,
            role: None,
            session_id: 1,
            phase_epoch: 0,
        },
    };
    let handle = spawn_dispatch(
        dispatcher.clone(),
        observer,
        intent,
        Duration::ZERO,
        CancellationToken::new(),
    );
    handle.await.expect("dispatch task runs");
    assert_eq!(dispatcher.opened(), vec![hostile.to_string()]);
}
