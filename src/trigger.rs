// Maps draft changes to URL-open intents under the user's trigger policy.
// Every emitted fingerprint is recorded before anything is dispatched, so a
// failed browser launch cannot cause a duplicate open later.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::champions::ChampionSet;
use crate::config::{Config, TriggerKind};
use crate::draft::{DraftEvent, DraftModel, Role, Team};

/// Epoch 0 is champion select; epoch 1 is in game. Part of the fingerprint so
/// an `open_in_game` re-open of the build guide is distinct from the lock-in
/// open.
pub const EPOCH_CHAMP_SELECT: u8 = 0;
pub const EPOCH_IN_GAME: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Matchup,
    MyCounters,
    EnemyCounters,
    BuildGuide,
}

/// Evaluation (and dispatch) order when several features fire off one update.
pub const FEATURE_ORDER: [Feature; 4] = [
    Feature::Matchup,
    Feature::MyCounters,
    Feature::EnemyCounters,
    Feature::BuildGuide,
];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TriggerFingerprint {
    pub feature: Feature,
    pub champion_id: u32,
    pub opponent_id: Option<u32>,
    pub role: Option<Role>,
    pub session_id: u64,
    pub phase_epoch: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerIntent {
    pub feature: Feature,
    pub url: String,
    pub fingerprint: TriggerFingerprint,
}

#[derive(Debug, Default)]
pub struct TriggerEngine {
    fired: BTreeSet<TriggerFingerprint>,
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprints live for one session; clear them on session boundaries.
    pub fn reset(&mut self) {
        self.fired.clear();
    }

    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }

    /// Evaluate one draft change against the configured features. Returned
    /// intents are in dispatch order and their fingerprints are already
    /// recorded.
    pub fn evaluate(
        &mut self,
        config: &Config,
        champions: &ChampionSet,
        model: &DraftModel,
        event: &DraftEvent,
        phase_epoch: u8,
    ) -> Vec<TriggerIntent> {
        let mut intents = Vec::new();
        let session_id = model.state().session_id;

        // The local champion this event speaks for: the hovered champion
        // during a hover, the committed local pick otherwise.
        let subject = match event {
            DraftEvent::Hover { champion_id } => Some(*champion_id),
            _ => model
                .local_pick()
                .filter(|pick| pick.completed)
                .and_then(|pick| pick.champion_id),
        };
        let local_lane = model
            .local_pick()
            .map(|pick| pick.assigned_lane)
            .unwrap_or(Role::Unknown);

        for feature in FEATURE_ORDER {
            let candidate = match feature {
                Feature::Matchup => self.matchup_intent(
                    config, champions, model, event, subject, local_lane, session_id, phase_epoch,
                ),
                Feature::MyCounters => self.my_counters_intent(
                    config, champions, event, subject, local_lane, session_id, phase_epoch,
                ),
                Feature::EnemyCounters => {
                    self.enemy_counters_intent(config, champions, event, session_id, phase_epoch)
                }
                Feature::BuildGuide => self.build_guide_intent(
                    config, champions, event, subject, local_lane, session_id, phase_epoch,
                ),
            };
            if let Some(intent) = candidate {
                if self.fired.insert(intent.fingerprint.clone()) {
                    intents.push(intent);
                } else {
                    trace!(fingerprint = ?intent.fingerprint, "suppressing duplicate trigger");
                }
            }
        }
        intents
    }

    #[allow(clippy::too_many_arguments)]
    fn matchup_intent(
        &self,
        config: &Config,
        champions: &ChampionSet,
        model: &DraftModel,
        event: &DraftEvent,
        subject: Option<u32>,
        local_lane: Role,
        session_id: u64,
        phase_epoch: u8,
    ) -> Option<TriggerIntent> {
        let feature = &config.features.matchup;
        if !feature.enabled || !kind_matches(event, feature.trigger) {
            return None;
        }
        let champion_id = subject?;
        if local_lane == Role::Unknown {
            return None;
        }
        let opponent = model.opposing_pick_in_lane(local_lane)?;
        let opponent_id = opponent.champion_id?;
        let champ = champions.canonical_name(champion_id)?;
        let opp = champions.canonical_name(opponent_id)?;
        let url = format!(
            "{}/champion/{}/matchup/{}{}",
            config.analytics.base_url,
            champ,
            opp,
            role_suffix(local_lane)
        );
        Some(TriggerIntent {
            feature: Feature::Matchup,
            url,
            fingerprint: TriggerFingerprint {
                feature: Feature::Matchup,
                champion_id,
                opponent_id: Some(opponent_id),
                role: fingerprint_role(local_lane),
                session_id,
                phase_epoch,
            },
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn my_counters_intent(
        &self,
        config: &Config,
        champions: &ChampionSet,
        event: &DraftEvent,
        subject: Option<u32>,
        local_lane: Role,
        session_id: u64,
        phase_epoch: u8,
    ) -> Option<TriggerIntent> {
        let feature = &config.features.my_counters;
        if !feature.enabled || !kind_matches(event, feature.trigger) {
            return None;
        }
        let champion_id = subject?;
        let champ = champions.canonical_name(champion_id)?;
        let url = format!(
            "{}/champion/{}/counters{}",
            config.analytics.base_url,
            champ,
            role_suffix(local_lane)
        );
        Some(TriggerIntent {
            feature: Feature::MyCounters,
            url,
            fingerprint: TriggerFingerprint {
                feature: Feature::MyCounters,
                champion_id,
                opponent_id: None,
                role: fingerprint_role(local_lane),
                session_id,
                phase_epoch,
            },
        })
    }

    fn enemy_counters_intent(
        &self,
        config: &Config,
        champions: &ChampionSet,
        event: &DraftEvent,
        session_id: u64,
        phase_epoch: u8,
    ) -> Option<TriggerIntent> {
        let feature = &config.features.enemy_counters;
        if !feature.enabled || !kind_matches(event, feature.trigger) {
            return None;
        }
        // Only a completed enemy pick carries enough information; enemy lanes
        // are never authoritative, so the role segment is always omitted.
        let champion_id = match event {
            DraftEvent::PickCompleted {
                team: Team::Enemy,
                champion_id,
                ..
            } => *champion_id,
            _ => return None,
        };
        let champ = champions.canonical_name(champion_id)?;
        let url = format!("{}/champion/{}/counters", config.analytics.base_url, champ);
        Some(TriggerIntent {
            feature: Feature::EnemyCounters,
            url,
            fingerprint: TriggerFingerprint {
                feature: Feature::EnemyCounters,
                champion_id,
                opponent_id: None,
                role: None,
                session_id,
                phase_epoch,
            },
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn build_guide_intent(
        &self,
        config: &Config,
        champions: &ChampionSet,
        event: &DraftEvent,
        subject: Option<u32>,
        local_lane: Role,
        session_id: u64,
        phase_epoch: u8,
    ) -> Option<TriggerIntent> {
        let feature = &config.features.build_guide;
        if !feature.enabled {
            return None;
        }
        let qualifies = if matches!(event, DraftEvent::GameStart) {
            feature.open_in_game
        } else {
            kind_matches(event, feature.trigger)
        };
        if !qualifies {
            return None;
        }
        let champion_id = subject?;
        let champ = champions.canonical_name(champion_id)?;
        let url = format!(
            "{}/champion/{}/build{}",
            config.analytics.base_url,
            champ,
            role_suffix(local_lane)
        );
        Some(TriggerIntent {
            feature: Feature::BuildGuide,
            url,
            fingerprint: TriggerFingerprint {
                feature: Feature::BuildGuide,
                champion_id,
                opponent_id: None,
                role: fingerprint_role(local_lane),
                session_id,
                phase_epoch,
            },
        })
    }
}

fn kind_matches(event: &DraftEvent, trigger: TriggerKind) -> bool {
    match event {
        DraftEvent::Hover { .. } => trigger == TriggerKind::Hover,
        DraftEvent::PickCompleted { .. } => trigger == TriggerKind::Pick,
        DraftEvent::LockedIn { .. } => trigger == TriggerKind::LockIn,
        DraftEvent::GameStart => false,
    }
}

fn role_suffix(lane: Role) -> String {
    match lane.url_segment() {
        Some(segment) => format!("/{}", segment),
        None => String::new(),
    }
}

fn fingerprint_role(lane: Role) -> Option<Role> {
    (lane != Role::Unknown).then_some(lane)
}
