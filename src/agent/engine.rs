// The synchronous heart of the agent: decoder output goes in, trigger intents
// and observer notifications come out. No awaits happen anywhere in here, so
// draft state is never observable mid-mutation.

use std::sync::Arc;

use tracing::debug;

use crate::agent::phase::{LifecyclePhase, PhaseAction, PhaseMachine};
use crate::champions::ChampionRegistry;
use crate::config::Config;
use crate::draft::{DraftEvent, DraftModel};
use crate::lcu::events::{ChampSelectSession, GameflowPhase, LcuEvent};
use crate::observer::StateChange;
use crate::trigger::{TriggerEngine, TriggerIntent, EPOCH_CHAMP_SELECT, EPOCH_IN_GAME};

#[derive(Debug, Default)]
pub struct EngineOutput {
    /// Intents in dispatch order; fingerprints already recorded.
    pub intents: Vec<TriggerIntent>,
    pub state_changes: Vec<StateChange>,
    /// A session started or ended; pending delayed dispatches from the
    /// previous session must be cancelled.
    pub session_boundary: bool,
}

pub struct Engine {
    config: Config,
    registry: Arc<ChampionRegistry>,
    machine: PhaseMachine,
    model: DraftModel,
    triggers: TriggerEngine,
    epoch: u8,
    session_generation: u64,
    /// Set between champ-select entry and the first snapshot; the snapshot's
    /// own id re-keys the session when it carries one.
    awaiting_session_key: bool,
}

impl Engine {
    pub fn new(config: Config, registry: Arc<ChampionRegistry>) -> Self {
        Engine {
            config,
            registry,
            machine: PhaseMachine::new(),
            model: DraftModel::new(),
            triggers: TriggerEngine::new(),
            epoch: EPOCH_CHAMP_SELECT,
            session_generation: 0,
            awaiting_session_key: false,
        }
    }

    /// Hot-apply a new configuration. Session state is untouched; only
    /// future trigger decisions see the change.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.machine.state()
    }

    pub fn model(&self) -> &DraftModel {
        &self.model
    }

    pub fn handle_event(&mut self, event: LcuEvent) -> EngineOutput {
        match event {
            LcuEvent::PhaseChanged(phase) => self.handle_phase(phase),
            LcuEvent::ChampSelectSnapshot(session) => self.handle_snapshot(*session),
        }
    }

    fn handle_phase(&mut self, phase: GameflowPhase) -> EngineOutput {
        let mut output = EngineOutput::default();
        let before = self.machine.state();
        let actions = self.machine.apply(phase);
        let after = self.machine.state();
        if before != after {
            output.state_changes.push(StateChange::PhaseChanged(after));
        }

        for action in actions {
            match action {
                PhaseAction::EnterChampSelect => {
                    self.session_generation += 1;
                    self.start_session(self.session_generation, &mut output);
                    self.awaiting_session_key = true;
                }
                PhaseAction::GameStart => {
                    self.epoch = EPOCH_IN_GAME;
                    let intents = self.triggers.evaluate(
                        &self.config,
                        &self.registry.snapshot(),
                        &self.model,
                        &DraftEvent::GameStart,
                        self.epoch,
                    );
                    output.intents.extend(intents);
                }
                PhaseAction::GameEnd => {
                    // Draft survives the post-game grace for late queries.
                }
                PhaseAction::DropDraft => {
                    self.model.reset(0);
                    self.triggers.reset();
                    self.epoch = EPOCH_CHAMP_SELECT;
                    self.awaiting_session_key = false;
                    output.session_boundary = true;
                }
            }
        }
        output
    }

    fn handle_snapshot(&mut self, session: ChampSelectSession) -> EngineOutput {
        let mut output = EngineOutput::default();
        if self.machine.state() != LifecyclePhase::ChampSelect {
            debug!("dropping champ select snapshot outside champ select");
            return output;
        }

        if session.game_id > 0 {
            let wire_session = session.game_id as u64;
            if self.awaiting_session_key {
                // First snapshot of the session: adopt the resource's own id.
                self.model.rekey(wire_session);
                self.awaiting_session_key = false;
            } else if wire_session != self.model.state().session_id {
                // The session changed under us (e.g. during an outage); the
                // old draft belongs to a game that no longer exists.
                self.start_session(wire_session, &mut output);
            }
        } else {
            self.awaiting_session_key = false;
        }

        let registry = self.registry.snapshot();
        let events = self.model.apply(&session, &registry);
        for event in &events {
            let intents =
                self.triggers
                    .evaluate(&self.config, &registry, &self.model, event, self.epoch);
            output.intents.extend(intents);
        }
        output
    }

    fn start_session(&mut self, session_id: u64, output: &mut EngineOutput) {
        self.model.reset(session_id);
        self.triggers.reset();
        self.epoch = EPOCH_CHAMP_SELECT;
        output.session_boundary = true;
        output
            .state_changes
            .push(StateChange::NewSession { session_id });
    }
}
