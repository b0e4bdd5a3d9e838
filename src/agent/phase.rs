// Gameflow lifecycle machine. Drives session boundaries and the in-game
// transition; transitions outside the table are treated as client noise and
// ignored.

use crate::lcu::events::GameflowPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Idle,
    /// Covers lobby, matchmaking, and ready check.
    InQueue,
    ChampSelect,
    InGame,
    PostGame,
}

/// Side effects a transition asks the engine to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAction {
    /// Reset the draft and start a new session.
    EnterChampSelect,
    /// Picks freeze; the build guide may re-open in game.
    GameStart,
    GameEnd,
    /// The post-game grace is over (or the queue was abandoned); forget the
    /// draft.
    DropDraft,
}

#[derive(Debug)]
pub struct PhaseMachine {
    state: LifecyclePhase,
}

impl PhaseMachine {
    pub fn new() -> Self {
        PhaseMachine {
            state: LifecyclePhase::Idle,
        }
    }

    pub fn state(&self) -> LifecyclePhase {
        self.state
    }

    /// Fold one phase event. Returns the actions the transition demands, in
    /// order. A disconnect never calls this; draft state survives reconnects
    /// by the machine simply not moving.
    pub fn apply(&mut self, phase: GameflowPhase) -> Vec<PhaseAction> {
        use GameflowPhase as Wire;
        use LifecyclePhase as State;

        let (next, actions): (State, Vec<PhaseAction>) = match (self.state, phase) {
            // Champion select entry from anywhere is a new session. Staying
            // in champ select is snapshot traffic, not a transition.
            (State::ChampSelect, Wire::ChampSelect) => (State::ChampSelect, vec![]),
            (_, Wire::ChampSelect) => (State::ChampSelect, vec![PhaseAction::EnterChampSelect]),

            (State::Idle, Wire::Lobby | Wire::Matchmaking | Wire::ReadyCheck) => {
                (State::InQueue, vec![])
            }
            (State::InQueue, Wire::Lobby | Wire::Matchmaking | Wire::ReadyCheck) => {
                (State::InQueue, vec![])
            }
            // A dodge or a post-game requeue abandons the old draft.
            (
                State::ChampSelect | State::InGame | State::PostGame,
                Wire::Lobby | Wire::Matchmaking | Wire::ReadyCheck,
            ) => (State::InQueue, vec![PhaseAction::DropDraft]),

            (State::ChampSelect, Wire::InProgress) => (State::InGame, vec![PhaseAction::GameStart]),
            (State::InGame, Wire::InProgress) => (State::InGame, vec![]),

            (State::PostGame, Wire::PostGame) => (State::PostGame, vec![]),
            (_, Wire::PostGame) => (State::PostGame, vec![PhaseAction::GameEnd]),

            (State::Idle, Wire::None) => (State::Idle, vec![]),
            (_, Wire::None) => (State::Idle, vec![PhaseAction::DropDraft]),

            // Everything else (e.g. InProgress while idle) is noise.
            (state, _) => (state, vec![]),
        };

        self.state = next;
        actions
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}
