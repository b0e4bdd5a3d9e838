// Draft domain types: lanes, teams, picks, and the canonical draft picture.

pub mod model;
pub mod roles;

pub use model::DraftModel;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Logical lane. Row index in `DraftState` follows this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Top,
    Jungle,
    Middle,
    Bottom,
    Support,
    Unknown,
}

pub const LANE_ORDER: [Role; 5] = [
    Role::Top,
    Role::Jungle,
    Role::Middle,
    Role::Bottom,
    Role::Support,
];

impl Role {
    pub fn row_index(self) -> Option<usize> {
        LANE_ORDER.iter().position(|r| *r == self)
    }

    pub fn from_row_index(index: usize) -> Role {
        LANE_ORDER.get(index).copied().unwrap_or(Role::Unknown)
    }

    /// Lane segment for analytics URLs; `Unknown` is omitted entirely.
    pub fn url_segment(self) -> Option<&'static str> {
        match self {
            Role::Top => Some("top"),
            Role::Jungle => Some("jungle"),
            Role::Middle => Some("middle"),
            Role::Bottom => Some("bottom"),
            Role::Support => Some("support"),
            Role::Unknown => None,
        }
    }

    /// Parse the client's `assignedPosition` strings.
    pub fn from_assigned_position(value: &str) -> Role {
        match value.to_ascii_lowercase().as_str() {
            "top" => Role::Top,
            "jungle" => Role::Jungle,
            "middle" | "mid" => Role::Middle,
            "bottom" | "adc" => Role::Bottom,
            "utility" | "support" => Role::Support,
            _ => Role::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Ally,
    Enemy,
}

/// One cell's champion choice as the draft sees it. Once `completed` is set
/// and a lane is assigned, both stay fixed for the rest of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub cell_id: i64,
    pub champion_id: Option<u32>,
    pub team: Team,
    pub pick_order: u8,
    pub is_local_player: bool,
    pub completed: bool,
    pub assigned_lane: Role,
    /// Current pick intent for this cell, if any (local hover or a visible
    /// enemy intent). Cleared when the pick completes.
    pub hovered_champion_id: Option<u32>,
}

/// The canonical picture of the current draft. Ally and enemy rows are in
/// logical lane order (0 = top .. 4 = support), not raw cell order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftState {
    pub session_id: u64,
    pub local_cell_id: Option<i64>,
    pub allies: [Option<Pick>; 5],
    pub enemies: [Option<Pick>; 5],
    pub bans: BTreeSet<u32>,
}

impl DraftState {
    pub fn new(session_id: u64) -> Self {
        DraftState {
            session_id,
            ..Default::default()
        }
    }

    pub fn local_pick(&self) -> Option<&Pick> {
        self.allies
            .iter()
            .flatten()
            .find(|pick| pick.is_local_player)
    }

    /// The completed enemy pick assigned to the given lane, if any.
    pub fn opposing_pick_in_lane(&self, lane: Role) -> Option<&Pick> {
        if lane == Role::Unknown {
            return None;
        }
        self.enemies
            .iter()
            .flatten()
            .find(|pick| pick.completed && pick.assigned_lane == lane && pick.champion_id.is_some())
    }

    /// A visible enemy pick intent that has not completed yet.
    pub fn pending_enemy_hover(&self) -> Option<u32> {
        self.enemies
            .iter()
            .flatten()
            .filter(|pick| !pick.completed)
            .find_map(|pick| pick.hovered_champion_id)
    }

    pub fn completed_enemy_picks(&self) -> impl Iterator<Item = &Pick> {
        self.enemies
            .iter()
            .flatten()
            .filter(|pick| pick.completed && pick.champion_id.is_some())
    }

    /// Whether a champion id already appears anywhere in the draft
    /// (allies, enemies, or bans).
    pub fn contains_champion(&self, champion_id: u32) -> bool {
        if self.bans.contains(&champion_id) {
            return true;
        }
        self.allies
            .iter()
            .chain(self.enemies.iter())
            .flatten()
            .any(|pick| pick.champion_id == Some(champion_id))
    }

    pub fn ally_count(&self) -> usize {
        self.allies.iter().flatten().count()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.iter().flatten().count()
    }
}

/// Commitment-level changes produced by folding one snapshot, plus the
/// in-game transition. These drive the trigger engine only; the lifecycle
/// machine never looks at them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEvent {
    /// The local player is signalling intent on a champion.
    Hover { champion_id: u32 },
    /// Any cell's pick action completed.
    PickCompleted {
        team: Team,
        champion_id: u32,
        lane: Role,
    },
    /// The local player's pick completed; this is the non-revocable commit.
    LockedIn { champion_id: u32, lane: Role },
    /// Champion select ended and the game is loading.
    GameStart,
}
