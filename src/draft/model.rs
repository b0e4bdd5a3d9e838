// Folds champion-select snapshots into the canonical draft picture. Snapshots
// are additive merges: a completed pick is never unset by a partial snapshot,
// only a session reset clears entries.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::champions::ChampionSet;
use crate::draft::{roles, DraftEvent, DraftState, Pick, Role, Team, LANE_ORDER};
use crate::lcu::events::{ChampSelectCell, ChampSelectSession};

const ACTION_PICK: &str = "pick";
const ACTION_BAN: &str = "ban";

#[derive(Debug, Default)]
pub struct DraftModel {
    state: DraftState,
    new_session: bool,
    /// Visible enemy pick intents by cell id; cleared when the cell commits.
    enemy_hovers: HashMap<i64, u32>,
}

// Per-snapshot digest of the action groups.
struct ActionDigest {
    completed_picks: HashMap<i64, u32>,
    hovered_picks: HashMap<i64, u32>,
    in_progress_cells: HashSet<i64>,
    completed_bans: Vec<u32>,
    pick_sequence: Vec<i64>,
}

impl DraftModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    /// Start a fresh session. All pick lists, bans, and hover intents reset.
    pub fn reset(&mut self, session_id: u64) {
        self.state = DraftState::new(session_id);
        self.enemy_hovers.clear();
        self.new_session = true;
    }

    /// True between a session reset and the first snapshot folded into it.
    pub fn is_new_session(&self) -> bool {
        self.new_session
    }

    /// Adopt the session id the champ-select resource reports for the session
    /// already in progress. Draft contents are untouched.
    pub fn rekey(&mut self, session_id: u64) {
        self.state.session_id = session_id;
    }

    pub fn local_pick(&self) -> Option<&Pick> {
        self.state.local_pick()
    }

    pub fn opposing_pick_in_lane(&self, lane: Role) -> Option<&Pick> {
        self.state.opposing_pick_in_lane(lane)
    }

    /// An enemy pick intent that has not committed yet, if the client exposes
    /// one.
    pub fn pending_enemy_hover(&self) -> Option<u32> {
        self.enemy_hovers.values().next().copied()
    }

    /// Fold one snapshot, returning the commitment-level changes it caused.
    pub fn apply(
        &mut self,
        snapshot: &ChampSelectSession,
        champions: &ChampionSet,
    ) -> Vec<DraftEvent> {
        self.new_session = false;
        let mut events = Vec::new();

        if snapshot.local_player_cell_id >= 0 {
            self.state.local_cell_id = Some(snapshot.local_player_cell_id);
        }

        let digest = digest_actions(snapshot);

        for ban in &digest.completed_bans {
            self.insert_ban(*ban);
        }
        for id in snapshot
            .bans
            .my_team_bans
            .iter()
            .chain(&snapshot.bans.their_team_bans)
        {
            if *id > 0 {
                self.insert_ban(*id as u32);
            }
        }

        self.fold_allies(&snapshot.my_team, &digest, champions, &mut events);
        self.fold_enemies(&snapshot.their_team, &digest, champions, &mut events);

        events
    }

    fn insert_ban(&mut self, champion_id: u32) {
        if self.state.contains_champion(champion_id) {
            return;
        }
        self.state.bans.insert(champion_id);
    }

    fn fold_allies(
        &mut self,
        cells: &[ChampSelectCell],
        digest: &ActionDigest,
        champions: &ChampionSet,
        events: &mut Vec<DraftEvent>,
    ) {
        let orders = team_pick_orders(cells, &digest.pick_sequence);
        for (index, cell) in cells.iter().enumerate().take(5) {
            let cell_id = cell.cell_id;
            let is_local = self.state.local_cell_id == Some(cell_id);
            let pick_order = orders.get(&cell_id).copied().unwrap_or(index as u8 + 1);
            let committed = committed_champion(cell, digest);
            let dictated_lane = Role::from_assigned_position(&cell.assigned_position);

            let row = match self.ally_row_of(cell_id) {
                Some(row) => row,
                None => {
                    let Some(row) = place_ally(&self.state.allies, dictated_lane) else {
                        debug!(cell_id, "no free ally row for snapshot cell; dropping");
                        continue;
                    };
                    self.state.allies[row] = Some(Pick {
                        cell_id,
                        champion_id: None,
                        team: Team::Ally,
                        pick_order,
                        is_local_player: is_local,
                        completed: false,
                        assigned_lane: dictated_lane,
                        hovered_champion_id: None,
                    });
                    row
                }
            };

            // Split-borrow dance: uniqueness checks need the whole state while
            // the pick row is updated, so collect mutations first.
            let (was_completed, prior_hover, current_lane) = {
                let pick = self.state.allies[row].as_ref().expect("row just placed");
                (pick.completed, pick.hovered_champion_id, pick.assigned_lane)
            };

            // The snapshot's lane dictation wins over inference until the
            // pick completes, after which lanes are sticky.
            let mut lane = current_lane;
            if !was_completed && dictated_lane != Role::Unknown && dictated_lane != current_lane {
                lane = dictated_lane;
            }

            let hover = local_hover(cell, digest);
            let mut newly_completed = None;
            if !was_completed {
                if let Some(champion_id) = committed {
                    if self.state.contains_champion(champion_id) {
                        debug!(champion_id, "duplicate champion in snapshot; ignoring");
                    } else {
                        if lane == Role::Unknown {
                            lane = roles::infer_lane_for_row(
                                champions.aptitude(champion_id),
                                pick_order,
                                row,
                            );
                        }
                        newly_completed = Some(champion_id);
                    }
                }
            }

            let pick = self.state.allies[row].as_mut().expect("row just placed");
            pick.pick_order = pick_order;
            pick.is_local_player = is_local;
            pick.assigned_lane = lane;
            if let Some(champion_id) = newly_completed {
                pick.champion_id = Some(champion_id);
                pick.completed = true;
                pick.hovered_champion_id = None;
                events.push(DraftEvent::PickCompleted {
                    team: Team::Ally,
                    champion_id,
                    lane,
                });
                if is_local {
                    events.push(DraftEvent::LockedIn { champion_id, lane });
                }
            } else if !was_completed {
                pick.hovered_champion_id = hover;
                if let Some(champion_id) = hover {
                    if is_local && hover != prior_hover {
                        events.push(DraftEvent::Hover { champion_id });
                    }
                }
            }
        }
    }

    fn fold_enemies(
        &mut self,
        cells: &[ChampSelectCell],
        digest: &ActionDigest,
        champions: &ChampionSet,
        events: &mut Vec<DraftEvent>,
    ) {
        let orders = team_pick_orders(cells, &digest.pick_sequence);
        for (index, cell) in cells.iter().enumerate().take(5) {
            let cell_id = cell.cell_id;
            let pick_order = orders.get(&cell_id).copied().unwrap_or(index as u8 + 1);

            if self.enemy_row_of(cell_id).is_some() {
                // Committed enemies are sticky; later snapshots cannot move
                // or unset them.
                continue;
            }

            let hover = enemy_hover(cell, digest);
            let committed = committed_champion(cell, digest);
            let Some(champion_id) = committed else {
                match hover {
                    Some(intent) => {
                        self.enemy_hovers.insert(cell_id, intent);
                    }
                    None => {
                        self.enemy_hovers.remove(&cell_id);
                    }
                }
                continue;
            };

            if self.state.contains_champion(champion_id) {
                debug!(champion_id, "duplicate enemy champion; ignoring");
                continue;
            }

            let open: Vec<Role> = LANE_ORDER
                .iter()
                .enumerate()
                .filter(|(row, _)| self.state.enemies[*row].is_none())
                .map(|(_, lane)| *lane)
                .collect();
            if open.is_empty() {
                debug!(cell_id, "no free enemy row; dropping");
                continue;
            }
            let (lane, confident) =
                roles::choose_lane(champions.aptitude(champion_id), pick_order, &open);
            let row = lane
                .row_index()
                .filter(|row| self.state.enemies[*row].is_none())
                .unwrap_or_else(|| {
                    open[0]
                        .row_index()
                        .expect("open lanes come from row indices")
                });
            let assigned_lane = if confident { lane } else { Role::Unknown };

            self.enemy_hovers.remove(&cell_id);
            self.state.enemies[row] = Some(Pick {
                cell_id,
                champion_id: Some(champion_id),
                team: Team::Enemy,
                pick_order,
                is_local_player: false,
                completed: true,
                assigned_lane,
                hovered_champion_id: None,
            });
            events.push(DraftEvent::PickCompleted {
                team: Team::Enemy,
                champion_id,
                lane: assigned_lane,
            });
        }
    }

    fn ally_row_of(&self, cell_id: i64) -> Option<usize> {
        self.state
            .allies
            .iter()
            .position(|pick| pick.as_ref().map(|p| p.cell_id) == Some(cell_id))
    }

    fn enemy_row_of(&self, cell_id: i64) -> Option<usize> {
        self.state
            .enemies
            .iter()
            .position(|pick| pick.as_ref().map(|p| p.cell_id) == Some(cell_id))
    }
}

fn digest_actions(snapshot: &ChampSelectSession) -> ActionDigest {
    let mut digest = ActionDigest {
        completed_picks: HashMap::new(),
        hovered_picks: HashMap::new(),
        in_progress_cells: HashSet::new(),
        completed_bans: Vec::new(),
        pick_sequence: Vec::new(),
    };
    for group in &snapshot.actions {
        for action in group {
            match action.kind.as_str() {
                ACTION_PICK => {
                    if !digest.pick_sequence.contains(&action.actor_cell_id) {
                        digest.pick_sequence.push(action.actor_cell_id);
                    }
                    if action.completed && action.champion_id > 0 {
                        digest
                            .completed_picks
                            .insert(action.actor_cell_id, action.champion_id as u32);
                    } else if action.is_in_progress {
                        digest.in_progress_cells.insert(action.actor_cell_id);
                        if action.champion_id > 0 {
                            digest
                                .hovered_picks
                                .insert(action.actor_cell_id, action.champion_id as u32);
                        }
                    }
                }
                ACTION_BAN => {
                    if action.completed && action.champion_id > 0 {
                        digest.completed_bans.push(action.champion_id as u32);
                    }
                }
                _ => {}
            }
        }
    }
    digest
}

/// A cell's committed champion: a completed pick action wins; otherwise the
/// team-list champion counts only when no pick is still in progress for the
/// cell (covers instant-assign modes that never run pick actions).
fn committed_champion(cell: &ChampSelectCell, digest: &ActionDigest) -> Option<u32> {
    if let Some(champion_id) = digest.completed_picks.get(&cell.cell_id) {
        return Some(*champion_id);
    }
    if cell.champion_id > 0 && !digest.in_progress_cells.contains(&cell.cell_id) {
        return Some(cell.champion_id as u32);
    }
    None
}

fn local_hover(cell: &ChampSelectCell, digest: &ActionDigest) -> Option<u32> {
    digest.hovered_picks.get(&cell.cell_id).copied().or_else(|| {
        (cell.champion_pick_intent > 0).then_some(cell.champion_pick_intent as u32)
    })
}

fn enemy_hover(cell: &ChampSelectCell, digest: &ActionDigest) -> Option<u32> {
    local_hover(cell, digest)
}

/// Pick order within one team, derived from the order cells act in the pick
/// phase (1-based).
fn team_pick_orders(cells: &[ChampSelectCell], pick_sequence: &[i64]) -> HashMap<i64, u8> {
    let team_cells: HashSet<i64> = cells.iter().map(|c| c.cell_id).collect();
    pick_sequence
        .iter()
        .filter(|cell_id| team_cells.contains(cell_id))
        .enumerate()
        .map(|(index, cell_id)| (*cell_id, index as u8 + 1))
        .collect()
}

fn place_ally(rows: &[Option<Pick>; 5], dictated_lane: Role) -> Option<usize> {
    if let Some(row) = dictated_lane.row_index() {
        if rows[row].is_none() {
            return Some(row);
        }
    }
    rows.iter().position(Option::is_none)
}
