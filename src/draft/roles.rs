// Lane assignment from champion aptitude when the client does not provide one.

use crate::champions::LaneAptitude;
use crate::draft::{Role, LANE_ORDER};

/// Pick orders at or below this prefer solo lanes on aptitude ties; orders at
/// or above `LATE_PICK_ORDER` prefer the bottom lane pair.
const EARLY_PICK_ORDER: u8 = 2;
const LATE_PICK_ORDER: u8 = 4;

/// Choose a lane for a champion among the lanes still open.
///
/// Returns the winning lane and whether the assignment is confident. An
/// unconfident result places the pick without claiming a lane, so the role is
/// omitted from any URL built from it.
pub fn choose_lane(
    aptitude: Option<LaneAptitude>,
    pick_order: u8,
    open_lanes: &[Role],
) -> (Role, bool) {
    let first_open = match open_lanes.first() {
        Some(lane) => *lane,
        None => return (Role::Unknown, false),
    };
    let aptitude = match aptitude {
        Some(aptitude) => aptitude,
        None => return (first_open, false),
    };

    let best_score = open_lanes
        .iter()
        .map(|lane| aptitude.for_role(*lane))
        .max()
        .unwrap_or(0);
    if best_score == 0 {
        return (first_open, false);
    }

    let candidates: Vec<Role> = open_lanes
        .iter()
        .copied()
        .filter(|lane| aptitude.for_role(*lane) == best_score)
        .collect();
    (break_tie(&candidates, pick_order), true)
}

/// Lane assignment for a pick already fixed to a row; used for allies whose
/// snapshot carries no assigned position. Never called for snapshot-dictated
/// lanes.
pub fn infer_lane_for_row(aptitude: Option<LaneAptitude>, pick_order: u8, row: usize) -> Role {
    let row_lane = Role::from_row_index(row);
    let aptitude = match aptitude {
        Some(aptitude) => aptitude,
        None => return Role::Unknown,
    };
    // The row is only a storage slot; claim it as the lane when the champion
    // actually plays there, otherwise claim the overall best lane.
    if aptitude.for_role(row_lane) > 0 {
        return row_lane;
    }
    let (lane, confident) = choose_lane(Some(aptitude), pick_order, &LANE_ORDER);
    if confident {
        lane
    } else {
        Role::Unknown
    }
}

fn break_tie(candidates: &[Role], pick_order: u8) -> Role {
    debug_assert!(!candidates.is_empty());
    if pick_order >= LATE_PICK_ORDER {
        for preferred in [Role::Bottom, Role::Support] {
            if candidates.contains(&preferred) {
                return preferred;
            }
        }
    } else if pick_order <= EARLY_PICK_ORDER {
        for preferred in [Role::Top, Role::Jungle] {
            if candidates.contains(&preferred) {
                return preferred;
            }
        }
    }
    // Row index ascending.
    candidates[0]
}
