use crate::grid::Coord;
use crate::tribe::TribeId;
use serde::{Deserialize, Serialize};

/// Unique agent identity. Ids are issued monotonically and never reused;
/// ascending-id order is the fixed agent update order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AntId(pub u32);

/// Behaviour state, re-evaluated once per tick in fixed priority order
/// (combat before returning before exploring). `Dead` is terminal: a dead
/// ant is removed from the grid and its tribe's registry during the
/// bookkeeping phase and never ticks again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntState {
    Exploring,
    ReturningWithResource,
    Fighting,
    Dead,
}

/// Mobile agent. The tribe reference is set at spawn and never changes.
#[derive(Clone, Debug)]
pub struct Ant {
    pub id: AntId,
    pub tribe: TribeId,
    pub pos: Coord,
    pub state: AntState,
    pub health: u32,
    /// Resources picked up this trip; > 0 implies the ant is homebound.
    pub carrying: u32,
    /// Last committed movement direction, used as the first tie-break when
    /// following a trail gradient.
    pub heading: Option<(i8, i8)>,
}

impl Ant {
    pub fn new(id: AntId, tribe: TribeId, pos: Coord, health: u32) -> Self {
        Self {
            id,
            tribe,
            pos,
            state: AntState::Exploring,
            health,
            carrying: 0,
            heading: None,
        }
    }
}
