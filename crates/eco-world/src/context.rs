//! Shared state an animal may touch while it takes its turn.

use crate::animal::Animal;
use crate::grid::Grid;
use crate::ledger::Ledger;
use serde::{Deserialize, Serialize};

/// Grid plus world-wide bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub grid: Grid,
    pub ledger: Ledger,
}

impl World {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            ledger: Ledger::default(),
        }
    }
}

/// Everything an acting animal may mutate during its update.
///
/// `others` is the population of the opposite species. Newborns go into
/// `births` and join the acting population after the parent's update.
pub struct TurnContext<'a> {
    pub world: &'a mut World,
    pub others: &'a mut Vec<Animal>,
    pub births: &'a mut Vec<Animal>,
}

impl<'a> TurnContext<'a> {
    pub fn new(
        world: &'a mut World,
        others: &'a mut Vec<Animal>,
        births: &'a mut Vec<Animal>,
    ) -> Self {
        Self {
            world,
            others,
            births,
        }
    }
}
