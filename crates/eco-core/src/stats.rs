//! Hunt tracking and per-turn statistics.

use serde::{Deserialize, Serialize};

/// Running tally of carnivore attacks.
///
/// Both counters start at one so the success rate is defined before the
/// first fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntStats {
    pub fights_won: u64,
    pub total_fights: u64,
}

impl Default for HuntStats {
    fn default() -> Self {
        Self {
            fights_won: 1,
            total_fights: 1,
        }
    }
}

impl HuntStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fight(&mut self, won: bool) {
        self.total_fights += 1;
        if won {
            self.fights_won += 1;
        }
    }

    /// Share of won fights, as an integer percentage.
    pub fn success_rate(&self) -> u32 {
        ((self.fights_won * 100) / self.total_fights.max(1)) as u32
    }
}

/// Summary of the world after a completed turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub turn: u64,
    pub herbivores: usize,
    pub carnivores: usize,
    pub highest_generation: u32,
    pub average_grass_density: i32,
    pub hunt_success_rate: u32,
}

impl TurnSummary {
    pub fn population(&self) -> usize {
        self.herbivores + self.carnivores
    }

    /// True once both species have died out.
    pub fn is_extinct(&self) -> bool {
        self.population() == 0
    }
}
